//! Account service: registration, login, profile, password change.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{Value, json};

use sghss_auth::BearerAuth;
use sghss_auth::password::{hash_password, verify_password};
use sghss_core::validation::validate_password;
use sghss_core::{ApiError, DEFAULT_USER_KIND, validation};
use sghss_db::users::{self, NewUser, UserRow};

use crate::api_error::ApiResult;
use crate::handlers::{opt_text, secret_field, str_field};
use crate::state::AppState;

fn user_json(user: &UserRow) -> Value {
    json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "tipo_usuario": user.user_kind,
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(data): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let username = str_field(&data, "username");
    let password = secret_field(&data, "password");
    let email = str_field(&data, "email");
    let user_kind = match str_field(&data, "tipo_usuario") {
        s if s.is_empty() => DEFAULT_USER_KIND.to_string(),
        s => s,
    };

    if username.is_empty() || password.is_empty() {
        return Err(ApiError::validation("Nome de usuário e senha são obrigatórios").into());
    }
    if username.chars().count() < 3 {
        return Err(
            ApiError::validation("Nome de usuário deve ter pelo menos 3 caracteres").into(),
        );
    }
    validate_password(&password)?;
    if !email.is_empty() && !validation::is_valid_email(&email) {
        return Err(ApiError::validation("Email inválido").into());
    }

    if users::find_by_username(&state.pool, &username).await?.is_some() {
        return Err(ApiError::conflict("Nome de usuário já existe").into());
    }
    if !email.is_empty() && users::email_in_use(&state.pool, &email).await? {
        return Err(ApiError::conflict("Email já está em uso").into());
    }

    let password_hash = hash_password(&password)?;

    let mut tx = state.pool.begin().await?;
    let user = users::insert(
        &mut tx,
        NewUser {
            username,
            password_hash,
            email: opt_text(email),
            user_kind,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Usuário criado com sucesso",
            "user_id": user.id,
            "username": user.username,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(data): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let username = str_field(&data, "username");
    let password = secret_field(&data, "password");

    if username.is_empty() || password.is_empty() {
        return Err(ApiError::validation("Nome de usuário e senha são obrigatórios").into());
    }

    let user = users::find_by_username(&state.pool, &username).await?;
    let user = match user {
        Some(u) if verify_password(&password, &u.password_hash) => u,
        _ => return Err(ApiError::auth("Credenciais inválidas").into()),
    };

    let access_token = state
        .auth
        .tokens
        .issue(user.id, &user.username, &user.user_kind)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(json!({
        "message": "Login realizado com sucesso",
        "access_token": access_token,
        "user": user_json(&user),
    })))
}

pub async fn profile(
    BearerAuth(claims): BearerAuth,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let user = match claims.account_id() {
        Some(id) => users::find_by_id(&state.pool, id).await?,
        None => None,
    };
    let user = user.ok_or_else(|| ApiError::not_found("Usuário não encontrado"))?;

    let mut body = user_json(&user);
    body["data_cadastro"] = serde_json::to_value(user.created_at)?;

    Ok(Json(json!({ "user": body })))
}

pub async fn change_password(
    BearerAuth(claims): BearerAuth,
    State(state): State<AppState>,
    Json(data): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let user = match claims.account_id() {
        Some(id) => users::find_by_id(&state.pool, id).await?,
        None => None,
    };
    let user = user.ok_or_else(|| ApiError::not_found("Usuário não encontrado"))?;

    let current_password = secret_field(&data, "current_password");
    let new_password = secret_field(&data, "new_password");

    if current_password.is_empty() || new_password.is_empty() {
        return Err(ApiError::validation("Senha atual e nova senha são obrigatórias").into());
    }
    if !verify_password(&current_password, &user.password_hash) {
        return Err(ApiError::auth("Senha atual incorreta").into());
    }
    validate_password(&new_password)?;

    let password_hash = hash_password(&new_password)?;

    let mut tx = state.pool.begin().await?;
    users::update_password(&mut tx, user.id, &password_hash).await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, "Password changed");

    Ok(Json(json!({ "message": "Senha alterada com sucesso" })))
}
