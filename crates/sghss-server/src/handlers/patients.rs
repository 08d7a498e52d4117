//! Patient service: intake, search, partial update, soft delete and
//! reactivation.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use sghss_auth::BearerAuth;
use sghss_core::{ApiError, PageParams, Pagination, validation};
use sghss_db::patients::{self, NewPatient, PatientRow, PatientUpdate};

use crate::api_error::ApiResult;
use crate::handlers::{opt_text, str_field};
use crate::state::AppState;

const NOT_FOUND: &str = "Paciente não encontrado";
const BAD_BIRTH_DATE: &str = "Data de nascimento inválida. Use o formato YYYY-MM-DD";

/// Patient representation on the wire.
#[derive(Debug, Serialize)]
pub struct PacienteDto {
    pub id: i32,
    pub nome: String,
    pub cpf: String,
    pub data_nascimento: Option<NaiveDate>,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub ativo: bool,
    pub data_cadastro: DateTime<Utc>,
    pub data_atualizacao: DateTime<Utc>,
}

impl From<PatientRow> for PacienteDto {
    fn from(row: PatientRow) -> Self {
        Self {
            id: row.id,
            nome: row.name,
            cpf: row.cpf,
            data_nascimento: row.birth_date,
            endereco: row.address,
            telefone: row.phone,
            email: row.email,
            ativo: row.active,
            data_cadastro: row.created_at,
            data_atualizacao: row.updated_at,
        }
    }
}

pub async fn create(
    BearerAuth(_claims): BearerAuth,
    State(state): State<AppState>,
    Json(data): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let nome = str_field(&data, "nome");
    let cpf_raw = str_field(&data, "cpf");
    let data_nascimento = str_field(&data, "data_nascimento");
    let endereco = str_field(&data, "endereco");
    let telefone = str_field(&data, "telefone");
    let email = str_field(&data, "email");

    if nome.is_empty() || cpf_raw.is_empty() {
        return Err(ApiError::validation("Nome e CPF são obrigatórios").into());
    }
    if nome.chars().count() < 2 {
        return Err(ApiError::validation("Nome deve ter pelo menos 2 caracteres").into());
    }

    let cpf = validation::normalize_cpf(&cpf_raw)
        .ok_or_else(|| ApiError::validation("CPF inválido"))?;

    if patients::cpf_in_use(&state.pool, &cpf).await? {
        return Err(ApiError::conflict("Paciente com este CPF já existe").into());
    }

    if !email.is_empty() {
        if !validation::is_valid_email(&email) {
            return Err(ApiError::validation("Email inválido").into());
        }
        if patients::email_in_use(&state.pool, &email, None).await? {
            return Err(ApiError::conflict("Email já está em uso").into());
        }
    }

    if !telefone.is_empty() && !validation::is_valid_phone(&telefone) {
        return Err(ApiError::validation("Telefone inválido").into());
    }

    let birth_date = match data_nascimento.as_str() {
        "" => None,
        value => Some(validation::parse_date(value, BAD_BIRTH_DATE)?),
    };

    let mut tx = state.pool.begin().await?;
    let patient = patients::insert(
        &mut tx,
        NewPatient {
            name: nome,
            cpf,
            birth_date,
            address: opt_text(endereco),
            phone: opt_text(telefone),
            email: opt_text(email),
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(patient_id = patient.id, "Patient registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Paciente cadastrado com sucesso",
            "paciente": PacienteDto::from(patient),
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
}

pub async fn list(
    BearerAuth(_claims): BearerAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let params = PageParams::new(query.page, query.per_page);
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (rows, total) = patients::list(&state.pool, params, search).await?;
    let pacientes: Vec<PacienteDto> = rows.into_iter().map(PacienteDto::from).collect();

    Ok(Json(json!({
        "pacientes": pacientes,
        "pagination": Pagination::new(params, total),
    })))
}

pub async fn get(
    BearerAuth(_claims): BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let patient = patients::find_by_id(&state.pool, id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(Json(json!({ "paciente": PacienteDto::from(patient) })))
}

pub async fn update(
    BearerAuth(_claims): BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(data): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let patient = patients::find_by_id(&state.pool, id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    let mut fields = PatientUpdate {
        name: patient.name.clone(),
        birth_date: patient.birth_date,
        address: patient.address.clone(),
        phone: patient.phone.clone(),
        email: patient.email.clone(),
    };

    if data.get("nome").is_some() {
        let nome = str_field(&data, "nome");
        if nome.chars().count() < 2 {
            return Err(ApiError::validation("Nome deve ter pelo menos 2 caracteres").into());
        }
        fields.name = nome;
    }

    if data.get("data_nascimento").is_some() {
        fields.birth_date = match str_field(&data, "data_nascimento").as_str() {
            "" => None,
            value => Some(validation::parse_date(value, BAD_BIRTH_DATE)?),
        };
    }

    if data.get("endereco").is_some() {
        fields.address = opt_text(str_field(&data, "endereco"));
    }

    if data.get("telefone").is_some() {
        let telefone = str_field(&data, "telefone");
        if !telefone.is_empty() && !validation::is_valid_phone(&telefone) {
            return Err(ApiError::validation("Telefone inválido").into());
        }
        fields.phone = opt_text(telefone);
    }

    if data.get("email").is_some() {
        let email = str_field(&data, "email");
        if !email.is_empty() {
            if !validation::is_valid_email(&email) {
                return Err(ApiError::validation("Email inválido").into());
            }
            if patients::email_in_use(&state.pool, &email, Some(id)).await? {
                return Err(ApiError::conflict("Email já está em uso").into());
            }
        }
        fields.email = opt_text(email);
    }

    let mut tx = state.pool.begin().await?;
    let updated = patients::update(&mut tx, id, fields).await?;
    tx.commit().await?;

    Ok(Json(json!({
        "message": "Paciente atualizado com sucesso",
        "paciente": PacienteDto::from(updated),
    })))
}

pub async fn deactivate(
    BearerAuth(_claims): BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    patients::find_by_id(&state.pool, id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    let mut tx = state.pool.begin().await?;
    patients::set_active(&mut tx, id, false).await?;
    tx.commit().await?;

    tracing::info!(patient_id = id, "Patient deactivated");

    Ok(Json(json!({ "message": "Paciente desativado com sucesso" })))
}

pub async fn reactivate(
    BearerAuth(_claims): BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let patient = patients::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    // Reactivating an already-active record is an error, not a no-op.
    if patient.active {
        return Err(ApiError::validation("Paciente já está ativo").into());
    }

    let mut tx = state.pool.begin().await?;
    let updated = patients::set_active(&mut tx, id, true)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    tx.commit().await?;

    tracing::info!(patient_id = id, "Patient reactivated");

    Ok(Json(json!({
        "message": "Paciente reativado com sucesso",
        "paciente": PacienteDto::from(updated),
    })))
}
