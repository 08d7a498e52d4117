//! Appointment service: scheduling, filtered listing, status changes and
//! visit notes (prontuários).

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Days, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use sghss_auth::BearerAuth;
use sghss_core::{
    ApiError, AppointmentModality, AppointmentStatus, PageParams, Pagination, validation,
};
use sghss_db::appointments::{self, AppointmentFilter, AppointmentRow, NewAppointment};
use sghss_db::records::{self, RecordFields, RecordRow};
use sghss_db::{patients, users};

use crate::api_error::ApiResult;
use crate::handlers::patients::PacienteDto;
use crate::handlers::{id_field, opt_text, positive_id, str_field};
use crate::state::AppState;

const APPOINTMENT_NOT_FOUND: &str = "Consulta não encontrada";
const RECORD_NOT_FOUND: &str = "Prontuário não encontrado";

/// Appointment representation on the wire.
#[derive(Debug, Serialize)]
pub struct ConsultaDto {
    pub id: i32,
    pub paciente_id: i32,
    pub medico_id: i32,
    pub data_consulta: NaiveDateTime,
    pub tipo_consulta: String,
    pub status: String,
    pub observacoes: Option<String>,
    pub data_cadastro: DateTime<Utc>,
    pub data_atualizacao: DateTime<Utc>,
}

impl From<AppointmentRow> for ConsultaDto {
    fn from(row: AppointmentRow) -> Self {
        Self {
            id: row.id,
            paciente_id: row.patient_id,
            medico_id: row.doctor_id,
            data_consulta: row.scheduled_at,
            tipo_consulta: row.modality,
            status: row.status,
            observacoes: row.notes,
            data_cadastro: row.created_at,
            data_atualizacao: row.updated_at,
        }
    }
}

/// Visit note representation on the wire.
#[derive(Debug, Serialize)]
pub struct ProntuarioDto {
    pub id: i32,
    pub consulta_id: i32,
    pub diagnostico: Option<String>,
    pub prescricao: Option<String>,
    pub exames_solicitados: Option<String>,
    pub observacoes_medicas: Option<String>,
    pub data_cadastro: DateTime<Utc>,
}

impl From<RecordRow> for ProntuarioDto {
    fn from(row: RecordRow) -> Self {
        Self {
            id: row.id,
            consulta_id: row.appointment_id,
            diagnostico: row.diagnosis,
            prescricao: row.prescription,
            exames_solicitados: row.requested_exams,
            observacoes_medicas: row.clinical_notes,
            data_cadastro: row.created_at,
        }
    }
}

pub async fn schedule(
    BearerAuth(_claims): BearerAuth,
    State(state): State<AppState>,
    Json(data): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let paciente_id = id_field(&data, "paciente_id");
    let medico_id = id_field(&data, "medico_id");
    let data_consulta = str_field(&data, "data_consulta");
    let tipo_consulta = match str_field(&data, "tipo_consulta") {
        s if s.is_empty() => AppointmentModality::Presencial.to_string(),
        s => s,
    };
    let observacoes = str_field(&data, "observacoes");

    let (Some(paciente_id), Some(medico_id)) = (paciente_id, medico_id) else {
        return Err(
            ApiError::validation("Paciente, médico e data da consulta são obrigatórios").into(),
        );
    };
    if data_consulta.is_empty() {
        return Err(
            ApiError::validation("Paciente, médico e data da consulta são obrigatórios").into(),
        );
    }

    patients::find_by_id(&state.pool, paciente_id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| ApiError::not_found("Paciente não encontrado"))?;

    // The provider's active flag is deliberately not checked here.
    users::find_by_id(&state.pool, medico_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Médico não encontrado"))?;

    if tipo_consulta.parse::<AppointmentModality>().is_err() {
        return Err(ApiError::validation(
            "Tipo de consulta deve ser 'presencial' ou 'telemedicina'",
        )
        .into());
    }

    let scheduled_at = validation::parse_datetime(
        &data_consulta,
        "Data da consulta inválida. Use o formato YYYY-MM-DD HH:MM",
    )?;

    if scheduled_at < Utc::now().naive_utc() {
        return Err(ApiError::validation("Não é possível agendar consulta no passado").into());
    }

    if appointments::slot_taken(&state.pool, medico_id, scheduled_at).await? {
        return Err(ApiError::conflict("Médico já possui consulta agendada neste horário").into());
    }

    let mut tx = state.pool.begin().await?;
    let appointment = appointments::insert(
        &mut tx,
        NewAppointment {
            patient_id: paciente_id,
            doctor_id: medico_id,
            scheduled_at,
            modality: tipo_consulta,
            notes: opt_text(observacoes),
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        appointment_id = appointment.id,
        doctor_id = medico_id,
        "Appointment scheduled"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Consulta agendada com sucesso",
            "consulta": ConsultaDto::from(appointment),
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct AppointmentQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub paciente_id: Option<i32>,
    pub medico_id: Option<i32>,
    pub status: Option<String>,
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
}

pub async fn list(
    BearerAuth(_claims): BearerAuth,
    State(state): State<AppState>,
    Query(query): Query<AppointmentQuery>,
) -> ApiResult<impl IntoResponse> {
    let params = PageParams::new(query.page, query.per_page);

    // An unknown status silently narrows nothing, matching list semantics
    // for the other filters.
    let status = query
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| s.parse::<AppointmentStatus>().is_ok())
        .map(ToString::to_string);

    let scheduled_from = match query.data_inicio.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(
            validation::parse_date(value, "Data de início inválida. Use o formato YYYY-MM-DD")?
                .and_time(NaiveTime::MIN),
        ),
    };

    // End of the range is exclusive at the following midnight.
    let scheduled_before = match query.data_fim.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => {
            let date =
                validation::parse_date(value, "Data de fim inválida. Use o formato YYYY-MM-DD")?;
            let next = date
                .checked_add_days(Days::new(1))
                .ok_or_else(|| ApiError::validation("Data de fim fora do intervalo"))?;
            Some(next.and_time(NaiveTime::MIN))
        }
    };

    let filter = AppointmentFilter {
        patient_id: positive_id(query.paciente_id),
        doctor_id: positive_id(query.medico_id),
        status,
        scheduled_from,
        scheduled_before,
    };

    let (rows, total) = appointments::list(&state.pool, &filter, params).await?;

    let consultas: Vec<Value> = rows
        .into_iter()
        .map(|row| {
            let mut body = serde_json::to_value(ConsultaDto::from(row.appointment))?;
            body["paciente_nome"] = Value::String(row.patient_name);
            body["medico_nome"] = Value::String(row.doctor_username);
            Ok(body)
        })
        .collect::<Result<_, serde_json::Error>>()?;

    Ok(Json(json!({
        "consultas": consultas,
        "pagination": Pagination::new(params, total),
    })))
}

pub async fn get(
    BearerAuth(_claims): BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let appointment = appointments::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(APPOINTMENT_NOT_FOUND))?;

    let patient = patients::find_by_id(&state.pool, appointment.patient_id)
        .await?
        .ok_or_else(|| ApiError::internal("appointment references a missing patient"))?;
    let doctor = users::find_by_id(&state.pool, appointment.doctor_id)
        .await?
        .ok_or_else(|| ApiError::internal("appointment references a missing provider"))?;
    let record = records::find_by_appointment(&state.pool, appointment.id).await?;

    let mut body = serde_json::to_value(ConsultaDto::from(appointment))?;
    body["paciente"] = serde_json::to_value(PacienteDto::from(patient))?;
    body["medico"] = json!({
        "id": doctor.id,
        "username": doctor.username,
        "email": doctor.email,
    });
    if let Some(record) = record {
        body["prontuario"] = serde_json::to_value(ProntuarioDto::from(record))?;
    }

    Ok(Json(json!({ "consulta": body })))
}

pub async fn update_status(
    BearerAuth(_claims): BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(data): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    appointments::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(APPOINTMENT_NOT_FOUND))?;

    let novo_status = str_field(&data, "status");
    let status: AppointmentStatus = novo_status.parse().map_err(|()| {
        ApiError::validation("Status deve ser 'agendada', 'realizada' ou 'cancelada'")
    })?;

    let mut tx = state.pool.begin().await?;
    let updated = appointments::set_status(&mut tx, id, status.as_str())
        .await?
        .ok_or_else(|| ApiError::not_found(APPOINTMENT_NOT_FOUND))?;
    tx.commit().await?;

    Ok(Json(json!({
        "message": "Status da consulta atualizado com sucesso",
        "consulta": ConsultaDto::from(updated),
    })))
}

fn record_fields_from(data: &Value, existing: Option<&RecordRow>) -> RecordFields {
    let mut fields = match existing {
        Some(row) => RecordFields {
            diagnosis: row.diagnosis.clone(),
            prescription: row.prescription.clone(),
            requested_exams: row.requested_exams.clone(),
            clinical_notes: row.clinical_notes.clone(),
        },
        None => RecordFields::default(),
    };

    if data.get("diagnostico").is_some() {
        fields.diagnosis = opt_text(str_field(data, "diagnostico"));
    }
    if data.get("prescricao").is_some() {
        fields.prescription = opt_text(str_field(data, "prescricao"));
    }
    if data.get("exames_solicitados").is_some() {
        fields.requested_exams = opt_text(str_field(data, "exames_solicitados"));
    }
    if data.get("observacoes_medicas").is_some() {
        fields.clinical_notes = opt_text(str_field(data, "observacoes_medicas"));
    }

    fields
}

pub async fn create_record(
    BearerAuth(_claims): BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(data): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let appointment = appointments::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(APPOINTMENT_NOT_FOUND))?;

    if records::find_by_appointment(&state.pool, appointment.id)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Consulta já possui prontuário").into());
    }

    let fields = record_fields_from(&data, None);

    // The note insert and the status change to 'realizada' are one unit
    // of work.
    let mut tx = state.pool.begin().await?;
    let record = records::insert(&mut tx, appointment.id, fields).await?;
    appointments::set_status(&mut tx, appointment.id, AppointmentStatus::Realizada.as_str())
        .await?;
    tx.commit().await?;

    tracing::info!(
        record_id = record.id,
        appointment_id = appointment.id,
        "Visit note created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Prontuário criado com sucesso",
            "prontuario": ProntuarioDto::from(record),
        })),
    ))
}

pub async fn update_record(
    BearerAuth(_claims): BearerAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(data): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let record = records::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(RECORD_NOT_FOUND))?;

    let fields = record_fields_from(&data, Some(&record));

    let mut tx = state.pool.begin().await?;
    let updated = records::update(&mut tx, record.id, fields).await?;
    tx.commit().await?;

    Ok(Json(json!({
        "message": "Prontuário atualizado com sucesso",
        "prontuario": ProntuarioDto::from(updated),
    })))
}
