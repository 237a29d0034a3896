// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, models::photo::Photo};

// --- Enums ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    #[default]
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

// --- Rota ---

// Uma amostra de GPS. `accuracy` (metros) é apenas informativa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate, ToSchema)]
pub struct RoutePoint {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude fora do intervalo."))]
    #[schema(example = 52.2297)]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude fora do intervalo."))]
    #[schema(example = 21.0122)]
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    #[schema(example = 12.5)]
    pub accuracy: f64,
}

// Cópia de leitura de uma foto dentro da sessão.
// Sempre derivada da tabela de fotos, nunca gravada separadamente.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionPhoto {
    pub id: Uuid,
    pub url: String,
    pub description: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    // Quando a foto foi tirada (ou enviada, se o dispositivo não informou)
    pub timestamp: DateTime<Utc>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&Photo> for SessionPhoto {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id,
            url: photo.url.clone(),
            description: photo.description.clone(),
            lat: photo.location.as_ref().map(|l| l.lat),
            lng: photo.location.as_ref().map(|l| l.lng),
            timestamp: photo.taken_at.unwrap_or(photo.uploaded_at),
            uploaded_at: photo.uploaded_at,
        }
    }
}

// --- Sessão ---

// Linha da tabela work_sessions (sem rota e fotos)
#[derive(Debug, Clone, FromRow)]
pub struct WorkSessionRow {
    pub id: Uuid,
    pub worker_id: Option<Uuid>,
    pub client_id: String,
    pub client_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: i64,
    pub notes: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    pub id: Uuid,
    pub worker_id: Option<Uuid>,
    #[schema(example = "client_001")]
    pub client_id: String,
    #[schema(example = "Jan Kowalski")]
    pub client_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Segundos, sempre `endTime - startTime` (0 enquanto em andamento).
    #[schema(example = 30600)]
    pub duration: i64,
    pub route: Vec<RoutePoint>,
    pub photos: Vec<SessionPhoto>,
    pub notes: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkSession {
    pub fn from_parts(row: WorkSessionRow, route: Vec<RoutePoint>, photos: Vec<SessionPhoto>) -> Self {
        Self {
            id: row.id,
            worker_id: row.worker_id,
            client_id: row.client_id,
            client_name: row.client_name,
            start_time: row.start_time,
            end_time: row.end_time,
            duration: row.duration,
            route,
            photos,
            notes: row.notes,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// --- Payloads ---

// Referência a uma foto já hospedada, enviada junto com a sessão
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoReference {
    #[validate(length(min = 1, message = "A URL da foto é obrigatória."))]
    pub url: String,
    pub description: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

// O registro completo montado pelo trabalhador ao final do expediente.
// Os campos obrigatórios são `Option` para que a ausência vire erro de validação
// estruturado, e não uma rejeição genérica do JSON.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionPayload {
    #[validate(required(message = "O cliente é obrigatório."), length(min = 1, message = "O cliente é obrigatório."))]
    #[schema(example = "client_001")]
    pub client_id: Option<String>,

    #[validate(required(message = "O nome do cliente é obrigatório."), length(min = 1, message = "O nome do cliente é obrigatório."))]
    #[schema(example = "Jan Kowalski")]
    pub client_name: Option<String>,

    #[validate(required(message = "O início é obrigatório."))]
    pub start_time: Option<DateTime<Utc>>,

    #[validate(required(message = "O término é obrigatório."))]
    pub end_time: Option<DateTime<Utc>>,

    // Aceito apenas para conferência; o servidor sempre recalcula
    #[schema(example = 30600)]
    pub duration: Option<i64>,

    #[serde(default)]
    #[validate(nested)]
    pub route: Vec<RoutePoint>,

    #[serde(default)]
    #[validate(nested)]
    pub photos: Vec<PhotoReference>,

    // Fotos enviadas antes (soltas) que passam a pertencer à sessão
    #[serde(default)]
    pub photo_ids: Vec<Uuid>,

    pub notes: Option<String>,
    pub status: Option<SessionStatus>,
}

// Versão já validada do payload de criação
#[derive(Debug, Clone)]
pub struct NewWorkSession {
    pub client_id: String,
    pub client_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub declared_duration: Option<i64>,
    pub route: Vec<RoutePoint>,
    pub photos: Vec<PhotoReference>,
    pub photo_ids: Vec<Uuid>,
    pub notes: Option<String>,
    pub status: SessionStatus,
}

impl TryFrom<CreateSessionPayload> for NewWorkSession {
    type Error = AppError;

    fn try_from(payload: CreateSessionPayload) -> Result<Self, Self::Error> {
        let missing = |field: &'static str| AppError::InvalidField(field, "Campo obrigatório.".into());

        Ok(Self {
            client_id: payload.client_id.ok_or_else(|| missing("clientId"))?,
            client_name: payload.client_name.ok_or_else(|| missing("clientName"))?,
            start_time: payload.start_time.ok_or_else(|| missing("startTime"))?,
            end_time: payload.end_time.ok_or_else(|| missing("endTime"))?,
            declared_duration: payload.duration,
            route: payload.route,
            photos: payload.photos,
            photo_ids: payload.photo_ids,
            notes: payload.notes,
            status: payload.status.unwrap_or_default(),
        })
    }
}

// Abre uma sessão ao vivo (o GPS do trabalhador vai alimentando a rota)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionPayload {
    #[validate(length(min = 1, message = "O cliente é obrigatório."))]
    pub client_id: String,
    #[validate(length(min = 1, message = "O nome do cliente é obrigatório."))]
    pub client_name: String,
    // Padrão: agora
    pub start_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AppendRoutePayload {
    #[validate(length(min = 1, message = "Envie ao menos um ponto."), nested)]
    pub points: Vec<RoutePoint>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteAppendResult {
    pub session_id: Uuid,
    pub appended: usize,
    pub point_count: i64,
}

// Usado tanto para finalizar quanto para cancelar
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloseSessionPayload {
    // Padrão: agora
    pub end_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

// Merge raso: só os campos presentes são alterados.
// As fotos não entram aqui; elas são geridas pelos endpoints de fotos.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionPayload {
    #[validate(length(min = 1, message = "O cliente não pode ser vazio."))]
    pub client_id: Option<String>,
    #[validate(length(min = 1, message = "O nome do cliente não pode ser vazio."))]
    pub client_name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<i64>,
    #[validate(nested)]
    pub route: Option<Vec<RoutePoint>>,
    pub notes: Option<String>,
    pub status: Option<SessionStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub success: bool,
    pub session: WorkSession,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}
