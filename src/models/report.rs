// src/models/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::session::WorkSession;

// Estatísticas derivadas da rota de uma sessão (calculadas sob demanda)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    #[schema(example = 2.37)]
    pub distance_km: f64,
    #[schema(example = 30600)]
    pub duration_seconds: i64,
    #[schema(example = "08:30:00")]
    pub duration: String,
    #[schema(example = "8h 30m")]
    pub duration_short: String,
    pub point_count: usize,
    pub photo_count: usize,
    pub first_point_at: Option<DateTime<Utc>>,
    pub last_point_at: Option<DateTime<Utc>>,
}

// Painel do cliente: totais de todas as sessões dele
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    pub client_id: String,
    pub total_sessions: usize,
    // Duas casas decimais
    #[schema(example = 8.5)]
    pub total_hours: f64,
    pub total_photos: usize,
    pub total_distance_km: f64,
    pub last_session: Option<WorkSession>,
}

// --- Relatório ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportPhoto {
    pub description: String,
    pub time: String,
    pub location: String,
}

// Relatório de uma sessão, já formatado para leitura humana.
// Renderizado como texto puro ou PDF.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: Uuid,
    pub client_name: String,
    pub date: String,
    pub start: String,
    pub end: String,
    pub duration: String,
    pub route_points: usize,
    pub distance: String,
    pub photo_count: usize,
    pub status: String,
    pub photos: Vec<ReportPhoto>,
    pub notes: Option<String>,
    pub generated_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Pdf,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub format: Option<ReportFormat>,
}
