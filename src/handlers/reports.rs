// src/handlers/reports.rs

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::sessions::visible_session,
    middleware::auth::AuthenticatedUser,
    models::report::{ReportFormat, ReportQuery, SessionReport},
    services::{report_service, route_aggregator},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    pub success: bool,
    pub report: SessionReport,
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}/report",
    tag = "Reports",
    params(
        ("id" = Uuid, Path, description = "ID da sessão"),
        ("format" = Option<ReportFormat>, Query, description = "text (padrão), json ou pdf")
    ),
    responses(
        (status = 200, description = "Relatório da sessão", body = ReportResponse),
        (status = 404, description = "Sessão não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_session_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let session = visible_session(&app_state, &user, id).await?;
    let summary = route_aggregator::summarize(&session);
    let report = report_service::build_report(&session, &summary, Utc::now(), app_state.config.report_offset);

    match query.format.unwrap_or_default() {
        ReportFormat::Text => {
            let headers = [(header::CONTENT_TYPE, "text/plain; charset=utf-8")];
            Ok((headers, report.to_text()).into_response())
        }
        ReportFormat::Json => Ok(Json(ReportResponse { success: true, report }).into_response()),
        ReportFormat::Pdf => {
            let document_service = app_state.document_service.clone();
            let panel_url = app_state.config.session_panel_url(id);

            // genpdf é síncrono e pesado: fora do executor
            let pdf_bytes = tokio::task::spawn_blocking(move || {
                document_service.render_session_pdf(&report, panel_url.as_deref())
            })
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de geração do PDF: {}", e))??;

            // Configura os Headers para o navegador baixar ou mostrar o PDF
            let headers = [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (header::CONTENT_DISPOSITION, format!("attachment; filename=\"relatorio_{}.pdf\"", id)),
            ];
            Ok((headers, pdf_bytes).into_response())
        }
    }
}
