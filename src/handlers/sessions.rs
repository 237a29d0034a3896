// src/handlers/sessions.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, RequireWorker},
    },
    models::{
        report::SessionSummary,
        session::{
            AppendRoutePayload, CloseSessionPayload, CreateSessionPayload, MessageResponse,
            NewWorkSession, RouteAppendResult, SessionResponse, StartSessionPayload,
            UpdateSessionPayload, WorkSession,
        },
    },
    services::{auth::AuthService, route_aggregator},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionListResponse {
    pub success: bool,
    pub sessions: Vec<WorkSession>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: SessionSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RouteAppendResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: RouteAppendResult,
}

// ---
// Handlers: leitura
// ---

#[utoipa::path(
    get,
    path = "/api/sessions",
    tag = "Sessions",
    responses(
        (status = 200, description = "Todas as sessões, mais recentes primeiro", body = SessionListResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sessions(
    State(app_state): State<AppState>,
    _worker: RequireWorker,
) -> Result<Json<SessionListResponse>, AppError> {
    let sessions = app_state.session_service.list_all().await?;
    Ok(Json(SessionListResponse { success: true, sessions }))
}

#[utoipa::path(
    get,
    path = "/api/sessions/client/{client_id}",
    tag = "Sessions",
    params(
        ("client_id" = String, Path, description = "Identificador do cliente")
    ),
    responses(
        (status = 200, description = "Sessões do cliente, mais recentes primeiro", body = SessionListResponse),
        (status = 403, description = "Cliente tentando ver sessões de outro")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_client_sessions(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(client_id): Path<String>,
) -> Result<Json<SessionListResponse>, AppError> {
    AuthService::ensure_can_view_client(&user, &client_id)?;

    let sessions = app_state.session_service.list_by_client(&client_id).await?;
    Ok(Json(SessionListResponse { success: true, sessions }))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    tag = "Sessions",
    params(
        ("id" = Uuid, Path, description = "ID da sessão")
    ),
    responses(
        (status = 200, description = "Sessão completa (rota e fotos)", body = SessionResponse),
        (status = 404, description = "Sessão não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_session(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = visible_session(&app_state, &user, id).await?;
    Ok(Json(SessionResponse { success: true, session }))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}/summary",
    tag = "Sessions",
    params(
        ("id" = Uuid, Path, description = "ID da sessão")
    ),
    responses(
        (status = 200, description = "Distância, duração e contagens", body = SummaryResponse),
        (status = 404, description = "Sessão não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_session_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SummaryResponse>, AppError> {
    let session = visible_session(&app_state, &user, id).await?;
    let summary = route_aggregator::summarize(&session);
    Ok(Json(SummaryResponse { success: true, summary }))
}

// Busca a sessão e confere se o usuário pode vê-la
pub(crate) async fn visible_session(
    app_state: &AppState,
    user: &crate::models::auth::User,
    id: Uuid,
) -> Result<WorkSession, AppError> {
    let session = app_state.session_service.get_by_id(id).await?;
    AuthService::ensure_can_view_client(user, &session.client_id)?;
    Ok(session)
}

// ---
// Handlers: escrita (trabalhador)
// ---

#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "Sessions",
    request_body = CreateSessionPayload,
    responses(
        (status = 201, description = "Sessão registrada", body = SessionResponse),
        (status = 400, description = "Campos ausentes, rota fora de ordem ou duração divergente"),
        (status = 409, description = "Foto de `photoIds` já pertence a outra sessão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_session(
    State(app_state): State<AppState>,
    RequireRole(worker, _): RequireWorker,
    Json(payload): Json<CreateSessionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let new_session = NewWorkSession::try_from(payload)?;
    let session = app_state.session_service.create(new_session, Some(worker.id)).await?;

    Ok((StatusCode::CREATED, Json(SessionResponse { success: true, session })))
}

#[utoipa::path(
    post,
    path = "/api/sessions/start",
    tag = "Sessions",
    request_body = StartSessionPayload,
    responses(
        (status = 201, description = "Sessão ao vivo aberta", body = SessionResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn start_session(
    State(app_state): State<AppState>,
    RequireRole(worker, _): RequireWorker,
    Json(payload): Json<StartSessionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let session = app_state.session_service.start(Some(worker.id), payload).await?;
    Ok((StatusCode::CREATED, Json(SessionResponse { success: true, session })))
}

#[utoipa::path(
    post,
    path = "/api/sessions/{id}/route",
    tag = "Sessions",
    request_body = AppendRoutePayload,
    params(
        ("id" = Uuid, Path, description = "ID da sessão")
    ),
    responses(
        (status = 200, description = "Pontos anexados", body = RouteAppendResponse),
        (status = 409, description = "Sessão já encerrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn append_route(
    State(app_state): State<AppState>,
    _worker: RequireWorker,
    Path(id): Path<Uuid>,
    Json(payload): Json<AppendRoutePayload>,
) -> Result<Json<RouteAppendResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let result = app_state.session_service.append_route_points(id, payload.points).await?;
    Ok(Json(RouteAppendResponse { success: true, result }))
}

#[utoipa::path(
    post,
    path = "/api/sessions/{id}/finish",
    tag = "Sessions",
    request_body = CloseSessionPayload,
    params(
        ("id" = Uuid, Path, description = "ID da sessão")
    ),
    responses(
        (status = 200, description = "Sessão concluída", body = SessionResponse),
        (status = 409, description = "Sessão já encerrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn finish_session(
    State(app_state): State<AppState>,
    _worker: RequireWorker,
    Path(id): Path<Uuid>,
    payload: Option<Json<CloseSessionPayload>>,
) -> Result<Json<SessionResponse>, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let session = app_state.session_service.finish(id, payload).await?;
    Ok(Json(SessionResponse { success: true, session }))
}

#[utoipa::path(
    post,
    path = "/api/sessions/{id}/cancel",
    tag = "Sessions",
    request_body = CloseSessionPayload,
    params(
        ("id" = Uuid, Path, description = "ID da sessão")
    ),
    responses(
        (status = 200, description = "Sessão cancelada", body = SessionResponse),
        (status = 409, description = "Sessão já encerrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_session(
    State(app_state): State<AppState>,
    _worker: RequireWorker,
    Path(id): Path<Uuid>,
    payload: Option<Json<CloseSessionPayload>>,
) -> Result<Json<SessionResponse>, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let session = app_state.session_service.cancel(id, payload).await?;
    Ok(Json(SessionResponse { success: true, session }))
}

#[utoipa::path(
    put,
    path = "/api/sessions/{id}",
    tag = "Sessions",
    request_body = UpdateSessionPayload,
    params(
        ("id" = Uuid, Path, description = "ID da sessão")
    ),
    responses(
        (status = 200, description = "Sessão atualizada", body = SessionResponse),
        (status = 404, description = "Sessão não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_session(
    State(app_state): State<AppState>,
    _worker: RequireWorker,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSessionPayload>,
) -> Result<Json<SessionResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let session = app_state.session_service.update(id, payload).await?;
    Ok(Json(SessionResponse { success: true, session }))
}

#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    tag = "Sessions",
    params(
        ("id" = Uuid, Path, description = "ID da sessão")
    ),
    responses(
        (status = 200, description = "Sessão removida; as fotos ficam sem vínculo", body = MessageResponse),
        (status = 404, description = "Sessão não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_session(
    State(app_state): State<AppState>,
    _worker: RequireWorker,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    app_state.session_service.delete(id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Sessão removida.".into(),
    }))
}
