// src/handlers/clients.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireWorker},
    models::{
        auth::{ClientSummary, Role},
        report::ClientStats,
    },
    services::auth::AuthService,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ClientListResponse {
    pub success: bool,
    pub clients: Vec<ClientSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: ClientStats,
}

// Lista de clientes para o trabalhador escolher ao abrir uma sessão
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    responses(
        (status = 200, description = "Contas de cliente", body = ClientListResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    _worker: RequireWorker,
) -> Result<Json<ClientListResponse>, AppError> {
    let clients = app_state
        .user_repo
        .list_by_role(Role::Client)
        .await?
        .into_iter()
        .map(ClientSummary::from)
        .collect();

    Ok(Json(ClientListResponse { success: true, clients }))
}

#[utoipa::path(
    get,
    path = "/api/stats/{client_id}",
    tag = "Clients",
    params(
        ("client_id" = String, Path, description = "Identificador do cliente")
    ),
    responses(
        (status = 200, description = "Totais do cliente", body = StatsResponse),
        (status = 403, description = "Cliente tentando ver dados de outro")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client_stats(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(client_id): Path<String>,
) -> Result<Json<StatsResponse>, AppError> {
    AuthService::ensure_can_view_client(&user, &client_id)?;

    let stats = app_state.session_service.client_stats(&client_id).await?;
    Ok(Json(StatsResponse { success: true, stats }))
}
