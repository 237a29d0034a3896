// src/handlers/admin.rs

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
    middleware::rbac::{RequireAdmin, RequireRole},
    models::{
        auth::{CreateUserPayload, User, UserResponse},
        session::MessageResponse,
    },
};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<User>,
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "Todas as contas", body = UserListResponse),
        (status = 403, description = "Somente administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<UserListResponse>, AppError> {
    let users = app_state.user_repo.list_all().await?;
    Ok(Json(UserListResponse { success: true, users }))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "Admin",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Conta criada", body = UserResponse),
        (status = 409, description = "E-mail ou clientId já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    RequireRole(admin, _): RequireAdmin,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let user = app_state.auth_service.create_user(payload).await?;
    tracing::info!("🛡️ {} criou a conta {}", admin.email, user.email);

    Ok((StatusCode::CREATED, Json(UserResponse { success: true, user })))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(
        ("id" = Uuid, Path, description = "ID do usuário")
    ),
    responses(
        (status = 200, description = "Conta removida", body = MessageResponse),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    RequireRole(admin, _): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if admin.id == id {
        return Err(AppError::Forbidden("Você não pode remover a própria conta.".into()));
    }

    if app_state.user_repo.delete(id).await? == 0 {
        return Err(AppError::ResourceNotFound(format!("Usuário {}", id)));
    }

    tracing::info!("🛡️ {} removeu o usuário {}", admin.email, id);
    Ok(Json(MessageResponse {
        success: true,
        message: "Usuário removido.".into(),
    }))
}
