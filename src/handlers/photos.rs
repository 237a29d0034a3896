// src/handlers/photos.rs

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::sessions::visible_session,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, RequireWorker},
    },
    models::{
        auth::Role,
        photo::{Attachment, AttachPhotoPayload, GeoPoint, NewPhoto, Photo, PhotoUploadResponse},
        session::MessageResponse,
    },
};

// Só para a documentação: o corpo real é lido campo a campo do multipart
#[allow(dead_code)]
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUploadForm {
    #[schema(value_type = String, format = Binary)]
    photo: Vec<u8>,
    session_id: Option<Uuid>,
    description: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    taken_at: Option<DateTime<Utc>>,
    device: Option<String>,
    resolution: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PhotoListResponse {
    pub success: bool,
    pub photos: Vec<Photo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttachmentResponse {
    pub success: bool,
    pub attachment: Attachment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

// Falha parcial (foto salva, sessão inexistente) responde 207
fn attachment_status(attachment: &Attachment) -> StatusCode {
    if attachment.is_partial_failure() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    }
}

#[utoipa::path(
    post,
    path = "/api/photos",
    tag = "Photos",
    request_body(content = PhotoUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Foto salva (e ligada à sessão, se pedida)", body = PhotoUploadResponse),
        (status = 207, description = "Foto salva, mas a sessão não existe", body = PhotoUploadResponse),
        (status = 400, description = "Arquivo ausente ou campos inválidos"),
        (status = 413, description = "Arquivo grande demais")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_photo(
    State(app_state): State<AppState>,
    RequireRole(worker, _): RequireWorker,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut input = NewPhoto {
        uploaded_by: Some(worker.id),
        ..Default::default()
    };
    let mut lat: Option<f64> = None;
    let mut lng: Option<f64> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "photo" {
            let is_image = field
                .content_type()
                .map(|ct| ct.starts_with("image/"))
                .unwrap_or(false);
            if !is_image {
                return Err(AppError::InvalidField("photo", "Apenas imagens são aceitas.".into()));
            }
            let original_name = field.file_name().unwrap_or("photo.jpg").to_string();
            let bytes = field.bytes().await?;
            file = Some((original_name, bytes.to_vec()));
            continue;
        }

        let value = field.text().await?;
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match name.as_str() {
            "sessionId" => {
                let id = Uuid::parse_str(value)
                    .map_err(|_| AppError::InvalidField("sessionId", "Identificador de sessão inválido.".into()))?;
                input.session_id = Some(id);
            }
            "description" => input.description = Some(value.to_string()),
            "lat" => lat = Some(parse_coordinate("lat", value, 90.0)?),
            "lng" => lng = Some(parse_coordinate("lng", value, 180.0)?),
            "takenAt" => {
                let taken_at = DateTime::parse_from_rfc3339(value)
                    .map_err(|_| AppError::InvalidField("takenAt", "Data inválida (use RFC 3339).".into()))?;
                input.taken_at = Some(taken_at.with_timezone(&Utc));
            }
            "device" => input.metadata.device = Some(value.to_string()),
            "resolution" => input.metadata.resolution = Some(value.to_string()),
            other => tracing::debug!("Campo de upload ignorado: {}", other),
        }
    }

    let (original_name, bytes) = file
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| AppError::InvalidField("photo", "Envie o arquivo da foto.".into()))?;

    input.location = match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
        (None, None) => None,
        _ => {
            return Err(AppError::InvalidField("lat", "Informe latitude e longitude juntas.".into()));
        }
    };

    let upload = app_state.photo_service.upload(&original_name, &bytes, input).await?;

    let status = if upload.attachment.is_partial_failure() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(PhotoUploadResponse::from(upload))))
}

fn parse_coordinate(field: &'static str, raw: &str, limit: f64) -> Result<f64, AppError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.abs() <= limit => Ok(v),
        _ => Err(AppError::InvalidField(field, "Coordenada inválida.".into())),
    }
}

#[utoipa::path(
    get,
    path = "/api/photos/session/{session_id}",
    tag = "Photos",
    params(
        ("session_id" = Uuid, Path, description = "ID da sessão")
    ),
    responses(
        (status = 200, description = "Fotos da sessão, na ordem de envio", body = PhotoListResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_session_photos(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<PhotoListResponse>, AppError> {
    // Clientes só enxergam fotos das próprias sessões
    if user.role == Role::Client {
        visible_session(&app_state, &user, session_id).await?;
    }

    let photos = app_state.photo_service.list_by_session(session_id).await?;
    Ok(Json(PhotoListResponse { success: true, photos }))
}

#[utoipa::path(
    post,
    path = "/api/photos/{id}/attach",
    tag = "Photos",
    request_body = AttachPhotoPayload,
    params(
        ("id" = Uuid, Path, description = "ID da foto")
    ),
    responses(
        (status = 200, description = "Foto ligada à sessão", body = AttachmentResponse),
        (status = 207, description = "A sessão não existe; a foto continua solta", body = AttachmentResponse),
        (status = 404, description = "Foto não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn attach_photo(
    State(app_state): State<AppState>,
    _worker: RequireWorker,
    Path(photo_id): Path<Uuid>,
    Json(payload): Json<AttachPhotoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let attachment = app_state
        .photo_service
        .attach_to_session(photo_id, payload.session_id)
        .await?;

    let warning = attachment
        .is_partial_failure()
        .then(|| format!("A sessão {} não existe; a foto continua sem vínculo.", payload.session_id));

    Ok((
        attachment_status(&attachment),
        Json(AttachmentResponse { success: true, attachment, warning }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/photos/{id}",
    tag = "Photos",
    params(
        ("id" = Uuid, Path, description = "ID da foto")
    ),
    responses(
        (status = 200, description = "Foto e arquivo removidos", body = MessageResponse),
        (status = 404, description = "Foto não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_photo(
    State(app_state): State<AppState>,
    _worker: RequireWorker,
    Path(photo_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    app_state.photo_service.delete(photo_id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Foto removida.".into(),
    }))
}
