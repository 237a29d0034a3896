// src/models/photo.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    #[schema(example = 52.2310)]
    pub lat: f64,
    #[schema(example = 21.0140)]
    pub lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PhotoMetadata {
    #[schema(example = "Pixel 7")]
    pub device: Option<String>,
    #[schema(example = "4032x3024")]
    pub resolution: Option<String>,
    // Bytes
    pub size: Option<i64>,
}

// Linha da tabela photos, como o SQLite devolve
#[derive(Debug, Clone, FromRow)]
pub struct PhotoRow {
    pub id: Uuid,
    pub session_id: Option<Uuid>,
    pub filename: String,
    pub original_name: Option<String>,
    pub url: String,
    pub stored_locally: bool,
    pub description: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub metadata: Json<PhotoMetadata>,
    pub uploaded_by: Option<Uuid>,
    pub taken_at: Option<DateTime<Utc>>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    // Referência fraca: a foto sobrevive à sessão
    pub session_id: Option<Uuid>,
    #[schema(example = "1705306500000-3f2a9c1e-montaz.jpg")]
    pub filename: String,
    pub original_name: Option<String>,
    #[schema(example = "/uploads/1705306500000-3f2a9c1e-montaz.jpg")]
    pub url: String,
    #[schema(example = "Montaż instalacji")]
    pub description: Option<String>,
    pub location: Option<GeoPoint>,
    pub metadata: PhotoMetadata,
    pub uploaded_by: Option<Uuid>,
    pub taken_at: Option<DateTime<Utc>>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<PhotoRow> for Photo {
    fn from(row: PhotoRow) -> Self {
        let location = match (row.lat, row.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        };

        Self {
            id: row.id,
            session_id: row.session_id,
            filename: row.filename,
            original_name: row.original_name,
            url: row.url,
            description: row.description,
            location,
            metadata: row.metadata.0,
            uploaded_by: row.uploaded_by,
            taken_at: row.taken_at,
            uploaded_at: row.uploaded_at,
        }
    }
}

// Entrada do PhotoStore: o arquivo (se houver) já foi gravado
#[derive(Debug, Clone, Default)]
pub struct NewPhoto {
    pub session_id: Option<Uuid>,
    pub filename: String,
    pub original_name: Option<String>,
    pub url: String,
    // Ligado só pelo upload: o arquivo em disco é desta foto
    pub stored_locally: bool,
    pub description: Option<String>,
    pub location: Option<GeoPoint>,
    pub metadata: PhotoMetadata,
    pub uploaded_by: Option<Uuid>,
    pub taken_at: Option<DateTime<Utc>>,
}

// Resultado da ligação foto -> sessão.
// `SessionNotFound` é a falha parcial: a foto ficou salva, mas solta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentStatus {
    NotRequested,
    Attached,
    SessionNotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub status: AttachmentStatus,
    pub session_id: Option<Uuid>,
}

impl Attachment {
    pub fn not_requested() -> Self {
        Self { status: AttachmentStatus::NotRequested, session_id: None }
    }

    pub fn attached(session_id: Uuid) -> Self {
        Self { status: AttachmentStatus::Attached, session_id: Some(session_id) }
    }

    pub fn session_not_found(session_id: Uuid) -> Self {
        Self { status: AttachmentStatus::SessionNotFound, session_id: Some(session_id) }
    }

    pub fn is_partial_failure(&self) -> bool {
        self.status == AttachmentStatus::SessionNotFound
    }
}

#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub photo: Photo,
    pub attachment: Attachment,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PhotoUploadResponse {
    pub success: bool,
    pub photo: Photo,
    pub attachment: Attachment,
    // Preenchido apenas em caso de falha parcial
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<PhotoUpload> for PhotoUploadResponse {
    fn from(upload: PhotoUpload) -> Self {
        let warning = match (upload.attachment.status, upload.attachment.session_id) {
            (AttachmentStatus::SessionNotFound, Some(session_id)) => Some(format!(
                "A foto foi salva, mas a sessão {} não existe; ela ficou sem vínculo.",
                session_id
            )),
            _ => None,
        };

        Self {
            success: true,
            photo: upload.photo,
            attachment: upload.attachment,
            warning,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachPhotoPayload {
    pub session_id: Uuid,
}
