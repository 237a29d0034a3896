// src/services/photo_service.rs

use std::sync::Arc;

use chrono::Utc;
use sqlx::{types::Json, SqlitePool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PhotoRepository, SessionRepository, WriteGate},
    models::photo::{Attachment, NewPhoto, Photo, PhotoRow, PhotoUpload},
    services::file_storage::FileStorage,
};

#[derive(Clone)]
pub struct PhotoService {
    pool: SqlitePool,
    repo: PhotoRepository,
    session_repo: SessionRepository,
    storage: Arc<dyn FileStorage>,
    write_gate: WriteGate,
}

impl PhotoService {
    pub fn new(
        pool: SqlitePool,
        repo: PhotoRepository,
        session_repo: SessionRepository,
        storage: Arc<dyn FileStorage>,
        write_gate: WriteGate,
    ) -> Self {
        Self { pool, repo, session_repo, storage, write_gate }
    }

    /// Grava o binário e depois o registro. Se o registro falhar, o arquivo é descartado.
    pub async fn upload(&self, original_name: &str, bytes: &[u8], mut input: NewPhoto) -> Result<PhotoUpload, AppError> {
        let stored = self.storage.store(original_name, bytes).await?;

        input.filename = stored.filename.clone();
        input.url = stored.url;
        input.stored_locally = true;
        input.original_name = Some(original_name.to_string());
        input.metadata.size = Some(stored.size);

        match self.add(input).await {
            Ok(upload) => Ok(upload),
            Err(e) => {
                if let Err(cleanup) = self.storage.remove(&stored.filename).await {
                    tracing::warn!("🧹 Não foi possível remover {} após falha: {}", stored.filename, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Registra a foto e, se houver `session_id`, tenta ligá-la à sessão.
    ///
    /// A foto é gravada primeiro, sozinha. Uma sessão inexistente não desfaz o
    /// registro: o resultado volta com `Attachment::session_not_found`.
    pub async fn add(&self, input: NewPhoto) -> Result<PhotoUpload, AppError> {
        let row = PhotoRow {
            id: Uuid::new_v4(),
            session_id: None,
            filename: input.filename,
            original_name: input.original_name,
            url: input.url,
            stored_locally: input.stored_locally,
            description: input.description,
            lat: input.location.map(|l| l.lat),
            lng: input.location.map(|l| l.lng),
            metadata: Json(input.metadata),
            uploaded_by: input.uploaded_by,
            taken_at: input.taken_at,
            uploaded_at: Utc::now(),
        };

        {
            let _guard = self.write_gate.acquire().await;
            self.repo.insert(&self.pool, &row).await?;
        }
        tracing::info!("📷 Foto {} registrada ({})", row.id, row.filename);

        let attachment = match input.session_id {
            Some(session_id) => self.attach_to_session(row.id, session_id).await?,
            None => Attachment::not_requested(),
        };

        let photo = self.get(row.id).await?;
        Ok(PhotoUpload { photo, attachment })
    }

    pub async fn attach_to_session(&self, photo_id: Uuid, session_id: Uuid) -> Result<Attachment, AppError> {
        let _guard = self.write_gate.acquire().await;
        let mut tx = self.pool.begin().await?;

        if self.repo.find(&mut *tx, photo_id).await?.is_none() {
            return Err(photo_not_found(photo_id));
        }

        if !self.session_repo.exists(&mut *tx, session_id).await? {
            tracing::warn!("⚠️ Foto {} ficou solta: sessão {} não existe", photo_id, session_id);
            return Ok(Attachment::session_not_found(session_id));
        }

        self.repo.set_session(&mut *tx, photo_id, Some(session_id)).await?;
        tx.commit().await?;

        tracing::info!("🔗 Foto {} ligada à sessão {}", photo_id, session_id);
        Ok(Attachment::attached(session_id))
    }

    /// Fotos da sessão na ordem de envio.
    pub async fn list_by_session(&self, session_id: Uuid) -> Result<Vec<Photo>, AppError> {
        let rows = self.repo.list_by_session(&self.pool, session_id).await?;
        Ok(rows.into_iter().map(Photo::from).collect())
    }

    pub async fn get(&self, photo_id: Uuid) -> Result<Photo, AppError> {
        self.repo
            .find(&self.pool, photo_id)
            .await?
            .map(Photo::from)
            .ok_or_else(|| photo_not_found(photo_id))
    }

    /// Remove o registro e o arquivo. Falha ao apagar o arquivo só gera log.
    ///
    /// O arquivo só sai do disco se foi gravado pelo upload desta foto e se
    /// nenhum outro registro aponta para ele.
    pub async fn delete(&self, photo_id: Uuid) -> Result<(), AppError> {
        let orphaned_file = {
            let _guard = self.write_gate.acquire().await;
            let mut tx = self.pool.begin().await?;

            let row = self.repo
                .find(&mut *tx, photo_id)
                .await?
                .ok_or_else(|| photo_not_found(photo_id))?;

            self.repo.delete(&mut *tx, photo_id).await?;

            let still_shared = self.repo.count_by_filename(&mut *tx, &row.filename).await? > 0;
            tx.commit().await?;

            if still_shared {
                tracing::debug!("Arquivo {} continua em uso por outra foto", row.filename);
            }
            (row.stored_locally && !still_shared).then_some(row.filename)
        };

        if let Some(filename) = orphaned_file {
            if let Err(e) = self.storage.remove(&filename).await {
                tracing::warn!("🧹 Arquivo {} não pôde ser removido: {}", filename, e);
            }
        }

        tracing::info!("🗑️ Foto {} removida", photo_id);
        Ok(())
    }
}

fn photo_not_found(id: Uuid) -> AppError {
    AppError::ResourceNotFound(format!("Foto {}", id))
}
