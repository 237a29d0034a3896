// src/db/photo_repo.rs

use sqlx::{types::Json, Executor, Sqlite};
use uuid::Uuid;

use crate::{common::error::AppError, models::photo::PhotoRow};

const PHOTO_COLUMNS: &str = r#"
    id, session_id, filename, original_name, url, stored_locally, description,
    lat, lng, metadata, uploaded_by, taken_at, uploaded_at
"#;

// Sem pool própria: toda consulta recebe o executor de quem chama,
// para que as fotos entrem nas mesmas transações das sessões.
#[derive(Clone, Default)]
pub struct PhotoRepository;

impl PhotoRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(&self, executor: E, row: &PhotoRow) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO photos (
                id, session_id, filename, original_name, url, stored_locally, description,
                lat, lng, metadata, uploaded_by, taken_at, uploaded_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
            .bind(row.id)
            .bind(row.session_id)
            .bind(&row.filename)
            .bind(&row.original_name)
            .bind(&row.url)
            .bind(row.stored_locally)
            .bind(&row.description)
            .bind(row.lat)
            .bind(row.lng)
            .bind(Json(&row.metadata.0))
            .bind(row.uploaded_by)
            .bind(row.taken_at)
            .bind(row.uploaded_at)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn find<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<PhotoRow>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = ?");
        let row = sqlx::query_as::<_, PhotoRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    // Ordem de envio: é a ordem em que aparecem na sessão e no relatório
    pub async fn list_by_session<'e, E>(&self, executor: E, session_id: Uuid) -> Result<Vec<PhotoRow>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE session_id = ? ORDER BY uploaded_at ASC, rowid ASC"
        );
        let rows = sqlx::query_as::<_, PhotoRow>(&sql)
            .bind(session_id)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    // Retorna quantas linhas mudaram (0 = foto inexistente)
    pub async fn set_session<'e, E>(
        &self,
        executor: E,
        photo_id: Uuid,
        session_id: Option<Uuid>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE photos SET session_id = ? WHERE id = ?")
            .bind(session_id)
            .bind(photo_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // As fotos de uma sessão apagada continuam existindo, só perdem o vínculo
    pub async fn detach_all<'e, E>(&self, executor: E, session_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE photos SET session_id = NULL WHERE session_id = ?")
            .bind(session_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // Quantos registros ainda apontam para o mesmo arquivo
    pub async fn count_by_filename<'e, E>(&self, executor: E, filename: &str) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM photos WHERE filename = ?")
            .bind(filename)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM photos WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
