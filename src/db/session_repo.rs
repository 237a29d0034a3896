// src/db/session_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::session::{RoutePoint, WorkSessionRow},
};

const SESSION_COLUMNS: &str = r#"
    id, worker_id, client_id, client_name, start_time, end_time,
    duration, notes, status, created_at, updated_at
"#;

#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  SESSÕES
    // =========================================================================

    pub async fn insert<'e, E>(&self, executor: E, row: &WorkSessionRow) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO work_sessions (
                id, worker_id, client_id, client_name, start_time, end_time,
                duration, notes, status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
            .bind(row.id)
            .bind(row.worker_id)
            .bind(&row.client_id)
            .bind(&row.client_name)
            .bind(row.start_time)
            .bind(row.end_time)
            .bind(row.duration)
            .bind(&row.notes)
            .bind(row.status)
            .bind(row.created_at)
            .bind(row.updated_at)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn find<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<WorkSessionRow>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM work_sessions WHERE id = ?");
        let row = sqlx::query_as::<_, WorkSessionRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn exists<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM work_sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(found.is_some())
    }

    // Mais recentes primeiro (contrato da listagem)
    pub async fn list_by_client(&self, client_id: &str) -> Result<Vec<WorkSessionRow>, AppError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM work_sessions
             WHERE client_id = ?
             ORDER BY start_time DESC, created_at DESC"
        );
        let rows = sqlx::query_as::<_, WorkSessionRow>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_all(&self) -> Result<Vec<WorkSessionRow>, AppError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM work_sessions ORDER BY start_time DESC, created_at DESC"
        );
        let rows = sqlx::query_as::<_, WorkSessionRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn update<'e, E>(&self, executor: E, row: &WorkSessionRow) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            UPDATE work_sessions
            SET client_id = ?, client_name = ?, start_time = ?, end_time = ?,
                duration = ?, notes = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
            .bind(&row.client_id)
            .bind(&row.client_name)
            .bind(row.start_time)
            .bind(row.end_time)
            .bind(row.duration)
            .bind(&row.notes)
            .bind(row.status)
            .bind(row.updated_at)
            .bind(row.id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM work_sessions WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  ROTA
    // =========================================================================

    pub async fn insert_route_point<'e, E>(
        &self,
        executor: E,
        session_id: Uuid,
        seq: i64,
        point: &RoutePoint,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO route_points (session_id, seq, lat, lng, recorded_at, accuracy)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
            .bind(session_id)
            .bind(seq)
            .bind(point.lat)
            .bind(point.lng)
            .bind(point.timestamp)
            .bind(point.accuracy)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn list_route<'e, E>(&self, executor: E, session_id: Uuid) -> Result<Vec<RoutePoint>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let points = sqlx::query_as::<_, RoutePoint>(
            r#"
            SELECT lat, lng, recorded_at AS "timestamp", accuracy
            FROM route_points
            WHERE session_id = ?
            ORDER BY seq ASC
            "#,
        )
            .bind(session_id)
            .fetch_all(executor)
            .await?;

        Ok(points)
    }

    // Último ponto gravado: (seq, horário). None se a rota estiver vazia.
    pub async fn route_tail<'e, E>(
        &self,
        executor: E,
        session_id: Uuid,
    ) -> Result<Option<(i64, DateTime<Utc>)>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let tail = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            "SELECT seq, recorded_at FROM route_points WHERE session_id = ? ORDER BY seq DESC LIMIT 1",
        )
            .bind(session_id)
            .fetch_optional(executor)
            .await?;

        Ok(tail)
    }

    pub async fn delete_route<'e, E>(&self, executor: E, session_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("DELETE FROM route_points WHERE session_id = ?")
            .bind(session_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
