// src/services/session_service.rs

use chrono::{DateTime, Utc};
use sqlx::{types::Json, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PhotoRepository, SessionRepository, WriteGate},
    models::{
        photo::{Photo, PhotoMetadata, PhotoRow},
        report::{ClientStats, SessionSummary},
        session::{
            CloseSessionPayload, NewWorkSession, RouteAppendResult, RoutePoint, SessionPhoto,
            SessionStatus, StartSessionPayload, UpdateSessionPayload, WorkSession, WorkSessionRow,
        },
    },
    services::route_aggregator,
};

/// Diferença máxima aceita entre a duração enviada pelo cliente e a calculada.
pub const DURATION_TOLERANCE_SECS: i64 = 60;

#[derive(Clone)]
pub struct SessionService {
    pool: SqlitePool,
    repo: SessionRepository,
    photo_repo: PhotoRepository,
    write_gate: WriteGate,
}

impl SessionService {
    pub fn new(
        pool: SqlitePool,
        repo: SessionRepository,
        photo_repo: PhotoRepository,
        write_gate: WriteGate,
    ) -> Self {
        Self { pool, repo, photo_repo, write_gate }
    }

    // =========================================================================
    //  CRIAÇÃO E LEITURA
    // =========================================================================

    /// Grava a sessão, a rota e as fotos numa única transação.
    pub async fn create(&self, new: NewWorkSession, worker_id: Option<Uuid>) -> Result<WorkSession, AppError> {
        // Sessões em andamento nascem por `start`, sem término
        if new.status == SessionStatus::InProgress {
            return Err(AppError::InvalidField(
                "status",
                "Use /sessions/start para abrir uma sessão em andamento.".into(),
            ));
        }

        let duration = derive_duration(new.start_time, new.end_time)?;
        if let Some(declared) = new.declared_duration {
            check_declared_duration(declared, duration)?;
        }
        ensure_chronological(&new.route, None)?;

        let now = Utc::now();
        let row = WorkSessionRow {
            id: Uuid::new_v4(),
            worker_id,
            client_id: new.client_id.trim().to_string(),
            client_name: new.client_name.trim().to_string(),
            start_time: new.start_time,
            end_time: Some(new.end_time),
            duration,
            notes: new.notes,
            status: new.status,
            created_at: now,
            updated_at: now,
        };

        let _guard = self.write_gate.acquire().await;
        let mut tx = self.pool.begin().await?;

        self.repo.insert(&mut *tx, &row).await?;

        for (i, point) in new.route.iter().enumerate() {
            self.repo.insert_route_point(&mut *tx, row.id, i as i64 + 1, point).await?;
        }

        // Fotos já hospedadas, enviadas por URL junto com a sessão
        for reference in &new.photos {
            let photo = PhotoRow {
                id: Uuid::new_v4(),
                session_id: Some(row.id),
                filename: filename_from_url(&reference.url),
                original_name: None,
                url: reference.url.clone(),
                // O arquivo (se for nosso) pertence ao registro do upload
                stored_locally: false,
                description: reference.description.clone(),
                lat: reference.lat,
                lng: reference.lng,
                metadata: Json(PhotoMetadata::default()),
                uploaded_by: worker_id,
                taken_at: reference.timestamp,
                uploaded_at: now,
            };
            self.photo_repo.insert(&mut *tx, &photo).await?;
        }

        // Fotos soltas enviadas antes da sessão existir
        for photo_id in &new.photo_ids {
            let photo = self.photo_repo
                .find(&mut *tx, *photo_id)
                .await?
                .ok_or_else(|| AppError::ResourceNotFound(format!("Foto {}", photo_id)))?;
            if photo.session_id.is_some() {
                return Err(AppError::PhotoAlreadyLinked(*photo_id));
            }
            self.photo_repo.set_session(&mut *tx, *photo_id, Some(row.id)).await?;
        }

        tx.commit().await?;
        drop(_guard);

        tracing::info!(
            "🗂️ Sessão {} criada para {} ({} pontos, {}s)",
            row.id,
            row.client_id,
            new.route.len(),
            duration
        );

        self.get_by_id(row.id).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<WorkSession, AppError> {
        let mut conn = self.pool.acquire().await?;
        let row = self.repo
            .find(&mut *conn, id)
            .await?
            .ok_or_else(|| session_not_found(id))?;
        self.assemble(&mut conn, row).await
    }

    /// Sessões do cliente, mais recentes primeiro.
    pub async fn list_by_client(&self, client_id: &str) -> Result<Vec<WorkSession>, AppError> {
        let rows = self.repo.list_by_client(client_id).await?;
        self.assemble_all(rows).await
    }

    pub async fn list_all(&self) -> Result<Vec<WorkSession>, AppError> {
        let rows = self.repo.list_all().await?;
        self.assemble_all(rows).await
    }

    async fn assemble_all(&self, rows: Vec<WorkSessionRow>) -> Result<Vec<WorkSession>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            sessions.push(self.assemble(&mut conn, row).await?);
        }
        Ok(sessions)
    }

    // Junta rota e fotos à linha da sessão
    async fn assemble(&self, conn: &mut SqliteConnection, row: WorkSessionRow) -> Result<WorkSession, AppError> {
        let route = self.repo.list_route(&mut *conn, row.id).await?;
        let photos = self.photo_repo
            .list_by_session(&mut *conn, row.id)
            .await?
            .into_iter()
            .map(Photo::from)
            .map(|p| SessionPhoto::from(&p))
            .collect();
        Ok(WorkSession::from_parts(row, route, photos))
    }

    // =========================================================================
    //  ALTERAÇÃO E REMOÇÃO
    // =========================================================================

    /// Merge raso dos campos enviados. A duração é sempre recalculada.
    pub async fn update(&self, id: Uuid, patch: UpdateSessionPayload) -> Result<WorkSession, AppError> {
        if let Some(route) = &patch.route {
            ensure_chronological(route, None)?;
        }

        let _guard = self.write_gate.acquire().await;
        let mut tx = self.pool.begin().await?;

        let mut row = self.repo
            .find(&mut *tx, id)
            .await?
            .ok_or_else(|| session_not_found(id))?;

        if let Some(client_id) = patch.client_id {
            row.client_id = client_id.trim().to_string();
        }
        if let Some(client_name) = patch.client_name {
            row.client_name = client_name.trim().to_string();
        }
        if let Some(start_time) = patch.start_time {
            row.start_time = start_time;
        }
        if patch.end_time.is_some() {
            row.end_time = patch.end_time;
        }
        if patch.notes.is_some() {
            row.notes = patch.notes;
        }
        if let Some(status) = patch.status {
            row.status = status;
        }

        row.duration = match row.end_time {
            Some(end_time) => derive_duration(row.start_time, end_time)?,
            None if row.status == SessionStatus::Completed => {
                return Err(AppError::InvalidField(
                    "endTime",
                    "Sessões concluídas precisam de horário de término.".into(),
                ));
            }
            None => 0,
        };
        if let Some(declared) = patch.duration {
            check_declared_duration(declared, row.duration)?;
        }
        row.updated_at = Utc::now();

        self.repo.update(&mut *tx, &row).await?;

        if let Some(route) = &patch.route {
            self.repo.delete_route(&mut *tx, id).await?;
            for (i, point) in route.iter().enumerate() {
                self.repo.insert_route_point(&mut *tx, id, i as i64 + 1, point).await?;
            }
        }

        tx.commit().await?;
        drop(_guard);

        tracing::info!("✏️ Sessão {} atualizada", id);
        self.get_by_id(id).await
    }

    /// Apaga a sessão e a rota. As fotos continuam, só perdem o vínculo.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let _guard = self.write_gate.acquire().await;
        let mut tx = self.pool.begin().await?;

        let detached = self.photo_repo.detach_all(&mut *tx, id).await?;
        self.repo.delete_route(&mut *tx, id).await?;
        if self.repo.delete(&mut *tx, id).await? == 0 {
            return Err(session_not_found(id));
        }

        tx.commit().await?;

        tracing::info!("🗑️ Sessão {} removida ({} fotos desvinculadas)", id, detached);
        Ok(())
    }

    // =========================================================================
    //  SESSÃO AO VIVO
    // =========================================================================

    pub async fn start(&self, worker_id: Option<Uuid>, payload: StartSessionPayload) -> Result<WorkSession, AppError> {
        let now = Utc::now();
        let row = WorkSessionRow {
            id: Uuid::new_v4(),
            worker_id,
            client_id: payload.client_id.trim().to_string(),
            client_name: payload.client_name.trim().to_string(),
            start_time: payload.start_time.unwrap_or(now),
            end_time: None,
            duration: 0,
            notes: payload.notes,
            status: SessionStatus::InProgress,
            created_at: now,
            updated_at: now,
        };

        {
            let _guard = self.write_gate.acquire().await;
            self.repo.insert(&self.pool, &row).await?;
        }

        tracing::info!("▶️ Sessão {} iniciada para {}", row.id, row.client_id);
        Ok(WorkSession::from_parts(row, Vec::new(), Vec::new()))
    }

    /// Acrescenta um lote de pontos ao fim da rota de uma sessão em andamento.
    pub async fn append_route_points(&self, id: Uuid, points: Vec<RoutePoint>) -> Result<RouteAppendResult, AppError> {
        let _guard = self.write_gate.acquire().await;
        let mut tx = self.pool.begin().await?;

        let mut row = self.repo
            .find(&mut *tx, id)
            .await?
            .ok_or_else(|| session_not_found(id))?;
        if row.status != SessionStatus::InProgress {
            return Err(AppError::SessionClosed(id));
        }

        let tail = self.repo.route_tail(&mut *tx, id).await?;
        ensure_chronological(&points, tail.map(|(_, at)| at))?;

        let mut seq = tail.map(|(seq, _)| seq).unwrap_or(0);
        for point in &points {
            seq += 1;
            self.repo.insert_route_point(&mut *tx, id, seq, point).await?;
        }

        row.updated_at = Utc::now();
        self.repo.update(&mut *tx, &row).await?;
        tx.commit().await?;

        tracing::debug!("📍 {} pontos anexados à sessão {}", points.len(), id);

        Ok(RouteAppendResult {
            session_id: id,
            appended: points.len(),
            point_count: seq,
        })
    }

    pub async fn finish(&self, id: Uuid, payload: CloseSessionPayload) -> Result<WorkSession, AppError> {
        self.close(id, payload, SessionStatus::Completed).await
    }

    pub async fn cancel(&self, id: Uuid, payload: CloseSessionPayload) -> Result<WorkSession, AppError> {
        self.close(id, payload, SessionStatus::Cancelled).await
    }

    async fn close(&self, id: Uuid, payload: CloseSessionPayload, status: SessionStatus) -> Result<WorkSession, AppError> {
        let _guard = self.write_gate.acquire().await;
        let mut tx = self.pool.begin().await?;

        let mut row = self.repo
            .find(&mut *tx, id)
            .await?
            .ok_or_else(|| session_not_found(id))?;
        if row.status != SessionStatus::InProgress {
            return Err(AppError::SessionClosed(id));
        }

        let end_time = payload.end_time.unwrap_or_else(Utc::now);
        row.duration = derive_duration(row.start_time, end_time)?;
        row.end_time = Some(end_time);
        row.status = status;
        if payload.notes.is_some() {
            row.notes = payload.notes;
        }
        row.updated_at = Utc::now();

        self.repo.update(&mut *tx, &row).await?;
        tx.commit().await?;
        drop(_guard);

        tracing::info!("⏹️ Sessão {} encerrada como {} ({}s)", id, status.as_str(), row.duration);
        self.get_by_id(id).await
    }

    // =========================================================================
    //  ESTATÍSTICAS
    // =========================================================================

    pub async fn summary(&self, id: Uuid) -> Result<SessionSummary, AppError> {
        let session = self.get_by_id(id).await?;
        Ok(route_aggregator::summarize(&session))
    }

    pub async fn client_stats(&self, client_id: &str) -> Result<ClientStats, AppError> {
        let sessions = self.list_by_client(client_id).await?;

        let total_seconds: i64 = sessions.iter().map(|s| s.duration).sum();
        let total_photos = sessions.iter().map(|s| s.photos.len()).sum();
        let total_distance: f64 = sessions
            .iter()
            .map(|s| route_aggregator::total_distance(&s.route))
            .sum();

        Ok(ClientStats {
            client_id: client_id.to_string(),
            total_sessions: sessions.len(),
            total_hours: round2(total_seconds as f64 / 3600.0),
            total_photos,
            total_distance_km: round2(total_distance),
            // A lista já vem da mais recente para a mais antiga
            last_session: sessions.into_iter().next(),
        })
    }
}

// --- Regras puras ---

/// `endTime - startTime` em segundos; término antes do início é inválido.
pub fn derive_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, AppError> {
    if end < start {
        return Err(AppError::InvalidField(
            "endTime",
            "O término não pode ser anterior ao início.".into(),
        ));
    }
    Ok((end - start).num_seconds())
}

pub fn check_declared_duration(declared: i64, derived: i64) -> Result<(), AppError> {
    if (declared - derived).abs() > DURATION_TOLERANCE_SECS {
        return Err(AppError::InvalidField(
            "duration",
            format!("A duração informada ({}s) não confere com início e término ({}s).", declared, derived),
        ));
    }
    Ok(())
}

/// Os horários da rota não podem voltar no tempo, nem em relação a `after`.
pub fn ensure_chronological(points: &[RoutePoint], after: Option<DateTime<Utc>>) -> Result<(), AppError> {
    let mut previous = after;
    for point in points {
        if let Some(prev) = previous {
            if point.timestamp < prev {
                return Err(AppError::InvalidField(
                    "route",
                    format!("Ponto fora de ordem em {}.", point.timestamp.to_rfc3339()),
                ));
            }
        }
        previous = Some(point.timestamp);
    }
    Ok(())
}

fn filename_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    match path.rsplit('/').next() {
        Some(last) if !last.is_empty() => last.to_string(),
        _ => "photo".to_string(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::ResourceNotFound(format!("Sessão {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::test_support::memory_pool, models::session::PhotoReference};
    use chrono::{Duration, TimeZone};

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, h, m, 0).unwrap()
    }

    fn point(lat: f64, lng: f64, time: DateTime<Utc>) -> RoutePoint {
        RoutePoint { lat, lng, timestamp: time, accuracy: 10.0 }
    }

    fn new_session(client_id: &str, day: u32) -> NewWorkSession {
        NewWorkSession {
            client_id: client_id.to_string(),
            client_name: "Jan Kowalski".into(),
            start_time: at(day, 7, 0),
            end_time: at(day, 15, 30),
            declared_duration: Some(30600),
            route: vec![
                point(52.2297, 21.0122, at(day, 7, 0)),
                point(52.2300, 21.0125, at(day, 7, 15)),
                point(52.2305, 21.0130, at(day, 7, 30)),
            ],
            photos: Vec::new(),
            photo_ids: Vec::new(),
            notes: Some("Instalacja".into()),
            status: SessionStatus::Completed,
        }
    }

    async fn service() -> SessionService {
        let pool = memory_pool().await;
        SessionService::new(
            pool.clone(),
            SessionRepository::new(pool),
            PhotoRepository::new(),
            WriteGate::new(),
        )
    }

    #[test]
    fn duration_rules() {
        assert_eq!(derive_duration(at(15, 7, 0), at(15, 15, 30)).unwrap(), 30600);
        assert!(matches!(
            derive_duration(at(15, 8, 0), at(15, 7, 0)),
            Err(AppError::InvalidField("endTime", _))
        ));
        assert!(check_declared_duration(30630, 30600).is_ok());
        assert!(matches!(
            check_declared_duration(3600, 30600),
            Err(AppError::InvalidField("duration", _))
        ));
    }

    #[test]
    fn route_must_move_forward_in_time() {
        let t = at(15, 7, 0);
        let ordered = vec![point(0.0, 0.0, t), point(0.0, 0.0, t), point(0.0, 0.0, t + Duration::minutes(1))];
        assert!(ensure_chronological(&ordered, None).is_ok());

        let reversed = vec![point(0.0, 0.0, t + Duration::minutes(1)), point(0.0, 0.0, t)];
        assert!(ensure_chronological(&reversed, None).is_err());

        // Um lote novo não pode começar antes do último ponto gravado
        assert!(ensure_chronological(&ordered, Some(t + Duration::hours(1))).is_err());
    }

    #[test]
    fn filename_comes_from_the_last_url_segment() {
        assert_eq!(filename_from_url("https://cdn.example.com/a/b/foto.jpg?x=1"), "foto.jpg");
        assert_eq!(filename_from_url("https://cdn.example.com/"), "photo");
    }

    #[tokio::test]
    async fn create_then_get_returns_the_same_session() {
        let service = service().await;
        let mut input = new_session("client_001", 15);
        input.photos.push(PhotoReference {
            url: "https://cdn.example.com/montaz.jpg".into(),
            description: Some("Montaż".into()),
            lat: Some(52.23),
            lng: Some(21.01),
            timestamp: Some(at(15, 9, 0)),
        });

        let created = service.create(input.clone(), None).await.unwrap();
        let fetched = service.get_by_id(created.id).await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.client_id, input.client_id);
        assert_eq!(fetched.duration, 30600);
        assert_eq!(fetched.route, input.route);
        assert_eq!(fetched.photos.len(), 1);
        assert_eq!(fetched.photos[0].url, "https://cdn.example.com/montaz.jpg");
        assert_eq!(fetched.photos[0].timestamp, at(15, 9, 0));
    }

    #[tokio::test]
    async fn create_rejects_a_mismatched_duration() {
        let service = service().await;
        let mut input = new_session("client_001", 15);
        input.declared_duration = Some(100);

        let err = service.create(input, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidField("duration", _)));
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_with_unknown_photo_id_rolls_everything_back() {
        let service = service().await;
        let mut input = new_session("client_001", 15);
        input.photo_ids.push(Uuid::new_v4());

        let err = service.create(input, None).await.unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_cannot_open_an_in_progress_session() {
        let service = service().await;
        let mut input = new_session("client_001", 15);
        input.status = SessionStatus::InProgress;

        let err = service.create(input, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidField("status", _)));
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_does_not_steal_a_photo_from_another_session() {
        let service = service().await;
        let loose = PhotoRow {
            id: Uuid::new_v4(),
            session_id: None,
            filename: "montaz.jpg".into(),
            original_name: None,
            url: "/uploads/montaz.jpg".into(),
            stored_locally: true,
            description: None,
            lat: None,
            lng: None,
            metadata: Json(PhotoMetadata::default()),
            uploaded_by: None,
            taken_at: None,
            uploaded_at: Utc::now(),
        };
        service.photo_repo.insert(&service.pool, &loose).await.unwrap();

        let mut first = new_session("client_001", 10);
        first.photo_ids.push(loose.id);
        let first = service.create(first, None).await.unwrap();
        assert_eq!(first.photos.len(), 1);

        let mut second = new_session("client_001", 11);
        second.photo_ids.push(loose.id);
        let err = service.create(second, None).await.unwrap_err();
        assert!(matches!(err, AppError::PhotoAlreadyLinked(id) if id == loose.id));

        // Continua na primeira sessão, e a segunda não foi gravada
        assert_eq!(service.get_by_id(first.id).await.unwrap().photos.len(), 1);
        assert_eq!(service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_by_client_is_exact_and_newest_first() {
        let service = service().await;
        let older = service.create(new_session("client_001", 10), None).await.unwrap();
        let newer = service.create(new_session("client_001", 20), None).await.unwrap();
        service.create(new_session("client_002", 15), None).await.unwrap();

        let list = service.list_by_client("client_001").await.unwrap();
        let ids: Vec<Uuid> = list.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert!(list.iter().all(|s| s.client_id == "client_001"));

        assert!(service.list_by_client("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_merges_and_recomputes_duration() {
        let service = service().await;
        let created = service.create(new_session("client_001", 15), None).await.unwrap();

        let patch = UpdateSessionPayload {
            end_time: Some(at(15, 9, 0)),
            notes: Some("Poprawka".into()),
            route: Some(vec![point(52.0, 21.0, at(15, 7, 0))]),
            ..Default::default()
        };
        let updated = service.update(created.id, patch).await.unwrap();

        assert_eq!(updated.client_name, created.client_name);
        assert_eq!(updated.duration, 7200);
        assert_eq!(updated.notes.as_deref(), Some("Poprawka"));
        assert_eq!(updated.route.len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_session_are_not_found() {
        let service = service().await;
        let missing = Uuid::new_v4();

        assert!(matches!(
            service.update(missing, UpdateSessionPayload::default()).await,
            Err(AppError::ResourceNotFound(_))
        ));
        assert!(matches!(service.delete(missing).await, Err(AppError::ResourceNotFound(_))));
        assert!(matches!(service.get_by_id(missing).await, Err(AppError::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_the_session() {
        let service = service().await;
        let created = service.create(new_session("client_001", 15), None).await.unwrap();

        service.delete(created.id).await.unwrap();
        assert!(matches!(service.get_by_id(created.id).await, Err(AppError::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn live_session_lifecycle() {
        let service = service().await;
        let started = service
            .start(None, StartSessionPayload {
                client_id: "client_001".into(),
                client_name: "Jan Kowalski".into(),
                start_time: Some(at(15, 7, 0)),
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(started.status, SessionStatus::InProgress);
        assert_eq!(started.duration, 0);

        let first = vec![point(52.2297, 21.0122, at(15, 7, 0)), point(52.2300, 21.0125, at(15, 7, 15))];
        let result = service.append_route_points(started.id, first).await.unwrap();
        assert_eq!(result.appended, 2);
        assert_eq!(result.point_count, 2);

        // Lote que volta no tempo
        let stale = vec![point(52.0, 21.0, at(15, 7, 5))];
        assert!(matches!(
            service.append_route_points(started.id, stale).await,
            Err(AppError::InvalidField("route", _))
        ));

        let second = vec![point(52.2305, 21.0130, at(15, 7, 30))];
        assert_eq!(service.append_route_points(started.id, second).await.unwrap().point_count, 3);

        let finished = service
            .finish(started.id, CloseSessionPayload { end_time: Some(at(15, 15, 30)), notes: None })
            .await
            .unwrap();
        assert_eq!(finished.status, SessionStatus::Completed);
        assert_eq!(finished.duration, 30600);
        assert_eq!(finished.route.len(), 3);

        let late = vec![point(52.0, 21.0, at(15, 16, 0))];
        assert!(matches!(
            service.append_route_points(started.id, late).await,
            Err(AppError::SessionClosed(_))
        ));
        assert!(matches!(
            service.cancel(started.id, CloseSessionPayload::default()).await,
            Err(AppError::SessionClosed(_))
        ));
    }

    #[tokio::test]
    async fn client_stats_add_up_all_sessions() {
        let service = service().await;
        service.create(new_session("client_001", 10), None).await.unwrap();
        let latest = service.create(new_session("client_001", 20), None).await.unwrap();

        let stats = service.client_stats("client_001").await.unwrap();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_hours, 17.0);
        assert_eq!(stats.last_session.map(|s| s.id), Some(latest.id));

        let empty = service.client_stats("nobody").await.unwrap();
        assert_eq!(empty.total_sessions, 0);
        assert!(empty.last_session.is_none());
    }
}
