// src/services/report_service.rs

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, Utc};

use crate::{
    models::{
        report::{ReportPhoto, SessionReport, SessionSummary},
        session::{SessionPhoto, SessionStatus, WorkSession},
    },
    services::route_aggregator::format_duration,
};

const UNKNOWN: &str = "Desconhecido";
const NO_DESCRIPTION: &str = "Sem descrição";
const NO_LOCATION: &str = "Localização desconhecida";
const RULE: &str = "==================================================";

/// Monta o relatório de uma sessão. Todos os horários saem no fuso `offset`.
pub fn build_report(
    session: &WorkSession,
    summary: &SessionSummary,
    generated_at: DateTime<Utc>,
    offset: FixedOffset,
) -> SessionReport {
    let local = |t: DateTime<Utc>| t.with_timezone(&offset);

    let client_name = if session.client_name.trim().is_empty() {
        UNKNOWN.to_string()
    } else {
        session.client_name.clone()
    };

    let end = match session.end_time {
        Some(end) => local(end).format("%H:%M").to_string(),
        None => "Em andamento".to_string(),
    };

    let photos = session
        .photos
        .iter()
        .map(|photo| report_photo(photo, offset))
        .collect();

    // Notas em branco não geram bloco
    let notes = session
        .notes
        .as_ref()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    SessionReport {
        session_id: session.id,
        client_name,
        date: local(session.start_time).format("%d.%m.%Y").to_string(),
        start: local(session.start_time).format("%H:%M").to_string(),
        end,
        duration: format_duration(summary.duration_seconds),
        route_points: summary.point_count,
        distance: format!("{:.2} km", summary.distance_km),
        photo_count: summary.photo_count,
        status: status_label(session.status).to_string(),
        photos,
        notes,
        generated_at: local(generated_at).format("%d.%m.%Y %H:%M").to_string(),
    }
}

fn report_photo(photo: &SessionPhoto, offset: FixedOffset) -> ReportPhoto {
    let description = photo
        .description
        .as_ref()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DESCRIPTION)
        .to_string();

    let location = match (photo.lat, photo.lng) {
        (Some(lat), Some(lng)) => format!("{:.6}, {:.6}", lat, lng),
        _ => NO_LOCATION.to_string(),
    };

    ReportPhoto {
        description,
        time: photo.timestamp.with_timezone(&offset).format("%H:%M").to_string(),
        location,
    }
}

pub fn status_label(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::InProgress => "Em andamento",
        SessionStatus::Completed => "Concluída",
        SessionStatus::Cancelled => "Cancelada",
    }
}

impl SessionReport {
    /// Versão em texto puro, pronta para impressão ou e-mail.
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        // `write!` em String não falha
        let _ = writeln!(out, "RELATÓRIO DE TRABALHO");
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out, "Cliente: {}", self.client_name);
        let _ = writeln!(out, "Data: {}", self.date);
        let _ = writeln!(out);

        let _ = writeln!(out, "Início: {}", self.start);
        let _ = writeln!(out, "Término: {}", self.end);
        let _ = writeln!(out, "Tempo total: {}", self.duration);
        let _ = writeln!(out);

        let _ = writeln!(out, "Pontos da rota: {}", self.route_points);
        let _ = writeln!(out, "Distância: {}", self.distance);
        let _ = writeln!(out, "Fotos: {}", self.photo_count);
        let _ = writeln!(out, "Status: {}", self.status);
        let _ = writeln!(out);

        let _ = writeln!(out, "Documentação fotográfica");
        let _ = writeln!(out, "{}", RULE);
        if self.photos.is_empty() {
            let _ = writeln!(out, "Nenhuma foto nesta sessão");
        } else {
            for (i, photo) in self.photos.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{}. {} ({}) - {}",
                    i + 1,
                    photo.description,
                    photo.time,
                    photo.location
                );
            }
        }

        if let Some(notes) = &self.notes {
            let _ = writeln!(out);
            let _ = writeln!(out, "Notas do trabalhador:");
            let _ = writeln!(out, "{}", notes);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Gerado em: {}", self.generated_at);
        out
    }
}
