// src/services/route_aggregator.rs

use chrono::{DateTime, Utc};

use crate::{
    common::geo::distance_km,
    models::{report::SessionSummary, session::{RoutePoint, WorkSession}},
};

// Funções puras sobre a rota de uma sessão. Nada aqui toca o banco.

/// Soma das distâncias entre pontos consecutivos, em km.
/// Rotas com menos de dois pontos têm distância zero.
pub fn total_distance(route: &[RoutePoint]) -> f64 {
    route
        .windows(2)
        .map(|pair| distance_km(pair[0].lat, pair[0].lng, pair[1].lat, pair[1].lng))
        .sum()
}

pub fn point_count(route: &[RoutePoint]) -> usize {
    route.len()
}

/// Horário do primeiro e do último ponto.
pub fn time_span(route: &[RoutePoint]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    match (route.first(), route.last()) {
        (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
        _ => None,
    }
}

/// `HH:MM:SS`, com horas em dois dígitos no mínimo. Negativos viram zero.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// `Xh Ym`, ou só `Ym` abaixo de uma hora.
pub fn format_duration_short(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

pub fn summarize(session: &WorkSession) -> SessionSummary {
    let span = time_span(&session.route);

    SessionSummary {
        session_id: session.id,
        distance_km: total_distance(&session.route),
        duration_seconds: session.duration,
        duration: format_duration(session.duration),
        duration_short: format_duration_short(session.duration),
        point_count: point_count(&session.route),
        photo_count: session.photos.len(),
        first_point_at: span.map(|(first, _)| first),
        last_point_at: span.map(|(_, last)| last),
    }
}
