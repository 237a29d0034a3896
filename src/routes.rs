// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

async fn health() -> Json<Value> {
    Json(json!({ "success": true, "status": "ok" }))
}

/// Monta o router completo: rotas públicas, rotas protegidas, docs e arquivos enviados.
pub fn app(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login));

    let session_routes = Router::new()
        .route("/",
               get(handlers::sessions::list_sessions)
               .post(handlers::sessions::create_session)
        )
        .route("/start", post(handlers::sessions::start_session))
        .route("/client/{client_id}", get(handlers::sessions::list_client_sessions))
        .route("/{id}",
               get(handlers::sessions::get_session)
               .put(handlers::sessions::update_session)
               .delete(handlers::sessions::delete_session)
        )
        .route("/{id}/route", post(handlers::sessions::append_route))
        .route("/{id}/finish", post(handlers::sessions::finish_session))
        .route("/{id}/cancel", post(handlers::sessions::cancel_session))
        .route("/{id}/summary", get(handlers::sessions::get_session_summary))
        .route("/{id}/report", get(handlers::reports::get_session_report));

    // O upload tem limite próprio; o resto fica no padrão do axum
    let photo_routes = Router::new()
        .route("/",
               post(handlers::photos::upload_photo)
               .layer(DefaultBodyLimit::max(app_state.config.max_upload_bytes))
        )
        .route("/session/{session_id}", get(handlers::photos::list_session_photos))
        .route("/{id}/attach", post(handlers::photos::attach_photo))
        .route("/{id}", axum::routing::delete(handlers::photos::delete_photo));

    let admin_routes = Router::new()
        .route("/users",
               get(handlers::admin::list_users)
               .post(handlers::admin::create_user)
        )
        .route("/users/{id}", axum::routing::delete(handlers::admin::delete_user));

    // Tudo aqui passa pelo auth_guard
    let protected = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        .route("/clients", get(handlers::clients::list_clients))
        .route("/stats/{client_id}", get(handlers::clients::get_client_stats))
        .nest("/sessions", session_routes)
        .nest("/photos", photo_routes)
        .nest("/admin", admin_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let api = Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes)
        .merge(protected);

    // Combina tudo no router principal
    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/uploads", ServeDir::new(&app_state.config.upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
