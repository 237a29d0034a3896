// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::get_client_stats,

        // --- Sessions ---
        handlers::sessions::list_sessions,
        handlers::sessions::create_session,
        handlers::sessions::start_session,
        handlers::sessions::append_route,
        handlers::sessions::finish_session,
        handlers::sessions::cancel_session,
        handlers::sessions::get_session,
        handlers::sessions::list_client_sessions,
        handlers::sessions::update_session,
        handlers::sessions::delete_session,
        handlers::sessions::get_session_summary,

        // --- Reports ---
        handlers::reports::get_session_report,

        // --- Photos ---
        handlers::photos::upload_photo,
        handlers::photos::list_session_photos,
        handlers::photos::attach_photo,
        handlers::photos::delete_photo,

        // --- Admin ---
        handlers::admin::list_users,
        handlers::admin::create_user,
        handlers::admin::delete_user,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::CreateUserPayload,
            models::auth::AuthResponse,
            models::auth::UserResponse,
            models::auth::ClientSummary,

            // --- Sessions ---
            models::session::SessionStatus,
            models::session::RoutePoint,
            models::session::SessionPhoto,
            models::session::WorkSession,
            models::session::PhotoReference,
            models::session::CreateSessionPayload,
            models::session::StartSessionPayload,
            models::session::AppendRoutePayload,
            models::session::RouteAppendResult,
            models::session::CloseSessionPayload,
            models::session::UpdateSessionPayload,
            models::session::SessionResponse,
            models::session::MessageResponse,

            // --- Photos ---
            models::photo::GeoPoint,
            models::photo::PhotoMetadata,
            models::photo::Photo,
            models::photo::AttachmentStatus,
            models::photo::Attachment,
            models::photo::PhotoUploadResponse,
            models::photo::AttachPhotoPayload,

            // --- Reports ---
            models::report::SessionSummary,
            models::report::ClientStats,
            models::report::ReportPhoto,
            models::report::SessionReport,
            models::report::ReportFormat,

            // --- Respostas dos handlers ---
            handlers::admin::UserListResponse,
            handlers::clients::ClientListResponse,
            handlers::clients::StatsResponse,
            handlers::sessions::SessionListResponse,
            handlers::sessions::SummaryResponse,
            handlers::sessions::RouteAppendResponse,
            handlers::reports::ReportResponse,
            handlers::photos::PhotoUploadForm,
            handlers::photos::PhotoListResponse,
            handlers::photos::AttachmentResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login e emissão de token"),
        (name = "Users", description = "Dados do usuário autenticado"),
        (name = "Clients", description = "Clientes e estatísticas"),
        (name = "Sessions", description = "Sessões de trabalho, rota GPS e resumo"),
        (name = "Reports", description = "Relatórios em texto, JSON ou PDF"),
        (name = "Photos", description = "Upload e vínculo de fotos"),
        (name = "Admin", description = "Gestão de contas (somente administradores)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
