// src/common/error.rs

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Regras que o `validator` não consegue expressar (ordem da rota, duração...)
    #[error("Campo inválido '{0}': {1}")]
    InvalidField(&'static str, String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Identificador de cliente já existe")]
    ClientIdAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("{0} não encontrado(a)")]
    ResourceNotFound(String),

    #[error("A sessão {0} já foi encerrada")]
    SessionClosed(Uuid),

    #[error("A foto {0} já pertence a outra sessão")]
    PhotoAlreadyLinked(Uuid),

    #[error("Upload inválido: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Falhas de persistência: abortam a requisição, nunca o processo.
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de armazenamento de arquivos")]
    StorageError(#[from] std::io::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "success": false,
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidField(field, message) => {
                let body = Json(json!({
                    "success": false,
                    "error": "Um ou mais campos são inválidos.",
                    "details": { field: [message] },
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::ResourceNotFound(what) => {
                let body = Json(json!({
                    "success": false,
                    "error": format!("{} não encontrado(a).", what),
                }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::Forbidden(reason) => {
                let body = Json(json!({ "success": false, "error": reason }));
                return (StatusCode::FORBIDDEN, body).into_response();
            }
            AppError::SessionClosed(id) => {
                let body = Json(json!({
                    "success": false,
                    "error": format!("A sessão {} não está em andamento.", id),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::PhotoAlreadyLinked(id) => {
                let body = Json(json!({
                    "success": false,
                    "error": format!("A foto {} já pertence a outra sessão.", id),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::Multipart(e) => {
                let body = Json(json!({ "success": false, "error": e.body_text() }));
                return (e.status(), body).into_response();
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso."),
            AppError::ClientIdAlreadyExists => (StatusCode::CONFLICT, "Este identificador de cliente já está em uso."),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos."),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente."),

            // Todos os outros erros (DatabaseError, StorageError, InternalServerError...) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {} ({:?})", e, e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        let body = Json(json!({ "success": false, "error": error_message }));
        (status, body).into_response()
    }
}
