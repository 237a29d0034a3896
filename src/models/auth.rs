// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Papel do usuário no sistema. Imutável depois da criação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Worker,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Worker => "worker",
            Role::Admin => "admin",
        }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "klient@test.pl")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "Jan Kowalski")]
    pub name: String,
    pub role: Role,

    // Só faz sentido para clientes: é a chave usada pelas sessões
    #[schema(example = "client_001")]
    pub client_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,

    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

// Dados de um usuário a ser inserido (senha já com hash)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub client_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "klient@test.pl")]
    pub email: String,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    #[schema(example = "test123")]
    pub password: String,
}

// Dados para o administrador criar uma conta
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    // Padrão: client
    pub role: Option<Role>,
    #[validate(length(min = 1, message = "O identificador de cliente não pode ser vazio."))]
    pub client_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// Resposta de autenticação com o token e o usuário
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

// O que o painel do trabalhador precisa para escolher um cliente
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    #[schema(example = "client_001")]
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<User> for ClientSummary {
    fn from(user: User) -> Self {
        Self {
            // Contas antigas sem clientId usam o próprio id
            id: user.client_id.unwrap_or_else(|| user.id.to_string()),
            name: user.name,
            email: user.email,
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub role: Role,
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}
