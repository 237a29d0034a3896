// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, CreateUserPayload, NewUser, Role, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    token_ttl: chrono::Duration,
    bcrypt_cost: u32,
    pool: SqlitePool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        jwt_secret: String,
        token_ttl: chrono::Duration,
        bcrypt_cost: u32,
        pool: SqlitePool,
    ) -> Self {
        Self { user_repo, jwt_secret, token_ttl, bcrypt_cost, pool }
    }

    // =========================================================================
    //  AUTENTICAÇÃO
    // =========================================================================

    /// Confere e-mail e senha e devolve o usuário com um token novo.
    ///
    /// E-mail desconhecido e senha errada são indistinguíveis para o chamador.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let user = self.user_repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?
        ?;

        if !is_password_valid {
            tracing::warn!("🔒 Tentativa de login com senha inválida para {}", user.email);
            return Err(AppError::InvalidCredentials);
        }

        self.user_repo.touch_last_login(user.id).await?;
        let token = self.create_token(&user)?;

        tracing::info!("🔑 Login de {} ({})", user.email, user.role.as_str());
        Ok((user, token))
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Usuário apagado depois do login = token inválido
        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    // =========================================================================
    //  AUTORIZAÇÃO
    // =========================================================================

    /// O administrador satisfaz qualquer papel; os demais, só o próprio.
    pub fn authorize(user: &User, required: Role) -> bool {
        user.role == required || user.role == Role::Admin
    }

    /// Clientes só enxergam as próprias sessões; trabalhadores e admins veem todas.
    pub fn can_view_client(user: &User, client_id: &str) -> bool {
        match user.role {
            Role::Client => user.client_id.as_deref() == Some(client_id),
            Role::Worker | Role::Admin => true,
        }
    }

    pub fn ensure_can_view_client(user: &User, client_id: &str) -> Result<(), AppError> {
        if Self::can_view_client(user, client_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Você não tem acesso aos dados deste cliente.".into()))
        }
    }

    // =========================================================================
    //  CONTAS
    // =========================================================================

    pub async fn create_user(&self, payload: CreateUserPayload) -> Result<User, AppError> {
        let role = payload.role.unwrap_or(Role::Client);

        // Todo cliente precisa de um clientId para ligar as sessões
        let client_id = match (role, payload.client_id) {
            (_, Some(id)) => {
                let id = id.trim();
                if id.is_empty() {
                    return Err(AppError::InvalidField(
                        "clientId",
                        "O identificador de cliente não pode ser vazio.".into(),
                    ));
                }
                Some(id.to_string())
            }
            (Role::Client, None) => Some(generate_client_id()),
            (_, None) => None,
        };

        let password_hash = self.hash_password(&payload.password).await?;

        let new_user = NewUser {
            email: normalize_email(&payload.email),
            password_hash,
            name: payload.name.trim().to_string(),
            role,
            client_id,
            phone: payload.phone,
            address: payload.address,
        };

        let user = self.user_repo.create_user(&self.pool, &new_user).await?;
        tracing::info!("👤 Usuário {} criado com papel {}", user.email, user.role.as_str());
        Ok(user)
    }

    pub async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))?
            ?;
        Ok(hashed)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Sufixo aleatório: dois cadastros no mesmo instante não podem colidir
fn generate_client_id() -> String {
    format!("client_{}", uuid::Uuid::new_v4().simple())
}
