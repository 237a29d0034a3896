// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::{Role, User},
    services::auth::AuthService,
};

/// O papel exigido por uma rota.
pub trait RoleRequirement: Send + Sync + 'static {
    fn role() -> Role;
}

/// Extrator que só deixa passar quem tem o papel `T` (ou é admin).
pub struct RequireRole<T>(pub User, pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleRequirement,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        let required = T::role();
        if !AuthService::authorize(&user, required) {
            tracing::warn!("🚫 {} ({}) tentou uma ação de {}", user.email, user.role.as_str(), required.as_str());
            return Err(AppError::Forbidden(format!(
                "Esta ação exige o papel '{}'.",
                required.as_str()
            )));
        }

        Ok(RequireRole(user, PhantomData))
    }
}

// ---
// PAPÉIS EXIGIDOS (TIPOS)
// ---

pub struct WorkerRole;
impl RoleRequirement for WorkerRole {
    fn role() -> Role { Role::Worker }
}

pub struct AdminRole;
impl RoleRequirement for AdminRole {
    fn role() -> Role { Role::Admin }
}

pub type RequireWorker = RequireRole<WorkerRole>;
pub type RequireAdmin = RequireRole<AdminRole>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: "x@test.pl".into(),
            password_hash: String::new(),
            name: "X".into(),
            role,
            client_id: None,
            phone: None,
            address: None,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    fn parts_with(user: Option<User>) -> Parts {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    #[tokio::test]
    async fn worker_route_accepts_worker_and_admin() {
        for role in [Role::Worker, Role::Admin] {
            let mut parts = parts_with(Some(user(role)));
            assert!(RequireWorker::from_request_parts(&mut parts, &()).await.is_ok());
        }
    }

    #[tokio::test]
    async fn client_is_forbidden_and_anonymous_is_unauthorized() {
        let mut parts = parts_with(Some(user(Role::Client)));
        assert!(matches!(
            RequireWorker::from_request_parts(&mut parts, &()).await,
            Err(AppError::Forbidden(_))
        ));

        let mut parts = parts_with(Some(user(Role::Worker)));
        assert!(matches!(
            RequireAdmin::from_request_parts(&mut parts, &()).await,
            Err(AppError::Forbidden(_))
        ));

        let mut parts = parts_with(None);
        assert!(matches!(
            RequireAdmin::from_request_parts(&mut parts, &()).await,
            Err(AppError::InvalidToken)
        ));
    }
}
