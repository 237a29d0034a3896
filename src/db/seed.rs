// src/db/seed.rs

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{CreateUserPayload, Role},
    services::auth::{normalize_email, AuthService},
};

// Contas de demonstração. Só são criadas com o banco vazio.
const DEMO_USERS: [(&str, &str, &str, Role, Option<&str>); 2] = [
    ("klient@test.pl", "test123", "Jan Kowalski", Role::Client, Some("client_001")),
    ("admin@test.pl", "admin123", "Michał Budowlany", Role::Worker, None),
];

pub async fn seed_demo_users(user_repo: &UserRepository, auth_service: &AuthService) -> Result<usize, AppError> {
    if user_repo.count().await? > 0 {
        tracing::info!("🌱 Usuários já existem; seed de demonstração ignorado");
        return Ok(0);
    }

    for (email, password, name, role, client_id) in DEMO_USERS {
        auth_service
            .create_user(CreateUserPayload {
                email: email.to_string(),
                password: password.to_string(),
                name: name.to_string(),
                role: Some(role),
                client_id: client_id.map(str::to_string),
                phone: None,
                address: None,
            })
            .await?;
    }

    tracing::info!("🌱 {} usuários de demonstração criados", DEMO_USERS.len());
    Ok(DEMO_USERS.len())
}

/// Garante que o administrador configurado no ambiente exista.
pub async fn ensure_admin(
    user_repo: &UserRepository,
    auth_service: &AuthService,
    email: &str,
    password: &str,
) -> Result<bool, AppError> {
    if user_repo.find_by_email(&normalize_email(email)).await?.is_some() {
        return Ok(false);
    }

    auth_service
        .create_user(CreateUserPayload {
            email: email.to_string(),
            password: password.to_string(),
            name: "Administrador".to_string(),
            role: Some(Role::Admin),
            client_id: None,
            phone: None,
            address: None,
        })
        .await?;

    tracing::info!("🛡️ Administrador {} criado a partir do ambiente", email);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    async fn services() -> (UserRepository, AuthService) {
        let pool = memory_pool().await;
        let repo = UserRepository::new(pool.clone());
        let auth = AuthService::new(repo.clone(), "segredo-de-teste".into(), chrono::Duration::hours(8), 4, pool);
        (repo, auth)
    }

    #[tokio::test]
    async fn seeded_client_can_log_in_and_others_cannot() {
        let (repo, auth) = services().await;
        assert_eq!(seed_demo_users(&repo, &auth).await.unwrap(), 2);

        let (user, token) = auth.authenticate("klient@test.pl", "test123").await.unwrap();
        assert_eq!(user.role, Role::Client);
        assert_eq!(user.client_id.as_deref(), Some("client_001"));
        assert!(!token.is_empty());

        // Mesmo e-mail com maiúsculas e espaços
        assert!(auth.authenticate("  Klient@Test.pl ", "test123").await.is_ok());

        assert!(matches!(
            auth.authenticate("klient@test.pl", "errada").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate("ninguem@test.pl", "test123").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn seeding_twice_is_a_no_op() {
        let (repo, auth) = services().await;
        seed_demo_users(&repo, &auth).await.unwrap();
        assert_eq!(seed_demo_users(&repo, &auth).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn bootstrap_admin_is_created_once() {
        let (repo, auth) = services().await;
        assert!(ensure_admin(&repo, &auth, "root@test.pl", "segredo1").await.unwrap());
        assert!(!ensure_admin(&repo, &auth, "ROOT@test.pl", "segredo1").await.unwrap());

        let admin = repo.find_by_email("root@test.pl").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
    }
}
