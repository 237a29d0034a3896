// src/db/user_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{NewUser, Role, User},
};

const USER_COLUMNS: &str = r#"
    id, email, password_hash, name, role, client_id,
    phone, address, created_at, last_login
"#;

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail (já normalizado pelo chamador)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let maybe_user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let maybe_user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn list_all(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC");
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }

    pub async fn list_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role = ? ORDER BY name ASC");
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(role)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // Cria um novo usuário no banco de dados.
    // Com tratamento de erro específico para e-mails e clientIds duplicados.
    pub async fn create_user<'e, E>(&self, executor: E, new_user: &NewUser) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            r#"
            INSERT INTO users (
                id, email, password_hash, name, role, client_id,
                phone, address, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.name)
            .bind(new_user.role)
            .bind(&new_user.client_id)
            .bind(&new_user.phone)
            .bind(&new_user.address)
            .bind(Utc::now())
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        // O SQLite não expõe o nome da constraint, só a mensagem
                        if db_err.message().contains("users.client_id") {
                            return AppError::ClientIdAlreadyExists;
                        }
                        return AppError::EmailAlreadyExists;
                    }
                }
                e.into()
            })?;

        Ok(user)
    }

    pub async fn touch_last_login(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // Retorna quantas linhas foram removidas (0 = não existia)
    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
