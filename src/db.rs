pub mod pool;
pub use pool::{connect, run_migrations, WriteGate};
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod session_repo;
pub use session_repo::SessionRepository;
pub mod photo_repo;
pub use photo_repo::PhotoRepository;
pub mod seed;

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;

    // Banco em memória com o schema completo, um por teste
    pub async fn memory_pool() -> SqlitePool {
        let pool = super::connect("sqlite::memory:", 1)
            .await
            .expect("falha ao abrir o SQLite em memória");
        super::run_migrations(&pool)
            .await
            .expect("falha ao rodar as migrações");
        pool
    }
}
