// src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use fieldtrack::{config::AppState, db, routes};

#[tokio::main]
async fn main() {
    // RUST_LOG manda; sem ele, `info`
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    db::run_migrations(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let config = app_state.config.clone();

    if config.seed_demo_users {
        db::seed::seed_demo_users(&app_state.user_repo, &app_state.auth_service)
            .await
            .expect("Falha ao criar os usuários de demonstração.");
    }

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        db::seed::ensure_admin(&app_state.user_repo, &app_state.auth_service, email, password)
            .await
            .expect("Falha ao criar o administrador inicial.");
    }

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Falha ao criar a pasta de uploads.");

    let app = routes::app(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", config.bind_addr);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Erro no servidor Axum");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("🔥 Falha ao escutar o sinal de desligamento: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("👋 Desligando o servidor...");
}
