use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use reqwest::Client;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use resume_intake_backend::{
    config::{Config, LogFormat},
    database::{
        pool::{create_pool, run_migrations},
        CandidateStore, MemoryCandidateStore, PgCandidateStore,
    },
    middleware::cors::api_cors,
    routes,
    services::{document_service::LocalDocumentStore, llm_service::OpenAiChat},
    AppState,
};

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let store: Arc<dyn CandidateStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            info!("Using Postgres candidate store");
            Arc::new(PgCandidateStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, candidates are kept in memory only");
            Arc::new(MemoryCandidateStore::new())
        }
    };

    let documents = LocalDocumentStore::new(&config.uploads_dir);
    tokio::fs::create_dir_all(documents.dir()).await?;
    info!("Storing resumes in: {}", documents.dir().display());

    let http_client = Client::builder().timeout(config.llm_timeout).build()?;
    let llm = OpenAiChat::new(
        http_client,
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
    );

    let app_state = AppState::new(&config, store, Arc::new(documents), Arc::new(llm));

    let app = routes::router(app_state)
        .layer(api_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
