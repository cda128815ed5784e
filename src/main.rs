use anyhow::Result;
use std::{io::ErrorKind, path::Path};
use tokio::{fs, net::TcpListener};
use tracing_subscriber::EnvFilter;

use upload_api::{
    AppState, app, config,
    services::{storage_service::StorageService, token_service::TokenService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Load .env + logging setup ---
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + optional token-issuing mode ---
    let (cfg, issue) = config::AppConfig::from_env_and_args()?;

    let tokens = TokenService::new(&cfg.jwt_secret);

    // --- Handle offline token issuing mode ---
    if let Some(request) = issue {
        let token = tokens.sign(&request.subject, &request.role, request.ttl_secs)?;
        println!("{token}");
        return Ok(()); // exit after printing the token
    }

    tracing::info!(
        host = %cfg.host,
        port = cfg.port,
        upload_dir = %cfg.upload_dir,
        max_file_size = cfg.max_file_size,
        "starting upload-api"
    );

    // --- Ensure upload directory exists ---
    if !Path::new(&cfg.upload_dir).exists() {
        fs::create_dir_all(&cfg.upload_dir).await?;
        tracing::info!("Created upload directory at {}", cfg.upload_dir);
    }

    // --- Initialize core services ---
    let storage = StorageService::new(cfg.upload_dir.clone(), cfg.max_file_size);
    let state = AppState::new(storage, tokens);

    // --- Build router ---
    let router = app(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}
