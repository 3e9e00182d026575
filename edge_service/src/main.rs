use edge_service::{serve, ServiceConfig};
use tracing_subscriber::EnvFilter;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "edge_service=info,riskatlas=info".into()),
        )
        .init();

    let addr = std::env::var("RISKATLAS_ADDR").unwrap_or_else(|_| "127.0.0.1:7878".to_string());
    let config = match std::env::var("RISKATLAS_CONFIG") {
        Ok(path) => ServiceConfig::from_file(path)?,
        Err(_) => ServiceConfig::default(),
    };

    serve(&addr, &config)?;
    Ok(())
}
