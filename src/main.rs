use anyhow::Context;
use pit_strategy::{service, StrategyConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port: u16 = std::env::var("PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(8000);

    let cfg = match resolve_config_path() {
        Some(path) => {
            let cfg = StrategyConfig::load(&path)
                .with_context(|| format!("failed to load strategy config {}", path.display()))?;
            tracing::info!("loaded strategy config from {}", path.display());
            cfg
        }
        None => {
            tracing::warn!("no track config found; using built-in defaults");
            StrategyConfig::default()
        }
    };
    tracing::info!(
        "pit_loss={:.1}s cliff={:.2}s/lap candidates={:?}",
        cfg.pit_stop_time_s,
        cfg.tire_cliff_threshold,
        cfg.candidates.iter().map(|c| c.pit_lap).collect::<Vec<_>>()
    );

    let app = service::router(cfg);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("STRATEGY_CONFIG") {
        return Some(PathBuf::from(p));
    }

    let mut candidates = vec![PathBuf::from("tracks/cota.json"), PathBuf::from("./tracks/cota.json")];
    if let Ok(mut p) = std::env::current_exe() {
        p.pop(); // exe dir
        p.push("tracks/cota.json");
        candidates.push(p);
    }

    candidates.into_iter().find(|c| c.exists())
}
