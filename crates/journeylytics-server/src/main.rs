use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use journeylytics_engine::MemoryBackend;
use journeylytics_server::config::Config;
use journeylytics_server::report::render_report;
use journeylytics_server::state::AppState;

/// `journeylytics health`: liveness probe for container HEALTHCHECKs.
///
/// Calls `GET http://localhost:$JOURNEYLYTICS_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("JOURNEYLYTICS_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

fn init_tracing(to_stderr: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("journeylytics=info".parse()?);
    let builder = tracing_subscriber::fmt().with_env_filter(filter).json();
    if to_stderr {
        builder.with_writer(std::io::stderr).init();
    } else {
        builder.init();
    }
    Ok(())
}

/// `journeylytics report [PATH]`: print the text report to stdout.
fn run_report(path: Option<&str>) -> Result<()> {
    init_tracing(true)?;
    let mut cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    if let Some(path) = path {
        cfg.data_path = path.to_string();
    }

    let backend = MemoryBackend::open(&cfg.data_path)?;
    print!("{}", render_report(&backend, &cfg));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("health") => run_health_check(),
        Some("report") => return run_report(args.get(2).map(|s| s.as_str())),
        _ => {}
    }

    // Structured JSON logging. Level controlled via RUST_LOG env var.
    init_tracing(false)?;

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    info!(
        funnel = ?cfg.funnel.stages(),
        policy = ?cfg.acquisition_policy,
        conversion = ?cfg.conversion_mode,
        "Configuration loaded"
    );

    let backend = MemoryBackend::open(&cfg.data_path)?;
    let state = Arc::new(AppState::new(backend, cfg.clone()));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = journeylytics_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, "Journeylytics listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
