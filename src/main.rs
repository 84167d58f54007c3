use anyhow::{Context, Result};
use clap::Parser;
use gesture_capture::{
    create_router, AppState, CaptureSession, Config, ConsoleView, HttpPredictionClient,
    MediaSourceFactory, SessionConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "gesture-capture")]
#[command(about = "Sample camera frames and display the recognised gesture text")]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/gesture-capture")]
    config: String,

    /// Start capturing immediately
    #[arg(long)]
    autostart: bool,

    /// Override the sampling interval in milliseconds
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Don't print prediction updates to the terminal
    #[arg(long)]
    no_console: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;

    if let Some(interval_ms) = args.interval_ms {
        cfg.capture.interval_ms = interval_ms;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Capture source: {:?}", cfg.source.kind);
    info!("Sampling every {}ms", cfg.capture.interval_ms);

    let source = MediaSourceFactory::create(&cfg.source).context("Failed to create capture source")?;
    let recognizer = Arc::new(HttpPredictionClient::new(&cfg.recognition));

    let session_config = SessionConfig {
        sampler: cfg.capture.clone(),
        ..Default::default()
    };
    let session = Arc::new(CaptureSession::new(session_config, source, recognizer));

    if !args.no_console {
        tokio::spawn(ConsoleView::new(session.subscribe()).run());
    }

    if args.autostart {
        if let Err(e) = session.start().await {
            warn!("Autostart failed, waiting for a start request: {}", e);
        }
    }

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Control API listening on http://{}", addr);

    let app = create_router(AppState::new(Arc::clone(&session)));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
            }
        })
        .await
        .context("HTTP server failed")?;

    info!("Shutting down");
    session.shutdown().await;

    // Give the detached reset call a moment to reach the service
    tokio::time::sleep(Duration::from_millis(200)).await;

    Ok(())
}
