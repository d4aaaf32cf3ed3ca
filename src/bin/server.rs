use opsconsole::alarm::HttpShieldApi;
use opsconsole::server::config::ConsoleConfig;
use opsconsole::version::VERSION;
use opsconsole::web::{AppState, create_axum_router};

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "console.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Manually check for --version before full parsing to keep the simple output.
    if std::env::args().any(|arg| arg == "--version") {
        println!("Console version: {VERSION}");
        return Ok(());
    }

    let args = Args::parse();

    // Logging needs the log directory, so configuration comes first.
    let console_config = match ConsoleConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load console configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&console_config.log_dir);
    info!("Starting console, version: {}", VERSION);
    info!(
        backend = %console_config.api_base_url,
        locale = %console_config.default_locale,
        page_size = console_config.page_size,
        "Configuration loaded."
    );

    let shield_api = Arc::new(HttpShieldApi::new(
        console_config.api_base_url.clone(),
        console_config.api_token.clone(),
    ));
    let app_state = Arc::new(AppState::new(shield_api, console_config.clone()));
    let app = create_axum_router(app_state);

    let addr: SocketAddr = console_config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Console listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Box::new)?;

    info!("Console stopped.");
    Ok(())
}
