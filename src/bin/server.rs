use std::{fs::OpenOptions, net::SocketAddr, process::ExitCode, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::{Parser, ValueEnum};
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tower_livereload::LiveReloadLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use finance_ledger::{AppState, Asset, build_router, graceful_shutdown, logging_middleware};

/// Where the server is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Environment {
    /// Live reload, request body logging and debug output on stdout.
    Development,
    Production,
}

/// The web server for the finance ledger: the JSON API and the web frontend.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH", default_value = "finance.db")]
    db_path: String,

    /// The address to listen on.
    #[arg(long, env = "SERVICE_ADDRESS", default_value = "0.0.0.0:3000")]
    address: SocketAddr,

    #[arg(long, env = "ENVIRONMENT", value_enum, default_value_t = Environment::Development)]
    environment: Environment,

    /// The asset code used to label the balance summary, e.g. "USD".
    #[arg(long, env = "SUMMARY_ASSET", default_value = "USD")]
    summary_asset: String,

    /// File path for the debug log.
    #[arg(long, env = "LOG_PATH", default_value = "debug.log")]
    log_path: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging(&args.log_path, args.environment) {
        eprintln!("Could not set up logging: {error}");
        return ExitCode::FAILURE;
    }

    let summary_asset = match Asset::parse(&args.summary_asset) {
        Ok(asset) => asset,
        Err(error) => {
            tracing::error!("Invalid summary asset: {error}");
            return ExitCode::FAILURE;
        }
    };

    let connection = match Connection::open(&args.db_path) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not open database file {}: {error}", args.db_path);
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::new(connection, summary_asset) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the database: {error}");
            return ExitCode::FAILURE;
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let mut router = add_tracing_layer(build_router(state));

    if args.environment == Environment::Development {
        router = router
            .layer(middleware::from_fn(logging_middleware))
            .layer(LiveReloadLayer::new());
    }

    tracing::info!(
        "HTTP server listening on {} ({:?})",
        args.address,
        args.environment
    );

    if let Err(error) = axum_server::bind(args.address)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn setup_logging(log_file_path: &str, environment: Environment) -> std::io::Result<()> {
    let stdout_level = match environment {
        Environment::Development => LevelFilter::DEBUG,
        Environment::Production => LevelFilter::INFO,
    };
    let stdout_filter = EnvFilter::builder()
        .with_default_directive(stdout_level.into())
        .from_env_lossy();
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(stdout_filter);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are mapped to responses.
        .on_failure(());

    router.layer(tracing_layer)
}
