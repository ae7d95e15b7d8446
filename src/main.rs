//! Shop Dispatch - HTTP front end of a multi-domain shop.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::Notify;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shop_dispatch::audit::{AuditLogger, AuditSink, NullAuditLogger};
use shop_dispatch::auth::MemorySessionStore;
use shop_dispatch::config::Settings;
use shop_dispatch::controller::{ControllerEnv, Dispatcher};
use shop_dispatch::server::{HttpServer, ServerOptions};
use shop_dispatch::services::ServiceRegistry;
use shop_dispatch::templates::TemplateEngine;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{} {}", NAME, VERSION);
        return ExitCode::SUCCESS;
    }

    let config_path = get_config_path(&args);

    let settings = match Settings::load(&config_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&settings) {
        eprintln!("Error initializing logging: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting {} v{}", NAME, VERSION);
    info!("Configuration loaded from: {}", config_path);
    info!("Bind address: {}", settings.server.bind);
    info!("Log level: {}", settings.logging.level);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(async_main(settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

/// Async main function.
async fn async_main(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let services = ServiceRegistry::initialize(&settings)?;

    let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(
        settings.session.ttl_seconds,
    )));
    sessions.start_cleanup_task(Duration::from_secs(
        settings.session.cleanup_interval_seconds,
    ));

    let views = TemplateEngine::new(&settings.paths.views_dir).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load views, using empty engine");
        TemplateEngine::empty()
    });

    let audit: Arc<dyn AuditSink> = if settings.audit.enabled {
        match AuditLogger::new(&settings.audit.log_path) {
            Ok(logger) => {
                info!(
                    path = %settings.audit.log_path.display(),
                    "Audit logging enabled"
                );
                Arc::new(logger)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    path = %settings.audit.log_path.display(),
                    "Failed to create audit logger, audit logging disabled"
                );
                Arc::new(NullAuditLogger::new())
            }
        }
    } else {
        info!("Audit logging disabled");
        Arc::new(NullAuditLogger::new())
    };

    let env = ControllerEnv {
        sessions,
        views: Arc::new(views),
        audit,
        login_path: settings.auth.login_path.clone(),
        cookie_name: settings.session.cookie_name.clone(),
    };
    let dispatcher = Arc::new(Dispatcher::standard(&services, env));

    let server = HttpServer::bind(
        settings.bind_addr()?,
        dispatcher,
        ServerOptions::from_settings(&settings),
    )
    .await?;

    let shutdown = Arc::new(Notify::new());
    let shutdown_for_signal = Arc::clone(&shutdown);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, initiating graceful shutdown...");
        shutdown_for_signal.notify_one();
    });

    let result = server.run(shutdown).await;

    services.shutdown();
    info!("Server stopped");
    result.map_err(Into::into)
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print help message.
fn print_help() {
    println!(
        r#"{} {}
Command-dispatch HTTP server for a multi-domain shop.

USAGE:
    {} [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file
                           [default: config/shop-dispatch.toml]
    -h, --help             Print help information
    -V, --version          Print version information
"#,
        NAME, VERSION, NAME
    );
}

/// Get configuration file path from command line arguments.
fn get_config_path(args: &[String]) -> String {
    for (i, arg) in args.iter().enumerate() {
        if (arg == "--config" || arg == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    "config/shop-dispatch.toml".to_string()
}

/// Initialize logging based on settings.
fn init_logging(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    match settings.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
