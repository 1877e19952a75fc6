use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dropiq_core::{services::AuthService, DropiqConfig};
use dropiq_db::DropiqDb;
use dropiq_server::{create_app, AppState, ServerError};
use miette::Result;
use tracing::info;

#[derive(Parser)]
#[command(name = "dropiq-server")]
#[command(about = "DropIQ airdrop discovery and vetting server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides config)
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
    /// Apply database migrations and exit
    Migrate,
    /// Grant the admin role to an existing account
    PromoteAdmin {
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .rgb_colors(miette::RgbColors::Preferred)
                .with_cause_chain()
                .with_syntax_highlighting(miette::highlighters::SyntectHighlighter::default())
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))?;
    miette::set_panic_hook();
    let cli = Cli::parse();

    init_tracing(cli.debug);

    let mut config = match &cli.config {
        Some(path) => DropiqConfig::load_from(path).await?,
        None => DropiqConfig::load().await?,
    };
    config.apply_env_overrides();

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await?;
        }
        Commands::Migrate => {
            let db = DropiqDb::open(&config.database.path).await?;
            let stats = db.stats().await?;
            info!(
                users = stats.user_count,
                airdrops = stats.airdrop_count,
                "Database is up to date: {}",
                config.database.path.display()
            );
            db.close().await;
        }
        Commands::PromoteAdmin { email } => {
            let db = DropiqDb::open(&config.database.path).await?;
            let user = AuthService::new(db.clone(), &config.auth)
                .promote_admin(&email)
                .await?;
            info!(user_id = %user.id, "Granted admin role to {}", email);
            db.close().await;
        }
    }

    Ok(())
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // RUST_LOG wins over --debug
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("dropiq_server=debug,dropiq_core=debug,dropiq_db=debug,tower_http=debug,info")
        } else {
            EnvFilter::new("dropiq_server=info,dropiq_core=info,dropiq_db=info,tower_http=info,warn")
        }
    });

    let terminal_layer = if debug {
        fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .pretty()
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .compact()
            .boxed()
    };

    tracing_subscriber::registry()
        .with(terminal_layer.with_filter(env_filter))
        .init();
}

async fn serve(config: DropiqConfig) -> Result<(), ServerError> {
    let address = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config).await?;
    let db = state.db.clone();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    info!("DropIQ listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
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
