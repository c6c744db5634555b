use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shoplist::catalog;
use shoplist::config::{SameSitePolicy, ServerConfig};
use shoplist::server::{AppState, create_router};
use shoplist::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "shoplist")]
#[command(about = "A shared shopping-list server", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "SHOPLIST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and seed the unit and product catalogs
    Init {
        /// Data directory for the database
        #[arg(long, env = "SHOPLIST_DATA_DIR")]
        data_dir: Option<PathBuf>,
    },

    /// Start the server
    Serve(ServeArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Host to bind to
    #[arg(long, env = "SHOPLIST_HOST")]
    host: Option<String>,

    /// Port to bind to
    #[arg(long, short, env = "SHOPLIST_PORT")]
    port: Option<u16>,

    /// Data directory for the database
    #[arg(long, env = "SHOPLIST_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Public URL of the web app (e.g., "https://lists.example.com").
    /// Used to render share links.
    #[arg(long, env = "SHOPLIST_APP_BASE_URL")]
    app_base_url: Option<String>,

    /// Google OAuth client id. Google sign-in is disabled when unset.
    #[arg(long, env = "SHOPLIST_GOOGLE_CLIENT_ID")]
    google_client_id: Option<String>,

    /// Secret used to sign session tokens
    #[arg(long, env = "SHOPLIST_SESSION_SECRET", hide_env_values = true)]
    session_secret: Option<String>,

    /// Session lifetime in minutes
    #[arg(long, env = "SHOPLIST_SESSION_TTL_MINUTES")]
    session_ttl_minutes: Option<i64>,

    /// Name of the session cookie
    #[arg(long, env = "SHOPLIST_COOKIE_NAME")]
    cookie_name: Option<String>,

    /// Mark the session cookie Secure
    #[arg(long, env = "SHOPLIST_COOKIE_SECURE")]
    cookie_secure: Option<bool>,

    /// SameSite policy for the session cookie: lax, strict or none
    #[arg(long, env = "SHOPLIST_COOKIE_SAME_SITE")]
    cookie_same_site: Option<String>,

    /// Domain attribute for the session cookie
    #[arg(long, env = "SHOPLIST_COOKIE_DOMAIN")]
    cookie_domain: Option<String>,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => Ok(ServerConfig::load(path)?),
        None => Ok(ServerConfig::default()),
    }
}

fn apply_overrides(config: &mut ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(url) = args.app_base_url {
        config.app_base_url = url;
    }
    if let Some(client_id) = args.google_client_id {
        config.google_client_id = Some(client_id);
    }
    if let Some(secret) = args.session_secret {
        config.session.secret = Some(secret);
    }
    if let Some(ttl) = args.session_ttl_minutes {
        config.session.ttl_minutes = ttl;
    }
    if let Some(name) = args.cookie_name {
        config.session.cookie_name = name;
    }
    if let Some(secure) = args.cookie_secure {
        config.session.cookie_secure = secure;
    }
    if let Some(same_site) = args.cookie_same_site {
        config.session.cookie_same_site = SameSitePolicy::parse(&same_site)
            .with_context(|| format!("invalid cookie SameSite policy '{same_site}'"))?;
    }
    if let Some(domain) = args.cookie_domain {
        config.session.cookie_domain = Some(domain);
    }
    Ok(())
}

fn run_init(config: &ServerConfig) -> anyhow::Result<()> {
    fs::create_dir_all(&config.data_dir)?;

    let db_path = config.db_path();
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;
    catalog::seed(&store)?;

    println!("Database ready at {}", db_path.display());
    Ok(())
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    if !config.db_path().exists() {
        bail!(
            "Database not found at {}. Run 'shoplist init' first.",
            config.db_path().display()
        );
    }

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    if config.google_client_id.is_none() {
        info!("Google sign-in disabled (no client id configured)");
    }

    let state = Arc::new(AppState::new(Arc::new(store), &config));
    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("shoplist=info".parse()?))
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Init { data_dir } => {
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }
            run_init(&config)?;
        }
        Commands::Serve(args) => {
            apply_overrides(&mut config, args)?;
            run_serve(config).await?;
        }
    }

    Ok(())
}
