use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use luminaweb::api;
use luminaweb::error::ErrorResponse;
use luminaweb::models::{AppConfig, PROXY_PATH};
use luminaweb::server;
use luminaweb::services::url_signer::{random_secret, MAX_GRANT_TTL_SECS};
use luminaweb::services::GrantSigner;

#[derive(Parser)]
#[command(name = "luminaweb")]
#[command(about = "LuminaWeb screenshot service - signed proxy URLs for website screenshots")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Issue a signed proxy URL for a target URL
    Sign {
        /// Absolute http(s) URL to authorize
        url: String,

        /// Grant lifetime in seconds (defaults to GRANT_TTL_SECS or 3600)
        #[arg(long)]
        ttl: Option<i64>,
    },
    /// Check a signed URL's parameters
    Verify {
        /// Target URL from the grant
        url: String,

        /// Expiry timestamp (Unix seconds)
        expires: String,

        /// Hex signature
        signature: String,
    },
    /// Print a freshly generated random signing secret
    Secret,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "LuminaWeb Screenshot API",
        description = "Website screenshots behind signed, expiring proxy URLs",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(api::handle_capture, api::handle_proxy),
    components(schemas(api::CaptureRequest, api::CaptureResponse, ErrorResponse)),
    tags(
        (name = "Screenshots", description = "Screenshot capture and signed image proxy")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => run_server().await,
        Some(Commands::Sign { url, ttl }) => run_sign_command(&url, ttl),
        Some(Commands::Verify {
            url,
            expires,
            signature,
        }) => run_verify_command(&url, &expires, &signature),
        Some(Commands::Secret) => {
            println!("{}", hex::encode(random_secret()));
            Ok(())
        }
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Minimal logging for one-shot CLI commands
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "luminaweb=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

fn load_signer(ttl_override: Option<i64>) -> anyhow::Result<GrantSigner> {
    let config = AppConfig::from_env()?;
    let ttl = ttl_override.unwrap_or(config.grant_ttl_secs);
    if !(1..=MAX_GRANT_TTL_SECS).contains(&ttl) {
        anyhow::bail!("TTL must be between 1 and {MAX_GRANT_TTL_SECS} seconds, got {ttl}");
    }
    Ok(GrantSigner::new(config.signing_secret()?)?.with_ttl(ttl))
}

fn run_sign_command(url: &str, ttl: Option<i64>) -> anyhow::Result<()> {
    init_cli_logging();

    let target_url = api::capture::validate_target_url(url)?;
    let signer = load_signer(ttl)?;
    let grant = signer.issue_grant(target_url);

    println!("{}", grant.proxy_path(PROXY_PATH));
    println!(
        "expires: {}",
        chrono::DateTime::<chrono::Utc>::from_timestamp(grant.expires_at, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| grant.expires_at.to_string())
    );

    Ok(())
}

fn run_verify_command(url: &str, expires: &str, signature: &str) -> anyhow::Result<()> {
    init_cli_logging();

    let signer = load_signer(None)?;
    match signer.verify_grant(Some(url), Some(expires), Some(signature)) {
        Ok(()) => {
            println!("valid");
            Ok(())
        }
        Err(e) => {
            println!("rejected: {e}");
            std::process::exit(1);
        }
    }
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    fn describe(name: &str, secret: bool) -> String {
        match std::env::var(name) {
            Ok(v) if !v.is_empty() && secret => "(set)".to_string(),
            Ok(v) if !v.is_empty() => v,
            _ => "(not set)".to_string(),
        }
    }

    println!("LuminaWeb v{VERSION} - screenshot service\n");

    println!("Environment Variables:");
    println!("  CONFIG_FILE           = {}", describe("CONFIG_FILE", false));
    println!(
        "  BIND_ADDR             = {}",
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000 (default)".to_string())
    );
    println!("  SIGNING_SECRET        = {}", describe("SIGNING_SECRET", true));
    println!("  SCREENSHOT_API_URL    = {}", describe("SCREENSHOT_API_URL", false));
    println!("  SCREENSHOT_API_KEY    = {}", describe("SCREENSHOT_API_KEY", true));
    println!("  GRANT_TTL_SECS        = {}", describe("GRANT_TTL_SECS", false));
    println!("  UPSTREAM_TIMEOUT_SECS = {}", describe("UPSTREAM_TIMEOUT_SECS", false));

    println!("\nCommands:");
    println!("  luminaweb serve    Start the HTTP server");
    println!("  luminaweb sign     Issue a signed proxy URL");
    println!("  luminaweb verify   Check a signed URL");
    println!("  luminaweb secret   Generate a signing secret");
    println!("\nRun 'luminaweb --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "luminaweb=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Fails fast when SIGNING_SECRET or the upstream API settings are missing
    let config = AppConfig::from_env()?;
    let state = server::create_app_state(&config)?;

    tracing::info!(
        grant_ttl_secs = config.grant_ttl_secs,
        upstream_timeout_secs = config.screenshot.timeout_secs,
        rate_limit = config.rate_limit.max_requests,
        rate_window_secs = config.rate_limit.window_secs,
        "Configuration loaded"
    );

    let _sweeper = state.rate_limiter.spawn_sweeper(Duration::from_secs(
        config.rate_limit.sweep_interval_secs.max(1),
    ));

    let app = server::build_router(state)
        // OpenAPI documentation (production only)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "LuminaWeb server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
