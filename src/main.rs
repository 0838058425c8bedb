use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use glyphsnap::api;
use glyphsnap::assets::IconCatalog;
use glyphsnap::models::{AppConfig, SizeToken};
use glyphsnap::rendering::{normalize_default, StaticRenderer};
use glyphsnap::server;

#[derive(Parser)]
#[command(name = "glyphsnap")]
#[command(about = "Glyphsnap - icon/token rendering service for the design-system search index")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP render service
    Serve,
    /// Render an icon statically to an SVG file (no server, no browser)
    Render {
        /// Icon name from the embedded catalog
        #[arg(short, long)]
        icon: String,

        /// Output SVG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Size token: s, m, l or xl
        #[arg(short, long, default_value = "xl")]
        size: String,

        /// Write the raw component SVG instead of the normalized form
        #[arg(long)]
        raw: bool,
    },
    /// List the embedded icon catalog
    Icons,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Glyphsnap API",
        description = "Rendering microservice turning icon/token identifiers into canonical SVG and PNG artifacts",
        version = "0.3.0",
        license(name = "MIT")
    ),
    paths(
        api::handle_health,
        api::handle_render_icon,
        api::handle_render_svg,
        api::handle_render_token,
        api::handle_render_markup,
        api::handle_render_icons,
        api::handle_render_tokens,
        api::handle_render_markups,
    ),
    components(schemas(
        api::HealthResponse,
        api::RenderRequest,
        api::RenderIconResponse,
        api::RenderSvgResponse,
        api::RenderTokenResponse,
        api::RenderMarkupResponse,
        api::RenderIconsResponse,
        api::RenderTokensResponse,
        api::RenderMarkupsResponse,
        api::IconBatchResult,
        api::TokenBatchResult,
        api::MarkupBatchResult,
        glyphsnap::models::ComponentKind,
        glyphsnap::models::SizeToken,
    )),
    tags(
        (name = "Service", description = "Liveness"),
        (name = "Render", description = "Icon and token rendering")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => run_server().await,
        Some(Commands::Render {
            icon,
            output,
            size,
            raw,
        }) => run_render_command(&icon, &output, &size, raw),
        Some(Commands::Icons) => {
            for name in IconCatalog::list() {
                println!("{name}");
            }
            Ok(())
        }
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Render an icon statically to a file (no server needed)
fn run_render_command(icon: &str, output: &PathBuf, size: &str, raw: bool) -> anyhow::Result<()> {
    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glyphsnap=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let size = SizeToken::parse(size)
        .ok_or_else(|| anyhow::anyhow!("Invalid size '{size}': expected one of s, m, l, xl"))?;

    let renderer = StaticRenderer::new()?;
    let svg = renderer
        .render_to_svg(icon, size)
        .ok_or_else(|| anyhow::anyhow!("Unknown icon '{icon}' (run 'glyphsnap icons' to list)"))?;

    let svg = if raw {
        svg
    } else {
        normalize_default(&svg)
            .ok_or_else(|| anyhow::anyhow!("Normalization produced no output for '{icon}'"))?
    };

    std::fs::write(output, &svg)?;
    println!("Rendered {} ({} bytes)", output.display(), svg.len());

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let config = AppConfig::from_env();

    println!("Glyphsnap v{VERSION} - icon/token rendering service\n");

    println!("Environment Variables:");
    println!("  BIND_ADDR             = {}", config.bind_addr);
    println!("  PUBLIC_BASE_URL       = {}", config.public_base_url);
    println!("  RATE_LIMIT_PER_MINUTE = {}", config.rate_limit_per_minute);
    println!("  PREVIEW_DIR           = {}", config.preview_dir.display());
    println!(
        "  ELEMENT_TIMEOUT_SECS  = {}",
        config.element_timeout.as_secs()
    );

    let preview_state = if config.preview_dir.join("index.html").is_file() {
        "built"
    } else {
        "missing (headless rendering unavailable)"
    };
    println!("\nPreview bundle: {preview_state}");
    println!("Embedded icons: {}", IconCatalog::list().len());

    println!("\nCommands:");
    println!("  glyphsnap serve     Start the HTTP render service");
    println!("  glyphsnap render    Render an icon statically to a file");
    println!("  glyphsnap icons     List the embedded icon catalog");
    println!("\nRun 'glyphsnap --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glyphsnap=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(AppConfig::from_env());

    tracing::info!(
        bind = %config.bind_addr,
        base_url = %config.public_base_url,
        rate_limit = config.rate_limit_per_minute,
        preview = %config.preview_dir.display(),
        "Configuration loaded"
    );

    let state = server::create_app_state(config.clone())?;

    // The sweeper only bounds the window map; reads stay correct without it.
    state.limiter.spawn_sweeper();

    let app = server::build_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Glyphsnap server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Dropping the state here tears the headless browser down with the
    // process.
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolve on SIGINT or SIGTERM so the browser gets an orderly teardown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
