use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use showreel::content::{ContentSource, FallbackSource, NotionSource, StaticSource};
use showreel::media::MediaResolver;
use showreel::player::{HeadlessSurface, HttpPrefetcher, PlaybackController, PlayerEvent, PlayerEventHandler};
use showreel::server::{self, AppState};
use showreel::utils::Config;

/// showreel - portfolio backend with CMS fallback and CDN media
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file to use instead of the system and user files
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// JSON dataset served when the CMS is unavailable
    #[arg(long, value_name = "FILE")]
    content: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,

    /// Walk the project playlist headlessly and print each item
    Playlist,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => Config::load()?,
    };

    if let Some(bind) = &args.bind {
        config.server.bind_addr = bind.clone();
    }
    config.validate()?;

    let log_level = if args.debug { "debug" } else { config.general.log_level.as_str() };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting showreel v{}", env!("CARGO_PKG_VERSION"));

    let content = build_content_source(&config, args.content.as_deref())?;
    let media = MediaResolver::new(config.cdn.public_url.clone());
    if !media.is_configured() {
        warn!("CDN public URL is not configured, asset requests will fail");
    }

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let addr: SocketAddr = config
                .server
                .bind_addr
                .parse()
                .with_context(|| format!("invalid bind address {}", config.server.bind_addr))?;

            let app = server::router(AppState::new(content, media), config.server.cors_allow_any);
            server::serve(addr, app, shutdown_signal()).await?;
        }
        Command::Playlist => print_playlist(content.as_ref(), media, &config).await?,
    }

    Ok(())
}

fn build_content_source(config: &Config, dataset: Option<&std::path::Path>) -> Result<Arc<dyn ContentSource>> {
    let fallback = match dataset {
        Some(path) => StaticSource::from_json_file(path)
            .with_context(|| format!("failed to load content from {}", path.display()))?,
        None => StaticSource::bundled(),
    };

    let notion = NotionSource::new(&config.notion)?;
    Ok(Arc::new(FallbackSource::new(Box::new(notion), fallback)))
}

async fn print_playlist(content: &dyn ContentSource, media: MediaResolver, config: &Config) -> Result<()> {
    let items = content.list().await?;
    info!("{} items from {}", items.len(), content.name());

    let mut controller = PlaybackController::new(items, Box::new(HeadlessSurface::default()), config.player.clone())
        .with_resolver(media);
    if config.player.prefetch_bytes > 0 {
        controller = controller.with_prefetcher(Box::new(HttpPrefetcher::new(config.player.prefetch_bytes)?));
    }
    controller.add_event_handler(Box::new(LoggingEventHandler));

    for index in 0..controller.state().len() {
        controller.select_index(index)?;

        let poster = match controller.poster_for(index) {
            Ok(poster) => poster.unwrap_or_default(),
            Err(e) => {
                error!("No poster for item {}: {}", index, e);
                String::new()
            }
        };

        if let Some(item) = controller.current_item() {
            let kind = if item.is_playable() { "video" } else { "image" };
            println!("{:>3}  {:<40} {:<6} {}", index + 1, item.title, kind, poster);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Event handler that logs events
struct LoggingEventHandler;

impl PlayerEventHandler for LoggingEventHandler {
    fn handle_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::SelectionChanged { index, item } => info!("Selected {} at {}", item, index),
            PlayerEvent::MediaFailed { item, message } => error!("Media {} failed: {}", item, message),
            PlayerEvent::ProgressChanged { fraction } => {
                // Progress is chatty, keep it at debug
                debug!("Progress: {:.1}%", fraction * 100.0);
            }
            other => debug!("Player event: {:?}", other),
        }
    }
}
