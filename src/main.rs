use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_relay::{
    config::{Config, defaults::DEFAULT_CONFIG_FILE},
    data_mapping::MappingTable,
    errors::AppResult,
    ingestor::{PlaylistLoader, PlaylistSource},
    proxy::{PlaylistGenerator, ProxyIdentity, initialize_playlist},
    utils::UrlUtils,
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "m3u-relay")]
#[command(version)]
#[command(about = "Rewrites an M3U playlist so every stream is fetched through this relay")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Port written into relay URLs when it differs from the listening port
    #[arg(long, value_name = "PORT")]
    advertised_port: Option<u16>,

    /// Source playlist URL or file (overrides config file)
    #[arg(long, value_name = "SOURCE")]
    playlist: Option<String>,

    /// Mapping rules file (overrides config file)
    #[arg(short, long, value_name = "FILE")]
    mapping: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("m3u_relay={},tower_http=trace", cli.log_level)
    } else {
        format!("m3u_relay={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting M3U Relay v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(port) = cli.advertised_port {
        config.web.advertised_port = Some(port);
    }
    if let Some(playlist) = cli.playlist {
        config.playlist.source = playlist;
    }
    if let Some(mapping) = cli.mapping {
        config.playlist.mapping_path = Some(mapping);
    }
    config.validate()?;

    let identity = ProxyIdentity::from_config(&config);
    info!(
        "Relay URLs use {}://{}:{} (token {})",
        identity.scheme(),
        identity.stream_host(),
        identity.advertised_port,
        identity.anti_collision_token
    );

    let table = load_mapping(&config)?;

    let source = PlaylistSource::parse(&config.playlist.source);
    let playlist = PlaylistLoader::new().load(&source).await?;

    // The playlist is written and synced before anything is served
    let output_path = config.playlist.resolve_output_path();
    let generator = PlaylistGenerator::new(&identity, &table)
        .append_under_matched_key(config.playlist.append_tags_under_matched_key);
    let rewritten = initialize_playlist(playlist, &generator, &output_path)?;

    let state = AppState::new(rewritten, identity);
    let web_server = WebServer::new(&config, state)?;
    info!(
        "Serving playlist at http://{}:{}{}/iptv.m3u",
        web_server.host(),
        web_server.port(),
        UrlUtils::endpoint_prefix(config.web.custom_endpoint.as_deref())
    );

    web_server.serve().await?;
    info!("M3U Relay stopped");
    Ok(())
}

/// A configured but missing mapping file stops startup; a malformed one
/// leaves the usable rules in place
fn load_mapping(config: &Config) -> AppResult<MappingTable> {
    let Some(path) = config.playlist.mapping_path.as_ref() else {
        info!("No mapping file configured, tracks are relayed unchanged");
        return Ok(MappingTable::default());
    };

    Ok(MappingTable::load(path)?.table)
}
