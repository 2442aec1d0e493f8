//! airguide - live channel program guide for the terminal.

/// Application configuration (TOML).
mod config;
/// Log-line render surface.
mod render;
/// Schedule source selection.
mod source;
/// Terminal UI components.
mod tui;

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Mutex;

use airguide_api::xmltv::{FileSource, GuideError, XmltvClient};
use airguide_engine::{ChannelRenderer, EngineSettings, GuideEngine};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{AppConfig, resolve_config_path, resolve_log_path};
use crate::render::LogRenderer;
use crate::source::ScheduleSource;
use crate::tui::run_guide_viewer;

/// User-Agent sent with guide requests.
const USER_AGENT: &str = concat!("airguide/", env!("CARGO_PKG_VERSION"));

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Load the schedule once and print the upcoming programs.
    Show(SourceArgs),
    /// Keep the guide current and log every redraw until Ctrl-C.
    Watch(SourceArgs),
    /// Browse the live guide in an interactive terminal viewer.
    Tui(SourceArgs),
    /// Manage the config file.
    Config(ConfigCommand),
}

/// Where the schedule comes from.
#[derive(clap::Args)]
struct SourceArgs {
    /// Read the XMLTV document from a local file instead of HTTP.
    #[arg(long)]
    file: Option<PathBuf>,

    /// XMLTV document URL (default: from config).
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,

    /// Channel identifier (e.g. "C1.145.ersatztv.org").
    #[arg(long)]
    channel: Option<String>,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write a config file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config.
    Show,
}

/// Builds the schedule source and engine settings from args and config.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or holds invalid values.
fn prepare(args: &SourceArgs, dir: Option<&PathBuf>) -> Result<(ScheduleSource, EngineSettings)> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;

    let mut guide = config.guide;
    if let Some(channel) = &args.channel {
        guide.channel_id.clone_from(channel);
    }
    let settings = guide.engine_settings()?;

    let source = if let Some(path) = &args.file {
        ScheduleSource::File(FileSource::new(path.clone()))
    } else {
        let raw = args.url.as_deref().unwrap_or(&guide.url);
        let url = Url::parse(raw).with_context(|| format!("invalid guide URL: {raw}"))?;
        let client = XmltvClient::builder()
            .url(url)
            .user_agent(USER_AGENT)
            .timeout(guide.timeout())
            .build()?;
        ScheduleSource::Http(client)
    };

    Ok((source, settings))
}

/// Runs the `show` subcommand.
///
/// "Nothing to show" outcomes are logged and exit successfully.
///
/// # Errors
///
/// Returns an error if the schedule could not be fetched or parsed.
#[instrument(skip_all)]
async fn run_show(args: &SourceArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (source, settings) = prepare(args, dir)?;
    let mut engine = GuideEngine::new(source, LogRenderer, settings);

    match engine.refresh().await {
        Ok(_) | Err(GuideError::NoScheduleData(_) | GuideError::EmptyTimeline) => Ok(()),
        Err(e) => Err(anyhow::Error::new(e).context("failed to load schedule")),
    }
}

/// Runs the `watch` subcommand.
///
/// # Errors
///
/// Returns an error if setup fails or Ctrl-C cannot be awaited.
#[instrument(skip_all)]
async fn run_watch(args: &SourceArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (source, settings) = prepare(args, dir)?;
    let handle = GuideEngine::new(source, LogRenderer, settings).start();

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    handle.stop().await;
    Ok(())
}

/// Runs the `tui` subcommand.
///
/// # Errors
///
/// Returns an error if setup or the viewer fails.
#[instrument(skip_all)]
async fn run_tui(args: &SourceArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (source, settings) = prepare(args, dir)?;
    let channel_id = settings.channel_id.clone();
    let (renderer, updates) = ChannelRenderer::channel();
    let handle = GuideEngine::new(source, renderer, settings).start();

    let viewer = tokio::task::spawn_blocking(move || run_guide_viewer(updates, &channel_id)).await;
    handle.stop().await;

    viewer
        .context("guide viewer task failed")?
        .context("guide viewer TUI failed")
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if the file exists (without `--force`) or cannot be written.
fn run_config_init(force: bool, dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    AppConfig::default()
        .save(&config_path)
        .context("failed to save config")?;
    tracing::info!("Wrote {}", config_path.display());
    Ok(())
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or serialized.
fn run_config_show(dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;

    tracing::info!("Config file: {}", config_path.display());
    for line in config.to_toml()?.lines() {
        tracing::info!("  {}", line);
    }
    Ok(())
}

/// Chooses the log writer: a file while the viewer owns the terminal,
/// stdout otherwise.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
fn log_writer(cli: &Cli) -> Result<(BoxMakeWriter, bool)> {
    if !matches!(cli.command, Commands::Tui(_)) {
        return Ok((
            BoxMakeWriter::new(std::io::stdout),
            std::io::stdout().is_terminal(),
        ));
    }

    let log_path = resolve_log_path(cli.dir.as_ref()).context("failed to resolve log path")?;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;
    Ok((BoxMakeWriter::new(Mutex::new(file)), false))
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (writer, ansi) = log_writer(&cli)?;

    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    match &cli.command {
        Commands::Show(args) => run_show(args, cli.dir.as_ref()).await,
        Commands::Watch(args) => run_watch(args, cli.dir.as_ref()).await,
        Commands::Tui(args) => run_tui(args, cli.dir.as_ref()).await,
        Commands::Config(cmd) => match cmd.command {
            ConfigSubcommands::Init { force } => run_config_init(force, cli.dir.as_ref()),
            ConfigSubcommands::Show => run_config_show(cli.dir.as_ref()),
        },
    }
}
