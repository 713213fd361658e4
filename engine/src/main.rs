// Picklight work sequencer
// Main entry point for the picklight binary

use clap::Parser;
use picklight_engine::cli::{Cli, Command, ConfigAction};
use picklight_engine::config::Config;
use picklight_engine::handlers::{
    handle_config_path, handle_config_show, handle_range, handle_sequence, OutputFormat,
};
use picklight_engine::telemetry::{init_telemetry_with_level, with_bootstrap_logging};

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided). The configured
    // subscriber needs the config, so warnings raised while loading go to a
    // bootstrap subscriber.
    let config = with_bootstrap_logging(cli.log.as_deref(), || match &cli.config {
        Some(config_path) => Config::load_from_path(config_path),
        None => Config::load_or_create(),
    })?;

    // --log overrides the configured level; RUST_LOG overrides both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::debug!("Picklight v{} ({} - {})", version, commit, timestamp);

    // Handle commands
    match cli.command {
        Command::Sequence {
            layout,
            tasks,
            facility,
            cart,
        } => {
            tracing::info!("Computing work for cart {}", cart);
            handle_sequence(&layout, &tasks, facility.as_deref(), &cart, &config, format)
        }

        Command::Range {
            first,
            last,
            width,
            offset,
            far_anchor,
            slot,
            cap,
        } => handle_range(first, last, width, offset, far_anchor, slot, cap, format),

        Command::Config { action } => {
            tracing::debug!("Config management: {:?}", action);
            match action {
                ConfigAction::Show => handle_config_show(&config, format),
                ConfigAction::Path => handle_config_path(cli.config.as_deref(), format),
            }
        }
    }
}
