//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - sequence: compute a cart's work list from JSON fixtures
//! - range: compute one indicator range
//! - config show / path: inspect the effective configuration
//!
//! Each handler has a pure counterpart returning the computed value, which the
//! handler prints in the requested [`OutputFormat`].

use anyhow::{bail, Context, Result};
use chrono::Utc;
use sdk::types::{LocationId, Task};
use sdk::Topology;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::geometry::{compute_range, IndicatorRange};
use crate::topology::FacilityLayout;
use crate::work::{compute_work, CartContext, WorkPlan};

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Load fixtures and compute the work list for a cart
///
/// Tasks without a cart are assigned to `cart` first.
pub fn run_sequence(
    layout_path: &Path,
    tasks_path: &Path,
    facility: Option<&str>,
    cart: &str,
    config: &Config,
) -> Result<WorkPlan> {
    let layout = FacilityLayout::load(layout_path)
        .with_context(|| format!("Failed to load layout {}", layout_path.display()))?;

    if let Some(facility) = facility {
        if layout.facility() != &LocationId::from(facility) {
            bail!(
                "Layout {} describes facility {}, not {}",
                layout_path.display(),
                layout.facility(),
                facility
            );
        }
    }

    let contents = fs::read_to_string(tasks_path)
        .with_context(|| format!("Failed to read tasks {}", tasks_path.display()))?;
    let mut tasks: Vec<Task> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse tasks {}", tasks_path.display()))?;

    let cart = CartContext::new(cart, config.lighting.default_color);
    cart.assign(&mut tasks, Utc::now());

    Ok(compute_work(&layout, config, &cart, tasks))
}

/// Compute the work list and print it
pub fn handle_sequence(
    layout_path: &Path,
    tasks_path: &Path,
    facility: Option<&str>,
    cart: &str,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let plan = run_sequence(layout_path, tasks_path, facility, cart, config)?;

    match format {
        OutputFormat::Text => {
            println!(
                "Work for {} ({} tasks, {} housekeeping, sequencer {}):",
                cart,
                plan.tasks.len(),
                plan.housekeeping_inserted,
                plan.sequencer
            );
            println!();

            for task in &plan.tasks {
                let location = task
                    .location_id
                    .as_ref()
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {} {:<14} {:<24} {}",
                    task.sort_code.as_deref().unwrap_or("----"),
                    task.id,
                    location,
                    task.led_cmd_stream
                );
            }

            if !plan.unplaced.is_empty() {
                println!();
                println!("Not sequenced ({}):", plan.unplaced.len());
                for task in &plan.unplaced {
                    println!("  {}", task.id);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
    }

    Ok(())
}

/// Compute an indicator range, optionally capped
pub fn run_range(
    first: i32,
    last: i32,
    width: f64,
    offset: f64,
    far_anchor: bool,
    slot: bool,
    cap: Option<i32>,
) -> IndicatorRange {
    let range = compute_range(first, last, !far_anchor, Some(width), Some(offset), slot);
    match cap {
        Some(max) => range.cap(max),
        None => range,
    }
}

/// Compute an indicator range and print it
#[allow(clippy::too_many_arguments)]
pub fn handle_range(
    first: i32,
    last: i32,
    width: f64,
    offset: f64,
    far_anchor: bool,
    slot: bool,
    cap: Option<i32>,
    format: OutputFormat,
) -> Result<()> {
    let range = run_range(first, last, width, offset, far_anchor, slot, cap);

    match format {
        OutputFormat::Text => {
            if range.is_zero() {
                println!("Nothing to light");
            } else {
                println!("{} ({} positions)", range.range_string(), range.len());
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "first": range.first,
                "last": range.last,
                "count": range.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Print the effective configuration
pub fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let toml_string =
                toml::to_string_pretty(config).context("Failed to serialize config")?;
            print!("{}", toml_string);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}

/// Print the configuration file path
pub fn handle_config_path(explicit: Option<&Path>, format: OutputFormat) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_path()?,
    };

    match format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => println!("{}", json!({ "path": path.display().to_string() })),
    }
    Ok(())
}
