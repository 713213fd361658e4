//! CLI interface for picklight
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags. The CLI is a development surface
//! over the engine: it reads layouts and task lists from JSON files and prints
//! the computed work.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Picklight work sequencer
///
/// Orders a cart's pick and put tasks along the facility path, inserts
/// housekeeping acknowledgments and computes the indicator lighting for
/// each task.
#[derive(Parser, Debug)]
#[command(name = "picklight")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the work list for a cart
    Sequence {
        /// Facility layout (JSON)
        #[arg(long, value_name = "FILE")]
        layout: PathBuf,

        /// Candidate tasks (JSON array)
        #[arg(long, value_name = "FILE")]
        tasks: PathBuf,

        /// Facility the layout must describe
        #[arg(long)]
        facility: Option<String>,

        /// Cart the work is computed for
        #[arg(long, default_value = "CHE1")]
        cart: String,
    },

    /// Compute the indicator range for an offset within a location
    #[command(allow_negative_numbers = true)]
    Range {
        /// First indicator address of the location
        first: i32,

        /// Last indicator address of the location
        last: i32,

        /// Location width in meters
        width: f64,

        /// Offset from the anchor in meters
        offset: f64,

        /// The first address sits at the far end from the anchor
        #[arg(long)]
        far_anchor: bool,

        /// The location is a single-SKU slot
        #[arg(long)]
        slot: bool,

        /// Cap the range to this many positions
        #[arg(long, value_name = "N")]
        cap: Option<i32>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,
}
