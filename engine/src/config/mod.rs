//! Configuration management
//!
//! This module handles loading, validation, and lookup of the picklight
//! configuration. Configuration is stored in TOML format at
//! ~/.picklight/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: log level
//! - **defaults**: sequencer and housekeeping policies used by every facility
//! - **facilities**: per-facility overrides of the defaults, keyed by facility id
//! - **lighting**: colour for carts that do not carry their own
//!
//! # Facility properties
//!
//! The engine never caches facility settings. [`FacilitySettings::resolve`]
//! reads them through a [`PropertySource`] on every compute-work call, so a
//! changed configuration takes effect on the next cart setup. Unknown values
//! are logged and replaced by the defaults (`BayDistance`, no housekeeping).
//!
//! # Examples
//!
//! ```no_run
//! use picklight_engine::config::{Config, FacilitySettings};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! let settings = FacilitySettings::resolve(&config, "F1");
//! println!("Sequencer: {}", settings.sequencer);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use sdk::types::Color;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::housekeeping::{BayChangePolicy, HousekeepingPolicy, RepeatPosPolicy};
use crate::sequencer::SequencerKind;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    pub core: CoreConfig,

    /// Settings applied to every facility without an override
    #[serde(default)]
    pub defaults: PolicyConfig,

    /// Per-facility overrides
    #[serde(default)]
    pub facilities: BTreeMap<String, PolicyOverrides>,

    /// Lighting settings
    #[serde(default)]
    pub lighting: LightingConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Policy values, kept as the strings found in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_sequencer")]
    pub sequencer: String,

    #[serde(default = "default_policy_none")]
    pub bay_change: String,

    #[serde(default = "default_policy_none")]
    pub repeat_pos: String,
}

/// Facility override; unset keys fall back to `[defaults]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequencer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bay_change: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_pos: Option<String>,
}

/// Lighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingConfig {
    /// Colour used when a cart has none configured
    #[serde(default)]
    pub default_color: Color,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sequencer() -> String {
    SequencerKind::BayDistance.as_str().to_string()
}

fn default_policy_none() -> String {
    "None".to_string()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            sequencer: default_sequencer(),
            bay_change: default_policy_none(),
            repeat_pos: default_policy_none(),
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            default_color: Color::Blue,
        }
    }
}

/// Facility-scoped configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacilityProperty {
    /// Work sequencer name
    WorkSequencer,
    /// Bay-change housekeeping policy
    BayChange,
    /// Repeated-position housekeeping policy
    RepeatPos,
}

impl FacilityProperty {
    /// Property code as stored by the configuration service
    pub fn code(self) -> &'static str {
        match self {
            Self::WorkSequencer => "WORKSEQR",
            Self::BayChange => "BAYCHANG",
            Self::RepeatPos => "RPEATPOS",
        }
    }
}

impl fmt::Display for FacilityProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Source of facility-scoped configuration values
pub trait PropertySource {
    /// Raw value of `property` for `facility`, `None` if unset
    fn property(&self, facility: &str, property: FacilityProperty) -> Option<String>;
}

impl PropertySource for Config {
    fn property(&self, facility: &str, property: FacilityProperty) -> Option<String> {
        let overrides = self.facilities.get(facility);
        let value = match property {
            FacilityProperty::WorkSequencer => overrides
                .and_then(|o| o.sequencer.clone())
                .unwrap_or_else(|| self.defaults.sequencer.clone()),
            FacilityProperty::BayChange => overrides
                .and_then(|o| o.bay_change.clone())
                .unwrap_or_else(|| self.defaults.bay_change.clone()),
            FacilityProperty::RepeatPos => overrides
                .and_then(|o| o.repeat_pos.clone())
                .unwrap_or_else(|| self.defaults.repeat_pos.clone()),
        };
        Some(value)
    }
}

impl PropertySource for HashMap<(String, FacilityProperty), String> {
    fn property(&self, facility: &str, property: FacilityProperty) -> Option<String> {
        self.get(&(facility.to_string(), property)).cloned()
    }
}

/// Parsed settings of one facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FacilitySettings {
    pub sequencer: SequencerKind,
    pub housekeeping: HousekeepingPolicy,
}

impl FacilitySettings {
    /// Read and parse the settings of `facility`
    ///
    /// Never fails: a missing or unknown value is logged at error level and
    /// the default for that key is used.
    pub fn resolve<P: PropertySource + ?Sized>(source: &P, facility: &str) -> Self {
        let sequencer = parse_or_default(source, facility, FacilityProperty::WorkSequencer);
        let bay_change: BayChangePolicy =
            parse_or_default(source, facility, FacilityProperty::BayChange);
        let repeat_pos: RepeatPosPolicy =
            parse_or_default(source, facility, FacilityProperty::RepeatPos);

        Self {
            sequencer,
            housekeeping: HousekeepingPolicy::new(bay_change, repeat_pos),
        }
    }
}

fn parse_or_default<P, T>(source: &P, facility: &str, property: FacilityProperty) -> T
where
    P: PropertySource + ?Sized,
    T: std::str::FromStr<Err = EngineError> + Default,
{
    let Some(raw) = source.property(facility, property) else {
        tracing::error!(facility, property = %property, "facility property not set, using default");
        return T::default();
    };

    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(facility, property = %property, error = %e, "using default");
            T::default()
        }
    }
}

/// Canonical form of a policy or sequencer name
///
/// Lowercase, with underscores, hyphens and whitespace removed, so that
/// `BayChange`, `bay_change` and `Bay Change` compare equal.
pub fn canonical_form(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '_' | '-') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl Config {
    /// Load configuration from the default location (~/.picklight/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the file cannot be written.
    pub fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default_config();
        config.validate_and_process()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.picklight/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".picklight").join("config.toml"))
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            core: CoreConfig {
                log_level: default_log_level(),
            },
            defaults: PolicyConfig::default(),
            facilities: BTreeMap::new(),
            lighting: LightingConfig::default(),
        }
    }

    /// Validate configuration
    ///
    /// The log level must be valid. Policy names are only checked for a
    /// warning here: they are re-read and re-parsed on every compute-work
    /// call, where an unknown value falls back to its default.
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        self.core.log_level = self.core.log_level.to_lowercase();
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        let mut scopes: Vec<(&str, PolicyOverrides)> = vec![(
            "defaults",
            PolicyOverrides {
                sequencer: Some(self.defaults.sequencer.clone()),
                bay_change: Some(self.defaults.bay_change.clone()),
                repeat_pos: Some(self.defaults.repeat_pos.clone()),
            },
        )];
        scopes.extend(
            self.facilities
                .iter()
                .map(|(id, overrides)| (id.as_str(), overrides.clone())),
        );

        for (scope, values) in scopes {
            if let Some(Err(e)) = values.sequencer.as_deref().map(str::parse::<SequencerKind>) {
                tracing::warn!(scope, error = %e, "configured sequencer will fall back to default");
            }
            if let Some(Err(e)) = values.bay_change.as_deref().map(str::parse::<BayChangePolicy>) {
                tracing::warn!(scope, error = %e, "configured policy will fall back to default");
            }
            if let Some(Err(e)) = values.repeat_pos.as_deref().map(str::parse::<RepeatPosPolicy>) {
                tracing::warn!(scope, error = %e, "configured policy will fall back to default");
            }
        }

        Ok(())
    }
}
