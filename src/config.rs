//! Configuration and path resolution.
//!
//! INI parser for config.ini ([map], [geocoder], [occupancy]).
//! Lot table and geocoder aliases in lots.json via serde.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::geo::Coord;
use crate::lot::{self, Lot};
use crate::{DEFAULT_CENTER, DEFAULT_ZOOM, GEOCODE_TIMEOUT_SEC, ZOOM_THRESHOLD};

const MAX_LOTS_FILE: usize = 1 << 20;
const API_KEY_ENV: &str = "PARKMAP_API_KEY";

/// Resolved filesystem paths
#[derive(Clone)]
pub struct Paths {
    pub config_file: PathBuf,
    pub lots_file: PathBuf,
}

impl Paths {
    pub fn init() -> Result<Self, io::Error> {
        let home = std::env::var("HOME").map_err(|_| {
            io::Error::new(io::ErrorKind::NotFound, "HOME not set")
        })?;

        let config_dir = PathBuf::from(&home).join(".config").join("parkmap");
        fs::create_dir_all(&config_dir)?;

        Ok(Self {
            config_file: config_dir.join("config.ini"),
            lots_file: config_dir.join("lots.json"),
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
    TooLarge(usize),
    DuplicateLot(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config: {e}"),
            ConfigError::Parse(e) => write!(f, "Invalid lot table: {e}"),
            ConfigError::TooLarge(n) => write!(f, "Lot table too large ({n} bytes)"),
            ConfigError::DuplicateLot(name) => write!(f, "Duplicate lot name: {name}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyMode {
    Configured,
    Simulated,
}

/// Runtime settings from config.ini
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub zoom_threshold: f64,
    pub center: Coord,
    pub zoom: f64,
    pub api_key: Option<String>,
    pub geocode_timeout: Duration,
    pub occupancy: OccupancyMode,
    pub seed: u64,
    pub probability: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zoom_threshold: ZOOM_THRESHOLD,
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            api_key: None,
            geocode_timeout: Duration::from_secs(GEOCODE_TIMEOUT_SEC),
            occupancy: OccupancyMode::Configured,
            seed: 42,
            probability: crate::occupancy::DEFAULT_PROBABILITY,
        }
    }
}

/// Parse INI content. Unknown keys and unparsable values keep defaults.
pub fn parse_settings(content: &str) -> Settings {
    let mut s = Settings::default();
    let mut section = String::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if trimmed.starts_with('[') {
            section = trimmed.trim_matches(|c| c == '[' || c == ']').to_string();
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match (section.as_str(), key) {
            ("map", "zoom_threshold") => {
                if let Ok(v) = value.parse() {
                    s.zoom_threshold = v;
                }
            }
            ("map", "zoom") => {
                if let Ok(v) = value.parse() {
                    s.zoom = v;
                }
            }
            ("map", "center_lat") => {
                if let Ok(v) = value.parse() {
                    s.center.lat = v;
                }
            }
            ("map", "center_lng") => {
                if let Ok(v) = value.parse() {
                    s.center.lng = v;
                }
            }
            ("geocoder", "api_key") if !value.is_empty() => s.api_key = Some(value.to_string()),
            ("geocoder", "timeout_sec") => {
                if let Ok(v) = value.parse::<f64>() {
                    if v.is_finite() && v > 0.0 {
                        s.geocode_timeout = Duration::from_secs_f64(v);
                    }
                }
            }
            ("occupancy", "mode") => match value {
                "configured" => s.occupancy = OccupancyMode::Configured,
                "simulated" => s.occupancy = OccupancyMode::Simulated,
                other => log::warn!("Unknown occupancy mode '{other}', keeping default"),
            },
            ("occupancy", "seed") => {
                if let Ok(v) = value.parse() {
                    s.seed = v;
                }
            }
            ("occupancy", "probability") => {
                if let Ok(v) = value.parse::<f64>() {
                    s.probability = v.clamp(0.0, 1.0);
                }
            }
            _ => {}
        }
    }

    if s.center.validate().is_err() {
        log::warn!("Invalid map center in config, using default");
        s.center = DEFAULT_CENTER;
    }
    s
}

/// Load settings; a missing config.ini means defaults
pub fn load_settings(paths: &Paths) -> Settings {
    let mut settings = match fs::read_to_string(&paths.config_file) {
        Ok(content) => parse_settings(&content),
        Err(_) => Settings::default(),
    };
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.is_empty() {
            settings.api_key = Some(key);
        }
    }
    settings
}

/// lots.json contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotTable {
    pub lots: Vec<Lot>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub aliases: HashMap<String, Coord>,
}

impl Default for LotTable {
    fn default() -> Self {
        Self {
            lots: lot::default_lots(),
            aliases: HashMap::new(),
        }
    }
}

pub fn parse_lots(content: &str) -> Result<LotTable, ConfigError> {
    if content.len() > MAX_LOTS_FILE {
        return Err(ConfigError::TooLarge(content.len()));
    }
    let table: LotTable = serde_json::from_str(content)?;

    let mut seen = HashSet::new();
    for l in &table.lots {
        if !seen.insert(l.name.as_str()) {
            return Err(ConfigError::DuplicateLot(l.name.clone()));
        }
    }
    Ok(table)
}

/// Load lots.json, falling back to the built-in table when absent
pub fn load_lots(paths: &Paths) -> Result<LotTable, ConfigError> {
    match fs::read_to_string(&paths.lots_file) {
        Ok(content) => parse_lots(&content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("No {}, using built-in lots", paths.lots_file.display());
            Ok(LotTable::default())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn save_lots(paths: &Paths, table: &LotTable) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(table)?;
    fs::write(&paths.lots_file, json)?;
    Ok(())
}
