//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.robochat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! The avatar's state durations are deliberately absent: they are fixed.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::chat::DEFAULT_REPLIES;
use crate::core::surface::{DEFAULT_SURFACE_WIDTH, MAX_SURFACE_HEIGHT};
use crate::speech::SpeechOptions;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RobochatConfig {
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub avatar: AvatarConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SpeechConfig {
    pub enabled: Option<bool>,
    /// Program name or path of the TTS command
    pub command: Option<String>,
    pub lang: Option<String>,
    pub volume: Option<f32>,
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AvatarConfig {
    /// Directory of `<clip>.txt` files overriding the built-in clips
    pub asset_dir: Option<String>,
    pub max_surface_height: Option<u16>,
    pub surface_width: Option<u16>,
    /// UI redraw rate
    pub fps: Option<u16>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    pub replies: Option<Vec<String>>,
    pub recompute_width_on_resize: Option<bool>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_UI_FPS: u16 = 12;
const MAX_UI_FPS: u16 = 60;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub speech_enabled: bool,
    pub speech_command: Option<String>,
    pub speech: SpeechOptions,
    pub asset_dir: Option<PathBuf>,
    pub max_surface_height: u16,
    pub surface_width: u16,
    pub fps: u16,
    pub replies: Vec<String>,
    pub recompute_width_on_resize: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve(&RobochatConfig::default(), &CliOverrides::default())
    }
}

/// Values from CLI flags. `None`/`false` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub lang: Option<String>,
    pub no_speech: bool,
    pub asset_dir: Option<PathBuf>,
    pub recompute_width: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.robochat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".robochat").join("config.toml"))
}

/// Load config from `~/.robochat/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `RobochatConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<RobochatConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(RobochatConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<RobochatConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(RobochatConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: RobochatConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# robochat configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [speech]
# enabled = true
# command = "espeak-ng"        # Or set ROBOCHAT_SPEECH_COMMAND; auto-detected when unset
# lang = "zh-CN"               # Or set ROBOCHAT_LANG / --lang
# volume = 1.0                 # 0.0 - 1.0
# rate = 1.0                   # 0.1 - 10.0
# pitch = 1.0                  # 0.0 - 2.0

# [avatar]
# asset_dir = "/path/to/clips" # Or set ROBOCHAT_ASSET_DIR / --assets
# max_surface_height = 720
# surface_width = 300
# fps = 12

# [chat]
# replies = ["beep", "boop"]
# recompute_width_on_resize = false
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &RobochatConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Speech on/off: CLI kill switch → config → default on
    let speech_enabled = !cli.no_speech && config.speech.enabled.unwrap_or(true);

    // Speech command: env → config (unset = auto-detect)
    let speech_command = std::env::var("ROBOCHAT_SPEECH_COMMAND")
        .ok()
        .or_else(|| config.speech.command.clone());

    // Language: CLI → env → config (unset = engine default)
    let lang = cli
        .lang
        .clone()
        .or_else(|| std::env::var("ROBOCHAT_LANG").ok())
        .or_else(|| config.speech.lang.clone());

    // Asset directory: CLI → env → config
    let asset_dir = cli
        .asset_dir
        .clone()
        .or_else(|| std::env::var("ROBOCHAT_ASSET_DIR").ok().map(PathBuf::from))
        .or_else(|| config.avatar.asset_dir.as_ref().map(PathBuf::from));

    let replies = config
        .chat
        .replies
        .clone()
        .unwrap_or_else(|| DEFAULT_REPLIES.iter().map(|s| s.to_string()).collect());

    ResolvedConfig {
        speech_enabled,
        speech_command,
        speech: SpeechOptions {
            lang,
            volume: config.speech.volume,
            rate: config.speech.rate,
            pitch: config.speech.pitch,
        },
        asset_dir,
        max_surface_height: config
            .avatar
            .max_surface_height
            .unwrap_or(MAX_SURFACE_HEIGHT),
        surface_width: config.avatar.surface_width.unwrap_or(DEFAULT_SURFACE_WIDTH),
        fps: config
            .avatar
            .fps
            .unwrap_or(DEFAULT_UI_FPS)
            .clamp(1, MAX_UI_FPS),
        replies,
        recompute_width_on_resize: cli.recompute_width
            || config.chat.recompute_width_on_resize.unwrap_or(false),
    }
}
