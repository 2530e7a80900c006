//! Configuration management
//!
//! Values are resolved in this order (highest priority first):
//! 1. Builder overrides (CLI flags)
//! 2. Environment variables, `QUILL_` prefix and `__` between nested keys
//!    (e.g. `QUILL_RUNTIME__MESSAGE_TIMEOUT_MS=3000`); a `.env` file is loaded first
//! 3. Config file: an explicit path, or `quill.toml` in the working directory if present
//! 4. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use config::{Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "quill";
const ENV_PREFIX: &str = "QUILL";
/// Smallest session stack that still fits the deepest tree the parser accepts
const MIN_STACK_SIZE_KB: usize = 4 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub runtime: RuntimeConfig,
    pub frame: FrameConfig,
    pub logging: LoggingConfig,
}

/// Settings for the execution supervisor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// How long a printed message stays on screen
    pub message_timeout_ms: u64,
    /// Session threads are named `<prefix>-<short id>`
    pub thread_name_prefix: String,
    /// Stack reserved for each session thread, in KiB
    pub stack_size_kb: usize,
    /// Finished sessions kept for `sessions()`; older ones are forgotten
    pub session_history: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            message_timeout_ms: 2000,
            thread_name_prefix: "quill-session".to_string(),
            stack_size_kb: 16 * 1024,
            session_history: 64,
        }
    }
}

impl RuntimeConfig {
    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }

    pub fn stack_size(&self) -> usize {
        self.stack_size_kb.saturating_mul(1024)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub fps: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { fps: 60 }
    }
}

impl FrameConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.fps.max(1)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime.message_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "runtime.message_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.runtime.thread_name_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "runtime.thread_name_prefix must not be empty".to_string(),
            ));
        }
        if self.runtime.stack_size_kb < MIN_STACK_SIZE_KB {
            return Err(ConfigError::Invalid(format!(
                "runtime.stack_size_kb must be at least {}, got {}",
                MIN_STACK_SIZE_KB, self.runtime.stack_size_kb
            )));
        }
        if !(1..=1000).contains(&self.frame.fps) {
            return Err(ConfigError::Invalid(format!(
                "frame.fps must be between 1 and 1000, got {}",
                self.frame.fps
            )));
        }
        Ok(())
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    message_timeout_ms: Option<u64>,
    fps: Option<u32>,
}

impl ConfigBuilder {
    /// Read this file (required) instead of looking for `quill.toml`
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn message_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.message_timeout_ms = timeout_ms;
        self
    }

    pub fn fps(mut self, fps: Option<u32>) -> Self {
        self.fps = fps;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        builder = match &self.config_path {
            Some(path) => builder.add_source(File::from(path.as_path()).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        self.resolve(builder)
    }

    /// Apply overrides on top of `builder`, deserialize, and validate
    fn resolve(
        self,
        mut builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Config, ConfigError> {
        if let Some(timeout_ms) = self.message_timeout_ms {
            builder = builder.set_override("runtime.message_timeout_ms", timeout_ms)?;
        }
        if let Some(fps) = self.fps {
            builder = builder.set_override("frame.fps", u64::from(fps))?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
