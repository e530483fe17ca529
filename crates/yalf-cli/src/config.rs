use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use yalf_engine::render::{
    DEFAULT_CONTEXT, DEFAULT_DELIMITED_TIME_FORMAT, DEFAULT_DELIMITER, DEFAULT_INDENT,
    DEFAULT_TIME_FORMAT,
};
use yalf_engine::{
    DelimitedRenderer, DisplayFilter, EngineOptions, FilterRules, LineRenderer, RuleFilter,
    SingleLineRenderer, TextRenderer,
};

pub const CONFIG_ENV: &str = "YALF_CONFIG";

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading or applying configuration
#[derive(Debug)]
pub enum Error {
    /// Reading or writing the file failed
    Io(std::io::Error),

    /// The file is not valid TOML for this schema
    Parse(toml::de::Error),

    /// The configuration could not be written as TOML
    Serialize(toml::ser::Error),

    /// Well-formed but unusable values (bad pattern, bad delimiter)
    Invalid(String),

    /// No location for the configuration file could be determined
    NoConfigDir,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Parse(err) => write!(f, "Invalid configuration: {}", err),
            Error::Serialize(err) => write!(f, "Could not serialize configuration: {}", err),
            Error::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::NoConfigDir => write!(
                f,
                "Could not determine configuration path: set {} or pass --config",
                CONFIG_ENV
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Parse(err) => Some(err),
            Error::Serialize(err) => Some(err),
            Error::Invalid(_) | Error::NoConfigDir => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Parse(err)
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialize(err)
    }
}

impl From<yalf_engine::Error> for Error {
    fn from(err: yalf_engine::Error) -> Self {
        Error::Invalid(err.to_string())
    }
}

/// Resolve the configuration file path based on priority:
/// 1. Explicit path
/// 2. YALF_CONFIG environment variable
/// 3. `yalf/config.toml` under the platform config directory
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(path.to_path_buf());
    }

    if let Some(env_path) = std::env::var_os(CONFIG_ENV)
        && !env_path.is_empty()
    {
        return Ok(PathBuf::from(env_path));
    }

    dirs::config_dir()
        .map(|dir| dir.join("yalf").join("config.toml"))
        .ok_or(Error::NoConfigDir)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// Entry and exit lines for every call
    Text,
    /// One line per call
    #[default]
    SingleLine,
    /// One delimited row per call
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    pub indent: String,
    pub time_format: String,
    pub line_numbers: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            line_numbers: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelimitedOptions {
    pub context: String,
    pub delimiter: char,
    pub time_format: String,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            context: DEFAULT_CONTEXT.to_string(),
            delimiter: DEFAULT_DELIMITER,
            time_format: DEFAULT_DELIMITED_TIME_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub format: ReportFormat,
    pub engine: EngineOptions,
    pub filter: FilterRules,
    pub text: TextOptions,
    pub delimited: DelimitedOptions,
}

impl Config {
    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        resolve_config_path(None)
    }

    /// Renderer for the configured format
    pub fn renderer(&self) -> Result<Box<dyn LineRenderer>> {
        let renderer: Box<dyn LineRenderer> = match self.format {
            ReportFormat::Text => Box::new(
                TextRenderer::new(&self.text.indent, &self.text.time_format)
                    .with_line_numbers(self.text.line_numbers),
            ),
            ReportFormat::SingleLine => Box::new(SingleLineRenderer::new(
                &self.text.indent,
                &self.text.time_format,
            )),
            ReportFormat::Csv => Box::new(DelimitedRenderer::new(
                &self.delimited.context,
                self.delimited.delimiter,
                &self.delimited.time_format,
            )?),
        };
        Ok(renderer)
    }

    pub fn filter(&self) -> Result<Box<dyn DisplayFilter>> {
        Ok(Box::new(RuleFilter::from_rules(&self.filter)?))
    }
}
