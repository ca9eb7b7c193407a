use handsim_core::model::card::CardEntry;
use handsim_core::model::category::Category;
use handsim_core::model::deck::DeckModel;
use handsim_core::odds::CategoryThreshold;
use handsim_core::OddsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

use crate::ydk::{self, YdkError};

const DEFAULT_HAND_SIZE: u32 = 5;
const DEFAULT_SAMPLE_HANDS: u32 = 1;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root simulator configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulatorConfig {
    pub run_id: String,
    pub deck: DeckConfig,
    #[serde(default = "default_hand_size")]
    pub hand_size: u32,
    #[serde(default)]
    pub queries: Vec<QueryConfig>,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulatorConfig {
    /// Load configuration from a YAML file on disk.
    ///
    /// A relative `deck.ydk` path is resolved against the directory holding the
    /// configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: SimulatorConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        if let (Some(ydk), Some(base)) = (cfg.deck.ydk.as_mut(), path.parent()) {
            if ydk.is_relative() {
                *ydk = base.join(&*ydk);
            }
        }
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.deck.validate()?;
        if self.hand_size == 0 {
            return Err(ValidationError::InvalidField {
                field: "hand_size".to_string(),
                message: "hand size must be greater than zero".to_string(),
            });
        }
        for (index, query) in self.queries.iter().enumerate() {
            query.validate(index)?;
        }
        self.report.validate()?;
        self.logging.normalize();
        Ok(())
    }
}

fn default_hand_size() -> u32 {
    DEFAULT_HAND_SIZE
}

/// Where the deck list comes from: inline entries or a `.ydk` file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeckConfig {
    #[serde(default)]
    pub cards: Vec<CardEntry>,
    #[serde(default)]
    pub ydk: Option<PathBuf>,
    /// Category per card id, for `.ydk` decks.
    #[serde(default)]
    pub categories: BTreeMap<String, Category>,
    #[serde(default = "default_category")]
    pub default_category: Category,
    #[serde(default)]
    pub declared_size: Option<u32>,
}

impl DeckConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match (self.cards.is_empty(), self.ydk.is_some()) {
            (true, false) => {
                return Err(ValidationError::InvalidField {
                    field: "deck".to_string(),
                    message: "either deck.cards or deck.ydk must be specified".to_string(),
                });
            }
            (false, true) => {
                return Err(ValidationError::InvalidField {
                    field: "deck".to_string(),
                    message: "deck.cards and deck.ydk are mutually exclusive".to_string(),
                });
            }
            _ => {}
        }

        if !self.categories.is_empty() && self.ydk.is_none() {
            return Err(ValidationError::InvalidField {
                field: "deck.categories".to_string(),
                message: "id categories only apply to deck.ydk".to_string(),
            });
        }

        if self.default_category.is_empty() {
            return Err(ValidationError::InvalidField {
                field: "deck.default_category".to_string(),
                message: "default category must not be empty".to_string(),
            });
        }

        if self.declared_size == Some(0) {
            return Err(ValidationError::InvalidField {
                field: "deck.declared_size".to_string(),
                message: "declared size must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Build the deck model, reading the `.ydk` file when one is configured.
    pub fn load(&self) -> Result<DeckModel, DeckLoadError> {
        let entries = match &self.ydk {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| DeckLoadError::Read {
                    source,
                    path: path.clone(),
                })?;
                let list = ydk::parse_ydk(&text).map_err(|source| DeckLoadError::Ydk {
                    source,
                    path: path.clone(),
                })?;
                list.into_entries(&self.categories, &self.default_category)?
            }
            None => self.cards.clone(),
        };

        let deck = match self.declared_size {
            Some(declared) => DeckModel::with_declared_size(entries, declared)?,
            None => DeckModel::new(entries)?,
        };
        Ok(deck)
    }
}

fn default_category() -> Category {
    Category::other()
}

/// One probability question to answer for the loaded deck.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryConfig {
    AtLeast { category: Category, count: u32 },
    Exactly { category: Category, count: u32 },
    /// Keys stay as written so labels that normalize alike can be rejected.
    Combined { thresholds: BTreeMap<String, u32> },
}

impl QueryConfig {
    fn validate(&self, index: usize) -> Result<(), ValidationError> {
        match self {
            QueryConfig::AtLeast { category, .. } | QueryConfig::Exactly { category, .. } => {
                if category.is_empty() {
                    return Err(ValidationError::InvalidField {
                        field: format!("queries[{index}].category"),
                        message: "category must not be empty".to_string(),
                    });
                }
            }
            QueryConfig::Combined { thresholds } => {
                let field = format!("queries[{index}].thresholds");
                if thresholds.is_empty() {
                    return Err(ValidationError::InvalidField {
                        field,
                        message: "at least one threshold must be specified".to_string(),
                    });
                }
                let mut seen: BTreeMap<Category, &str> = BTreeMap::new();
                for label in thresholds.keys() {
                    let category = Category::new(label);
                    if category.is_empty() {
                        return Err(ValidationError::InvalidField {
                            field,
                            message: "category must not be empty".to_string(),
                        });
                    }
                    if let Some(previous) = seen.insert(category.clone(), label) {
                        return Err(ValidationError::InvalidField {
                            field,
                            message: format!(
                                "'{previous}' and '{label}' both name category '{category}'"
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Threshold form for queries a hand either meets or misses.
    ///
    /// Exact-count queries have none and are not cross-checked by simulation.
    pub fn thresholds(&self) -> Option<Vec<CategoryThreshold>> {
        match self {
            QueryConfig::AtLeast { category, count } => {
                Some(vec![CategoryThreshold::new(category.clone(), *count)])
            }
            QueryConfig::Exactly { .. } => None,
            QueryConfig::Combined { thresholds } => Some(
                thresholds
                    .iter()
                    .map(|(label, minimum)| CategoryThreshold::new(label.as_str(), *minimum))
                    .collect(),
            ),
        }
    }

    pub fn label(&self) -> String {
        match self {
            QueryConfig::AtLeast { category, count } => format!("at least {count} {category}"),
            QueryConfig::Exactly { category, count } => format!("exactly {count} {category}"),
            QueryConfig::Combined { thresholds } => thresholds
                .iter()
                .map(|(label, minimum)| format!("{minimum}+ {}", Category::new(label)))
                .collect::<Vec<_>>()
                .join(" & "),
        }
    }
}

/// Tables to include in the report.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Categories for the exact/at-least tables; empty means every deck category.
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub matrix: Option<MatrixConfig>,
    #[serde(default = "default_brick_category")]
    pub brick: Category,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            matrix: None,
            brick: default_brick_category(),
        }
    }
}

impl ReportConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(matrix) = &self.matrix {
            if matrix.row == matrix.column {
                return Err(ValidationError::InvalidField {
                    field: "report.matrix".to_string(),
                    message: format!("row and column are both '{}'", matrix.row),
                });
            }
        }
        Ok(())
    }
}

fn default_brick_category() -> Category {
    Category::brick()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MatrixConfig {
    pub row: Category,
    pub column: Category,
}

/// Sampling configuration block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub seed: Option<u64>,
    #[serde(default = "default_sample_hands")]
    pub sample_hands: u32,
    /// Monte-Carlo hands per query; zero skips the cross-check.
    #[serde(default)]
    pub trials: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            sample_hands: DEFAULT_SAMPLE_HANDS,
            trials: 0,
        }
    }
}

fn default_sample_hands() -> u32 {
    DEFAULT_SAMPLE_HANDS
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    /// Log file; structured logs go to stderr when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            path: None,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

/// Failures turning a valid deck block into a [`DeckModel`].
#[derive(Debug, Error)]
pub enum DeckLoadError {
    #[error("failed to read deck list {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("malformed deck list {path:?}: {source}")]
    Ydk {
        #[source]
        source: YdkError,
        path: PathBuf,
    },
    #[error(transparent)]
    Deck(#[from] OddsError),
}
