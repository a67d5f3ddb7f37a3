//! User configuration (config.toml).
//!
//! ```toml
//! version = "default"
//! normalize = "upper"
//! name_pattern = "^[A-Z][0-9]{1,2}$"
//! ```
//!
//! Every field is optional. Problems with the file are reported as warnings
//! and the affected settings fall back to their defaults.

use cellgraph_core::{DEFAULT_VERSION, ReadWriteError, Spreadsheet};
use directories::ProjectDirs;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    version: Option<String>,
    normalize: Option<String>,
    name_pattern: Option<String>,
}

/// How cell names and formula variables are folded before use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NameCase {
    #[default]
    Identity,
    Upper,
    Lower,
}

impl NameCase {
    fn from_name(name: &str) -> Option<NameCase> {
        match name.trim().to_ascii_lowercase().as_str() {
            "identity" => Some(NameCase::Identity),
            "upper" => Some(NameCase::Upper),
            "lower" => Some(NameCase::Lower),
            _ => None,
        }
    }

    pub fn apply(self, name: &str) -> String {
        match self {
            NameCase::Identity => name.to_string(),
            NameCase::Upper => name.to_uppercase(),
            NameCase::Lower => name.to_lowercase(),
        }
    }
}

/// Resolved configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub version: String,
    pub normalize: NameCase,
    /// Extra pattern every normalized cell name must match
    pub name_pattern: Option<Regex>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: DEFAULT_VERSION.to_string(),
            normalize: NameCase::default(),
            name_pattern: None,
        }
    }
}

impl Config {
    fn validator(&self) -> impl Fn(&str) -> bool + 'static {
        let pattern = self.name_pattern.clone();
        move |name: &str| pattern.as_ref().is_none_or(|re| re.is_match(name))
    }

    fn normalizer(&self) -> impl Fn(&str) -> String + 'static {
        let case = self.normalize;
        move |name: &str| case.apply(name)
    }

    /// An empty spreadsheet using these rules.
    pub fn new_sheet(&self) -> Spreadsheet {
        Spreadsheet::with_rules(self.validator(), self.normalizer(), self.version.clone())
    }

    /// Load a spreadsheet file using these rules.
    pub fn load_sheet(&self, path: &Path) -> Result<Spreadsheet, ReadWriteError> {
        Spreadsheet::load(path, self.validator(), self.normalizer(), &self.version)
    }
}

/// Load the configuration from `config_file`, or from the user config
/// directory when none is given. Returns the configuration and any warnings.
pub fn load_config(config_file: Option<&PathBuf>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let config_path = config_file.cloned().or_else(user_config_path);
    let mut file = ConfigFile::default();

    if let Some(path) = config_path.as_ref() {
        if path.exists() {
            match std::fs::metadata(path) {
                Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
                    warnings.push(format!(
                        "Refusing to read {}: file too large ({} bytes, max {})",
                        path.display(),
                        meta.len(),
                        MAX_CONFIG_FILE_BYTES
                    ));
                }
                Ok(_) => match std::fs::read_to_string(path) {
                    Ok(content) => match toml::from_str::<ConfigFile>(&content) {
                        Ok(parsed) => file = parsed,
                        Err(err) => {
                            warnings.push(format!("Failed to parse {}: {}", path.display(), err))
                        }
                    },
                    Err(err) => {
                        warnings.push(format!("Failed to read {}: {}", path.display(), err))
                    }
                },
                Err(err) => warnings.push(format!(
                    "Failed to read metadata for {}: {}",
                    path.display(),
                    err
                )),
            }
        } else if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
    }

    let mut config = Config::default();

    if let Some(version) = file.version {
        let version = version.trim();
        if version.is_empty() || version.contains(['\n', '\r']) {
            warnings.push(format!("Invalid version tag {:?}; using {:?}", version, DEFAULT_VERSION));
        } else {
            config.version = version.to_string();
        }
    }

    if let Some(name) = file.normalize {
        match NameCase::from_name(&name) {
            Some(case) => config.normalize = case,
            None => warnings.push(format!(
                "Unknown normalize mode '{}'; expected identity, upper or lower",
                name
            )),
        }
    }

    if let Some(pattern) = file.name_pattern {
        match Regex::new(&pattern) {
            Ok(re) => config.name_pattern = Some(re),
            Err(err) => warnings.push(format!("Invalid name_pattern: {}", err)),
        }
    }

    (config, warnings)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellgraph")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
