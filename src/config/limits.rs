use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{
    borrow::Cow,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::ext::BestEffortPathExt;

const LIMITS_FILE_NAME: &str = "nospace.yaml";

pub const DEFAULT_SMALL_DIRECTORY_THRESHOLD: u64 = 100_000;
pub const DEFAULT_DISK_CAPACITY: u64 = 70_000_000;
pub const DEFAULT_REQUIRED_FREE_SPACE: u64 = 30_000_000;

fn get_limits_file_path(root: &Path) -> PathBuf {
    root.join(LIMITS_FILE_NAME)
}

/// Numeric parameters of the two aggregate queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub small_directory_threshold: u64,
    pub disk_capacity: u64,
    pub required_free_space: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            small_directory_threshold: DEFAULT_SMALL_DIRECTORY_THRESHOLD,
            disk_capacity: DEFAULT_DISK_CAPACITY,
            required_free_space: DEFAULT_REQUIRED_FREE_SPACE,
        }
    }
}

/// Limits supplied on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitOverrides {
    pub small_directory_threshold: Option<u64>,
    pub disk_capacity: Option<u64>,
    pub required_free_space: Option<u64>,
}

impl Limits {
    /// Reads `nospace.yaml` from `root`, falling back to the defaults when the
    /// file does not exist.
    pub async fn read(root: &Path) -> Result<Self, LimitsError> {
        Self::from_path(get_limits_file_path(root)).await
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, LimitsError> {
        debug!("Opening limits file: {}", path.best_effort_path_display());
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No limits file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).context(ReadSnafu {
                    file_path: path.best_effort_path_display(),
                });
            }
        };
        debug!("Successfully read limits file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(Utf8Snafu {
            file_path: path.best_effort_path_display(),
        })?;
        contents.as_str().try_into()
    }

    pub fn with_overrides(self, overrides: LimitOverrides) -> Self {
        Limits {
            small_directory_threshold: overrides
                .small_directory_threshold
                .unwrap_or(self.small_directory_threshold),
            disk_capacity: overrides.disk_capacity.unwrap_or(self.disk_capacity),
            required_free_space: overrides
                .required_free_space
                .unwrap_or(self.required_free_space),
        }
    }

    fn parse_limits_from_yaml(
        top_level: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<Self, LimitsError> {
        let empty = Yaml::Mapping(LinkedHashMap::new());
        let limits = match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed("limits")))) {
            None | Some(Yaml::Value(Scalar::Null)) => &empty,
            Some(value) => value,
        }
        .as_mapping()
        .ok_or(LimitsError::LimitsNotMap)?;

        let defaults = Self::default();
        Ok(Limits {
            small_directory_threshold: Self::get_limit(
                limits,
                "small_directory_threshold",
                defaults.small_directory_threshold,
            )?,
            disk_capacity: Self::get_limit(limits, "disk_capacity", defaults.disk_capacity)?,
            required_free_space: Self::get_limit(
                limits,
                "required_free_space",
                defaults.required_free_space,
            )?,
        })
    }

    fn get_limit(
        limits: &LinkedHashMap<Yaml, Yaml>,
        key: &'static str,
        default: u64,
    ) -> Result<u64, LimitsError> {
        match limits.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key)))) {
            None => Ok(default),
            Some(Yaml::Value(Scalar::Integer(n))) => {
                u64::try_from(*n).ok().context(InvalidValueSnafu { key })
            }
            Some(_) => InvalidValueSnafu { key }.fail(),
        }
    }
}

impl TryFrom<&str> for Limits {
    type Error = LimitsError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = contents_vec.first() else {
            // An empty file configures nothing
            return Ok(Self::default());
        };

        let top_level = document
            .as_mapping()
            .ok_or(LimitsError::TopLevelNotMap)?;

        Self::parse_limits_from_yaml(top_level)
    }
}

#[derive(Debug, Snafu)]
pub enum LimitsError {
    #[snafu(display("Failed to read the limits file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Limits file {} is not valid UTF-8", file_path))]
    Utf8Error {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the limits file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of the limits file should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Limits section should be a map"))]
    LimitsNotMap,
    #[snafu(display("Limit '{}' should be a non-negative integer", key))]
    InvalidValue { key: &'static str },
}
