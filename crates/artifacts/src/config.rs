//! Environment-driven configuration.
//!
//! Bucket selection is deliberately dumb: one environment variable per
//! dataset, read at call time, no config files and no fallback chains. A
//! missing variable fails the pipeline run immediately instead of letting
//! data land in a default location.

use std::env;
use std::str::FromStr;

use crate::error::{ArtifactError, Result};

pub const CALITP_ENV: &str = "CALITP_ENV";

pub const AIRTABLE_BUCKET_VAR: &str = "CALITP_BUCKET__AIRTABLE";
pub const SCHEDULE_RAW_BUCKET_VAR: &str = "CALITP_BUCKET__GTFS_SCHEDULE_RAW";
pub const RT_RAW_BUCKET_VAR: &str = "CALITP_BUCKET__GTFS_RT_RAW";
pub const DBT_ARTIFACTS_BUCKET_VAR: &str = "CALITP_BUCKET__DBT_ARTIFACTS";
pub const PUBLISH_BUCKET_VAR: &str = "CALITP_BUCKET__PUBLISH";

/// Which deployment the process is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Read [`CALITP_ENV`]; unset or unrecognized values are configuration
    /// errors.
    pub fn from_env() -> Result<Environment> {
        require_env(CALITP_ENV)?.parse()
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// The raw GTFS bucket used when no per-dataset override applies.
    pub fn default_raw_bucket(&self) -> &'static str {
        match self {
            Environment::Development => "gs://gtfs-data-test",
            Environment::Production => "gs://gtfs-data",
        }
    }
}

impl FromStr for Environment {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            other => Err(ArtifactError::InvalidEnvVar {
                var: CALITP_ENV,
                value: other.to_string(),
            }),
        }
    }
}

fn require_env(var: &'static str) -> Result<String> {
    env::var(var).map_err(|_| ArtifactError::MissingEnvVar { var })
}

pub fn airtable_bucket() -> Result<String> {
    require_env(AIRTABLE_BUCKET_VAR)
}

pub fn schedule_raw_bucket() -> Result<String> {
    require_env(SCHEDULE_RAW_BUCKET_VAR)
}

pub fn rt_raw_bucket() -> Result<String> {
    require_env(RT_RAW_BUCKET_VAR)
}

pub fn dbt_artifacts_bucket() -> Result<String> {
    require_env(DBT_ARTIFACTS_BUCKET_VAR)
}

pub fn publish_bucket() -> Result<String> {
    require_env(PUBLISH_BUCKET_VAR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(
            "development".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        match "cal-itp-data-infra".parse::<Environment>() {
            Err(ArtifactError::InvalidEnvVar { var, value }) => {
                assert_eq!(var, CALITP_ENV);
                assert_eq!(value, "cal-itp-data-infra");
            }
            other => panic!("expected invalid env error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_raw_bucket_per_environment() {
        assert_eq!(
            Environment::Development.default_raw_bucket(),
            "gs://gtfs-data-test"
        );
        assert_eq!(
            Environment::Production.default_raw_bucket(),
            "gs://gtfs-data"
        );
    }

    #[test]
    fn test_bucket_accessor_reads_and_requires_env() {
        // Set and clear in one test so parallel tests never race on the var.
        unsafe {
            env::set_var(RT_RAW_BUCKET_VAR, "gs://test-rt");
        }
        assert_eq!(rt_raw_bucket().unwrap(), "gs://test-rt");

        unsafe {
            env::remove_var(RT_RAW_BUCKET_VAR);
        }
        match rt_raw_bucket() {
            Err(ArtifactError::MissingEnvVar { var }) => {
                assert_eq!(var, RT_RAW_BUCKET_VAR);
            }
            other => panic!("expected missing env error, got {other:?}"),
        }
    }
}
