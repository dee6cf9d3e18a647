//! Warehouse name formatting.

use std::sync::LazyLock;

use artifacts::Environment;
use regex::Regex;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").expect("static regex"));

/// Lowercase `name` and replace every non-word character with `_`.
pub fn safe_identifier(name: &str) -> String {
    NON_WORD.replace_all(&name.to_lowercase(), "_").into_owned()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NameOpts<'a> {
    /// Leading `project.` component, when addressing across projects.
    pub project: Option<&'a str>,
    /// Append the `__staging` suffix used by loaders.
    pub staging: bool,
}

/// Format `{project.}{dataset}.{table}{__staging}`, prefixing the dataset
/// with `zzz_test_` in development so test datasets sort after real ones.
pub fn qualified_name(env: Environment, dataset: &str, table: &str, opts: NameOpts<'_>) -> String {
    let mut name = String::new();
    if let Some(project) = opts.project {
        name.push_str(project);
        name.push('.');
    }
    if env.is_development() {
        name.push_str("zzz_test_");
    }
    name.push_str(dataset);
    name.push('.');
    name.push_str(table);
    if opts.staging {
        name.push_str("__staging");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_identifier() {
        assert_eq!(safe_identifier("Vehicle Positions!"), "vehicle_positions_");
        assert_eq!(safe_identifier("manifest.json"), "manifest_json");
        assert_eq!(safe_identifier("fct_scheduled_trips"), "fct_scheduled_trips");
    }

    #[test]
    fn test_qualified_name_production() {
        assert_eq!(
            qualified_name(
                Environment::Production,
                "mart_gtfs",
                "fct_scheduled_trips",
                NameOpts::default()
            ),
            "mart_gtfs.fct_scheduled_trips"
        );
    }

    #[test]
    fn test_qualified_name_development_prefix() {
        assert_eq!(
            qualified_name(
                Environment::Development,
                "mart_gtfs",
                "fct_scheduled_trips",
                NameOpts::default()
            ),
            "zzz_test_mart_gtfs.fct_scheduled_trips"
        );
    }

    #[test]
    fn test_qualified_name_project_and_staging() {
        assert_eq!(
            qualified_name(
                Environment::Production,
                "mart_gtfs",
                "fct_scheduled_trips",
                NameOpts {
                    project: Some("cal-itp-data-infra"),
                    staging: true,
                }
            ),
            "cal-itp-data-infra.mart_gtfs.fct_scheduled_trips__staging"
        );
    }

    #[test]
    fn test_development_staging_combines() {
        assert_eq!(
            qualified_name(
                Environment::Development,
                "california_transit",
                "organizations",
                NameOpts {
                    project: None,
                    staging: true,
                }
            ),
            "zzz_test_california_transit.organizations__staging"
        );
    }
}
