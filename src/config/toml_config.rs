use crate::core::matcher::{MatchStrategy, RecordMatcher, DEFAULT_STRATEGIES};
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub review: ReviewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub path: Option<String>,
    pub delimiter: String,
    pub columns: RosterColumns,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: ",".to_string(),
            columns: RosterColumns::default(),
        }
    }
}

/// Header names of the four logical roster columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterColumns {
    pub member_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    /// Used when the primary email cell is blank.
    pub secondary_email: Option<String>,
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            member_id: Some("Member ID".to_string()),
            first_name: "First Name".to_string(),
            last_name: "Last Name".to_string(),
            email: Some("Email".to_string()),
            secondary_email: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub strategies: Vec<MatchStrategy>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            strategies: DEFAULT_STRATEGIES.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Where `detect` writes the review batch when no `--out` is given.
    pub output: Option<String>,
}

impl SyncConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_delimiter("roster.delimiter", &self.roster.delimiter)?;

        if let Some(path) = &self.roster.path {
            validation::validate_path("roster.path", path)?;
            validation::validate_file_extension("roster.path", path, &["csv", "tsv", "txt"])?;
        }

        let columns = &self.roster.columns;
        validation::validate_non_empty_string("roster.columns.first_name", &columns.first_name)?;
        validation::validate_non_empty_string("roster.columns.last_name", &columns.last_name)?;
        for (field, value) in [
            ("roster.columns.member_id", &columns.member_id),
            ("roster.columns.email", &columns.email),
            ("roster.columns.secondary_email", &columns.secondary_email),
        ] {
            if let Some(value) = value {
                validation::validate_non_empty_string(field, value)?;
            }
        }

        if let Some(path) = &self.store.path {
            validation::validate_path("store.path", path)?;
        }
        if let Some(path) = &self.review.output {
            validation::validate_path("review.output", path)?;
        }

        if self.matching.strategies.is_empty() {
            return Err(SyncError::InvalidConfigValueError {
                field: "matching.strategies".to_string(),
                value: "[]".to_string(),
                reason: "At least one match strategy is required".to_string(),
            });
        }
        validation::validate_unique("matching.strategies", &self.matching.strategies)?;

        Ok(())
    }

    pub fn matcher(&self) -> RecordMatcher {
        RecordMatcher::new(self.matching.strategies.clone())
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SyncConfig::from_toml_str("").unwrap();

        assert_eq!(config.roster.delimiter, ",");
        assert_eq!(config.roster.columns, RosterColumns::default());
        assert_eq!(config.matching.strategies, DEFAULT_STRATEGIES.to_vec());
        assert!(config.store.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[roster]
path = "roster.csv"
delimiter = ";"

[roster.columns]
member_id = "Mitgliedsnummer"
first_name = "Vorname"
last_name = "Nachname"
email = "E-Mail"
secondary_email = "E-Mail 2"

[store]
path = "data/members.csv"

[matching]
strategies = ["name"]

[review]
output = "changes.json"
"#;

        let config = SyncConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.roster.path.as_deref(), Some("roster.csv"));
        assert_eq!(config.roster.delimiter, ";");
        assert_eq!(config.roster.columns.first_name, "Vorname");
        assert_eq!(config.roster.columns.secondary_email.as_deref(), Some("E-Mail 2"));
        assert_eq!(config.store.path.as_deref(), Some("data/members.csv"));
        assert_eq!(config.matcher().strategies(), &[MatchStrategy::Name]);
        assert_eq!(config.review.output.as_deref(), Some("changes.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_columns_keep_other_defaults() {
        let config = SyncConfig::from_toml_str(
            r#"
[roster.columns]
email = "Primary Email"
"#,
        )
        .unwrap();

        assert_eq!(config.roster.columns.email.as_deref(), Some("Primary Email"));
        assert_eq!(config.roster.columns.first_name, "First Name");
        assert_eq!(config.roster.columns.member_id.as_deref(), Some("Member ID"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ROSTER_SYNC_TEST_STORE", "/srv/club/members.csv");

        let config = SyncConfig::from_toml_str(
            r#"
[store]
path = "${ROSTER_SYNC_TEST_STORE}"
"#,
        )
        .unwrap();
        assert_eq!(config.store.path.as_deref(), Some("/srv/club/members.csv"));

        std::env::remove_var("ROSTER_SYNC_TEST_STORE");
    }

    #[test]
    fn test_config_validation() {
        let bad_strategies = SyncConfig::from_toml_str(
            r#"
[matching]
strategies = ["name", "name"]
"#,
        )
        .unwrap();
        assert!(bad_strategies.validate().is_err());

        let no_strategies = SyncConfig::from_toml_str("[matching]\nstrategies = []\n").unwrap();
        assert!(no_strategies.validate().is_err());

        let bad_roster = SyncConfig::from_toml_str("[roster]\npath = \"roster.xlsx\"\n").unwrap();
        assert!(bad_roster.validate().is_err());

        let bad_delimiter = SyncConfig::from_toml_str("[roster]\ndelimiter = \"::\"\n").unwrap();
        assert!(bad_delimiter.validate().is_err());
    }

    #[test]
    fn test_unknown_strategy_is_parse_error() {
        let result = SyncConfig::from_toml_str("[matching]\nstrategies = [\"fuzzy\"]\n");
        assert!(matches!(
            result,
            Err(SyncError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[store]\npath = \"members.csv\"\n")
            .unwrap();

        let config = SyncConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.store.path.as_deref(), Some("members.csv"));
    }
}
