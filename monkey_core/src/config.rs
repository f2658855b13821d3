use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration rejected before the campaign starts.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("oracle command is empty")]
    EmptyCommand,
    #[error("source file name is empty")]
    EmptySourceFileName,
    #[error("output file name is empty")]
    EmptyOutputFileName,
    #[error("max-candidate-size must be at least 1")]
    ZeroMaxCandidateSize,
    #[error("verbose and silent are mutually exclusive")]
    ConflictingVerbosity,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct CampaignSettings {
    /// Degree of parallelism. 0 and 1 both mean a single worker.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    #[serde(default = "default_max_candidate_size")]
    pub max_candidate_size: usize,
}

pub fn default_jobs() -> usize {
    1
}

pub fn default_max_candidate_size() -> usize {
    1024
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            max_candidate_size: default_max_candidate_size(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct OracleSettings {
    /// Validation command argv; arguments may carry the `{source}` and
    /// `{output}` placeholders.
    #[serde(default = "default_command")]
    pub command: Vec<String>,
    #[serde(default = "default_source_file_name")]
    pub source_file_name: String,
    #[serde(default = "default_output_file_name")]
    pub output_file_name: String,
    /// Directory holding every worker's candidate and artifact files.
    /// Assumed to exist and be empty when the campaign starts.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

fn default_command() -> Vec<String> {
    vec![
        "/usr/bin/gcc".to_string(),
        "-Wfatal-errors".to_string(),
        "-o".to_string(),
        "{output}".to_string(),
        "{source}".to_string(),
    ]
}

fn default_source_file_name() -> String {
    "_test.c".to_string()
}

fn default_output_file_name() -> String {
    "_a.out".to_string()
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("tmp")
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            command: default_command(),
            source_file_name: default_source_file_name(),
            output_file_name: default_output_file_name(),
            work_dir: default_work_dir(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct ReportSettings {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub silent: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct MonkeyConfig {
    #[serde(default)]
    pub campaign: CampaignSettings,
    #[serde(default)]
    pub oracle: OracleSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

impl MonkeyConfig {
    pub fn load_from_file(path: &PathBuf) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file at {:?}: {}", path, e))?;

        let config: MonkeyConfig = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse TOML from config file {:?}: {}", path, e)
        })?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.oracle.command.is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        if self.oracle.source_file_name.is_empty() {
            return Err(ConfigError::EmptySourceFileName);
        }
        if self.oracle.output_file_name.is_empty() {
            return Err(ConfigError::EmptyOutputFileName);
        }
        if self.campaign.max_candidate_size == 0 {
            return Err(ConfigError::ZeroMaxCandidateSize);
        }
        if self.report.verbose && self.report.silent {
            return Err(ConfigError::ConflictingVerbosity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        MonkeyConfig::default().validate().unwrap();
    }

    #[test]
    fn parses_partial_toml_and_fills_defaults() {
        let config: MonkeyConfig = toml::from_str(
            r#"
            [campaign]
            jobs = 4

            [oracle]
            command = ["cc", "-o", "{output}", "{source}"]
            "#,
        )
        .unwrap();

        assert_eq!(config.campaign.jobs, 4);
        assert_eq!(config.campaign.max_candidate_size, 1024);
        assert_eq!(config.oracle.command[0], "cc");
        assert_eq!(config.oracle.source_file_name, "_test.c");
        assert_eq!(config.oracle.work_dir, PathBuf::from("tmp"));
        assert!(!config.report.verbose);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<MonkeyConfig, _> = toml::from_str(
            r#"
            [campaign]
            max-iterations = 10
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn conflicting_verbosity_is_rejected() {
        let mut config = MonkeyConfig::default();
        config.report.verbose = true;
        config.report.silent = true;
        assert_eq!(config.validate(), Err(ConfigError::ConflictingVerbosity));
    }

    #[test]
    fn zero_candidate_size_is_rejected() {
        let mut config = MonkeyConfig::default();
        config.campaign.max_candidate_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxCandidateSize));
    }
}
