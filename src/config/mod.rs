//! Check configuration and its YAML file layer.
//!
//! Configuration is looked up in `--config`, then `./.flowcheck.yaml`, then
//! `$HOME/.flowcheck/config.yaml`. Every file field is optional and falls back
//! to the built-in defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::flow::{BranchNames, FlowModel};

/// File name searched for in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".flowcheck.yaml";

/// Placeholder replaced by the ticket id in `ticket_url_template`.
pub const TICKET_ID_PLACEHOLDER: &str = "{id}";

/// Default diff volume threshold for feature and hotfix pull requests.
pub const DEFAULT_MAX_DIFF_AMOUNT: usize = 300;

/// Default changelog path.
pub const DEFAULT_CHANGELOG_PATH: &str = "CHANGELOG.md";

/// Maps a ticket id to a human-facing address.
pub type TicketAddressResolver = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Whether pull requests should touch the changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeLogUpdateRequirement {
    /// No changelog check.
    No,
    /// The file at `path` should be modified.
    Yes {
        /// Changelog path relative to the repository root.
        path: String,
    },
}

/// Whether release pull requests must bump the version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionUpdateRequirement {
    /// No version check.
    No,
    /// An added line of `path` must contain `keyword`.
    Yes {
        /// File holding the version.
        path: String,
        /// Substring expected in an added line.
        keyword: String,
    },
}

/// Parameters controlling which checks run and their thresholds.
#[derive(Clone)]
pub struct Configuration {
    /// Skips the merge commit check for feature pull requests.
    pub accepts_merge_commits_in_feature_prs: bool,
    /// Added plus deleted lines must stay below this in feature and hotfix pull requests.
    pub recommended_max_diff_amount_in_feature_prs: usize,
    /// Changelog modification policy.
    pub change_log_update_requirement: ChangeLogUpdateRequirement,
    /// Version modification policy for release pull requests.
    pub version_update_requirement: VersionUpdateRequirement,
    /// Resolves ticket ids to addresses for the pre-check message.
    pub ticket_address_resolver: Option<TicketAddressResolver>,
    /// Literal names of the main and develop branches.
    pub branch_names: BranchNames,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            accepts_merge_commits_in_feature_prs: false,
            recommended_max_diff_amount_in_feature_prs: DEFAULT_MAX_DIFF_AMOUNT,
            change_log_update_requirement: ChangeLogUpdateRequirement::Yes {
                path: DEFAULT_CHANGELOG_PATH.to_string(),
            },
            version_update_requirement: VersionUpdateRequirement::No,
            ticket_address_resolver: None,
            branch_names: BranchNames::default(),
        }
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field(
                "accepts_merge_commits_in_feature_prs",
                &self.accepts_merge_commits_in_feature_prs,
            )
            .field(
                "recommended_max_diff_amount_in_feature_prs",
                &self.recommended_max_diff_amount_in_feature_prs,
            )
            .field(
                "change_log_update_requirement",
                &self.change_log_update_requirement,
            )
            .field("version_update_requirement", &self.version_update_requirement)
            .field(
                "ticket_address_resolver",
                &self.ticket_address_resolver.as_ref().map(|_| ".."),
            )
            .field("branch_names", &self.branch_names)
            .finish()
    }
}

impl Configuration {
    /// Sets the ticket address resolver.
    #[must_use]
    pub fn with_ticket_address_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.ticket_address_resolver = Some(Arc::new(resolver));
        self
    }

    /// Resolves a ticket id through the configured resolver.
    pub fn ticket_address(&self, ticket_id: &str) -> Option<String> {
        self.ticket_address_resolver
            .as_ref()
            .map(|resolve| resolve(ticket_id))
    }
}

/// Changelog section of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeLogSection {
    /// Whether the check runs.
    #[serde(default = "enabled")]
    pub required: bool,
    /// Changelog path; defaults to `CHANGELOG.md`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Version section of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionSection {
    /// Whether the check runs.
    #[serde(default = "enabled")]
    pub required: bool,
    /// File holding the version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Substring expected in an added line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

fn enabled() -> bool {
    true
}

/// On-disk configuration; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Branching model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowModel>,
    /// See [`Configuration::accepts_merge_commits_in_feature_prs`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepts_merge_commits_in_feature_prs: Option<bool>,
    /// See [`Configuration::recommended_max_diff_amount_in_feature_prs`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_max_diff_amount_in_feature_prs: Option<usize>,
    /// Changelog policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog: Option<ChangeLogSection>,
    /// Version policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionSection>,
    /// Ticket address template, e.g. `https://tracker.example.com/browse/{id}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_url_template: Option<String>,
    /// Main branch literals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_branches: Option<Vec<String>>,
    /// Develop branch literals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub develop_branches: Option<Vec<String>>,
}

impl ConfigFile {
    /// A file with every field set to its built-in default.
    pub fn defaults() -> Self {
        let names = BranchNames::default();
        Self {
            flow: Some(FlowModel::default()),
            accepts_merge_commits_in_feature_prs: Some(false),
            recommended_max_diff_amount_in_feature_prs: Some(DEFAULT_MAX_DIFF_AMOUNT),
            changelog: Some(ChangeLogSection {
                required: true,
                path: Some(DEFAULT_CHANGELOG_PATH.to_string()),
            }),
            version: Some(VersionSection {
                required: false,
                path: None,
                keyword: None,
            }),
            ticket_url_template: None,
            main_branches: Some(names.main),
            develop_branches: Some(names.develop),
        }
    }

    /// Overlays the fields set in `other` on top of `self`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            flow: other.flow.or(self.flow),
            accepts_merge_commits_in_feature_prs: other
                .accepts_merge_commits_in_feature_prs
                .or(self.accepts_merge_commits_in_feature_prs),
            recommended_max_diff_amount_in_feature_prs: other
                .recommended_max_diff_amount_in_feature_prs
                .or(self.recommended_max_diff_amount_in_feature_prs),
            changelog: other.changelog.or(self.changelog),
            version: other.version.or(self.version),
            ticket_url_template: other.ticket_url_template.or(self.ticket_url_template),
            main_branches: other.main_branches.or(self.main_branches),
            develop_branches: other.develop_branches.or(self.develop_branches),
        }
    }

    /// Loads a configuration file. A missing file yields an empty layer.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file");
            return Ok(Self::default());
        }

        let file: Self = crate::data::read_yaml_file(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(file)
    }

    /// Loads the explicit path if given, otherwise the first file found in the
    /// search locations.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("Configuration file not found: {}", path.display());
            }
            return Self::load_from_path(path);
        }

        for candidate in search_paths() {
            if candidate.exists() {
                return Self::load_from_path(&candidate);
            }
        }
        Ok(Self::default())
    }

    /// Builds the library configuration, filling unset fields with defaults.
    pub fn into_configuration(self) -> Result<Configuration> {
        let defaults = Configuration::default();

        let change_log_update_requirement = match self.changelog {
            None => defaults.change_log_update_requirement,
            Some(ChangeLogSection { required: false, .. }) => ChangeLogUpdateRequirement::No,
            Some(ChangeLogSection { path, .. }) => ChangeLogUpdateRequirement::Yes {
                path: path.unwrap_or_else(|| DEFAULT_CHANGELOG_PATH.to_string()),
            },
        };

        let version_update_requirement = match self.version {
            None | Some(VersionSection { required: false, .. }) => VersionUpdateRequirement::No,
            Some(VersionSection {
                path: Some(path),
                keyword: Some(keyword),
                ..
            }) => VersionUpdateRequirement::Yes { path, keyword },
            Some(_) => bail!("Version check requires both `path` and `keyword`"),
        };

        let ticket_address_resolver = match self.ticket_url_template {
            Some(template) => {
                if !template.contains(TICKET_ID_PLACEHOLDER) {
                    bail!(
                        "ticket_url_template must contain {TICKET_ID_PLACEHOLDER}: {template}"
                    );
                }
                let resolver: TicketAddressResolver =
                    Arc::new(move |id: &str| template.replace(TICKET_ID_PLACEHOLDER, id));
                Some(resolver)
            }
            None => None,
        };

        Ok(Configuration {
            accepts_merge_commits_in_feature_prs: self
                .accepts_merge_commits_in_feature_prs
                .unwrap_or(defaults.accepts_merge_commits_in_feature_prs),
            recommended_max_diff_amount_in_feature_prs: self
                .recommended_max_diff_amount_in_feature_prs
                .unwrap_or(defaults.recommended_max_diff_amount_in_feature_prs),
            change_log_update_requirement,
            version_update_requirement,
            ticket_address_resolver,
            branch_names: BranchNames {
                main: self.main_branches.unwrap_or(defaults.branch_names.main),
                develop: self
                    .develop_branches
                    .unwrap_or(defaults.branch_names.develop),
            },
        })
    }
}

/// Candidate configuration files, in lookup order.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".flowcheck").join("config.yaml"));
    }
    paths
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_documented_values() {
        let config = Configuration::default();
        assert!(!config.accepts_merge_commits_in_feature_prs);
        assert_eq!(config.recommended_max_diff_amount_in_feature_prs, 300);
        assert_eq!(
            config.change_log_update_requirement,
            ChangeLogUpdateRequirement::Yes {
                path: "CHANGELOG.md".to_string()
            }
        );
        assert_eq!(config.version_update_requirement, VersionUpdateRequirement::No);
        assert!(config.ticket_address("ABC-1").is_none());
    }

    #[test]
    fn empty_file_resolves_to_defaults() {
        let config = ConfigFile::default().into_configuration().unwrap();
        let defaults = Configuration::default();
        assert_eq!(
            config.change_log_update_requirement,
            defaults.change_log_update_requirement
        );
        assert_eq!(config.branch_names, defaults.branch_names);
    }

    #[test]
    fn defaults_file_round_trips_to_default_configuration() {
        let config = ConfigFile::defaults().into_configuration().unwrap();
        assert_eq!(config.recommended_max_diff_amount_in_feature_prs, 300);
        assert_eq!(config.version_update_requirement, VersionUpdateRequirement::No);
    }

    #[test]
    fn load_from_path_parses_all_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flowcheck.yaml");
        fs::write(
            &path,
            r#"
flow: github-flow
accepts_merge_commits_in_feature_prs: true
recommended_max_diff_amount_in_feature_prs: 500
changelog:
  required: false
version:
  path: VERSION
  keyword: "1.2.3"
ticket_url_template: "https://tracker.example.com/browse/{id}"
develop_branches: [develop, dev]
"#,
        )
        .unwrap();

        let file = ConfigFile::load_from_path(&path).unwrap();
        assert_eq!(file.flow, Some(FlowModel::GitHubFlow));

        let config = file.into_configuration().unwrap();
        assert!(config.accepts_merge_commits_in_feature_prs);
        assert_eq!(config.recommended_max_diff_amount_in_feature_prs, 500);
        assert_eq!(config.change_log_update_requirement, ChangeLogUpdateRequirement::No);
        assert_eq!(
            config.version_update_requirement,
            VersionUpdateRequirement::Yes {
                path: "VERSION".to_string(),
                keyword: "1.2.3".to_string()
            }
        );
        assert_eq!(
            config.ticket_address("ABC-1").as_deref(),
            Some("https://tracker.example.com/browse/ABC-1")
        );
        assert_eq!(config.branch_names.develop, ["develop", "dev"]);
        assert_eq!(config.branch_names.main, ["main", "master"]);
    }

    #[test]
    fn missing_file_is_empty_layer() {
        let temp_dir = TempDir::new().unwrap();
        let file = ConfigFile::load_from_path(temp_dir.path().join("absent.yaml")).unwrap();
        assert_eq!(file, ConfigFile::default());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigFile::discover(Some(&temp_dir.path().join("absent.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Configuration file not found"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        fs::write(&path, "max_diff: 10\n").unwrap();
        assert!(ConfigFile::load_from_path(&path).is_err());
    }

    #[test]
    fn version_section_requires_keyword() {
        let file = ConfigFile {
            version: Some(VersionSection {
                required: true,
                path: Some("VERSION".to_string()),
                keyword: None,
            }),
            ..ConfigFile::default()
        };
        assert!(file.into_configuration().is_err());
    }

    #[test]
    fn ticket_template_requires_placeholder() {
        let file = ConfigFile {
            ticket_url_template: Some("https://tracker.example.com".to_string()),
            ..ConfigFile::default()
        };
        assert!(file.into_configuration().is_err());
    }

    #[test]
    fn merge_prefers_overlay_fields() {
        let overlay = ConfigFile {
            recommended_max_diff_amount_in_feature_prs: Some(42),
            ..ConfigFile::default()
        };
        let merged = ConfigFile::defaults().merge(overlay);
        assert_eq!(merged.recommended_max_diff_amount_in_feature_prs, Some(42));
        assert_eq!(merged.accepts_merge_commits_in_feature_prs, Some(false));
    }

    #[test]
    fn resolver_builder() {
        let config = Configuration::default()
            .with_ticket_address_resolver(|id| format!("https://t.example/{id}"));
        assert_eq!(
            config.ticket_address("X-9").as_deref(),
            Some("https://t.example/X-9")
        );
    }
}
