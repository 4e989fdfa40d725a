use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ExitError;

/// Config file name constants.
pub const CONFIG_TOML: &str = ".likecount.toml";
pub const CONFIG_JSON: &str = ".likecount.json";

/// Config schema version written by `likecount init`.
pub const CONFIG_VERSION: &str = "1.0.0";

/// Environment variable that overrides `slack.api_token`.
pub const TOKEN_ENV: &str = "SLACK_API_TOKEN";

/// Find the config file path, preferring .likecount.toml over
/// .likecount.json. Returns None if neither exists.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    let toml_path = dir.join(CONFIG_TOML);
    if toml_path.exists() {
        return Some(toml_path);
    }
    let json_path = dir.join(CONFIG_JSON);
    if json_path.exists() {
        return Some(json_path);
    }
    None
}

/// Find the config file in `root`, or fail with a pointed error.
pub fn locate(root: &Path) -> anyhow::Result<PathBuf> {
    find_config(root).ok_or_else(|| {
        ExitError::Config(format!(
            "no {CONFIG_TOML} or {CONFIG_JSON} found in {} (run `likecount init` first)",
            root.display()
        ))
        .into()
    })
}

/// Top-level .likecount.toml config.
///
/// All structs use snake_case (TOML native) with `alias` attributes so
/// camelCase JSON configs load too.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    pub version: String,
    pub slack: SlackConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SlackConfig {
    /// API token used for directory and history reads. The SLACK_API_TOKEN
    /// environment variable takes precedence; omit this field to keep the
    /// secret out of the file.
    #[serde(default, alias = "apiToken", skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Incoming webhook the report is posted to.
    #[serde(alias = "webhookUrl")]
    pub webhook_url: String,
    /// Archive base used in permalinks, e.g. "https://acme.slack.com/archives".
    #[serde(alias = "archiveUrl")]
    pub archive_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReportConfig {
    /// Channel the report is posted to.
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Display name the webhook posts under.
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_icon_emoji", alias = "iconEmoji")]
    pub icon_emoji: String,
    /// IANA zone the scan window is resolved in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            username: default_username(),
            icon_emoji: default_icon_emoji(),
            timezone: default_timezone(),
        }
    }
}

impl ReportConfig {
    pub fn tz(&self) -> anyhow::Result<Tz> {
        self.timezone.parse().map_err(|_| {
            ExitError::Config(format!(
                "invalid timezone {:?} (expected an IANA name like \"Asia/Tokyo\")",
                self.timezone
            ))
            .into()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScanConfig {
    /// Channels whose name contains any of these fragments are skipped.
    #[serde(
        default = "default_exclude_name_contains",
        alias = "excludeNameContains"
    )]
    pub exclude_name_contains: Vec<String>,
    /// What to do when a single channel's history fetch fails.
    #[serde(default, alias = "onHistoryError")]
    pub on_history_error: HistoryErrorPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_name_contains: default_exclude_name_contains(),
            on_history_error: HistoryErrorPolicy::default(),
        }
    }
}

impl ScanConfig {
    pub fn excludes(&self, channel_name: &str) -> bool {
        self.exclude_name_contains
            .iter()
            .any(|fragment| channel_name.contains(fragment.as_str()))
    }
}

/// Policy for a failed per-channel history fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HistoryErrorPolicy {
    /// Log the channel and keep scanning the rest.
    #[default]
    Skip,
    /// Abort the whole run.
    Fail,
}

// Default value functions for serde
fn default_channel() -> String {
    "#like-counter".into()
}
fn default_username() -> String {
    "Like Counter".into()
}
fn default_icon_emoji() -> String {
    ":thumbsup:".into()
}
fn default_timezone() -> String {
    "UTC".into()
}
fn default_exclude_name_contains() -> Vec<String> {
    vec!["-pub".into()]
}

impl Config {
    /// Load config from a file (TOML or JSON, auto-detected by extension).
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "toml" => Self::parse_toml(&contents),
            "json" => Self::parse_json(&contents),
            _ => {
                // Try TOML first, then JSON
                Self::parse_toml(&contents).or_else(|_| Self::parse_json(&contents))
            }
        }
    }

    /// Parse config from a TOML string.
    pub fn parse_toml(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| ExitError::Config(format!("invalid {CONFIG_TOML}: {e}")).into())
    }

    /// Parse config from a JSON string.
    pub fn parse_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ExitError::Config(format!("invalid {CONFIG_JSON}: {e}")).into())
    }

    /// Serialize config to a TOML string with helpful comments.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        let raw = toml::to_string_pretty(self).context("serializing config to TOML")?;

        // Use toml_edit to add comments for the section headers
        let mut doc: toml_edit::DocumentMut = raw
            .parse()
            .context("parsing generated TOML for comment injection")?;

        doc.decor_mut()
            .set_prefix("# likecount configuration\n\n");

        fn set_table_comment(doc: &mut toml_edit::DocumentMut, key: &str, comment: &str) {
            if let Some(item) = doc.get_mut(key) {
                if let Some(tbl) = item.as_table_mut() {
                    tbl.decor_mut().set_prefix(comment);
                }
            }
        }

        set_table_comment(
            &mut doc,
            "slack",
            "\n# Slack access: webhook for delivery, archive base for permalinks.\n# The API token can live in the SLACK_API_TOKEN environment variable instead.\n",
        );
        set_table_comment(&mut doc, "report", "\n# How the posted report looks\n");
        set_table_comment(
            &mut doc,
            "scan",
            "\n# Which channels are scanned and how per-channel failures are handled\n",
        );

        Ok(doc.to_string())
    }

    /// Effective API token: environment first, then the config field.
    pub fn api_token(&self) -> anyhow::Result<String> {
        if let Ok(token) = std::env::var(TOKEN_ENV)
            && !token.is_empty()
        {
            return Ok(token);
        }
        self.slack
            .api_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ExitError::Config(format!(
                    "no Slack API token: set {TOKEN_ENV} or slack.api_token"
                ))
                .into()
            })
    }
}
