use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::{self, Config, ReportConfig, ScanConfig, SlackConfig, CONFIG_VERSION};
use crate::error::ExitError;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Incoming webhook URL the report is posted to
    #[arg(long)]
    pub webhook_url: Option<String>,
    /// Archive base URL for permalinks, e.g. https://acme.slack.com/archives
    #[arg(long)]
    pub archive_url: Option<String>,
    /// Channel the report is posted to
    #[arg(long)]
    pub channel: Option<String>,
    /// Display name the webhook posts under
    #[arg(long)]
    pub username: Option<String>,
    /// IANA timezone the scan window is resolved in
    #[arg(long)]
    pub timezone: Option<String>,
    /// Non-interactive mode
    #[arg(long)]
    pub no_interactive: bool,
    /// Force overwrite existing config
    #[arg(long)]
    pub force: bool,
    /// Project root directory
    #[arg(long)]
    pub project_root: Option<PathBuf>,
}

/// Collected user choices for init
struct InitChoices {
    webhook_url: String,
    archive_url: String,
    channel: String,
    username: String,
    timezone: String,
    api_token: Option<String>,
}

impl InitArgs {
    pub fn execute(&self) -> Result<()> {
        let project_dir = self
            .project_root
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .context("determining project root")?;

        let config_path = project_dir.join(config::CONFIG_TOML);
        if config_path.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            );
        }

        let interactive = !self.no_interactive && std::io::stdin().is_terminal();
        let choices = self.gather_choices(interactive)?;
        let config = build_config(&choices);

        let toml_str = config.to_toml()?;
        fs::write(&config_path, &toml_str)
            .with_context(|| format!("writing {}", config_path.display()))?;
        println!("Generated {}", config::CONFIG_TOML);

        if choices.api_token.is_none() {
            println!(
                "No token stored; export {} before running `likecount run`",
                config::TOKEN_ENV
            );
        }
        Ok(())
    }

    fn gather_choices(&self, interactive: bool) -> Result<InitChoices> {
        // Webhook URL
        let webhook_url = if let Some(ref url) = self.webhook_url {
            validate_https_url(url, "webhook URL")?;
            url.clone()
        } else if interactive {
            let url = prompt_input("Incoming webhook URL", None)?;
            validate_https_url(&url, "webhook URL")?;
            url
        } else {
            return Err(
                ExitError::Other("--webhook-url is required in non-interactive mode".into()).into(),
            );
        };

        // Archive base URL
        let archive_url = if let Some(ref url) = self.archive_url {
            validate_https_url(url, "archive URL")?;
            url.clone()
        } else if interactive {
            let url = prompt_input(
                "Archive base URL (https://<workspace>.slack.com/archives)",
                None,
            )?;
            validate_https_url(&url, "archive URL")?;
            url
        } else {
            return Err(
                ExitError::Other("--archive-url is required in non-interactive mode".into()).into(),
            );
        };

        let defaults = ReportConfig::default();

        // Report channel
        let channel = if let Some(ref channel) = self.channel {
            validate_channel(channel)?;
            channel.clone()
        } else if interactive {
            let channel = prompt_input("Report channel", Some(&defaults.channel))?;
            validate_channel(&channel)?;
            channel
        } else {
            defaults.channel.clone()
        };

        // Bot username
        let username = if let Some(ref username) = self.username {
            username.clone()
        } else if interactive {
            prompt_input("Bot display name", Some(&defaults.username))?
        } else {
            defaults.username.clone()
        };

        // Timezone
        let timezone = if let Some(ref timezone) = self.timezone {
            validate_timezone(timezone)?;
            timezone.clone()
        } else if interactive {
            let timezone = prompt_input("IANA timezone", Some(&defaults.timezone))?;
            validate_timezone(&timezone)?;
            timezone
        } else {
            defaults.timezone.clone()
        };

        // Token: only ever prompted, never a flag, so it stays out of shell history
        let api_token = if interactive {
            let token = prompt_input(
                &format!("Slack API token (empty to rely on {})", config::TOKEN_ENV),
                Some(""),
            )?;
            if token.is_empty() { None } else { Some(token) }
        } else {
            None
        };

        Ok(InitChoices {
            webhook_url,
            archive_url,
            channel,
            username,
            timezone,
            api_token,
        })
    }
}

fn build_config(choices: &InitChoices) -> Config {
    Config {
        version: CONFIG_VERSION.to_string(),
        slack: SlackConfig {
            api_token: choices.api_token.clone(),
            webhook_url: choices.webhook_url.clone(),
            archive_url: choices.archive_url.trim_end_matches('/').to_string(),
        },
        report: ReportConfig {
            channel: choices.channel.clone(),
            username: choices.username.clone(),
            timezone: choices.timezone.clone(),
            ..ReportConfig::default()
        },
        scan: ScanConfig::default(),
    }
}

// --- Interactive prompts using dialoguer ---

fn prompt_input(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut builder = dialoguer::Input::<String>::new().with_prompt(prompt);
    if let Some(d) = default {
        builder = builder.default(d.to_string()).allow_empty(true);
    }
    builder.interact_text().context("reading user input")
}

// --- Validation ---

fn validate_https_url(url: &str, label: &str) -> Result<()> {
    if !url.starts_with("https://") {
        return Err(ExitError::Other(format!("{label} must start with https://, got {url:?}")).into());
    }
    Ok(())
}

fn validate_channel(channel: &str) -> Result<()> {
    if !channel.starts_with('#') || channel.len() < 2 {
        return Err(
            ExitError::Other(format!("report channel must look like #name, got {channel:?}")).into(),
        );
    }
    Ok(())
}

fn validate_timezone(timezone: &str) -> Result<()> {
    if timezone.parse::<chrono_tz::Tz>().is_err() {
        return Err(ExitError::Other(format!(
            "unknown timezone {timezone:?} (expected an IANA name like \"Asia/Tokyo\")"
        ))
        .into());
    }
    Ok(())
}
