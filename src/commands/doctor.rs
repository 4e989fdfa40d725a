use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::config::{self, Config};
use crate::slack::SlackClient;

#[derive(Debug, Args)]
pub struct DoctorArgs {
    /// Project root directory
    #[arg(long)]
    pub project_root: Option<PathBuf>,
    /// Strict mode: also verify the token against auth.test
    #[arg(long)]
    pub strict: bool,
    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Text,
    Json,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DoctorReport {
    pub config: ConfigStatus,
    pub checks: Vec<CheckStatus>,
    pub issues: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigStatus {
    pub path: String,
    pub version: String,
    pub channel: String,
    pub timezone: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckStatus {
    pub name: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DoctorArgs {
    pub fn execute(&self) -> anyhow::Result<()> {
        let root = match self.project_root.clone() {
            Some(p) => p,
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        let config_path = config::locate(&root)?;
        let config = Config::load(&config_path)?;

        let format = self.format.unwrap_or_else(|| {
            if std::io::stdout().is_terminal() {
                OutputFormat::Pretty
            } else {
                OutputFormat::Text
            }
        });

        let mut report = DoctorReport {
            config: ConfigStatus {
                path: config_path.display().to_string(),
                version: config.version.clone(),
                channel: config.report.channel.clone(),
                timezone: config.report.timezone.clone(),
            },
            checks: vec![],
            issues: vec![],
        };

        let token = config.api_token();
        push_check(
            &mut report,
            "api token",
            token.is_ok(),
            token.as_ref().err().map(|e| format!("{e:#}")),
        );

        let webhook_ok = config.slack.webhook_url.starts_with("https://");
        push_check(
            &mut report,
            "webhook url",
            webhook_ok,
            (!webhook_ok).then(|| format!("not https: {}", config.slack.webhook_url)),
        );

        let archive_ok = config.slack.archive_url.starts_with("https://");
        push_check(
            &mut report,
            "archive url",
            archive_ok,
            (!archive_ok).then(|| format!("not https: {}", config.slack.archive_url)),
        );

        let tz = config.report.tz();
        push_check(
            &mut report,
            "timezone",
            tz.is_ok(),
            tz.err().map(|e| format!("{e:#}")),
        );

        let channel_ok = config.report.channel.starts_with('#');
        push_check(
            &mut report,
            "report channel",
            channel_ok,
            (!channel_ok).then(|| format!("expected a #channel, got {}", config.report.channel)),
        );

        // Live token check only in strict mode: doctor stays offline by default
        if self.strict
            && let Ok(token) = token
        {
            let auth = SlackClient::new(token).auth_test();
            push_check(
                &mut report,
                "slack auth",
                auth.is_ok(),
                match auth {
                    Ok(user_id) => Some(format!("authed as {user_id}")),
                    Err(e) => Some(format!("{e:#}")),
                },
            );
        }

        let issue_count = report.issues.len();

        match format {
            OutputFormat::Pretty => print_pretty(&report),
            OutputFormat::Text => print_text(&report),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }

        if issue_count > 0 {
            return Err(crate::error::ExitError::new(
                u8::try_from(issue_count.min(125)).unwrap_or(125),
                format!("{issue_count} issue(s) found"),
            )
            .into());
        }

        Ok(())
    }
}

fn push_check(report: &mut DoctorReport, name: &str, ok: bool, detail: Option<String>) {
    if !ok {
        let issue = detail
            .clone()
            .map_or_else(|| name.to_string(), |d| format!("{name}: {d}"));
        report.issues.push(issue);
    }
    report.checks.push(CheckStatus {
        name: name.to_string(),
        ok,
        detail,
    });
}

fn print_pretty(report: &DoctorReport) {
    println!("=== Likecount Doctor ===\n");
    println!("Config:   {}", report.config.path);
    println!("Version:  {}", report.config.version);
    println!("Channel:  {}", report.config.channel);
    println!("Timezone: {}", report.config.timezone);

    println!("\nChecks:");
    for check in &report.checks {
        let mark = if check.ok { "✓" } else { "✗" };
        match &check.detail {
            Some(detail) => println!("  {mark} {}: {detail}", check.name),
            None => println!("  {mark} {}", check.name),
        }
    }

    if report.issues.is_empty() {
        println!("\n✓ No issues found");
    } else {
        println!("\nIssues ({}):", report.issues.len());
        for issue in &report.issues {
            println!("  • {issue}");
        }
    }
}

fn print_text(report: &DoctorReport) {
    println!(
        "likecount-doctor  config={}  version={}  channel={}  timezone={}",
        report.config.path, report.config.version, report.config.channel, report.config.timezone
    );
    for check in &report.checks {
        let status = if check.ok { "ok" } else { "failed" };
        match &check.detail {
            Some(detail) => println!("check  {}  {status}  {detail}", check.name),
            None => println!("check  {}  {status}", check.name),
        }
    }
    if !report.issues.is_empty() {
        println!("issues  count={}", report.issues.len());
        for issue in &report.issues {
            println!("issue  {issue}");
        }
    }
}
