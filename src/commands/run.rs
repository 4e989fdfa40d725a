use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::Args;
use tracing::{debug, info, warn};

use crate::config::{self, Config, HistoryErrorPolicy};
use crate::directory::Directory;
use crate::error::ExitError;
use crate::slack::{self, SlackClient, WebhookPayload};
use crate::tally::Tally;
use crate::{report, scan, window};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Project root directory
    #[arg(long)]
    pub project_root: Option<PathBuf>,
    /// Resolve the window as if running on this date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Print the report to stdout instead of posting it
    #[arg(long)]
    pub dry_run: bool,
    /// Scan even on a Saturday or Sunday
    #[arg(long)]
    pub force: bool,
}

impl RunArgs {
    pub fn execute(&self) -> anyhow::Result<()> {
        let root = match self.project_root.clone() {
            Some(p) => p,
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        let config = Config::load(&config::locate(&root)?)?;
        let tz = config.report.tz()?;

        let today = self
            .date
            .unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive());
        if !self.force && !window::is_business_day(today) {
            info!(%today, "weekend run, nothing to scan");
            return Ok(());
        }

        let window = window::resolve(today, tz)?;
        info!(window = %window.label(), "scanning");

        let client = SlackClient::new(config.api_token()?);
        let members = client
            .list_members()
            .map_err(|e| ExitError::Directory(format!("{e:#}")))?;
        let roster = Directory::from_members(members);
        debug!(
            all = roster.len(),
            eligible = roster.eligible_len(),
            "directory built"
        );

        let channels = client
            .list_channels()
            .map_err(|e| ExitError::Directory(format!("{e:#}")))?;

        let mut tally = Tally::default();
        for channel in &channels {
            if config.scan.excludes(&channel.name) {
                debug!(channel = %channel.name, "excluded by name");
                continue;
            }
            let messages = match client.channel_history(&channel.id) {
                Ok(messages) => messages,
                Err(e) => match config.scan.on_history_error {
                    HistoryErrorPolicy::Skip => {
                        warn!(channel = %channel.name, "history fetch failed, channel omitted: {e:#}");
                        continue;
                    }
                    HistoryErrorPolicy::Fail => {
                        return Err(ExitError::History {
                            channel: channel.name.clone(),
                            message: format!("{e:#}"),
                        }
                        .into());
                    }
                },
            };
            let recorded = scan::scan_channel(
                channel,
                &messages,
                &window,
                &roster,
                &config.slack.archive_url,
                &mut tally,
            );
            if recorded > 0 {
                debug!(channel = %channel.name, recorded, "mentions recorded");
            }
        }

        let text = report::render(&window, &roster, &tally);
        if self.dry_run {
            print!("{text}");
            return Ok(());
        }

        let payload = WebhookPayload {
            channel: config.report.channel.clone(),
            username: config.report.username.clone(),
            text,
            icon_emoji: config.report.icon_emoji.clone(),
        };
        slack::post_webhook(&config.slack.webhook_url, &payload)
            .map_err(|e| ExitError::Delivery(format!("{e:#}")))?;
        info!(total = tally.total(), "report delivered");
        Ok(())
    }
}
