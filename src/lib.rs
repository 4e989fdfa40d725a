//! Likecount - daily like-mention tally for Slack workspaces

pub mod commands;
pub mod config;
pub mod directory;
pub mod error;
pub mod mention;
pub mod report;
pub mod scan;
pub mod slack;
pub mod tally;
pub mod telemetry;
pub mod window;
