use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tracker", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, value_name = "DATE", global = true)]
    pub today: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tracker add "Buy milk" --start 09:00 --end 10:00
    Add {
        description: Option<String>,
        /// Start time (HH:MM), given together with --end
        #[arg(long, value_name = "HH:MM")]
        start: Option<String>,
        /// End time (HH:MM), given together with --start
        #[arg(long, value_name = "HH:MM")]
        end: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Mark a task as in progress
    ///
    /// Example: tracker start 1
    Start { id: u64 },
    /// Mark a task as completed
    ///
    /// Example: tracker done 1
    Done { id: u64 },
    /// Move a task back to todo
    ///
    /// Example: tracker reopen 1
    Reopen { id: u64 },
    /// Set a task's status directly
    ///
    /// Example: tracker status 1 in-progress
    Status { id: u64, status: String },
    /// Replace a task's comment (empty text clears it)
    ///
    /// Example: tracker comment 1 "waiting on review"
    Comment { id: u64, text: String },
    /// Delete a task
    ///
    /// Example: tracker delete 1
    Delete { id: u64 },
    /// Show details of a task
    ///
    /// Example: tracker show 1
    Show { id: u64 },
    /// List tasks created today
    Today,
    /// List completed tasks from other days, grouped by completion date
    History,
    /// List every task
    List,
    /// Read commands from stdin, one per line
    Shell,
}

impl Command {
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Self::Add { .. }
                | Self::Start { .. }
                | Self::Done { .. }
                | Self::Reopen { .. }
                | Self::Status { .. }
                | Self::Comment { .. }
                | Self::Delete { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    RequireSchedule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let key = canonicalize_flag_name(key_raw)
        .ok_or_else(|| "override key cannot be empty".to_string())?;
    let target = match key.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "require_schedule" => ConfigOverrideTarget::RequireSchedule,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride {
        target,
        value: value_raw.trim().to_string(),
    })
}

pub fn parse_flag_value(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("expected true or false, got '{other}'")),
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
        } else if !cleaned.is_empty() && !cleaned.ends_with('_') {
            cleaned.push('_');
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
