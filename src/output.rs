use std::fmt::Display;

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

/// Progress lines go to stderr so stdout stays a clean report.
pub fn progress(format: Format, message: impl Display) {
    if format == Format::Pretty {
        eprintln!("{}", message.to_string().dimmed());
    }
}

pub fn warn(format: Format, message: impl Display) {
    if format == Format::Pretty {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }
}

pub fn print_json<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string(report)?);
    Ok(())
}

pub fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() > max_len {
        let truncated: String = title.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        title.to_string()
    }
}
