use std::io::{self, BufRead, Write};

use crate::error::{FerryError, Result};

/// Environment variable consulted before prompting for the API key.
pub const API_KEY_ENV: &str = "FERRY_API_KEY";

/// Line-oriented prompts for run-time parameters that must not be CLI arguments.
///
/// Prompts are written to `output` (stderr for the real console) so stdout
/// carries only the report.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and return the trimmed reply. End of input reads as empty.
    pub fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    pub fn say(&mut self, line: impl std::fmt::Display) -> Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Optional team key; an empty reply means no filter.
    pub fn ask_team_filter(&mut self) -> Result<Option<String>> {
        let reply = self.ask("Filter by team key? (e.g. 'ENG', or press Enter to skip): ")?;
        Ok(Some(reply).filter(|key| !key.is_empty()))
    }

    pub fn ask_confirmation(&mut self, update_count: usize) -> Result<String> {
        writeln!(self.output, "This will update {update_count} issues.")?;
        self.ask("Proceed with updates? (yes/no): ")
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> W {
        self.output
    }
}

/// API key from the environment, ignoring empty values.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

/// Resolve the API key from the environment or a no-echo terminal prompt.
pub fn resolve_api_key() -> Result<String> {
    let key = match api_key_from_env() {
        Some(key) => key,
        None => rpassword::prompt_password("Enter your Linear API key: ")?,
    };
    require_credential(&key)
}

fn require_credential(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FerryError::MissingCredential);
    }
    Ok(trimmed.to_string())
}
