use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Name of the source system as it appears in the import tag.
pub const SOURCE_NAME: &str = "Height";

/// Brackets may come back escaped (`\[...\]`) once the destination renders the body as markdown.
static IMPORT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\?\[Imported from Height: (T-\d+)\\?\]").expect("import tag pattern is valid")
});

/// Stable export reference derived from a task's sequence index: `T-{index}`.
///
/// This is the only identifier that survives the trip through the destination
/// import, so both phases must derive it identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurrogateKey(u64);

impl SurrogateKey {
    pub const PREFIX: &'static str = "T-";

    pub fn index(self) -> u64 {
        self.0
    }

    /// The bracketed tag prepended to every exported description.
    pub fn import_tag(self) -> String {
        format!("[Imported from {SOURCE_NAME}: {self}]")
    }

    /// Recover the key from a destination body, tolerating escaped brackets.
    pub fn extract_from_body(body: &str) -> Option<Self> {
        let captures = IMPORT_TAG.captures(body)?;
        captures.get(1)?.as_str().parse().ok()
    }
}

impl fmt::Display for SurrogateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl From<u64> for SurrogateKey {
    fn from(index: u64) -> Self {
        Self(index)
    }
}

impl FromStr for SurrogateKey {
    type Err = SurrogateKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| SurrogateKeyParseError(trimmed.to_string()))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SurrogateKeyParseError(trimmed.to_string()));
        }
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| SurrogateKeyParseError(trimmed.to_string()))
    }
}

impl Serialize for SurrogateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SurrogateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurrogateKeyParseError(String);

impl fmt::Display for SurrogateKeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a T-<number> reference", self.0)
    }
}

impl std::error::Error for SurrogateKeyParseError {}
