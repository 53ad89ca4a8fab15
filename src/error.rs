use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FerryError {
    #[error("required input file '{}' not found", .0.display())]
    MissingInput(PathBuf),

    #[error("export file '{}' is malformed: {message}", .path.display())]
    InvalidExport { path: PathBuf, message: String },

    #[error("tasks '{first}' and '{second}' share sequence index {index}")]
    DuplicateIndex {
        index: u64,
        first: String,
        second: String,
    },

    #[error("relationship mapping '{}' not found (run `ferry export` first)", .0.display())]
    MissingEdgeArtifact(PathBuf),

    #[error("relationship mapping is malformed: {0}")]
    InvalidEdgeArtifact(String),

    #[error("an API key is required")]
    MissingCredential,

    #[error("no issues with an import tag were found (was the CSV imported?)")]
    NoTaggedIssues,

    #[error("graphql errors: {0}")]
    GraphQl(String),

    #[error("unexpected response from destination: {0}")]
    Protocol(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl FerryError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "missing_input",
            Self::InvalidExport { .. } => "invalid_export",
            Self::DuplicateIndex { .. } => "duplicate_index",
            Self::MissingEdgeArtifact(_) => "missing_edge_artifact",
            Self::InvalidEdgeArtifact(_) => "invalid_edge_artifact",
            Self::MissingCredential => "missing_credential",
            Self::NoTaggedIssues => "no_tagged_issues",
            Self::GraphQl(_) => "graphql_error",
            Self::Protocol(_) => "protocol_error",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
            Self::Csv(_) => "csv_error",
            Self::Http(_) => "http_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, FerryError>;
