use std::fs;
use std::path::Path;

use crate::edges::EdgeSet;
use crate::error::{FerryError, Result};

/// Default file name of the persisted relationship mapping.
pub const EDGE_FILE: &str = "parent_mapping.json";

pub fn write_edges(path: &Path, edges: &EdgeSet) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(edges)?)?;
    Ok(())
}

pub fn read_edges(path: &Path) -> Result<EdgeSet> {
    if !path.is_file() {
        return Err(FerryError::MissingEdgeArtifact(path.to_path_buf()));
    }
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data)
        .map_err(|err| FerryError::InvalidEdgeArtifact(format!("{}: {err}", path.display())))
}
