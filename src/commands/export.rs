use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;

use crate::edges::EdgeSet;
use crate::error::Result;
use crate::mapping::IdentityMaps;
use crate::output::{self, Format};
use crate::store::edges::{EDGE_FILE, write_edges};
use crate::store::export::SourceExport;
use crate::store::rows::{with_ids_path, write_rows};
use crate::transform::{TransformOptions, transform_task};

/// Which CSV variants to produce in one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Variants {
    pub use_source_ids: bool,
    pub generate_both: bool,
}

#[derive(Debug, Serialize)]
struct WrittenFile {
    path: String,
    with_ids: bool,
    rows: usize,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    input_dir: String,
    tasks: usize,
    teams: usize,
    users: usize,
    relationships: usize,
    mapping_path: String,
    files: Vec<WrittenFile>,
}

pub fn run(
    input_dir: &Path,
    output_path: &Path,
    variants: Variants,
    format: Format,
) -> Result<()> {
    output::progress(format, format!("Loading data from {}...", input_dir.display()));
    let export = SourceExport::load(input_dir)?;
    output::progress(
        format,
        format!(
            "Loaded {} tasks, {} teams, {} users",
            export.tasks.len(),
            export.teams.len(),
            export.users.len()
        ),
    );

    let maps = IdentityMaps::build(&export.tasks, &export.teams, &export.users);

    let edges = EdgeSet::extract(&export.tasks, &maps);
    let mapping_path = output_path.with_file_name(EDGE_FILE);
    write_edges(&mapping_path, &edges)?;
    output::progress(
        format,
        format!(
            "Wrote {} relationships to {}",
            edges.len(),
            mapping_path.display()
        ),
    );

    let mut files = Vec::new();
    for (path, with_ids) in planned_outputs(output_path, variants) {
        let options = TransformOptions {
            embed_source_id: with_ids,
        };
        let rows: Vec<_> = export
            .tasks
            .iter()
            .map(|task| transform_task(task, &maps, options))
            .collect();
        let written = write_rows(&path, &rows)?;
        output::progress(format, format!("Wrote {written} rows to {}", path.display()));
        files.push(WrittenFile {
            path: path.display().to_string(),
            with_ids,
            rows: written,
        });
    }

    let report = ExportReport {
        input_dir: input_dir.display().to_string(),
        tasks: export.tasks.len(),
        teams: export.teams.len(),
        users: export.users.len(),
        relationships: edges.len(),
        mapping_path: mapping_path.display().to_string(),
        files,
    };
    print_report(&report, format)
}

fn planned_outputs(primary: &Path, variants: Variants) -> Vec<(PathBuf, bool)> {
    if variants.generate_both {
        vec![(primary.to_path_buf(), false), (with_ids_path(primary), true)]
    } else {
        vec![(primary.to_path_buf(), variants.use_source_ids)]
    }
}

fn print_report(report: &ExportReport, format: Format) -> Result<()> {
    match format {
        Format::Json => output::print_json(report)?,
        Format::Pretty => {
            println!(
                "{} {}",
                "export".bold(),
                format!("({})", report.input_dir).dimmed()
            );
            println!(
                "  {} {} tasks, {} teams, {} users",
                "loaded:".dimmed(),
                report.tasks,
                report.teams,
                report.users
            );
            for file in &report.files {
                let variant = if file.with_ids {
                    "with source ids (experimental)"
                } else {
                    "destination-assigned ids"
                };
                println!(
                    "  {} {} ({} rows, {})",
                    "csv:".dimmed(),
                    file.path.green(),
                    file.rows,
                    variant
                );
            }
            println!(
                "  {} {} ({} parent-child relationships)",
                "mapping:".dimmed(),
                report.mapping_path.green(),
                report.relationships
            );
            if report.files.iter().any(|file| !file.with_ids) {
                println!(
                    "\n{}",
                    "Import the CSV, then run `ferry relink` to restore parent links.".dimmed()
                );
            }
        }
        Format::Minimal => {
            println!(
                "tasks={} teams={} users={} relationships={} files={} rows={}",
                report.tasks,
                report.teams,
                report.users,
                report.relationships,
                report.files.len(),
                report.files.iter().map(|file| file.rows).sum::<usize>()
            );
        }
    }
    Ok(())
}
