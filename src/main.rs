use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ferry::commands::export::Variants;
use ferry::linear::DEFAULT_ENDPOINT;
use ferry::output::Format;

#[derive(Parser)]
#[command(
    name = "ferry",
    version,
    about = "Move a Height workspace export into Linear and restore its task hierarchy"
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    format: Format,
    /// Shorthand for --format json
    #[arg(long, global = true, hide = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert tasks.json, teams.json and users.json into a Linear import CSV
    Export {
        /// Directory holding the source export files
        #[arg(long, default_value = "export")]
        input_dir: PathBuf,
        /// Destination CSV path; parent_mapping.json is written beside it
        #[arg(long, short, default_value = "linear_import.csv")]
        output: PathBuf,
        /// Put source ids in the ID column (experimental)
        #[arg(long)]
        use_source_ids: bool,
        /// Write both the plain CSV and a *_with_ids.csv variant
        #[arg(long)]
        generate_both: bool,
    },
    /// Restore parent links on imported issues via the Linear API
    Relink {
        /// Relationship file written by `export`
        #[arg(long, default_value = "parent_mapping.json")]
        mapping: PathBuf,
        /// GraphQL endpoint
        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        api_url: String,
        /// Show the planned updates without changing anything
        #[arg(long)]
        dry_run: bool,
    },
}

fn run(cli: Cli, format: Format) -> ferry::error::Result<()> {
    match cli.command {
        Commands::Export {
            input_dir,
            output,
            use_source_ids,
            generate_both,
        } => ferry::commands::export::run(
            &input_dir,
            &output,
            Variants {
                use_source_ids,
                generate_both,
            },
            format,
        ),
        Commands::Relink {
            mapping,
            api_url,
            dry_run,
        } => ferry::commands::relink::run(&mapping, &api_url, dry_run, format),
    }
}

fn main() {
    let cli = Cli::parse();
    let format = if cli.json { Format::Json } else { cli.format };
    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
