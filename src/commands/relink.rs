use std::io::{BufRead, Write};
use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::applier::{self, ApplyOutcome, MissingParent, PlannedUpdate, RelinkPlan};
use crate::edges::EdgeSet;
use crate::error::{FerryError, Result};
use crate::linear::LinearClient;
use crate::output::{self, Format, truncate_title};
use crate::prompt::{self, Console};
use crate::reconcile::{ReconciliationMap, fetch_all_issues};
use crate::store::edges::read_edges;
use crate::surrogate::SurrogateKey;
use crate::tracker::IssueTracker;

const PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelinkStatus {
    NothingToDo,
    DryRun,
    Aborted,
    Applied,
}

#[derive(Debug, Serialize)]
pub struct RelinkReport {
    pub status: RelinkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_key: Option<String>,
    pub issues_fetched: usize,
    pub tagged_issues: usize,
    pub edges: usize,
    pub already_linked: usize,
    pub missing_child: usize,
    pub missing_parent: Vec<MissingParent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicate_tags: Vec<SurrogateKey>,
    pub planned: Vec<PlannedUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<ApplyOutcome>,
}

pub fn run(mapping: &Path, api_url: &str, dry_run: bool, format: Format) -> Result<()> {
    output::progress(format, format!("Loading relationships from {}...", mapping.display()));
    let edges = read_edges(mapping)?;

    let api_key = prompt::resolve_api_key()?;
    let mut console = Console::stdio();
    let team_key = console.ask_team_filter()?;

    let client = LinearClient::new(api_url, api_key)?;
    let report = relink(
        &client,
        &mut console,
        &edges,
        team_key.as_deref(),
        dry_run,
        format,
    )?;
    print_report(&report, format)
}

/// Reconcile against the destination and, once confirmed, repair parent links.
pub fn relink<T, R, W>(
    tracker: &T,
    console: &mut Console<R, W>,
    edges: &EdgeSet,
    team_key: Option<&str>,
    dry_run: bool,
    format: Format,
) -> Result<RelinkReport>
where
    T: IssueTracker + ?Sized,
    R: BufRead,
    W: Write,
{
    match team_key {
        Some(key) => output::progress(format, format!("Fetching issues (team: {key})...")),
        None => output::progress(format, "Fetching issues..."),
    }
    let issues = fetch_all_issues(tracker, team_key, |count| {
        output::progress(format, format!("  fetched {count} issues"));
    })?;

    let map = ReconciliationMap::build(&issues);
    output::progress(
        format,
        format!("Found {} issues carrying an import tag", map.len()),
    );
    if map.is_empty() {
        return Err(FerryError::NoTaggedIssues);
    }
    for key in map.duplicates() {
        output::warn(format, format!("{key} is tagged on more than one issue; using the last"));
    }

    let plan = RelinkPlan::build(edges, &map);
    for missing in &plan.missing_parent {
        output::warn(
            format,
            format!(
                "parent {} not found for {} ({})",
                missing.parent_key, missing.child_key, missing.child_identifier
            ),
        );
    }

    let mut report = RelinkReport {
        status: RelinkStatus::NothingToDo,
        team_key: team_key.map(str::to_string),
        issues_fetched: issues.len(),
        tagged_issues: map.len(),
        edges: edges.len(),
        already_linked: plan.already_linked,
        missing_child: plan.missing_child,
        missing_parent: plan.missing_parent.clone(),
        duplicate_tags: map.duplicates().to_vec(),
        planned: plan.updates.clone(),
        applied: None,
    };

    if plan.updates.is_empty() {
        return Ok(report);
    }

    console.say(format!("Updates needed: {}", plan.updates.len()))?;
    console.say(format!("Sample updates (first {PREVIEW_LIMIT}):"))?;
    for update in plan.updates.iter().take(PREVIEW_LIMIT) {
        console.say(format!(
            "  {} ({}) → parent: {} ({})",
            update.child_identifier, update.child_key, update.parent_identifier, update.parent_key
        ))?;
    }

    if dry_run {
        report.status = RelinkStatus::DryRun;
        return Ok(report);
    }

    let reply = console.ask_confirmation(plan.updates.len())?;
    let Some(approved) = plan.approve(&reply) else {
        console.say("Aborted.")?;
        report.status = RelinkStatus::Aborted;
        return Ok(report);
    };

    let total = plan.updates.len();
    let outcome = applier::apply(tracker, approved, |position, update, failure| {
        if format != Format::Pretty {
            return;
        }
        match failure {
            None => eprintln!(
                "  [{position}/{total}] {} {} → {}",
                "✓".green(),
                update.child_identifier,
                update.parent_identifier
            ),
            Some(reason) => eprintln!(
                "  [{position}/{total}] {} {}: {}",
                "✗".red(),
                update.child_identifier,
                reason
            ),
        }
    });

    report.status = RelinkStatus::Applied;
    report.applied = Some(outcome);
    Ok(report)
}

fn print_report(report: &RelinkReport, format: Format) -> Result<()> {
    match format {
        Format::Json => output::print_json(report)?,
        Format::Pretty => {
            println!(
                "{} {}",
                "relink".bold(),
                format!("({})", status_label(report.status)).dimmed()
            );
            if let Some(key) = &report.team_key {
                println!("  {} {}", "team:".dimmed(), key);
            }
            println!(
                "  {} {} fetched, {} tagged",
                "issues:".dimmed(),
                report.issues_fetched,
                report.tagged_issues
            );
            println!(
                "  {} {} in mapping, {} already linked, {} planned",
                "relationships:".dimmed(),
                report.edges,
                report.already_linked,
                report.planned.len()
            );
            if report.missing_child > 0 {
                println!(
                    "  {} {} (child not imported or filtered out)",
                    "skipped:".dimmed(),
                    report.missing_child
                );
            }

            if !report.missing_parent.is_empty() || !report.duplicate_tags.is_empty() {
                println!("\n{}", "Warnings".yellow().bold());
                for missing in &report.missing_parent {
                    println!(
                        "  - {}",
                        format!(
                            "parent {} not found for {} ({})",
                            missing.parent_key, missing.child_key, missing.child_identifier
                        )
                        .yellow()
                    );
                }
                for key in &report.duplicate_tags {
                    println!(
                        "  - {}",
                        format!("{key} is tagged on more than one issue").yellow()
                    );
                }
            }

            match (&report.status, &report.applied) {
                (RelinkStatus::NothingToDo, _) => println!(
                    "\n{}",
                    "All parent-child relationships are already set correctly.".green()
                ),
                (RelinkStatus::DryRun, _) => {
                    println!("\n{}", "Planned updates".bold());
                    for update in &report.planned {
                        println!(
                            "  {} → {}  {}",
                            update.child_identifier,
                            update.parent_identifier,
                            truncate_title(&update.child_title, 60).dimmed()
                        );
                    }
                    println!("\n{}", "Dry run; no issues were changed.".green())
                }
                (RelinkStatus::Aborted, _) => {
                    println!("\n{}", "Aborted; no issues were changed.".yellow())
                }
                (RelinkStatus::Applied, Some(outcome)) => {
                    println!("\n{}", "Summary".bold());
                    println!(
                        "  {} {}",
                        "successful updates:".dimmed(),
                        outcome.succeeded.to_string().green()
                    );
                    println!(
                        "  {} {}",
                        "failed updates:".dimmed(),
                        outcome.failures.len().to_string().red()
                    );
                    println!("  {} {}", "total:".dimmed(), outcome.attempted());
                    for failure in &outcome.failures {
                        println!(
                            "  - {}",
                            format!(
                                "{} → {}: {}",
                                failure.child_identifier,
                                failure.parent_identifier,
                                failure.reason
                            )
                            .red()
                        );
                    }
                }
                (RelinkStatus::Applied, None) => {}
            }
        }
        Format::Minimal => {
            let (succeeded, failed) = report
                .applied
                .as_ref()
                .map(|outcome| (outcome.succeeded, outcome.failures.len()))
                .unwrap_or((0, 0));
            println!(
                "status={} fetched={} tagged={} edges={} linked={} planned={} missing_parent={} succeeded={} failed={}",
                status_label(report.status),
                report.issues_fetched,
                report.tagged_issues,
                report.edges,
                report.already_linked,
                report.planned.len(),
                report.missing_parent.len(),
                succeeded,
                failed
            );
        }
    }
    Ok(())
}

fn status_label(status: RelinkStatus) -> &'static str {
    match status {
        RelinkStatus::NothingToDo => "nothing-to-do",
        RelinkStatus::DryRun => "dry-run",
        RelinkStatus::Aborted => "aborted",
        RelinkStatus::Applied => "applied",
    }
}
