// src/commands.rs

//! One function per subcommand. Each loads the plan through a [`PlanStore`],
//! calls into the core and prints a plain-text result on stdout.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::checkpoint::{run_checkpoint, CheckRunner, CheckpointReport, CommandCheckRunner};
use crate::config::Config;
use crate::dag::{ready_tasks, validate_document, StatusCounts};
use crate::document::Document;
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::lifecycle::{Lifecycle, LifecycleEvent};
use crate::replan::Replanner;
use crate::store::PlanStore;

/// Shared state for command execution.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub fs: Arc<dyn FileSystem>,
    pub lifecycle: Lifecycle,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            fs: Arc::new(RealFileSystem),
            lifecycle: Lifecycle::default(),
        }
    }

    fn store(&self, doc: &Path) -> PlanStore {
        PlanStore::with_fs(self.fs.clone(), doc)
    }

    fn replanner(&self) -> Replanner {
        Replanner::from_config(&self.config)
    }
}

fn progress_line(counts: &StatusCounts) -> String {
    format!(
        "progress: {}/{} completed ({:.1}%), {} in progress, {} pending, {} failed",
        counts.completed,
        counts.total,
        counts.completed_percent(),
        counts.in_progress,
        counts.pending,
        counts.failed
    )
}

/// Prints the full report; fails with the first graph error, if any.
pub fn validate(ctx: &Context, doc: &Path) -> Result<()> {
    let document = ctx.store(doc).load()?.document;
    let report = validate_document(&document);

    println!("{}: {} tasks", doc.display(), document.tasks().len());
    for issue in document.issues() {
        println!("note: {issue}");
    }
    for err in &report.errors {
        println!("error: {err}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }

    if report.is_ok() {
        println!("ok: {}", StatusCounts::of(document.tasks()));
    }
    report.into_result()
}

pub fn frontier(ctx: &Context, doc: &Path) -> Result<()> {
    let document = ctx.store(doc).load()?.document;
    for line in frontier_lines(&document)? {
        println!("{line}");
    }
    Ok(())
}

/// Output of the `frontier` command: a progress line, then the ready tasks
/// or the reason there are none.
pub fn frontier_lines(document: &Document) -> Result<Vec<String>> {
    crate::dag::ensure_document_consistent(document)?;
    let tasks = document.tasks();

    let counts = StatusCounts::of(tasks);
    let mut lines = vec![progress_line(&counts)];

    let ready = ready_tasks(tasks);
    if ready.is_empty() {
        if counts.all_completed() {
            lines.push("all tasks are completed".to_string());
        } else {
            lines.push("no tasks are ready to start".to_string());
        }
        return Ok(lines);
    }

    lines.push(format!("ready ({}):", ready.len()));
    for task in ready {
        let deps = if task.dependencies.is_empty() {
            "none".to_string()
        } else {
            task.dependencies.join(", ")
        };
        lines.push(format!(
            "  {} [{}] {} (deps: {})",
            task.id, task.priority, task.name, deps
        ));
    }
    Ok(lines)
}

pub fn lifecycle(ctx: &Context, doc: &Path, task: &str, event: LifecycleEvent) -> Result<()> {
    let claim = ctx
        .store(doc)
        .mutate(|d| ctx.lifecycle.apply(d, task, event))?;
    match claim {
        Some(claim) => println!(
            "claimed {} as {} at {}",
            claim.task, claim.session_id, claim.claimed_at
        ),
        None => {
            let status = match event {
                LifecycleEvent::Complete => "completed",
                LifecycleEvent::Fail => "failed",
                _ => "pending",
            };
            println!("{task} -> {status}");
        }
    }
    Ok(())
}

pub fn insert_fix(ctx: &Context, doc: &Path, task: &str, description: &str) -> Result<()> {
    let replanner = ctx.replanner();
    let out = ctx
        .store(doc)
        .mutate(|d| replanner.insert_fix(d, task, description))?;
    println!(
        "inserted {} ahead of {}; {} is pending again",
        out.fix_id, out.target, out.target
    );
    Ok(())
}

pub fn reprioritize(ctx: &Context, doc: &Path) -> Result<()> {
    let replanner = ctx.replanner();
    let changes = ctx.store(doc).mutate(|d| replanner.reprioritize(d))?;
    if changes.is_empty() {
        println!("no priority changes");
    }
    for change in changes {
        println!("{change}");
    }
    Ok(())
}

pub fn suggest(ctx: &Context, doc: &Path) -> Result<()> {
    let document = ctx.store(doc).load()?.document;
    let suggestions = ctx.replanner().suggest(document.tasks());
    if suggestions.is_empty() {
        println!("no adjustments suggested");
    }
    for suggestion in suggestions {
        println!("- {suggestion}");
    }
    Ok(())
}

pub async fn checkpoint(ctx: &Context, doc: &Path, root: &Path, skip_lint: bool) -> Result<()> {
    let document: Document = ctx.store(doc).load()?.document;
    let runner = CommandCheckRunner::from_config(&ctx.config.checkpoint);
    let runner: Option<&dyn CheckRunner> = if skip_lint { None } else { Some(&runner) };
    debug!(root = %root.display(), skip_lint, "starting checkpoint");

    let report = run_checkpoint(
        &document,
        root,
        ctx.fs.as_ref(),
        runner,
        &ctx.config.checkpoint,
        &ctx.replanner(),
    )
    .await?;
    print_checkpoint(&report);
    Ok(())
}

fn print_checkpoint(report: &CheckpointReport) {
    let c = &report.counts;
    println!("== progress");
    println!("  total:       {}", c.total);
    println!("  completed:   {} ({:.1}%)", c.completed, c.completed_percent());
    println!("  in progress: {}", c.in_progress);
    println!("  failed:      {}", c.failed);
    println!("  pending:     {}", c.pending);

    println!("\n== artifacts");
    if report.missing.is_empty() {
        println!("  ok ({} task(s) checked)", report.checked_tasks.len());
    } else {
        println!("  missing:");
        for m in &report.missing {
            println!("    - {}: {}", m.task, m.pattern);
        }
    }

    println!("\n== static checks");
    match &report.checks {
        None => println!("  (skipped)"),
        Some(_) if report.failed_checks().count() == 0 => println!("  ok"),
        Some(_) => {
            for check in report.failed_checks() {
                println!("  [{}]", check.dir.display());
                for line in check.preview() {
                    println!("    {line}");
                }
            }
        }
    }

    println!("\n== blocked");
    if report.blocked.is_empty() {
        println!("  none");
    }
    for b in &report.blocked {
        println!("  {} failed; waiting: {}", b.failed, b.waiting.join(", "));
    }

    println!("\n== suggestions");
    if report.suggestions.is_empty() {
        println!("  none");
    }
    for s in &report.suggestions {
        println!("  - {s}");
    }

    println!("\n== next steps");
    for (i, step) in report.next_steps.iter().enumerate() {
        println!("  {}. {step}", i + 1);
    }
}
