// src/lib.rs

pub mod checkpoint;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dag;
pub mod document;
pub mod errors;
pub mod fs;
pub mod lifecycle;
pub mod logging;
pub mod replan;
pub mod store;
pub mod types;

use tracing::debug;

use crate::cli::{CliArgs, Command};
use crate::commands::Context;
use crate::config::load_config;
use crate::errors::Result;
use crate::lifecycle::LifecycleEvent;

/// High-level entry point used by `main.rs`.
///
/// Loads the configuration and dispatches to one subcommand.
pub async fn run(args: CliArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    debug!(?config, "configuration loaded");
    let ctx = Context::new(config);

    match args.command {
        Command::Validate(d) => commands::validate(&ctx, &d.doc),
        Command::Frontier(d) => commands::frontier(&ctx, &d.doc),
        Command::Claim { doc, task } => {
            commands::lifecycle(&ctx, &doc.doc, &task, LifecycleEvent::Claim)
        }
        Command::Complete { doc, task, failed } => {
            let event = if failed {
                LifecycleEvent::Fail
            } else {
                LifecycleEvent::Complete
            };
            commands::lifecycle(&ctx, &doc.doc, &task, event)
        }
        Command::Reset { doc, task } => {
            commands::lifecycle(&ctx, &doc.doc, &task, LifecycleEvent::Reset)
        }
        Command::InsertFix {
            doc,
            task,
            description,
        } => commands::insert_fix(&ctx, &doc.doc, &task, &description),
        Command::Reprioritize(d) => commands::reprioritize(&ctx, &d.doc),
        Command::Suggest(d) => commands::suggest(&ctx, &d.doc),
        Command::Checkpoint {
            doc,
            root,
            skip_lint,
        } => commands::checkpoint(&ctx, &doc.doc, &root, skip_lint).await,
    }
}
