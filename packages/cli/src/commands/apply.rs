use crate::commands::{print_diagnostic, read_document};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use vellum_editor::{DocumentStore, EditorError, PatchOp};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Document JSON to edit
    pub document: PathBuf,

    /// Patch file: a single op or an array of ops
    pub patches: PathBuf,

    /// Write the edited document here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Skip ops whose target does not exist instead of rejecting the batch
    #[arg(long)]
    pub lenient: bool,
}

pub fn apply(args: ApplyArgs, cwd: &Path, config: &Config) -> Result<()> {
    let document = read_document(&args.document)?;
    let patch_json = fs::read_to_string(&args.patches)
        .with_context(|| format!("Cannot read {}", args.patches.display()))?;
    let ops = PatchOp::batch_from_json(&patch_json)
        .with_context(|| format!("Invalid patch file {}", args.patches.display()))?;

    let mut store_config = config.store.clone();
    if args.lenient {
        store_config = store_config.lenient();
    }
    let mut store = DocumentStore::with_config(document, store_config);

    let update = match store.apply_patches(&ops) {
        Ok(update) => update,
        Err(err) => {
            report_rejection(&err);
            return Err(err).context("Patch batch rejected, document unchanged");
        }
    };
    for diagnostic in &update.skipped {
        print_diagnostic(diagnostic);
    }
    info!(
        ops = ops.len(),
        skipped = update.skipped.len(),
        dirty = update.changes.dirty_nodes().count(),
        "Applied patch batch"
    );

    let output = config.to_json(&*update.document)?;
    match &args.out {
        Some(out) => {
            let out = cwd.join(out);
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&out, output)?;
            eprintln!(
                "{} Applied {} ops → {}",
                "✓".green(),
                ops.len() - update.skipped.len(),
                out.display()
            );
        }
        None => println!("{}", output),
    }
    Ok(())
}

fn report_rejection(err: &EditorError) {
    if let EditorError::Batch(batch) = err {
        if let Some(index) = batch.op_index() {
            eprintln!("  {} op #{}", "rejected".red().bold(), index);
        }
    }
    print_diagnostic(&err.to_diagnostic());
}
