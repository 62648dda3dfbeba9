use crate::commands::{print_diagnostic, read_document};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use vellum_editor::{DocumentStore, Pipeline};

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Document JSON to compile
    pub document: PathBuf,

    /// Frame to expand and compile
    #[arg(short, long)]
    pub frame: String,

    /// Token schema JSON (overrides config)
    #[arg(short, long)]
    pub tokens: Option<PathBuf>,

    /// Write the render tree here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn compile(args: CompileArgs, cwd: &Path, config: &Config) -> Result<()> {
    let document = read_document(&args.document)?;
    let tokens = config.load_tokens(cwd, args.tokens.as_deref())?;

    let store = DocumentStore::with_config(document, config.store.clone());
    let mut pipeline = Pipeline::new(store, tokens);
    let render = pipeline
        .render(&args.frame)
        .map_err(|err| {
            print_diagnostic(&err.to_diagnostic());
            err
        })
        .with_context(|| format!("Cannot compile frame '{}'", args.frame))?;

    for diagnostic in &render.diagnostics {
        print_diagnostic(diagnostic);
    }
    info!(
        frame_id = %render.frame_id,
        nodes = render.len(),
        diagnostics = render.diagnostics.len(),
        "Compiled frame"
    );

    let output = config.to_json(&render)?;
    match &args.out {
        Some(out) => {
            let out = cwd.join(out);
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&out, output)?;
            eprintln!(
                "{} Compiled frame {} ({} nodes) → {}",
                "✓".green(),
                render.frame_id,
                render.len(),
                out.display()
            );
        }
        None => println!("{}", output),
    }
    Ok(())
}
