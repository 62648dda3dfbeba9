use crate::commands::{print_diagnostic, read_document};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use vellum_editor::{check_document, subtree_ids};
use vellum_model::{EditorDocument, NodeType};

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Document JSON to inspect
    pub document: PathBuf,
}

pub fn inspect(args: InspectArgs) -> Result<()> {
    let document = read_document(&args.document)?;

    println!("{} {}", "Document".bold(), document.id);
    println!("   Nodes:      {}", document.nodes.len());
    println!("   Frames:     {}", document.frames.len());
    println!("   Components: {}", document.components.len());

    if !document.frames.is_empty() {
        println!();
        println!("{}", "Frames".bold());
        for frame in document.frames.values() {
            let placement = frame.placement;
            println!(
                "   {} {} root={} nodes={} at ({}, {}) {}×{}",
                "▸".cyan(),
                frame.id,
                frame.root_node_id,
                subtree_ids(&document, &frame.root_node_id).len(),
                placement.x,
                placement.y,
                placement.width,
                placement.height
            );
        }
    }

    if !document.components.is_empty() {
        println!();
        println!("{}", "Components".bold());
        for component in document.components.values() {
            println!(
                "   {} {} root={} params={} instances={}",
                "▸".cyan(),
                component.id,
                component.root_node_id,
                component.params.len(),
                document.instances_of(&component.id).count()
            );
        }
    }

    println!();
    println!("{}", "Node types".bold());
    for (node_type, count) in type_counts(&document) {
        println!("   {:<10} {}", node_type.as_str(), count);
    }

    let diagnostics = check_document(&document);
    println!();
    if diagnostics.is_empty() {
        println!("{} No structural problems", "✓".green());
        return Ok(());
    }
    for diagnostic in &diagnostics {
        print_diagnostic(diagnostic);
    }
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    if errors > 0 {
        return Err(anyhow!("{} structural errors", errors));
    }
    Ok(())
}

fn type_counts(document: &EditorDocument) -> Vec<(NodeType, usize)> {
    let mut counts: Vec<(NodeType, usize)> = Vec::new();
    for node in document.nodes.values() {
        let node_type = node.node_type();
        match counts.iter_mut().find(|(seen, _)| *seen == node_type) {
            Some((_, count)) => *count += 1,
            None => counts.push((node_type, 1)),
        }
    }
    counts.sort_by_key(|(node_type, _)| node_type.as_str());
    counts
}
