//! Graph command - list the junctions the search can use.

use clap::Args;

use crate::assembly::{Assembler, EdgeKind, Junction};
use crate::cli::{format_cost, ConfigArgs, InputArgs, OutputFormat};
use crate::parsing::alignments::BuiltContainer;

/// Arguments for the graph command
#[derive(Args)]
pub struct GraphArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Only list junctions that cross the target origin
    #[arg(long)]
    pub closing_only: bool,
}

/// Execute the graph command
///
/// # Errors
///
/// Returns an error if the input cannot be loaded or cleanup fails.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: GraphArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.config.planner_config()?;
    let (target_info, built) = args.input.load()?;
    let BuiltContainer {
        target,
        container,
        skipped,
    } = built;

    let mut assembler = Assembler::new(target, container, config)?;
    let cleanup = assembler.cleanup()?;
    let graph = assembler.build_graph();

    if verbose {
        eprintln!(
            "Target: {} ({} bp), {} fragments after cleanup ({:?}), {} skipped",
            target_info.name,
            target_info.length,
            assembler.container().len(),
            cleanup,
            skipped
        );
    }

    let junctions: Vec<&Junction> = graph
        .junctions()
        .into_iter()
        .filter(|j| !args.closing_only || j.kind == EdgeKind::ClosingGap)
        .collect();

    match format {
        OutputFormat::Text => {
            println!(
                "{} fragments, {} junctions",
                assembler.container().len(),
                junctions.len()
            );
            for j in &junctions {
                println!(
                    "  {:>4} -> {:<4}  gap {:>5}  {:<11}  cost {}",
                    j.left,
                    j.right,
                    j.gap,
                    j.kind.to_string(),
                    format_cost(j.cost)
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "target": target_info,
                "fragments": assembler.container().len(),
                "skipped": skipped,
                "cleanup": cleanup,
                "junctions": junctions,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("left\tright\tgap\tkind\tcost");
            for j in &junctions {
                println!("{}\t{}\t{}\t{}\t{:.4}", j.left, j.right, j.gap, j.kind, j.cost);
            }
        }
    }

    Ok(())
}
