//! Plan command - rank the cheapest assemblies of a target.

use clap::Args;
use serde::Serialize;

use crate::assembly::{Assembler, Assembly, AssemblyGraph, CleanupReport, EdgeKind, Plan};
use crate::cli::{format_cost, ConfigArgs, InputArgs, OutputFormat};
use crate::core::{ContigContainer, ContigId};
use crate::parsing::alignments::{BuiltContainer, TargetInfo};

/// Arguments for the plan command
#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Number of assemblies to report
    #[arg(short = 'n', long, default_value = "5")]
    pub top: usize,

    /// Number of best costs kept for pruning the search
    #[arg(long)]
    pub best_of: Option<usize>,

    /// How far (bp) a path may run past the target length
    #[arg(long)]
    pub span_tolerance: Option<i64>,

    /// Stop the search after this many steps
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Only report assemblies that cover the whole target
    #[arg(long)]
    pub full_cover: bool,
}

#[derive(Debug, Serialize)]
struct JunctionReport {
    left: ContigId,
    right: ContigId,
    gap: i64,
    kind: EdgeKind,
    cost: f64,
}

#[derive(Debug, Serialize)]
struct FragmentReport {
    id: ContigId,
    query_start: i64,
    query_end: i64,
    length: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject_id: Option<String>,
    subject_start: i64,
    subject_end: i64,
    strand: String,
}

#[derive(Debug, Serialize)]
struct AssemblyReport {
    rank: usize,
    path: Vec<ContigId>,
    cost: f64,
    junction_cost: f64,
    closing_gap: i64,
    closing_cost: f64,
    span: i64,
    covers_target: bool,
    fragments: Vec<FragmentReport>,
    junctions: Vec<JunctionReport>,
}

impl AssemblyReport {
    fn new(
        rank: usize,
        assembly: &Assembly,
        container: &ContigContainer,
        graph: &AssemblyGraph,
    ) -> Self {
        let fragments = assembly
            .contigs(container)
            .into_iter()
            .map(|contig| FragmentReport {
                id: contig.id(),
                query_start: contig.query().start(),
                query_end: contig.query().end(),
                length: contig.length(),
                subject_id: contig.metadata().get("subject_id").cloned(),
                subject_start: contig.subject().start(),
                subject_end: contig.subject().end(),
                strand: contig
                    .metadata()
                    .get("strand")
                    .cloned()
                    .unwrap_or_else(|| "+".to_string()),
            })
            .collect();
        let junctions = assembly
            .pairs()
            .filter_map(|(left, right)| graph.junction(left, right))
            .map(|j| JunctionReport {
                left: j.left,
                right: j.right,
                gap: j.gap,
                kind: j.kind,
                cost: j.cost,
            })
            .collect();
        Self {
            rank,
            path: assembly.path.clone(),
            cost: assembly.cost,
            junction_cost: assembly.junction_cost,
            closing_gap: assembly.closing_gap,
            closing_cost: assembly.closing_cost,
            span: assembly.span,
            covers_target: assembly.covers_target(),
            fragments,
            junctions,
        }
    }

    fn path_string(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[derive(Debug, Serialize)]
struct PlanReport {
    generated_at: String,
    target: TargetInfo,
    contigs: usize,
    skipped: usize,
    cleanup: CleanupReport,
    junctions: usize,
    steps: usize,
    pruned: usize,
    truncated: bool,
    assemblies: Vec<AssemblyReport>,
}

impl PlanReport {
    fn new(
        target: TargetInfo,
        skipped: usize,
        plan: &Plan,
        container: &ContigContainer,
        top: usize,
        full_cover: bool,
    ) -> Self {
        let assemblies = plan
            .assemblies
            .iter()
            .filter(|a| !full_cover || (a.covers_target() && a.is_feasible()))
            .take(top)
            .enumerate()
            .map(|(i, a)| AssemblyReport::new(i + 1, a, container, &plan.graph))
            .collect();
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            target,
            contigs: container.len(),
            skipped,
            cleanup: plan.cleanup,
            junctions: plan.graph.junction_count(),
            steps: plan.steps,
            pruned: plan.pruned,
            truncated: plan.truncated,
            assemblies,
        }
    }
}

/// Execute the plan command
///
/// # Errors
///
/// Returns an error if the input cannot be loaded or planning fails.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: PlanArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut config = args.config.planner_config()?;
    if let Some(best_of) = args.best_of {
        config.search.best_of = best_of;
    }
    if let Some(tolerance) = args.span_tolerance {
        config.search.span_tolerance = tolerance;
    }
    if args.max_steps.is_some() {
        config.search.max_steps = args.max_steps;
    }

    let (target_info, built) = args.input.load()?;
    let BuiltContainer {
        target,
        container,
        skipped,
    } = built;

    if verbose {
        eprintln!(
            "Target: {} ({} bp, {}), {} fragments loaded, {} skipped",
            target_info.name,
            target_info.length,
            if target_info.circular { "circular" } else { "linear" },
            container.len(),
            skipped
        );
    }

    let mut assembler = Assembler::new(target, container, config)?;
    let plan = assembler.plan()?;
    let report = PlanReport::new(
        target_info,
        skipped,
        &plan,
        assembler.container(),
        args.top,
        args.full_cover,
    );

    match format {
        OutputFormat::Text => print_text(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Tsv => print_tsv(&report),
    }

    Ok(())
}

fn print_text(report: &PlanReport) {
    let topology = if report.target.circular {
        "circular"
    } else {
        "linear"
    };
    println!(
        "Target: {} ({} bp, {topology})",
        report.target.name, report.target.length
    );
    println!(
        "Fragments: {} ({} redundant removed, {} fused, {} partitioned, {} skipped)",
        report.contigs,
        report.cleanup.redundant_removed,
        report.cleanup.fused,
        report.cleanup.partitioned,
        report.skipped
    );
    println!(
        "Junctions: {}, search steps: {} ({} pruned){}",
        report.junctions,
        report.steps,
        report.pruned,
        if report.truncated { ", stopped at step budget" } else { "" }
    );

    if report.assemblies.is_empty() {
        println!("\nNo feasible assembly found.");
        return;
    }

    for assembly in &report.assemblies {
        let cover = if assembly.covers_target {
            "full cover"
        } else {
            "partial"
        };
        println!(
            "\n#{}  cost {}  [{cover}]",
            assembly.rank,
            format_cost(assembly.cost)
        );
        println!("   path: {}", assembly.path_string());
        for fragment in &assembly.fragments {
            println!(
                "   fragment {:>4}  target {}..{} ({} bp)  {} {}..{} ({})",
                fragment.id,
                fragment.query_start,
                fragment.query_end,
                fragment.length,
                fragment.subject_id.as_deref().unwrap_or("-"),
                fragment.subject_start,
                fragment.subject_end,
                fragment.strand
            );
        }
        for junction in &assembly.junctions {
            println!(
                "   junction {} -> {}  gap {:>5}  {:<11}  cost {}",
                junction.left,
                junction.right,
                junction.gap,
                junction.kind.to_string(),
                format_cost(junction.cost)
            );
        }
        println!(
            "   closing gap {:>5}  cost {}",
            assembly.closing_gap,
            format_cost(assembly.closing_cost)
        );
    }
}

fn print_tsv(report: &PlanReport) {
    println!("rank\tcost\tjunction_cost\tclosing_gap\tclosing_cost\tspan\tcovers_target\tpath");
    for assembly in &report.assemblies {
        let path = assembly
            .path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{}\t{:.4}\t{:.4}\t{}\t{:.4}\t{}\t{}\t{}",
            assembly.rank,
            assembly.cost,
            assembly.junction_cost,
            assembly.closing_gap,
            assembly.closing_cost,
            assembly.span,
            assembly.covers_target,
            path
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::PlannerConfig;
    use crate::parsing::alignments::{build_container, AlignmentRecord};

    fn record(query: (i64, i64), subject_start: i64) -> AlignmentRecord {
        let length = if query.1 >= query.0 {
            query.1 - query.0 + 1
        } else {
            1000 - query.0 + query.1 + 1
        };
        AlignmentRecord {
            query_start: query.0,
            query_end: query.1,
            subject_id: "pSource".to_string(),
            subject_start,
            subject_end: subject_start + length - 1,
            subject_length: 5000,
            subject_circular: false,
            strand: None,
            query_sequence: None,
            subject_sequence: None,
            query_filename: None,
            subject_filename: None,
        }
    }

    fn plan_report(top: usize, full_cover: bool) -> PlanReport {
        let target = TargetInfo::new("pTarget", 1000, true);
        let records = vec![record((1, 400), 1), record((380, 700), 1001), record((680, 20), 2001)];
        let built = build_container(&target, &records).unwrap();
        let mut assembler =
            Assembler::new(built.target, built.container, PlannerConfig::default()).unwrap();
        let plan = assembler.plan().unwrap();
        PlanReport::new(target, 0, &plan, assembler.container(), top, full_cover)
    }

    #[test]
    fn test_plan_report_best_assembly() {
        let report = plan_report(3, false);
        assert_eq!(report.contigs, 3);
        assert!(report.assemblies.len() <= 3);
        let best = &report.assemblies[0];
        assert_eq!(best.rank, 1);
        assert_eq!(best.cost, 0.0);
        assert!(best.covers_target);
        assert_eq!(best.fragments.len(), 3);
        assert_eq!(best.junctions.len(), 2);
        assert!(best.junctions.iter().all(|j| j.gap < 0 && j.kind == EdgeKind::Gap));
        assert_eq!(best.fragments[0].subject_id.as_deref(), Some("pSource"));
    }

    #[test]
    fn test_plan_report_full_cover_filter() {
        let report = plan_report(100, true);
        assert!(!report.assemblies.is_empty());
        assert!(report.assemblies.iter().all(|a| a.covers_target));
        let ranks: Vec<usize> = report.assemblies.iter().map(|a| a.rank).collect();
        assert_eq!(ranks, (1..=report.assemblies.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_plan_report_serializes() {
        let report = plan_report(1, false);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["generated_at"].is_string());
        assert_eq!(json["target"]["length"], 1000);
        assert_eq!(json["assemblies"][0]["junctions"][0]["kind"], "gap");
    }
}
