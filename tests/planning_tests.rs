//! End-to-end planning tests
//!
//! These tests drive the library from alignment text through cleanup, graph
//! construction and search, and check the properties a caller relies on.

use std::collections::HashSet;

use assembly_planner::assembly::{Assembler, PlannerConfig};
use assembly_planner::core::{ContigContainer, ContigId, ContigType};
use assembly_planner::parsing::alignments::{build_container, parse_tsv_text, TargetInfo};

const TARGET_LENGTH: i64 = 1000;

fn span_length(start: i64, end: i64, target_length: i64) -> i64 {
    if end >= start {
        end - start + 1
    } else {
        target_length - start + end + 1
    }
}

/// One alignment per span, each against its own stretch of a long linear source
fn alignments_tsv(spans: &[(i64, i64)], target_length: i64) -> String {
    let mut tsv = String::from(
        "query_start\tquery_end\tsubject_id\tsubject_start\tsubject_end\tsubject_length\n",
    );
    for (i, &(start, end)) in spans.iter().enumerate() {
        let offset = i64::try_from(i).unwrap() * 2000 + 1;
        let length = span_length(start, end, target_length);
        tsv.push_str(&format!(
            "{start}\t{end}\tpSource\t{offset}\t{}\t50000\n",
            offset + length - 1
        ));
    }
    tsv
}

fn assembler(spans: &[(i64, i64)], target: &TargetInfo, config: PlannerConfig) -> Assembler {
    let set = parse_tsv_text(&alignments_tsv(spans, target.length), '\t').unwrap();
    let built = build_container(target, &set.alignments).unwrap();
    assert_eq!(built.skipped, 0);
    Assembler::new(built.target, built.container, config).unwrap()
}

fn circular_target() -> TargetInfo {
    TargetInfo::new("pTarget", TARGET_LENGTH, true)
}

const THREE_PIECES: [(i64, i64); 3] = [(1, 400), (380, 700), (680, 20)];

const MANY_PIECES: [(i64, i64); 8] = [
    (1, 400),
    (380, 700),
    (680, 20),
    (1, 250),
    (240, 520),
    (500, 800),
    (790, 1000),
    (990, 300),
];

/// Three overlapping fragments close a circular target at no junction cost
#[test]
fn test_circular_target_three_fragments() {
    let mut assembler = assembler(&THREE_PIECES, &circular_target(), PlannerConfig::default());
    let plan = assembler.plan().unwrap();

    let best = plan.best_full_cover().unwrap();
    assert_eq!(best.len(), 3);
    assert_eq!(best.cost, 0.0);
    assert!(best.covers_target());
    assert!(best.span >= TARGET_LENGTH);

    // Every junction on the best path exists in the graph with an overlap
    for (left, right) in best.pairs() {
        let junction = plan.graph.junction(left, right).unwrap();
        assert!(junction.gap < 0);
    }
}

/// Results come back cheapest first
#[test]
fn test_assemblies_sorted_by_cost() {
    let mut assembler = assembler(&MANY_PIECES, &circular_target(), PlannerConfig::default());
    let plan = assembler.plan().unwrap();

    assert!(!plan.assemblies.is_empty());
    for pair in plan.assemblies.windows(2) {
        assert!(pair[0].cost.total_cmp(&pair[1].cost).is_le());
    }
}

/// A small best-of window finds the same top costs as a window too large to prune
#[test]
fn test_pruning_keeps_top_results() {
    let mut pruned_config = PlannerConfig::default();
    pruned_config.search.best_of = 5;
    let mut full_config = PlannerConfig::default();
    full_config.search.best_of = 100_000;

    let pruned = assembler(&MANY_PIECES, &circular_target(), pruned_config)
        .plan()
        .unwrap();
    let full = assembler(&MANY_PIECES, &circular_target(), full_config)
        .plan()
        .unwrap();

    assert_eq!(full.pruned, 0);
    let top = 5.min(full.assemblies.len());
    assert!(pruned.assemblies.len() >= top);
    let pruned_costs: Vec<f64> = pruned.assemblies[..top].iter().map(|a| a.cost).collect();
    let full_costs: Vec<f64> = full.assemblies[..top].iter().map(|a| a.cost).collect();
    assert_eq!(pruned_costs, full_costs);
    assert!(pruned.steps <= full.steps);
}

/// `best_cost` is a running minimum, so it never exceeds an assembly's own cost
/// and its overall minimum is the cheapest cost found
#[test]
fn test_best_cost_is_running_minimum() {
    let mut assembler = assembler(&MANY_PIECES, &circular_target(), PlannerConfig::default());
    let plan = assembler.plan().unwrap();

    for assembly in &plan.assemblies {
        assert!(assembly.best_cost <= assembly.cost);
    }
    let lowest = plan
        .assemblies
        .iter()
        .map(|a| a.best_cost)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(lowest, plan.assemblies[0].cost);
}

/// Duplicate spans collapse onto one contig before planning
#[test]
fn test_redundant_contigs_removed() {
    let spans = [(1, 400), (1, 400), (380, 700), (680, 20)];
    let mut assembler = assembler(&spans, &circular_target(), PlannerConfig::default());
    let plan = assembler.plan().unwrap();
    assert_eq!(plan.cleanup.redundant_removed, 1);
    assert_eq!(assembler.container().len(), 3);
    assert_eq!(plan.best_full_cover().unwrap().cost, 0.0);
}

/// Partition halves get fresh ids and keep query and subject lengths equal
#[test]
fn test_circular_partition_halves() {
    let set = parse_tsv_text(&alignments_tsv(&THREE_PIECES, TARGET_LENGTH), '\t').unwrap();
    let built = build_container(&circular_target(), &set.alignments).unwrap();
    let mut container: ContigContainer = built.container;
    let original: HashSet<ContigId> = container.contig_ids().collect();

    let added = container.circular_partition(50).unwrap();
    assert!(!added.is_empty());
    assert_eq!(added.len() % 2, 0);

    let added_set: HashSet<ContigId> = added.iter().copied().collect();
    assert_eq!(added_set.len(), added.len());
    assert!(added_set.is_disjoint(&original));
    assert_eq!(container.len(), original.len() + added.len());

    for id in &added {
        let contig = container.get(*id).unwrap();
        assert_eq!(contig.contig_type(), &ContigType::CircularPartition);
        assert_eq!(contig.alignment_length().unwrap(), contig.subject().length());
    }
}

/// Copies never share an id with their source
#[test]
fn test_copies_get_new_ids() {
    let set = parse_tsv_text(&alignments_tsv(&THREE_PIECES, TARGET_LENGTH), '\t').unwrap();
    let built = build_container(&circular_target(), &set.alignments).unwrap();
    let container = built.container;

    let mut seen: HashSet<ContigId> = container.contig_ids().collect();
    for contig in &container {
        let copy = contig.copy(container.ids());
        assert_ne!(copy.id(), contig.id());
        assert!(seen.insert(copy.id()));
        assert_eq!(copy.query(), contig.query());
    }
}

/// Fragments too far apart on a linear target give no full cover, and that is
/// data rather than an error
#[test]
fn test_no_feasible_assembly_is_not_an_error() {
    let target = TargetInfo::new("linear", 5000, false);
    let mut assembler = assembler(&[(1, 1000), (4001, 5000)], &target, PlannerConfig::default());
    let plan = assembler.plan().unwrap();

    assert_eq!(plan.graph.junction_count(), 0);
    assert!(plan.best_full_cover().is_none());
    assert!(plan.assemblies.iter().all(|a| !a.is_feasible()));
}

/// Linear targets are tiled left to right without a closing junction
#[test]
fn test_linear_target() {
    let target = TargetInfo::new("linear", 1000, false);
    let mut assembler = assembler(&[(1, 520), (501, 1000)], &target, PlannerConfig::default());
    let plan = assembler.plan().unwrap();

    let best = plan.best_full_cover().unwrap();
    assert_eq!(best.len(), 2);
    assert_eq!(best.closing_gap, 0);
    assert!(best.is_feasible());
    assert_eq!(plan.graph.junction_count(), 1);
}

/// A step budget stops the search early and says so
#[test]
fn test_step_budget_truncates() {
    let mut config = PlannerConfig::default();
    config.search.max_steps = Some(3);
    let mut assembler = assembler(&MANY_PIECES, &circular_target(), config);
    let plan = assembler.plan().unwrap();
    assert!(plan.truncated);
    assert_eq!(plan.steps, 3);
    assert!(plan.assemblies.len() <= 3);
}

/// Fragments with the same target span from different sources never chain
/// into each other, so the search ends without a step budget
#[test]
fn test_same_span_fragments_terminate() {
    let target = TargetInfo::new("linear", 1000, false);
    let mut config = PlannerConfig::default();
    config.remove_redundant = false;
    let mut assembler = assembler(&[(1, 50), (1, 50)], &target, config);
    let plan = assembler.plan().unwrap();

    assert_eq!(plan.cleanup.redundant_removed, 0);
    assert_eq!(plan.graph.junction_count(), 2);
    assert!(!plan.truncated);
    assert_eq!(plan.steps, 2);
    assert!(plan.assemblies.iter().all(|a| a.len() == 1 && a.span == 50));
}
