//! Recognise ladders that already are a Pi or Double-Pi.
//!
//! Zero-valued resistors are shorts: their terminals merge into one
//! supernode. A ladder matches an `n`-stage model when exactly `n` non-zero
//! resistors remain and they join `n + 1` supernodes into a simple path. The
//! model capacitors are the per-supernode capacitance sums along that path.
//!
//! Without node names only a positional approximation is possible, see
//! [`detect_positional`].

use std::collections::BTreeMap;

use log::{debug, trace};
use petgraph::unionfind::UnionFind;
use rcred_netlist::{Component, Ladder, NodeGraph, is_ground};

use crate::model::{ModelKind, Provenance, ReducedModel};

/// Resistors with `|R|` below this are treated as shorts.
pub const SHORT_TOLERANCE: f64 = 1e-12;

/// Try the topology-aware detector when a node graph is available, the
/// positional one otherwise.
pub fn detect_exact(
    ladder: &Ladder,
    graph: Option<&NodeGraph>,
    kind: ModelKind,
) -> Option<ReducedModel> {
    match graph {
        Some(graph) => detect_topological(ladder, graph, kind),
        None => detect_positional(ladder, kind),
    }
}

/// Structural match over the node graph.
pub fn detect_topological(
    ladder: &Ladder,
    graph: &NodeGraph,
    kind: ModelKind,
) -> Option<ReducedModel> {
    let components = ladder.components();
    let mut shorts = UnionFind::<usize>::new(graph.node_count());
    let mut series = Vec::new();
    for (i, component) in components.iter().enumerate() {
        if !component.is_resistor() {
            continue;
        }
        let (a, b) = terminals(component)?;
        if component.value.abs() >= SHORT_TOLERANCE {
            series.push(i);
        } else if !is_ground(a) && !is_ground(b) {
            shorts.union(graph.position(a)?, graph.position(b)?);
        }
    }

    if series.len() != kind.stages() {
        debug!(
            "No exact {kind}: {} non-zero resistor(s), need {}",
            series.len(),
            kind.stages()
        );
        return None;
    }

    let supernode = |node: &str| graph.position(node).map(|p| shorts.find(p));

    // Capacitance per supernode.
    let mut caps: BTreeMap<usize, f64> = BTreeMap::new();
    for component in components.iter().filter(|c| c.is_capacitor()) {
        let (a, b) = terminals(component)?;
        match (is_ground(a), is_ground(b)) {
            (true, true) => {}
            (false, true) => *caps.entry(supernode(a)?).or_default() += component.value,
            (true, false) => *caps.entry(supernode(b)?).or_default() += component.value,
            (false, false) if supernode(a)? == supernode(b)? => {}
            (false, false) => {
                debug!("No exact {kind}: {} is not grounded", component.name);
                return None;
            }
        }
    }

    // Supernode adjacency through the series resistors.
    let mut edges = Vec::with_capacity(series.len());
    for &i in &series {
        let (a, b) = terminals(&components[i])?;
        if is_ground(a) || is_ground(b) {
            debug!("No exact {kind}: {} is tied to ground", components[i].name);
            return None;
        }
        let (sa, sb) = (supernode(a)?, supernode(b)?);
        if sa == sb {
            debug!("No exact {kind}: {} is shorted out", components[i].name);
            return None;
        }
        edges.push((sa, sb, components[i].value));
    }
    trace!("Supernode capacitance: {caps:?}");
    trace!("Supernode edges: {edges:?}");

    let entry = ladder.entry_node().and_then(supernode);
    let Some((path, resistors)) = walk_path(&edges, entry) else {
        debug!("No exact {kind}: supernodes do not form a simple path");
        return None;
    };
    if entry.is_some_and(|e| path.contains(&e) && path[0] != e) {
        debug!(
            "No exact {kind}: driving point {} is inside the path",
            ladder.entry_node().unwrap_or_default()
        );
        return None;
    }

    if caps.keys().any(|s| !path.contains(s)) {
        debug!("No exact {kind}: capacitance off the resistor path");
        return None;
    }

    let capacitors: Vec<f64> = path
        .iter()
        .map(|s| caps.get(s).copied().unwrap_or(0.0))
        .collect();
    build_exact(kind, &resistors, &capacitors)
}

fn terminals(component: &Component) -> Option<(&str, &str)> {
    let (a, b) = component.nodes.as_ref()?;
    Some((a.as_str(), b.as_str()))
}

/// Positional approximation for value arrays without node names.
///
/// Needs exactly `n` non-zero resistors and at least `n + 1` capacitors. The
/// capacitors, in ladder order, are cut into `n + 1` contiguous groups of
/// near-equal size with the remainder going to the earliest groups. This is
/// not a structural proof: it misclassifies when capacitor placement does not
/// follow index position.
pub fn detect_positional(ladder: &Ladder, kind: ModelKind) -> Option<ReducedModel> {
    let resistors: Vec<f64> = ladder
        .resistances()
        .filter(|r| r.abs() >= SHORT_TOLERANCE)
        .collect();
    if resistors.len() != kind.stages() {
        debug!(
            "No positional {kind}: {} non-zero resistor(s), need {}",
            resistors.len(),
            kind.stages()
        );
        return None;
    }

    let caps: Vec<f64> = ladder.capacitances().collect();
    let groups = kind.stages() + 1;
    if caps.len() < groups {
        debug!("No positional {kind}: only {} capacitor(s)", caps.len());
        return None;
    }

    let mut capacitors = Vec::with_capacity(groups);
    let mut start = 0;
    for size in section_sizes(caps.len(), groups) {
        capacitors.push(caps[start..start + size].iter().sum());
        start += size;
    }
    build_exact(kind, &resistors, &capacitors)
}

/// Split `count` items into `groups` contiguous sections, earliest sections
/// taking one extra item each until the remainder is used up.
fn section_sizes(count: usize, groups: usize) -> Vec<usize> {
    let base = count / groups;
    let remainder = count % groups;
    (0..groups)
        .map(|g| base + usize::from(g < remainder))
        .collect()
}

/// Order the supernodes of a simple path and the resistors along it.
///
/// Starts from `entry` when it is an end of the path, otherwise from the end
/// touched first in ladder order. Callers reject an `entry` inside the path.
fn walk_path(
    edges: &[(usize, usize, f64)],
    entry: Option<usize>,
) -> Option<(Vec<usize>, Vec<f64>)> {
    let mut degree: BTreeMap<usize, usize> = BTreeMap::new();
    for &(a, b, _) in edges {
        *degree.entry(a).or_default() += 1;
        *degree.entry(b).or_default() += 1;
    }
    if degree.len() != edges.len() + 1 || degree.values().any(|&d| d > 2) {
        return None;
    }

    let ends: Vec<usize> = edges
        .iter()
        .flat_map(|&(a, b, _)| [a, b])
        .filter(|s| degree[s] == 1)
        .collect();
    if ends.len() != 2 {
        return None;
    }
    let start = match entry {
        Some(e) if ends.contains(&e) => e,
        _ => ends[0],
    };

    let mut path = vec![start];
    let mut resistors = Vec::with_capacity(edges.len());
    let mut used = vec![false; edges.len()];
    let mut current = start;
    while resistors.len() < edges.len() {
        let (i, &(a, b, r)) = edges
            .iter()
            .enumerate()
            .find(|(i, (a, b, _))| !used[*i] && (*a == current || *b == current))?;
        used[i] = true;
        current = if a == current { b } else { a };
        path.push(current);
        resistors.push(r);
    }
    Some((path, resistors))
}

fn build_exact(kind: ModelKind, resistors: &[f64], capacitors: &[f64]) -> Option<ReducedModel> {
    if resistors
        .iter()
        .chain(capacitors)
        .any(|v| !v.is_finite() || *v <= 0.0)
    {
        debug!("No exact {kind}: non-positive element in {resistors:?} {capacitors:?}");
        return None;
    }

    let provenance = Provenance::Exact;
    match (kind, resistors, capacitors) {
        (ModelKind::Pi, &[r1], &[c1, c2]) => Some(ReducedModel::Pi {
            r1,
            c1,
            c2,
            provenance,
        }),
        (ModelKind::DoublePi, &[r1, r2], &[c1, c2, c3]) => Some(ReducedModel::DoublePi {
            r1,
            r2,
            c1,
            c2,
            c3,
            provenance,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcred_netlist::parse;

    fn rel_close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
    }

    fn values(model: &ReducedModel) -> Vec<f64> {
        model
            .resistors()
            .into_iter()
            .chain(model.capacitors())
            .collect()
    }

    #[test]
    fn test_section_sizes() {
        assert_eq!(section_sizes(6, 3), vec![2, 2, 2]);
        assert_eq!(section_sizes(7, 3), vec![3, 2, 2]);
        assert_eq!(section_sizes(8, 3), vec![3, 3, 2]);
        assert_eq!(section_sizes(3, 3), vec![1, 1, 1]);
        assert_eq!(section_sizes(5, 2), vec![3, 2]);
    }

    #[test]
    fn test_three_series_resistors_never_match() {
        let ladder = Ladder::from_values(&[10.0, 20.0, 30.0], &[1e-12, 2e-12, 3e-12, 4e-12]);
        assert!(detect_positional(&ladder, ModelKind::DoublePi).is_none());

        let netlist = parse(
            "C1 n0 0 1p\nR1 n0 n1 10\nC2 n1 0 2p\nR2 n1 n2 20\nC3 n2 0 3p\nR3 n2 n3 30\nC4 n3 0 4p\n",
        );
        let graph = netlist.graph.as_ref().unwrap();
        assert!(detect_topological(&netlist.ladder, graph, ModelKind::DoublePi).is_none());
    }

    #[test]
    fn test_shorted_groups_reproduce_double_pi() {
        // Three node groups joined by zero-ohm shorts, two real resistors.
        let (r1, r2) = (37.5, 112.25);
        let (c1, c2, c3) = (1.25e-13, 4.5e-13, 2.75e-13);
        let text = format!(
            "\
C1a a1 0 {a}
R0a a1 a2 0
C1b a2 0 {b}
R1 a2 b1 {r1}
C2a b1 0 {c}
R0b b1 b2 0
C2b b2 0 {d}
R0c b2 b3 0
R2 b3 c1 {r2}
C3a c1 0 {e}
R0d c1 c2 0
C3b c2 0 {f}
",
            a = c1 * 0.4,
            b = c1 * 0.6,
            c = c2 * 0.5,
            d = c2 * 0.5,
            e = c3 * 0.25,
            f = c3 * 0.75,
        );
        let netlist = parse(&text);
        let graph = netlist.graph.as_ref().unwrap();
        let model = detect_topological(&netlist.ladder, graph, ModelKind::DoublePi).unwrap();
        assert!(model.is_exact());
        for (got, want) in values(&model).iter().zip([r1, r2, c1, c2, c3]) {
            assert!(rel_close(*got, want), "{got} != {want}");
        }
    }

    #[test]
    fn test_orientation_follows_entry_node() {
        // Records listed far end first, but the first record sits on `near`.
        let netlist =
            parse("C1 near 0 1p\nR2 mid far 20\nC3 far 0 3p\nR1 near mid 10\nC2 mid 0 2p\n");
        let graph = netlist.graph.as_ref().unwrap();
        let model = detect_topological(&netlist.ladder, graph, ModelKind::DoublePi).unwrap();
        assert_eq!(model.resistors(), vec![10.0, 20.0]);
        for (got, want) in model.capacitors().iter().zip([1e-12, 2e-12, 3e-12]) {
            assert!(rel_close(*got, want), "{got} != {want}");
        }
    }

    #[test]
    fn test_driving_point_inside_path_is_rejected() {
        // a-hub-b is a simple path, but the ladder is driven from `hub`.
        let netlist =
            parse("C1 hub 0 1p\nR1 hub a 10\nR2 hub b 10\nC2 a 0 1p\nC3 b 0 1p\n");
        let graph = netlist.graph.as_ref().unwrap();
        assert!(detect_topological(&netlist.ladder, graph, ModelKind::DoublePi).is_none());

        // Same network driven from an end of the path.
        let netlist =
            parse("C2 a 0 1p\nR1 hub a 10\nC1 hub 0 1p\nR2 hub b 10\nC3 b 0 1p\n");
        let graph = netlist.graph.as_ref().unwrap();
        let model = detect_topological(&netlist.ladder, graph, ModelKind::DoublePi).unwrap();
        assert_eq!(model.resistors(), vec![10.0, 10.0]);
    }

    #[test]
    fn test_parallel_resistors_are_rejected() {
        let netlist = parse("C1 a 0 1p\nR1 a b 10\nR2 a b 20\nC2 b 0 1p\n");
        let graph = netlist.graph.as_ref().unwrap();
        assert!(detect_topological(&netlist.ladder, graph, ModelKind::DoublePi).is_none());
    }

    #[test]
    fn test_missing_capacitance_is_rejected() {
        let netlist = parse("C1 a 0 1p\nR1 a b 10\nR2 b c 20\nC3 c 0 1p\n");
        let graph = netlist.graph.as_ref().unwrap();
        assert!(detect_topological(&netlist.ladder, graph, ModelKind::DoublePi).is_none());
    }

    #[test]
    fn test_floating_capacitor_is_rejected() {
        let netlist = parse("C1 a 0 1p\nR1 a b 10\nC2 b 0 1p\nCx a b 1p\n");
        let graph = netlist.graph.as_ref().unwrap();
        assert!(detect_topological(&netlist.ladder, graph, ModelKind::Pi).is_none());
    }

    #[test]
    fn test_exact_pi() {
        let netlist = parse("C1 a 0 1p\nR0 a a2 0\nC2 a2 0 1p\nR1 a2 b 50\nC3 b 0 4p\n");
        let graph = netlist.graph.as_ref().unwrap();
        let model = detect_topological(&netlist.ladder, graph, ModelKind::Pi).unwrap();
        assert_eq!(model.resistors(), vec![50.0]);
        assert!(rel_close(model.capacitors()[0], 2e-12));
        assert!(rel_close(model.capacitors()[1], 4e-12));
    }

    #[test]
    fn test_positional_sections() {
        let ladder = Ladder::from_values(
            &[0.0, 15.0, 0.0, 25.0, 0.0],
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
        );
        let model = detect_positional(&ladder, ModelKind::DoublePi).unwrap();
        assert_eq!(model.resistors(), vec![15.0, 25.0]);
        assert_eq!(model.capacitors(), vec![6.0, 9.0, 13.0]);
    }

    #[test]
    fn test_positional_needs_enough_capacitors() {
        let ladder = Ladder::from_values(&[15.0, 25.0], &[1.0, 2.0]);
        assert!(detect_positional(&ladder, ModelKind::DoublePi).is_none());
    }

    #[test]
    fn test_positional_rejects_zero_section() {
        let ladder = Ladder::from_values(&[15.0, 25.0], &[1.0, 0.0, 2.0]);
        assert!(detect_positional(&ladder, ModelKind::DoublePi).is_none());
    }
}
