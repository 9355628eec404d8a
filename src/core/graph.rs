//! Phase dependency graph.
//!
//! Nodes are phase names, edges run from a phase to each phase it depends on.
//! Built once the record store is complete, since a dependency may be
//! declared in a file processed long before the phase it names.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use super::{
    store::RecordStore,
    vocabulary::{Complexity, Status},
};

/// Status key used when a record has no `AI_STATUS`.
pub const UNSPECIFIED: &str = "UNSPECIFIED";

/// A graph-level finding, attached to a record by its store index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    Dangling {
        record: usize,
        phase: String,
        target: String,
    },
    SelfDependency {
        record: usize,
        phase: String,
    },
    /// `path` starts at its smallest phase; the edge back to it is implied.
    Cycle { record: usize, path: Vec<String> },
}

impl DependencyError {
    pub fn record(&self) -> usize {
        match self {
            DependencyError::Dangling { record, .. }
            | DependencyError::SelfDependency { record, .. }
            | DependencyError::Cycle { record, .. } => *record,
        }
    }
}

/// Everything known about one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseNode {
    pub name: String,
    /// Store indices of the records declaring this phase. Empty for phases
    /// that are only ever named as a dependency.
    pub records: Vec<usize>,
    /// Outgoing edges, self-loops excluded.
    pub dependencies: BTreeSet<String>,
    pub status_mix: BTreeMap<String, usize>,
    pub complexities: BTreeSet<Complexity>,
    /// Union of `AI_COMMIT` and `AI_COMMIT_HISTORY` across the phase.
    pub commits: BTreeSet<String>,
    pub production_ready: bool,
    pub high_risk: bool,
    pub blocked: bool,
}

impl PhaseNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            records: Vec::new(),
            dependencies: BTreeSet::new(),
            status_mix: BTreeMap::new(),
            complexities: BTreeSet::new(),
            commits: BTreeSet::new(),
            production_ready: false,
            high_risk: false,
            blocked: false,
        }
    }

    pub fn is_defined(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn at_risk(&self) -> bool {
        self.high_risk && !self.production_ready
    }

    pub fn has_status(&self, status: Status) -> bool {
        self.status_mix.contains_key(status.as_str())
    }

    /// Most frequent valid status; ties go to the earlier status in
    /// [`Status::ALL`].
    pub fn predominant_status(&self) -> Option<Status> {
        Status::ALL
            .into_iter()
            .filter_map(|status| {
                self.status_mix
                    .get(status.as_str())
                    .map(|&count| (status, count))
            })
            .max_by(|(a, a_count), (b, b_count)| a_count.cmp(b_count).then(b.cmp(a)))
            .map(|(status, _)| status)
    }
}

#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, PhaseNode>,
    errors: Vec<DependencyError>,
}

impl DependencyGraph {
    pub fn build(store: &RecordStore) -> Self {
        let mut nodes: BTreeMap<String, PhaseNode> = BTreeMap::new();
        let mut errors = Vec::new();

        for (phase, indices) in store.phases() {
            let mut node = PhaseNode::new(phase);
            node.records = indices.to_vec();
            node.production_ready = true;

            for &index in indices {
                let Some(validated) = store.get(index) else {
                    continue;
                };
                let record = validated.record();

                let status = record
                    .status
                    .as_ref()
                    .map_or_else(|| UNSPECIFIED.to_string(), ToString::to_string);
                *node.status_mix.entry(status).or_default() += 1;

                if let Some(complexity) = record.valid_complexity() {
                    node.complexities.insert(complexity);
                }
                node.commits.extend(record.commit.iter().cloned());
                node.commits.extend(record.commit_history.iter().cloned());

                node.production_ready &= record.is_production_ready();
                node.high_risk |= record.is_high_risk();

                for target in &record.dependencies {
                    if target == phase {
                        errors.push(DependencyError::SelfDependency {
                            record: index,
                            phase: phase.to_string(),
                        });
                        continue;
                    }
                    if !store.has_phase(target) {
                        errors.push(DependencyError::Dangling {
                            record: index,
                            phase: phase.to_string(),
                            target: target.clone(),
                        });
                    }
                    node.dependencies.insert(target.clone());
                }
            }

            nodes.insert(phase.to_string(), node);
        }

        // Undefined targets still become nodes so chains through them show up.
        let undefined: BTreeSet<String> = nodes
            .values()
            .flat_map(|node| node.dependencies.iter())
            .filter(|target| !nodes.contains_key(*target))
            .cloned()
            .collect();
        for target in undefined {
            nodes.insert(target.clone(), PhaseNode::new(&target));
        }

        let blocked: Vec<String> = nodes
            .values()
            .filter(|node| {
                node.dependencies
                    .iter()
                    .any(|dep| nodes.get(dep).is_none_or(blocks_dependents))
            })
            .map(|node| node.name.clone())
            .collect();
        for name in blocked {
            if let Some(node) = nodes.get_mut(&name) {
                node.blocked = true;
            }
        }

        for path in find_cycles(&nodes) {
            let record = path
                .first()
                .and_then(|phase| nodes.get(phase))
                .and_then(|node| node.records.first().copied());
            if let Some(record) = record {
                errors.push(DependencyError::Cycle { record, path });
            }
        }

        debug!(
            phases = nodes.len(),
            edges = nodes.values().map(|n| n.dependencies.len()).sum::<usize>(),
            errors = errors.len(),
            "built dependency graph"
        );

        Self { nodes, errors }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PhaseNode> {
        self.nodes.values()
    }

    pub fn node(&self, phase: &str) -> Option<&PhaseNode> {
        self.nodes.get(phase)
    }

    pub fn errors(&self) -> &[DependencyError] {
        &self.errors
    }

    /// `(phase, dependency)` pairs in name order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes.values().flat_map(|node| {
            node.dependencies
                .iter()
                .map(move |dep| (node.name.as_str(), dep.as_str()))
        })
    }
}

/// An unresolved dependency: undefined, or still not started and not ready.
fn blocks_dependents(dep: &PhaseNode) -> bool {
    !dep.is_defined() || (!dep.production_ready && dep.has_status(Status::NotStarted))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    InProgress,
    Done,
}

/// Iterative three-color DFS. Every back edge yields a cycle; each distinct
/// cycle is returned once, rotated to start at its smallest phase.
fn find_cycles(nodes: &BTreeMap<String, PhaseNode>) -> Vec<Vec<String>> {
    let adjacency: BTreeMap<&str, Vec<&str>> = nodes
        .values()
        .map(|node| {
            let targets = node.dependencies.iter().map(String::as_str).collect();
            (node.name.as_str(), targets)
        })
        .collect();

    let mut color: HashMap<&str, Color> = HashMap::new();
    let mut seen: BTreeSet<Vec<String>> = BTreeSet::new();
    let mut cycles = Vec::new();

    for &start in adjacency.keys() {
        if color.contains_key(start) {
            continue;
        }

        color.insert(start, Color::InProgress);
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];

        while let Some(&(node, next)) = stack.last() {
            let neighbors = adjacency.get(node).map(Vec::as_slice).unwrap_or_default();

            let Some(&target) = neighbors.get(next) else {
                color.insert(node, Color::Done);
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match color.get(target) {
                None => {
                    color.insert(target, Color::InProgress);
                    stack.push((target, 0));
                }
                Some(Color::InProgress) => {
                    if let Some(from) = stack.iter().position(|&(n, _)| n == target) {
                        let path: Vec<&str> = stack[from..].iter().map(|&(n, _)| n).collect();
                        let path = canonical_rotation(&path);
                        if seen.insert(path.clone()) {
                            cycles.push(path);
                        }
                    }
                }
                Some(Color::Done) => {}
            }
        }
    }

    cycles
}

fn canonical_rotation(cycle: &[&str]) -> Vec<String> {
    let start = cycle
        .iter()
        .enumerate()
        .min_by_key(|&(_, phase)| *phase)
        .map_or(0, |(i, _)| i);

    cycle[start..]
        .iter()
        .chain(&cycle[..start])
        .map(|phase| phase.to_string())
        .collect()
}
