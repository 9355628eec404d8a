//! Dependency rule.
//!
//! Locates each graph error at the record it is attached to.

use crate::{
    core::{DependencyError, DependencyGraph, RecordStore},
    issues::{DanglingDependencyIssue, DependencyCycleIssue, Issue, SelfDependencyIssue},
};

use super::schema::record_context;

pub fn check_dependency_issues(graph: &DependencyGraph, store: &RecordStore) -> Vec<Issue> {
    graph
        .errors()
        .iter()
        .filter_map(|error| {
            let context = record_context(store.get(error.record())?);
            let issue = match error {
                DependencyError::Dangling { phase, target, .. } => {
                    Issue::DanglingDependency(DanglingDependencyIssue {
                        context,
                        phase: phase.clone(),
                        target: target.clone(),
                    })
                }
                DependencyError::SelfDependency { phase, .. } => {
                    Issue::SelfDependency(SelfDependencyIssue {
                        context,
                        phase: phase.clone(),
                    })
                }
                DependencyError::Cycle { path, .. } => {
                    Issue::DependencyCycle(DependencyCycleIssue {
                        context,
                        path: path.clone(),
                    })
                }
            };
            Some(issue)
        })
        .collect()
}
