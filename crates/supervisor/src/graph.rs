// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! Dependency resolver (§4.6): turns each child's symbolic `before`/`after`
//! names into numeric preconditions on both sides, and (design note #5, a
//! deliberate divergence from the reference behaviour) rejects a manifest
//! whose preconditions form a cycle rather than letting it deadlock at
//! runtime with every member stuck `Blocked` forever.

use std::collections::HashMap;

use initd_core::{ChildId, ChildSpec, Precondition, RequiredState};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;

use crate::error::SupervisorError;

/// Resolve every spec's `before`/`after` entries into a numeric
/// precondition list, indexed the same as `specs`.
///
/// `before x` adds a precondition on `x` waiting for this child; `after x`
/// adds a precondition on this child waiting for `x`. In both cases the
/// required state is `Done` if the depended-upon child is one-shot,
/// `Running` otherwise (§3).
pub fn resolve_preconditions(
    specs: &[ChildSpec],
) -> Result<Vec<Vec<Precondition>>, SupervisorError> {
    let index_of: HashMap<&str, ChildId> =
        specs.iter().enumerate().map(|(i, spec)| (spec.name.as_str(), ChildId::new(i))).collect();

    // A reference to a name outside the manifest is not setup-fatal (§3
    // invariant 5, §7 "dependency defects"): it is logged and resolved to
    // this sentinel id instead, which no child ever occupies, so the
    // precondition it produces is permanently unsatisfied and the
    // declaring child never leaves `Blocked`.
    let dangling = ChildId::new(specs.len());

    let mut preconditions: Vec<Vec<Precondition>> = vec![Vec::new(); specs.len()];

    for (i, spec) in specs.iter().enumerate() {
        let this_id = ChildId::new(i);

        for after_name in &spec.after {
            let (other_id, required) = match index_of.get(after_name.as_str()) {
                Some(&id) => (id, RequiredState::for_kind(specs[id.index()].kind)),
                None => {
                    tracing::warn!(
                        program = %spec.name,
                        dependency = %after_name,
                        "after: references unknown program; will stay blocked"
                    );
                    // The required state is irrelevant: `dangling` never
                    // matches a real child, so this is never satisfied.
                    (dangling, RequiredState::Running)
                }
            };
            push_unique(&mut preconditions[i], Precondition::new(other_id, required));
        }

        for before_name in &spec.before {
            let other_id = match index_of.get(before_name.as_str()) {
                Some(&id) => id,
                None => {
                    tracing::warn!(
                        program = %spec.name,
                        dependency = %before_name,
                        "before: references unknown program; ignored"
                    );
                    continue;
                }
            };
            let required = RequiredState::for_kind(spec.kind);
            push_unique(&mut preconditions[other_id.index()], Precondition::new(this_id, required));
        }
    }

    detect_cycle(specs, &preconditions)?;

    Ok(preconditions)
}

fn push_unique(list: &mut Vec<Precondition>, precondition: Precondition) {
    if !list.iter().any(|p| p.other == precondition.other) {
        list.push(precondition);
    }
}

fn detect_cycle(
    specs: &[ChildSpec],
    preconditions: &[Vec<Precondition>],
) -> Result<(), SupervisorError> {
    let mut graph = DiGraph::<(), ()>::new();
    let nodes: Vec<_> = (0..specs.len()).map(|_| graph.add_node(())).collect();

    for (i, list) in preconditions.iter().enumerate() {
        for precondition in list {
            // A dangling precondition (unknown-name reference) has no
            // node of its own and can never be part of a real cycle.
            if precondition.other.index() >= specs.len() {
                continue;
            }
            // Edge: dependency must resolve before the dependent child can.
            graph.add_edge(nodes[precondition.other.index()], nodes[i], ());
        }
    }

    if toposort(&graph, None).is_err() {
        let names: Vec<String> = specs.iter().map(|spec| spec.name.clone()).collect();
        return Err(SupervisorError::DependencyCycle(names));
    }
    Ok(())
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
