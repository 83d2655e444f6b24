// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Inference of station configurations.

A table only contains the baselines (or closure triangles) that were actually
measured, which is usually a subset of all of the baselines that the active
stations could form. Here, stations are treated as nodes of a graph whose
relations are the observed (name-sorted) tuples. The graph is first "grown" so
that the stations related to a station all relate to each other (recording the
tuples this implies but that were never observed), then "clustered" so that
every observed tuple is assigned the full set of stations it was measured with.

Both passes repeatedly pick a node from an ordering of nodes by relation count,
then station identifier. This ordering is total and is recomputed after every
mutation, which makes the results independent of the order of the input tuples.
 */

mod error;

pub use error::ConfigurationError;

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
};

use indexmap::IndexSet;
use itertools::Itertools;
use log::{debug, trace};
use vec1::Vec1;

use crate::{
    constants::MAX_ARITY,
    math::{binomial, Combinations},
    station::{StaIndex, StationId, StationNames, StationOrder},
};

/// The station configurations of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationConfigurations {
    /// The configuration index of each distinct raw tuple, indexed by tuple
    /// identifier.
    assignments: Vec<usize>,

    /// The distinct configurations, in the order they were found. The stations
    /// in each configuration are in [`StationOrder`].
    configurations: Vec1<StaIndex>,

    /// Tuples implied by a configuration but never observed.
    missing: Vec<StaIndex>,
}

impl StationConfigurations {
    /// The configuration assigned to a raw tuple.
    pub fn configuration(&self, i_tuple: usize) -> Option<&StaIndex> {
        self.assignments
            .get(i_tuple)
            .map(|&i_config| &self.configurations[i_config])
    }

    /// The index into [`StationConfigurations::configurations`] of the
    /// configuration assigned to a raw tuple.
    pub fn configuration_index(&self, i_tuple: usize) -> Option<usize> {
        self.assignments.get(i_tuple).copied()
    }

    pub fn configurations(&self) -> &Vec1<StaIndex> {
        &self.configurations
    }

    /// The name-sorted tuples that are implied by the configurations but
    /// weren't observed. This is only diagnostic information.
    pub fn missing(&self) -> &[StaIndex] {
        &self.missing
    }

    /// The number of raw tuples with an assigned configuration.
    pub fn num_tuples(&self) -> usize {
        self.assignments.len()
    }
}

/// A station in the relation graph.
#[derive(Debug)]
struct StationNode {
    id: StationId,

    /// The name-sorted tuples this station takes part in.
    relations: BTreeSet<StaIndex>,

    /// Has this node been grown?
    marked: bool,
}

impl StationNode {
    fn new(id: StationId) -> StationNode {
        StationNode {
            id,
            relations: BTreeSet::new(),
            marked: false,
        }
    }

    fn count(&self) -> usize {
        self.relations.len()
    }

    /// The union of all stations in this node's relations.
    fn candidate(&self, order: StationOrder) -> StaIndex {
        let mut ids: Vec<StationId> = self
            .relations
            .iter()
            .flat_map(|r| r.ids().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        order.sort(&mut ids);
        StaIndex::new(ids)
    }
}

/// Nodes are ordered by their relation count, then their station identifier.
fn node_cmp(a: &StationNode, b: &StationNode) -> Ordering {
    a.count().cmp(&b.count()).then_with(|| a.id.cmp(&b.id))
}

/// Get the indices of `nodes` in ascending [`node_cmp`] order.
fn sort_nodes(nodes: &[StationNode]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| node_cmp(&nodes[a], &nodes[b]));
    order
}

/// Get every `arity`-subset of `candidate`. Because the candidate's stations
/// are in [`StationOrder`], so are the stations of each subset.
fn subsets(candidate: &StaIndex, arity: usize, combinations: &mut Combinations) -> Vec<StaIndex> {
    let ids = candidate.ids();
    let mut out = Vec::with_capacity(binomial(ids.len(), arity));
    out.extend(
        combinations
            .get(ids.len(), arity)
            .iter()
            .map(|subset| StaIndex::new(subset.iter().map(|&i| ids[i]).collect())),
    );
    out
}

/// Check that the raw tuples can be used for inference, returning their arity.
fn validate(tuples: &[StaIndex]) -> Result<usize, ConfigurationError> {
    let first = tuples.first().ok_or(ConfigurationError::NoTuples)?;
    let arity = first.arity();
    for tuple in tuples {
        if tuple.arity() == 0 || tuple.arity() > MAX_ARITY {
            return Err(ConfigurationError::InvalidArity {
                tuple: tuple.to_string(),
                arity: tuple.arity(),
            });
        }
        if let Some(id) = tuple.repeated_station() {
            return Err(ConfigurationError::DuplicateStation {
                tuple: tuple.to_string(),
                id,
            });
        }
        if tuple.arity() != arity {
            return Err(ConfigurationError::ArityMismatch {
                tuple: tuple.to_string(),
                expected: arity,
                got: tuple.arity(),
            });
        }
    }
    Ok(arity)
}

/// Infer the station configuration of each of the distinct raw tuples of a
/// table.
///
/// `tuples` are the distinct station-index tuples as they appear in the table
/// (not sorted); the returned configurations are indexed by position in
/// `tuples`. All tuples must have the same arity (1, 2 or 3).
pub fn infer_configurations(
    tuples: &[StaIndex],
    names: &StationNames,
    combinations: &mut Combinations,
) -> Result<StationConfigurations, ConfigurationError> {
    let arity = validate(tuples)?;
    let order = StationOrder::new(names);

    // Single stations: everything was observed together.
    if arity == 1 {
        let mut ids: Vec<StationId> = tuples
            .iter()
            .flat_map(|t| t.ids().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        order.sort(&mut ids);
        let configuration = StaIndex::new(ids);
        debug!("Single-station configuration: {}", names.label(&configuration));
        return Ok(StationConfigurations {
            assignments: vec![0; tuples.len()],
            configurations: Vec1::new(configuration),
            missing: vec![],
        });
    }

    // Several raw tuples (e.g. [1, 2] and [2, 1]) can share a sorted key.
    let mut sorted_to_raw: BTreeMap<StaIndex, Vec<usize>> = BTreeMap::new();
    for (i_tuple, tuple) in tuples.iter().enumerate() {
        sorted_to_raw
            .entry(order.sorted(tuple))
            .or_default()
            .push(i_tuple);
    }

    if sorted_to_raw.len() == 1 {
        let configuration = sorted_to_raw
            .into_keys()
            .next()
            .ok_or(ConfigurationError::NoTuples)?;
        debug!("Only one station configuration: {}", names.label(&configuration));
        return Ok(StationConfigurations {
            assignments: vec![0; tuples.len()],
            configurations: Vec1::new(configuration),
            missing: vec![],
        });
    }

    // Build the graph.
    let station_ids: BTreeSet<StationId> = sorted_to_raw
        .keys()
        .flat_map(|key| key.ids().iter().copied())
        .collect();
    let mut nodes: Vec<StationNode> = station_ids.iter().map(|&id| StationNode::new(id)).collect();
    let node_indices: HashMap<StationId, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i_node, node)| (node.id, i_node))
        .collect();
    for key in sorted_to_raw.keys() {
        for id in key.ids() {
            nodes[node_indices[id]].relations.insert(key.clone());
        }
    }
    trace!(
        "{} stations, {} distinct sorted tuples",
        nodes.len(),
        sorted_to_raw.len()
    );

    let missing = grow(&mut nodes, &node_indices, &sorted_to_raw, arity, order, combinations);
    let (assignments, configurations) = cluster(
        &mut nodes,
        &node_indices,
        &sorted_to_raw,
        tuples.len(),
        arity,
        order,
        combinations,
    );

    // Every raw tuple must now have a configuration.
    let unassigned = assignments
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_none())
        .map(|(i_tuple, _)| &tuples[i_tuple])
        .collect::<Vec<_>>();
    if !unassigned.is_empty() {
        return Err(ConfigurationError::Unassigned {
            num: unassigned.len(),
            tuples: unassigned.iter().join(", "),
        });
    }
    let assignments = assignments.into_iter().flatten().collect();
    let configurations =
        Vec1::try_from_vec(configurations.into_iter().collect()).map_err(|_| {
            ConfigurationError::Unassigned {
                num: tuples.len(),
                tuples: tuples.iter().join(", "),
            }
        })?;

    debug!(
        "Found {} station configuration(s): {}",
        configurations.len(),
        configurations.iter().map(|c| names.label(c)).join(", ")
    );
    if !missing.is_empty() {
        debug!(
            "{} tuple(s) are implied by the configurations but weren't observed",
            missing.len()
        );
    }

    Ok(StationConfigurations {
        assignments,
        configurations,
        missing,
    })
}

/// Grow the relations of each node so that every tuple that can be formed from
/// the stations a node relates to is known. Returns the tuples that had to be
/// added, in the order they were found.
fn grow(
    nodes: &mut [StationNode],
    node_indices: &HashMap<StationId, usize>,
    observed: &BTreeMap<StaIndex, Vec<usize>>,
    arity: usize,
    order: StationOrder,
    combinations: &mut Combinations,
) -> Vec<StaIndex> {
    let mut known: BTreeSet<StaIndex> = observed.keys().cloned().collect();
    let mut seen_candidates: HashSet<StaIndex> = HashSet::new();
    let mut missing = vec![];

    loop {
        // Largest count first, ties by largest identifier.
        let node_order = sort_nodes(nodes);
        let i_node = match node_order
            .into_iter()
            .rev()
            .find(|&i| !nodes[i].marked && nodes[i].count() > 0)
        {
            Some(i) => i,
            None => break,
        };
        let current_id = nodes[i_node].id;
        let candidate = nodes[i_node].candidate(order);
        nodes[i_node].marked = true;

        if !seen_candidates.insert(candidate.clone()) {
            trace!("Grow: station {current_id} gives already-seen candidate {candidate}");
            continue;
        }
        trace!("Grow: station {current_id} gives candidate {candidate}");

        for subset in subsets(&candidate, arity, combinations) {
            if !known.insert(subset.clone()) {
                continue;
            }
            trace!("Grow: {subset} is missing");
            for id in subset.ids() {
                let node = &mut nodes[node_indices[id]];
                node.relations.insert(subset.clone());
                if node.id != current_id {
                    node.marked = false;
                }
            }
            missing.push(subset);
        }
    }

    missing
}

/// Assign configurations to raw tuples, starting from the least-related nodes.
/// A raw tuple keeps the first configuration it is assigned.
fn cluster(
    nodes: &mut [StationNode],
    node_indices: &HashMap<StationId, usize>,
    observed: &BTreeMap<StaIndex, Vec<usize>>,
    num_tuples: usize,
    arity: usize,
    order: StationOrder,
    combinations: &mut Combinations,
) -> (Vec<Option<usize>>, IndexSet<StaIndex>) {
    let mut assignments = vec![None; num_tuples];
    let mut configurations = IndexSet::new();

    loop {
        let node_order = sort_nodes(nodes);
        let i_node = match node_order.into_iter().find(|&i| nodes[i].count() > 0) {
            Some(i) => i,
            None => break,
        };
        let candidate = nodes[i_node].candidate(order);
        trace!("Cluster: station {} gives candidate {candidate}", nodes[i_node].id);

        let mut i_config = None;
        for subset in subsets(&candidate, arity, combinations) {
            let raw_tuples = match observed.get(&subset) {
                Some(r) => r,
                None => continue,
            };
            for &i_tuple in raw_tuples {
                if assignments[i_tuple].is_none() {
                    let i = *i_config
                        .get_or_insert_with(|| configurations.insert_full(candidate.clone()).0);
                    assignments[i_tuple] = Some(i);
                }
            }
        }

        // This node is done; detach its relations from the graph.
        let relations = std::mem::take(&mut nodes[i_node].relations);
        for relation in &relations {
            for id in relation.ids() {
                nodes[node_indices[id]].relations.remove(relation);
            }
        }
    }

    (assignments, configurations)
}
