// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Canonical names and orientations of baselines and closure triangles.

A baseline (or triangle) can be written with its stations in any order. To
label the same physical baseline identically everywhere in a file, the
stations' names are sorted and the *first-seen* ordering for each sorted name is
registered in a [`BaselineRegistry`]. The orientation of a tuple says whether
its station order is an even permutation of the name-sorted order.
 */


use std::borrow::Cow;

use indexmap::IndexMap;
use itertools::Itertools;
use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::{
    constants::STATION_SEPARATOR,
    station::{StaIndex, StationId, StationNames},
};

/// A station-name label and its orientation. `orientation` is `true` when the
/// station order is an even permutation of the name-sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaNamesDir {
    pub name: String,
    pub orientation: bool,
}

/// The result of sorting a tuple's stations by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedStaNames {
    /// The station names in name order, e.g. "A0-B1".
    pub sorted_name: String,

    /// The station names in the tuple's order, e.g. "B1-A0".
    pub original_name: String,

    /// Did sorting take an even number of swaps?
    pub orientation: bool,
}

/// Sort the stations of `sta_index` by name with a fixed sorting network and
/// count the swaps. For two stations, the network is the single comparison
/// (0, 1); for three, it is (0, 1), (0, 2), (1, 2). Stations with equal names
/// are left where they are. Single stations need no sorting.
pub fn sort_sta_names(sta_index: &StaIndex, names: &StationNames) -> SortedStaNames {
    let mut pairs: Vec<(StationId, Cow<str>)> = sta_index
        .ids()
        .iter()
        .map(|&id| (id, names.name(id)))
        .collect();
    let original_name = pairs.iter().map(|(_, name)| name).join(STATION_SEPARATOR);

    let network: &[(usize, usize)] = match pairs.len() {
        2 => &[(0, 1)],
        3 => &[(0, 1), (0, 2), (1, 2)],
        _ => &[],
    };
    let mut num_swaps = 0;
    for &(i, j) in network {
        if pairs[i].1 > pairs[j].1 {
            pairs.swap(i, j);
            num_swaps += 1;
        }
    }

    SortedStaNames {
        sorted_name: pairs.iter().map(|(_, name)| name).join(STATION_SEPARATOR),
        original_name,
        orientation: num_swaps % 2 == 0,
    }
}

/// A tuple's canonical label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalBaseline {
    /// The name-sorted label, used as the registry key.
    pub sorted_name: String,

    /// The registered (first-seen) name for `sorted_name`, with *this* tuple's
    /// orientation.
    pub names_dir: StaNamesDir,
}

/// The baseline names used in a file. Each sorted name maps to the name and
/// orientation of the first tuple registered with it; registrations are never
/// overwritten.
#[derive(Debug, Clone, Default)]
pub struct BaselineRegistry {
    used: IndexMap<String, StaNamesDir>,
}

impl BaselineRegistry {
    pub fn new() -> BaselineRegistry {
        BaselineRegistry::default()
    }

    /// Get the canonical label of `sta_index`, registering its sorted name if
    /// this is the first time it has been seen.
    pub fn canonicalize(&mut self, sta_index: &StaIndex, names: &StationNames) -> CanonicalBaseline {
        let SortedStaNames {
            sorted_name,
            original_name,
            orientation,
        } = sort_sta_names(sta_index, names);

        let registered = self.used.entry(sorted_name.clone()).or_insert_with(|| {
            trace!("Registering {sorted_name} as {original_name} (orientation {orientation})");
            StaNamesDir {
                name: original_name,
                orientation,
            }
        });

        CanonicalBaseline {
            names_dir: StaNamesDir {
                name: registered.name.clone(),
                orientation,
            },
            sorted_name,
        }
    }

    /// Get the registered label for a sorted name.
    pub fn get(&self, sorted_name: &str) -> Option<&StaNamesDir> {
        self.used.get(sorted_name)
    }

    /// Get the registered name for a sorted name. If it isn't registered, a
    /// warning is logged and the numeric station identifiers of `sta_index` are
    /// used instead.
    pub fn resolve_name(&self, sorted_name: &str, sta_index: &StaIndex) -> String {
        match self.used.get(sorted_name) {
            Some(names_dir) => names_dir.name.clone(),
            None => {
                let fallback = sta_index.numeric_label();
                warn!("Baseline name '{sorted_name}' is not registered; using '{fallback}'");
                fallback
            }
        }
    }

    /// Iterate over (sorted name, registered label) pairs in registration
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &StaNamesDir)> {
        self.used.iter()
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn clear(&mut self) {
        self.used.clear();
    }
}
