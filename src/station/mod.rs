// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Station identifiers, station-index tuples and station names.

mod error;
#[cfg(test)]
mod tests;

pub use error::StaIndexError;

use std::{
    borrow::Cow,
    cmp::Ordering,
    collections::HashMap,
    fmt,
};

use indexmap::IndexSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_ARITY, STATION_SEPARATOR};

/// A station identifier, as found in STA_INDEX columns.
pub type StationId = i16;

/// An ordered tuple of station identifiers referenced by a single row. 1
/// station for flux rows, 2 for baselines and 3 for closure triangles.
///
/// Equality and ordering are by the full sequence of identifiers, so `[1, 2]`
/// and `[2, 1]` are different tuples.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaIndex(Vec<StationId>);

impl StaIndex {
    pub fn new(ids: Vec<StationId>) -> StaIndex {
        StaIndex(ids)
    }

    /// The number of stations in this tuple.
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn ids(&self) -> &[StationId] {
        &self.0
    }

    /// The first station that appears more than once in this tuple, if any.
    pub fn repeated_station(&self) -> Option<StationId> {
        self.0
            .iter()
            .enumerate()
            .find(|&(i, id)| self.0[..i].contains(id))
            .map(|(_, &id)| id)
    }

    /// A label built only from the numeric identifiers, e.g. "3-1". This is
    /// used when station names can't be resolved.
    pub fn numeric_label(&self) -> String {
        self.0.iter().join(STATION_SEPARATOR)
    }
}

impl From<Vec<StationId>> for StaIndex {
    fn from(ids: Vec<StationId>) -> Self {
        StaIndex(ids)
    }
}

impl<const N: usize> From<[StationId; N]> for StaIndex {
    fn from(ids: [StationId; N]) -> Self {
        StaIndex(ids.to_vec())
    }
}

impl fmt::Display for StaIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

/// A lookup from station identifiers to station names. This comes from the
/// array description associated with a table; if a station isn't described,
/// its name is its numeric identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationNames(HashMap<StationId, String>);

impl StationNames {
    pub fn new(names: HashMap<StationId, String>) -> StationNames {
        StationNames(names)
    }

    pub fn name(&self, id: StationId) -> Cow<'_, str> {
        match self.0.get(&id) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Owned(id.to_string()),
        }
    }

    /// Is there an explicit name for this station?
    pub fn is_named(&self, id: StationId) -> bool {
        self.0.contains_key(&id)
    }

    /// The names of the stations in `sta_index`, in the tuple's order, joined
    /// by [`STATION_SEPARATOR`].
    pub fn label(&self, sta_index: &StaIndex) -> String {
        sta_index
            .ids()
            .iter()
            .map(|&id| self.name(id))
            .join(STATION_SEPARATOR)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(StationId, String)> for StationNames {
    fn from_iter<I: IntoIterator<Item = (StationId, String)>>(iter: I) -> Self {
        StationNames(iter.into_iter().collect())
    }
}

/// The order used for sorted station keys and configurations: ascending by
/// station name, ties broken by station identifier. This is a total order.
#[derive(Debug, Clone, Copy)]
pub struct StationOrder<'a> {
    names: &'a StationNames,
}

impl<'a> StationOrder<'a> {
    pub fn new(names: &'a StationNames) -> StationOrder<'a> {
        StationOrder { names }
    }

    pub fn cmp(&self, a: StationId, b: StationId) -> Ordering {
        self.names
            .name(a)
            .cmp(&self.names.name(b))
            .then_with(|| a.cmp(&b))
    }

    pub fn sort(&self, ids: &mut [StationId]) {
        ids.sort_by(|&a, &b| self.cmp(a, b));
    }

    /// A copy of `sta_index` with its stations in this order.
    pub fn sorted(&self, sta_index: &StaIndex) -> StaIndex {
        let mut ids = sta_index.ids().to_vec();
        self.sort(&mut ids);
        StaIndex(ids)
    }
}

/// The distinct station-index tuples of a table, and which tuple each row uses.
///
/// Rows with equal tuples share one tuple identifier (an index into
/// [`DistinctStaIndexes::tuples`]); identifiers are handed out in the order
/// tuples are first seen.
#[derive(Debug, Clone, Default)]
pub struct DistinctStaIndexes {
    tuples: IndexSet<StaIndex>,

    /// The tuple identifier of each row. `None` if the row has no stations.
    rows: Vec<Option<usize>>,

    arity: Option<usize>,
}

impl DistinctStaIndexes {
    /// Build the distinct tuples from every row of a table. All rows with
    /// stations must have the same arity, and that arity must be between 1 and
    /// [`MAX_ARITY`].
    pub fn from_rows<'a, I>(rows: I) -> Result<DistinctStaIndexes, StaIndexError>
    where
        I: IntoIterator<Item = Option<&'a StaIndex>>,
    {
        let mut distinct = DistinctStaIndexes::default();
        for (i_row, sta_index) in rows.into_iter().enumerate() {
            let sta_index = match sta_index {
                Some(s) => s,
                None => {
                    distinct.rows.push(None);
                    continue;
                }
            };

            let arity = sta_index.arity();
            if arity == 0 || arity > MAX_ARITY {
                return Err(StaIndexError::InvalidArity { row: i_row, arity });
            }
            if let Some(id) = sta_index.repeated_station() {
                return Err(StaIndexError::DuplicateStation { row: i_row, id });
            }
            match distinct.arity {
                Some(expected) if expected != arity => {
                    return Err(StaIndexError::ArityMismatch {
                        row: i_row,
                        expected,
                        got: arity,
                    })
                }
                Some(_) => (),
                None => distinct.arity = Some(arity),
            }

            let (i_tuple, _) = distinct.tuples.insert_full(sta_index.clone());
            distinct.rows.push(Some(i_tuple));
        }

        Ok(distinct)
    }

    /// The number of distinct tuples.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// The arity shared by all tuples. `None` if no row has stations.
    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    pub fn tuples(&self) -> &IndexSet<StaIndex> {
        &self.tuples
    }

    pub fn get(&self, i_tuple: usize) -> Option<&StaIndex> {
        self.tuples.get_index(i_tuple)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// The tuple identifier used by a row.
    pub fn row_tuple(&self, i_row: usize) -> Option<usize> {
        self.rows.get(i_row).copied().flatten()
    }
}
