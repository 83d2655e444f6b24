// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Granules: the grouping of rows by target, instrument mode and observing night.
 */


use std::{
    collections::{BTreeSet, HashMap},
    fmt,
};

use hifitime::Epoch;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::{UNDEFINED_INS_MODE_NAME, UNDEFINED_TARGET_NAME};

/// An observed target. Targets are resolved outside of this crate; only their
/// identity matters here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target {
    name: String,
}

impl Target {
    pub fn new<S: Into<String>>(name: S) -> Target {
        Target { name: name.into() }
    }

    /// The target used for rows whose target can't be resolved.
    pub fn undefined() -> Target {
        Target::new(UNDEFINED_TARGET_NAME)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An instrument mode (i.e. a spectral setup). Like [`Target`], this is
/// resolved outside of this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentMode {
    name: String,
}

impl InstrumentMode {
    pub fn new<S: Into<String>>(name: S) -> InstrumentMode {
        InstrumentMode { name: name.into() }
    }

    pub fn undefined() -> InstrumentMode {
        InstrumentMode::new(UNDEFINED_INS_MODE_NAME)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for InstrumentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Resolves the target identifiers of rows into [`Target`]s.
#[derive(Debug, Clone)]
pub struct TargetLookup {
    targets: HashMap<i16, Target>,
    undefined: Target,
}

impl TargetLookup {
    pub fn new(targets: HashMap<i16, Target>) -> TargetLookup {
        TargetLookup {
            targets,
            undefined: Target::undefined(),
        }
    }

    /// Use a different target for unresolvable target identifiers.
    pub fn with_undefined(mut self, undefined: Target) -> TargetLookup {
        self.undefined = undefined;
        self
    }

    /// Get the target for an identifier, or the undefined target.
    pub fn resolve(&self, target_id: i16) -> &Target {
        self.targets.get(&target_id).unwrap_or(&self.undefined)
    }

    pub fn undefined(&self) -> &Target {
        &self.undefined
    }
}

impl Default for TargetLookup {
    fn default() -> Self {
        TargetLookup::new(HashMap::new())
    }
}

/// An observing night: a modified Julian date rounded to the nearest day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NightId(i32);

impl NightId {
    pub fn from_mjd(mjd: f64) -> NightId {
        NightId(mjd.round() as i32)
    }

    /// The (integer) MJD day count.
    pub fn day(self) -> i32 {
        self.0
    }

    /// The UTC epoch at the start of this MJD day.
    pub fn to_epoch(self) -> Epoch {
        Epoch::from_mjd_utc(f64::from(self.0))
    }
}

impl fmt::Display for NightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (y, m, d, ..) = self.to_epoch().to_gregorian_utc();
        write!(f, "{y:04}-{m:02}-{d:02} (MJD {})", self.0)
    }
}

/// The identity of a granule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GranuleKey {
    pub target: Target,
    pub ins_mode: InstrumentMode,
    pub night: NightId,
}

/// A group of rows sharing a target, instrument mode and night, along with
/// aggregate information on those rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Granule {
    key: GranuleKey,

    mjd_min: f64,
    mjd_max: f64,

    /// The distinct canonical baseline (or triangle) names.
    baselines: BTreeSet<String>,

    /// The distinct station-configuration labels.
    configurations: BTreeSet<String>,

    num_rows: usize,
}

impl Granule {
    fn new(key: GranuleKey) -> Granule {
        Granule {
            key,
            mjd_min: f64::INFINITY,
            mjd_max: f64::NEG_INFINITY,
            baselines: BTreeSet::new(),
            configurations: BTreeSet::new(),
            num_rows: 0,
        }
    }

    pub fn key(&self) -> &GranuleKey {
        &self.key
    }

    pub fn target(&self) -> &Target {
        &self.key.target
    }

    pub fn ins_mode(&self) -> &InstrumentMode {
        &self.key.ins_mode
    }

    pub fn night(&self) -> NightId {
        self.key.night
    }

    /// Account for a row observed at `mjd`.
    pub fn add_row(&mut self, mjd: f64) {
        self.mjd_min = self.mjd_min.min(mjd);
        self.mjd_max = self.mjd_max.max(mjd);
        self.num_rows += 1;
    }

    pub fn add_baseline(&mut self, name: &str) {
        if !self.baselines.contains(name) {
            self.baselines.insert(name.to_string());
        }
    }

    pub fn add_configuration(&mut self, label: &str) {
        if !self.configurations.contains(label) {
            self.configurations.insert(label.to_string());
        }
    }

    /// The smallest and largest MJDs of the rows in this granule. `None` if no
    /// rows have been added.
    pub fn mjd_range(&self) -> Option<(f64, f64)> {
        (self.num_rows > 0).then_some((self.mjd_min, self.mjd_max))
    }

    pub fn baselines(&self) -> &BTreeSet<String> {
        &self.baselines
    }

    pub fn configurations(&self) -> &BTreeSet<String> {
        &self.configurations
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }
}

/// An index into a [`GranulePool`].
pub type GranuleId = usize;

/// The granules of a file. Each distinct [`GranuleKey`] has exactly one
/// [`Granule`]; the first time a key is interned, its granule is created, and
/// the same granule is used from then on.
#[derive(Debug, Clone, Default)]
pub struct GranulePool {
    granules: IndexMap<GranuleKey, Granule>,
}

impl GranulePool {
    pub fn new() -> GranulePool {
        GranulePool::default()
    }

    /// Get the identifier of the granule for `key`, creating the granule if
    /// necessary.
    pub fn intern(&mut self, key: GranuleKey) -> GranuleId {
        let entry = self.granules.entry(key);
        let id = entry.index();
        entry.or_insert_with_key(|key| Granule::new(key.clone()));
        id
    }

    /// Get the identifier of an existing granule.
    pub fn find(&self, key: &GranuleKey) -> Option<GranuleId> {
        self.granules.get_index_of(key)
    }

    pub fn get(&self, id: GranuleId) -> Option<&Granule> {
        self.granules.get_index(id).map(|(_, g)| g)
    }

    pub fn get_mut(&mut self, id: GranuleId) -> Option<&mut Granule> {
        self.granules.get_index_mut(id).map(|(_, g)| g)
    }

    /// Iterate over the granules in the order they were created.
    pub fn iter(&self) -> impl Iterator<Item = (GranuleId, &Granule)> {
        self.granules.values().enumerate()
    }

    pub fn len(&self) -> usize {
        self.granules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.granules.is_empty()
    }

    pub fn clear(&mut self) {
        self.granules.clear();
    }
}
