// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Structural metadata of a file's tables.

A [`FileContext`] analyses the tables of one file in order. Baseline names are
registered file-wide, so tables analysed later reuse the names (and
orientations) registered by earlier ones; granules are shared between the
tables of the file too. The cached analysis is never patched: if any table's
rows change, the whole file is analysed again.
 */

mod error;

pub use error::ContextError;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    baseline::{BaselineRegistry, StaNamesDir},
    configuration::{infer_configurations, StationConfigurations},
    constants::{DEFAULT_MAX_MISSING_PRINTED, UNDEFINED_TARGET_NAME},
    granule::{GranuleId, GranuleKey, GranulePool, NightId, Target, TargetLookup},
    math::Combinations,
    station::{DistinctStaIndexes, StaIndex, StationNames},
    table::OiTable,
};

/// Tunables of the structural analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// The name of the target given to rows whose target identifier can't be
    /// resolved.
    pub undefined_target: String,

    /// Log the tuples that are implied by station configurations but weren't
    /// observed?
    pub log_missing: bool,

    /// The maximum number of missing tuples to log per table.
    pub max_missing_printed: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        AnalysisParams {
            undefined_target: UNDEFINED_TARGET_NAME.to_string(),
            log_missing: true,
            max_missing_printed: DEFAULT_MAX_MISSING_PRINTED,
        }
    }
}

/// The structure of a single table.
#[derive(Debug, Clone)]
pub struct TableStructure {
    name: String,

    /// The distinct raw station-index tuples and the tuple of each row.
    tuples: DistinctStaIndexes,

    /// The canonical label of each distinct tuple.
    baselines: Vec<StaNamesDir>,

    /// The station configurations. `None` if the table has no stations.
    configurations: Option<Result<StationConfigurations, ContextError>>,

    /// The station names of each configuration, joined by '-'.
    configuration_labels: Vec<String>,

    mjd_range: Option<(f64, f64)>,

    /// The granules this table contributed rows to.
    granules: BTreeSet<GranuleId>,
}

impl TableStructure {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tuples(&self) -> &DistinctStaIndexes {
        &self.tuples
    }

    /// The successfully inferred configurations of this table.
    pub fn configurations(&self) -> Option<&StationConfigurations> {
        self.configurations.as_ref().and_then(|r| r.as_ref().ok())
    }

    /// Why the structure of this table couldn't be determined, if it couldn't.
    pub fn error(&self) -> Option<&ContextError> {
        self.configurations.as_ref().and_then(|r| r.as_ref().err())
    }

    pub fn configuration_labels(&self) -> &[String] {
        &self.configuration_labels
    }

    /// The canonical label of a distinct tuple.
    pub fn baseline(&self, i_tuple: usize) -> Option<&StaNamesDir> {
        self.baselines.get(i_tuple)
    }

    /// The canonical label of the tuple used by a row. The name is the
    /// registered (file-wide) name, and the orientation is that of the row's
    /// own station order.
    pub fn row_baseline(&self, row: usize) -> Option<&StaNamesDir> {
        self.tuples
            .row_tuple(row)
            .and_then(|i_tuple| self.baselines.get(i_tuple))
    }

    /// The station configuration of a row.
    pub fn row_configuration(&self, row: usize) -> Option<&StaIndex> {
        let i_tuple = self.tuples.row_tuple(row)?;
        self.configurations()?.configuration(i_tuple)
    }

    /// The station names of the configuration of a row.
    pub fn row_configuration_label(&self, row: usize) -> Option<&str> {
        let i_tuple = self.tuples.row_tuple(row)?;
        let i_config = self.configurations()?.configuration_index(i_tuple)?;
        self.configuration_labels.get(i_config).map(|s| s.as_str())
    }

    /// The tuples implied by the configurations that weren't observed.
    pub fn missing(&self) -> &[StaIndex] {
        self.configurations().map(|c| c.missing()).unwrap_or(&[])
    }

    /// The smallest and largest MJDs of the rows.
    pub fn mjd_range(&self) -> Option<(f64, f64)> {
        self.mjd_range
    }

    pub fn granules(&self) -> &BTreeSet<GranuleId> {
        &self.granules
    }
}

/// The structural analysis of a file.
#[derive(Debug, Default)]
pub struct FileContext {
    params: AnalysisParams,

    registry: BaselineRegistry,

    granules: GranulePool,

    /// The tables that contributed rows to each granule.
    granule_tables: BTreeMap<GranuleId, BTreeSet<usize>>,

    tables: Vec<TableStructure>,

    combinations: Combinations,
}

impl FileContext {
    pub fn new(params: AnalysisParams) -> FileContext {
        FileContext {
            params,
            ..Default::default()
        }
    }

    /// Analyse all of the tables of a file. Any previous analysis is discarded
    /// first. Failures are local to a table; see [`FileContext::errors`].
    pub fn analyze<T: OiTable>(&mut self, tables: &[T], targets: &HashMap<i16, Target>) {
        self.invalidate();

        let lookup = TargetLookup::new(targets.clone())
            .with_undefined(Target::new(self.params.undefined_target.as_str()));
        for (i_table, table) in tables.iter().enumerate() {
            let structure = self.analyze_table(i_table, table, &lookup);
            if let Some(e) = structure.error() {
                warn!("{e}");
            }
            self.tables.push(structure);
        }
        debug!(
            "Analysed {} tables: {} baseline names, {} granules",
            self.tables.len(),
            self.registry.len(),
            self.granules.len()
        );
    }

    fn analyze_table<T: OiTable>(
        &mut self,
        i_table: usize,
        table: &T,
        lookup: &TargetLookup,
    ) -> TableStructure {
        let name = table.name().to_string();
        let names = table.station_names();
        let num_rows = table.num_rows();

        let (tuples, mut configurations) =
            match DistinctStaIndexes::from_rows((0..num_rows).map(|row| table.sta_index(row))) {
                Ok(tuples) => (tuples, None),
                Err(err) => (
                    DistinctStaIndexes::default(),
                    Some(Err(ContextError::StaIndex {
                        table: name.clone(),
                        err,
                    })),
                ),
            };
        debug!(
            "Table '{name}': {num_rows} rows, {} distinct station tuples",
            tuples.len()
        );

        // Canonical labels come from the file-wide registry.
        let baselines: Vec<StaNamesDir> = tuples
            .tuples()
            .iter()
            .map(|tuple| self.registry.canonicalize(tuple, names).names_dir)
            .collect();

        let mut configuration_labels = vec![];
        if !tuples.is_empty() {
            let raw: Vec<StaIndex> = tuples.tuples().iter().cloned().collect();
            let result = infer_configurations(&raw, names, &mut self.combinations).map_err(|err| {
                ContextError::Configuration {
                    table: name.clone(),
                    err,
                }
            });
            if let Ok(c) = &result {
                configuration_labels = c.configurations().iter().map(|c| names.label(c)).collect();
                self.log_missing(&name, c, names);
            }
            configurations = Some(result);
        }

        let mut structure = TableStructure {
            name,
            tuples,
            baselines,
            configurations,
            configuration_labels,
            mjd_range: None,
            granules: BTreeSet::new(),
        };

        for row in 0..num_rows {
            let mjd = table.mjd(row);
            if !mjd.is_finite() {
                warn!(
                    "Table '{}' row {row} has a non-finite MJD ({mjd}); it isn't assigned a granule",
                    structure.name
                );
                continue;
            }
            structure.mjd_range = Some(match structure.mjd_range {
                Some((min, max)) => (min.min(mjd), max.max(mjd)),
                None => (mjd, mjd),
            });

            let key = GranuleKey {
                target: lookup.resolve(table.target_id(row)).clone(),
                ins_mode: table.ins_mode().clone(),
                night: NightId::from_mjd(mjd),
            };
            let id = self.granules.intern(key);
            if let Some(granule) = self.granules.get_mut(id) {
                granule.add_row(mjd);
                if let Some(i_tuple) = structure.tuples.row_tuple(row) {
                    granule.add_baseline(&structure.baselines[i_tuple].name);
                }
                if let Some(label) = structure.row_configuration_label(row) {
                    granule.add_configuration(label);
                }
            }
            self.granule_tables.entry(id).or_default().insert(i_table);
            structure.granules.insert(id);
        }

        structure
    }

    fn log_missing(
        &self,
        table: &str,
        configurations: &StationConfigurations,
        names: &StationNames,
    ) {
        let missing = configurations.missing();
        if !self.params.log_missing || missing.is_empty() {
            return;
        }
        let max = self.params.max_missing_printed;
        let mut listed = missing.iter().take(max).map(|t| names.label(t)).join(", ");
        if missing.len() > max {
            listed.push_str(&format!(" and {} more", missing.len() - max));
        }
        info!(
            "Table '{table}': {} station tuple(s) weren't observed: {listed}",
            missing.len()
        );
    }

    /// Discard the analysis. This must be done whenever any table's rows
    /// change.
    pub fn invalidate(&mut self) {
        self.registry.clear();
        self.granules.clear();
        self.granule_tables.clear();
        self.tables.clear();
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// The file-wide baseline-name registry.
    pub fn baseline_registry(&self) -> &BaselineRegistry {
        &self.registry
    }

    pub fn granules(&self) -> &GranulePool {
        &self.granules
    }

    /// The structures of the tables, in the order they were analysed.
    pub fn tables(&self) -> &[TableStructure] {
        &self.tables
    }

    pub fn table(&self, i_table: usize) -> Option<&TableStructure> {
        self.tables.get(i_table)
    }

    /// The indices of the tables that contributed rows to a granule.
    pub fn tables_for_granule(&self, id: GranuleId) -> Option<&BTreeSet<usize>> {
        self.granule_tables.get(&id)
    }

    /// The granules that a table contributed rows to.
    pub fn granules_for_table(&self, i_table: usize) -> Option<&BTreeSet<GranuleId>> {
        self.tables.get(i_table).map(|t| &t.granules)
    }

    /// The tables whose structure couldn't be determined.
    pub fn errors(&self) -> impl Iterator<Item = (usize, &ContextError)> {
        self.tables
            .iter()
            .enumerate()
            .filter_map(|(i_table, t)| t.error().map(|e| (i_table, e)))
    }
}
