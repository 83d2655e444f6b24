// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Tables of interferometric observation rows.

Structural analysis only needs a handful of columns from each table, so tables
are accessed through the [`OiTable`] trait. [`OiFileData`] is a plain
description of a file's tables (and the arrays and targets they refer to) that
can be read from toml or json.
 */

mod error;
#[cfg(test)]
mod tests;

pub use error::TableError;

use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::Read,
    path::Path,
    str::FromStr,
};

use itertools::Itertools;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    granule::{InstrumentMode, Target},
    station::{StaIndex, StationId, StationNames},
};

lazy_static::lazy_static! {
    pub(crate) static ref OI_FILE_TYPES_COMMA_SEPARATED: String = OiFileType::iter().join(", ");
}

/// The columns of a table that structural analysis needs.
pub trait OiTable {
    fn name(&self) -> &str;

    fn num_rows(&self) -> usize;

    /// The station-index tuple of a row. `None` if the row (or the whole
    /// table) has no stations.
    fn sta_index(&self, row: usize) -> Option<&StaIndex>;

    fn target_id(&self, row: usize) -> i16;

    /// The modified Julian date of a row.
    fn mjd(&self, row: usize) -> f64;

    /// The (already resolved) instrument mode of the table.
    fn ins_mode(&self) -> &InstrumentMode;

    /// The names of the stations of the array this table was observed with.
    fn station_names(&self) -> &StationNames;
}

/// The kinds of data tables.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
pub enum TableKind {
    #[serde(rename = "OI_VIS")]
    #[strum(serialize = "OI_VIS")]
    Vis,

    #[serde(rename = "OI_VIS2")]
    #[strum(serialize = "OI_VIS2")]
    Vis2,

    #[serde(rename = "OI_T3")]
    #[strum(serialize = "OI_T3")]
    T3,

    #[serde(rename = "OI_FLUX")]
    #[strum(serialize = "OI_FLUX")]
    Flux,
}

impl TableKind {
    /// The number of stations each row of this kind of table references.
    pub fn arity(self) -> usize {
        match self {
            TableKind::Vis | TableKind::Vis2 => 2,
            TableKind::T3 => 3,
            TableKind::Flux => 1,
        }
    }
}

#[derive(Debug, Display, EnumIter, EnumString)]
enum OiFileType {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

/// A description of the tables of a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OiFileData {
    #[serde(default)]
    pub arrays: Vec<ArrayData>,

    #[serde(default)]
    pub targets: Vec<TargetData>,

    #[serde(default)]
    pub tables: Vec<TableData>,
}

/// An array description: the names of its stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayData {
    pub name: String,
    pub stations: Vec<StationData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationData {
    pub id: StationId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetData {
    pub id: i16,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub name: String,

    pub kind: TableKind,

    /// The name of the array the table refers to. Without one, stations are
    /// named by their identifiers.
    #[serde(default)]
    pub array: Option<String>,

    /// The instrument mode of the table. Without one, the undefined instrument
    /// mode is used.
    #[serde(default)]
    pub ins_mode: Option<String>,

    pub rows: Vec<RowData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    #[serde(default)]
    pub sta_index: Option<StaIndex>,
    pub target_id: i16,
    pub mjd: f64,
}

impl OiFileData {
    /// Read a file description from a toml or json file. The format is
    /// determined from the file extension.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<OiFileData, TableError> {
        fn inner(path: &Path) -> Result<OiFileData, TableError> {
            debug!("Attempting to read table file {}", path.display());
            let file_type = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .and_then(|e| OiFileType::from_str(&e).ok())
                .ok_or_else(|| TableError::UnrecognisedExtension(path.to_path_buf()))?;

            let mut contents = String::new();
            File::open(path)?.read_to_string(&mut contents)?;
            match file_type {
                OiFileType::Toml => {
                    debug!("Parsing toml file...");
                    toml::from_str(&contents).map_err(|err| TableError::Toml {
                        file: path.to_path_buf(),
                        err,
                    })
                }
                OiFileType::Json => {
                    debug!("Parsing json file...");
                    serde_json::from_str(&contents).map_err(|err| TableError::Json {
                        file: path.to_path_buf(),
                        err,
                    })
                }
            }
        }
        inner(path.as_ref())
    }

    /// Validate the description and turn it into tables.
    pub fn into_file(self) -> Result<OiFile, TableError> {
        let OiFileData {
            arrays,
            targets: target_data,
            tables: table_data,
        } = self;

        let mut array_names: HashMap<String, StationNames> = HashMap::with_capacity(arrays.len());
        for ArrayData { name, stations } in arrays {
            let mut seen = HashSet::with_capacity(stations.len());
            for station in &stations {
                if !seen.insert(station.id) {
                    return Err(TableError::DuplicateStation {
                        array: name,
                        id: station.id,
                    });
                }
            }
            let names = stations.into_iter().map(|s| (s.id, s.name)).collect();
            array_names.insert(name, names);
        }

        let mut targets = HashMap::with_capacity(target_data.len());
        for TargetData { id, name } in target_data {
            if targets.insert(id, Target::new(name)).is_some() {
                return Err(TableError::DuplicateTarget { id });
            }
        }

        let mut tables = Vec::with_capacity(table_data.len());
        for TableData {
            name,
            kind,
            array,
            ins_mode,
            rows,
        } in table_data
        {
            let station_names = match array {
                Some(array) => match array_names.get(&array) {
                    Some(names) => names.clone(),
                    None => return Err(TableError::UnknownArray { table: name, array }),
                },
                None => StationNames::default(),
            };

            // Rows that disagree with the kind of the table are still analysed;
            // a table with mixed arities fails on its own during analysis.
            if let Some((i_row, got)) = rows.iter().enumerate().find_map(|(i_row, row)| {
                row.sta_index
                    .as_ref()
                    .map(|s| s.arity())
                    .filter(|&got| got != kind.arity())
                    .map(|got| (i_row, got))
            }) {
                warn!(
                    "Table '{name}' is a {kind} table, but row {i_row} has {got} stations (expected {})",
                    kind.arity()
                );
            }
            for (i_row, row) in rows.iter().enumerate() {
                if !row.mjd.is_finite() {
                    return Err(TableError::BadMjd {
                        table: name,
                        row: i_row,
                        mjd: row.mjd,
                    });
                }
            }

            trace!("Table '{name}' ({kind}): {} rows", rows.len());
            tables.push(Table {
                name,
                kind,
                ins_mode: ins_mode
                    .map(InstrumentMode::new)
                    .unwrap_or_else(InstrumentMode::undefined),
                station_names,
                rows,
            });
        }

        Ok(OiFile { tables, targets })
    }
}

/// A single in-memory table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    kind: TableKind,
    ins_mode: InstrumentMode,
    station_names: StationNames,
    rows: Vec<RowData>,
}

impl Table {
    pub fn new(
        name: String,
        kind: TableKind,
        ins_mode: InstrumentMode,
        station_names: StationNames,
        rows: Vec<RowData>,
    ) -> Table {
        Table {
            name,
            kind,
            ins_mode,
            station_names,
            rows,
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn rows(&self) -> &[RowData] {
        &self.rows
    }

    /// Mutable access to the rows. Any analysis of this table is stale after
    /// the rows are changed.
    pub fn rows_mut(&mut self) -> &mut Vec<RowData> {
        &mut self.rows
    }
}

impl OiTable for Table {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn sta_index(&self, row: usize) -> Option<&StaIndex> {
        self.rows.get(row).and_then(|r| r.sta_index.as_ref())
    }

    fn target_id(&self, row: usize) -> i16 {
        self.rows[row].target_id
    }

    fn mjd(&self, row: usize) -> f64 {
        self.rows[row].mjd
    }

    fn ins_mode(&self) -> &InstrumentMode {
        &self.ins_mode
    }

    fn station_names(&self) -> &StationNames {
        &self.station_names
    }
}

/// The tables of a file, along with the file's targets.
#[derive(Debug, Clone, Default)]
pub struct OiFile {
    tables: Vec<Table>,
    targets: HashMap<i16, Target>,
}

impl OiFile {
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn targets(&self) -> &HashMap<i16, Target> {
        &self.targets
    }
}
