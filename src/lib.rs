// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Structural inference for optical interferometry tables: the station
configuration of every row, canonical names and orientations of baselines and
closure triangles, and granules (target, instrument mode, night).
 */

pub mod baseline;
mod cli;
pub mod configuration;
pub mod constants;
pub mod context;
pub mod granule;
pub mod math;
pub mod station;
pub mod table;

// Re-exports.
pub use baseline::{BaselineRegistry, CanonicalBaseline, StaNamesDir};
pub use cli::{OiStructure, OiStructureError};
pub use configuration::{infer_configurations, ConfigurationError, StationConfigurations};
pub use context::{AnalysisParams, ContextError, FileContext, TableStructure};
pub use granule::{Granule, GranuleKey, GranulePool, InstrumentMode, NightId, Target};
pub use station::{StaIndex, StationId, StationNames};
pub use table::{OiFile, OiFileData, OiTable, Table, TableError, TableKind};
