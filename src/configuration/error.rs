// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::station::StationId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("No station-index tuples were supplied; can't infer station configurations")]
    NoTuples,

    #[error("Station-index tuple {tuple} has {arity} stations; only 1, 2 or 3 stations are allowed")]
    InvalidArity { tuple: String, arity: usize },

    #[error("Station-index tuple {tuple} has {got} stations, but other tuples have {expected}")]
    ArityMismatch {
        tuple: String,
        expected: usize,
        got: usize,
    },

    #[error("Station-index tuple {tuple} references station {id} more than once")]
    DuplicateStation { tuple: String, id: StationId },

    #[error("{num} station-index tuple(s) weren't assigned a station configuration ({tuples}); this is a bug in the configuration inference")]
    Unassigned { num: usize, tuples: String },
}
