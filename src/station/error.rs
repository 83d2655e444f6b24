// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use super::StationId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StaIndexError {
    #[error("Row {row} has {arity} stations; only 1, 2 or 3 stations are allowed")]
    InvalidArity { row: usize, arity: usize },

    #[error("Row {row} has {got} stations, but previous rows have {expected}; all rows of a table must have the same number of stations")]
    ArityMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Row {row} references station {id} more than once")]
    DuplicateStation { row: usize, id: StationId },
}
