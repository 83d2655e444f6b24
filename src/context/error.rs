// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{configuration::ConfigurationError, station::StaIndexError};

/// Errors that stop the structural analysis of a single table. Other tables
/// are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("Table '{table}' has malformed station indices: {err}")]
    StaIndex { table: String, err: StaIndexError },

    #[error("Table '{table}': {err}")]
    Configuration {
        table: String,
        err: ConfigurationError,
    },
}
