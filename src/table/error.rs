// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use super::OI_FILE_TYPES_COMMA_SEPARATED;

/// Errors associated with reading table descriptions.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Table file '{}' doesn't have a recognised file extension! Valid extensions are: {}", .0.display(), *OI_FILE_TYPES_COMMA_SEPARATED)]
    UnrecognisedExtension(PathBuf),

    #[error("Couldn't decode toml structure from '{}':\n{err}", file.display())]
    Toml {
        file: PathBuf,
        err: toml::de::Error,
    },

    #[error("Couldn't decode json structure from '{}':\n{err}", file.display())]
    Json {
        file: PathBuf,
        err: serde_json::Error,
    },

    #[error("Table '{table}' refers to array '{array}', but no such array is described")]
    UnknownArray { table: String, array: String },

    #[error("Array '{array}' describes station {id} more than once")]
    DuplicateStation { array: String, id: i16 },

    #[error("Target {id} is described more than once")]
    DuplicateTarget { id: i16 },

    #[error("Table '{table}' row {row} has a non-finite MJD ({mjd})")]
    BadMjd { table: String, row: usize, mjd: f64 },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
