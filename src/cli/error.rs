// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all oistructure-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use super::analyze::AnalyzeArgsError;
use crate::table::TableError;

/// The *only* publicly visible error from oistructure.
#[derive(Error, Debug)]
pub enum OiStructureError {
    /// An error related to the analyze subcommand.
    #[error("{0}")]
    Analyze(String),

    /// An error related to reading table files.
    #[error("{0}\n\nTable files are toml or json files describing arrays, targets and tables.")]
    Table(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files are toml or json files with the same keys as the command-line arguments.")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<AnalyzeArgsError> for OiStructureError {
    fn from(e: AnalyzeArgsError) -> Self {
        let s = e.to_string();
        match e {
            AnalyzeArgsError::NoTableFile | AnalyzeArgsError::FailedTables { .. } => {
                Self::Analyze(s)
            }
            AnalyzeArgsError::Json(_) => Self::Generic(s),
            AnalyzeArgsError::IO(e) => Self::from(e),
        }
    }
}

impl From<TableError> for OiStructureError {
    fn from(e: TableError) -> Self {
        let s = e.to_string();
        match e {
            TableError::UnrecognisedExtension(_)
            | TableError::Toml { .. }
            | TableError::Json { .. }
            | TableError::UnknownArray { .. }
            | TableError::DuplicateStation { .. }
            | TableError::DuplicateTarget { .. }
            | TableError::BadMjd { .. } => Self::Table(s),
            TableError::IO(e) => Self::from(e),
        }
    }
}

impl From<log::SetLoggerError> for OiStructureError {
    fn from(e: log::SetLoggerError) -> Self {
        Self::Generic(format!("Failed to initialise logging: {e}"))
    }
}

impl From<std::io::Error> for OiStructureError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
