// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.
 */

/// The separator used between station names when building baseline, triangle
/// and configuration labels (e.g. "E1-W2").
pub const STATION_SEPARATOR: &str = "-";

/// The name given to rows whose target identifier can't be resolved.
pub const UNDEFINED_TARGET_NAME: &str = "UNDEFINED";

/// The name given to tables whose instrument mode can't be resolved.
pub const UNDEFINED_INS_MODE_NAME: &str = "UNDEFINED";

/// The largest number of stations referenced by a single row (a closure
/// triangle).
pub const MAX_ARITY: usize = 3;

/// By default, this many missing (combinatorially implied but unobserved)
/// station tuples are printed per table.
pub const DEFAULT_MAX_MISSING_PRINTED: usize = 10;
