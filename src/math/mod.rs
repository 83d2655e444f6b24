// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


use std::collections::HashMap;

use itertools::Itertools;
use log::trace;

/// A cache of k-subsets of the ground set `{0..n-1}`.
///
/// Station configurations are small (typically fewer than 10 stations), but the
/// inference code asks for the same `(n, k)` subsets over and over again while
/// it grows and clusters configurations, so the subsets are only generated
/// once.
#[derive(Debug, Default)]
pub struct Combinations {
    cache: HashMap<(usize, usize), Vec<Vec<usize>>>,
}

impl Combinations {
    pub fn new() -> Combinations {
        Combinations::default()
    }

    /// Get all subsets of size `k` of `{0..n-1}`. The subsets are in
    /// lexicographic order, and the indices in each subset are ascending. If
    /// `k > n`, there are no subsets.
    pub fn get(&mut self, n: usize, k: usize) -> &[Vec<usize>] {
        self.cache.entry((n, k)).or_insert_with(|| {
            trace!("Generating combinations for n = {n}, k = {k}");
            (0..n).combinations(k).collect()
        })
    }

    /// The number of `(n, k)` entries currently cached.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// The binomial coefficient "n choose k". Zero if `k > n`.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    // Use the smaller of the two equivalent problems.
    let k = k.min(n - k);
    // Each intermediate result is itself a binomial coefficient, so the
    // division is always exact.
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}
