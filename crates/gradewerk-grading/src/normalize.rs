// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Answer normalization - every answer shape becomes a plain set of option
// indices before any comparison, on both the detected and the key side.

use std::collections::BTreeSet;

use gradewerk_core::types::Answer;

/// `NoAnswer` is the empty set, `Single(i)` is `{i}`, `Multiple(v)` is the
/// set of `v`.
pub fn normalize(answer: &Answer) -> BTreeSet<usize> {
    match answer {
        Answer::NoAnswer => BTreeSet::new(),
        Answer::Single(index) => BTreeSet::from([*index]),
        Answer::Multiple(indices) => indices.iter().copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_shape_maps_to_a_set() {
        assert!(normalize(&Answer::NoAnswer).is_empty());
        assert_eq!(normalize(&Answer::Single(3)), BTreeSet::from([3]));
        assert_eq!(
            normalize(&Answer::Multiple(vec![4, 0, 4])),
            BTreeSet::from([0, 4])
        );
    }
}
