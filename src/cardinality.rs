use itertools::Itertools;

use crate::Error;

/// CNF for "exactly `k` of `lits` are true", in the naive pairwise encoding.
///
/// - At most k: for any subset of k+1 literals, at least one must be false.
/// - At least k: for any subset of n-k+1 literals, at least one must be true.
///
/// Exponential in `min(k, n - k)`, which is fine for neighborhood-sized
/// inputs (n <= 8); callers emitting board-wide constraints gate on a
/// combination budget first.
///
/// `k > lits.len()` means the observation that produced the constraint cannot
/// be satisfied at all and is reported as an inconsistency.
pub fn exactly(lits: &[isize], k: usize) -> Result<Vec<Vec<isize>>, Error> {
    let n = lits.len();
    if k > n {
        return Err(Error::Inconsistent(format!(
            "exactly {k} of {n} literals is unsatisfiable"
        )));
    }

    // Unit-clause fast paths: all forced true, or all forced false.
    if k == n {
        return Ok(lits.iter().map(|&lit| vec![lit]).collect());
    }
    if k == 0 {
        return Ok(lits.iter().map(|&lit| vec![-lit]).collect());
    }

    let mut clauses = Vec::new();
    for combo in lits.iter().combinations(k + 1) {
        clauses.push(combo.into_iter().map(|&lit| -lit).collect());
    }
    for combo in lits.iter().combinations(n - k + 1) {
        clauses.push(combo.into_iter().map(|&lit| lit).collect());
    }
    Ok(clauses)
}
