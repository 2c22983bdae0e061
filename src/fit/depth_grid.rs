//! Correction grid generation.
//!
//! The fitters search a deterministic grid of correction terms rather than
//! optimizing continuously:
//! - the depth `m` is an integer by construction, so a grid is exact
//! - ordering is fixed, which makes tie-breaking reproducible
//! - grids are tiny (`2 × max_m` singles, `2 × max_m × (max_m - 1)` pairs)

use crate::domain::{Correction, Sign};
use crate::error::FitError;

/// All `(m, sign)` candidates for `m ∈ 1..=max_m`, ascending in `m`.
pub fn single_grid(max_m: u32) -> Result<Vec<Correction>, FitError> {
    if max_m < 1 {
        return Err(FitError::InvalidInput(format!(
            "max_m must be >= 1, got {max_m}"
        )));
    }
    let mut out = Vec::with_capacity(2 * max_m as usize);
    for m in 1..=max_m {
        for sign in Sign::BOTH {
            out.push(Correction { m, sign });
        }
    }
    Ok(out)
}

/// All correction pairs with `1 <= m1 < m2 <= max_m`, both signs each.
///
/// Ordered lexicographically by `(m1, m2)`.
pub fn pair_grid(max_m: u32) -> Result<Vec<(Correction, Correction)>, FitError> {
    if max_m < 1 {
        return Err(FitError::InvalidInput(format!(
            "max_m must be >= 1, got {max_m}"
        )));
    }
    if max_m < 2 {
        return Err(FitError::NoFitFound(
            "a double correction needs max_m >= 2".to_string(),
        ));
    }

    let mut out = Vec::new();
    for m1 in 1..max_m {
        for m2 in (m1 + 1)..=max_m {
            for s1 in Sign::BOTH {
                for s2 in Sign::BOTH {
                    out.push((
                        Correction { m: m1, sign: s1 },
                        Correction { m: m2, sign: s2 },
                    ));
                }
            }
        }
    }
    Ok(out)
}
