use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// Symmetric tolerance pair for equality-style comparisons.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// One-sided drift acceptance band: absolute floor plus a factor of the
/// reference magnitude.
///
/// A drift `d` away from a reference value `r` is accepted when
/// `|d| <= abs_floor + rel_factor * |r|`. The floor keeps the band open
/// when the reference is exactly zero.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToleranceBand {
    /// Absolute floor of the band (same units as the compared value).
    pub abs_floor: Real,
    /// Relative factor applied to the reference magnitude.
    pub rel_factor: Real,
}

impl Default for ToleranceBand {
    fn default() -> Self {
        Self {
            abs_floor: 1e-16,
            rel_factor: 1e-6,
        }
    }
}

impl ToleranceBand {
    pub fn new(abs_floor: Real, rel_factor: Real) -> Result<Self, CoreError> {
        for (v, what) in [(abs_floor, "abs_floor"), (rel_factor, "rel_factor")] {
            ensure_finite(v, what)?;
            if v < 0.0 {
                return Err(CoreError::InvalidArg {
                    what: "tolerance band terms must be non-negative",
                });
            }
        }
        Ok(Self {
            abs_floor,
            rel_factor,
        })
    }

    /// Width of the band around a reference value.
    pub fn bound(&self, reference: Real) -> Real {
        self.abs_floor + self.rel_factor * reference.abs()
    }

    /// Whether a drift away from the reference falls inside the band.
    pub fn accepts(&self, drift: Real, reference: Real) -> bool {
        drift.abs() <= self.bound(reference)
    }
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}
