//! Moment-matched symmetric Double-Pi.
//!
//! The model family is `C1 = C3 = α·C`, `C2 = (1 - 2α)·C`, `R1 = β·R`,
//! `R2 = (1 - β)·R` for the ladder totals `R` and `C`. In normalised form the
//! second and third admittance moments of such a model are
//!
//! ```text
//! k1 = β(1 - α)² + (1 - β)α²
//! k2 = β²(1 - α)³ + 2β(1 - β)(1 - α)α² + (1 - β)²α³
//! ```
//!
//! so `β` follows from `α` through the first constraint and `α` is searched to
//! match the second.

use log::{debug, info};
use rcred_netlist::Ladder;

use crate::model::{Provenance, ReducedModel};

/// Floor for a non-positive total resistance, in ohms.
pub const MIN_RESISTANCE: f64 = 1.0;
/// Floor for a non-positive total capacitance, in farads.
pub const MIN_CAPACITANCE: f64 = 1e-15;

/// Number of evenly spaced `α` samples in the scan.
pub const SAMPLES: usize = 1200;
/// Distance kept from the open ends of `α ∈ (0, 0.5)`.
pub const EPSILON: f64 = 1e-6;
/// Largest accepted `|k2(α, β) - k2|`.
pub const TOLERANCE: f64 = 1e-10;

const FALLBACK_ALPHA: f64 = 0.25;
const FALLBACK_BETA: f64 = 0.5;
const REFINE_STEPS: usize = 200;

/// Total resistance and capacitance of a ladder, clamped to stay positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub resistance: f64,
    pub capacitance: f64,
}

impl Totals {
    pub fn new(resistance: f64, capacitance: f64) -> Self {
        let clamp = |value: f64, floor: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                floor
            }
        };
        Self {
            resistance: clamp(resistance, MIN_RESISTANCE),
            capacitance: clamp(capacitance, MIN_CAPACITANCE),
        }
    }

    pub fn of(ladder: &Ladder) -> Self {
        Self::new(ladder.total_resistance(), ladder.total_capacitance())
    }
}

/// Normalised third moment of the symmetric Double-Pi.
pub fn k2(alpha: f64, beta: f64) -> f64 {
    let a = alpha;
    let b = beta;
    b * b * (1.0 - a).powi(3)
        + 2.0 * b * (1.0 - b) * (1.0 - a) * a * a
        + (1.0 - b).powi(2) * a.powi(3)
}

/// Fit a symmetric Double-Pi to the moments `m1 = y2` and `m2 = y3`.
///
/// Scans `α` and then bisects the sign change next to the best sample. When
/// nothing feasible is found, the residual exceeds [`TOLERANCE`] or any value
/// comes out non-positive, the canonical `α = 0.25, β = 0.5` partition is
/// returned with `used_fallback` set. Never fails.
pub fn fit_symmetric_double_pi(totals: Totals, m1: f64, m2: f64) -> ReducedModel {
    let Totals {
        resistance: r,
        capacitance: c,
    } = totals;
    let target = Target {
        k1: -m1 / (r * c * c),
        k2: m2 / (r * r * c.powi(3)),
    };

    match target.search() {
        Some((alpha, beta, residual)) if residual <= TOLERANCE => {
            debug!("Double-Pi fit: alpha={alpha} beta={beta} residual={residual:e}");
            let model = symmetric_double_pi(
                totals,
                alpha,
                beta,
                Provenance::Fitted {
                    residual,
                    used_fallback: false,
                },
            );
            if model.is_passive() {
                return model;
            }
            info!("Double-Pi fit is not passive, using the canonical partition");
        }
        Some((alpha, beta, residual)) => {
            info!(
                "Double-Pi residual {residual:e} at alpha={alpha} beta={beta} exceeds tolerance, using the canonical partition"
            );
        }
        None => info!("No feasible Double-Pi split, using the canonical partition"),
    }

    symmetric_double_pi(
        totals,
        FALLBACK_ALPHA,
        FALLBACK_BETA,
        Provenance::Fitted {
            residual: f64::INFINITY,
            used_fallback: true,
        },
    )
}

fn symmetric_double_pi(
    totals: Totals,
    alpha: f64,
    beta: f64,
    provenance: Provenance,
) -> ReducedModel {
    let Totals {
        resistance: r,
        capacitance: c,
    } = totals;
    ReducedModel::DoublePi {
        r1: beta * r,
        r2: (1.0 - beta) * r,
        c1: alpha * c,
        c2: (1.0 - 2.0 * alpha) * c,
        c3: alpha * c,
        provenance,
    }
}

/// Normalised moment targets.
struct Target {
    k1: f64,
    k2: f64,
}

impl Target {
    /// `β` satisfying the `k1` constraint, if it lies in `(0, 1)`.
    fn beta(&self, alpha: f64) -> Option<f64> {
        let denom = 1.0 - 2.0 * alpha;
        if denom.abs() < 1e-15 {
            return None;
        }
        let beta = (self.k1 - alpha * alpha) / denom;
        (beta.is_finite() && beta > 0.0 && beta < 1.0).then_some(beta)
    }

    /// Signed `k2` mismatch at `α`, if `α` is feasible.
    fn mismatch(&self, alpha: f64) -> Option<f64> {
        self.beta(alpha).map(|beta| k2(alpha, beta) - self.k2)
    }

    fn sample(j: usize) -> f64 {
        EPSILON + j as f64 * (0.5 - 2.0 * EPSILON) / (SAMPLES - 1) as f64
    }

    /// Best `(α, β, |residual|)`, or `None` when no sample is feasible.
    fn search(&self) -> Option<(f64, f64, f64)> {
        let (j, mut alpha, mut err) = (0..SAMPLES)
            .filter_map(|j| {
                let alpha = Self::sample(j);
                self.mismatch(alpha).map(|err| (j, alpha, err))
            })
            .filter(|(_, _, err)| err.is_finite())
            .min_by(|a, b| a.2.abs().total_cmp(&b.2.abs()))?;

        // Refine inside the first neighbouring interval that brackets a root.
        let neighbours = [j.checked_sub(1), (j + 1 < SAMPLES).then_some(j + 1)];
        for other in neighbours.into_iter().flatten().map(Self::sample) {
            let Some(other_err) = self.mismatch(other) else {
                continue;
            };
            if other_err.signum() == err.signum() {
                continue;
            }
            let (refined, refined_err) = self.bisect(alpha, err, other);
            if refined_err.abs() < err.abs() {
                alpha = refined;
                err = refined_err;
            }
            break;
        }

        let beta = self.beta(alpha)?;
        Some((alpha, beta, err.abs()))
    }

    /// Shrink `[lo, hi]` around the sign change, keeping `lo` on the side of
    /// `lo_err`.
    fn bisect(&self, mut lo: f64, mut lo_err: f64, mut hi: f64) -> (f64, f64) {
        for _ in 0..REFINE_STEPS {
            let mid = 0.5 * (lo + hi);
            let Some(mid_err) = self.mismatch(mid) else {
                break;
            };
            if mid_err.signum() == lo_err.signum() {
                lo = mid;
                lo_err = mid_err;
            } else {
                hi = mid;
            }
        }
        (lo, lo_err)
    }
}
