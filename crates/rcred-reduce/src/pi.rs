//! Closed-form Pi from the first three admittance moments.
//!
//! For `C1 - R1 - C2` driven at `C1`, `y1 = C1 + C2`, `y2 = -R1·C2²` and
//! `y3 = R1²·C2³`, which inverts to
//!
//! ```text
//! C2 = y2² / y3    C1 = y1 - C2    R1 = -y3² / y2³
//! ```

use log::{debug, info};

use crate::model::{Provenance, ReducedModel};
use crate::moments::MomentVector;
use crate::optimize::Totals;

/// Pi equivalent matching `y1..y3` exactly, or the canonical
/// `R1 = R`, `C1 = C2 = C / 2` split when the inversion is not passive.
pub fn fit_pi(moments: &MomentVector, totals: Totals) -> ReducedModel {
    let (y1, y2, y3) = (moments.y(1), moments.y(2), moments.y(3));

    let c2 = y2 * y2 / y3;
    let model = ReducedModel::Pi {
        r1: -(y3 * y3) / y2.powi(3),
        c1: y1 - c2,
        c2,
        provenance: Provenance::Fitted {
            residual: 0.0,
            used_fallback: false,
        },
    };
    if model.is_passive() {
        debug!("Pi from moments: {model:?}");
        return model;
    }

    info!("Moment Pi is not passive, using the canonical split");
    ReducedModel::Pi {
        r1: totals.resistance,
        c1: totals.capacitance / 2.0,
        c2: totals.capacitance / 2.0,
        provenance: Provenance::Fitted {
            residual: f64::INFINITY,
            used_fallback: true,
        },
    }
}
