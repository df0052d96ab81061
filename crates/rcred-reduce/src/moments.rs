//! Driving-point admittance moments of an RC ladder.
//!
//! The admittance is truncated to `Y(s) = y1 s + y2 s^2 + ... + y5 s^5` and
//! built up from the far end: a shunt capacitor adds to `y1`, a series
//! resistor maps `Y` to `Y / (1 + R Y)` expanded to fifth order.

use rcred_netlist::{ComponentKind, Ladder};

/// Number of admittance moments tracked.
pub const ORDER: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MomentVector([f64; ORDER]);

impl MomentVector {
    pub fn new(y: [f64; ORDER]) -> Self {
        Self(y)
    }

    /// Coefficient of `s^k`, `k` in `1..=5`.
    ///
    /// # Panics
    ///
    /// Panics if `k` is outside `1..=5`.
    pub fn y(&self, k: usize) -> f64 {
        self.0[k - 1]
    }

    pub fn as_array(&self) -> [f64; ORDER] {
        self.0
    }

    /// Admittance after a grounded capacitor at the current node.
    pub fn with_capacitor(self, c: f64) -> Self {
        let [y1, y2, y3, y4, y5] = self.0;
        Self([y1 + c, y2, y3, y4, y5])
    }

    /// Admittance seen through a series resistor toward the driver.
    ///
    /// Every right-hand side uses the incoming coefficients; `R = 0` is the
    /// identity.
    pub fn through_resistor(self, r: f64) -> Self {
        let [y1, y2, y3, y4, y5] = self.0;
        let r2 = r * r;
        let r3 = r2 * r;
        let r4 = r3 * r;

        Self([
            y1,
            y2 - r * y1 * y1,
            y3 - 2.0 * r * y1 * y2 + r2 * y1.powi(3),
            y4 - r * (2.0 * y1 * y3 + y2 * y2) + 3.0 * r2 * y1 * y1 * y2 - r3 * y1.powi(4),
            y5 - r * (2.0 * y1 * y4 + 2.0 * y2 * y3)
                + r2 * (3.0 * y1 * y1 * y3 + 3.0 * y1 * y2 * y2)
                - 4.0 * r3 * y1.powi(3) * y2
                + r4 * y1.powi(5),
        ])
    }
}

/// Moments of `ladder`, traversing from the far end to the driving point.
pub fn compute_moments(ladder: &Ladder) -> MomentVector {
    ladder
        .components()
        .iter()
        .rev()
        .fold(MomentVector::default(), |y, component| match component.kind {
            ComponentKind::Capacitor => y.with_capacitor(component.value),
            ComponentKind::Resistor => y.through_resistor(component.value),
        })
}
