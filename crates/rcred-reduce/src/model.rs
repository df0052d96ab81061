use std::fmt;

/// Which reduced topology to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Pi,
    DoublePi,
}

impl ModelKind {
    /// Number of series resistors in the reduced model.
    pub fn stages(&self) -> usize {
        match self {
            Self::Pi => 1,
            Self::DoublePi => 2,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pi => write!(f, "pi"),
            Self::DoublePi => write!(f, "double-pi"),
        }
    }
}

/// How a reduced model was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Provenance {
    /// The network already decomposes into this structure.
    Exact,
    /// Moment-matched. `residual` is `f64::INFINITY` when undefined.
    Fitted { residual: f64, used_fallback: bool },
}

/// A Pi or Double-Pi equivalent.
///
/// `c1` always sits at the driving point. Every value is strictly positive;
/// producers substitute a canonical partition rather than return anything
/// else.
#[derive(Debug, Clone, PartialEq)]
pub enum ReducedModel {
    Pi {
        r1: f64,
        c1: f64,
        c2: f64,
        provenance: Provenance,
    },
    DoublePi {
        r1: f64,
        r2: f64,
        c1: f64,
        c2: f64,
        c3: f64,
        provenance: Provenance,
    },
}

impl ReducedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::Pi { .. } => ModelKind::Pi,
            Self::DoublePi { .. } => ModelKind::DoublePi,
        }
    }

    pub fn provenance(&self) -> Provenance {
        match self {
            Self::Pi { provenance, .. } | Self::DoublePi { provenance, .. } => *provenance,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.provenance() == Provenance::Exact
    }

    pub fn used_fallback(&self) -> bool {
        matches!(
            self.provenance(),
            Provenance::Fitted {
                used_fallback: true,
                ..
            }
        )
    }

    /// Fit residual; `None` for exact models.
    pub fn residual(&self) -> Option<f64> {
        match self.provenance() {
            Provenance::Exact => None,
            Provenance::Fitted { residual, .. } => Some(residual),
        }
    }

    /// Series resistors, driving point first.
    pub fn resistors(&self) -> Vec<f64> {
        match self {
            Self::Pi { r1, .. } => vec![*r1],
            Self::DoublePi { r1, r2, .. } => vec![*r1, *r2],
        }
    }

    /// Shunt capacitors, driving point first.
    pub fn capacitors(&self) -> Vec<f64> {
        match self {
            Self::Pi { c1, c2, .. } => vec![*c1, *c2],
            Self::DoublePi { c1, c2, c3, .. } => vec![*c1, *c2, *c3],
        }
    }

    /// All values finite and strictly positive.
    pub fn is_passive(&self) -> bool {
        self.resistors()
            .into_iter()
            .chain(self.capacitors())
            .all(|v| v.is_finite() && v > 0.0)
    }
}
