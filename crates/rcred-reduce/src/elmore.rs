use rcred_netlist::{ComponentKind, Ladder};

/// First-order view of a ladder behind a driver resistance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElmoreSummary {
    /// Lumped load, `ΣC`.
    pub ceq: f64,
    /// Elmore delay `Σ C·R_up`, with `R_up` measured from the driver.
    pub elmore: f64,
    /// `elmore / ceq`; `None` without positive capacitance.
    pub req: Option<f64>,
}

impl ElmoreSummary {
    pub fn of(ladder: &Ladder, rdrv: f64) -> Self {
        let mut upstream = rdrv;
        let mut ceq = 0.0;
        let mut elmore = 0.0;
        for component in ladder.components() {
            match component.kind {
                ComponentKind::Resistor => upstream += component.value,
                ComponentKind::Capacitor => {
                    ceq += component.value;
                    elmore += component.value * upstream;
                }
            }
        }
        Self {
            ceq,
            elmore,
            req: (ceq > 0.0).then(|| elmore / ceq),
        }
    }
}
