//! Reduction of RC ladders to Pi and Double-Pi equivalents.
//!
//! The pipeline computes the driving-point admittance moments of a ladder,
//! tries to recognise an exact Pi/Double-Pi structure, and otherwise fits a
//! passive model to the moments:
//!
//! ```
//! use rcred_netlist::Ladder;
//! use rcred_reduce::{ModelKind, ReduceOptions, reduce};
//!
//! let ladder = Ladder::from_values(&[10.0, 20.0, 30.0], &[1e-12, 2e-12, 3e-12, 4e-12]);
//! let reduction = reduce(&ladder, None, &ReduceOptions::default()).unwrap();
//! assert_eq!(reduction.model.kind(), ModelKind::DoublePi);
//! assert!(reduction.model.is_passive());
//! ```

pub mod detect;
pub mod elmore;
pub mod emit;
mod model;
pub mod moments;
pub mod optimize;
pub mod pi;

pub use detect::detect_exact;
pub use elmore::ElmoreSummary;
pub use emit::{Report, model_records, splice_model};
pub use model::{ModelKind, Provenance, ReducedModel};
pub use moments::{MomentVector, compute_moments};
pub use optimize::{Totals, fit_symmetric_double_pi};

use log::debug;
use rcred_netlist::{Ladder, NodeGraph};

#[derive(Debug, thiserror::Error)]
pub enum ReduceError {
    #[error("Network has no resistors or capacitors to reduce")]
    EmptyLadder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceOptions {
    pub kind: ModelKind,
    /// Try the exact-topology detector before fitting.
    pub try_exact: bool,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            kind: ModelKind::DoublePi,
            try_exact: true,
        }
    }
}

/// Everything the pipeline derives from one ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub moments: MomentVector,
    pub totals: Totals,
    pub model: ReducedModel,
}

/// Run the full reduction: moments, exact detection, then fitting.
pub fn reduce(
    ladder: &Ladder,
    graph: Option<&NodeGraph>,
    options: &ReduceOptions,
) -> Result<Reduction, ReduceError> {
    if ladder.is_empty() {
        return Err(ReduceError::EmptyLadder);
    }

    let moments = compute_moments(ladder);
    let totals = Totals::of(ladder);

    let exact = if options.try_exact {
        detect_exact(ladder, graph, options.kind)
    } else {
        None
    };

    let model = match exact {
        Some(model) => {
            debug!("Exact {} structure recognised", options.kind);
            model
        }
        None => match options.kind {
            ModelKind::Pi => pi::fit_pi(&moments, totals),
            ModelKind::DoublePi => {
                fit_symmetric_double_pi(totals, moments.y(2), moments.y(3))
            }
        },
    };

    Ok(Reduction {
        moments,
        totals,
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcred_netlist::parse;

    #[test]
    fn test_empty_ladder_is_an_error() {
        let err = reduce(&Ladder::default(), None, &ReduceOptions::default()).unwrap_err();
        assert!(matches!(err, ReduceError::EmptyLadder));
    }

    #[test]
    fn test_three_resistor_ladder_is_fitted() {
        let ladder = Ladder::from_values(&[10.0, 20.0, 30.0], &[1e-12, 2e-12, 3e-12, 4e-12]);
        let reduction = reduce(&ladder, None, &ReduceOptions::default()).unwrap();
        assert!(!reduction.model.is_exact());
        assert!(reduction.model.is_passive());
        assert_eq!(reduction.model.resistors().len(), 2);
        assert_eq!(reduction.model.capacitors().len(), 3);
    }

    #[test]
    fn test_exact_double_pi_short_circuits_fitting() {
        let netlist = parse(
            "C1 a 0 1p\nR1 a b 10\nC2 b 0 2p\nR2 b b2 0\nC3 b2 0 1p\nR3 b2 c 20\nC4 c 0 3p\n",
        );
        let reduction = reduce(
            &netlist.ladder,
            netlist.graph.as_ref(),
            &ReduceOptions::default(),
        )
        .unwrap();
        assert!(reduction.model.is_exact());
        assert_eq!(reduction.model.resistors(), vec![10.0, 20.0]);
    }

    #[test]
    fn test_star_driven_from_hub_is_fitted() {
        let netlist = parse("C1 hub 0 1p\nR1 hub a 10\nR2 hub b 10\nC2 a 0 1p\nC3 b 0 1p\n");
        let reduction = reduce(
            &netlist.ladder,
            netlist.graph.as_ref(),
            &ReduceOptions::default(),
        )
        .unwrap();
        assert!(!reduction.model.is_exact());
        assert!(reduction.model.is_passive());
    }

    #[test]
    fn test_no_exact_option_forces_fit() {
        let netlist = parse("C1 a 0 1p\nR1 a b 10\nC2 b 0 2p\n");
        let options = ReduceOptions {
            kind: ModelKind::Pi,
            try_exact: false,
        };
        let reduction = reduce(&netlist.ladder, netlist.graph.as_ref(), &options).unwrap();
        assert!(!reduction.model.is_exact());
        assert_eq!(reduction.model.kind(), ModelKind::Pi);
    }
}
