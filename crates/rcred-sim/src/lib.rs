mod measure;
mod ngspice;

pub use measure::{Measurements, parse_measurements};
pub use ngspice::{SimulationResult, check_ngspice_installed, run_ngspice_captured};

use std::io::Write;

use anyhow::Result;
use rcred_netlist::{ComponentKind, Ladder, format_sig, is_ground};
use rcred_reduce::detect::SHORT_TOLERANCE;
use rcred_reduce::{ReducedModel, model_records};
use serde::Deserialize;

/// Stimulus and analysis settings of a comparison deck.
///
/// Times are SPICE magnitude tokens and are written verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeckParams {
    pub vdd: f64,
    /// Driver resistance in front of both branches.
    pub rdrv: f64,
    pub rise: String,
    pub fall: String,
    pub width: String,
    pub period: String,
    pub tstep: String,
    pub tstop: String,
}

impl Default for DeckParams {
    fn default() -> Self {
        Self {
            vdd: 1.0,
            rdrv: 100.0,
            rise: "1p".into(),
            fall: "1p".into(),
            width: "50p".into(),
            period: "100p".into(),
            tstep: "1p".into(),
            tstop: "2n".into(),
        }
    }
}

/// Zero-ohm golden resistors are written with this value.
const SHORT_VALUE: &str = "1m";

// Generate a golden-vs-reduced comparison deck
pub fn gen_deck(
    golden: &Ladder,
    model: &ReducedModel,
    params: &DeckParams,
    out: &mut impl Write,
) -> Result<()> {
    let kind = model.kind();
    let (records, golden_out) = golden_records(golden);
    let reduced_internal: Vec<String> = (1..=kind.stages()).map(|i| format!("np{i}")).collect();
    let reduced_out = reduced_internal.last().map_or("np0", String::as_str);

    writeln!(out, "* golden network vs reduced {kind}")?;
    writeln!(out, ".param VDD={}", format_sig(params.vdd))?;
    writeln!(
        out,
        "VSTEP in 0 PULSE(0 'VDD' 0 {} {} {} {})",
        params.rise, params.fall, params.width, params.period
    )?;

    writeln!(out)?;
    writeln!(out, "* --- golden network ---")?;
    writeln!(out, "RDRV_G in {} {}", golden_node(golden), format_sig(params.rdrv))?;
    for record in &records {
        writeln!(out, "{record}")?;
    }

    writeln!(out)?;
    writeln!(out, "* --- reduced {kind} ---")?;
    writeln!(out, "RDRV_P in np0 {}", format_sig(params.rdrv))?;
    for record in model_records(model, "np0", &reduced_internal) {
        writeln!(out, "{record}")?;
    }

    writeln!(out)?;
    writeln!(out, ".tran {} {}", params.tstep, params.tstop)?;
    for (label, node) in [("golden", golden_out.as_str()), ("reduced", reduced_out)] {
        writeln!(
            out,
            ".measure tran t50_{label} TRIG v(in) VAL='VDD/2' RISE=1 TARG v({node}) VAL='VDD/2' RISE=1"
        )?;
    }
    writeln!(out, ".probe v(in) v({golden_out}) v({reduced_out})")?;
    writeln!(out, ".end")?;
    Ok(())
}

/// Entry node of the golden branch.
fn golden_node(ladder: &Ladder) -> String {
    prefixed(ladder.entry_node().unwrap_or("n0"))
}

fn prefixed(node: &str) -> String {
    if is_ground(node) {
        "0".to_string()
    } else {
        format!("g_{node}")
    }
}

/// Golden branch records and the branch's far-end node.
///
/// Ladders without node names get `n<i>` nodes in array order.
fn golden_records(ladder: &Ladder) -> (Vec<String>, String) {
    let mut records = Vec::with_capacity(ladder.len());
    let mut position = 0usize;
    for component in ladder.components() {
        let (a, b) = match &component.nodes {
            Some((a, b)) => (prefixed(a), prefixed(b)),
            None => match component.kind {
                ComponentKind::Capacitor => (prefixed(&format!("n{position}")), "0".to_string()),
                ComponentKind::Resistor => {
                    position += 1;
                    (
                        prefixed(&format!("n{}", position - 1)),
                        prefixed(&format!("n{position}")),
                    )
                }
            },
        };

        let value = match component.kind {
            ComponentKind::Capacitor if component.value <= 0.0 => continue,
            ComponentKind::Resistor if component.value.abs() < SHORT_TOLERANCE => {
                SHORT_VALUE.to_string()
            }
            _ => format_sig(component.value),
        };
        records.push(format!("{}_g {a} {b} {value}", component.name));
    }

    let far = ladder
        .node_path()
        .last()
        .map_or_else(|| golden_node(ladder), |n| prefixed(n));
    (records, far)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcred_netlist::parse;
    use rcred_reduce::Provenance;

    fn deck(ladder: &Ladder, model: &ReducedModel) -> String {
        let mut buf = Vec::new();
        gen_deck(ladder, model, &DeckParams::default(), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_named_ladder_deck() {
        let netlist = parse("C1 a 0 1p\nR1 a b 0\nC2 b 0 0\nR2 b c 10\nC3 c 0 3p\n");
        let model = ReducedModel::Pi {
            r1: 10.0,
            c1: 1e-12,
            c2: 3e-12,
            provenance: Provenance::Exact,
        };
        insta::assert_snapshot!(deck(&netlist.ladder, &model), @r"
        * golden network vs reduced pi
        .param VDD=1
        VSTEP in 0 PULSE(0 'VDD' 0 1p 1p 50p 100p)

        * --- golden network ---
        RDRV_G in g_a 100
        C1_g g_a 0 1e-12
        R1_g g_a g_b 1m
        R2_g g_b g_c 10
        C3_g g_c 0 3e-12

        * --- reduced pi ---
        RDRV_P in np0 100
        Cred1 np0 0 1e-12
        Rred1 np0 np1 10
        Cred2 np1 0 3e-12

        .tran 1p 2n
        .measure tran t50_golden TRIG v(in) VAL='VDD/2' RISE=1 TARG v(g_c) VAL='VDD/2' RISE=1
        .measure tran t50_reduced TRIG v(in) VAL='VDD/2' RISE=1 TARG v(np1) VAL='VDD/2' RISE=1
        .probe v(in) v(g_c) v(np1)
        .end
        ");
    }

    #[test]
    fn test_array_ladder_nodes() {
        let ladder = Ladder::from_values(&[10.0, 20.0], &[1e-12, 2e-12, 3e-12]);
        let model = ReducedModel::DoublePi {
            r1: 10.0,
            r2: 20.0,
            c1: 1e-12,
            c2: 2e-12,
            c3: 3e-12,
            provenance: Provenance::Exact,
        };
        let text = deck(&ladder, &model);
        assert!(text.contains("RDRV_G in g_n0 100\n"));
        assert!(text.contains("C1_g g_n0 0 1e-12\n"));
        assert!(text.contains("R1_g g_n0 g_n1 10\n"));
        assert!(text.contains("C2_g g_n1 0 2e-12\n"));
        assert!(text.contains("R2_g g_n1 g_n2 20\n"));
        assert!(text.contains("C3_g g_n2 0 3e-12\n"));
        assert!(text.contains("TARG v(g_n2)"));
        assert!(text.contains("Rred2 np1 np2 20\n"));
        assert!(text.contains("TARG v(np2)"));
    }

    #[test]
    fn test_default_params() {
        let params = DeckParams {
            vdd: 1.8,
            ..Default::default()
        };
        assert_eq!(params.rdrv, 100.0);
        assert_eq!(params.tstop, "2n");
    }
}
