//! Netlist records and the key=value report for a reduced model.

use std::fmt;

use rcred_netlist::{NetlistError, RcBlock, format_sig, splice};

use crate::Reduction;
use crate::elmore::ElmoreSummary;
use crate::model::{Provenance, ReducedModel};

/// Element records for `model`, driving point first.
///
/// The chain starts at `entry` and continues through `internal`, which must
/// hold at least one name per stage.
///
/// # Panics
///
/// Panics if `internal` is shorter than the model's stage count.
pub fn model_records(model: &ReducedModel, entry: &str, internal: &[String]) -> Vec<String> {
    let nodes: Vec<&str> = std::iter::once(entry)
        .chain(internal.iter().map(String::as_str))
        .collect();
    let resistors = model.resistors();

    let mut records = Vec::with_capacity(resistors.len() * 2 + 1);
    for (i, c) in model.capacitors().into_iter().enumerate() {
        records.push(format!("Cred{} {} 0 {}", i + 1, nodes[i], format_sig(c)));
        if let Some(&r) = resistors.get(i) {
            records.push(format!(
                "Rred{} {} {} {}",
                i + 1,
                nodes[i],
                nodes[i + 1],
                format_sig(r)
            ));
        }
    }
    records
}

/// Replace `block` of `text` with the records of `model`.
///
/// `model` must be the reduction of the block's own records. The block's entry
/// node is kept and internal nodes get fresh names that do not clash with
/// anything else in the document.
pub fn splice_model(
    text: &str,
    block: &RcBlock,
    model: &ReducedModel,
) -> Result<String, NetlistError> {
    let internal = block.fresh_nodes(model.kind().stages());
    let records = model_records(model, &block.entry_node, &internal);
    splice(text, block, &records)
}

/// Human-readable dump of a reduction, one `key=value` per line.
pub struct Report<'a> {
    reduction: &'a Reduction,
    skipped: Option<usize>,
    elmore: Option<ElmoreSummary>,
}

impl<'a> Report<'a> {
    pub fn new(reduction: &'a Reduction) -> Self {
        Self {
            reduction,
            skipped: None,
            elmore: None,
        }
    }

    /// Include the parser's skipped-record count.
    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = Some(skipped);
        self
    }

    pub fn with_elmore(mut self, elmore: ElmoreSummary) -> Self {
        self.elmore = Some(elmore);
        self
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = &self.reduction.model;
        writeln!(f, "model={}", model.kind())?;
        match model.provenance() {
            Provenance::Exact => {
                writeln!(f, "provenance=exact")?;
                writeln!(f, "used_fallback=false")?;
            }
            Provenance::Fitted {
                residual,
                used_fallback,
            } => {
                writeln!(f, "provenance=fitted")?;
                writeln!(f, "used_fallback={used_fallback}")?;
                writeln!(f, "residual={}", format_sig(residual))?;
            }
        }

        for (k, y) in self.reduction.moments.as_array().iter().enumerate() {
            writeln!(f, "y{}={}", k + 1, format_sig(*y))?;
        }
        for (i, r) in model.resistors().iter().enumerate() {
            writeln!(f, "R{}={}", i + 1, format_sig(*r))?;
        }
        for (i, c) in model.capacitors().iter().enumerate() {
            writeln!(f, "C{}={}", i + 1, format_sig(*c))?;
        }

        if let Some(skipped) = self.skipped {
            writeln!(f, "skipped={skipped}")?;
        }
        if let Some(elmore) = &self.elmore {
            writeln!(f, "ceq={}", format_sig(elmore.ceq))?;
            writeln!(f, "elmore={}", format_sig(elmore.elmore))?;
            if let Some(req) = elmore.req {
                writeln!(f, "req={}", format_sig(req))?;
            }
        }
        Ok(())
    }
}
