use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use rcred_netlist::{
    Ladder, Netlist, RcBlock, is_rc_record, locate_rc_block, parse, parse_block, parse_value_list,
};

/// Stand-in for an empty capacitor array, in farads.
const EMPTY_CAPACITANCE: f64 = 1e-15;

/// Where the ladder comes from: a netlist file or bare value arrays.
#[derive(Args, Debug)]
pub struct LadderArgs {
    /// SPICE-style netlist containing the RC ladder
    #[arg(
        value_name = "NETLIST",
        value_hint = clap::ValueHint::FilePath,
        required_unless_present_any = ["rs", "cs"]
    )]
    pub file: Option<PathBuf>,

    /// Comma-separated resistor values, driving point first (e.g. 10,20,1k)
    #[arg(long, value_name = "LIST", conflicts_with = "file")]
    pub rs: Option<String>,

    /// Comma-separated capacitor values, driving point first (e.g. 1p,2p,3p)
    #[arg(long, value_name = "LIST", conflicts_with = "file")]
    pub cs: Option<String>,
}

pub enum Input {
    /// `netlist` holds the records of `block` only, when a block exists.
    Netlist {
        text: String,
        netlist: Netlist,
        block: Option<RcBlock>,
    },
    Arrays { ladder: Ladder },
}

impl Input {
    pub fn ladder(&self) -> &Ladder {
        match self {
            Self::Netlist { netlist, .. } => &netlist.ladder,
            Self::Arrays { ladder } => ladder,
        }
    }
}

impl LadderArgs {
    pub fn load(&self) -> Result<Input> {
        if let Some(path) = &self.file {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read netlist {}", path.display()))?;
            let block = locate_rc_block(&text);
            let netlist = match &block {
                Some(block) => {
                    warn_outside(&text, block);
                    parse_block(&text, block)
                }
                None => parse(&text),
            };
            warn_skipped(&netlist);
            if netlist.ladder.is_empty() {
                bail!("No resistor or capacitor records found in {}", path.display());
            }
            return Ok(Input::Netlist {
                text,
                netlist,
                block,
            });
        }

        let rs = parse_list(self.rs.as_deref()).context("Invalid --rs list")?;
        let cs = parse_list(self.cs.as_deref()).context("Invalid --cs list")?;
        Ok(Input::Arrays {
            ladder: array_ladder(rs, cs)?,
        })
    }
}

fn parse_list(list: Option<&str>) -> Result<Vec<f64>> {
    Ok(match list {
        Some(list) => parse_value_list(list)?,
        None => Vec::new(),
    })
}

/// Ladder from value arrays; a missing side is replaced by a single
/// placeholder element.
fn array_ladder(mut rs: Vec<f64>, mut cs: Vec<f64>) -> Result<Ladder> {
    if rs.is_empty() && cs.is_empty() {
        bail!("Provide at least one value with --rs or --cs");
    }
    if rs.is_empty() {
        rs.push(0.0);
    }
    if cs.is_empty() {
        cs.push(EMPTY_CAPACITANCE);
    }
    Ok(Ladder::from_values(&rs, &cs))
}

/// R/C records after the block are not part of the reduction and are kept as is.
fn warn_outside(text: &str, block: &RcBlock) {
    let outside = text
        .lines()
        .enumerate()
        .filter(|(i, line)| !block.lines.contains(i) && is_rc_record(line))
        .count();
    if outside > 0 {
        eprintln!(
            "{} {outside} R/C record(s) outside lines {}-{} are left untouched",
            "Warning:".yellow(),
            block.lines.start + 1,
            block.lines.end
        );
    }
}

fn warn_skipped(netlist: &Netlist) {
    for skipped in &netlist.report.skipped {
        eprintln!(
            "{} line {}: {} (skipped)",
            "Warning:".yellow(),
            skipped.line,
            skipped.reason
        );
    }
}
