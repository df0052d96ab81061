//! Netlist handling for RC interconnect reduction.
//!
//! The crate turns SPICE-style text into an ordered [`Ladder`] of resistors and
//! capacitors, optionally with a [`NodeGraph`] when every record carries node
//! names, and provides the primitives needed to splice reduced records back
//! into the original document.
//!
//! ```
//! let netlist = rcred_netlist::parse("C1 in 0 1p\nR1 in out 10\nC2 out 0 2p\n");
//! assert_eq!(netlist.ladder.len(), 3);
//! assert!(netlist.graph.is_some());
//! assert_eq!(netlist.report.skipped_count(), 0);
//! ```

mod block;
mod component;
mod graph;
mod parse;
mod value;

pub use block::{RcBlock, is_rc_record, locate_rc_block, splice};
pub use component::{Component, ComponentKind, Ladder};
pub use graph::{NodeGraph, is_ground};
pub use parse::{Netlist, ParseReport, SkipReason, SkippedLine, parse, parse_block, parse_file};
pub use value::{format_sig, parse_magnitude, parse_value_list};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum NetlistError {
    #[error("Failed to read netlist {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid magnitude '{input}'")]
    InvalidMagnitude { input: String },
    #[error("No run of two or more R/C records found")]
    NoRcBlock,
}
