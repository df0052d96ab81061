use std::fs;
use std::path::Path;

use log::debug;

use crate::NetlistError;
use crate::block::RcBlock;
use crate::component::{Component, ComponentKind, Ladder};
use crate::graph::NodeGraph;
use crate::value::parse_magnitude;

/// Why a component record was dropped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("expected name, two nodes and a value, found {0} field(s)")]
    TooFewFields(usize),
    #[error("unparseable magnitude '{0}'")]
    BadMagnitude(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number in the source text.
    pub line: usize,
    pub text: String,
    pub reason: SkipReason,
}

/// Diagnostics collected while parsing. Never fatal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub skipped: Vec<SkippedLine>,
}

impl ParseReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Result of parsing a netlist document.
#[derive(Debug, Clone)]
pub struct Netlist {
    pub ladder: Ladder,
    /// Present only when every component carries two node names.
    pub graph: Option<NodeGraph>,
    pub report: ParseReport,
}

/// Parse R/C records out of SPICE-style text.
///
/// Lines whose first field does not start with `R` or `C` (comments,
/// directives, other element types) are ignored. Component records with fewer
/// than four fields or an unparseable value are skipped and recorded in the
/// [`ParseReport`]. File order is preserved.
pub fn parse(text: &str) -> Netlist {
    parse_lines(text.lines().enumerate())
}

/// Parse only the lines of `block`. Line numbers stay document-relative.
pub fn parse_block(text: &str, block: &RcBlock) -> Netlist {
    parse_lines(
        text.lines()
            .enumerate()
            .skip(block.lines.start)
            .take(block.lines.len()),
    )
}

fn parse_lines<'a>(lines: impl Iterator<Item = (usize, &'a str)>) -> Netlist {
    let mut components = Vec::new();
    let mut report = ParseReport::default();

    for (i, raw) in lines {
        let line = strip_inline_comment(raw).trim();
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some(name) = fields.first() else {
            continue;
        };
        let Some(kind) = ComponentKind::from_designator(name) else {
            continue;
        };

        let skip = |reason: SkipReason| {
            debug!("Skipping line {}: {reason}: {raw}", i + 1);
            SkippedLine {
                line: i + 1,
                text: raw.to_string(),
                reason,
            }
        };

        if fields.len() < 4 {
            report.skipped.push(skip(SkipReason::TooFewFields(fields.len())));
            continue;
        }

        let value = match parse_magnitude(fields[3]) {
            Ok(value) => value,
            Err(_) => {
                report
                    .skipped
                    .push(skip(SkipReason::BadMagnitude(fields[3].to_string())));
                continue;
            }
        };

        components.push(Component {
            name: name.to_string(),
            kind,
            value,
            nodes: Some((fields[1].to_string(), fields[2].to_string())),
        });
    }

    let ladder = Ladder::new(components);
    let graph = NodeGraph::build(&ladder);
    debug!(
        "Parsed {} component(s), {} skipped",
        ladder.len(),
        report.skipped_count()
    );

    Netlist {
        ladder,
        graph,
        report,
    }
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<Netlist, NetlistError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| NetlistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse(&text))
}

/// Drop a trailing `;` or `$` comment.
fn strip_inline_comment(line: &str) -> &str {
    match line.find([';', '$']) {
        Some(pos) => &line[..pos],
        None => line,
    }
}
