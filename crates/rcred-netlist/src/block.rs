use std::collections::BTreeSet;
use std::ops::Range;

use crate::NetlistError;
use crate::component::ComponentKind;
use crate::graph::is_ground;

/// Minimum number of consecutive R/C records that make up an RC block.
const MIN_RUN: usize = 2;

/// The contiguous run of R/C records that a reduced model replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct RcBlock {
    /// 0-based line range within the document.
    pub lines: Range<usize>,
    /// Non-ground node of the first record in the block.
    pub entry_node: String,
    /// Every node name used anywhere in the document.
    pub taken_nodes: BTreeSet<String>,
}

impl RcBlock {
    /// `count` node names of the form `<entry>_<k>` not already in use.
    pub fn fresh_nodes(&self, count: usize) -> Vec<String> {
        let mut fresh = Vec::with_capacity(count);
        let mut k = 1usize;
        while fresh.len() < count {
            let candidate = format!("{}_{k}", self.entry_node);
            if !self.taken_nodes.contains(&candidate) {
                fresh.push(candidate);
            }
            k += 1;
        }
        fresh
    }
}

/// Whether a line is a resistor or capacitor element record.
pub fn is_rc_record(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .and_then(ComponentKind::from_designator)
        .is_some()
}

/// Find the RC block: the first run of at least two R/C records.
///
/// The block opens at the first R/C record. Non-R/C lines met before the
/// block holds two records stay inside it; the first non-R/C line after that
/// closes it.
pub fn locate_rc_block(text: &str) -> Option<RcBlock> {
    let lines: Vec<&str> = text.lines().collect();

    let mut start = None;
    let mut records = 0usize;
    let mut end = lines.len();
    for (i, line) in lines.iter().enumerate() {
        if is_rc_record(line) {
            start.get_or_insert(i);
            records += 1;
        } else if records >= MIN_RUN {
            end = i;
            break;
        }
    }
    if records < MIN_RUN {
        return None;
    }
    let range = start?..end;

    let mut fields = lines[range.start].split_whitespace().skip(1);
    let (a, b) = (fields.next()?, fields.next()?);
    let entry_node = if is_ground(a) { b } else { a }.to_string();

    Some(RcBlock {
        lines: range,
        entry_node,
        taken_nodes: document_nodes(&lines),
    })
}

/// Replace the block's lines with `records`, keeping everything else verbatim.
pub fn splice(text: &str, block: &RcBlock, records: &[String]) -> Result<String, NetlistError> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    if block.lines.end > lines.len() || block.lines.is_empty() {
        return Err(NetlistError::NoRcBlock);
    }

    let mut out = String::with_capacity(text.len());
    for line in &lines[..block.lines.start] {
        out.push_str(line);
    }
    for record in records {
        out.push_str(record);
        out.push('\n');
    }
    for line in &lines[block.lines.end..] {
        out.push_str(line);
    }
    Ok(out)
}

/// Node-position fields of every element line (comments and directives skipped).
fn document_nodes(lines: &[&str]) -> BTreeSet<String> {
    lines
        .iter()
        .map(|l| l.trim_start())
        .filter(|l| !l.is_empty() && !l.starts_with(['*', '.', '+']))
        .flat_map(|l| l.split_whitespace().skip(1).take(2))
        .map(str::to_string)
        .collect()
}
