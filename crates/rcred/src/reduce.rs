use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use rcred_netlist::NetlistError;
use rcred_reduce::{ElmoreSummary, Report, model_records, reduce, splice_model};

use crate::config::{ModelArg, RcredConfig};
use crate::input::{Input, LadderArgs};
use crate::output::{emit, write_atomic};

#[derive(Args, Debug)]
#[command(about = "Reduce an RC ladder and splice the equivalent into the netlist")]
pub struct ReduceArgs {
    #[command(flatten)]
    pub input: LadderArgs,

    /// Reduced topology [default: double-pi, or reduce.model from the config]
    #[arg(long, value_enum)]
    pub model: Option<ModelArg>,

    /// Always fit, even when the ladder already is a Pi/Double-Pi
    #[arg(long)]
    pub no_exact: bool,

    /// Driver resistance for the Elmore summary [default: deck.rdrv]
    #[arg(long, value_name = "OHMS")]
    pub rdrv: Option<f64>,

    /// Write the reduced netlist (or records) here instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Write the key=value report here instead of stderr
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub report: Option<PathBuf>,
}

pub fn execute(args: ReduceArgs, config: &RcredConfig) -> Result<()> {
    let input = args.input.load()?;
    let options = config.reduce.options(args.model, args.no_exact);
    let rdrv = args.rdrv.unwrap_or(config.deck.rdrv);

    let (ladder, graph) = match &input {
        Input::Netlist { netlist, .. } => (&netlist.ladder, netlist.graph.as_ref()),
        Input::Arrays { ladder } => (ladder, None),
    };
    let reduction = reduce(ladder, graph, &options)?;

    if reduction.model.used_fallback() {
        eprintln!(
            "{} no passive {} matches the moments; using the canonical partition",
            "Warning:".yellow(),
            reduction.model.kind()
        );
    }

    let reduced = match &input {
        Input::Netlist { text, block, .. } => {
            let block = block.as_ref().ok_or(NetlistError::NoRcBlock)?;
            splice_model(text, block, &reduction.model)
                .context("Failed to splice the reduced model into the netlist")?
        }
        Input::Arrays { .. } => {
            let internal: Vec<String> = (1..=options.kind.stages())
                .map(|i| format!("n{i}"))
                .collect();
            let mut records = model_records(&reduction.model, "n0", &internal).join("\n");
            records.push('\n');
            records
        }
    };

    let mut report = Report::new(&reduction).with_elmore(ElmoreSummary::of(ladder, rdrv));
    if let Input::Netlist { netlist, .. } = &input {
        report = report.with_skipped(netlist.report.skipped_count());
    }
    let report = report.to_string();

    emit(args.output.as_deref(), &reduced)?;
    match &args.report {
        Some(path) => write_atomic(path, &report)?,
        None => eprint!("{report}"),
    }
    Ok(())
}
