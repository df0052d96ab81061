use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use log::debug;
use rcred_netlist::format_sig;
use rcred_reduce::reduce;
use rcred_sim::{gen_deck, parse_measurements, run_ngspice_captured};

use crate::config::{ModelArg, RcredConfig};
use crate::input::{Input, LadderArgs};
use crate::output::write_atomic;

#[derive(Args, Debug)]
#[command(about = "Run golden and reduced networks side by side in ngspice")]
pub struct SimArgs {
    #[command(flatten)]
    pub input: LadderArgs,

    /// Reduced topology [default: double-pi, or reduce.model from the config]
    #[arg(long, value_enum)]
    pub model: Option<ModelArg>,

    /// Always fit, even when the ladder already is a Pi/Double-Pi
    #[arg(long)]
    pub no_exact: bool,

    /// Driver resistance in front of both branches [default: deck.rdrv]
    #[arg(long, value_name = "OHMS")]
    pub rdrv: Option<f64>,

    /// Step amplitude [default: deck.vdd]
    #[arg(long, value_name = "VOLTS")]
    pub vdd: Option<f64>,

    /// Write the deck to a file and exit (ngspice is not run)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath, conflicts_with = "netlist")]
    pub output: Option<PathBuf>,

    /// Print the deck to stdout (skip running ngspice)
    #[arg(long = "netlist")]
    pub netlist: bool,
}

pub fn execute(args: SimArgs, config: &RcredConfig) -> Result<()> {
    let input = args.input.load()?;
    let options = config.reduce.options(args.model, args.no_exact);
    let graph = match &input {
        Input::Netlist { netlist, .. } => netlist.graph.as_ref(),
        Input::Arrays { .. } => None,
    };
    let reduction = reduce(input.ladder(), graph, &options)?;

    let mut params = config.deck.clone();
    if let Some(rdrv) = args.rdrv {
        params.rdrv = rdrv;
    }
    if let Some(vdd) = args.vdd {
        params.vdd = vdd;
    }

    // Generate the deck into an in-memory buffer
    let mut buf: Vec<u8> = Vec::new();
    gen_deck(input.ladder(), &reduction.model, &params, &mut buf)?;

    // --netlist: print to stdout and return (skip ngspice)
    if args.netlist {
        std::io::stdout().write_all(&buf)?;
        return Ok(());
    }

    // --output: write the deck to file and return (skip ngspice)
    if let Some(output_path) = &args.output {
        write_atomic(output_path, &String::from_utf8_lossy(&buf))?;
        return Ok(());
    }

    let dir = tempfile::tempdir()?;
    let mut tmp = tempfile::Builder::new().suffix(".cir").tempfile_in(dir.path())?;
    tmp.write_all(&buf)?;
    tmp.flush()?;
    let cir_path = tmp.into_temp_path();

    let result = run_ngspice_captured(cir_path.as_ref(), dir.path())?;
    debug!("ngspice output:\n{}", result.output);
    if !result.success {
        bail!("ngspice simulation failed\n{}", result.output.trim_end());
    }

    let measured = parse_measurements(&result.output);
    let (Some(golden), Some(reduced)) = (measured.golden, measured.reduced) else {
        bail!(
            "ngspice did not report both 50% delays\n{}",
            result.output.trim_end()
        );
    };

    println!("t50_golden={}", format_sig(golden));
    println!("t50_reduced={}", format_sig(reduced));
    match measured.relative_error() {
        Some(err) => println!("relative_error={}", format_sig(err)),
        None => println!("relative_error=undefined"),
    }
    eprintln!("{} {} comparison finished", "✓".green(), reduction.model.kind());
    Ok(())
}
