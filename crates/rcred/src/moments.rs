use anyhow::Result;
use clap::Args;
use rcred_netlist::format_sig;
use rcred_reduce::compute_moments;

use crate::input::{Input, LadderArgs};

#[derive(Args, Debug)]
#[command(about = "Print the five driving-point admittance moments y1..y5")]
pub struct MomentsArgs {
    #[command(flatten)]
    pub input: LadderArgs,
}

pub fn execute(args: MomentsArgs) -> Result<()> {
    let input = args.input.load()?;
    let moments = compute_moments(input.ladder());

    for (k, y) in moments.as_array().iter().enumerate() {
        println!("y{}={}", k + 1, format_sig(*y));
    }
    if let Input::Netlist { netlist, .. } = &input {
        println!("skipped={}", netlist.report.skipped_count());
    }
    Ok(())
}
