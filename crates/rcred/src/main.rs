use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use std::path::PathBuf;

mod config;
mod input;
mod moments;
mod output;
mod reduce;
mod sim;

#[derive(Parser)]
#[command(name = "rcred")]
#[command(about = "Reduce RC interconnect ladders to Pi and Double-Pi models", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    /// Configuration file. Defaults to ./rcred.toml when present.
    #[arg(long, global = true, value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the driving-point admittance moments of a ladder
    #[command(alias = "m")]
    Moments(moments::MomentsArgs),

    /// Reduce a ladder to a Pi or Double-Pi model
    #[command(alias = "r")]
    Reduce(reduce::ReduceArgs),

    /// Compare golden and reduced networks in ngspice
    Sim(sim::SimArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on -v / --debug (overridden by RUST_LOG)
    let env = if cli.debug {
        Env::default().default_filter_or("trace")
    } else if cli.verbose {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Moments(args) => moments::execute(args),
        Commands::Reduce(args) => reduce::execute(args, &config),
        Commands::Sim(args) => sim::execute(args, &config),
    }
}
