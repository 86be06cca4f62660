use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The xsgen developers",
    version,
    about = "xsgen CLI - Drives cross-section library generation for a time-stepped reactor model and inspects cross-section libraries.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to run lattice physics jobs.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a case: step the reactor through its cycles and keep its cross sections current.
    Run(RunArgs),
    /// Evaluate one regeneration decision for a library and a set of XS IDs.
    Check(CheckArgs),
    /// List the XS IDs and payload sizes stored in a library file.
    Inspect(InspectArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the case file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override `lattice-physics.executable` from the case file.
    #[arg(short, long, value_name = "PATH")]
    pub executable: Option<PathBuf>,

    /// Override `lattice-physics.working-directory` from the case file.
    #[arg(short, long, value_name = "PATH")]
    pub working_directory: Option<PathBuf>,

    /// Override `genXS` from the case file (e.g. 'Neutron').
    #[arg(long, value_name = "KIND")]
    pub gen_xs: Option<String>,

    /// Set a specific setting, overriding the case file.
    /// Can be used multiple times. Example: -S nCycles=3
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// The attached library. Without it the check runs as if no library were loaded.
    #[arg(short, long, value_name = "PATH")]
    pub library: Option<PathBuf>,

    /// Comma-separated XS IDs the reactor requires (e.g. 'AA,AB').
    #[arg(short = 'x', long, required = true, value_name = "IDS")]
    pub xs_ids: String,

    /// The cycle the decision is made on.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    pub cycle: u32,

    /// The `genXS` setting ('', 'Neutron' or 'Neutron and Gamma').
    #[arg(long, default_value = "", value_name = "KIND")]
    pub gen_xs: String,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to a cross-section library file.
    #[arg(required = true, value_name = "PATH")]
    pub file: PathBuf,
}
