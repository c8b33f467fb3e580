use cinder::engine::runtime::DEFAULT_MAX_DEPTH;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// An embeddable S-expression scripting runtime.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(name = "cinder", bin_name = "cinder")]
#[clap(subcommand_required = true, arg_required_else_help = true)]
pub struct Cli {
    #[clap(flatten)]
    pub host: HostArgs,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Capabilities handed to every script run.
#[derive(Args, Debug, Clone)]
pub struct HostArgs {
    /// Directory that `include`d module files and the `fs` module resolve against.
    #[clap(long, global = true, env = "CINDER_ROOT", value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Nesting limit for evaluation; deeper scripts are aborted.
    #[clap(long, global = true, env = "CINDER_MAX_DEPTH", value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluates an expression string or runs a script file.
    Run(RunArgs),
    /// Starts an interactive session.
    Repl,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source text to evaluate; the final value is printed unless it is nil.
    #[clap(short, long, value_name = "CODE", conflicts_with = "file")]
    pub expr: Option<String>,

    /// Path to a script file to run.
    #[clap(value_name = "FILE_PATH", conflicts_with = "expr", required_unless_present = "expr")]
    pub file: Option<PathBuf>,
}
