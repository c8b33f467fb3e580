mod cli;
mod repl;

use anyhow::{Context, Result};
use cinder::engine::runtime::{Interpreter, RuntimeConfig};
use cinder::engine::sink::StdoutSink;
use cinder::engine::storage::DirStorage;
use cinder::libs::standard_registry;
use cinder::logging::init_logging;
use cinder::{EvalError, Value};
use clap::Parser;
use cli::{Cli, Commands, HostArgs, RunArgs};
use std::fs;
use tracing::info;

fn build_interpreter(host: &HostArgs) -> Interpreter {
    Interpreter::builder()
        .storage(DirStorage::new(&host.root))
        .sink(StdoutSink)
        .registry(standard_registry())
        .config(RuntimeConfig {
            max_depth: host.max_depth,
        })
        .build()
}

fn run(interpreter: &Interpreter, args: RunArgs) -> Result<()> {
    let (source, echo_result) = match (args.expr, args.file) {
        (Some(expr), _) => (expr, true),
        (None, Some(path)) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read script {}", path.display()))?;
            (text.replace('\r', ""), false)
        }
        (None, None) => anyhow::bail!("Nothing to run: pass --expr or a file"),
    };

    match interpreter.run_script(&source) {
        Ok(value) => {
            if echo_result && value != Value::Nil {
                println!("{value}");
            }
            Ok(())
        }
        Err(EvalError::Exit) => {
            info!("Script exited");
            Ok(())
        }
        Err(e) => Err(e).context("Script aborted"),
    }
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    info!(?cli, "Parsed CLI arguments");

    let interpreter = build_interpreter(&cli.host);
    match cli.command {
        Commands::Run(args) => run(&interpreter, args),
        Commands::Repl => repl::start_repl(&interpreter),
    }
}
