mod highlighter;
mod history;

use crate::repl::highlighter::ReplHelper;
use crate::repl::history::{get_history_path, load_history_from_path, save_history_to_path};
use cinder::engine::runtime::Interpreter;
use cinder::{EvalError, Value};
use owo_colors::OwoColorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing::{info, warn};

const PROMPT: &str = "cinder> ";

/// Runs an interactive session. Every line is evaluated in the same global frame, so
/// definitions and included modules persist until the session ends.
#[tracing::instrument(skip(interpreter))]
pub fn start_repl(interpreter: &Interpreter) -> anyhow::Result<()> {
    info!("Starting REPL session with rustyline");
    let mut rl = Editor::<ReplHelper, DefaultHistory>::new()?;
    rl.set_helper(Some(ReplHelper::new()));

    let history_path = get_history_path();
    match &history_path {
        Some(path) => load_history_from_path(&mut rl, path),
        None => warn!("Could not determine history file path. History will not be saved."),
    }

    let session = interpreter.session();
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if let Err(err) = rl.add_history_entry(input) {
                    warn!(error = %err, "Failed to add line to history");
                }
                if input == ".exit" {
                    info!("Exiting REPL session via user command.");
                    break;
                }

                let result = session.eval_source(input);
                session.run_context().flush();
                match result {
                    Ok(Value::Nil) => {}
                    Ok(value) => println!("{value}"),
                    Err(EvalError::Exit) => {
                        info!("Script requested exit, leaving REPL");
                        break;
                    }
                    Err(e) => eprintln!("{} {e}", "error:".red().bold()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted. Type .exit or press Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                info!("REPL EOF detected (Ctrl-D).");
                break;
            }
            Err(err) => {
                eprintln!("{} {err}", "readline error:".red().bold());
                break;
            }
        }
    }

    if let Some(path) = &history_path {
        save_history_to_path(&mut rl, path);
    }
    Ok(())
}
