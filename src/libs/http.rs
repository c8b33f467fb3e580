//! `http`: blocking GET requests over the host network. The status and body of the
//! last request are kept per run and read back through `http.status` and
//! `http.response`.

use crate::engine::builtins::str_arg;
use crate::engine::env::{EnvRef, Environment};
use crate::engine::eval::EvalError;
use crate::engine::runtime::RunContext;
use crate::engine::value::Value;
use std::io;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, trace};
use ureq::Agent;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Status recorded when no response arrived at all.
const TRANSPORT_FAILURE: i64 = -1;

pub struct HttpState {
    agent: Agent,
    status: i64,
    response: String,
}

impl Default for HttpState {
    fn default() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            status: 0,
            response: String::new(),
        }
    }
}

#[derive(Error, Debug)]
enum HttpError {
    #[error("request failed: {0}")]
    Transport(Box<ureq::Error>),
    #[error("could not read response body: {0}")]
    Body(#[from] io::Error),
}

// Error statuses still carry a body, which scripts get to see.
fn fetch(agent: &Agent, url: &str) -> Result<(u16, String), HttpError> {
    let response = match agent.get(url).call() {
        Ok(response) | Err(ureq::Error::Status(_, response)) => response,
        Err(e) => return Err(HttpError::Transport(Box::new(e))),
    };
    let status = response.status();
    let body = response.into_string()?;
    Ok((status, body))
}

fn run_and_agent(env: &EnvRef) -> (Rc<RunContext>, Agent) {
    let run = Rc::clone(env.borrow().run());
    let agent = run.with_state(|state: &mut HttpState| state.agent.clone());
    (run, agent)
}

pub fn load_http_lib(env: &mut Environment) {
    trace!("Loading http module");
    env.define("get", Value::native("http.get", native_get));
    env.define("get-file", Value::native("http.get-file", native_get_file));
    env.define("status", Value::native("http.status", native_status));
    env.define("response", Value::native("http.response", native_response));
}

/// `(http.get url)`: the response body, or `""` when no response arrived.
pub fn native_get(args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    let Some(url) = str_arg(&args, 0) else {
        return Ok(Value::String(String::new()));
    };
    let (run, agent) = run_and_agent(env);
    match fetch(&agent, url) {
        Ok((status, body)) => {
            info!(url, status, bytes = body.len(), "HTTP GET finished");
            run.with_state(|state: &mut HttpState| {
                state.status = i64::from(status);
                state.response.clone_from(&body);
            });
            Ok(Value::String(body))
        }
        Err(e) => {
            debug!(url, error = %e, "HTTP GET failed");
            run.with_state(|state: &mut HttpState| state.status = TRANSPORT_FAILURE);
            Ok(Value::String(String::new()))
        }
    }
}

/// `(http.get-file url path)`: stores the body of a `200` response at `path`.
pub fn native_get_file(args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    let (Some(url), Some(path)) = (str_arg(&args, 0), str_arg(&args, 1)) else {
        return Ok(Value::Int(0));
    };
    let (run, agent) = run_and_agent(env);
    let body = match fetch(&agent, url) {
        Ok((200, body)) => {
            run.with_state(|state: &mut HttpState| state.status = 200);
            body
        }
        Ok((status, _)) => {
            debug!(url, status, "Download refused, not writing");
            run.with_state(|state: &mut HttpState| state.status = i64::from(status));
            return Ok(Value::Int(0));
        }
        Err(e) => {
            debug!(url, error = %e, "Download failed");
            run.with_state(|state: &mut HttpState| state.status = TRANSPORT_FAILURE);
            return Ok(Value::Int(0));
        }
    };
    match run.storage().write(path, &body) {
        Ok(()) => {
            info!(url, path, bytes = body.len(), "Downloaded file");
            Ok(Value::Int(1))
        }
        Err(e) => {
            debug!(url, path, error = %e, "Could not store download");
            Ok(Value::Int(0))
        }
    }
}

pub fn native_status(_args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    let run = Rc::clone(env.borrow().run());
    Ok(Value::Int(run.with_state(|state: &mut HttpState| state.status)))
}

pub fn native_response(_args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    let run = Rc::clone(env.borrow().run());
    Ok(Value::String(
        run.with_state(|state: &mut HttpState| state.response.clone()),
    ))
}

#[cfg(test)]
mod tests {
    use crate::engine::runtime::Interpreter;
    use crate::engine::sink::BufferSink;
    use crate::engine::storage::MemoryStorage;
    use crate::engine::value::Value;
    use crate::libs::standard_registry;
    use crate::logging::init_test_logging;
    use std::io::{BufRead, BufReader, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    fn respond(stream: TcpStream) {
        let mut reader = BufReader::new(&stream);
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).is_err() {
            return;
        }
        let mut header = String::new();
        while reader.read_line(&mut header).is_ok_and(|n| n > 0) && header != "\r\n" {
            header.clear();
        }
        let (status, body) = match request_line.split_whitespace().nth(1) {
            Some("/hello") => ("200 OK", "hello from the server"),
            Some("/page.txt") => ("200 OK", "line one\nline two\n"),
            _ => ("404 Not Found", "gone"),
        };
        let reply = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let mut stream = &stream;
        let _ = stream.write_all(reply.as_bytes());
    }

    fn serve() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                respond(stream);
            }
        });
        format!("http://{addr}")
    }

    fn run(code: &str) -> Value {
        init_test_logging();
        let interpreter = Interpreter::builder()
            .sink(BufferSink::new())
            .storage(MemoryStorage::new())
            .registry(standard_registry())
            .build();
        interpreter
            .run_script(&format!("(include http) (include fs) {code}"))
            .unwrap()
    }

    #[test]
    fn get_returns_body_and_records_status() {
        let base = serve();
        let value = run(&format!(
            "(list (http.get \"{base}/hello\") (http.status) (http.response))"
        ));
        assert_eq!(
            value,
            Value::List(vec![
                Value::String("hello from the server".into()),
                Value::Int(200),
                Value::String("hello from the server".into()),
            ])
        );
    }

    #[test]
    fn error_status_still_returns_the_body() {
        let base = serve();
        let value = run(&format!("(list (http.get \"{base}/nowhere\") (http.status))"));
        assert_eq!(
            value,
            Value::List(vec![Value::String("gone".into()), Value::Int(404)])
        );
    }

    #[test]
    fn unreachable_host_gives_empty_body() {
        let closed = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = closed.local_addr().unwrap();
        drop(closed);
        let value = run(&format!(
            "(list (http.get \"http://{addr}/hello\") (http.status) (http.response))"
        ));
        assert_eq!(
            value,
            Value::List(vec![
                Value::String(String::new()),
                Value::Int(-1),
                Value::String(String::new()),
            ])
        );
    }

    #[test]
    fn get_file_writes_into_storage() {
        let base = serve();
        let value = run(&format!(
            "(list (http.get-file \"{base}/page.txt\" \"/page.txt\") (http.status) (fs.read \"page.txt\"))"
        ));
        assert_eq!(
            value,
            Value::List(vec![
                Value::Int(1),
                Value::Int(200),
                Value::String("line one\nline two\n".into()),
            ])
        );
    }

    #[test]
    fn get_file_skips_non_ok_responses() {
        let base = serve();
        let value = run(&format!(
            "(list (http.get-file \"{base}/missing\" \"out.txt\") (http.status) (fs.exists \"out.txt\"))"
        ));
        assert_eq!(
            value,
            Value::List(vec![Value::Int(0), Value::Int(404), Value::Int(0)])
        );
    }

    #[test]
    fn state_starts_empty_each_run() {
        let value = run("(list (http.status) (http.response))");
        assert_eq!(
            value,
            Value::List(vec![Value::Int(0), Value::String(String::new())])
        );
    }

    #[test]
    fn non_string_arguments_are_rejected() {
        let value = run("(list (http.get 5) (http.get-file \"x\") (http.status))");
        assert_eq!(
            value,
            Value::List(vec![Value::String(String::new()), Value::Int(0), Value::Int(0)])
        );
    }
}
