use cinder::engine::special_forms::is_special_form;
use lazy_static::lazy_static;
use owo_colors::OwoColorize;
use regex::Regex;
use rustyline::highlight::Highlighter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline_derive::{Completer, Helper, Hinter};
use std::borrow::Cow::{self, Borrowed, Owned};

lazy_static! {
    // Strings have no escapes and may be unterminated; atoms run up to whitespace or a paren.
    static ref TOKEN_RE: Regex =
        Regex::new(r#"(?P<string>"[^"]*"?)|(?P<paren>[()])|(?P<atom>[^ \t\n()"]+)"#).unwrap();
    static ref NUMBER_RE: Regex = Regex::new(r"^-?\d+(\.\d*)?([eE][+-]?\d+)?$").unwrap();
}

fn style_atom(atom: &str) -> String {
    if NUMBER_RE.is_match(atom) {
        atom.magenta().to_string()
    } else if is_special_form(atom) {
        atom.cyan().bold().to_string()
    } else if atom.contains('.') {
        atom.yellow().to_string()
    } else {
        atom.to_string()
    }
}

/// Colors one line of source: strings, numbers, special forms, `module.member`
/// references and parentheses. Text between tokens is kept as is.
pub fn highlight_source(line: &str) -> String {
    let mut out = String::with_capacity(line.len() * 2);
    let mut last = 0;
    for caps in TOKEN_RE.captures_iter(line) {
        let Some(token) = caps.get(0) else {
            continue;
        };
        out.push_str(&line[last..token.start()]);
        let text = token.as_str();
        if caps.name("string").is_some() {
            out.push_str(&text.green().to_string());
        } else if caps.name("paren").is_some() {
            out.push_str(&text.blue().to_string());
        } else {
            out.push_str(&style_atom(text));
        }
        last = token.end();
    }
    out.push_str(&line[last..]);
    out
}

/// Open minus close parentheses outside string literals.
pub fn bracket_depth(input: &str) -> i64 {
    let mut depth = 0i64;
    let mut in_string = false;
    for c in input.chars() {
        match c {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth -= 1,
            _ => {}
        }
    }
    depth
}

#[derive(Helper, Completer, Hinter, Default)]
pub struct ReplHelper;

impl ReplHelper {
    pub fn new() -> Self {
        Self
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.is_empty() {
            Borrowed(line)
        } else {
            Owned(highlight_source(line))
        }
    }
}

// Unbalanced input keeps the editor open for another line.
impl Validator for ReplHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        if bracket_depth(ctx.input()) > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}
