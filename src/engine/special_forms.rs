//! Names of the special forms. A list headed by one of these symbols is interpreted
//! by fixed evaluator rules instead of function application.

pub const DEF: &str = "def";
pub const SET: &str = "set!";
pub const BEGIN: &str = "begin";
pub const IF: &str = "if";
pub const WHILE: &str = "while";
pub const LAMBDA: &str = "lambda";
pub const INCLUDE: &str = "include";

pub const SPECIAL_FORMS: &[&str] = &[DEF, SET, BEGIN, IF, WHILE, LAMBDA, INCLUDE];

pub fn is_special_form(name: &str) -> bool {
    SPECIAL_FORMS.contains(&name)
}
