//! RouterOS terminal recognition patterns.
//!
//! The line-oriented collaborator owns the byte transport; this module owns
//! what RouterOS output looks like: the ready prompt, the software-license
//! greeting shown before the first prompt, and the error lines the CLI
//! prints for rejected commands. Session implementations use these to decide
//! when a command has completed and whether it failed.

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};

/// Answer sent to skip the software-license greeting without viewing it.
pub const LICENSE_ACK: &str = " ";

static READY_PROMPT: Lazy<Regex> = Lazy::new(|| {
    match Regex::new(r"\[\w+@[\w\-.]+\] ?> ?$") {
        Ok(re) => re,
        Err(err) => panic!("invalid READY_PROMPT regex: {err}"),
    }
});

static LICENSE_PROMPT: Lazy<Regex> = Lazy::new(|| {
    match Regex::new(r"Do you want to see the software license\? \[Y/n\]: ?") {
        Ok(re) => re,
        Err(err) => panic!("invalid LICENSE_PROMPT regex: {err}"),
    }
});

static ERROR_LINES: Lazy<RegexSet> = Lazy::new(|| {
    match RegexSet::new([
        r"(?m)^bad command name",
        r"(?m)^no such item",
        r"(?m)^invalid value for",
    ]) {
        Ok(set) => set,
        Err(err) => panic!("invalid ERROR_LINES regex set: {err}"),
    }
});

/// Whether `buffer` ends in a prompt that terminates a read.
///
/// Both the normal ready prompt and the license greeting count: the device
/// stops and waits for input at either one.
pub fn is_ready_prompt(buffer: &str) -> bool {
    READY_PROMPT.is_match(buffer) || LICENSE_PROMPT.is_match(buffer)
}

/// Whether `greeting` is the software-license question asked on first login.
///
/// When it is, the session should send [`LICENSE_ACK`] and read again to
/// reach the normal prompt.
pub fn is_license_greeting(greeting: &str) -> bool {
    greeting.contains("software license?")
}

/// The first CLI error line in `output`, if any.
pub fn error_line(output: &str) -> Option<&str> {
    output.lines().find(|line| ERROR_LINES.is_match(line))
}

/// Whether `output` contains any CLI error line.
pub fn has_error(output: &str) -> bool {
    ERROR_LINES.is_match(output)
}
