//! Translation of CLI command strings into the structured API form.
//!
//! The typed API does not accept free-form command lines; it wants a command
//! word (path plus verb) and a set of key/value attributes. The verb is not
//! syntactically distinguishable from a path segment, so a fixed whitelist
//! of known RouterOS verbs marks the boundary, with the first `=`-carrying
//! token as the secondary signal.

use indexmap::IndexMap;

use crate::error::CommandError;

/// Action keywords RouterOS places at the end of a command path.
pub const KNOWN_VERBS: &[&str] = &[
    "add",
    "cancel",
    "comment",
    "disable",
    "downgrade",
    "edit",
    "enable",
    "export",
    "find",
    "get",
    "getall",
    "listen",
    "print",
    "remove",
    "set",
    "uninstall",
    "unschedule",
    "upgrade",
];

/// A CLI command decomposed into the form the typed API requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredCommand {
    /// Menu path segments, in order, without the verb.
    pub path: Vec<String>,

    /// The action keyword, when one could be identified.
    ///
    /// `None` means the command carried neither a known verb nor any
    /// `=`-attribute; the whole token list is then treated as path.
    pub verb: Option<String>,

    /// Attributes following the verb. A token without `=` becomes a flag
    /// entry with no value.
    pub attributes: IndexMap<String, Option<String>>,
}

impl StructuredCommand {
    /// The menu path in API sentence form, e.g. `/system/identity`.
    pub fn api_path(&self) -> String {
        format!("/{}", self.path.join("/"))
    }

    /// Path and verb combined into the API command word,
    /// e.g. `/system/identity/set`.
    pub fn command_word(&self) -> String {
        match &self.verb {
            Some(verb) => format!("/{}/{}", self.path.join("/"), verb),
            None => self.api_path(),
        }
    }

    /// Reassembles the non-attribute portion of the original CLI command.
    pub fn command_prefix(&self) -> String {
        let mut tokens: Vec<&str> = self.path.iter().map(String::as_str).collect();
        if let Some(verb) = &self.verb {
            tokens.push(verb);
        }
        format!("/{}", tokens.join(" "))
    }
}

/// Converts one CLI-style command string into a [`StructuredCommand`].
///
/// A single leading `/` is stripped and the rest is split on whitespace.
/// Scanning left to right, the first token that either matches
/// [`KNOWN_VERBS`] or contains `=` fixes the verb position: a whitelist
/// match is itself the verb, while an `=`-token makes its predecessor the
/// verb. Everything before the verb is path, everything after it is
/// attributes.
pub fn translate(command: &str) -> Result<StructuredCommand, CommandError> {
    let stripped = command.strip_prefix('/').unwrap_or(command);
    let tokens: Vec<&str> = stripped.split_whitespace().collect();

    if tokens.is_empty() {
        return Err(CommandError::MalformedCommand(command.to_string()));
    }

    let mut verb_index = None;
    let mut attr_start = tokens.len();

    for (index, token) in tokens.iter().enumerate() {
        if KNOWN_VERBS.contains(token) {
            verb_index = Some(index);
            attr_start = index + 1;
            break;
        }
        if token.contains('=') {
            // The token before the first attribute is the verb, when there
            // is one; an attribute in the very first position leaves the
            // command without path or verb.
            verb_index = index.checked_sub(1);
            attr_start = index;
            break;
        }
    }

    let path_end = match verb_index {
        Some(index) => index,
        None => attr_start,
    };

    let path = tokens[..path_end]
        .iter()
        .map(|token| token.to_string())
        .collect();
    let verb = verb_index.map(|index| tokens[index].to_string());

    let mut attributes = IndexMap::new();
    for token in &tokens[attr_start..] {
        match token.split_once('=') {
            Some((key, value)) => {
                attributes.insert(key.to_string(), Some(value.to_string()));
            }
            None => {
                attributes.insert(token.to_string(), None);
            }
        }
    }

    Ok(StructuredCommand {
        path,
        verb,
        attributes,
    })
}
