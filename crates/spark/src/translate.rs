//! Message lookup for user-facing headings and errors.
//!
//! Messages are addressed by dotted keys such as `CLI.helpUsage`. A
//! [`Messages`] catalog ships with English defaults and can be overlaid with
//! catalogs loaded from YAML, where nested mappings flatten into dotted keys:
//!
//! ```yaml
//! CLI:
//!   helpUsage: "Utilisation :"
//!   helpOptions: "Options :"
//! ```
//!
//! Lookups never fail: a missing key translates to the key itself.

use crate::config::SetupError;
use std::collections::HashMap;

pub const HELP_USAGE: &str = "CLI.helpUsage";
pub const HELP_DESCRIPTION: &str = "CLI.helpDescription";
pub const HELP_ARGUMENTS: &str = "CLI.helpArguments";
pub const HELP_OPTIONS: &str = "CLI.helpOptions";
pub const COMMAND_NOT_FOUND: &str = "CLI.commandNotFound";
pub const ALT_COMMAND_SINGULAR: &str = "CLI.altCommandSingular";
pub const ALT_COMMAND_PLURAL: &str = "CLI.altCommandPlural";

/// Resolves a message key to display text.
pub trait Translator {
    fn translate(&self, key: &str) -> String;

    /// Translates `key` and substitutes `{0}`, `{1}`, ... with `args`.
    fn format(&self, key: &str, args: &[&str]) -> String {
        interpolate(&self.translate(key), args)
    }
}

impl<F> Translator for F
where
    F: Fn(&str) -> String,
{
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

/// Replaces `{N}` placeholders in one left-to-right pass; substituted text is
/// never rescanned. Placeholders without a matching argument are kept.
fn interpolate(template: &str, args: &[&str]) -> String {
    let mut text = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        text.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let arg = after.find('}').and_then(|close| {
            let index = after[..close].parse::<usize>().ok()?;
            args.get(index).map(|arg| (close, *arg))
        });
        match arg {
            Some((close, arg)) => {
                text.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                text.push('{');
                rest = after;
            }
        }
    }
    text.push_str(rest);
    text
}

/// A flat catalog of dotted keys to messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Messages {
    entries: HashMap<String, String>,
}

impl Messages {
    /// An empty catalog; every lookup falls back to the key.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in English catalog.
    pub fn english() -> Self {
        [
            (HELP_USAGE, "Usage:"),
            (HELP_DESCRIPTION, "Description:"),
            (HELP_ARGUMENTS, "Arguments:"),
            (HELP_OPTIONS, "Options:"),
            (COMMAND_NOT_FOUND, "Command \"{0}\" not found."),
            (ALT_COMMAND_SINGULAR, "Did you mean this?"),
            (ALT_COMMAND_PLURAL, "Did you mean one of these?"),
            ("CLI.helpCommand", "Displays basic usage information."),
            ("CLI.helpCommandName", "The command name [default: \"help\"]"),
            ("CLI.listCommands", "Lists the available commands."),
            (
                "CLI.listSimple",
                "Prints a list of the commands with no other info.",
            ),
            ("CLI.errorCausedBy", "Caused by:"),
        ]
        .into_iter()
        .collect()
    }

    /// Parses a (possibly nested) YAML mapping into a catalog.
    pub fn from_yaml(source: &str) -> Result<Self, SetupError> {
        let value: serde_yaml::Value = serde_yaml::from_str(source)?;
        let mut messages = Messages::new();
        match value {
            serde_yaml::Value::Null => {}
            serde_yaml::Value::Mapping(_) => flatten_into(&mut messages.entries, "", &value)?,
            _ => {
                return Err(SetupError::Config(
                    "message catalog must be a mapping".to_string(),
                ))
            }
        }
        Ok(messages)
    }

    /// Reads and parses a YAML catalog from disk.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, SetupError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.entries.insert(key.into(), message.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Overlays `other` on top of this catalog.
    pub fn merge(mut self, other: Messages) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Messages
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Translator for Messages {
    fn translate(&self, key: &str) -> String {
        self.get(key).unwrap_or(key).to_string()
    }
}

fn flatten_into(
    entries: &mut HashMap<String, String>,
    prefix: &str,
    value: &serde_yaml::Value,
) -> Result<(), SetupError> {
    use serde_yaml::Value;

    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                let key = match key {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(SetupError::Config(format!(
                            "unsupported message key under '{}': {:?}",
                            prefix, other
                        )))
                    }
                };
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(entries, &path, child)?;
            }
        }
        Value::String(s) => {
            entries.insert(prefix.to_string(), s.clone());
        }
        Value::Number(n) => {
            entries.insert(prefix.to_string(), n.to_string());
        }
        Value::Bool(b) => {
            entries.insert(prefix.to_string(), b.to_string());
        }
        Value::Null => {}
        other => {
            return Err(SetupError::Config(format!(
                "message '{}' must be a string, got {:?}",
                prefix, other
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_headings() {
        let messages = Messages::english();
        assert_eq!(messages.translate(HELP_USAGE), "Usage:");
        assert_eq!(messages.translate(HELP_DESCRIPTION), "Description:");
        assert_eq!(messages.translate(HELP_ARGUMENTS), "Arguments:");
        assert_eq!(messages.translate(HELP_OPTIONS), "Options:");
    }

    #[test]
    fn test_missing_key_falls_back_to_key() {
        assert_eq!(Messages::new().translate("CLI.nope"), "CLI.nope");
    }

    #[test]
    fn test_format_substitutes_positional_args() {
        let messages = Messages::english();
        assert_eq!(
            messages.format(COMMAND_NOT_FOUND, &["mkae:model"]),
            "Command \"mkae:model\" not found."
        );
    }

    #[test]
    fn test_format_does_not_rescan_substituted_text() {
        let messages: Messages = [("pair", "{0} and {1}")].into_iter().collect();
        assert_eq!(messages.format("pair", &["{1}", "B"]), "{1} and B");
    }

    #[test]
    fn test_format_keeps_unmatched_placeholders() {
        let messages: Messages = [("t", "{0} {2} {x} {")].into_iter().collect();
        assert_eq!(messages.format("t", &["a"]), "a {2} {x} {");
    }

    #[test]
    fn test_closure_translator() {
        let upper = |key: &str| key.to_uppercase();
        assert_eq!(upper.translate("cli.helpusage"), "CLI.HELPUSAGE");
    }

    #[test]
    fn test_from_yaml_flattens_nested_keys() {
        let yaml = "CLI:\n  helpUsage: \"Utilisation :\"\n  nested:\n    depth: 3\n";
        let messages = Messages::from_yaml(yaml).unwrap();

        assert_eq!(messages.get("CLI.helpUsage"), Some("Utilisation :"));
        assert_eq!(messages.get("CLI.nested.depth"), Some("3"));
    }

    #[test]
    fn test_from_yaml_empty_document() {
        assert!(Messages::from_yaml("").unwrap().is_empty());
    }

    #[test]
    fn test_from_yaml_rejects_non_mapping() {
        let err = Messages::from_yaml("- a\n- b\n").unwrap_err();
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn test_from_yaml_rejects_sequence_values() {
        let err = Messages::from_yaml("CLI:\n  helpUsage: [a, b]\n").unwrap_err();
        assert!(err.to_string().contains("CLI.helpUsage"));
    }

    #[test]
    fn test_merge_overlays() {
        let overlay = Messages::from_yaml("CLI:\n  helpUsage: Uso\n").unwrap();
        let messages = Messages::english().merge(overlay);

        assert_eq!(messages.translate(HELP_USAGE), "Uso");
        assert_eq!(messages.translate(HELP_OPTIONS), "Options:");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.yaml");
        std::fs::write(&path, "CLI:\n  helpOptions: Optionen\n").unwrap();

        let messages = Messages::load(&path).unwrap();
        assert_eq!(messages.translate(HELP_OPTIONS), "Optionen");
    }
}
