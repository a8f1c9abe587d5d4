//! Command metadata and name-keyed property access.
//!
//! Every command describes itself with a [`CommandMetadata`]: the group it is
//! listed under, its invocation name, an optional usage line and description,
//! and the ordered [`Entries`] for its options and positional arguments.
//!
//! Metadata can be read by field name through [`CommandMetadata::get`], which
//! returns a [`MetaValue`]. Unknown or unset fields read as [`MetaValue::None`]
//! rather than failing, so callers such as list renderers can probe fields
//! without knowing the concrete command type.
//!
//! # Example
//!
//! ```
//! use spark::{CommandMetadata, MetaValue};
//!
//! let meta = CommandMetadata::new("Generators", "make:model")
//!     .description("Generates a new model file.")
//!     .argument("name", "The model class name.")
//!     .option("--table", "Supply a table name.");
//!
//! assert_eq!(meta.get("group"), MetaValue::Text("Generators"));
//! assert!(meta.get("usage").is_none());
//! assert!(meta.has("arguments"));
//! ```

use unicode_width::UnicodeWidthStr;

/// An insertion-ordered mapping of names to single-line descriptions.
///
/// Keys are unique: inserting an existing key replaces its description in
/// place, keeping the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entries {
    items: Vec<(String, String)>,
}

impl Entries {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry, returning the previous description.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.items.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.items.push((key, value));
                None
            }
        }
    }

    /// Returns the description stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates `(key, description)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Display width of the widest key, or 0 when empty.
    ///
    /// Used as the column width when rendering the entries as aligned rows.
    pub fn column_width(&self) -> usize {
        self.keys().map(UnicodeWidthStr::width).max().unwrap_or(0)
    }
}

impl<K, V> FromIterator<(K, V)> for Entries
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries = Entries::new();
        for (k, v) in iter {
            entries.insert(k, v);
        }
        entries
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Entries
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// A metadata field value, borrowed from the metadata it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaValue<'a> {
    /// A text field (group, name, usage, description, custom attributes).
    Text(&'a str),
    /// An ordered mapping (options, arguments).
    Entries(&'a Entries),
    /// Field unknown or unset.
    None,
}

impl<'a> MetaValue<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, MetaValue::None)
    }

    /// Returns `true` for set, non-empty values.
    pub fn is_present(&self) -> bool {
        match self {
            MetaValue::Text(s) => !s.is_empty(),
            MetaValue::Entries(e) => !e.is_empty(),
            MetaValue::None => false,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_entries(&self) -> Option<&'a Entries> {
        match self {
            MetaValue::Entries(e) => Some(e),
            _ => None,
        }
    }
}

type FieldAccessor = for<'a> fn(&'a CommandMetadata) -> MetaValue<'a>;

fn optional_text(value: &Option<String>) -> MetaValue<'_> {
    value
        .as_deref()
        .map(MetaValue::Text)
        .unwrap_or(MetaValue::None)
}

fn group_field(m: &CommandMetadata) -> MetaValue<'_> {
    MetaValue::Text(&m.group)
}

fn name_field(m: &CommandMetadata) -> MetaValue<'_> {
    MetaValue::Text(&m.name)
}

fn usage_field(m: &CommandMetadata) -> MetaValue<'_> {
    optional_text(&m.usage)
}

fn description_field(m: &CommandMetadata) -> MetaValue<'_> {
    optional_text(&m.description)
}

fn options_field(m: &CommandMetadata) -> MetaValue<'_> {
    MetaValue::Entries(&m.options)
}

fn arguments_field(m: &CommandMetadata) -> MetaValue<'_> {
    MetaValue::Entries(&m.arguments)
}

/// Declared fields readable by name, in declaration order.
const FIELDS: &[(&str, FieldAccessor)] = &[
    ("group", group_field),
    ("name", name_field),
    ("usage", usage_field),
    ("description", description_field),
    ("options", options_field),
    ("arguments", arguments_field),
];

/// Descriptive attributes of a command.
///
/// Built with chained setters, typically inside a concrete command's
/// constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandMetadata {
    /// Bucket used when listing commands.
    pub group: String,
    /// Invocation name, unique within a registry.
    pub name: String,
    /// Full usage line. Derived from `name` when absent.
    pub usage: Option<String>,
    /// One-paragraph summary.
    pub description: Option<String>,
    /// Flag name to description.
    pub options: Entries,
    /// Positional argument name to description.
    pub arguments: Entries,
    /// Extra declared attributes, readable through [`get`](Self::get).
    pub attributes: Entries,
}

impl CommandMetadata {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn option(mut self, flag: impl Into<String>, description: impl Into<String>) -> Self {
        self.options.insert(flag, description);
        self
    }

    pub fn argument(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.arguments.insert(name, description);
        self
    }

    /// Declares an extra attribute, e.g. an alias or a related command name.
    ///
    /// Attributes never shadow the built-in fields.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// Reads a field by name.
    ///
    /// Built-in fields are looked up first, then declared attributes. Anything
    /// else reads as [`MetaValue::None`].
    pub fn get(&self, field: &str) -> MetaValue<'_> {
        if let Some((_, accessor)) = FIELDS.iter().find(|(name, _)| *name == field) {
            return accessor(self);
        }
        self.attributes
            .get(field)
            .map(MetaValue::Text)
            .unwrap_or(MetaValue::None)
    }

    /// Returns `true` if the field is known and holds a non-empty value.
    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_present()
    }

    /// The usage line shown in help output.
    ///
    /// An explicit, non-empty usage is returned as-is. Otherwise the name is
    /// used, followed by `" [arguments]"` when positional arguments exist.
    pub fn usage_line(&self) -> String {
        match self.usage.as_deref() {
            Some(usage) if !usage.is_empty() => usage.to_string(),
            _ if self.arguments.is_empty() => self.name.clone(),
            _ => format!("{} [arguments]", self.name),
        }
    }

    /// The description, if set and non-empty.
    pub fn summary(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}
