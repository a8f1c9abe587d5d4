//! Aligned help rendering from command metadata.
//!
//! [`render_help`] turns a [`CommandMetadata`] into up to four blocks, each
//! introduced by a translated, colored heading:
//!
//! ```text
//! Usage:
//!   make:model [arguments]
//!
//! Description:
//!   Generates a new model file.
//!
//! Arguments:
//!   name  The model class name.
//!
//! Options:
//!   --table  Supply a table name.
//!   --force  Force overwrite existing file.
//! ```
//!
//! Only the usage block is always present; the others appear when the
//! corresponding metadata is non-empty. Rows in the arguments and options
//! blocks are aligned on the widest key of their own block.

use crate::metadata::{CommandMetadata, Entries};
use crate::output::{Color, Output};
use crate::translate::{self, Translator};
use serde::Deserialize;
use std::io;
use unicode_width::UnicodeWidthStr;

/// Layout and colors for help output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HelpConfig {
    /// Color of block headings.
    pub heading_color: Color,
    /// Color of argument and option names.
    pub item_color: Color,
    /// Left indentation of block bodies.
    pub indent: usize,
    /// Gap between the name column and descriptions.
    pub extra: usize,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            heading_color: Color::Yellow,
            item_color: Color::Green,
            indent: 2,
            extra: 2,
        }
    }
}

/// Indents `item` and right-pads it to at least `max + extra + indent` columns.
///
/// Items already at or past the target are returned indented but otherwise
/// untouched; nothing is ever truncated.
///
/// # Example
///
/// ```
/// use spark::help::pad;
///
/// assert_eq!(pad("name", 4, 2, 2), "  name  ");
/// assert_eq!(pad("make:model", 0, 0, 2), "  make:model");
/// assert_eq!(pad("longer", 2, 0, 0), "longer");
/// ```
pub fn pad(item: &str, max: usize, extra: usize, indent: usize) -> String {
    let target = max + extra + indent;
    let mut padded = String::with_capacity(target.max(indent + item.len()));
    padded.extend(std::iter::repeat(' ').take(indent));
    padded.push_str(item);
    let width = indent + item.width();
    if width < target {
        padded.extend(std::iter::repeat(' ').take(target - width));
    }
    padded
}

/// Width of the widest key in `entries`, 0 when there are none.
pub fn column_width(entries: &Entries) -> usize {
    entries.column_width()
}

/// Writes the help text for `meta` through `output`.
pub fn render_help(
    meta: &CommandMetadata,
    output: &dyn Output,
    translator: &dyn Translator,
    config: &HelpConfig,
) -> io::Result<()> {
    output.write(
        &translator.translate(translate::HELP_USAGE),
        Some(config.heading_color),
    )?;
    output.write(&pad(&meta.usage_line(), 0, 0, config.indent), None)?;

    if let Some(description) = meta.summary() {
        output.new_line()?;
        output.write(
            &translator.translate(translate::HELP_DESCRIPTION),
            Some(config.heading_color),
        )?;
        output.write(&pad(description, 0, 0, config.indent), None)?;
    }

    render_entries(
        output,
        translator,
        config,
        translate::HELP_ARGUMENTS,
        &meta.arguments,
    )?;
    render_entries(
        output,
        translator,
        config,
        translate::HELP_OPTIONS,
        &meta.options,
    )?;

    Ok(())
}

fn render_entries(
    output: &dyn Output,
    translator: &dyn Translator,
    config: &HelpConfig,
    heading: &str,
    entries: &Entries,
) -> io::Result<()> {
    if entries.is_empty() {
        return Ok(());
    }

    output.new_line()?;
    output.write(&translator.translate(heading), Some(config.heading_color))?;

    let width = column_width(entries);
    for (name, description) in entries.iter() {
        let name = pad(name, width, config.extra, config.indent);
        let row = format!("{}{}", output.color(&name, config.item_color), description);
        output.write(&row, None)?;
    }

    Ok(())
}
