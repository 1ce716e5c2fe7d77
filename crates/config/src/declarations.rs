//! Lightweight grammar for substitution and target declarations found in
//! text-block convention variables (`rst_prolog`, `rst_epilog`).
//!
//! Recognized explicit-markup lines:
//!
//! - `.. |name| <directive>:: <data>` declares a substitution
//! - `.. _name: <uri>` or ``.. _`name`: <uri>`` declares a hyperlink target
//!
//! A substitution is linkable when its definition carries a trailing link:
//! an indented `:target:` option, or data that is itself a named hyperlink
//! reference (`` `Docs <https://example.org>`_ `` or `word_`). Anonymous
//! targets (`.. __: <uri>`) declare nothing.

use regex::Regex;
use rst_types::SymbolDefinition;
use std::sync::LazyLock;

struct Grammar {
    substitution_def: Regex,
    target_def: Regex,
    link_data: Regex,
    target_option: Regex,
}

impl Grammar {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            substitution_def: Regex::new(
                r"^(?P<indent>\s*)\.\.\s+\|(?P<name>[^|\s](?:[^|]*[^|\s])?)\|\s+(?P<directive>[\w:.+-]+)::(?:\s+(?P<data>.*))?$",
            )?,
            target_def: Regex::new(
                r"^(?P<indent>\s*)\.\.\s+_(?:`(?P<quoted>[^`]+)`|(?P<plain>[^`:][^:]*)):(?:\s|$)",
            )?,
            link_data: Regex::new(r"^(?:`[^`]+`|[\w.+-]+)__?$")?,
            target_option: Regex::new(r"^\s+:target:\s*\S")?,
        })
    }
}

/// `None` when the grammar failed to compile; no declarations are parsed then.
static GRAMMAR: LazyLock<Option<Grammar>> = LazyLock::new(|| {
    Grammar::compile()
        .map_err(|e| tracing::error!(error = %e, "Invalid declaration grammar"))
        .ok()
});

/// Parse every substitution and target declared in `text`.
///
/// Declarations are returned in the order they appear. Lines that do not
/// match the grammar are ignored; the block is configuration prose, not a
/// document to validate.
#[must_use]
pub fn parse_declarations(text: &str) -> Vec<SymbolDefinition> {
    let Some(grammar) = GRAMMAR.as_ref() else {
        return Vec::new();
    };
    let lines: Vec<&str> = text.lines().collect();
    let mut definitions = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if let Some(caps) = grammar.substitution_def.captures(line) {
            let name = &caps["name"];
            let indent = caps["indent"].len();
            let data = caps.name("data").map_or("", |m| m.as_str().trim());
            let linkable = grammar.link_data.is_match(data)
                || continuation(&lines[index + 1..], indent).any(|l| grammar.target_option.is_match(l));

            tracing::trace!(name, linkable, "Declared substitution");
            definitions.push(if linkable {
                SymbolDefinition::linkable_substitution(name)
            } else {
                SymbolDefinition::substitution(name)
            });
        } else if let Some(caps) = grammar.target_def.captures(line) {
            let name = caps
                .name("quoted")
                .or_else(|| caps.name("plain"))
                .map_or("", |m| m.as_str().trim());
            if name.is_empty() || name == "_" {
                continue;
            }
            tracing::trace!(name, "Declared target");
            definitions.push(SymbolDefinition::target(name));
        }
    }

    definitions
}

/// Lines indented deeper than `indent` directly following a definition.
fn continuation<'a>(rest: &'a [&'a str], indent: usize) -> impl Iterator<Item = &'a str> + 'a {
    rest.iter()
        .copied()
        .take_while(move |l| {
            let trimmed = l.trim_start();
            !trimmed.is_empty() && l.len() - trimmed.len() > indent
        })
}
