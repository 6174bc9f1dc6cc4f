//! User-defined aliases and first-word substitution.

use crate::lexer;
use std::collections::BTreeMap;

/// Mapping from alias name to its replacement text.
///
/// Names are unique, non-empty and contain no whitespace. Iteration is in
/// name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` can be used as an alias name.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty() && !name.chars().any(char::is_whitespace)
    }

    /// Define or overwrite `name`. Returns `false` (and leaves the table
    /// untouched) when the name is invalid.
    pub fn define(&mut self, name: impl Into<String>, expansion: impl Into<String>) -> bool {
        let name = name.into();
        if !Self::is_valid_name(&name) {
            return false;
        }
        self.entries.insert(name, expansion.into());
        true
    }

    /// Remove `name`, returning its expansion if it was defined.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Substitute the first word of `line` if it names an alias.
    ///
    /// The result is the expansion followed by the remaining words of the
    /// line, each preceded by a single space. Words are taken after lexing,
    /// so their quotes are gone and are not put back. The expansion itself is
    /// not looked up again. Lines whose first word is not an alias, and lines
    /// without words, come back unchanged.
    pub fn resolve(&self, line: &str) -> String {
        let words = lexer::tokenize(line);
        let Some((first, rest)) = words.split_first() else {
            return line.to_string();
        };
        match self.entries.get(first) {
            Some(expansion) => {
                let mut result = expansion.clone();
                for word in rest {
                    result.push(' ');
                    result.push_str(word);
                }
                result
            }
            None => line.to_string(),
        }
    }

    /// Render one entry the way `alias` prints it.
    pub fn format_entry(name: &str, expansion: &str) -> String {
        format!("alias {name}='{expansion}'")
    }
}

impl FromIterator<(String, String)> for AliasTable {
    /// Entries with invalid names are skipped.
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut table = AliasTable::new();
        for (name, expansion) in iter {
            table.define(name, expansion);
        }
        table
    }
}
