//! Regex-backed named fields over a content provider.
//!
//! Each field pairs a pattern with a write format. Reading a field returns
//! what the pattern captures; writing a field replaces every match with the
//! formatted value, or appends the formatted value when nothing matches.

use std::collections::BTreeMap;
use std::fmt;

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::content::ContentProvider;
use crate::error::{FilesError, FilesResult};

/// Names that collide with node and file operations.
const RESERVED_NAMES: &[&str] = &[
    "path",
    "perms",
    "owner",
    "group",
    "data",
    "read",
    "write",
    "append",
    "overwrite",
    "create",
    "remove",
    "verify",
    "repair",
    "chmod",
    "chown",
    "exists",
    "get",
    "set",
    "setup_parsing",
];

const SLOT: &str = "{}";

/// How a field is located and written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldPattern {
    /// A pattern whose write format is derived from the pattern itself.
    Pattern(String),
    /// A pattern and an explicit write format containing one `{}` slot.
    Formatted(String, String),
}

impl From<&str> for FieldPattern {
    fn from(pattern: &str) -> Self {
        FieldPattern::Pattern(pattern.to_string())
    }
}

impl From<String> for FieldPattern {
    fn from(pattern: String) -> Self {
        FieldPattern::Pattern(pattern)
    }
}

impl From<(&str, &str)> for FieldPattern {
    fn from((pattern, format): (&str, &str)) -> Self {
        FieldPattern::Formatted(pattern.to_string(), format.to_string())
    }
}

/// The value read from a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParsedValue {
    Single(String),
    Multiple(Vec<String>),
}

impl ParsedValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            ParsedValue::Single(value) => vec![value.as_str()],
            ParsedValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for ParsedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedValue::Single(value) => f.write_str(value),
            ParsedValue::Multiple(values) => f.write_str(&values.join("\n")),
        }
    }
}

#[derive(Debug, Clone)]
struct Field {
    pattern: Regex,
    format: String,
}

impl Field {
    fn compile(name: &str, definition: FieldPattern) -> FilesResult<Self> {
        let (raw, format) = match definition {
            FieldPattern::Pattern(raw) => {
                let format = default_format(&raw);
                (raw, format)
            }
            FieldPattern::Formatted(raw, format) => (raw, format),
        };

        if !format.contains(SLOT) {
            return Err(FilesError::InvalidPattern {
                name: name.to_string(),
                message: format!("format {:?} has no {} slot", format, SLOT),
            });
        }

        let pattern = Regex::new(&raw).map_err(|e| FilesError::InvalidPattern {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { pattern, format })
    }

    fn render(&self, value: &str) -> String {
        self.format.replacen(SLOT, value, 1)
    }

    fn find_all(&self, content: &str) -> Vec<String> {
        let grouped = self.pattern.captures_len() > 1;
        self.pattern
            .captures_iter(content)
            .map(|caps| {
                let matched = if grouped { caps.get(1) } else { caps.get(0) };
                matched.map_or_else(String::new, |m| m.as_str().to_string())
            })
            .collect()
    }
}

/// Named regex fields read from and written into a content provider.
pub struct Parsable<C> {
    source: C,
    fields: BTreeMap<String, Field>,
}

impl<C: ContentProvider> Parsable<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            fields: BTreeMap::new(),
        }
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut C {
        &mut self.source
    }

    pub fn into_inner(self) -> C {
        self.source
    }

    /// Names of the registered fields, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Register fields.
    ///
    /// Fails with `DuplicateAttribute` if a name is already registered or
    /// shadows a file operation, and with `InvalidPattern` if a pattern does
    /// not compile or a format lacks its `{}` slot. Nothing is registered when
    /// any entry fails.
    pub fn setup_parsing<I, K, P>(&mut self, fields: I) -> FilesResult<()>
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<FieldPattern>,
    {
        let mut compiled = BTreeMap::new();
        for (name, definition) in fields {
            let name = name.into();
            if RESERVED_NAMES.contains(&name.as_str())
                || self.fields.contains_key(&name)
                || compiled.contains_key(&name)
            {
                return Err(FilesError::DuplicateAttribute(name));
            }
            let field = Field::compile(&name, definition.into())?;
            compiled.insert(name, field);
        }

        debug!("Registered {} parsable fields", compiled.len());
        self.fields.extend(compiled);
        Ok(())
    }

    /// Read a field.
    ///
    /// Returns `None` when the pattern matches nothing, a single value for one
    /// match and every value in order for several.
    pub fn get(&mut self, name: &str) -> FilesResult<Option<ParsedValue>> {
        let field = self.field(name)?.clone();
        let content = self.source.content()?;
        let mut found = field.find_all(&content);
        Ok(match found.len() {
            0 => None,
            1 => found.pop().map(ParsedValue::Single),
            _ => Some(ParsedValue::Multiple(found)),
        })
    }

    /// Write a field into the content.
    ///
    /// Every existing match is replaced by the formatted value. When nothing
    /// matches the formatted value is appended on a new line. The change is
    /// made in memory through the content provider.
    pub fn set(&mut self, name: &str, value: &str) -> FilesResult<()> {
        let field = self.field(name)?.clone();
        let content = self.source.content()?;
        let rendered = field.render(value);

        let updated = if field.pattern.is_match(&content) {
            field
                .pattern
                .replace_all(&content, NoExpand(&rendered))
                .into_owned()
        } else {
            format!("{}\n{}", content, rendered)
        };

        debug!("Set parsable field {}", name);
        self.source.set_content(updated);
        Ok(())
    }

    fn field(&self, name: &str) -> FilesResult<&Field> {
        self.fields
            .get(name)
            .ok_or_else(|| FilesError::UnknownAttribute(name.to_string()))
    }
}

/// Write format implied by a pattern: anchors dropped, the first capture
/// group replaced by `{}` and escapes removed.
fn default_format(pattern: &str) -> String {
    let body = pattern.strip_prefix('^').unwrap_or(pattern);
    let body = match body.strip_suffix('$') {
        Some(stripped) if !stripped.ends_with('\\') => stripped,
        _ => body,
    };

    let chars: Vec<char> = body.chars().collect();
    let mut format = String::with_capacity(body.len());
    let mut replaced = false;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                format.push(chars[i + 1]);
                i += 2;
            }
            '(' if !replaced && chars.get(i + 1) != Some(&'?') => {
                let mut depth = 0usize;
                let mut j = i;
                while j < chars.len() {
                    match chars[j] {
                        '\\' => {
                            j += 2;
                            continue;
                        }
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    j += 1;
                }
                format.push_str(SLOT);
                replaced = true;
                i = j + 1;
            }
            c => {
                format.push(c);
                i += 1;
            }
        }
    }

    if replaced {
        format
    } else {
        SLOT.to_string()
    }
}
