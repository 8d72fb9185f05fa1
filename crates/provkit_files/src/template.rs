//! Placeholder substitution over a content provider.

use std::collections::HashMap;

use regex::{Captures, Regex};
use tracing::debug;

use crate::content::ContentProvider;
use crate::error::{FilesError, FilesResult};

/// A template backed by a content provider.
///
/// Substitution is a single left-to-right pass over the content. Where two
/// placeholders start at the same position the one supplied first wins, and
/// replacement text is never scanned again.
pub struct Template<C> {
    source: C,
}

impl<C: ContentProvider> Template<C> {
    pub fn new(source: C) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    pub fn into_inner(self) -> C {
        self.source
    }

    /// Render the content with every placeholder replaced by its value.
    ///
    /// The backing content is left untouched. Placeholders that do not occur
    /// are ignored.
    pub fn apply_using<I, K, V>(&mut self, placeholders: I) -> FilesResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let content = self.source.content()?;

        let mut keys = Vec::new();
        let mut values = HashMap::new();
        for (key, value) in placeholders {
            let key = key.into();
            if key.is_empty() || values.contains_key(&key) {
                continue;
            }
            values.insert(key.clone(), value.into());
            keys.push(key);
        }

        if keys.is_empty() {
            return Ok(content);
        }

        let alternation = keys
            .iter()
            .map(|key| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&alternation).map_err(|e| FilesError::InvalidPattern {
            name: "placeholders".to_string(),
            message: e.to_string(),
        })?;

        debug!("Applying {} placeholders", keys.len());
        let rendered = pattern.replace_all(&content, |caps: &Captures| {
            let matched = &caps[0];
            values
                .get(matched)
                .cloned()
                .unwrap_or_else(|| matched.to_string())
        });
        Ok(rendered.into_owned())
    }
}
