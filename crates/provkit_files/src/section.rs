//! Delimited configuration sections.
//!
//! A section is a block of configuration whose first line is its start marker
//! and whose last non-blank line is its end marker, for example:
//!
//! ```text
//! # BEGIN WordPress
//! RewriteEngine On
//! # END WordPress
//! ```
//!
//! Applying a section to a larger document inserts the block once, leaves an
//! identical block alone, and refuses to clobber a block that was edited in
//! place unless asked to.

use tracing::{debug, info};

use crate::content::ContentProvider;
use crate::error::{FilesError, FilesResult};

/// A section backed by a content provider.
pub struct Section<C> {
    source: C,
}

impl<C: ContentProvider> Section<C> {
    pub fn new(source: C) -> Self {
        Self { source }
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

    /// The section text without trailing whitespace.
    pub fn text(&mut self) -> FilesResult<String> {
        let content = self.source.content()?;
        let text = content.trim_end();
        if text.trim().is_empty() {
            return Err(FilesError::MalformedSection(
                "section content is empty".to_string(),
            ));
        }
        Ok(text.to_string())
    }

    /// The first line of the section.
    pub fn start_section(&mut self) -> FilesResult<String> {
        let text = self.text()?;
        Ok(text.lines().next().unwrap_or_default().to_string())
    }

    /// The last non-blank line of the section.
    pub fn end_section(&mut self) -> FilesResult<String> {
        let text = self.text()?;
        Ok(text
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or_default()
            .to_string())
    }

    /// Whether `haystack` already contains the section verbatim.
    pub fn is_applied(&mut self, haystack: &str) -> FilesResult<bool> {
        Ok(haystack.contains(&self.text()?))
    }

    /// Whether `haystack` contains the section's markers.
    ///
    /// Finding only one marker, or the end marker before the start marker,
    /// is a `MalformedSection` error rather than `false`.
    pub fn is_in(&mut self, haystack: &str) -> FilesResult<bool> {
        Ok(self.locate(haystack)?.is_some())
    }

    /// Insert the section into `haystack` and return the result.
    ///
    /// - already present verbatim: `haystack` is returned unchanged
    /// - markers present with different content: `AlteredSection`, unless
    ///   `overwrite` is set, in which case the delimited span is replaced
    /// - markers absent: the section is appended after a blank line
    pub fn apply_to(&mut self, haystack: &str, overwrite: bool) -> FilesResult<String> {
        let text = self.text()?;
        if haystack.contains(&text) {
            debug!("Section already applied");
            return Ok(haystack.to_string());
        }

        match self.locate(haystack)? {
            Some((start, end)) => {
                if !overwrite {
                    let start_marker = self.start_section()?;
                    return Err(FilesError::AlteredSection(start_marker));
                }
                info!("Replacing altered section");
                let mut result = String::with_capacity(haystack.len() + text.len());
                result.push_str(&haystack[..start]);
                result.push_str(&text);
                result.push_str(&haystack[end..]);
                Ok(result)
            }
            None => {
                info!("Appending section");
                Ok(format!("{}\n{}\n", haystack, text))
            }
        }
    }

    /// Byte span of the delimited block in `haystack`, end exclusive.
    fn locate(&mut self, haystack: &str) -> FilesResult<Option<(usize, usize)>> {
        let start_marker = self.start_section()?;
        let end_marker = self.end_section()?;

        match (haystack.find(&start_marker), haystack.find(&end_marker)) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(FilesError::MalformedSection(format!(
                "found {:?} without {:?}",
                start_marker, end_marker
            ))),
            (None, Some(_)) => Err(FilesError::MalformedSection(format!(
                "found {:?} without {:?}",
                end_marker, start_marker
            ))),
            (Some(start), Some(end)) if end < start => Err(FilesError::MalformedSection(
                format!("{:?} appears before {:?}", end_marker, start_marker),
            )),
            (Some(start), Some(_)) => {
                let search_from = if start_marker == end_marker {
                    start
                } else {
                    start + start_marker.len()
                };
                let end = haystack[search_from..]
                    .find(&end_marker)
                    .map(|offset| search_from + offset + end_marker.len())
                    .ok_or_else(|| {
                        FilesError::MalformedSection(format!(
                            "{:?} is not closed by {:?}",
                            start_marker, end_marker
                        ))
                    })?;
                Ok(Some((start, end)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION: &str = "# BEGIN App\nRewriteEngine On\nRewriteBase /\n# END App\n\n";

    fn section() -> Section<String> {
        Section::new(SECTION.to_string())
    }

    #[test]
    fn test_markers() {
        let mut section = section();
        assert_eq!(section.start_section().unwrap(), "# BEGIN App");
        assert_eq!(section.end_section().unwrap(), "# END App");
    }

    #[test]
    fn test_apply_appends_when_absent() {
        let haystack = "Options -Indexes";
        let result = section().apply_to(haystack, false).unwrap();
        assert_eq!(
            result,
            format!("{}\n{}\n", haystack, SECTION.trim_end())
        );
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut section = section();
        let once = section.apply_to("Options -Indexes", false).unwrap();
        assert!(section.is_applied(&once).unwrap());
        assert!(section.is_in(&once).unwrap());
        assert_eq!(section.apply_to(&once, false).unwrap(), once);
    }

    #[test]
    fn test_altered_section_is_refused() {
        let haystack = "before\n# BEGIN App\nRewriteEngine Off\n# END App\nafter\n";
        let err = section().apply_to(haystack, false).unwrap_err();
        assert!(matches!(err, FilesError::AlteredSection(_)));
    }

    #[test]
    fn test_altered_section_is_overwritten_in_place() {
        let haystack = "before\n# BEGIN App\nRewriteEngine Off\n# END App\nafter\n";
        let result = section().apply_to(haystack, true).unwrap();
        assert_eq!(
            result,
            "before\n# BEGIN App\nRewriteEngine On\nRewriteBase /\n# END App\nafter\n"
        );
    }

    #[test]
    fn test_single_marker_is_malformed() {
        let mut section = section();
        assert!(matches!(
            section.is_in("# BEGIN App\nno end here"),
            Err(FilesError::MalformedSection(_))
        ));
        assert!(matches!(
            section.is_in("no start here\n# END App"),
            Err(FilesError::MalformedSection(_))
        ));
    }

    #[test]
    fn test_out_of_order_markers_are_malformed() {
        let haystack = "# END App\nstuff\n# BEGIN App\n";
        assert!(matches!(
            section().is_in(haystack),
            Err(FilesError::MalformedSection(_))
        ));
    }

    #[test]
    fn test_no_markers_is_not_in() {
        assert!(!section().is_in("unrelated").unwrap());
    }

    #[test]
    fn test_empty_section_is_malformed() {
        let mut section = Section::new("\n\n".to_string());
        assert!(matches!(
            section.apply_to("x", false),
            Err(FilesError::MalformedSection(_))
        ));
    }
}
