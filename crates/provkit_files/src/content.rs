//! Content providers consumed by the section, template and parsable helpers.

use crate::error::FilesResult;
use crate::file::File;

/// Something that holds text which can be read and replaced in memory.
pub trait ContentProvider {
    /// The current content.
    fn content(&mut self) -> FilesResult<String>;

    /// Replace the content in memory. Persisting it is up to the owner.
    fn set_content(&mut self, content: String);

    fn content_lines(&mut self) -> FilesResult<Vec<String>> {
        Ok(self.content()?.lines().map(str::to_string).collect())
    }
}

impl ContentProvider for File {
    fn content(&mut self) -> FilesResult<String> {
        self.read(false)
    }

    fn set_content(&mut self, content: String) {
        self.set_data(content);
    }
}

impl ContentProvider for String {
    fn content(&mut self) -> FilesResult<String> {
        Ok(self.clone())
    }

    fn set_content(&mut self, content: String) {
        *self = content;
    }
}

impl<T: ContentProvider + ?Sized> ContentProvider for &mut T {
    fn content(&mut self) -> FilesResult<String> {
        (**self).content()
    }

    fn set_content(&mut self, content: String) {
        (**self).set_content(content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_provider() {
        let mut text = String::from("a\nb");
        assert_eq!(text.content_lines().unwrap(), vec!["a", "b"]);
        text.set_content("c".to_string());
        assert_eq!(text, "c");
    }

    #[test]
    fn test_file_provider_stays_in_memory() {
        let mut file = File::stub().with_data("cached");
        assert_eq!(file.content().unwrap(), "cached");
        file.set_content("changed".to_string());
        assert_eq!(file.data(), Some("changed"));
    }
}
