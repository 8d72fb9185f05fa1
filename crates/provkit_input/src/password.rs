//! Random password generation.

use rand::seq::IndexedRandom;
use tracing::debug;

use crate::error::{InputError, InputResult};

pub const DEFAULT_LENGTH: usize = 18;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SPECIAL: &str = "^!$%&=?{[]}+~#-_.:,;<>|";

/// Named groups of characters a password is drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    subsets: Vec<(String, Vec<char>)>,
}

impl CharSet {
    /// A set with no subsets.
    pub fn empty() -> Self {
        Self {
            subsets: Vec::new(),
        }
    }

    /// Add a subset. Empty subsets are ignored.
    pub fn with_subset(mut self, name: impl Into<String>, chars: &str) -> Self {
        let chars: Vec<char> = chars.chars().collect();
        if !chars.is_empty() {
            self.subsets.push((name.into(), chars));
        }
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.subsets.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }
}

impl Default for CharSet {
    fn default() -> Self {
        Self::empty()
            .with_subset("small", LOWERCASE)
            .with_subset("nums", DIGITS)
            .with_subset("big", UPPERCASE)
            .with_subset("special", SPECIAL)
    }
}

/// Generate a password of `length` characters.
///
/// Each character comes from a randomly chosen subset, and a subset holding
/// the previous character is never chosen next unless no other subset is left.
pub fn generate_pw(length: usize, char_set: &CharSet) -> InputResult<String> {
    if char_set.is_empty() {
        return Err(InputError::EmptyCharSet);
    }

    let mut rng = rand::rng();
    let mut password = String::with_capacity(length);
    let mut previous: Option<char> = None;

    for _ in 0..length {
        let candidates: Vec<&Vec<char>> = char_set
            .subsets
            .iter()
            .map(|(_, chars)| chars)
            .filter(|chars| previous.map_or(true, |p| !chars.contains(&p)))
            .collect();
        let subset = if candidates.is_empty() {
            char_set.subsets.choose(&mut rng).map(|(_, chars)| chars)
        } else {
            candidates.choose(&mut rng).copied()
        };

        let next = subset
            .and_then(|chars| chars.choose(&mut rng))
            .copied()
            .ok_or(InputError::EmptyCharSet)?;
        password.push(next);
        previous = Some(next);
    }

    debug!("Generated password of {} characters", length);
    Ok(password)
}
