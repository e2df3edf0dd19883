//! Tag names and the per-design tag set.
//!
//! Tags are stored lowercase and trimmed. A design carries at most
//! [`TAGS_PER_DESIGN_MAX`] distinct tags; duplicates that differ only in case
//! or surrounding whitespace collapse into one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of tags submitted for one design.
pub const TAGS_PER_DESIGN_MAX: usize = 10;
/// Maximum tag length after trimming.
pub const TAG_NAME_MAX: usize = 50;

/// Validation errors raised by [`TagSet::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagValidationError {
    /// More than [`TAGS_PER_DESIGN_MAX`] tags were submitted.
    #[error("at most {max} tags are allowed, got {count}")]
    TooMany { count: usize, max: usize },
    /// The tag at `index` was blank.
    #[error("tag {index} must not be empty")]
    Empty { index: usize },
    /// The tag at `index` exceeded [`TAG_NAME_MAX`].
    #[error("tag {index} must be at most {max} characters")]
    TooLong { index: usize, max: usize },
}

/// Normalised tag name.
///
/// # Examples
/// ```
/// use pawprint::domain::TagName;
///
/// assert_eq!(TagName::new(" Cute ").unwrap().as_str(), "cute");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    /// Trim, lowercase and length-check a raw tag.
    pub fn new(raw: &str) -> Result<Self, TagValidationError> {
        Self::at(0, raw)
    }

    fn at(index: usize, raw: &str) -> Result<Self, TagValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TagValidationError::Empty { index });
        }
        if trimmed.chars().count() > TAG_NAME_MAX {
            return Err(TagValidationError::TooLong {
                index,
                max: TAG_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TagName> for String {
    fn from(value: TagName) -> Self {
        value.0
    }
}

impl TryFrom<String> for TagName {
    type Error = TagValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

/// Deduplicated tag names for one design, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<TagName>);

impl TagSet {
    /// Validate and normalise the submitted tags.
    ///
    /// The count limit applies to the submission, before duplicates collapse.
    ///
    /// # Examples
    /// ```
    /// use pawprint::domain::TagSet;
    ///
    /// let tags = TagSet::parse(["Cute", " cute "]).unwrap();
    /// assert_eq!(tags.len(), 1);
    /// ```
    pub fn parse<I, S>(raw: I) -> Result<Self, TagValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<S> = raw.into_iter().collect();
        if raw.len() > TAGS_PER_DESIGN_MAX {
            return Err(TagValidationError::TooMany {
                count: raw.len(),
                max: TAGS_PER_DESIGN_MAX,
            });
        }
        let mut names: Vec<TagName> = Vec::with_capacity(raw.len());
        for (index, tag) in raw.iter().enumerate() {
            let name = TagName::at(index, tag.as_ref())?;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(Self(names))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagName> {
        self.0.iter()
    }
}

impl IntoIterator for TagSet {
    type Item = TagName;
    type IntoIter = std::vec::IntoIter<TagName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Stored tag with its association count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: TagName,
    #[serde(default)]
    pub usage_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rejects_eleven_tags() {
        let raw: Vec<String> = (0..11).map(|i| format!("t{i}")).collect();
        assert_eq!(
            TagSet::parse(&raw).expect_err("too many"),
            TagValidationError::TooMany { count: 11, max: 10 }
        );
    }

    #[rstest]
    fn accepts_ten_tags() {
        let raw: Vec<String> = (0..10).map(|i| format!("t{i}")).collect();
        assert_eq!(TagSet::parse(&raw).expect("ten tags").len(), 10);
    }

    #[rstest]
    #[case(&"a".repeat(51), TagValidationError::TooLong { index: 1, max: 50 })]
    #[case("   ", TagValidationError::Empty { index: 1 })]
    fn rejects_invalid_entries(#[case] bad: &str, #[case] expected: TagValidationError) {
        assert_eq!(TagSet::parse(["ok", bad]).expect_err("invalid"), expected);
    }

    #[rstest]
    fn fifty_characters_is_allowed() {
        let raw = "a".repeat(50);
        assert!(TagSet::parse([raw.as_str()]).is_ok());
    }

    #[rstest]
    fn collapses_case_and_whitespace_duplicates() {
        let tags = TagSet::parse(["Cute", " cute ", "Fluffy"]).expect("valid");
        let names: Vec<&str> = tags.iter().map(TagName::as_str).collect();
        assert_eq!(names, vec!["cute", "fluffy"]);
    }
}
