//! Tags and tag expressions.
//!
//! A [`TagExpression`] is a union of intersections. `Flat` lists one
//! intersection group; `Grouped` lists several, and a key matches when it
//! carries every tag of at least one group:
//!
//! ```text
//! Grouped([[t0, t1], [t2, t3]])  ==  SINTER(t0, t1) ∪ SINTER(t2, t3)
//! Flat([t0, t1])                 ==  Grouped([[t0, t1]])
//! ```
use std::collections::BTreeSet;
use std::fmt;

/// A tag name with surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(String);

impl Tag {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits a comma-separated header value into tags, dropping blanks.
    pub fn split_list(header: &str) -> Vec<Tag> {
        header
            .split(',')
            .map(Tag::new)
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Tag {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagExpression {
    /// One intersection group.
    Flat(Vec<Tag>),
    /// Union of intersection groups.
    Grouped(Vec<Vec<Tag>>),
}

impl TagExpression {
    pub fn flat<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        Self::Flat(tags.into_iter().map(Into::into).collect())
    }

    pub fn grouped<I, G, T>(groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        Self::Grouped(
            groups
                .into_iter()
                .map(|group| group.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Normalizes to intersection groups. An empty flat list is no group at
    /// all, while an empty inner group survives and later matches nothing.
    pub fn into_groups(self) -> Vec<Vec<Tag>> {
        match self {
            Self::Flat(tags) if tags.is_empty() => Vec::new(),
            Self::Flat(tags) => vec![tags],
            Self::Grouped(groups) => groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Flat(tags) => tags.is_empty(),
            Self::Grouped(groups) => groups.is_empty(),
        }
    }
}

impl From<Vec<Tag>> for TagExpression {
    fn from(tags: Vec<Tag>) -> Self {
        Self::Flat(tags)
    }
}

impl From<Vec<Vec<Tag>>> for TagExpression {
    fn from(groups: Vec<Vec<Tag>>) -> Self {
        Self::Grouped(groups)
    }
}

/// Outcome of an invalidation: every key that matched the expression, and how
/// many of them the store actually deleted. `really_deleted` below
/// `attempted.len()` means some keys were already gone, which is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invalidation {
    pub attempted: BTreeSet<String>,
    pub really_deleted: usize,
}

impl Invalidation {
    /// Matched keys that were already absent from the store.
    pub fn already_gone(&self) -> usize {
        self.attempted.len().saturating_sub(self.really_deleted)
    }
}
