use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a stimulus category, e.g. `chance` or `ki_partner`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A labelled category and the literal text items that belong to it.
/// Static for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusCategory {
    pub id: CategoryId,
    pub label: String,
    pub items: Vec<String>,
}

impl StimulusCategory {
    pub fn new<I, S>(id: impl Into<CategoryId>, label: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            label: label.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}
