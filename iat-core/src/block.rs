use crate::category::CategoryId;
use serde::{Deserialize, Serialize};

/// Response side. The presentation layer decides which physical keys map here.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Whether a block feeds the scored metric
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    #[default]
    Practice,
    Critical,
}

/// 1-based numbers of the two critical blocks, in configuration order
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPair {
    pub congruent: usize,
    pub incongruent: usize,
}

/// One test block: which categories sort to each side, which categories
/// supply stimuli, and how many trials to present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub left: Vec<CategoryId>,
    pub right: Vec<CategoryId>,
    pub stimuli: Vec<CategoryId>,
    pub trials: usize,
    #[serde(default)]
    pub kind: BlockKind,
}

impl BlockSpec {
    pub fn is_practice(&self) -> bool {
        matches!(self.kind, BlockKind::Practice)
    }

    pub fn is_critical(&self) -> bool {
        matches!(self.kind, BlockKind::Critical)
    }

    pub fn categories(&self, side: Side) -> &[CategoryId] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// The side whose category set contains `category`. Left wins if a
    /// malformed block lists it on both; validated configs never do.
    pub fn side_of(&self, category: &CategoryId) -> Option<Side> {
        if self.left.contains(category) {
            Some(Side::Left)
        } else if self.right.contains(category) {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Correct iff the pressed side's set contains the category.
    pub fn accepts(&self, side: Side, category: &CategoryId) -> bool {
        self.categories(side).contains(category)
    }
}
