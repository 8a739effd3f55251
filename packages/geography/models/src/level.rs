//! Administrative levels of the state → district → block → village tree.
//!
//! Levels are ordered from the root downwards, so `Level::State <
//! Level::Village`. Navigation helpers step one level at a time, which is
//! how the aggregation engine walks the tree.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One level of the four-level administrative hierarchy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Level {
    /// The single root of the hierarchy.
    State,
    /// Children of the state.
    District,
    /// Children of a district.
    Block,
    /// Leaf level (village / Gram Panchayat). Metrics are recorded here.
    Village,
}

impl Level {
    /// Distance from the root (`State` is 0, `Village` is 3).
    #[must_use]
    pub const fn depth(self) -> u8 {
        match self {
            Self::State => 0,
            Self::District => 1,
            Self::Block => 2,
            Self::Village => 3,
        }
    }

    /// The level directly below this one, `None` for the leaf level.
    #[must_use]
    pub const fn child(self) -> Option<Self> {
        match self {
            Self::State => Some(Self::District),
            Self::District => Some(Self::Block),
            Self::Block => Some(Self::Village),
            Self::Village => None,
        }
    }

    /// The level directly above this one, `None` for the root.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::State => None,
            Self::District => Some(Self::State),
            Self::Block => Some(Self::District),
            Self::Village => Some(Self::Block),
        }
    }

    /// Whether this is the leaf level.
    #[must_use]
    pub const fn is_leaf(self) -> bool {
        matches!(self, Self::Village)
    }

    /// Levels strictly below `self`, nearest first.
    ///
    /// `Level::District.descendants()` yields `[Block, Village]`.
    #[must_use]
    pub fn descendants(self) -> Vec<Self> {
        let mut levels = Vec::new();
        let mut current = self.child();
        while let Some(level) = current {
            levels.push(level);
            current = level.child();
        }
        levels
    }

    /// Returns all variants of this enum, root first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::State, Self::District, Self::Block, Self::Village]
    }
}
