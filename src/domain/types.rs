//! Shared domain enumerations used at the database and HTTP boundaries.

use serde::{Deserialize, Serialize};

/// Closed category taxonomy. A post belongs to exactly one concrete
/// category; `All` is the aggregate used for filtering and cache keys
/// and is never stored on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Career,
    Startup,
    Academic,
    Relationship,
    Health,
    Life,
    All,
}

impl Category {
    /// Concrete categories a post can be stored under.
    pub const CONCRETE: [Category; 6] = [
        Category::Career,
        Category::Startup,
        Category::Academic,
        Category::Relationship,
        Category::Health,
        Category::Life,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Career => "Career",
            Category::Startup => "Startup",
            Category::Academic => "Academic",
            Category::Relationship => "Relationship",
            Category::Health => "Health",
            Category::Life => "Life",
            Category::All => "All",
        }
    }

    pub fn is_aggregate(self) -> bool {
        matches!(self, Category::All)
    }

    /// Stable index into per-category tables (generation stamps).
    /// `All` carries its own slot.
    pub fn slot(self) -> usize {
        match self {
            Category::Career => 0,
            Category::Startup => 1,
            Category::Academic => 2,
            Category::Relationship => 3,
            Category::Health => 4,
            Category::Life => 5,
            Category::All => 6,
        }
    }

    pub const SLOT_COUNT: usize = 7;
}

impl TryFrom<&str> for Category {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Career" => Ok(Category::Career),
            "Startup" => Ok(Category::Startup),
            "Academic" => Ok(Category::Academic),
            "Relationship" => Ok(Category::Relationship),
            "Health" => Ok(Category::Health),
            "Life" => Ok(Category::Life),
            "All" => Ok(Category::All),
            _ => Err(()),
        }
    }
}

/// Requested feed ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedSort {
    New,
    Hot,
    Top,
    ForYou,
}

impl FeedSort {
    pub const ALL: [FeedSort; 4] = [FeedSort::New, FeedSort::Hot, FeedSort::Top, FeedSort::ForYou];

    pub fn as_str(self) -> &'static str {
        match self {
            FeedSort::New => "new",
            FeedSort::Hot => "hot",
            FeedSort::Top => "top",
            FeedSort::ForYou => "for-you",
        }
    }

    /// Personalized sorts key cache entries by user and are never
    /// shared across users.
    pub fn is_personalized(self) -> bool {
        matches!(self, FeedSort::ForYou)
    }
}

impl TryFrom<&str> for FeedSort {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "new" => Ok(FeedSort::New),
            "hot" => Ok(FeedSort::Hot),
            "top" => Ok(FeedSort::Top),
            "for-you" => Ok(FeedSort::ForYou),
            _ => Err(()),
        }
    }
}

/// Counted interaction kinds affecting a post's rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Reaction,
    Downvote,
    View,
}

impl InteractionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionKind::Reaction => "reaction",
            InteractionKind::Downvote => "downvote",
            InteractionKind::View => "view",
        }
    }
}
