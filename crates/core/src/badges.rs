//! Static badge catalog.
//!
//! Every badge a user can earn is enumerated here as a [`BadgeKind`]. The
//! persisted `badges` table is seeded from [`BadgeKind::ALL`] at startup and
//! never mutated afterwards, so this module is the single source of truth
//! for codes, names, categories and achievement conditions.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Badge category names (stored in `badges.category`).
pub const CATEGORY_POST: &str = "POST";
pub const CATEGORY_COMMENT: &str = "COMMENT";
pub const CATEGORY_FISHING: &str = "FISHING";
pub const CATEGORY_ACHIEVEMENT: &str = "ACHIEVEMENT";

/// Prefix for badge artwork paths served by the static asset host.
const IMAGE_PREFIX: &str = "/static/badges/";

// ---------------------------------------------------------------------------
// BadgeCategory
// ---------------------------------------------------------------------------

/// Closed set of badge categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeCategory {
    Post,
    Comment,
    Fishing,
    Achievement,
}

impl BadgeCategory {
    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => CATEGORY_POST,
            Self::Comment => CATEGORY_COMMENT,
            Self::Fishing => CATEGORY_FISHING,
            Self::Achievement => CATEGORY_ACHIEVEMENT,
        }
    }
}

// ---------------------------------------------------------------------------
// BadgeKind
// ---------------------------------------------------------------------------

/// Every badge kind known to the platform.
///
/// The serialized form is the badge `code` (e.g. `"FIRST_POST"`), which is
/// also the natural key of the `badges` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeKind {
    FirstPost,
    ProlificAngler,
    FirstComment,
    Conversationalist,
    BigFishCatcher,
    TrophyHunter,
    CrowdFavorite,
}

impl BadgeKind {
    /// Catalog order used for seeding and for status listings.
    pub const ALL: [BadgeKind; 7] = [
        Self::FirstPost,
        Self::ProlificAngler,
        Self::FirstComment,
        Self::Conversationalist,
        Self::BigFishCatcher,
        Self::TrophyHunter,
        Self::CrowdFavorite,
    ];

    /// Stable symbolic code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FirstPost => "FIRST_POST",
            Self::ProlificAngler => "PROLIFIC_ANGLER",
            Self::FirstComment => "FIRST_COMMENT",
            Self::Conversationalist => "CONVERSATIONALIST",
            Self::BigFishCatcher => "BIG_FISH_CATCHER",
            Self::TrophyHunter => "TROPHY_HUNTER",
            Self::CrowdFavorite => "CROWD_FAVORITE",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::FirstPost => "First Cast",
            Self::ProlificAngler => "Prolific Angler",
            Self::FirstComment => "First Words",
            Self::Conversationalist => "Conversationalist",
            Self::BigFishCatcher => "Big Fish Catcher",
            Self::TrophyHunter => "Trophy Hunter",
            Self::CrowdFavorite => "Crowd Favorite",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FirstPost => "Shared a first catch with the community.",
            Self::ProlificAngler => "Keeps the feed full of fresh catches.",
            Self::FirstComment => "Joined the conversation for the first time.",
            Self::Conversationalist => "A familiar voice in every thread.",
            Self::BigFishCatcher => "Landed a fish longer than a metre.",
            Self::TrophyHunter => "Landed a fish longer than two metres.",
            Self::CrowdFavorite => "Posted a catch the whole community loved.",
        }
    }

    pub fn category(&self) -> BadgeCategory {
        match self {
            Self::FirstPost | Self::ProlificAngler => BadgeCategory::Post,
            Self::FirstComment | Self::Conversationalist => BadgeCategory::Comment,
            Self::BigFishCatcher | Self::TrophyHunter => BadgeCategory::Fishing,
            Self::CrowdFavorite => BadgeCategory::Achievement,
        }
    }

    /// Human-readable achievement condition shown to users.
    pub fn achievement_condition(&self) -> &'static str {
        match self {
            Self::FirstPost => "Publish your first post",
            Self::ProlificAngler => "Publish 10 posts",
            Self::FirstComment => "Write your first comment",
            Self::Conversationalist => "Write 50 comments",
            Self::BigFishCatcher => "Record a catch longer than 100 cm",
            Self::TrophyHunter => "Record a catch longer than 200 cm",
            Self::CrowdFavorite => "Have a single post liked 10 times",
        }
    }

    /// Path of the badge artwork, derived from the code.
    pub fn image_ref(&self) -> String {
        format!("{IMAGE_PREFIX}{}.png", self.code().to_ascii_lowercase())
    }

    /// Build the immutable definition row for this kind.
    pub fn definition(&self) -> BadgeDefinition {
        BadgeDefinition {
            code: self.code().to_string(),
            display_name: self.display_name().to_string(),
            description: self.description().to_string(),
            category: self.category(),
            achievement_condition: self.achievement_condition().to_string(),
            image_ref: self.image_ref(),
        }
    }
}

impl fmt::Display for BadgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// BadgeDefinition
// ---------------------------------------------------------------------------

/// Catalog entry as inserted into the `badges` table during seeding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub code: String,
    pub display_name: String,
    pub description: String,
    pub category: BadgeCategory,
    pub achievement_condition: String,
    pub image_ref: String,
}

/// Definitions for the whole catalog, in catalog order.
pub fn catalog() -> Vec<BadgeDefinition> {
    BadgeKind::ALL.iter().map(BadgeKind::definition).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
