//! Core vocabulary for plan-tiered quotas.
//!
//! `ResourceKind` and `FeatureId` are closed enumerations: adding a variant
//! is a data change in the catalog, not a logic change anywhere else.
//! `Limit` replaces the `-1 = unlimited` sentinel with a tagged value so
//! every consumer handles both cases explicitly.

use serde::{Deserialize, Serialize};

/// A countable, plan-limited resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    /// A recipe owned by the account.
    Recipe,
    /// A shopping list owned by the account.
    ShoppingList,
}

impl ResourceKind {
    /// Every resource kind, in report order.
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Recipe, ResourceKind::ShoppingList];

    /// Wire key for this kind in the usage report (`usage.<key>`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recipe => "recipes",
            Self::ShoppingList => "shopping_lists",
        }
    }

    /// Singular label for user-facing messages.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Recipe => "recipe",
            Self::ShoppingList => "shopping list",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A capability gated by plan tier.
///
/// Plans either grant or withhold a feature; there are no partial or
/// metered features.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FeatureId {
    /// Create and manage recipes.
    BasicRecipes,
    /// Weekly meal planning.
    BasicMealPlanning,
    /// AI-powered recipe recommendations.
    AiRecommendations,
    /// Multi-week planning and templates.
    AdvancedMealPlanning,
    /// Per-recipe nutritional breakdown.
    NutritionalAnalysis,
    /// Import recipes from external sites.
    RecipeImport,
    /// Share plans and lists with household members.
    FamilySharing,
    /// Kid-friendly guided cooking.
    KidsCookingMode,
    /// Household dietary restriction management.
    DietaryRestrictions,
    /// Priority support queue.
    PrioritySupport,
}

impl FeatureId {
    /// Stable identifier used on the wire and in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BasicRecipes => "basic_recipes",
            Self::BasicMealPlanning => "basic_meal_planning",
            Self::AiRecommendations => "ai_recommendations",
            Self::AdvancedMealPlanning => "advanced_meal_planning",
            Self::NutritionalAnalysis => "nutritional_analysis",
            Self::RecipeImport => "recipe_import",
            Self::FamilySharing => "family_sharing",
            Self::KidsCookingMode => "kids_cooking_mode",
            Self::DietaryRestrictions => "dietary_restrictions",
            Self::PrioritySupport => "priority_support",
        }
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maximum count of a resource kind a plan permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// At most this many resources may exist.
    Finite(u64),
    /// No cap on this resource.
    Unlimited,
}

impl Limit {
    /// Check whether this is the unlimited value.
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Whether one more resource may be created at the given current count.
    #[must_use]
    pub fn allows(&self, current: u64) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Finite(max) => current < *max,
        }
    }

    /// Wire representation: the cap, or `-1` for unlimited.
    ///
    /// Only the HTTP layer uses this; everything else stays tagged.
    #[must_use]
    pub fn as_wire(&self) -> i64 {
        match self {
            Self::Finite(max) => *max as i64,
            Self::Unlimited => -1,
        }
    }
}

impl From<u64> for Limit {
    fn from(max: u64) -> Self {
        Self::Finite(max)
    }
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(max) => write!(f, "{max}"),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}
