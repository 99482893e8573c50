//! Plan catalog: the static table of subscription tiers.
//!
//! The catalog is fixed configuration, built once at process start and
//! shared read-only afterwards. Adding a plan or putting a new resource
//! kind under limit is a data change here, never a logic change in the
//! quota modules.
//!
//! # Example
//!
//! ```rust,ignore
//! use platewise_quota::plans::{FeatureId, PlanCatalog, ResourceKind};
//!
//! let catalog = PlanCatalog::builder()
//!     .plan("free")
//!         .display_name("Free")
//!         .limit(ResourceKind::Recipe, 50)
//!         .limit(ResourceKind::ShoppingList, 5)
//!         .features([FeatureId::BasicRecipes, FeatureId::BasicMealPlanning])
//!         .done()
//!     .plan("pro")
//!         .display_name("Pro")
//!         .feature(FeatureId::AiRecommendations)
//!         .done()
//!     .build();
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::types::{FeatureId, Limit, ResourceKind};

/// A collection of plan configurations, keyed by plan identifier.
#[derive(Clone, Debug, Default)]
pub struct PlanCatalog {
    plans: HashMap<String, PlanConfig>,
}

impl PlanCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing a catalog.
    #[must_use]
    pub fn builder() -> PlanCatalogBuilder {
        PlanCatalogBuilder::new()
    }

    /// The Platewise production tiers: `free`, `pro`, `family`.
    #[must_use]
    pub fn default_catalog() -> Self {
        Self::builder()
            .plan("free")
                .display_name("Free")
                .limit(ResourceKind::Recipe, 50)
                .limit(ResourceKind::ShoppingList, 5)
                .features([FeatureId::BasicRecipes, FeatureId::BasicMealPlanning])
                .done()
            .plan("pro")
                .display_name("Pro")
                .features([
                    FeatureId::BasicRecipes,
                    FeatureId::BasicMealPlanning,
                    FeatureId::AiRecommendations,
                    FeatureId::AdvancedMealPlanning,
                    FeatureId::NutritionalAnalysis,
                    FeatureId::RecipeImport,
                    FeatureId::FamilySharing,
                ])
                .done()
            .plan("family")
                .display_name("Family")
                .features([
                    FeatureId::BasicRecipes,
                    FeatureId::BasicMealPlanning,
                    FeatureId::AiRecommendations,
                    FeatureId::AdvancedMealPlanning,
                    FeatureId::NutritionalAnalysis,
                    FeatureId::RecipeImport,
                    FeatureId::FamilySharing,
                    FeatureId::KidsCookingMode,
                    FeatureId::DietaryRestrictions,
                    FeatureId::PrioritySupport,
                ])
                .done()
            .build()
    }

    /// Add a single plan config.
    pub fn add(&mut self, config: PlanConfig) {
        self.plans.insert(config.id.clone(), config);
    }

    /// Get a plan by ID.
    #[must_use]
    pub fn get(&self, plan_id: &str) -> Option<&PlanConfig> {
        self.plans.get(plan_id)
    }

    /// Check if a plan exists.
    #[must_use]
    pub fn contains(&self, plan_id: &str) -> bool {
        self.plans.contains_key(plan_id)
    }

    /// Get all plan IDs.
    #[must_use]
    pub fn plan_ids(&self) -> Vec<&str> {
        self.plans.keys().map(|s| s.as_str()).collect()
    }

    /// Get the number of plans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Check if there are no plans.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Iterate over all plans.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlanConfig)> {
        self.plans.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Configuration for a single plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanConfig {
    /// Plan identifier (e.g., "free", "pro").
    pub id: String,
    /// Display name for the plan.
    pub display_name: Option<String>,
    /// Resource limits for this plan.
    pub limits: PlanLimits,
    /// Features granted by this plan.
    pub features: BTreeSet<FeatureId>,
}

impl PlanConfig {
    /// Check if this plan grants a specific feature.
    #[must_use]
    pub fn has_feature(&self, feature: FeatureId) -> bool {
        self.features.contains(&feature)
    }

    /// The limit this plan puts on a resource kind.
    #[must_use]
    pub fn limit_for(&self, kind: ResourceKind) -> Limit {
        self.limits.limit_for(kind)
    }
}

/// Per-resource-kind limits for a plan.
///
/// A kind with no entry is unlimited, so a plan that caps nothing is just
/// the empty table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlanLimits {
    limits: BTreeMap<ResourceKind, Limit>,
}

impl PlanLimits {
    /// Create limits with no caps.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Set the limit for a resource kind.
    pub fn set(&mut self, kind: ResourceKind, limit: impl Into<Limit>) {
        self.limits.insert(kind, limit.into());
    }

    /// The limit for a resource kind.
    #[must_use]
    pub fn limit_for(&self, kind: ResourceKind) -> Limit {
        self.limits.get(&kind).copied().unwrap_or(Limit::Unlimited)
    }

    /// Iterate over the explicitly capped kinds.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, Limit)> + '_ {
        self.limits.iter().map(|(k, v)| (*k, *v))
    }
}

/// Builder for constructing a plan catalog.
#[derive(Debug, Default)]
pub struct PlanCatalogBuilder {
    plans: HashMap<String, PlanConfig>,
}

impl PlanCatalogBuilder {
    /// Create a new catalog builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start defining a new plan.
    #[must_use]
    pub fn plan(self, id: &str) -> PlanBuilder {
        PlanBuilder {
            parent: self,
            id: id.to_string(),
            display_name: None,
            limits: PlanLimits::default(),
            features: BTreeSet::new(),
        }
    }

    /// Build the catalog.
    #[must_use]
    pub fn build(self) -> PlanCatalog {
        PlanCatalog { plans: self.plans }
    }

    fn add_plan(mut self, config: PlanConfig) -> Self {
        self.plans.insert(config.id.clone(), config);
        self
    }
}

/// Builder for a single plan configuration.
#[derive(Debug)]
pub struct PlanBuilder {
    parent: PlanCatalogBuilder,
    id: String,
    display_name: Option<String>,
    limits: PlanLimits,
    features: BTreeSet<FeatureId>,
}

impl PlanBuilder {
    /// Set the display name.
    #[must_use]
    pub fn display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    /// Cap a resource kind. Kinds left unset are unlimited.
    #[must_use]
    pub fn limit(mut self, kind: ResourceKind, limit: impl Into<Limit>) -> Self {
        self.limits.set(kind, limit);
        self
    }

    /// Grant features to this plan.
    #[must_use]
    pub fn features<I>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = FeatureId>,
    {
        self.features.extend(features);
        self
    }

    /// Grant a single feature to this plan.
    #[must_use]
    pub fn feature(mut self, feature: FeatureId) -> Self {
        self.features.insert(feature);
        self
    }

    /// Finish defining this plan and return to the parent builder.
    #[must_use]
    pub fn done(self) -> PlanCatalogBuilder {
        let config = PlanConfig {
            id: self.id,
            display_name: self.display_name,
            limits: self.limits,
            features: self.features,
        };
        self.parent.add_plan(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_catalog() {
        let catalog = PlanCatalog::builder()
            .plan("starter")
            .limit(ResourceKind::Recipe, 10)
            .features([FeatureId::BasicRecipes])
            .done()
            .plan("plus")
            .feature(FeatureId::AiRecommendations)
            .done()
            .build();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("starter"));
        assert!(catalog.contains("plus"));
        assert!(!catalog.contains("enterprise"));
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_default_catalog_free_limits() {
        let catalog = PlanCatalog::default_catalog();
        let free = catalog.get("free").unwrap();

        assert_eq!(free.limit_for(ResourceKind::Recipe), Limit::Finite(50));
        assert_eq!(free.limit_for(ResourceKind::ShoppingList), Limit::Finite(5));
        assert!(free.has_feature(FeatureId::BasicRecipes));
        assert!(free.has_feature(FeatureId::BasicMealPlanning));
        assert!(!free.has_feature(FeatureId::AiRecommendations));
    }

    #[test]
    fn test_default_catalog_paid_tiers_are_unlimited() {
        let catalog = PlanCatalog::default_catalog();

        for plan_id in ["pro", "family"] {
            let plan = catalog.get(plan_id).unwrap();
            assert!(plan.limit_for(ResourceKind::Recipe).is_unlimited());
            assert!(plan.limit_for(ResourceKind::ShoppingList).is_unlimited());
            assert!(plan.has_feature(FeatureId::AiRecommendations));
        }

        let family = catalog.get("family").unwrap();
        assert!(family.has_feature(FeatureId::KidsCookingMode));
        assert!(family.has_feature(FeatureId::PrioritySupport));

        let pro = catalog.get("pro").unwrap();
        assert!(!pro.has_feature(FeatureId::KidsCookingMode));
    }

    #[test]
    fn test_unset_kind_is_unlimited() {
        let catalog = PlanCatalog::builder()
            .plan("recipes-only")
            .limit(ResourceKind::Recipe, 3)
            .done()
            .build();

        let plan = catalog.get("recipes-only").unwrap();
        assert_eq!(plan.limit_for(ResourceKind::Recipe), Limit::Finite(3));
        assert!(plan.limit_for(ResourceKind::ShoppingList).is_unlimited());
    }

    #[test]
    fn test_plan_limits_iter() {
        let mut limits = PlanLimits::unlimited();
        limits.set(ResourceKind::ShoppingList, 5);
        limits.set(ResourceKind::Recipe, 50);

        let entries: Vec<_> = limits.iter().collect();
        assert_eq!(
            entries,
            vec![
                (ResourceKind::Recipe, Limit::Finite(50)),
                (ResourceKind::ShoppingList, Limit::Finite(5)),
            ]
        );
    }
}
