//! Declarative selector configuration.
//!
//! Each recipe field gets an ordered list of CSS selectors, an optional
//! fallback selector tried only when the list finds nothing, and an
//! [`ExtractionPolicy`] deciding whether the first hit or every hit counts.
//! Adding support for another site template means adding a selector here,
//! not touching the extraction loop.

use serde::Deserialize;

/// Longest breadcrumb/tag text still accepted as a category.
pub const MAX_CATEGORY_WORDS: usize = 4;

const NAME_SELECTORS: &[&str] = &[
    "h1.headline",
    "h1.recipe-title",
    ".wprm-recipe-name",
    "h1.entry-title",
    ".headline",
    ".recipe-summary__h1",
    // AllRecipes
    ".article-heading.text-headline-400",
];

const CATEGORY_SELECTORS: &[&str] = &[
    ".breadcrumbs li a",
    ".category",
    ".tags a",
    ".recipe-categories a",
];

const INGREDIENT_SELECTORS: &[&str] = &[
    ".ingredient",
    ".ingredients-item",
    ".recipe-ingredient",
    ".wprm-recipe-ingredient",
    ".ingredients-section li",
    ".recipe-ingredients__list-item",
    "span.ingredients-item-name",
    ".ingredients-item-name",
    ".mm-recipes-structured-ingredients__list li",
];

const INSTRUCTION_SELECTORS: &[&str] = &[
    ".instruction",
    ".step",
    ".recipe-step",
    ".wprm-recipe-instruction",
    ".instructions-section li",
    ".recipe-directions__list--item",
    "div.paragraph p",
    ".instructions-section-item p",
    // AllRecipes
    "#mm-recipes-steps__content_1-0",
];

const INGREDIENT_FALLBACK: &str = ".wprm-recipe-ingredients li";
const INSTRUCTION_FALLBACK: &str = ".wprm-recipe-instructions li";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Categories,
    Ingredients,
    Instructions,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Categories => "categories",
            Field::Ingredients => "ingredients",
            Field::Instructions => "instructions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPolicy {
    /// The first non-empty text of the first selector that matches
    FirstMatch,
    /// Every match of every selector, in list order and then document order
    CollectAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: Field,
    pub policy: ExtractionPolicy,
    pub selectors: Vec<String>,
    pub fallback: Option<String>,
    /// Candidates with more words than this are dropped
    pub max_words: Option<usize>,
}

impl FieldRule {
    fn new(field: Field, policy: ExtractionPolicy, selectors: &[&str]) -> Self {
        Self {
            field,
            policy,
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            fallback: None,
            max_words: None,
        }
    }

    fn with_fallback(mut self, fallback: &str) -> Self {
        self.fallback = Some(fallback.to_string());
        self
    }

    fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = Some(max_words);
        self
    }
}

/// The complete rule set, one rule per field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorRules {
    pub name: FieldRule,
    pub categories: FieldRule,
    pub ingredients: FieldRule,
    pub instructions: FieldRule,
}

impl Default for SelectorRules {
    fn default() -> Self {
        Self {
            name: FieldRule::new(Field::Name, ExtractionPolicy::FirstMatch, NAME_SELECTORS),
            categories: FieldRule::new(
                Field::Categories,
                ExtractionPolicy::CollectAll,
                CATEGORY_SELECTORS,
            )
            .with_max_words(MAX_CATEGORY_WORDS),
            ingredients: FieldRule::new(
                Field::Ingredients,
                ExtractionPolicy::CollectAll,
                INGREDIENT_SELECTORS,
            )
            .with_fallback(INGREDIENT_FALLBACK),
            instructions: FieldRule::new(
                Field::Instructions,
                ExtractionPolicy::CollectAll,
                INSTRUCTION_SELECTORS,
            )
            .with_fallback(INSTRUCTION_FALLBACK),
        }
    }
}

/// Per-field selector overrides read from configuration.
///
/// A list that is present replaces the built-in list for that field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectorOverrides {
    #[serde(default)]
    pub name: Option<Vec<String>>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub ingredients_fallback: Option<String>,
    #[serde(default)]
    pub instructions: Option<Vec<String>>,
    #[serde(default)]
    pub instructions_fallback: Option<String>,
}

impl SelectorRules {
    pub fn with_overrides(mut self, overrides: &SelectorOverrides) -> Self {
        if let Some(selectors) = &overrides.name {
            self.name.selectors = selectors.clone();
        }
        if let Some(selectors) = &overrides.categories {
            self.categories.selectors = selectors.clone();
        }
        if let Some(selectors) = &overrides.ingredients {
            self.ingredients.selectors = selectors.clone();
        }
        if let Some(fallback) = &overrides.ingredients_fallback {
            self.ingredients.fallback = Some(fallback.clone());
        }
        if let Some(selectors) = &overrides.instructions {
            self.instructions.selectors = selectors.clone();
        }
        if let Some(fallback) = &overrides.instructions_fallback {
            self.instructions.fallback = Some(fallback.clone());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rule_shapes() {
        let rules = SelectorRules::default();
        assert_eq!(rules.name.selectors.len(), 7);
        assert_eq!(rules.categories.selectors.len(), 4);
        assert_eq!(rules.ingredients.selectors.len(), 9);
        assert_eq!(rules.instructions.selectors.len(), 9);

        assert_eq!(rules.name.policy, ExtractionPolicy::FirstMatch);
        assert_eq!(rules.categories.policy, ExtractionPolicy::CollectAll);
        assert_eq!(rules.categories.max_words, Some(4));
        assert_eq!(
            rules.ingredients.fallback.as_deref(),
            Some(".wprm-recipe-ingredients li")
        );
        assert_eq!(
            rules.instructions.fallback.as_deref(),
            Some(".wprm-recipe-instructions li")
        );
        assert!(rules.name.fallback.is_none());
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let overrides = SelectorOverrides {
            name: Some(vec!["h2.title".to_string()]),
            instructions_fallback: Some("ol.steps li".to_string()),
            ..Default::default()
        };

        let rules = SelectorRules::default().with_overrides(&overrides);
        assert_eq!(rules.name.selectors, vec!["h2.title"]);
        assert_eq!(rules.instructions.fallback.as_deref(), Some("ol.steps li"));
        assert_eq!(rules.ingredients, SelectorRules::default().ingredients);
    }
}
