use crate::extractors::text::{normalize, TextCollector};
use serde::{Deserialize, Serialize};

/// Best-effort recipe pulled out of a single web page.
///
/// Every list is deduplicated and holds only non-empty, normalized strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecipeDraft {
    pub name: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub categories: Vec<String>,
    pub source_url: String,
}

impl RecipeDraft {
    /// Draft with every field empty, used for soft failures
    pub fn empty(source_url: &str) -> Self {
        Self {
            source_url: source_url.to_string(),
            ..Default::default()
        }
    }

    /// True when no selector produced anything
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.ingredients.is_empty()
            && self.instructions.is_empty()
            && self.categories.is_empty()
    }
}

/// A recipe as persisted by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub categories: Vec<String>,
}

/// Insert payload for the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub name: String,
    pub url: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub categories: Vec<String>,
}

impl NewRecipe {
    /// The stored name is mandatory, so an unnamed draft falls back to its URL.
    pub fn from_draft(draft: RecipeDraft) -> Self {
        Self {
            name: draft.name.unwrap_or_else(|| draft.source_url.clone()),
            url: draft.source_url,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            categories: draft.categories,
        }
    }

    /// Clean hand-entered values the way extracted ones are: normalized,
    /// without empty entries or repeats. Categories are also split on commas
    /// so they read back exactly as stored.
    pub fn normalized(self) -> Self {
        let url = self.url.trim().to_string();
        let name = normalize(&self.name);
        Self {
            name: if name.is_empty() { url.clone() } else { name },
            url,
            ingredients: clean_list(self.ingredients),
            instructions: clean_list(self.instructions),
            categories: clean_categories(self.categories),
        }
    }
}

/// Partial update: only the `Some` fields are written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub url: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
}

impl RecipeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.url.is_none()
            && self.ingredients.is_none()
            && self.instructions.is_none()
            && self.categories.is_none()
    }

    /// Same cleanup as [`NewRecipe::normalized`]. A blank name or URL is
    /// dropped from the update rather than written.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| normalize(&n)).filter(|n| !n.is_empty()),
            url: self
                .url
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
            ingredients: self.ingredients.map(clean_list),
            instructions: self.instructions.map(clean_list),
            categories: self.categories.map(clean_categories),
        }
    }
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    let mut collector = TextCollector::new();
    for value in &values {
        collector.push(value);
    }
    collector.into_vec()
}

// Stored categories are comma joined, so a comma inside one would split it
fn clean_categories(values: Vec<String>) -> Vec<String> {
    let mut collector = TextCollector::new();
    for part in values.iter().flat_map(|v| v.split(',')) {
        collector.push(part);
    }
    collector.into_vec()
}

/// JSON payload handed to whoever wraps the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecipeResponse {
    Recipe {
        name: Option<String>,
        ingredients: Vec<String>,
        instructions: Vec<String>,
        categories: Vec<String>,
    },
    Error {
        error: String,
    },
}

impl From<RecipeDraft> for RecipeResponse {
    fn from(draft: RecipeDraft) -> Self {
        RecipeResponse::Recipe {
            name: draft.name,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            categories: draft.categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unnamed_draft_uses_url_as_name() {
        let draft = RecipeDraft {
            ingredients: vec!["2 eggs".to_string()],
            ..RecipeDraft::empty("https://example.com/eggs")
        };

        let recipe = NewRecipe::from_draft(draft);
        assert_eq!(recipe.name, "https://example.com/eggs");
        assert_eq!(recipe.url, "https://example.com/eggs");
        assert_eq!(recipe.ingredients, vec!["2 eggs"]);
    }

    #[test]
    fn test_hand_entered_recipe_is_cleaned() {
        let recipe = NewRecipe {
            name: "  Beef   Stew ".to_string(),
            url: " https://example.com/stew ".to_string(),
            ingredients: vec![
                "".to_string(),
                "\u{25a2} 1 kg beef".to_string(),
                "  ".to_string(),
                "1 kg  beef".to_string(),
            ],
            instructions: vec!["Brown the beef".to_string(), String::new()],
            categories: vec!["Soups, Stews".to_string(), "Stews".to_string()],
        }
        .normalized();

        assert_eq!(recipe.name, "Beef Stew");
        assert_eq!(recipe.url, "https://example.com/stew");
        assert_eq!(recipe.ingredients, vec!["1 kg beef"]);
        assert_eq!(recipe.instructions, vec!["Brown the beef"]);
        assert_eq!(recipe.categories, vec!["Soups", "Stews"]);
    }

    #[test]
    fn test_blank_name_falls_back_to_url() {
        let recipe = NewRecipe {
            name: "   ".to_string(),
            url: "https://example.com/x".to_string(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            categories: Vec::new(),
        }
        .normalized();

        assert_eq!(recipe.name, "https://example.com/x");
    }

    #[test]
    fn test_update_is_cleaned() {
        let update = RecipeUpdate {
            name: Some(" ".to_string()),
            url: None,
            ingredients: Some(vec!["".to_string(), " salt ".to_string()]),
            instructions: None,
            categories: Some(vec!["Quick,  Easy".to_string()]),
        }
        .normalized();

        assert_eq!(update.name, None);
        assert_eq!(update.ingredients, Some(vec!["salt".to_string()]));
        assert_eq!(
            update.categories,
            Some(vec!["Quick".to_string(), "Easy".to_string()])
        );
        assert!(!update.is_empty());
        assert!(RecipeUpdate {
            name: Some("".to_string()),
            ..Default::default()
        }
        .normalized()
        .is_empty());
    }

    #[test]
    fn test_response_serialization() {
        let draft = RecipeDraft {
            name: Some("Pancakes".to_string()),
            ingredients: vec!["1 cup flour".to_string()],
            ..RecipeDraft::empty("https://example.com/pancakes")
        };

        let json = serde_json::to_value(RecipeResponse::from(draft)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Pancakes",
                "ingredients": ["1 cup flour"],
                "instructions": [],
                "categories": []
            })
        );

        let error = RecipeResponse::Error {
            error: "boom".to_string(),
        };
        assert_eq!(
            serde_json::to_value(error).unwrap(),
            serde_json::json!({ "error": "boom" })
        );
    }

    #[test]
    fn test_unnamed_empty_draft_serializes_null_name() {
        let json = serde_json::to_value(RecipeResponse::from(RecipeDraft::empty("u"))).unwrap();
        assert!(json["name"].is_null());
        assert!(json.get("source_url").is_none());
    }
}
