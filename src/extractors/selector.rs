use super::rules::{ExtractionPolicy, Field, FieldRule, SelectorRules};
use super::text::{element_text, word_count, TextCollector};
use super::{Extractor, ParsingContext};
use crate::error::ExtractError;
use crate::model::RecipeDraft;
use log::debug;
use scraper::{Html, Selector};

/// Extracts a recipe by running each field's ordered selector list against
/// the document.
pub struct SelectorExtractor {
    name: CompiledRule,
    categories: CompiledRule,
    ingredients: CompiledRule,
    instructions: CompiledRule,
}

struct CompiledRule {
    field: Field,
    policy: ExtractionPolicy,
    selectors: Vec<(String, Selector)>,
    fallback: Option<(String, Selector)>,
    max_words: Option<usize>,
}

fn compile(selector: &str) -> Result<(String, Selector), ExtractError> {
    Selector::parse(selector)
        .map(|compiled| (selector.to_string(), compiled))
        .map_err(|e| ExtractError::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("{e:?}"),
        })
}

impl CompiledRule {
    fn new(rule: &FieldRule) -> Result<Self, ExtractError> {
        let selectors = rule
            .selectors
            .iter()
            .map(|s| compile(s))
            .collect::<Result<Vec<_>, _>>()?;
        let fallback = rule.fallback.as_deref().map(compile).transpose()?;

        Ok(Self {
            field: rule.field,
            policy: rule.policy,
            selectors,
            fallback,
            max_words: rule.max_words,
        })
    }

    fn evaluate(&self, document: &Html) -> Vec<String> {
        let mut found = self.run(document, &self.selectors);
        if found.is_empty() {
            if let Some(fallback) = &self.fallback {
                debug!("No {} found, trying fallback {}", self.field.as_str(), fallback.0);
                found = self.run(document, std::slice::from_ref(fallback));
            }
        }

        if let Some(max_words) = self.max_words {
            found.retain(|text| word_count(text) <= max_words);
        }
        found
    }

    fn run(&self, document: &Html, selectors: &[(String, Selector)]) -> Vec<String> {
        let mut collector = TextCollector::new();

        for (raw, selector) in selectors {
            let mut hits = 0;
            for element in document.select(selector) {
                if collector.push(&element_text(&element)) {
                    hits += 1;
                    if self.policy == ExtractionPolicy::FirstMatch {
                        debug!("Found {} using selector: {}", self.field.as_str(), raw);
                        return collector.into_vec();
                    }
                }
            }
            if hits > 0 {
                debug!("Found {} {} using selector: {}", hits, self.field.as_str(), raw);
            }
        }

        collector.into_vec()
    }
}

impl SelectorExtractor {
    /// Compile every selector up front; a bad selector is reported here.
    pub fn new(rules: &SelectorRules) -> Result<Self, ExtractError> {
        Ok(Self {
            name: CompiledRule::new(&rules.name)?,
            categories: CompiledRule::new(&rules.categories)?,
            ingredients: CompiledRule::new(&rules.ingredients)?,
            instructions: CompiledRule::new(&rules.instructions)?,
        })
    }
}

impl Extractor for SelectorExtractor {
    fn parse(&self, context: &ParsingContext) -> Result<RecipeDraft, ExtractError> {
        debug!("Attempting to extract recipe from {} using selectors", context.url);

        let document = &context.document;
        if !document.errors.is_empty() {
            debug!("HTML parser recovered from {} errors", document.errors.len());
        }

        let draft = RecipeDraft {
            name: self.name.evaluate(document).into_iter().next(),
            ingredients: self.ingredients.evaluate(document),
            instructions: self.instructions.evaluate(document),
            categories: self.categories.evaluate(document),
            source_url: context.url.clone(),
        };

        debug!("Recipe name: {:?}", draft.name);
        debug!("Ingredients count: {}", draft.ingredients.len());
        debug!("Instructions count: {}", draft.instructions.len());
        debug!("Categories count: {}", draft.categories.len());

        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> RecipeDraft {
        SelectorExtractor::new(&SelectorRules::default())
            .unwrap()
            .parse(&ParsingContext::new("https://example.com", html))
            .unwrap()
    }

    #[test]
    fn test_first_match_prefers_earlier_selector() {
        let html = r#"
            <h1 class="entry-title">Entry Title</h1>
            <h1 class="headline">Headline</h1>
        "#;
        let draft = extract(html);
        assert_eq!(draft.name.as_deref(), Some("Headline"));
    }

    #[test]
    fn test_first_match_skips_empty_elements() {
        let html = r#"
            <h1 class="headline">   </h1>
            <div class="wprm-recipe-name">Lentil Soup</div>
        "#;
        let draft = extract(html);
        assert_eq!(draft.name.as_deref(), Some("Lentil Soup"));
    }

    #[test]
    fn test_fallback_only_used_when_primary_list_is_empty() {
        let html = r#"
            <div class="wprm-recipe-ingredients"><ul><li>1 onion</li></ul></div>
            <div class="ingredient">2 carrots</div>
        "#;
        let draft = extract(html);
        assert_eq!(draft.ingredients, vec!["2 carrots"]);

        let html = r#"<div class="wprm-recipe-ingredients"><ul><li>1 onion</li></ul></div>"#;
        let draft = extract(html);
        assert_eq!(draft.ingredients, vec!["1 onion"]);
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let mut rules = SelectorRules::default();
        rules.categories.selectors.push("div[".to_string());

        match SelectorExtractor::new(&rules) {
            Err(ExtractError::InvalidSelector { selector, .. }) => assert_eq!(selector, "div["),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("expected selector compilation to fail"),
        }
    }
}
