use crate::error::ExtractError;
use crate::model::RecipeDraft;
use scraper::Html;

pub mod rules;
mod selector;
pub mod text;

pub use rules::{ExtractionPolicy, Field, FieldRule, SelectorOverrides, SelectorRules};
pub use selector::SelectorExtractor;

pub struct ParsingContext {
    pub url: String,
    pub document: Html,
}

impl ParsingContext {
    pub fn new(url: &str, html: &str) -> Self {
        Self {
            url: url.to_string(),
            document: Html::parse_document(html),
        }
    }
}

pub trait Extractor {
    fn parse(&self, context: &ParsingContext) -> Result<RecipeDraft, ExtractError>;
}
