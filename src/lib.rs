pub mod config;
pub mod error;
pub mod extractors;
pub mod fetcher;
pub mod model;
pub mod pipeline;
pub mod store;

pub use config::AppConfig;
pub use error::{ExtractError, StoreError};
pub use model::{NewRecipe, RecipeDraft, RecipeRecord, RecipeResponse, RecipeUpdate};
pub use pipeline::{extract, Extraction, ExtractionStatus, UrlPipeline};
pub use store::{RecipeStore, SqliteStore};
