use crate::config::AppConfig;
use crate::error::ExtractError;
use crate::extractors::{Extractor, ParsingContext, SelectorExtractor, SelectorRules};
use crate::fetcher::{RequestFetcher, BROWSER_USER_AGENT};
use crate::model::{RecipeDraft, RecipeResponse};
use log::{error, info, warn};

/// How an extraction ended
#[derive(Debug)]
pub enum ExtractionStatus {
    /// At least one field was filled
    Found,
    /// The page was fetched and parsed, but no selector matched
    Empty,
    FetchFailed(ExtractError),
    ParseFailed(ExtractError),
}

/// Result of [`UrlPipeline::extract`]: always a draft, plus how it came about.
///
/// Failed extractions carry an all-empty draft so callers that only want the
/// data can ignore the status.
#[derive(Debug)]
pub struct Extraction {
    pub draft: RecipeDraft,
    pub status: ExtractionStatus,
}

impl Extraction {
    fn failed(url: &str, err: ExtractError) -> Self {
        let status = if err.is_parse() {
            error!("Error parsing the webpage {url}: {err}");
            ExtractionStatus::ParseFailed(err)
        } else {
            error!("Error fetching the webpage {url}: {err}");
            ExtractionStatus::FetchFailed(err)
        };
        Self {
            draft: RecipeDraft::empty(url),
            status,
        }
    }

    fn finished(draft: RecipeDraft) -> Self {
        let status = if draft.is_empty() {
            warn!("No recipe data found at {}", draft.source_url);
            ExtractionStatus::Empty
        } else {
            info!(
                "Extracted recipe {:?} from {}",
                draft.name.as_deref().unwrap_or("<unnamed>"),
                draft.source_url
            );
            ExtractionStatus::Found
        };
        Self { draft, status }
    }

    /// The request or the parse failed; the draft is empty for that reason.
    pub fn is_soft_failure(&self) -> bool {
        matches!(
            self.status,
            ExtractionStatus::FetchFailed(_) | ExtractionStatus::ParseFailed(_)
        )
    }

    /// Message explaining an empty draft, if there is one to give.
    pub fn diagnostic(&self) -> Option<String> {
        match &self.status {
            ExtractionStatus::Found => None,
            ExtractionStatus::Empty => Some(format!(
                "No recipe data found at {}",
                self.draft.source_url
            )),
            ExtractionStatus::FetchFailed(err) | ExtractionStatus::ParseFailed(err) => {
                Some(err.to_string())
            }
        }
    }

    /// Empty-but-successful extractions are still `Ok`.
    pub fn into_result(self) -> Result<RecipeDraft, ExtractError> {
        match self.status {
            ExtractionStatus::FetchFailed(err) | ExtractionStatus::ParseFailed(err) => Err(err),
            ExtractionStatus::Found | ExtractionStatus::Empty => Ok(self.draft),
        }
    }

    pub fn into_response(self) -> RecipeResponse {
        match self.into_result() {
            Ok(draft) => draft.into(),
            Err(err) => RecipeResponse::Error {
                error: err.to_string(),
            },
        }
    }
}

/// Fetch one page and run the selector extractor over it.
///
/// Holds no per-call state, so one pipeline can serve concurrent calls.
pub struct UrlPipeline {
    fetcher: RequestFetcher,
    extractor: Box<dyn Extractor + Send + Sync>,
}

impl UrlPipeline {
    pub fn new<E>(fetcher: RequestFetcher, extractor: E) -> Self
    where
        E: Extractor + Send + Sync + 'static,
    {
        Self {
            fetcher,
            extractor: Box::new(extractor),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ExtractError> {
        let rules = SelectorRules::default().with_overrides(&config.selectors);
        let extractor = SelectorExtractor::new(&rules)?;
        let fetcher = RequestFetcher::new(&config.fetch.user_agent, config.fetch.timeout())?;
        Ok(Self::new(fetcher, extractor))
    }

    /// Extract a recipe from `url`. Never fails: transport and parse errors
    /// come back as a soft-failure [`Extraction`].
    pub async fn extract(&self, url: &str) -> Extraction {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(err) => return Extraction::failed(url, err),
        };

        // The parsed document is not `Send`; keep it out of any await
        let parsed = {
            let context = ParsingContext::new(url, &html);
            self.extractor.parse(&context)
        };

        match parsed {
            Ok(draft) => Extraction::finished(draft),
            Err(err) => Extraction::failed(url, err),
        }
    }
}

/// Extract with the built-in selectors and browser user agent.
pub async fn extract(url: &str) -> Extraction {
    let pipeline = SelectorExtractor::new(&SelectorRules::default()).and_then(|extractor| {
        let fetcher = RequestFetcher::new(BROWSER_USER_AGENT, None)?;
        Ok(UrlPipeline::new(fetcher, extractor))
    });

    match pipeline {
        Ok(pipeline) => pipeline.extract(url).await,
        Err(err) => Extraction::failed(url, err),
    }
}
