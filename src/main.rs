use clap::{Parser, Subcommand};
use guthub::{
    AppConfig, NewRecipe, RecipeRecord, RecipeStore, RecipeUpdate, SqliteStore, UrlPipeline,
};
use log::{error, info};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Parser)]
#[command(name = "guthub", about = "Collect recipes from the web and keep them in one place")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract a recipe from a URL and print it as JSON
    Extract { url: String },
    /// Extract a recipe from a URL and store it
    Save { url: String },
    /// Extract and store several URLs concurrently
    Import {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Store a recipe entered by hand
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long = "ingredient")]
        ingredients: Vec<String>,
        #[arg(long = "instruction")]
        instructions: Vec<String>,
        #[arg(long = "category")]
        categories: Vec<String>,
    },
    /// List stored recipes
    List,
    /// Show one stored recipe, by id or by name
    Show {
        #[arg(required_unless_present = "name")]
        id: Option<i64>,
        #[arg(long, conflicts_with = "id")]
        name: Option<String>,
    },
    /// Find recipes whose name or categories contain the query
    Search { query: String },
    /// Change some fields of a stored recipe
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long = "ingredient")]
        ingredients: Vec<String>,
        #[arg(long = "instruction")]
        instructions: Vec<String>,
        #[arg(long = "category")]
        categories: Vec<String>,
    },
    /// Remove a stored recipe
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Command::Extract { url } => {
            let pipeline = UrlPipeline::from_config(&config)?;
            let extraction = pipeline.extract(&url).await;
            let failed = extraction.is_soft_failure();
            if let Some(message) = extraction.diagnostic() {
                eprintln!("{message}");
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&extraction.into_response())?
            );
            if failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Save { url } => {
            let pipeline = UrlPipeline::from_config(&config)?;
            let store = SqliteStore::connect(&config.database).await?;
            let draft = pipeline.extract(&url).await.into_result()?;
            match store.save(&NewRecipe::from_draft(draft)).await? {
                Some(id) => println!("Saved recipe {id}"),
                None => println!("A recipe from {url} is already stored"),
            }
        }
        Command::Import { urls } => {
            let pipeline = Arc::new(UrlPipeline::from_config(&config)?);
            let store = SqliteStore::connect(&config.database).await?;
            return import(pipeline, store, urls, config.import.concurrency).await;
        }
        Command::Add {
            name,
            url,
            ingredients,
            instructions,
            categories,
        } => {
            let store = SqliteStore::connect(&config.database).await?;
            let recipe = NewRecipe {
                name,
                url,
                ingredients,
                instructions,
                categories,
            }
            .normalized();
            match store.save(&recipe).await? {
                Some(id) => println!("Saved recipe {id}"),
                None => println!("A recipe from {} is already stored", recipe.url),
            }
        }
        Command::List => {
            let store = SqliteStore::connect(&config.database).await?;
            for recipe in store.fetch_all().await? {
                println!("{:>4}  {}  <{}>", recipe.id, recipe.name, recipe.url);
            }
        }
        Command::Show { id, name } => {
            let store = SqliteStore::connect(&config.database).await?;
            let recipe = match (id, name) {
                (Some(id), _) => store.fetch_by_id(id).await?,
                (None, Some(name)) => store.fetch_by_name(&name).await?,
                (None, None) => None,
            };
            match recipe {
                Some(recipe) => print_recipe(&recipe),
                None => {
                    eprintln!("Recipe not found");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Search { query } => {
            let store = SqliteStore::connect(&config.database).await?;
            let recipes = store.search(query.trim()).await?;
            if recipes.is_empty() {
                println!("No recipes match '{}'", query.trim());
            }
            for recipe in recipes {
                println!("{:>4}  {}  <{}>", recipe.id, recipe.name, recipe.url);
            }
        }
        Command::Update {
            id,
            name,
            url,
            ingredients,
            instructions,
            categories,
        } => {
            let store = SqliteStore::connect(&config.database).await?;
            let update = RecipeUpdate {
                name,
                url,
                ingredients: non_empty(ingredients),
                instructions: non_empty(instructions),
                categories: non_empty(categories),
            }
            .normalized();
            if store.update(id, &update).await? {
                println!("Recipe with ID {id} updated");
            } else {
                eprintln!("Nothing updated for recipe {id}");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Delete { id } => {
            let store = SqliteStore::connect(&config.database).await?;
            if store.delete(id).await? {
                println!("Recipe with ID {id} deleted");
            } else {
                eprintln!("Recipe not found");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Extract and save every URL, at most `concurrency` pages in flight.
async fn import(
    pipeline: Arc<UrlPipeline>,
    store: SqliteStore,
    urls: Vec<String>,
    concurrency: usize,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for url in urls {
        let pipeline = Arc::clone(&pipeline);
        let store = store.clone();
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await?;
            import_one(&pipeline, &store, &url).await
        });
    }

    let mut summary = ImportSummary::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(outcome)) => summary.record(outcome),
            Ok(Err(e)) => {
                error!("Import task failed: {e}");
                summary.record(ImportOutcome::Failed);
            }
            Err(e) => {
                error!("Import task panicked: {e}");
                summary.record(ImportOutcome::Failed);
            }
        }
    }

    info!("Import finished: {:?}", summary);
    println!(
        "saved: {}, already stored: {}, nothing found: {}, failed: {}",
        summary.saved, summary.duplicate, summary.empty, summary.failed
    );

    Ok(if summary.failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

async fn import_one(
    pipeline: &UrlPipeline,
    store: &SqliteStore,
    url: &str,
) -> Result<ImportOutcome, BoxError> {
    let draft = match pipeline.extract(url).await.into_result() {
        Ok(draft) if !draft.is_empty() => draft,
        Ok(_) => return Ok(ImportOutcome::Empty),
        Err(_) => return Ok(ImportOutcome::Failed),
    };

    Ok(match store.save(&NewRecipe::from_draft(draft)).await? {
        Some(_) => ImportOutcome::Saved,
        None => ImportOutcome::Duplicate,
    })
}

enum ImportOutcome {
    Saved,
    Duplicate,
    Empty,
    Failed,
}

#[derive(Debug, Default)]
struct ImportSummary {
    saved: usize,
    duplicate: usize,
    empty: usize,
    failed: usize,
}

impl ImportSummary {
    fn record(&mut self, outcome: ImportOutcome) {
        match outcome {
            ImportOutcome::Saved => self.saved += 1,
            ImportOutcome::Duplicate => self.duplicate += 1,
            ImportOutcome::Empty => self.empty += 1,
            ImportOutcome::Failed => self.failed += 1,
        }
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn print_recipe(recipe: &RecipeRecord) {
    println!("#{} {}", recipe.id, recipe.name);
    println!("Source: {}", recipe.url);
    if !recipe.categories.is_empty() {
        println!("Categories: {}", recipe.categories.join(", "));
    }
    println!("\nIngredients:");
    for ingredient in &recipe.ingredients {
        println!("  - {ingredient}");
    }
    println!("\nInstructions:");
    for (i, instruction) in recipe.instructions.iter().enumerate() {
        println!("  {}. {}", i + 1, instruction);
    }
}
