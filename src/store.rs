use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::model::{NewRecipe, RecipeRecord, RecipeUpdate};
use async_trait::async_trait;
use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use std::str::FromStr;
use std::time::Duration;

const LINE_SEPARATOR: &str = "\n";
const CATEGORY_SEPARATOR: &str = ", ";

/// Persistence contract consumed by whoever orchestrates extraction.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Insert a recipe. A URL that is already stored is silently ignored
    /// and yields `None`.
    async fn save(&self, recipe: &NewRecipe) -> Result<Option<i64>, StoreError>;

    async fn fetch_by_id(&self, id: i64) -> Result<Option<RecipeRecord>, StoreError>;

    async fn fetch_by_name(&self, name: &str) -> Result<Option<RecipeRecord>, StoreError>;

    async fn fetch_all(&self) -> Result<Vec<RecipeRecord>, StoreError>;

    /// Recipes whose name or categories contain `query`, ignoring case.
    async fn search(&self, query: &str) -> Result<Vec<RecipeRecord>, StoreError>;

    /// Write only the fields set in `update`. Returns whether a row changed.
    async fn update(&self, id: i64, update: &RecipeUpdate) -> Result<bool, StoreError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

/// SQLite-backed [`RecipeStore`]
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database and apply the schema.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        // Every connection to an in-memory database sees its own empty
        // database, so keep exactly one alive for the lifetime of the pool.
        let pool_options = if config.url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self::from_pool(pool);
        store.migrate().await?;

        info!("Connected to recipe database at {}", config.url);
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RecipeStore for SqliteStore {
    async fn save(&self, recipe: &NewRecipe) -> Result<Option<i64>, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO recipes (name, url, ingredients, instructions, categories)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&recipe.name)
        .bind(&recipe.url)
        .bind(recipe.ingredients.join(LINE_SEPARATOR))
        .bind(recipe.instructions.join(LINE_SEPARATOR))
        .bind(recipe.categories.join(CATEGORY_SEPARATOR))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!("Recipe with URL {} already stored, skipping", recipe.url);
            return Ok(None);
        }

        let id = result.last_insert_rowid();
        debug!("Saved recipe {} as {}", recipe.url, id);
        Ok(Some(id))
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<RecipeRecord>, StoreError> {
        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT id, name, url, ingredients, instructions, categories
            FROM recipes
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn fetch_by_name(&self, name: &str) -> Result<Option<RecipeRecord>, StoreError> {
        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT id, name, url, ingredients, instructions, categories
            FROM recipes
            WHERE name = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn fetch_all(&self) -> Result<Vec<RecipeRecord>, StoreError> {
        let rows = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT id, name, url, ingredients, instructions, categories
            FROM recipes
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<RecipeRecord>, StoreError> {
        let pattern = format!("%{}%", escape_like(query));
        let rows = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT id, name, url, ingredients, instructions, categories
            FROM recipes
            WHERE name LIKE ? ESCAPE '\' OR categories LIKE ? ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i64, update: &RecipeUpdate) -> Result<bool, StoreError> {
        if update.is_empty() {
            return Ok(false);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE recipes SET ");
        let mut columns = builder.separated(", ");
        if let Some(name) = &update.name {
            columns.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(url) = &update.url {
            columns.push("url = ").push_bind_unseparated(url.clone());
        }
        if let Some(ingredients) = &update.ingredients {
            columns
                .push("ingredients = ")
                .push_bind_unseparated(ingredients.join(LINE_SEPARATOR));
        }
        if let Some(instructions) = &update.instructions {
            columns
                .push("instructions = ")
                .push_bind_unseparated(instructions.join(LINE_SEPARATOR));
        }
        if let Some(categories) = &update.categories {
            columns
                .push("categories = ")
                .push_bind_unseparated(categories.join(CATEGORY_SEPARATOR));
        }
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await.map_err(|e| {
            if let (sqlx::Error::Database(db), Some(url)) = (&e, &update.url) {
                if db.is_unique_violation() {
                    return StoreError::DuplicateUrl(url.clone());
                }
            }
            StoreError::Database(e)
        })?;

        debug!("Recipe with ID {} updated", id);
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!("Recipe with ID {} deleted", id);
        Ok(result.rows_affected() > 0)
    }
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn split_column(value: Option<String>, separator: &str) -> Vec<String> {
    match value {
        Some(value) if !value.is_empty() => value.split(separator).map(String::from).collect(),
        _ => Vec::new(),
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: i64,
    name: String,
    url: String,
    ingredients: Option<String>,
    instructions: Option<String>,
    categories: Option<String>,
}

impl From<RecipeRow> for RecipeRecord {
    fn from(row: RecipeRow) -> Self {
        RecipeRecord {
            id: row.id,
            name: row.name,
            url: row.url,
            ingredients: split_column(row.ingredients, LINE_SEPARATOR),
            instructions: split_column(row.instructions, LINE_SEPARATOR),
            categories: split_column(row.categories, CATEGORY_SEPARATOR),
        }
    }
}
