use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{CategoryGroup, NewWatchedShow, WatchedShow, TV_CATEGORIES},
};

const SHOW_COLUMNS: &str = "id, title, genre, category, added_on";

/// Persistent collection of watched shows
///
/// Every write runs inside a transaction, so a failed insert or delete never
/// leaves a partial record behind.
#[derive(Clone)]
pub struct WatchedShowStore {
    pool: SqlitePool,
}

impl WatchedShowStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All watched shows in insertion order
    pub async fn list_all(&self) -> AppResult<Vec<WatchedShow>> {
        let shows = sqlx::query_as::<_, WatchedShow>(&format!(
            "SELECT {SHOW_COLUMNS} FROM watched_shows ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(shows)
    }

    /// Titles of every watched show, used to build the recommendation prompt
    pub async fn titles(&self) -> AppResult<Vec<String>> {
        let titles = sqlx::query_scalar::<_, String>("SELECT title FROM watched_shows ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(titles)
    }

    pub async fn list_by_category(&self, category: &str) -> AppResult<Vec<WatchedShow>> {
        let shows = sqlx::query_as::<_, WatchedShow>(&format!(
            "SELECT {SHOW_COLUMNS} FROM watched_shows WHERE category = ? ORDER BY id"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(shows)
    }

    /// Shows grouped under each of the fixed categories, in category order
    pub async fn grouped_by_category(&self) -> AppResult<Vec<CategoryGroup>> {
        let mut groups = Vec::with_capacity(TV_CATEGORIES.len());
        for category in TV_CATEGORIES {
            groups.push(CategoryGroup {
                category: category.to_string(),
                shows: self.list_by_category(category).await?,
            });
        }
        Ok(groups)
    }

    pub async fn count_by_title(&self, title: &str) -> AppResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM watched_shows WHERE title = ?")
                .bind(title)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Adds a show unless one with the same title is already stored
    pub async fn add(&self, new_show: NewWatchedShow) -> AppResult<WatchedShow> {
        let title = new_show.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let existing =
            sqlx::query_scalar::<_, i64>("SELECT id FROM watched_shows WHERE title = ? LIMIT 1")
                .bind(title)
                .fetch_optional(&mut *tx)
                .await?;

        if existing.is_some() {
            return Err(AppError::Duplicate(format!(
                "\"{}\" is already in your list",
                title
            )));
        }

        let show = Self::insert(
            &mut tx,
            title,
            non_blank(new_show.genre),
            non_blank(new_show.category),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(id = show.id, title = %show.title, "Watched show added");

        Ok(show)
    }

    /// Removes a show by id and returns the removed record
    pub async fn delete(&self, id: i64) -> AppResult<WatchedShow> {
        let mut tx = self.pool.begin().await?;

        let show = sqlx::query_as::<_, WatchedShow>(&format!(
            "SELECT {SHOW_COLUMNS} FROM watched_shows WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Watched show {} does not exist", id)))?;

        sqlx::query("DELETE FROM watched_shows WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(id, title = %show.title, "Watched show removed");

        Ok(show)
    }

    /// Replaces the whole collection in one transaction
    ///
    /// Blank titles are skipped. Returns the number of inserted records.
    pub async fn replace_all(&self, shows: Vec<NewWatchedShow>) -> AppResult<usize> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM watched_shows")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut inserted = 0;
        for show in shows {
            let title = show.title.trim();
            if title.is_empty() {
                continue;
            }
            Self::insert(&mut tx, title, non_blank(show.genre), non_blank(show.category)).await?;
            inserted += 1;
        }
        tx.commit().await?;

        tracing::info!(removed, inserted, "Watched list replaced");

        Ok(inserted)
    }

    async fn insert(
        tx: &mut Transaction<'_, Sqlite>,
        title: &str,
        genre: Option<String>,
        category: Option<String>,
    ) -> AppResult<WatchedShow> {
        let show = sqlx::query_as::<_, WatchedShow>(&format!(
            "INSERT INTO watched_shows (title, genre, category, added_on) \
             VALUES (?, ?, ?, ?) RETURNING {SHOW_COLUMNS}"
        ))
        .bind(title)
        .bind(genre)
        .bind(category)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

        Ok(show)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
