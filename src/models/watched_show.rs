use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Fixed categories used to group the watched list
pub const TV_CATEGORIES: [&str; 6] = [
    "ANIME / ANIMAZIONE",
    "CRIME / THRILLER",
    "HORROR / SOPRANNATURALE",
    "DRAMMATICHE",
    "FANTASY / SCI-FI",
    "ALTRE",
];

/// A show the user has already watched
#[derive(Debug, Clone, Serialize, sqlx::FromRow, PartialEq)]
pub struct WatchedShow {
    pub id: i64,
    pub title: String,
    pub genre: Option<String>,
    /// One of [`TV_CATEGORIES`] or free text
    pub category: Option<String>,
    #[serde(serialize_with = "serialize_added_on")]
    pub added_on: DateTime<Utc>,
}

fn serialize_added_on<S: Serializer>(
    added_on: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&added_on.format("%Y-%m-%d %H:%M:%S"))
}

/// Input for adding a watched show
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewWatchedShow {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewWatchedShow {
    pub fn new(title: impl Into<String>, category: Option<String>) -> Self {
        Self {
            title: title.into(),
            genre: None,
            category,
        }
    }
}

/// Shows belonging to one category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub shows: Vec<WatchedShow>,
}
