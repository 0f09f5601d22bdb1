pub mod sqlite;
pub mod watched_shows;

pub use sqlite::create_pool;
pub use watched_shows::WatchedShowStore;
