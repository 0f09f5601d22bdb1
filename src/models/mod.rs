pub mod recommendation;
pub mod watched_show;

pub use recommendation::{RecommendationItem, VerificationResult};
pub use watched_show::{CategoryGroup, NewWatchedShow, WatchedShow, TV_CATEGORIES};
