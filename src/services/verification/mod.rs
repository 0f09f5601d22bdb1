/// Recommendation verification abstraction
///
/// A verifier looks a show title up on some external source and reports what
/// it found. Site-specific scraping lives entirely behind this trait, so the
/// enrichment pipeline never sees selectors or HTML.
use async_trait::async_trait;

use crate::models::VerificationResult;

pub mod netflix_lovers;

pub use netflix_lovers::{NetflixLoversClient, SiteSelectors};

/// Why a lookup produced no match
///
/// Lookups never fail with an error: transport problems, missing results and
/// unexpected markup all end up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFound {
    #[error("source unreachable: {0}")]
    Unreachable(String),

    #[error("no search results")]
    NoResults,

    #[error("first search result has no link")]
    NoLink,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShowVerifier: Send + Sync {
    /// Look a title up and return the best-effort match
    async fn lookup(&self, title: &str) -> Result<VerificationResult, NotFound>;
}
