pub mod enrichment;
pub mod fallback_urls;
pub mod import;
pub mod providers;
pub mod recommendations;
pub mod sanitize;
pub mod verification;

pub use providers::{ChatModel, OpenAiChatModel};
pub use verification::{NetflixLoversClient, ShowVerifier};
