/// Language model provider abstraction
///
/// The recommendation flow only needs one capability from a model: answer a
/// system + user prompt pair with a JSON document. The credential is passed on
/// every call, so providers hold no per-user state.
use async_trait::async_trait;

use crate::error::AppResult;

pub mod openai;

pub use openai::OpenAiChatModel;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one chat completion in JSON mode and return the raw message content
    async fn complete_json(
        &self,
        api_key: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> AppResult<String>;
}
