//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Mock）

pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{LlmClient, Message, Role};

use crate::config::LlmSection;

/// 根据配置创建 LLM 客户端
pub fn create_client(cfg: &LlmSection) -> Arc<dyn LlmClient> {
    Arc::new(OpenAiClient::new(
        cfg.base_url.as_deref(),
        &cfg.model,
        cfg.api_key.as_deref(),
        cfg.temperature,
    ))
}
