//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按脚本顺序逐条返回预设回复；脚本耗尽后返回兜底回复（默认为 COMPLETE 决策 JSON），
//! 便于驱动决策循环收敛。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, Message};

const DEFAULT_EXHAUSTED_REPLY: &str =
    r#"{"action": "COMPLETE", "params": {}, "reasoning": "所有步骤已完成"}"#;

/// Mock 客户端：脚本化回复队列
pub struct MockLlmClient {
    replies: Mutex<VecDeque<String>>,
    exhausted_reply: String,
}

impl MockLlmClient {
    /// 空脚本：每次调用都返回 COMPLETE 决策
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    /// 按给定顺序逐条返回，耗尽后返回 COMPLETE 决策
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            exhausted_reply: DEFAULT_EXHAUSTED_REPLY.to_string(),
        }
    }

    /// 每次调用都返回同一条回复
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            exhausted_reply: reply.into(),
        }
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
        let mut replies = self.replies.lock().map_err(|e| e.to_string())?;
        Ok(replies
            .pop_front()
            .unwrap_or_else(|| self.exhausted_reply.clone()))
    }
}
