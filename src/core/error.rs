//! Agent 错误类型
//!
//! 各组件经 `?` 上抛 AgentError；编排循环在最外层统一捕获并转为用户可读的报告文本，
//! 调用方永远拿到字符串而非异常。

use thiserror::Error;

/// Agent 运行过程中可能出现的错误（LLM、解析、外部网关、配置）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("GitHub API error: {0}")]
    GithubError(String),

    #[error("Web search error: {0}")]
    WebSearchError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}
