//! Scout - GitHub 资源发现智能体
//!
//! 给定一个感兴趣的领域，由 LLM 逐步决定行动：生成关键词、搜索 GitHub、
//! 网页搜索与链接提取、评分排名，最终产出 Markdown 推荐报告。
//!
//! 模块划分：
//! - **agent**: 行动枚举、响应解释器、决策引擎与编排循环
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型与工作状态
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **tools**: GitHub 网关、Web 发现网关、LLM 工具集与敏感内容过滤

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod tools;

pub use agent::ScoutAgent;
