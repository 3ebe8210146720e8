//! 外部协作工具：GitHub 网关、Web 发现网关、LLM 工具集与敏感内容过滤

pub mod filter;
pub mod github;
pub mod llm_tools;
pub mod web;

pub use github::{calculate_repo_score, GithubGateway, RepoGateway};
pub use llm_tools::LlmTools;
pub use web::{WebDiscovery, WebGateway};
