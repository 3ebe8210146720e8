//! 核心类型：错误与工作状态

pub mod error;
pub mod state;

pub use error::AgentError;
pub use state::{history_summary, HistoryEntry, RepoRecord, WebHit, WorkState};
