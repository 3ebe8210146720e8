//! 智能体核心：行动枚举、响应解释器、决策引擎与编排循环

pub mod action;
pub mod decision;
pub mod interpret;
pub mod loop_;
pub mod prompts;

pub use action::{ActionDecision, ActionKind};
pub use decision::DecisionEngine;
pub use loop_::ScoutAgent;
