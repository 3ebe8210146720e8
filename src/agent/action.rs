//! 行动枚举与决策值
//!
//! ActionKind 是封闭枚举，循环的调度处对其穷尽匹配，新增行动漏接会在编译期暴露。

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 编排循环可调度的行动，每个变体对应一次外部协作调用
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    /// 生成 GitHub 搜索关键词
    GenerateKeywords,
    /// 用关键词搜索 GitHub 仓库
    SearchGithub,
    /// 生成网络搜索查询
    GenerateWebQueries,
    /// 执行网页搜索
    SearchWeb,
    /// 从网页提取 GitHub 仓库链接
    ExtractGithubLinks,
    /// 获取单个仓库详情
    GetRepoDetails,
    /// 为收集到的仓库计算评分并排名
    CalculateScores,
    /// 生成最终报告
    GenerateReport,
    /// 任务完成，循环终止
    Complete,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenerateKeywords => "GENERATE_KEYWORDS",
            Self::SearchGithub => "SEARCH_GITHUB",
            Self::GenerateWebQueries => "GENERATE_WEB_QUERIES",
            Self::SearchWeb => "SEARCH_WEB",
            Self::ExtractGithubLinks => "EXTRACT_GITHUB_LINKS",
            Self::GetRepoDetails => "GET_REPO_DETAILS",
            Self::CalculateScores => "CALCULATE_SCORES",
            Self::GenerateReport => "GENERATE_REPORT",
            Self::Complete => "COMPLETE",
        }
    }

    /// 从行动名解析；未知名称返回 None
    pub fn parse(s: &str) -> Option<Self> {
        serde_json::from_value(Value::String(s.trim().to_string())).ok()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn empty_params() -> Value {
    Value::Object(serde_json::Map::new())
}

fn default_reasoning() -> String {
    "未提供推理".to_string()
}

/// 解释器产出的决策：行动、参数与理由
///
/// 每轮迭代即产即用，不跨轮保留（历史中只留压缩摘要）。
#[derive(Clone, Debug, Deserialize)]
pub struct ActionDecision {
    pub action: ActionKind,
    #[serde(default = "empty_params")]
    pub params: Value,
    #[serde(default = "default_reasoning")]
    pub reasoning: String,
}
