//! 工作状态：编排循环贯穿始终的单一所有者记录
//!
//! WorkState 每次 run 新建、循环结束即丢弃，不跨运行持久化；
//! HistoryEntry 只追加不修改，仅作为下一次决策的上下文摘要回灌给模型。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::ActionKind;

/// GitHub 仓库记录（搜索或详情接口归一化后的形态）
///
/// score 为派生数据，由一次评分动作赋值，同一轮排名内不再变更。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepoRecord {
    pub url: String,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    #[serde(default)]
    pub pushed_at: String,
    #[serde(default)]
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// 网页搜索结果条目
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// 贯穿整个循环的工作状态
///
/// domain 启动时设置一次，之后不变；其余字段由各行动的执行结果回填，
/// 空结果不覆盖已有数据。
#[derive(Clone, Debug, Default)]
pub struct WorkState {
    pub domain: String,
    pub keywords: Vec<String>,
    pub discovered_repos: Vec<RepoRecord>,
    pub web_queries: Vec<String>,
    pub web_results: Vec<WebHit>,
    /// 候选仓库 URL 池：按字符串精确去重，保持插入顺序
    pub candidate_repo_urls: Vec<String>,
    /// 评分后的仓库，按分数降序；每次评分整体替换而非追加
    pub ranked_repos: Vec<RepoRecord>,
    pub final_report: String,
}

impl WorkState {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }

    /// 合并候选 URL，返回新增条数
    pub fn merge_candidate_urls(&mut self, urls: impl IntoIterator<Item = String>) -> usize {
        let mut added = 0;
        for url in urls {
            if !url.is_empty() && !self.candidate_repo_urls.contains(&url) {
                self.candidate_repo_urls.push(url);
                added += 1;
            }
        }
        added
    }

    /// 决策提示词用的状态摘要：各字段计数与排名前三预览
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("- 目标领域: {}", self.domain));

        if self.keywords.is_empty() {
            lines.push("- 尚未生成关键词".to_string());
        } else {
            let preview: Vec<&str> = self.keywords.iter().take(5).map(String::as_str).collect();
            let suffix = if self.keywords.len() > 5 { " 等" } else { "" };
            lines.push(format!("- 已生成关键词: {}{}", preview.join(", "), suffix));
        }

        if self.discovered_repos.is_empty() {
            lines.push("- 尚未从GitHub搜索仓库".to_string());
        } else {
            lines.push(format!(
                "- 从GitHub搜索到的仓库: {} 个",
                self.discovered_repos.len()
            ));
        }

        if !self.web_queries.is_empty() {
            lines.push(format!("- 已生成网络搜索查询: {} 条", self.web_queries.len()));
        }
        if !self.web_results.is_empty() {
            lines.push(format!("- 网络搜索结果数量: {} 个", self.web_results.len()));
        }
        if !self.candidate_repo_urls.is_empty() {
            lines.push(format!(
                "- 候选仓库数量: {} 个",
                self.candidate_repo_urls.len()
            ));
        }

        if !self.ranked_repos.is_empty() {
            lines.push(format!("- 已排序的仓库: {} 个", self.ranked_repos.len()));
            lines.push("- 排名前三的仓库:".to_string());
            for (i, repo) in self.ranked_repos.iter().take(3).enumerate() {
                lines.push(format!("  {}. {} (⭐ {})", i + 1, repo.full_name, repo.stars));
            }
        }

        if self.final_report.is_empty() {
            lines.push("- 尚未生成最终报告".to_string());
        } else {
            lines.push("- 已生成最终报告".to_string());
        }

        lines.join("\n")
    }
}

/// 历史记录条目：行动名、使用的参数与一行结果摘要
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub action: ActionKind,
    pub params: Value,
    pub result_summary: String,
}

/// 历史摘要，每条一行，供决策提示词使用
pub fn history_summary(history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return "尚未执行任何操作".to_string();
    }

    history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let param_str = match entry.params.as_object() {
                Some(map) if !map.is_empty() => {
                    let pairs: Vec<String> =
                        map.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                    format!(" (参数: {})", pairs.join(", "))
                }
                _ => String::new(),
            };
            format!(
                "{}. 执行了 {}{}，结果: {}",
                i + 1,
                entry.action,
                param_str,
                entry.result_summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
