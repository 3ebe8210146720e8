//! LLM 工具集：关键词生成、网络查询生成与最终报告撰写
//!
//! 全部经由 LlmClient 调用，并各自带确定性回退（默认关键词 / 模板查询 / 模板报告），
//! 保证模型不可用时流程仍能推进、报告永远产出。

use std::sync::Arc;

use chrono::DateTime;
use serde_json::Value;

use crate::agent::prompts;
use crate::core::RepoRecord;
use crate::llm::{LlmClient, Message};

/// 报告正文最多呈现的仓库数
const REPORT_TOP_N: usize = 5;

pub struct LlmTools {
    llm: Arc<dyn LlmClient>,
}

impl LlmTools {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// 为领域生成 GitHub 搜索关键词；失败时返回基础关键词保证流程继续
    pub async fn generate_keywords(&self, domain: &str) -> Vec<String> {
        tracing::info!(domain = %domain, "generating search keywords");
        match self.complete_string_array(&prompts::keywords_prompt(domain)).await {
            Some(keywords) if !keywords.is_empty() => keywords,
            _ => {
                tracing::warn!("keyword generation failed, using defaults");
                vec![
                    "awesome repositories".to_string(),
                    "tutorial".to_string(),
                    "guide".to_string(),
                    "examples".to_string(),
                    "resources".to_string(),
                ]
            }
        }
    }

    /// 为领域生成网络搜索查询；失败时返回模板查询
    pub async fn generate_web_queries(&self, domain: &str) -> Vec<String> {
        tracing::info!(domain = %domain, "generating web queries");
        match self.complete_string_array(&prompts::web_queries_prompt(domain)).await {
            Some(queries) if !queries.is_empty() => queries,
            _ => {
                tracing::warn!("web query generation failed, using templates");
                vec![
                    format!("best github repositories for {}", domain),
                    format!("top {} projects on github", domain),
                    format!("recommended {} libraries github", domain),
                ]
            }
        }
    }

    /// 为排名后的仓库生成最终报告；模型不可用时回退到模板报告
    pub async fn generate_report(&self, repos: &[RepoRecord], domain: &str) -> String {
        tracing::info!(count = repos.len(), "generating final report");
        if repos.is_empty() {
            return format!(
                "未能为领域 '{}' 找到相关的GitHub仓库。请尝试使用其他关键词或领域名称。",
                domain
            );
        }

        let top_n = REPORT_TOP_N.min(repos.len());
        let digest = repos_digest(&repos[..top_n]);
        let prompt = prompts::report_prompt(domain, top_n, &digest);

        match self.llm.complete(&[Message::user(prompt)]).await {
            Ok(report) if !report.trim().is_empty() => report,
            Ok(_) => {
                tracing::warn!("empty report from model, using fallback template");
                fallback_report(repos, domain)
            }
            Err(e) => {
                tracing::error!(error = %e, "report generation failed, using fallback template");
                fallback_report(repos, domain)
            }
        }
    }

    /// 调用 LLM 并把回复解析为 JSON 字符串数组
    async fn complete_string_array(&self, prompt: &str) -> Option<Vec<String>> {
        match self.llm.complete(&[Message::user(prompt.to_string())]).await {
            Ok(reply) => parse_string_array(&reply),
            Err(e) => {
                tracing::error!(error = %e, "LLM call failed");
                None
            }
        }
    }
}

/// 剥掉代码栅栏后解析 JSON 字符串数组；非数组或元素非字符串返回 None
pub fn parse_string_array(text: &str) -> Option<Vec<String>> {
    let cleaned = strip_code_fences(text);
    let value: Value = serde_json::from_str(cleaned.trim()).ok()?;
    let items = value.as_array()?;
    let strings: Vec<String> = items
        .iter()
        .filter_map(|v| v.as_str().map(str::to_owned))
        .collect();
    if strings.len() == items.len() {
        Some(strings)
    } else {
        None
    }
}

fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        rest.strip_suffix("```").unwrap_or(rest).to_string()
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest.strip_suffix("```").unwrap_or(rest).to_string()
    } else {
        trimmed.to_string()
    }
}

/// 供报告提示词使用的仓库信息摘要
fn repos_digest(repos: &[RepoRecord]) -> String {
    let mut digest = String::new();
    for (i, repo) in repos.iter().enumerate() {
        digest.push_str(&format!("## 仓库 {}\n", i + 1));
        digest.push_str(&format!("名称: {}\n", repo.full_name));
        digest.push_str(&format!("URL: {}\n", repo.url));
        digest.push_str(&format!("描述: {}\n", repo.description));
        digest.push_str(&format!("Stars: {}\n", repo.stars));
        digest.push_str(&format!("Forks: {}\n", repo.forks));
        digest.push_str(&format!("最近更新: {}\n", format_pushed_date(&repo.pushed_at)));
        digest.push_str(&format!("主要语言: {}\n\n", repo.language));
    }
    digest
}

/// 模型不可用时的模板报告：包含每个仓库的 URL 与核心指标
pub fn fallback_report(repos: &[RepoRecord], domain: &str) -> String {
    let mut report = format!("# {} 领域 GitHub 优质资源推荐\n\n", domain);
    report.push_str("## 简介\n\n");
    report.push_str(&format!(
        "本报告为您精选了 {} 领域中最具价值的GitHub仓库，基于Star数量、Fork数量和更新频率等多维度指标进行评估和排序。\n\n",
        domain
    ));

    for (i, repo) in repos.iter().take(REPORT_TOP_N).enumerate() {
        report.push_str(&format!("## {}. {}\n\n", i + 1, repo.full_name));
        report.push_str(&format!("**链接**: {}\n\n", repo.url));
        report.push_str(&format!("**描述**: {}\n\n", repo.description));
        report.push_str(&format!(
            "**核心指标**: ⭐ {} | 🍴 {} | 📅 {}\n\n",
            repo.stars,
            repo.forks,
            format_pushed_date(&repo.pushed_at)
        ));
        report.push_str(&format!("**主要语言**: {}\n\n", repo.language));
        report.push_str("---\n\n");
    }

    report.push_str("## 总结\n\n");
    report.push_str(&format!(
        "以上就是我们为您精选的 {} 领域优质GitHub资源。这些项目经过精心筛选，涵盖了从入门到进阶的多种资源。希望这份推荐能够帮助您更深入地学习和探索此领域。\n",
        domain
    ));

    report
}

/// pushed_at 转 "YYYY年MM月DD日"；解析失败时原样返回
fn format_pushed_date(pushed_at: &str) -> String {
    match DateTime::parse_from_rfc3339(pushed_at) {
        Ok(date) => date.format("%Y年%m月%d日").to_string(),
        Err(_) => pushed_at.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn repo(full_name: &str, stars: u64, forks: u64) -> RepoRecord {
        RepoRecord {
            url: format!("https://github.com/{}", full_name),
            name: full_name.to_string(),
            full_name: full_name.to_string(),
            description: "示例仓库".to_string(),
            stars,
            forks,
            pushed_at: "2026-08-01T00:00:00Z".to_string(),
            language: "Rust".to_string(),
            score: None,
        }
    }

    #[test]
    fn parse_string_array_accepts_fenced_json() {
        let plain = r#"["docker tutorial", "kubernetes guide"]"#;
        let fenced = format!("```json\n{}\n```", plain);
        assert_eq!(
            parse_string_array(plain),
            Some(vec![
                "docker tutorial".to_string(),
                "kubernetes guide".to_string()
            ])
        );
        assert_eq!(parse_string_array(&fenced), parse_string_array(plain));
    }

    #[test]
    fn parse_string_array_rejects_non_arrays() {
        assert_eq!(parse_string_array(r#"{"a": 1}"#), None);
        assert_eq!(parse_string_array(r#"[1, 2, 3]"#), None);
        assert_eq!(parse_string_array("这不是JSON"), None);
    }

    #[tokio::test]
    async fn keywords_fall_back_to_defaults_on_bad_reply() {
        let tools = LlmTools::new(Arc::new(MockLlmClient::repeating("抱歉，我不明白。")));
        let keywords = tools.generate_keywords("容器化技术").await;
        assert!(keywords.contains(&"awesome repositories".to_string()));
        assert_eq!(keywords.len(), 5);
    }

    #[tokio::test]
    async fn web_queries_fall_back_to_templates() {
        let tools = LlmTools::new(Arc::new(MockLlmClient::repeating("[broken")));
        let queries = tools.generate_web_queries("quant finance").await;
        assert_eq!(queries.len(), 3);
        assert!(queries[0].contains("quant finance"));
    }

    #[test]
    fn fallback_report_contains_urls_and_metrics() {
        let repos = vec![repo("a/one", 500, 50), repo("b/two", 50, 5)];
        let report = fallback_report(&repos, "容器化技术");
        assert!(report.starts_with("# 容器化技术"));
        assert!(report.contains("https://github.com/a/one"));
        assert!(report.contains("⭐ 500"));
        assert!(report.contains("https://github.com/b/two"));
        assert!(report.contains("2026年08月01日"));
    }

    #[test]
    fn fallback_report_caps_at_top_five() {
        let repos: Vec<RepoRecord> = (0..8).map(|i| repo(&format!("u/r{}", i), i, 0)).collect();
        let report = fallback_report(&repos, "x");
        assert!(report.contains("u/r4"));
        assert!(!report.contains("u/r5"));
    }
}
