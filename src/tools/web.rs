//! Web 发现网关：网页搜索与 GitHub 链接提取
//!
//! 搜索优先走 Tavily（配置了 API Key 时），失败或未配置则回退 DuckDuckGo
//! Instant Answer；链接提取抓取原始 HTML 并用正则匹配 github.com 仓库 URL，
//! 归一化（去掉 #/? 尾缀与末尾斜杠）后按出现顺序去重。

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::SearchSection;
use crate::core::{AgentError, WebHit};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
const DUCKDUCKGO_ENDPOINT: &str = "https://api.duckduckgo.com/";

/// 网页发现网关：搜索与链接提取（测试中以 stub 替换）
#[async_trait]
pub trait WebDiscovery: Send + Sync {
    /// 执行网页搜索
    async fn search(&self, query: &str) -> Result<Vec<WebHit>, AgentError>;

    /// 抓取页面并提取其中的 GitHub 仓库链接
    async fn extract_repo_links(&self, url: &str) -> Result<Vec<String>, AgentError>;
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct DdgResponse {
    #[serde(default, rename = "Results")]
    results: Vec<DdgResult>,
}

#[derive(Debug, Deserialize)]
struct DdgResult {
    #[serde(default, rename = "Text")]
    text: String,
    #[serde(default, rename = "FirstURL")]
    first_url: String,
}

pub struct WebGateway {
    client: Client,
    tavily_api_key: Option<String>,
    max_results: usize,
}

impl WebGateway {
    pub fn new(cfg: &SearchSection) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            tavily_api_key: cfg.tavily_api_key.clone(),
            max_results: cfg.max_results,
        }
    }

    async fn search_tavily(&self, query: &str, api_key: &str) -> Result<Vec<WebHit>, AgentError> {
        let response = self
            .client
            .post(TAVILY_ENDPOINT)
            .json(&json!({
                "api_key": api_key,
                "query": query,
                "search_depth": "basic",
                "max_results": self.max_results,
            }))
            .send()
            .await
            .map_err(|e| AgentError::WebSearchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AgentError::WebSearchError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AgentError::WebSearchError(e.to_string()))?;

        Ok(body
            .results
            .into_iter()
            .map(|r| WebHit {
                title: r.title,
                url: r.url,
                snippet: r.content,
            })
            .collect())
    }

    async fn search_duckduckgo(&self, query: &str) -> Result<Vec<WebHit>, AgentError> {
        let response = self
            .client
            .get(DUCKDUCKGO_ENDPOINT)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(|e| AgentError::WebSearchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AgentError::WebSearchError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: DdgResponse = response
            .json()
            .await
            .map_err(|e| AgentError::WebSearchError(e.to_string()))?;

        Ok(body
            .results
            .into_iter()
            .map(|r| WebHit {
                title: r.text,
                url: r.first_url,
                snippet: String::new(),
            })
            .collect())
    }
}

#[async_trait]
impl WebDiscovery for WebGateway {
    async fn search(&self, query: &str) -> Result<Vec<WebHit>, AgentError> {
        tracing::info!(query = %query, "web search");

        if let Some(key) = self.tavily_api_key.clone() {
            match self.search_tavily(query, &key).await {
                Ok(hits) if !hits.is_empty() => return Ok(hits),
                Ok(_) => tracing::warn!("tavily returned no results, falling back"),
                Err(e) => tracing::warn!(error = %e, "tavily search failed, falling back"),
            }
        }

        self.search_duckduckgo(query).await
    }

    async fn extract_repo_links(&self, url: &str) -> Result<Vec<String>, AgentError> {
        tracing::info!(url = %url, "extracting GitHub links");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AgentError::WebSearchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AgentError::WebSearchError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AgentError::WebSearchError(e.to_string()))?;

        let links = extract_links_from_html(&body);
        tracing::info!(count = links.len(), "GitHub links extracted");
        Ok(links)
    }
}

/// 从 HTML 文本中提取归一化的 GitHub 仓库链接（纯函数）
pub fn extract_links_from_html(html: &str) -> Vec<String> {
    static REPO_LINK_RE: OnceLock<Regex> = OnceLock::new();
    let re = REPO_LINK_RE.get_or_init(|| {
        Regex::new(r"https?://github\.com/[A-Za-z0-9-]+/[A-Za-z0-9._-]+").unwrap()
    });

    let mut links = Vec::new();
    for m in re.find_iter(html) {
        let url = normalize_repo_url(m.as_str());
        if !links.contains(&url) {
            links.push(url);
        }
    }
    links
}

/// 去掉 #/? 尾缀与末尾斜杠
fn normalize_repo_url(url: &str) -> String {
    let cut = url.find(['#', '?']).unwrap_or(url.len());
    url[..cut].trim_end_matches('/').to_string()
}
