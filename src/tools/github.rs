//! GitHub 网关：仓库搜索、详情获取与评分
//!
//! 搜索逐关键词调用 search API（按 star 降序），相邻调用间固定休眠以规避限速；
//! 单个关键词失败只记日志不中断。全部结果经敏感内容过滤、按 URL 去重、
//! 按 star 重排后截断。评分公式见 calculate_repo_score。

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use crate::config::GithubSection;
use crate::core::{AgentError, RepoRecord};
use crate::tools::filter;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// 搜索结果的最终保留上限
const MAX_SEARCH_RESULTS: usize = 10;

/// 仓库情报网关：搜索与详情（测试中以 stub 替换）
#[async_trait]
pub trait RepoGateway: Send + Sync {
    /// 用关键词列表搜索仓库，返回已过滤、去重、按 star 降序的结果
    async fn search_repositories(&self, keywords: &[String]) -> Result<Vec<RepoRecord>, AgentError>;

    /// 获取单个仓库的详情
    async fn repo_details(&self, repo_url: &str) -> Result<RepoRecord, AgentError>;
}

/// GitHub API 返回的仓库条目（只取需要的字段）
#[derive(Debug, Deserialize)]
struct ApiRepo {
    html_url: String,
    name: String,
    full_name: String,
    description: Option<String>,
    stargazers_count: u64,
    forks_count: u64,
    pushed_at: Option<String>,
    language: Option<String>,
}

impl From<ApiRepo> for RepoRecord {
    fn from(repo: ApiRepo) -> Self {
        Self {
            url: repo.html_url,
            name: repo.name,
            full_name: repo.full_name,
            description: repo.description.unwrap_or_default(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            pushed_at: repo.pushed_at.unwrap_or_default(),
            language: repo.language.unwrap_or_default(),
            score: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<ApiRepo>,
}

/// GitHub REST API 网关
pub struct GithubGateway {
    client: Client,
    api_url: String,
    access_token: Option<String>,
    per_page: u32,
    search_interval: Duration,
}

impl GithubGateway {
    pub fn new(cfg: &GithubSection) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        // 令牌优先取配置，其次环境变量
        let access_token = cfg
            .access_token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok());

        Self {
            client,
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            access_token,
            per_page: cfg.per_page,
            search_interval: Duration::from_secs(cfg.search_interval_secs),
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.access_token {
            builder = builder.header("Authorization", format!("token {}", token));
        }
        builder
    }

    async fn search_one_keyword(&self, keyword: &str) -> Result<Vec<RepoRecord>, AgentError> {
        let url = format!("{}/search/repositories", self.api_url);
        let per_page = self.per_page.to_string();
        let response = self
            .get(&url)
            .query(&[
                ("q", keyword),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AgentError::GithubError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AgentError::GithubError(format!("HTTP {}", response.status())));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AgentError::GithubError(e.to_string()))?;

        Ok(body.items.into_iter().map(RepoRecord::from).collect())
    }
}

#[async_trait]
impl RepoGateway for GithubGateway {
    async fn search_repositories(&self, keywords: &[String]) -> Result<Vec<RepoRecord>, AgentError> {
        tracing::info!(keywords = ?keywords, "searching GitHub repositories");
        let mut all_repos = Vec::new();

        for keyword in keywords {
            match self.search_one_keyword(keyword).await {
                Ok(repos) => {
                    tracing::info!(keyword = %keyword, count = repos.len(), "keyword search done");
                    all_repos.extend(repos);
                }
                Err(e) => {
                    tracing::error!(keyword = %keyword, error = %e, "keyword search failed");
                }
            }
            // 固定间隔限速
            tokio::time::sleep(self.search_interval).await;
        }

        let filtered = filter::filter_repos(all_repos);

        // 按 URL 去重（保留先出现者），再按 star 降序，截断
        let mut unique: Vec<RepoRecord> = Vec::new();
        for repo in filtered {
            if !unique.iter().any(|r| r.url == repo.url) {
                unique.push(repo);
            }
        }
        unique.sort_by(|a, b| b.stars.cmp(&a.stars));
        unique.truncate(MAX_SEARCH_RESULTS);

        tracing::info!(count = unique.len(), "unique repositories after dedup");
        Ok(unique)
    }

    async fn repo_details(&self, repo_url: &str) -> Result<RepoRecord, AgentError> {
        tracing::info!(url = %repo_url, "fetching repo details");
        let (owner, repo) = parse_owner_repo(repo_url)
            .ok_or_else(|| AgentError::GithubError(format!("invalid repo url: {}", repo_url)))?;

        let url = format!("{}/repos/{}/{}", self.api_url, owner, repo);
        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| AgentError::GithubError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AgentError::GithubError(format!("HTTP {}", response.status())));
        }

        let body: ApiRepo = response
            .json()
            .await
            .map_err(|e| AgentError::GithubError(e.to_string()))?;

        Ok(body.into())
    }
}

/// 从仓库 URL 提取 (owner, repo)
pub fn parse_owner_repo(url: &str) -> Option<(String, String)> {
    static OWNER_REPO_RE: OnceLock<Regex> = OnceLock::new();
    let re = OWNER_REPO_RE
        .get_or_init(|| Regex::new(r"github\.com/([^/?#]+)/([^/?#]+)").unwrap());
    let caps = re.captures(url)?;
    let owner = caps.get(1)?.as_str().to_string();
    let repo = caps.get(2)?.as_str().trim_end_matches(".git").to_string();
    Some((owner, repo))
}

/// 新近度衰减因子：按距上次 push 的天数阶梯取值
pub fn recency_factor(days_since_push: i64) -> f64 {
    if days_since_push <= 30 {
        1.0
    } else if days_since_push <= 180 {
        0.8
    } else if days_since_push <= 365 {
        0.5
    } else if days_since_push <= 730 {
        0.2
    } else {
        0.05
    }
}

/// 评分公式: (0.7 * ln(stars + 1) + 0.3 * ln(forks + 1)) * recency
///
/// pushed_at 缺失或无法解析时 recency 取 0.1。
pub fn score_at(repo: &RepoRecord, now: DateTime<Utc>) -> f64 {
    let recency = match DateTime::parse_from_rfc3339(&repo.pushed_at) {
        Ok(pushed) => {
            let days = (now - pushed.with_timezone(&Utc)).num_days();
            recency_factor(days)
        }
        Err(_) => 0.1,
    };

    let popularity =
        0.7 * ((repo.stars + 1) as f64).ln() + 0.3 * ((repo.forks + 1) as f64).ln();
    popularity * recency
}

/// 以当前时间评分
pub fn calculate_repo_score(repo: &RepoRecord) -> f64 {
    score_at(repo, Utc::now())
}

/// 对候选集评分并按分数降序稳定排列，截断前 10
///
/// 同样的输入产出同样的排序与分数（整体替换语义，不累加）。
pub fn rank_repos_at(candidates: Vec<RepoRecord>, now: DateTime<Utc>) -> Vec<RepoRecord> {
    let mut ranked: Vec<RepoRecord> = candidates
        .into_iter()
        .map(|mut repo| {
            repo.score = Some(score_at(&repo, now));
            repo
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(MAX_SEARCH_RESULTS);
    ranked
}
