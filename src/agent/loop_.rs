//! 编排循环
//!
//! decide -> execute -> update-state 循环，最多 max_iterations 次迭代。
//! 单个行动失败不终止循环：记日志、以空结果代替、继续下一次决策；
//! 循环退出后若仍无报告但已有排名数据，则兜底生成一份模板/模型报告。
//! run 的最外层把任何意外错误转为说明文字，调用方永远拿到字符串。

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;

use crate::agent::{ActionKind, DecisionEngine};
use crate::config::AppConfig;
use crate::core::{AgentError, HistoryEntry, RepoRecord, WebHit, WorkState};
use crate::llm::{self, LlmClient};
use crate::tools::{github, GithubGateway, LlmTools, RepoGateway, WebDiscovery, WebGateway};

/// 历史摘要中长文本的截断阈值（字符）
const LONG_TEXT_THRESHOLD: usize = 100;

/// 单个行动的执行结果；空/中性结果不回写状态
enum ActionOutcome {
    Keywords(Vec<String>),
    Repos(Vec<RepoRecord>),
    Queries(Vec<String>),
    WebHits(Vec<WebHit>),
    RepoLinks(Vec<String>),
    RepoDetail(Box<RepoRecord>),
    Ranked(Vec<RepoRecord>),
    Report(String),
    Nothing,
}

/// GitHub 资源发现智能体：由 LLM 决定每一步行动的编排器
pub struct ScoutAgent {
    decision: DecisionEngine,
    llm_tools: LlmTools,
    github: Arc<dyn RepoGateway>,
    web: Arc<dyn WebDiscovery>,
    max_iterations: usize,
}

impl ScoutAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        github: Arc<dyn RepoGateway>,
        web: Arc<dyn WebDiscovery>,
        max_iterations: usize,
    ) -> Self {
        Self {
            decision: DecisionEngine::new(llm.clone()),
            llm_tools: LlmTools::new(llm),
            github,
            web,
            max_iterations,
        }
    }

    /// 按配置构建真实网关与 LLM 客户端
    pub fn from_config(cfg: &AppConfig) -> Self {
        let llm = llm::create_client(&cfg.llm);
        Self::new(
            llm,
            Arc::new(GithubGateway::new(&cfg.github)),
            Arc::new(WebGateway::new(&cfg.search)),
            cfg.agent.max_iterations,
        )
    }

    /// 运行智能体：永不向外抛错，总是返回报告或错误说明文本
    pub async fn run(&self, domain: &str) -> String {
        match self.run_inner(domain).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(domain = %domain, error = %e, "agent run failed");
                format!("搜索过程中出错: {}", e)
            }
        }
    }

    async fn run_inner(&self, domain: &str) -> Result<String, AgentError> {
        tracing::info!(domain = %domain, "agent run started");
        let start = Instant::now();

        // 先让模型给出一份文字执行计划；仅记录，不参与控制流
        match self.decision.plan(domain).await {
            Ok(plan) => tracing::info!(plan = %plan, "model execution plan"),
            Err(e) => tracing::debug!(error = %e, "plan generation skipped"),
        }

        let mut state = WorkState::new(domain);
        let mut history: Vec<HistoryEntry> = Vec::new();
        let mut last_action: Option<ActionKind> = None;

        for iteration in 1..=self.max_iterations {
            let (action, params) = self
                .decision
                .decide(domain, &state, &history, last_action)
                .await;

            if action == ActionKind::Complete {
                tracing::info!(iteration, "completion signalled");
                break;
            }

            let outcome = match self.execute(action, &params, &state).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(action = %action, error = %e, "action failed, continuing with empty result");
                    ActionOutcome::Nothing
                }
            };

            let result_summary = summarize_outcome(&outcome);
            apply_outcome(&mut state, action, outcome);
            history.push(HistoryEntry {
                action,
                params,
                result_summary,
            });
            last_action = Some(action);

            tracing::info!(action = %action, iteration, max = self.max_iterations, "action finished");
        }

        // 兜底：循环结束仍无报告但已有排名数据时补一份
        if state.final_report.is_empty() && !state.ranked_repos.is_empty() {
            state.final_report = self
                .llm_tools
                .generate_report(&state.ranked_repos, domain)
                .await;
        }

        tracing::info!(
            elapsed_secs = start.elapsed().as_secs_f32(),
            actions = history.len(),
            "agent run finished"
        );

        if state.final_report.is_empty() {
            Ok(format!("未能为 '{}' 找到相关的GitHub仓库。", domain))
        } else {
            Ok(state.final_report)
        }
    }

    /// 把行动调度到对应网关；参数缺失时按状态补默认值
    async fn execute(
        &self,
        action: ActionKind,
        params: &Value,
        state: &WorkState,
    ) -> Result<ActionOutcome, AgentError> {
        match action {
            ActionKind::GenerateKeywords => Ok(ActionOutcome::Keywords(
                self.llm_tools.generate_keywords(&state.domain).await,
            )),

            ActionKind::SearchGithub => {
                let keywords = string_array_param(params, "keywords")
                    .filter(|k| !k.is_empty())
                    .unwrap_or_else(|| state.keywords.clone());
                if keywords.is_empty() {
                    tracing::warn!("no keywords available for GitHub search");
                    return Ok(ActionOutcome::Nothing);
                }
                Ok(ActionOutcome::Repos(
                    self.github.search_repositories(&keywords).await?,
                ))
            }

            ActionKind::GenerateWebQueries => Ok(ActionOutcome::Queries(
                self.llm_tools.generate_web_queries(&state.domain).await,
            )),

            ActionKind::SearchWeb => {
                let query = string_param(params, "query")
                    .or_else(|| state.web_queries.first().cloned())
                    .unwrap_or_else(|| {
                        format!("best github repositories for {}", state.domain)
                    });
                Ok(ActionOutcome::WebHits(self.web.search(&query).await?))
            }

            ActionKind::ExtractGithubLinks => {
                let url = string_param(params, "url")
                    .or_else(|| state.web_results.first().map(|hit| hit.url.clone()));
                let Some(url) = url else {
                    tracing::warn!("no url available for link extraction");
                    return Ok(ActionOutcome::Nothing);
                };
                Ok(ActionOutcome::RepoLinks(
                    self.web.extract_repo_links(&url).await?,
                ))
            }

            ActionKind::GetRepoDetails => {
                let Some(repo_url) = string_param(params, "repo_url") else {
                    tracing::warn!("no repo_url given for detail fetch");
                    return Ok(ActionOutcome::Nothing);
                };
                Ok(ActionOutcome::RepoDetail(Box::new(
                    self.github.repo_details(&repo_url).await?,
                )))
            }

            ActionKind::CalculateScores => {
                Ok(ActionOutcome::Ranked(self.score_candidates(state).await))
            }

            ActionKind::GenerateReport => {
                if state.ranked_repos.is_empty() {
                    tracing::warn!("report requested without ranked repos");
                    return Ok(ActionOutcome::Nothing);
                }
                Ok(ActionOutcome::Report(
                    self.llm_tools
                        .generate_report(&state.ranked_repos, &state.domain)
                        .await,
                ))
            }

            // decide 处已截断，不会走到这里
            ActionKind::Complete => Ok(ActionOutcome::Nothing),
        }
    }

    /// 汇总候选仓库并评分：GitHub 搜索结果 + 候选池中未覆盖的 URL（逐个取详情），
    /// 按分数降序整体替换，截断前 10。重复执行在同样输入上产出同样排序。
    async fn score_candidates(&self, state: &WorkState) -> Vec<RepoRecord> {
        let mut candidates: Vec<RepoRecord> = state.discovered_repos.clone();

        for url in &state.candidate_repo_urls {
            if candidates.iter().any(|r| r.url == *url) {
                continue;
            }
            match self.github.repo_details(url).await {
                Ok(detail) => candidates.push(detail),
                Err(e) => tracing::error!(url = %url, error = %e, "detail fetch for candidate failed"),
            }
        }

        if candidates.is_empty() {
            tracing::warn!("no candidates to score");
            return Vec::new();
        }

        tracing::info!(count = candidates.len(), "scoring candidate repositories");
        github::rank_repos_at(candidates, Utc::now())
    }
}

fn string_param(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn string_array_param(params: &Value, key: &str) -> Option<Vec<String>> {
    let array = params.get(key)?.as_array()?;
    Some(
        array
            .iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect(),
    )
}

/// 按行动类型把结果折叠进状态；空结果不覆盖已有数据
fn apply_outcome(state: &mut WorkState, action: ActionKind, outcome: ActionOutcome) {
    match outcome {
        ActionOutcome::Keywords(keywords) if !keywords.is_empty() => {
            tracing::info!(count = keywords.len(), "state: keywords set");
            state.keywords = keywords;
        }
        ActionOutcome::Repos(repos) if !repos.is_empty() => {
            tracing::info!(count = repos.len(), "state: discovered repos set");
            state.discovered_repos = repos;
        }
        ActionOutcome::Queries(queries) if !queries.is_empty() => {
            tracing::info!(count = queries.len(), "state: web queries set");
            state.web_queries = queries;
        }
        ActionOutcome::WebHits(hits) if !hits.is_empty() => {
            tracing::info!(count = hits.len(), "state: web results set");
            state.web_results = hits;
        }
        ActionOutcome::RepoLinks(links) if !links.is_empty() => {
            let added = state.merge_candidate_urls(links);
            tracing::info!(added, "state: candidate urls merged");
        }
        ActionOutcome::RepoDetail(detail) => {
            let added = state.merge_candidate_urls([detail.url.clone()]);
            tracing::info!(added, url = %detail.url, "state: candidate url from details");
        }
        ActionOutcome::Ranked(ranked) if !ranked.is_empty() => {
            tracing::info!(count = ranked.len(), "state: ranked repos replaced");
            state.ranked_repos = ranked;
        }
        ActionOutcome::Report(report) if !report.is_empty() => {
            tracing::info!(chars = report.chars().count(), "state: final report set");
            state.final_report = report;
        }
        _ => {
            tracing::debug!(action = %action, "empty result, state unchanged");
        }
    }
}

/// 结果形态的一行摘要（条目数 / 键名 / 截断文本），写入历史供下次决策参考
fn summarize_outcome(outcome: &ActionOutcome) -> String {
    match outcome {
        ActionOutcome::Keywords(v) => format!("获取了 {} 个关键词", v.len()),
        ActionOutcome::Repos(v) => format!("获取了 {} 个仓库", v.len()),
        ActionOutcome::Queries(v) => format!("获取了 {} 条查询", v.len()),
        ActionOutcome::WebHits(v) => format!("获取了 {} 个网页结果", v.len()),
        ActionOutcome::RepoLinks(v) => format!("提取了 {} 个仓库链接", v.len()),
        ActionOutcome::RepoDetail(r) => format!("获取了仓库 {} 的详情", r.full_name),
        ActionOutcome::Ranked(v) => format!("得到 {} 个排名仓库", v.len()),
        ActionOutcome::Report(s) => {
            let chars = s.chars().count();
            if chars > LONG_TEXT_THRESHOLD {
                format!("生成了一段长文本 ({} 字符)", chars)
            } else {
                format!("结果: {}", s)
            }
        }
        ActionOutcome::Nothing => "无结果".to_string(),
    }
}
