//! 决策引擎：模型优先、确定性回退
//!
//! 主路径把状态摘要与历史摘要拼入提示词交给 LLM，回复交由解释器提取；
//! LLM 出错、解析失败或决策非法时，退回只看状态的优先级决策树。
//! 回退树是严格优先级链（首条满足者胜出），保证模型完全失灵时循环也能
//! 在迭代上限内走完全流程并终止。

use std::sync::Arc;

use serde_json::{json, Value};

use crate::agent::{interpret, prompts, ActionKind};
use crate::core::{history_summary, AgentError, HistoryEntry, WorkState};
use crate::llm::{LlmClient, Message};

/// 决策引擎：无内部持久状态，状态与历史均由调用方传入
pub struct DecisionEngine {
    llm: Arc<dyn LlmClient>,
}

impl DecisionEngine {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// 让模型给出一份文字执行计划，仅供日志；失败无影响
    pub async fn plan(&self, domain: &str) -> Result<String, AgentError> {
        self.llm
            .complete(&[Message::user(prompts::plan_prompt(domain))])
            .await
            .map_err(AgentError::LlmError)
    }

    /// 决定下一步行动；永不失败，必返回合法的 (行动, 参数)
    pub async fn decide(
        &self,
        domain: &str,
        state: &WorkState,
        history: &[HistoryEntry],
        last_action: Option<ActionKind>,
    ) -> (ActionKind, Value) {
        match self
            .decide_with_model(domain, state, history, last_action)
            .await
        {
            Ok(Some(decision)) => return decision,
            Ok(None) => tracing::warn!("no usable decision from model reply"),
            Err(e) => tracing::error!(error = %e, "decision model call failed"),
        }

        tracing::info!("falling back to state-based decision tree");
        Self::fallback_decision(state)
    }

    async fn decide_with_model(
        &self,
        domain: &str,
        state: &WorkState,
        history: &[HistoryEntry],
        last_action: Option<ActionKind>,
    ) -> Result<Option<(ActionKind, Value)>, AgentError> {
        let prompt = prompts::decision_prompt(domain, &state.summary(), &history_summary(history));
        let reply = self
            .llm
            .complete(&[Message::user(prompt)])
            .await
            .map_err(AgentError::LlmError)?;

        let decision = interpret::extract_decision(&reply)
            .or_else(|| interpret::transition_after(last_action));
        let Some(decision) = decision else {
            return Ok(None);
        };

        // 没有排名数据时不允许生成报告，视同解析失败转回退树
        if decision.action == ActionKind::GenerateReport && state.ranked_repos.is_empty() {
            tracing::warn!("model proposed GENERATE_REPORT without ranked repos, rejected");
            return Ok(None);
        }

        tracing::info!(action = %decision.action, reasoning = %decision.reasoning, "model decided next action");
        Ok(Some((decision.action, decision.params)))
    }

    /// 确定性回退决策树：只依赖状态，与历史无关
    pub fn fallback_decision(state: &WorkState) -> (ActionKind, Value) {
        if state.keywords.is_empty() {
            (ActionKind::GenerateKeywords, json!({}))
        } else if state.discovered_repos.is_empty() {
            (ActionKind::SearchGithub, json!({ "keywords": state.keywords }))
        } else if state.web_queries.is_empty() {
            (ActionKind::GenerateWebQueries, json!({}))
        } else if state.web_results.is_empty() && !state.web_queries.is_empty() {
            let query = state
                .web_queries
                .first()
                .cloned()
                .unwrap_or_else(|| format!("best github repositories for {}", state.domain));
            (ActionKind::SearchWeb, json!({ "query": query }))
        } else if !state.web_results.is_empty() && state.candidate_repo_urls.is_empty() {
            (
                ActionKind::ExtractGithubLinks,
                json!({ "url": state.web_results[0].url }),
            )
        } else if (!state.discovered_repos.is_empty() || !state.candidate_repo_urls.is_empty())
            && state.ranked_repos.is_empty()
        {
            (ActionKind::CalculateScores, json!({}))
        } else if !state.ranked_repos.is_empty() && state.final_report.is_empty() {
            (ActionKind::GenerateReport, json!({}))
        } else {
            (ActionKind::Complete, json!({}))
        }
    }
}
