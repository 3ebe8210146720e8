//! 响应解释器：从半结构化的 LLM 回复中提取行动决策
//!
//! 先剥掉代码栅栏，再按固定顺序尝试多个相互独立的纯解析策略，第一个成功者胜出；
//! 全部失败返回 None，由决策引擎转入基于状态的确定性回退。
//! 候选片段只有反序列化为带合法 action 的对象才算成功，未知行动名一律视为失败。

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::agent::{ActionDecision, ActionKind};

type Strategy = fn(&str) -> Option<ActionDecision>;

/// 解析策略表，按优先级排序
const STRATEGIES: &[(&str, Strategy)] = &[
    ("whole_text", parse_whole_text),
    ("brace_span", parse_brace_span),
    ("action_span", parse_action_span),
    ("unescape_braces", parse_unescaped_braces),
    ("fragments", parse_fragments),
];

/// 从 LLM 回复中提取决策；无法提取时返回 None，从不报错
pub fn extract_decision(text: &str) -> Option<ActionDecision> {
    let cleaned = strip_code_fences(text);

    for (name, strategy) in STRATEGIES {
        if let Some(decision) = strategy(&cleaned) {
            tracing::debug!(strategy = name, action = %decision.action, "decision extracted");
            return Some(decision);
        }
    }

    let preview: String = text.chars().take(200).collect();
    tracing::warn!(preview = %preview, "all parse strategies failed");
    None
}

/// 连续解析失败时的最后手段：按上一个行动硬编码推进，仅覆盖最常卡住的两个节点
pub fn transition_after(last_action: Option<ActionKind>) -> Option<ActionDecision> {
    let decision = match last_action? {
        ActionKind::GenerateKeywords => synth_decision(
            ActionKind::SearchGithub,
            "关键词已生成，需要执行GitHub搜索",
        ),
        ActionKind::SearchGithub => synth_decision(
            ActionKind::CalculateScores,
            "GitHub搜索已完成，需要计算仓库评分",
        ),
        _ => return None,
    };
    tracing::info!(action = %decision.action, "using hardcoded transition after unusable replies");
    Some(decision)
}

fn synth_decision(action: ActionKind, reasoning: &str) -> ActionDecision {
    ActionDecision {
        action,
        params: Value::Object(serde_json::Map::new()),
        reasoning: reasoning.to_string(),
    }
}

/// 移除 ```json / ``` 代码栅栏标记
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "")
}

fn decision_from_str(s: &str) -> Option<ActionDecision> {
    serde_json::from_str(s).ok()
}

/// 策略1：整段文本直接解析
fn parse_whole_text(text: &str) -> Option<ActionDecision> {
    decision_from_str(text.trim())
}

/// 策略2：取第一个 `{` 到最后一个 `}` 的贪婪区间
fn parse_brace_span(text: &str) -> Option<ActionDecision> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    decision_from_str(&text[start..=end])
}

/// 策略3：取包含 "action" 键的最小大括号区间
fn parse_action_span(text: &str) -> Option<ActionDecision> {
    static ACTION_SPAN_RE: OnceLock<Regex> = OnceLock::new();
    let re = ACTION_SPAN_RE
        .get_or_init(|| Regex::new(r#"(?s)\{[^{]*"action"[^}]*\}"#).unwrap());
    decision_from_str(re.find(text)?.as_str())
}

/// 策略4：双大括号还原为单大括号后重试（模板转义残留）
fn parse_unescaped_braces(text: &str) -> Option<ActionDecision> {
    let fixed = text.replace("{{", "{").replace("}}", "}");
    decision_from_str(fixed.trim())
}

/// 策略5：用正则分别抽取 action / params / reasoning 三个片段独立拼装，
/// 周边文本不是合法 JSON 也能成功
fn parse_fragments(text: &str) -> Option<ActionDecision> {
    static ACTION_RE: OnceLock<Regex> = OnceLock::new();
    static PARAMS_RE: OnceLock<Regex> = OnceLock::new();
    static REASONING_RE: OnceLock<Regex> = OnceLock::new();

    let action_re =
        ACTION_RE.get_or_init(|| Regex::new(r#""action"\s*:\s*"([^"]+)""#).unwrap());
    let action_name = action_re.captures(text)?.get(1)?.as_str();
    let action = ActionKind::parse(action_name)?;

    let params_re =
        PARAMS_RE.get_or_init(|| Regex::new(r#"(?s)"params"\s*:\s*(\{[^}]*\})"#).unwrap());
    let params = params_re
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| {
            let span = m.as_str().replace("{{", "{").replace("}}", "}");
            serde_json::from_str::<Value>(&span).ok()
        })
        .filter(Value::is_object)
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

    let reasoning_re =
        REASONING_RE.get_or_init(|| Regex::new(r#""reasoning"\s*:\s*"([^"]+)""#).unwrap());
    let reasoning = reasoning_re
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "通过正则表达式提取的决策".to_string());

    Some(ActionDecision {
        action,
        params,
        reasoning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_json_decision() {
        let d = extract_decision(
            r#"{"action": "SEARCH_GITHUB", "params": {}, "reasoning": "x"}"#,
        )
        .unwrap();
        assert_eq!(d.action, ActionKind::SearchGithub);
        assert_eq!(d.params, json!({}));
        assert_eq!(d.reasoning, "x");
    }

    #[test]
    fn code_fenced_json_matches_unwrapped() {
        let raw = r#"{"action": "GENERATE_KEYWORDS", "params": {}, "reasoning": "先生成关键词"}"#;
        let fenced = format!("```json\n{}\n```", raw);
        let a = extract_decision(raw).unwrap();
        let b = extract_decision(&fenced).unwrap();
        assert_eq!(a.action, b.action);
        assert_eq!(a.params, b.params);
        assert_eq!(a.reasoning, b.reasoning);
    }

    #[test]
    fn json_embedded_in_prose() {
        let text = r#"好的，我的决定如下：
{"action": "CALCULATE_SCORES", "params": {}, "reasoning": "数据已齐"}
希望这有帮助。"#;
        let d = extract_decision(text).unwrap();
        assert_eq!(d.action, ActionKind::CalculateScores);
    }

    #[test]
    fn smallest_action_span_wins_when_outer_json_broken() {
        // 外层区间因为前面多了孤立 { 而不合法，策略3 找到最小 action 区间
        let text = r#"{ 残缺开头
{"action": "GENERATE_WEB_QUERIES", "reasoning": "需要网络查询"}"#;
        let d = extract_decision(text).unwrap();
        assert_eq!(d.action, ActionKind::GenerateWebQueries);
    }

    #[test]
    fn doubled_braces_are_unescaped() {
        let text = r#"{{"action": "SEARCH_WEB", "params": {{"query": "best docker repos"}}, "reasoning": "搜索网页"}}"#;
        let d = extract_decision(text).unwrap();
        assert_eq!(d.action, ActionKind::SearchWeb);
        assert_eq!(d.params, json!({"query": "best docker repos"}));
    }

    #[test]
    fn fragments_assembled_from_invalid_json() {
        let text = r#"我建议 "action": "EXTRACT_GITHUB_LINKS" 并且
"params": {"url": "https://example.com/best"} 理由是 "reasoning": "从文章提取链接" 以上。"#;
        let d = extract_decision(text).unwrap();
        assert_eq!(d.action, ActionKind::ExtractGithubLinks);
        assert_eq!(d.params, json!({"url": "https://example.com/best"}));
        assert_eq!(d.reasoning, "从文章提取链接");
    }

    #[test]
    fn fragments_without_params_default_empty() {
        let text = r#"回复格式损坏 "action": "GET_REPO_DETAILS" 其余信息缺失"#;
        let d = extract_decision(text).unwrap();
        assert_eq!(d.action, ActionKind::GetRepoDetails);
        assert_eq!(d.params, json!({}));
        assert_eq!(d.reasoning, "通过正则表达式提取的决策");
    }

    #[test]
    fn unstructured_prose_yields_none() {
        assert!(extract_decision("我觉得接下来应该先搜索一些相关资料再说。").is_none());
        assert!(extract_decision("").is_none());
    }

    #[test]
    fn unknown_action_name_is_rejected() {
        assert!(extract_decision(
            r#"{"action": "LAUNCH_ROCKET", "params": {}, "reasoning": "?"}"#
        )
        .is_none());
    }

    #[test]
    fn transition_covers_only_two_nodes() {
        let d = transition_after(Some(ActionKind::GenerateKeywords)).unwrap();
        assert_eq!(d.action, ActionKind::SearchGithub);

        let d = transition_after(Some(ActionKind::SearchGithub)).unwrap();
        assert_eq!(d.action, ActionKind::CalculateScores);

        assert!(transition_after(Some(ActionKind::SearchWeb)).is_none());
        assert!(transition_after(None).is_none());
    }
}
