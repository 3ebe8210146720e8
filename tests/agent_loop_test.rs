//! 编排循环集成测试
//!
//! 用 stub 网关与脚本化/故障 LLM 驱动完整的 decide -> execute -> update-state 流程。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use scout::agent::ScoutAgent;
use scout::core::{AgentError, RepoRecord, WebHit};
use scout::llm::{LlmClient, Message, MockLlmClient};
use scout::tools::{RepoGateway, WebDiscovery};

fn sample_repo(full_name: &str, stars: u64, forks: u64) -> RepoRecord {
    RepoRecord {
        url: format!("https://github.com/{}", full_name),
        name: full_name
            .split('/')
            .next_back()
            .unwrap_or_default()
            .to_string(),
        full_name: full_name.to_string(),
        description: format!("{} 示例仓库", full_name),
        stars,
        forks,
        pushed_at: Utc::now().to_rfc3339(),
        language: "Go".to_string(),
        score: None,
    }
}

/// 固定返回三个仓库的 stub，记录搜索关键词与调用次数
struct StubRepoGateway {
    repos: Vec<RepoRecord>,
    search_calls: AtomicUsize,
    last_keywords: Mutex<Vec<String>>,
}

impl StubRepoGateway {
    fn containerization() -> Self {
        Self {
            repos: vec![
                sample_repo("moby/moby", 500, 50),
                sample_repo("containerd/containerd", 50, 5),
                sample_repo("tiny/runtime", 5, 0),
            ],
            search_calls: AtomicUsize::new(0),
            last_keywords: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RepoGateway for StubRepoGateway {
    async fn search_repositories(&self, keywords: &[String]) -> Result<Vec<RepoRecord>, AgentError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_keywords.lock().unwrap() = keywords.to_vec();
        Ok(self.repos.clone())
    }

    async fn repo_details(&self, repo_url: &str) -> Result<RepoRecord, AgentError> {
        self.repos
            .iter()
            .find(|r| r.url == repo_url)
            .cloned()
            .ok_or_else(|| AgentError::GithubError(format!("not found: {}", repo_url)))
    }
}

/// 返回一条网页结果与两个仓库链接的 stub
struct StubWebGateway;

#[async_trait]
impl WebDiscovery for StubWebGateway {
    async fn search(&self, _query: &str) -> Result<Vec<WebHit>, AgentError> {
        Ok(vec![WebHit {
            title: "Best container runtimes".to_string(),
            url: "https://blog.example.com/best-containers".to_string(),
            snippet: "精选容器运行时列表".to_string(),
        }])
    }

    async fn extract_repo_links(&self, _url: &str) -> Result<Vec<String>, AgentError> {
        Ok(vec![
            "https://github.com/moby/moby".to_string(),
            "https://github.com/containerd/containerd".to_string(),
        ])
    }
}

/// 永远失败的 LLM：决策与生成全部走确定性回退
struct FailingLlm;

#[async_trait]
impl LlmClient for FailingLlm {
    async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
        Err("llm unavailable".to_string())
    }
}

/// 统计调用次数并固定返回同一决策的 LLM
struct CountingLlm {
    calls: AtomicUsize,
    reply: String,
}

#[async_trait]
impl LlmClient for CountingLlm {
    async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

#[tokio::test]
async fn end_to_end_with_unavailable_model_uses_fallback_report() {
    let github = Arc::new(StubRepoGateway::containerization());
    let agent = ScoutAgent::new(
        Arc::new(FailingLlm),
        github.clone(),
        Arc::new(StubWebGateway),
        10,
    );

    let report = agent.run("containerization").await;

    // 模板回退报告包含每个仓库的 URL 与 star 数
    assert!(report.contains("https://github.com/moby/moby"));
    assert!(report.contains("https://github.com/containerd/containerd"));
    assert!(report.contains("https://github.com/tiny/runtime"));
    assert!(report.contains("⭐ 500"));
    assert!(report.contains("⭐ 50"));
    assert!(report.contains("⭐ 5"));

    // 全部今日 push，排名严格按 star 降序：moby 在前，tiny 在后
    let pos = |needle: &str| report.find(needle).unwrap();
    assert!(pos("moby/moby") < pos("containerd/containerd"));
    assert!(pos("containerd/containerd") < pos("tiny/runtime"));

    // 回退树只会搜索一次 GitHub
    assert_eq!(github.search_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn loop_never_exceeds_iteration_bound() {
    // 模型每次都决定 GENERATE_KEYWORDS，循环只能靠迭代上限终止
    let llm = Arc::new(CountingLlm {
        calls: AtomicUsize::new(0),
        reply: r#"{"action": "GENERATE_KEYWORDS", "params": {}, "reasoning": "再来一次"}"#
            .to_string(),
    });
    let agent = ScoutAgent::new(
        llm.clone(),
        Arc::new(StubRepoGateway::containerization()),
        Arc::new(StubWebGateway),
        10,
    );

    let report = agent.run("containerization").await;

    // 从未评分，结束时只有「未找到」消息
    assert!(report.contains("未能为"));
    assert!(report.contains("containerization"));

    // 1 次计划 + 每轮 1 次决策 + 1 次关键词生成，共 10 轮
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1 + 10 * 2);
}

#[tokio::test]
async fn scripted_model_drives_loop_to_completion() {
    let replies = vec![
        // 执行计划（仅记录）
        "执行计划:\n1. 生成关键词\n2. 搜索GitHub\n3. 评分并生成报告".to_string(),
        // 第 1 轮决策
        r#"{"action": "GENERATE_KEYWORDS", "params": {}, "reasoning": "先生成关键词"}"#.to_string(),
        // 关键词生成
        r#"["docker", "kubernetes tutorial"]"#.to_string(),
        // 第 2 轮决策：带参数覆盖状态里的关键词
        r#"{"action": "SEARCH_GITHUB", "params": {"keywords": ["docker"]}, "reasoning": "搜索仓库"}"#.to_string(),
        // 第 3 轮决策
        r#"{"action": "CALCULATE_SCORES", "params": {}, "reasoning": "评分排名"}"#.to_string(),
        // 第 4 轮决策
        r#"{"action": "GENERATE_REPORT", "params": {}, "reasoning": "写报告"}"#.to_string(),
        // 报告生成
        "# Docker 精选仓库\n\n这是模型撰写的报告。".to_string(),
        // 之后脚本耗尽，默认回复 COMPLETE
    ];

    let github = Arc::new(StubRepoGateway::containerization());
    let agent = ScoutAgent::new(
        Arc::new(MockLlmClient::with_replies(replies)),
        github.clone(),
        Arc::new(StubWebGateway),
        10,
    );

    let report = agent.run("容器化技术").await;
    assert!(report.starts_with("# Docker 精选仓库"));

    // SEARCH_GITHUB 的参数优先于状态中的关键词
    assert_eq!(*github.last_keywords.lock().unwrap(), vec!["docker".to_string()]);
    assert_eq!(github.search_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_search_results_keep_looping_until_bound() {
    /// 一无所获的网关组合：验证空结果不污染状态、循环正常耗尽
    struct EmptyRepoGateway;

    #[async_trait]
    impl RepoGateway for EmptyRepoGateway {
        async fn search_repositories(
            &self,
            _keywords: &[String],
        ) -> Result<Vec<RepoRecord>, AgentError> {
            Ok(Vec::new())
        }

        async fn repo_details(&self, repo_url: &str) -> Result<RepoRecord, AgentError> {
            Err(AgentError::GithubError(format!("not found: {}", repo_url)))
        }
    }

    struct EmptyWebGateway;

    #[async_trait]
    impl WebDiscovery for EmptyWebGateway {
        async fn search(&self, _query: &str) -> Result<Vec<WebHit>, AgentError> {
            Ok(Vec::new())
        }

        async fn extract_repo_links(&self, _url: &str) -> Result<Vec<String>, AgentError> {
            Ok(Vec::new())
        }
    }

    let agent = ScoutAgent::new(
        Arc::new(FailingLlm),
        Arc::new(EmptyRepoGateway),
        Arc::new(EmptyWebGateway),
        10,
    );

    let report = agent.run("一个不存在的领域").await;
    assert!(report.contains("未能为"));
}
