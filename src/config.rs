//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `SCOUT__*` 覆盖（双下划线表示嵌套，
//! 如 `SCOUT__LLM__MODEL=qwen-plus`）。API Key 类字段另有环境变量回退
//! （OPENAI_API_KEY / GITHUB_TOKEN），见各网关构造处。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub github: GithubSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub agent: AgentSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            llm: LlmSection::default(),
            github: GithubSection::default(),
            search: SearchSection::default(),
            agent: AgentSection::default(),
        }
    }
}

/// [app] 段
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：OpenAI 兼容端点与采样参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
            api_key: None,
            temperature: None,
        }
    }
}

fn default_model() -> String {
    "qwen-plus".to_string()
}

/// [github] 段：API 地址、令牌与搜索限速
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubSection {
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
    pub access_token: Option<String>,
    /// 单个关键词返回的最大结果数
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// 相邻关键词搜索间的固定休眠（秒），规避 API 限速
    #[serde(default = "default_search_interval_secs")]
    pub search_interval_secs: u64,
    #[serde(default = "default_github_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            access_token: None,
            per_page: default_per_page(),
            search_interval_secs: default_search_interval_secs(),
            timeout_secs: default_github_timeout_secs(),
        }
    }
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_per_page() -> u32 {
    10
}

fn default_search_interval_secs() -> u64 {
    1
}

fn default_github_timeout_secs() -> u64 {
    15
}

/// [search] 段：网页搜索（Tavily 可选，缺省回退 DuckDuckGo）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub tavily_api_key: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            max_results: default_max_results(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

fn default_max_results() -> usize {
    5
}

fn default_search_timeout_secs() -> u64 {
    10
}

/// [agent] 段：决策循环上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_max_iterations() -> usize {
    10
}

/// 从 config 目录加载配置，环境变量 SCOUT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 SCOUT__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SCOUT")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.llm.model, "qwen-plus");
        assert_eq!(cfg.github.api_url, "https://api.github.com");
        assert_eq!(cfg.github.per_page, 10);
        assert_eq!(cfg.github.search_interval_secs, 1);
        assert_eq!(cfg.search.max_results, 5);
        assert_eq!(cfg.agent.max_iterations, 10);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[llm]\nmodel = \"qwen-turbo\"\n\n[agent]\nmax_iterations = 3\n"
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.llm.model, "qwen-turbo");
        assert_eq!(cfg.agent.max_iterations, 3);
        // 未覆盖的键保持默认
        assert_eq!(cfg.github.per_page, 10);
    }
}
