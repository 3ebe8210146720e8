//! Scout 入口：读取领域参数，运行智能体并输出报告

use anyhow::Context;
use scout::config::load_config;
use scout::ScoutAgent;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scout::observability::init();

    let domain = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if domain.trim().is_empty() {
        anyhow::bail!("用法: scout <领域描述>，例如: scout 容器化技术");
    }

    let cfg = load_config(None).context("Failed to load config")?;
    let agent = ScoutAgent::from_config(&cfg);

    let report = agent.run(domain.trim()).await;
    println!("{}", report);

    Ok(())
}
