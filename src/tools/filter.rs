//! 敏感内容过滤：按关键词表过滤仓库
//!
//! 英文关键词对小写化后的名称/描述做包含匹配，中文关键词直接做包含匹配；
//! 命中任意一个即整条丢弃并记录日志。

use crate::core::RepoRecord;

pub const SENSITIVE_KEYWORDS_EN: &[&str] = &[
    "politics",
    "election",
    "government",
    "senate",
    "congress",
    "parliament",
    "president",
    "prime minister",
    "democracy",
    "republican",
    "democrat",
    "liberal",
    "conservative",
    "socialism",
    "communism",
    "revolution",
    "protest",
    "activism",
    "geopolitics",
    "foreign policy",
    "legislation",
    "ballot",
    "campaign",
    "candidate",
    "regime",
    "coup",
    "dictator",
    "sovereignty",
    "nationalism",
    "ideology",
    "propaganda",
    "political party",
    "state-sponsored",
    "censorship",
    "human rights violation",
    "political prisoner",
    "authoritarian",
    "totalitarian",
    "oppression",
    "political dissent",
    "insurrection",
    "rebellion",
    "separatist",
];

pub const SENSITIVE_KEYWORDS_ZH: &[&str] = &[
    "政治",
    "选举",
    "政府",
    "参议院",
    "国会",
    "议会",
    "总统",
    "总理",
    "民主",
    "共和党",
    "民主党",
    "自由主义",
    "保守主义",
    "社会主义",
    "共产主义",
    "革命",
    "抗议",
    "激进主义",
    "地缘政治",
    "外交政策",
    "立法",
    "投票",
    "竞选",
    "候选人",
    "政权",
    "政变",
    "独裁者",
    "主权",
    "民族主义",
    "意识形态",
    "宣传",
    "政党",
    "国家支持",
    "审查",
    "人权侵犯",
    "政治犯",
    "威权主义",
    "极权主义",
    "压迫",
    "政治异议",
    "暴动",
    "叛乱",
    "分裂主义",
];

/// 返回命中的关键词；未命中返回 None
pub fn matched_keyword(full_name: &str, description: &str) -> Option<&'static str> {
    let name_lower = full_name.to_lowercase();
    let desc_lower = description.to_lowercase();

    for kw in SENSITIVE_KEYWORDS_EN {
        if name_lower.contains(kw) || desc_lower.contains(kw) {
            return Some(kw);
        }
    }
    for kw in SENSITIVE_KEYWORDS_ZH {
        if full_name.contains(kw) || description.contains(kw) {
            return Some(kw);
        }
    }
    None
}

/// 过滤敏感仓库，保留其余条目的原有顺序
pub fn filter_repos(repos: Vec<RepoRecord>) -> Vec<RepoRecord> {
    repos
        .into_iter()
        .filter(|repo| {
            if let Some(kw) = matched_keyword(&repo.full_name, &repo.description) {
                tracing::info!(repo = %repo.full_name, keyword = kw, "repo filtered by sensitive keyword");
                false
            } else {
                true
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(full_name: &str, description: &str) -> RepoRecord {
        RepoRecord {
            url: format!("https://github.com/{}", full_name),
            name: full_name.to_string(),
            full_name: full_name.to_string(),
            description: description.to_string(),
            stars: 0,
            forks: 0,
            pushed_at: String::new(),
            language: String::new(),
            score: None,
        }
    }

    #[test]
    fn english_keywords_match_case_insensitively() {
        assert!(matched_keyword("someone/Election-Tracker", "").is_some());
        assert!(matched_keyword("someone/ml-toolkit", "A GEOPOLITICS dataset").is_some());
        assert!(matched_keyword("someone/docker-guide", "container tutorial").is_none());
    }

    #[test]
    fn chinese_keywords_match_directly() {
        assert!(matched_keyword("someone/repo", "关于选举的数据集").is_some());
        assert!(matched_keyword("someone/repo", "机器学习教程").is_none());
    }

    #[test]
    fn filter_drops_only_matching_repos() {
        let repos = vec![
            repo("a/docker-guide", "container tutorial"),
            repo("b/election-map", "visualizing elections"),
            repo("c/k8s-examples", "kubernetes examples"),
        ];
        let kept = filter_repos(repos);
        let names: Vec<&str> = kept.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["a/docker-guide", "c/k8s-examples"]);
    }
}
