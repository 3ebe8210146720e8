//! 提示词模板（中文）
//!
//! 决策提示词要求模型严格返回 JSON 决策；实际回复里常见代码栅栏、前后缀废话
//! 乃至模板转义残留的双大括号，解析侧的分层回收见 interpret 模块。

/// 首次执行计划提示词：仅用于日志记录，不参与控制流
pub fn plan_prompt(domain: &str) -> String {
    format!(
        r#"你是一个精通GitHub资源搜索和评估的AI助手。用户希望你帮助他们为这个领域找到最好的GitHub仓库: "{domain}"。

你可以使用以下工具:
1. 生成关键词 - 为GitHub搜索生成相关的英文关键词
2. 搜索GitHub - 使用关键词在GitHub上搜索仓库
3. 生成网络搜索查询 - 创建网络搜索查询来寻找推荐仓库的文章
4. 搜索网络 - 使用查询搜索网页
5. 提取GitHub链接 - 从网页中提取GitHub仓库URL
6. 获取仓库详情 - 获取特定GitHub仓库的完整元数据
7. 计算仓库分数 - 根据多种指标为仓库评分
8. 生成最终报告 - 为用户创建Markdown格式的最终报告

请制定一个简短的执行计划，描述你将如何使用这些工具来找到最优质的GitHub仓库，并为用户生成一份报告。

回答格式:

执行计划:
1. [首先我会做什么]
2. [然后我会做什么]
..."#
    )
}

/// 下一步行动决策提示词：嵌入状态与历史摘要，要求返回严格 JSON
pub fn decision_prompt(domain: &str, state_summary: &str, history_summary: &str) -> String {
    format!(
        r#"你是一个精通GitHub资源搜索和评估的AI助手。你正在帮助用户为这个领域寻找最好的GitHub仓库: "{domain}"。

当前的状态:
{state_summary}

已执行的操作历史:
{history_summary}

可用的行动:
1. GENERATE_KEYWORDS - 生成GitHub搜索关键词（无需参数）
2. SEARCH_GITHUB - 在GitHub上搜索仓库（需要keywords参数，是关键词列表）
3. GENERATE_WEB_QUERIES - 创建网络搜索查询（无需参数）
4. SEARCH_WEB - 执行网页搜索（需要query参数，是搜索字符串）
5. EXTRACT_GITHUB_LINKS - 从网页提取GitHub仓库链接（需要url参数，是网页URL）
6. GET_REPO_DETAILS - 获取仓库详情（需要repo_url参数，是仓库URL）
7. CALCULATE_SCORES - 为收集的仓库计算分数（无需参数）
8. GENERATE_REPORT - 生成最终报告（无需参数）
9. COMPLETE - 标记任务已完成（无需参数）

请分析当前状态，并决定下一步最佳行动。必须严格按照以下JSON格式返回你的决定，不要添加任何其他文本:

{{
    "action": "行动名称",
    "params": {{
        "参数名": "参数值"
    }},
    "reasoning": "你做出这个决定的简短理由"
}}

注意事项:
- 必须严格按照上述JSON格式返回，不带任何额外解释或代码块标记
- 如果没有参数，返回空对象 {{}}
- 确保选择的行动有意义，考虑已经完成的工作和可用的数据
- 必须先计算仓库分数(CALCULATE_SCORES)，然后再生成报告(GENERATE_REPORT)
- 只有在有排名后的仓库时，才能生成报告

示例 - 搜索GitHub:
{{
    "action": "SEARCH_GITHUB",
    "params": {{
        "keywords": ["machine learning", "deep learning tutorial"]
    }},
    "reasoning": "已有关键词，现在需要搜索相关GitHub仓库"
}}

示例 - 计算仓库评分:
{{
    "action": "CALCULATE_SCORES",
    "params": {{}},
    "reasoning": "已收集了足够的仓库信息，现在需要评分和排名"
}}

示例 - 完成任务:
{{
    "action": "COMPLETE",
    "params": {{}},
    "reasoning": "所有必要的步骤已完成，任务结束"
}}

请只返回包含行动决策的JSON对象，不要添加任何额外的文本、解释或代码块标记。"#
    )
}

/// 关键词生成提示词：要求纯 JSON 字符串数组
pub fn keywords_prompt(domain: &str) -> String {
    format!(
        r#"作为一名专业的搜索优化专家，请为用户提供的领域生成5-8个用于在GitHub上搜索高质量仓库的关键词或短语。

用户感兴趣的领域是: "{domain}"

请确保:
1. 生成的关键词必须是英文的，无论用户输入什么语言
2. 关键词应该多样化，覆盖不同的学习资源类型(如教程、指南、awesome列表、最佳实践等)
3. 关键词应包括领域特定的术语

如果用户输入的领域是中文或其他非英文语言，请先理解其含义，然后生成对应的英文关键词。

请只返回一个JSON格式的关键词数组，不要包含任何解释或前导文本。
格式示例:
["keyword1", "keyword2", "keyword3", "keyword4", "keyword5"]"#
    )
}

/// 网络搜索查询生成提示词：要求纯 JSON 字符串数组
pub fn web_queries_prompt(domain: &str) -> String {
    format!(
        r#"作为一名搜索专家，你的任务是为寻找GitHub上优质仓库资源生成有效的网络搜索查询。

用户对这个领域感兴趣: "{domain}"

请生成3-5个不同的搜索查询，这些查询必须是英文的，无论用户输入的是什么语言。
这些查询应该能帮助找到推荐GitHub仓库的高质量文章或资源列表。

查询应该多样化，覆盖不同角度，例如：
- 寻找"最佳/顶级/推荐"仓库列表
- 寻找学习路径或教程集合
- 寻找专家推荐或精选资源

语句应该尽量短，最好不要超过5个词，如"best llm repositories github"。

你的输出必须是一个JSON格式的字符串数组，仅包含生成的英文查询，不要有额外的解释。

示例输出格式:
["machine learning github repositories", "top rated deep learning frameworks", "github collections for AI beginners"]"#
    )
}

/// 最终报告撰写提示词：输入排名前 N 仓库的信息摘要
pub fn report_prompt(domain: &str, top_n: usize, repos_digest: &str) -> String {
    format!(
        r#"你是一位专业的AI技术分析师。你的任务是为用户准备一份关于"{domain}"领域的顶尖 GitHub 学习资源报告。

我已经为你提供了排名最高的 {top_n} 个仓库的详细信息（名称、URL、描述、Star数、Fork数、最近更新时间）。

**仓库信息**:
{repos_digest}

请根据以上信息，生成一份精炼、易读的 Markdown 格式报告，要严格符合markdown的语法。报告应包含以下要素：

1. 一个引人注目的标题，点明报告主题（例如："Top 5 GitHub 宝藏项目推荐"）。
2. 一段简短的引言，说明这份报告是如何通过多维度评估得出的，强调其客观性和时效性。
3. 对每一个推荐仓库的独立介绍，包括：
   - **项目名称和链接**: 作为二级或三级标题。
   - **核心指标**: `Stars`, `Forks`, `最近更新`。
   - **一句话总结**: 精准概括这个项目是什么。
   - **推荐理由**: 详细解释为什么这个项目值得关注，它解决了什么问题。
4. 一个总结性的结尾，鼓励用户探索这些资源。

报告必须使用清晰、专业的语言撰写，并以用户的视角出发，重点突出每个项目的实际价值。"#
    )
}
