use crate::domain::taxonomy::{TagSystem, Taxonomy};

fn catalog_outline(taxonomy: &Taxonomy) -> String {
    taxonomy
        .dimensions
        .iter()
        .map(|spec| {
            let subs = spec
                .sub_dimensions
                .iter()
                .map(|s| format!("  - {}", s))
                .collect::<Vec<_>>()
                .join("\n");
            format!("- {}\n{}", spec.name, subs)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn tag_system_prompt(taxonomy: &Taxonomy, corpus: &str) -> String {
    format!(
        r#"# 任务：构建用户评论分析标签体系

你是一位产品分析与自然语言处理专家。请基于下面的一批用户购后评论，为该产品构建三级标签体系，用于后续逐条评论打标。

## 一级与二级标签（固定，不得增删改名）
{outline}

## 三级标签要求
- 每个二级标签下给出若干三级标签，覆盖评论中提及的主要议题
- 同级标签尽量互斥，名称简洁，不超过5个汉字
- 标签只描述讨论主题（如“清洁效果”），不包含情感倾向（如“效果好”）
- 标签只使用中文、数字与常见中文标点

## 输出格式
只返回一个 JSON 对象，结构为 {{"一级标签": {{"二级标签": ["三级标签", ...]}}}}，不要任何解释。

## 评论内容
#####
{corpus}
#####"#,
        outline = catalog_outline(taxonomy),
        corpus = corpus
    )
}

pub fn review_tagging_prompt(tag_system: &TagSystem, review: &str) -> String {
    let system_json =
        serde_json::to_string_pretty(tag_system).unwrap_or_else(|_| "{}".to_string());
    format!(
        r#"请基于以下评价标签体系对评论进行标签分析。

## 标签体系
{system_json}

## 要求
- 评论涉及某个三级标签时保留该标签，无关的标签去掉
- 按评论对该主题是正面还是负面评价，将标签标记为“[正面]标签”或“[负面]标签”
- 保持原标签体系的 JSON 结构返回，没有命中的二级标签给空数组
- 只返回 JSON，不要任何解释

## 评论内容
##
{review}
##"#,
        system_json = system_json,
        review = review
    )
}

pub fn persona_prompt(corpus: &str) -> String {
    format!(
        r#"# 你是一名用户画像分析师

用户画像包含以下方面：
- 基础属性：年龄、性别、地区、职业等静态特征
- 行为特征：消费金额、购买频率等实际行为
- 心理动机：行为背后的动机、价值观与偏好
- 外部环境：社交圈、活跃平台等外部影响
- 需求痛点：核心需求、主要问题与期待

请根据以下商品评论反推出 3-5 个典型用户画像，每个画像包含性别年龄估计、需求关键词、购买动机、情绪语气判断和用户画像标签。使用 Markdown 输出。

#####
{corpus}
#####"#,
        corpus = corpus
    )
}
