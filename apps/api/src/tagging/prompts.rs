// Prompt templates and the prompt builder for tag extraction.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{CLOSED_VOCABULARY_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::llm_client::Prompt;
use crate::tagging::dictionary::TagDictionary;

/// Placeholder a custom prompt may use to position the user's text.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// System instruction for tag extraction.
/// Replace: {countries}, {degrees}, {majors}, {closed_vocabulary}, {json_only}
pub const TAG_EXTRACTION_SYSTEM_TEMPLATE: &str = r#"你是一个留学标签识别助手。你的任务是从用户的自然语言描述中提取四个标签：国家、学历、一级专业、二级专业。

## 标签池

### 国家
{countries}

### 学历
{degrees}

### 专业（一级专业，缩进项为其下属二级专业）
{majors}

## 提取规则

1. country：从国家标签池中选择用户想去的国家
2. degree：从学历标签池中选择用户想申请的学历
3. major：必须是一级专业名称
4. sub_major：必须是 major 所属的二级专业；用户只提到二级专业时，同时给出它所属的一级专业
5. {closed_vocabulary}

## 输出格式

{json_only}
对象必须恰好包含以下四个键，值为标签池中的名称或 null：
{"country": "国家或null", "degree": "学历或null", "major": "一级专业或null", "sub_major": "二级专业或null"}"#;

/// User message for tag extraction. Replace: {input}
pub const TAG_EXTRACTION_USER_TEMPLATE: &str = "请分析以下描述并提取标签：\n{input}";

/// Builds the prompt for one extraction.
///
/// Without an override the instruction enumerates the whole dictionary and the exact
/// output shape. An override is used verbatim: if it contains `{input}` the free text is
/// interpolated there and sent as the only message; otherwise the override becomes the
/// system instruction and the free text the user message. Blank overrides are ignored.
pub fn build_prompt(free_text: &str, dictionary: &TagDictionary, custom: Option<&str>) -> Prompt {
    match effective_override(custom) {
        Some(template) if template.contains(INPUT_PLACEHOLDER) => Prompt {
            system: None,
            user: template.replace(INPUT_PLACEHOLDER, free_text),
        },
        Some(template) => Prompt {
            system: Some(template.to_string()),
            user: free_text.to_string(),
        },
        None => Prompt {
            system: Some(default_instructions(dictionary)),
            user: TAG_EXTRACTION_USER_TEMPLATE.replace(INPUT_PLACEHOLDER, free_text),
        },
    }
}

/// The override that `build_prompt` will honour, if any. Blank overrides do not count.
pub fn effective_override(custom: Option<&str>) -> Option<&str> {
    custom.filter(|c| !c.trim().is_empty())
}

/// Renders the default system instruction for `dictionary`.
pub fn default_instructions(dictionary: &TagDictionary) -> String {
    TAG_EXTRACTION_SYSTEM_TEMPLATE
        .replace("{countries}", &dictionary.countries().join("、"))
        .replace("{degrees}", &dictionary.degrees().join("、"))
        .replace("{majors}", &render_majors(dictionary))
        .replace("{closed_vocabulary}", CLOSED_VOCABULARY_INSTRUCTION)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
}

fn render_majors(dictionary: &TagDictionary) -> String {
    let mut lines = Vec::new();
    for major in dictionary.majors() {
        lines.push(major.name.clone());
        lines.extend(major.sub_majors.iter().map(|sub| format!("  - {sub}")));
    }
    lines.join("\n")
}
