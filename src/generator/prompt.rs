use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::engine::difficulty::Difficulty;

pub const SYSTEM_INSTRUCTION: &str = "你是一个诗词游戏助手。请严格按照JSON格式返回数据。";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Body of a chat-completion call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub stream: bool,
}

struct Example {
    poem: &'static str,
    code: &'static str,
}

const EASY_EXAMPLE: Example = Example {
    poem: "举头望明月",
    code: "if(moon.isShining()) { const reflection = window.getReflection(); }",
};

const HARD_EXAMPLE: Example = Example {
    poem: "不识庐山真面目",
    code: "const mountain = new Mountain('lushan'); mountain.observe('front');",
};

/// User prompt for one tier, excluding every answer already served.
pub fn user_prompt(difficulty: Difficulty, used: &[String]) -> String {
    let (kind, rule_one, rule_two, example) = match difficulty {
        Difficulty::Easy => (
            "简单",
            "必须是最家喻户晓的经典诗词名句",
            "诗句要朗朗上口、易于记忆",
            &EASY_EXAMPLE,
        ),
        Difficulty::Hard => (
            "较难",
            "必须是较为典雅的经典诗词名句",
            "诗句要有一定的文学性和意境美",
            &HARD_EXAMPLE,
        ),
    };
    let example_json = serde_json::json!({ "poem": example.poem, "code": example.code });
    let example_json = serde_json::to_string_pretty(&example_json).unwrap_or_default();

    format!(
        "请生成一句{kind}的中国古诗名句（不超过5字）和相关代码，要求：\n\
         1. {rule_one}\n\
         2. {rule_two}\n\
         3. 不能是以下诗句：{excluded}\n\
         \n\
         请按照以下JSON格式返回：\n\
         {example_json}",
        excluded = used.join("、"),
    )
}

pub fn build_request(
    difficulty: Difficulty,
    used: &[String],
    config: &GeneratorConfig,
) -> GenerationRequest {
    GenerationRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: SYSTEM_INSTRUCTION.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: user_prompt(difficulty, used),
            },
        ],
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        presence_penalty: config.presence_penalty,
        frequency_penalty: config.frequency_penalty,
        stream: false,
    }
}
