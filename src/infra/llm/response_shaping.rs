use crate::domain::{GenerationParams, Message, Role};

pub const MOCK_MARKER: &str = "[MOCK]";
pub const HIGH_TEMPERATURE_THRESHOLD: f32 = 0.7;
pub const LOW_TEMPERATURE_THRESHOLD: f32 = 0.3;
pub const SHORT_RESPONSE_TOKEN_LIMIT: u32 = 50;

const HIGH_TEMPERATURE_DECORATION: &str = "🎲 [High creativity mode]";
const LOW_TEMPERATURE_DECORATION: &str = "[Focused mode]";
const TRUNCATION_MARKER: &str = "...";
const EXCERPT_MAX_CHARS: usize = 48;

const COMPLETION_TEMPLATES: &[&str] = &[
    "Here is a considered response to \"{prompt}\". The prompt carries most of the context, so the completion stays close to it.",
    "Regarding \"{prompt}\": a reasonable continuation follows directly from the request and keeps to the point.",
    "A concise completion for \"{prompt}\". The key idea restated, then one supporting observation to round it out.",
    "Picking up from \"{prompt}\", the natural next step is to develop the thought without inventing new details.",
];

const EMPTY_PROMPT_COMPLETION: &str = "I need a prompt to work with.";
const EMPTY_CONVERSATION_REPLY: &str = "Hello! How can I help you today?";
const GREETING_REPLY: &str = "Hello! Nice to meet you. What would you like to talk about?";
const QUESTION_REPLY: &str =
    "That's an interesting question. Here is how I would start thinking about it.";

const GREETING_KEYWORDS: &[&str] = &["hello", "hi", "hey", "greetings", "howdy"];
const QUESTION_KEYWORDS: &[&str] = &["what", "how", "why", "when", "where", "who", "which"];

pub(crate) fn shape_completion(prompt: &str, params: &GenerationParams) -> String {
    shape(completion_body(prompt), params)
}

pub(crate) fn shape_chat_reply(conversation: &[Message], params: &GenerationParams) -> String {
    shape(chat_reply_body(conversation), params)
}

fn shape(body: String, params: &GenerationParams) -> String {
    let marked = format!("{MOCK_MARKER} {body}");
    truncate_to_budget(
        decorate_for_temperature(marked, params.temperature),
        params.max_tokens,
    )
}

fn completion_body(prompt: &str) -> String {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return EMPTY_PROMPT_COMPLETION.to_string();
    }

    let template = COMPLETION_TEMPLATES[stable_index(prompt, COMPLETION_TEMPLATES.len())];
    template.replace("{prompt}", &excerpt(prompt))
}

// Classification priority: empty > greeting > question > generic echo.
fn chat_reply_body(conversation: &[Message]) -> String {
    let last_user_content = conversation
        .iter()
        .rev()
        .find(|message| message.role == Role::User)
        .map(|message| message.content.trim());

    let Some(content) = last_user_content.filter(|content| !content.is_empty()) else {
        return EMPTY_CONVERSATION_REPLY.to_string();
    };

    if contains_keyword(content, GREETING_KEYWORDS) {
        return GREETING_REPLY.to_string();
    }
    if content.ends_with('?') || contains_keyword(content, QUESTION_KEYWORDS) {
        return QUESTION_REPLY.to_string();
    }

    format!(
        "You said: \"{}\". Tell me more and I will follow along.",
        excerpt(content)
    )
}

fn decorate_for_temperature(text: String, temperature: Option<f32>) -> String {
    match temperature {
        Some(temperature) if temperature >= HIGH_TEMPERATURE_THRESHOLD => {
            format!("{text} {HIGH_TEMPERATURE_DECORATION}")
        }
        Some(temperature) if temperature <= LOW_TEMPERATURE_THRESHOLD => {
            format!("{text} {LOW_TEMPERATURE_DECORATION}")
        }
        _ => text,
    }
}

// One mock token is budgeted as one character; the marker adds at most 3.
fn truncate_to_budget(text: String, max_tokens: Option<u32>) -> String {
    let Some(max_tokens) = max_tokens else {
        return text;
    };
    if max_tokens >= SHORT_RESPONSE_TOKEN_LIMIT {
        return text;
    }

    let budget = max_tokens as usize;
    if text.chars().count() <= budget {
        return text;
    }

    let kept: String = text.chars().take(budget).collect();
    format!("{}{TRUNCATION_MARKER}", kept.trim_end())
}

fn contains_keyword(content: &str, keywords: &[&str]) -> bool {
    content
        .to_lowercase()
        .split(|character: char| !character.is_alphanumeric())
        .any(|word| keywords.contains(&word))
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_MAX_CHARS {
        return text.to_string();
    }

    let kept: String = text.chars().take(EXCERPT_MAX_CHARS).collect();
    kept.trim_end().to_string()
}

fn stable_index(text: &str, buckets: usize) -> usize {
    text.bytes().fold(0_usize, |accumulator, byte| {
        accumulator
            .wrapping_mul(31)
            .wrapping_add(usize::from(byte))
    }) % buckets
}
