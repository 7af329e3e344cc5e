// src/analyze/prompt.rs
//! Prompt construction for the intent classifier.

/// Judgment standard given to every provider as the system instruction.
/// Intent over keywords: keyword spotting belongs to the dictionary path.
pub const SYSTEM_INSTRUCTION: &str = "You are a hate speech detection system that judges \
the emotional intent of social media posts, not their vocabulary. A post is hate speech only \
when it dehumanizes, threatens, or incites hostility toward a group defined by a protected \
identity (race, ethnicity, nationality, religion, gender, sexual orientation, disability). \
Do NOT flag counter-speech, news reporting, quoting hateful content in order to condemn it, \
sarcasm aimed at bigots, or profanity that does not target an identity group. \
Respond ONLY with valid JSON. No explanations outside the JSON.";

const SCHEMA: &str = r#"{
  "isHateSpeech": boolean,
  "confidence": number (0-1),
  "categories": string[] (from: racial, religious, gender, sexual_orientation, disability, xenophobic, other),
  "severity": "none" | "low" | "medium" | "high",
  "targetGroup": string | null,
  "emotionalTone": "hateful" | "hostile" | "neutral" | "supportive" | "condemning",
  "intent": "one short phrase describing what the author is trying to do",
  "explanation": "brief explanation"
}"#;

/// Upper bound on the post text embedded in a prompt.
const MAX_POST_CHARS: usize = 2000;

/// System + user message pair handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
}

impl Prompt {
    pub fn for_post(text: &str) -> Self {
        Self {
            system: SYSTEM_INSTRUCTION,
            user: user_prompt(text),
        }
    }
}

/// The post is embedded as a JSON string literal so quotes and newlines cannot break
/// out of the prompt structure.
fn user_prompt(text: &str) -> String {
    let clipped: String = text.chars().take(MAX_POST_CHARS).collect();
    let literal = serde_json::Value::String(clipped).to_string();
    format!(
        "Analyze the following social media post for hate speech. Judge the author's intent \
toward any identity group, rate the severity and classify the target.\n\n\
Post: {literal}\n\n\
You MUST respond with ONLY valid JSON matching this schema, no other text:\n{SCHEMA}"
    )
}
