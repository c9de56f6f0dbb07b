use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// --- Knowledge base records ---

/// A single point of interest from the knowledge base. Every field is optional
/// and loosely typed: descriptive values are passed to the model as found,
/// and only a well-formed name and numeric coordinates are interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub distance_m: Option<Value>,
    #[serde(default, rename = "type")]
    pub place_type: Option<Value>,
    #[serde(default)]
    pub cuisine: Option<Value>,
    /// Free-form: a string like "10:00-23:00" or a structured object.
    #[serde(default)]
    pub opening_hours: Option<Value>,
    /// Usually numeric, occasionally a string such as "4.5/5".
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
}

/// Strings as-is, numbers and booleans in their JSON spelling, anything else
/// treated as missing.
fn lenient_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        v @ (Value::Number(_) | Value::Bool(_)) => Some(v.to_string()),
        _ => None,
    })
}

impl Place {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Latitude and longitude, only when both are JSON numbers.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude.as_ref()?.as_f64()?, self.longitude.as_ref()?.as_f64()?))
    }
}

// --- Conversations ---

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// Source tag written into every conversation's metadata.
pub const CONVERSATION_SOURCE: &str = "lmstudio";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_USER.to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_ASSISTANT.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMeta {
    pub model: String,
    pub source: String,
    /// `%Y-%m-%d`
    pub date: String,
    /// `%H:%M:%S`
    pub time: String,
    pub latency_ms: u64,
}

/// One synthesized question/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub category: String,
    pub location: Option<String>,
    pub messages: Vec<ConversationMessage>,
    pub meta: ConversationMeta,
}

impl Conversation {
    pub fn id_for(seed: u64, index: usize) -> String {
        format!("conv_{seed}_{index}")
    }

    pub fn user_question(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.role == ROLE_USER)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    pub fn assistant_answer(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.role == ROLE_ASSISTANT)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    pub fn is_answered(&self) -> bool {
        !self.assistant_answer().trim().is_empty()
    }

    /// Hour of day parsed from `meta.time`, if well formed.
    pub fn hour(&self) -> Option<u32> {
        self.meta
            .time
            .split(':')
            .next()?
            .parse::<u32>()
            .ok()
            .filter(|h| *h < 24)
    }
}
