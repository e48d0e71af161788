#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

pub const WELCOME_MESSAGE: &str = "Hi! I'm Star Buddy! 🤖✨ Ask me anything about the night sky!";
pub const FALLBACK_REPLY: &str = "I'm a bit lost in space! Try again?";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Name shown above a message in the chat panel.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => return "You",
            Role::Model => return "Star Buddy",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn new(role: Role, text: &str) -> ChatMessage {
        return ChatMessage {
            role,
            text: text.to_string(),
        };
    }

    pub fn welcome() -> ChatMessage {
        return ChatMessage::new(Role::Model, WELCOME_MESSAGE);
    }

    pub fn reply_or_fallback(reply: Option<String>) -> ChatMessage {
        let text = reply.unwrap_or_else(|| return FALLBACK_REPLY.to_string());
        return ChatMessage::new(Role::Model, &text);
    }

    /// Display lines wrapped to `line_max_width`, with tabs expanded.
    pub fn as_string_lines(&self, line_max_width: usize) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        let text = self.text.replace('\t', "  ");

        for full_line in text.split('\n') {
            if full_line.trim().is_empty() {
                lines.push(" ".to_string());
                continue;
            }

            let mut char_count = 0;
            let mut current_lines: Vec<&str> = vec![];

            for word in full_line.split(' ') {
                let word_len = word.chars().count();
                if !current_lines.is_empty() && word_len + char_count + 1 > line_max_width {
                    lines.push(current_lines.join(" ").trim_end().to_string());
                    current_lines = vec![word];
                    char_count = word_len + 1;
                } else {
                    current_lines.push(word);
                    char_count += word_len + 1;
                }
            }
            if !current_lines.is_empty() {
                lines.push(current_lines.join(" ").trim_end().to_string());
            }
        }

        return lines;
    }
}
