#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ChatMessage;
use crate::domain::models::ConstellationDetails;
use crate::domain::models::Gateway;
use crate::domain::models::GatewayName;

const API_KEY_HEADER: &str = "x-goog-api-key";

const PERSONA: &str = "You are Star Buddy, a cheerful robot astronomer talking to children aged 5 to 10. Answer in two or three short, simple sentences. Use friendly words and the occasional space emoji. Only talk about space, stars, planets and the night sky; gently steer other topics back to the stars.";

fn describe_prompt(name: &str) -> String {
    return format!(
        "Tell a young child about the constellation {name}. Give its name, a short and gentle version of its myth, one amazing fun fact, when and where it is best seen, and how many main stars make up its shape."
    );
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ContentPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    role: String,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

impl Content {
    fn text(role: &str, text: &str) -> Content {
        return Content {
            role: role.to_string(),
            parts: vec![ContentPart {
                text: Some(text.to_string()),
            }],
        };
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text = candidate
            .content
            .parts
            .iter()
            .filter_map(|part| return part.text.as_deref())
            .collect::<Vec<&str>>()
            .join("");

        if text.trim().is_empty() {
            return None;
        }

        return Some(text);
    }
}

fn constellation_schema() -> serde_json::Value {
    return json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "myth": { "type": "STRING" },
            "funFact": { "type": "STRING" },
            "bestSeen": { "type": "STRING" },
            "starCount": { "type": "INTEGER" }
        },
        "required": ["name", "myth", "funFact", "bestSeen", "starCount"]
    });
}

pub struct Gemini {
    url: String,
    token: String,
    model: String,
    timeout: String,
}

impl Default for Gemini {
    fn default() -> Gemini {
        return Gemini {
            url: Config::get(ConfigKey::GatewayURL),
            token: Config::get(ConfigKey::GeminiToken),
            model: Config::get(ConfigKey::Model),
            timeout: Config::get(ConfigKey::GatewayHealthCheckTimeout),
        };
    }
}

impl Gemini {
    async fn generate_content(&self, req: &GenerateContentRequest) -> Result<String> {
        let res = reqwest::Client::new()
            .post(format!(
                "{url}/v1beta/{model}:generateContent",
                url = self.url,
                model = self.model,
            ))
            .header(API_KEY_HEADER, &self.token)
            .json(req)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            bail!(format!("Gemini request failed with status {status}"));
        }

        let body = res.json::<GenerateContentResponse>().await?;
        return body
            .text()
            .ok_or_else(|| return anyhow!("Gemini returned no text"));
    }

    async fn request_details(&self, name: &str) -> Result<ConstellationDetails> {
        let req = GenerateContentRequest {
            contents: vec![Content::text("user", &describe_prompt(name))],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(constellation_schema()),
            }),
        };

        let text = self.generate_content(&req).await?;
        let details = serde_json::from_str::<ConstellationDetails>(text.trim())?;

        return Ok(details);
    }

    async fn request_reply(&self, history: &[ChatMessage], message: &str) -> Result<String> {
        let mut contents = history
            .iter()
            .map(|msg| return Content::text(&msg.role.to_string(), &msg.text))
            .collect::<Vec<Content>>();
        contents.push(Content::text("user", message));

        let req = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::text("", PERSONA)),
            generation_config: None,
        };

        return self.generate_content(&req).await;
    }
}

#[async_trait]
impl Gateway for Gemini {
    fn name(&self) -> GatewayName {
        return GatewayName::Gemini;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Gemini URL is not defined");
        }
        if self.token.is_empty() {
            bail!("Gemini token is not defined");
        }

        let url = format!("{url}/v1beta/{model}", url = self.url, model = self.model);

        let res = reqwest::Client::new()
            .get(&url)
            .header(API_KEY_HEADER, &self.token)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        if let Err(err) = res {
            tracing::error!(error = ?err, "Gemini is not reachable");
            bail!("Gemini is not reachable");
        }

        let status = res?.status().as_u16();
        if status >= 400 {
            tracing::error!(status = status, "Gemini health check failed");
            bail!("Gemini health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn describe_constellation(&self, name: &str) -> Option<ConstellationDetails> {
        match self.request_details(name).await {
            Ok(details) => {
                tracing::debug!(name = name, "described constellation");
                return Some(details);
            }
            Err(err) => {
                tracing::error!(name = name, error = ?err, "failed to describe constellation");
                return None;
            }
        }
    }

    #[allow(clippy::implicit_return)]
    async fn continue_chat(&self, history: &[ChatMessage], message: &str) -> Option<String> {
        match self.request_reply(history, message).await {
            Ok(reply) => return Some(reply),
            Err(err) => {
                tracing::error!(history_len = history.len(), error = ?err, "failed to continue chat");
                return None;
            }
        }
    }
}
