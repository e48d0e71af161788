#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::ChatMessage;
use super::ConstellationDetails;

/// Marker found in every URL of the hosted generative AI service. Requests
/// carrying it are never answered from the offline cache.
pub const GATEWAY_HOST_MARKER: &str = "googleapis";

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum GatewayName {
    Gemini,
}

impl GatewayName {
    pub fn parse(text: String) -> Option<GatewayName> {
        return GatewayName::iter().find(|e| return e.to_string() == text);
    }
}

#[async_trait]
pub trait Gateway {
    fn name(&self) -> GatewayName;

    /// Used at startup to verify all configurations are available to work with
    /// the gateway.
    async fn health_check(&self) -> Result<()>;

    /// Asks the gateway to describe a constellation. Every transport or parse
    /// failure is logged and reported as `None`; there are no retries.
    async fn describe_constellation(&self, name: &str) -> Option<ConstellationDetails>;

    /// Continues the conversation. `history` is the transcript as it was before
    /// `message` was appended; the gateway keeps no state between calls so the
    /// whole conversation is resent every time.
    async fn continue_chat(&self, history: &[ChatMessage], message: &str) -> Option<String>;
}

pub type GatewayBox = Arc<dyn Gateway + Send + Sync>;
