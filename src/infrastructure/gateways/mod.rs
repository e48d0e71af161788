pub mod gemini;

use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::GatewayBox;
use crate::domain::models::GatewayName;

pub struct GatewayManager {}

impl GatewayManager {
    pub fn get(name: &str) -> Result<GatewayBox> {
        if let Some(GatewayName::Gemini) = GatewayName::parse(name.to_string()) {
            return Ok(Arc::<gemini::Gemini>::default());
        }

        bail!(format!("No gateway implemented for {name}"))
    }
}
