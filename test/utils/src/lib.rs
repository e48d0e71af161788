#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

use serde_json::json;
use serde_json::Value;

pub fn constellation_fixture() -> Value {
    return json!({
        "name": "Orion",
        "myth": "Orion was a mighty hunter who boasted he could catch any animal on Earth, so the gods placed him among the stars.",
        "funFact": "The three stars in a row make Orion's Belt, and they point toward Sirius, the brightest star in the night sky!",
        "bestSeen": "Winter evenings in the Northern Hemisphere",
        "starCount": 7
    });
}

/// Wraps text in the shape of a Gemini `generateContent` response with a
/// single candidate.
pub fn gemini_response_fixture(text: &str) -> String {
    return json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }]
    })
    .to_string();
}
