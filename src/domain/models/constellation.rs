#[cfg(test)]
#[path = "constellation_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Constellations offered on the home screen.
pub const POPULAR_CONSTELLATIONS: [&str; 6] = [
    "Orion",
    "Ursa Major",
    "Cassiopeia",
    "Leo",
    "Cygnus",
    "Pegasus",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstellationDetails {
    pub name: String,
    pub myth: String,
    pub fun_fact: String,
    pub best_seen: String,
    #[serde(alias = "starsCount")]
    pub star_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ConstellationDetails {
    /// Label/value pairs in the order the card shows them.
    pub fn card_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("The Story", self.myth.to_string()),
            ("Fun Fact", self.fun_fact.to_string()),
            ("Best Seen", self.best_seen.to_string()),
            ("Main Stars", self.star_count.to_string()),
        ];

        if let Some(image_url) = &self.image_url {
            fields.push(("Picture", image_url.to_string()));
        }

        return fields;
    }
}
