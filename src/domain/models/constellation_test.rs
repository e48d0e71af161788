use anyhow::Result;
use test_utils::constellation_fixture;

use super::ConstellationDetails;
use super::POPULAR_CONSTELLATIONS;

#[test]
fn it_deserializes_gateway_json() -> Result<()> {
    let details: ConstellationDetails = serde_json::from_value(constellation_fixture())?;

    assert_eq!(details.name, "Orion");
    assert_eq!(details.best_seen, "Winter evenings in the Northern Hemisphere");
    assert_eq!(details.star_count, 7);
    assert_eq!(details.image_url, None);

    return Ok(());
}

#[test]
fn it_accepts_the_stars_count_alias() -> Result<()> {
    let details: ConstellationDetails = serde_json::from_str(
        r#"{"name":"Leo","myth":"A lion.","funFact":"Regulus!","bestSeen":"Spring","starsCount":9,"imageUrl":"https://example.com/leo.png"}"#,
    )?;

    assert_eq!(details.star_count, 9);
    assert_eq!(
        details.image_url,
        Some("https://example.com/leo.png".to_string())
    );

    return Ok(());
}

#[test]
fn it_rejects_json_missing_fields() {
    let res = serde_json::from_str::<ConstellationDetails>(r#"{"name":"Leo"}"#);
    assert!(res.is_err());
}

#[test]
fn it_lists_card_fields() -> Result<()> {
    let mut details: ConstellationDetails = serde_json::from_value(constellation_fixture())?;
    assert_eq!(details.card_fields().len(), 4);
    assert_eq!(details.card_fields()[3], ("Main Stars", "7".to_string()));

    details.image_url = Some("https://example.com/orion.png".to_string());
    assert_eq!(details.card_fields().len(), 5);

    return Ok(());
}

#[test]
fn it_offers_six_constellations() {
    assert_eq!(POPULAR_CONSTELLATIONS.len(), 6);
    assert_eq!(POPULAR_CONSTELLATIONS[0], "Orion");
}
