use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let toml_res = res.parse::<toml_edit::Document>();
    assert!(toml_res.is_ok());

    assert!(res.contains("gateway = \"gemini\""));
    assert!(res.contains("loading-phase-delay = 1500"));
    assert!(res.contains("# gemini-token = \"\""));
    assert!(!res.contains("config-file"));
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec![
        "star-buddy",
        "chat",
        "-c",
        "./config.example.toml",
    ])?;
    let (_, subcmd_matches) = matches.subcommand().unwrap();
    Config::load(cli::build(), vec![&matches, subcmd_matches]).await?;

    assert_eq!(Config::get(ConfigKey::CacheVersion), "star-buddy-v3");
    assert_eq!(Config::get(ConfigKey::LoadingPhaseDelay), "1500");
    assert_eq!(Config::get(ConfigKey::Gateway), "gemini");

    return Ok(());
}

#[tokio::test]
async fn it_fails_to_loads_config_from_file() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["star-buddy", "-c", "./test/bad-config.toml"])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());
    return Ok(());
}

#[test]
fn it_falls_back_to_default_millis() {
    Config::set(ConfigKey::GatewayHealthCheckTimeout, "soon");
    assert_eq!(Config::get_millis(ConfigKey::GatewayHealthCheckTimeout), 1000);
}
