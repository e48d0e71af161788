#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::GatewayName;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    CacheDir,
    CacheOrigin,
    CacheVersion,
    ConfigFile,
    Gateway,
    GatewayHealthCheckTimeout,
    GatewayURL,
    GeminiToken,
    LoadingPhaseDelay,
    Model,
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    fn app_dir() -> path::PathBuf {
        #[cfg(not(target_os = "macos"))]
        let base = dirs::cache_dir().unwrap_or_else(env::temp_dir);
        #[cfg(target_os = "macos")]
        let base = env::var("HOME")
            .map(|home| return path::PathBuf::from(home).join(".config"))
            .unwrap_or_else(|_| return env::temp_dir());

        return base.join("star-buddy");
    }

    pub fn default(key: ConfigKey) -> String {
        let default_gateway = GatewayName::Gemini.to_string();
        let config_path = Config::app_dir().join("config.toml");
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("star-buddy/offline");

        let res = match key {
            ConfigKey::CacheDir => cache_dir.to_string_lossy().to_string(),
            ConfigKey::CacheOrigin => "http://localhost:3000".to_string(),
            ConfigKey::CacheVersion => "star-buddy-v3".to_string(),
            ConfigKey::ConfigFile => config_path.to_string_lossy().to_string(),
            ConfigKey::Gateway => default_gateway,
            ConfigKey::GatewayHealthCheckTimeout => "1000".to_string(),
            ConfigKey::GatewayURL => "https://generativelanguage.googleapis.com".to_string(),
            ConfigKey::GeminiToken => "".to_string(),
            ConfigKey::LoadingPhaseDelay => "1500".to_string(),
            ConfigKey::Model => "models/gemini-2.5-flash".to_string(),
        };

        return res;
    }

    /// Parses a millisecond config value, falling back to the default when the
    /// configured value is not a number.
    pub fn get_millis(key: ConfigKey) -> u64 {
        if let Ok(val) = Config::get(key).parse::<u64>() {
            return val;
        }

        tracing::warn!(key = key.to_string(), "invalid duration, using default");
        return Config::default(key).parse::<u64>().unwrap_or_default();
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let mut possible_values = vec![];
                    if let Some(arg) = cmd
                        .get_arguments()
                        .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                    {
                        possible_values = arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    }

                    if let Some(val_int) = val.as_integer() {
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                        }
                        Config::set(key, val_str);
                    } else {
                        bail!(format!(
                            "config.toml has an invalid value for key '{key}', expected a string or integer"
                        ));
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            gateway = Config::get(ConfigKey::Gateway),
            gateway_url = Config::get(ConfigKey::GatewayURL),
            model = Config::get(ConfigKey::Model),
            cache_origin = Config::get(ConfigKey::CacheOrigin),
            cache_version = Config::get(ConfigKey::CacheVersion),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name().to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
