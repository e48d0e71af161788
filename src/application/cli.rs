use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::CacheManifest;
use crate::domain::models::GatewayName;
use crate::domain::models::DEFAULT_ASSETS;
use crate::domain::models::GATEWAY_HOST_MARKER;
use crate::domain::services::offline_cache::OfflineCacheWorker;
use crate::infrastructure::cache_storage::CacheStorage;

const CHAT_HELP: &str = "HOTKEYS:
- Up / Down: Move through the popular constellations.
- Enter: Visit the highlighted constellation, or send your chat message.
- Tab: Open or close the chat with Star Buddy.
- Esc: Close the constellation card, or the chat.
- CTRL+U / CTRL+D: Scroll the chat up and down.
- CTRL+C: Exit.";

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

async fn load_config(matches: Vec<&ArgMatches>) -> Result<()> {
    Config::load(build(), matches).await?;

    if Config::get(ConfigKey::GeminiToken).is_empty() {
        if let Ok(token) = env::var("GEMINI_API_KEY") {
            Config::set(ConfigKey::GeminiToken, &token);
        }
    }

    return Ok(());
}

fn offline_cache_worker() -> OfflineCacheWorker {
    let storage = CacheStorage::new(path::PathBuf::from(Config::get(ConfigKey::CacheDir)));
    let manifest = CacheManifest::new(
        &Config::get(ConfigKey::CacheVersion),
        &Config::get(ConfigKey::CacheOrigin),
        &DEFAULT_ASSETS,
    );

    return OfflineCacheWorker::new(storage, manifest, GATEWAY_HOST_MARKER);
}

async fn install_offline_cache() -> Result<()> {
    let mut worker = offline_cache_worker();
    worker.install().await?;
    let deleted = worker.activate().await?;

    println!(
        "Installed offline cache {} ({})",
        worker.version(),
        worker.lifecycle()
    );
    for name in deleted {
        println!("Deleted superseded offline cache {name}");
    }

    return Ok(());
}

async fn print_offline_caches() -> Result<()> {
    let storage = CacheStorage::new(path::PathBuf::from(Config::get(ConfigKey::CacheDir)));
    let names = storage.keys().await?;
    let current = Config::get(ConfigKey::CacheVersion);

    if names.is_empty() {
        println!("There are no offline caches installed. Run `star-buddy cache install` to create one.");
        return Ok(());
    }

    let lines = names
        .iter()
        .map(|name| {
            if *name == current {
                return format!("- {name} (current)");
            }
            return format!("- {name}");
        })
        .collect::<Vec<String>>();

    println!("{}", lines.join("\n"));
    if !storage.has(&current).await? {
        println!("The current version {current} is not installed yet.");
    }

    return Ok(());
}

async fn fetch_through_offline_cache(url: &str) -> Result<()> {
    let (handle, worker) = offline_cache_worker().spawn();
    let res = handle.fetch(url).await?;

    println!(
        "{} {} ({} bytes from {})",
        res.status,
        res.url,
        res.body.len(),
        res.source
    );

    drop(handle);
    worker.await??;

    return Ok(());
}

fn subcommand_cache() -> Command {
    return Command::new("cache")
        .about("Manage the offline asset cache.")
        .arg_required_else_help(true)
        .subcommand(Command::new("dir").about("Print the offline cache directory path."))
        .subcommand(
            Command::new("install").about("Download every offline asset for the configured cache version, then delete all other versions.")
        )
        .subcommand(Command::new("list").about("List all installed offline cache versions."))
        .subcommand(
            Command::new("fetch")
                .about("Fetch a URL through the offline cache worker, reporting whether it came from the cache or the network.")
                .arg(
                    clap::Arg::new("url")
                        .short('u')
                        .long("url")
                        .help("URL to fetch")
                        .num_args(1)
                        .required(true),
                ),
        );
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    let mut cmd = Command::new("debug");
    cmd = cmd.about("Debug helpers for Star Buddy")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Star Buddy with environment variable RUST_LOG=star_buddy")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );

    return cmd;
}

fn subcommand_chat() -> Command {
    return Command::new("chat").about("Explore the constellations and chat with Star Buddy. This is the default command.");
}

fn arg_gateway() -> Arg {
    return Arg::new(ConfigKey::Gateway.to_string())
        .short('g')
        .long(ConfigKey::Gateway.to_string())
        .env("STAR_BUDDY_GATEWAY")
        .num_args(1)
        .help(format!(
            "The generative AI gateway answering constellation and chat requests. [default: {}]",
            Config::default(ConfigKey::Gateway)
        ))
        .value_parser(PossibleValuesParser::new(GatewayName::VARIANTS))
        .global(true);
}

fn arg_gateway_health_check_timeout() -> Arg {
    return Arg::new(ConfigKey::GatewayHealthCheckTimeout.to_string())
        .long(ConfigKey::GatewayHealthCheckTimeout.to_string())
        .env("STAR_BUDDY_GATEWAY_HEALTH_CHECK_TIMEOUT")
        .num_args(1)
        .help(
            format!("Time to wait in milliseconds before timing out when doing a healthcheck for the gateway. [default: {}]", Config::default(ConfigKey::GatewayHealthCheckTimeout)),
        )
        .global(true);
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env("STAR_BUDDY_MODEL")
        .num_args(1)
        .help(format!(
            "The Gemini model used for descriptions and chat. [default: {}]",
            Config::default(ConfigKey::Model)
        ))
        .global(true);
}

pub fn build() -> Command {
    let commands_text = CHAT_HELP
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("HOTKEYS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("star-buddy")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_cache())
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(arg_gateway())
        .arg(arg_gateway_health_check_timeout())
        .arg(arg_model())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("STAR_BUDDY_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::GatewayURL.to_string())
                .long(ConfigKey::GatewayURL.to_string())
                .env("STAR_BUDDY_GATEWAY_URL")
                .num_args(1)
                .help(format!("Gemini API URL. Can be swapped to a compatible proxy. [default: {}]", Config::default(ConfigKey::GatewayURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GeminiToken.to_string())
                .long(ConfigKey::GeminiToken.to_string())
                .env("STAR_BUDDY_GEMINI_TOKEN")
                .num_args(1)
                .help("Gemini API token. Falls back to the GEMINI_API_KEY environment variable.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::LoadingPhaseDelay.to_string())
                .long(ConfigKey::LoadingPhaseDelay.to_string())
                .env("STAR_BUDDY_LOADING_PHASE_DELAY")
                .num_args(1)
                .help(format!("Milliseconds before the loading screen switches to its second label. [default: {}]", Config::default(ConfigKey::LoadingPhaseDelay)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::CacheDir.to_string())
                .long(ConfigKey::CacheDir.to_string())
                .env("STAR_BUDDY_CACHE_DIR")
                .num_args(1)
                .help(format!("Directory holding the offline asset cache, one folder per cache version. [default: {}]", Config::default(ConfigKey::CacheDir)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::CacheOrigin.to_string())
                .long(ConfigKey::CacheOrigin.to_string())
                .env("STAR_BUDDY_CACHE_ORIGIN")
                .num_args(1)
                .help(format!("Origin the offline cache downloads its manifest assets from. [default: {}]", Config::default(ConfigKey::CacheOrigin)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::CacheVersion.to_string())
                .long(ConfigKey::CacheVersion.to_string())
                .env("STAR_BUDDY_CACHE_VERSION")
                .num_args(1)
                .help(format!("Version name of the offline cache. Activating a new version deletes all others. [default: {}]", Config::default(ConfigKey::CacheVersion)))
                .global(true),
        );
}

pub fn log_path() -> path::PathBuf {
    let log_dir = env::var("STAR_BUDDY_LOG_DIR")
        .map(path::PathBuf::from)
        .unwrap_or_else(|_| {
            return dirs::cache_dir()
                .unwrap_or_else(env::temp_dir)
                .join("star-buddy");
        });

    return log_dir.join("debug.log");
}

pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    println!("{}", log_path().to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("cache", subcmd_matches)) => {
            load_config(vec![&matches, subcmd_matches]).await?;
            match subcmd_matches.subcommand() {
                Some(("dir", _)) => {
                    println!("{}", Config::get(ConfigKey::CacheDir));
                }
                Some(("install", _)) => {
                    install_offline_cache().await?;
                }
                Some(("list", _)) => {
                    print_offline_caches().await?;
                }
                Some(("fetch", fetch_matches)) => {
                    if let Some(url) = fetch_matches.get_one::<String>("url") {
                        fetch_through_offline_cache(url).await?;
                    }
                }
                _ => {
                    subcommand_cache().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            load_config(vec![&matches, subcmd_matches]).await?;
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        _ => {
            load_config(vec![&matches]).await?;
        }
    }

    return Ok(true);
}
