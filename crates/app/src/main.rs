use std::path::PathBuf;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use crowd::{CrowdPlugin, SiteConfig};

mod agent_mode;
mod presentation;

/// Wall-clock pacing of the headless runner. The fixed tick runs at its own
/// 10 Hz regardless.
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

const CONFIG_ENV: &str = "SCENIC_CROWD_CONFIG";

const USAGE: &str = "usage: scenic-crowd [--agent] [--config <file.json>] [--seed <u64>] [--no-auto-refresh]";

struct CliArgs {
    agent: bool,
    config: Option<PathBuf>,
    seed: Option<u64>,
    auto_refresh: bool,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut parsed = CliArgs {
        agent: false,
        config: None,
        seed: None,
        auto_refresh: true,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--agent" => parsed.agent = true,
            "--no-auto-refresh" => parsed.auto_refresh = false,
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--seed" => {
                let value = args.next().ok_or("--seed needs a value")?;
                let seed = value
                    .parse()
                    .map_err(|e| format!("invalid seed '{value}': {e}"))?;
                parsed.seed = Some(seed);
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(parsed)
}

/// Reads the site layout and applies the command-line overrides. The file
/// comes from `--config`, then `SCENIC_CROWD_CONFIG`; without either the
/// reference layout is used.
fn load_config(args: &CliArgs) -> Result<SiteConfig, String> {
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    let mut config = match path {
        Some(path) => SiteConfig::from_json_file(&path).map_err(|e| e.to_string())?,
        None => SiteConfig::reference(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if !args.auto_refresh {
        config = config.without_auto_refresh();
    }
    Ok(config)
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            std::process::exit(2);
        }
    };
    let plugin = load_config(&args)
        .and_then(|config| CrowdPlugin::from_config(config).map_err(|e| e.to_string()));
    let plugin = match plugin {
        Ok(plugin) => plugin,
        Err(err) => {
            eprintln!("invalid site configuration: {err}");
            std::process::exit(1);
        }
    };

    if args.agent {
        agent_mode::run_agent_mode(plugin);
        return;
    }

    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(FRAME_INTERVAL)))
        .add_plugins(LogPlugin::default())
        .add_plugins(plugin)
        .add_plugins(presentation::PresentationPlugin);
    app.run();
}
