use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use owo_colors::OwoColorize;
use revscrap_config::Config;
use std::path::Path;

pub fn run_config(cmd: ConfigCommands, path: &Path, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(path, output),
        ConfigCommands::Init { force } => init_config(path, force, output),
    }
}

fn show_config(path: &Path, output: &Output) -> Result<()> {
    let config = Config::load_or_default(path)
        .map_err(|e| eyre!("Failed to load config from {}: {}", path.display(), e))?;

    match output.format() {
        OutputFormat::Human => {
            if path.exists() {
                output.info(format!("{} {}", "Config file:".bold(), path.display()));
            } else {
                output.warn(format!("No config file at {}, showing defaults", path.display()));
            }
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| eyre!("Failed to render config: {}", e))?;
            output.info(rendered.trim_end());
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&serde_json::json!({
                "path": path.display().to_string(),
                "exists": path.exists(),
                "config": config,
            }));
        }
    }

    if let Err(e) = config.validate() {
        output.warn(format!("Configuration is not valid: {}", e));
    }
    Ok(())
}

fn init_config(path: &Path, force: bool, output: &Output) -> Result<()> {
    if path.exists() && !force {
        output.warn(format!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        ));
        return Ok(());
    }

    Config::default()
        .save_to_file(path)
        .map_err(|e| eyre!("Failed to write config to {}: {}", path.display(), e))?;
    output.success(format!("Wrote default configuration to {}", path.display()));
    Ok(())
}
