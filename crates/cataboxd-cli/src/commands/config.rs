use super::AppContext;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Table};
use owo_colors::OwoColorize;
use shelf_config::{Config, PathManager};

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(output),
        ConfigCommands::Init { force } => init_config(force, output),
    }
}

fn show_config(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let config_file = ctx.paths.config_file();

    match output.format() {
        OutputFormat::Human => {
            if !output.is_human() {
                return Ok(());
            }

            let mut info_table = Table::new();
            info_table.load_preset(comfy_table::presets::UTF8_FULL);
            info_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            info_table.set_header(vec![
                Cell::new("Config File").add_attribute(Attribute::Bold),
                Cell::new(config_file.display().to_string()),
            ]);
            info_table.add_row(vec![
                Cell::new("Exists"),
                Cell::new(if config_file.exists() {
                    "✓".green().to_string()
                } else {
                    "✗ (defaults)".red().to_string()
                }),
            ]);
            info_table.add_row(vec![
                Cell::new("Session Store"),
                Cell::new(ctx.paths.session_store_file().display().to_string()),
            ]);
            println!("{}", info_table);
            println!();

            let toml = toml::to_string_pretty(&ctx.config)
                .map_err(|e| color_eyre::eyre::eyre!("Failed to render config: {}", e))?;
            println!("{}", toml);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let value = serde_json::json!({
                "config_file": config_file.display().to_string(),
                "exists": config_file.exists(),
                "config": serde_json::to_value(&ctx.config)?,
            });
            output.json(&value);
        }
    }
    Ok(())
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config_file = paths.config_file();

    if config_file.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_file.display()
        ));
        return Ok(());
    }

    paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create {}: {}", paths.config_dir().display(), e))?;
    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}
