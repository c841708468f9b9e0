use super::prompts;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use popcorn_config::{Config, CredentialStore, PathManager, API_KEY_ENV};
use serde_json::json;

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output).await,
        crate::ConfigCommands::ApiKey { key } => configure_api_key(key, output).await,
    }
}

async fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    let mut credentials = CredentialStore::new(path_manager.credentials_file());
    credentials
        .load()
        .map_err(|e| eyre!("Failed to load credentials: {}", e))?;

    let from_env = std::env::var(API_KEY_ENV).map(|v| !v.is_empty()).unwrap_or(false);
    let api_key = credentials.resolve_omdb_api_key().unwrap_or_default();
    let api_key_display = if full { api_key.clone() } else { mask_string(&api_key) };
    let key_source = if from_env { API_KEY_ENV } else { "credentials.toml" };
    let reported_source = (!api_key.is_empty()).then_some(key_source);

    if !output.is_human() {
        output.json(&json!({
            "type": "config",
            "config_file": config_file.display().to_string(),
            "config_file_exists": config_file.exists(),
            "store_dir": path_manager.store_dir().display().to_string(),
            "omdb": {
                "base_url": config.omdb.base_url,
                "timeout_secs": config.omdb.timeout_secs,
                "api_key": api_key_display,
                "api_key_source": reported_source,
            },
            "storage": {
                "watched_key": config.storage.watched_key,
            },
        }));
        return Ok(());
    }

    if !config_file.exists() {
        output.info(format!(
            "No configuration file at {}; using defaults",
            config_file.display()
        ));
    }

    let mut info_table = Table::new();
    info_table.load_preset(comfy_table::presets::UTF8_FULL);
    info_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    info_table.set_header(vec![
        Cell::new("Config File").add_attribute(Attribute::Bold),
        Cell::new(config_file.display().to_string()),
    ]);
    info_table.add_row(vec![
        Cell::new("Watched Store"),
        Cell::new(path_manager.store_dir().join(format!("{}.json", config.storage.watched_key)).display().to_string()),
    ]);
    output.println(info_table.to_string());

    let mut omdb_table = Table::new();
    omdb_table.load_preset(comfy_table::presets::UTF8_FULL);
    omdb_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    omdb_table.set_header(vec![
        Cell::new("OMDb").fg(Color::Cyan).add_attribute(Attribute::Bold),
    ]);
    omdb_table.add_row(vec![Cell::new("Base URL"), Cell::new(&config.omdb.base_url)]);
    omdb_table.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{}s", config.omdb.timeout_secs))]);
    if api_key.is_empty() {
        omdb_table.add_row(vec![Cell::new("API Key"), Cell::new("✗ not set".red().to_string())]);
    } else {
        omdb_table.add_row(vec![
            Cell::new("API Key"),
            Cell::new(format!("{} ({})", api_key_display, key_source.bright_black())),
        ]);
    }
    output.println(omdb_table.to_string());

    Ok(())
}

async fn configure_api_key(key: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create config directory: {}", e))?;

    let key = match key {
        Some(key) => key,
        None => {
            output.info("Get a free key at https://www.omdbapi.com/apikey.aspx");
            prompts::prompt_password("OMDb API key")?
        }
    };
    let key = key.trim().to_string();
    validate_api_key(&key).map_err(|e| eyre!("{}", e))?;

    let mut credentials = CredentialStore::new(path_manager.credentials_file());
    credentials
        .load()
        .map_err(|e| eyre!("Failed to load credentials: {}", e))?;
    credentials.set_omdb_api_key(key);
    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;

    output.success(format!("API key saved to {}", path_manager.credentials_file().display()));
    if std::env::var(API_KEY_ENV).is_ok() {
        output.warn(format!("{} is set and takes precedence over the saved key", API_KEY_ENV));
    }
    Ok(())
}

fn validate_api_key(input: &str) -> Result<(), &'static str> {
    if input.is_empty() {
        return Err("API key cannot be empty");
    }
    if !input.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("API key must contain only letters and digits");
    }
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
