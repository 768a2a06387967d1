use anyhow::{Context, Result};
use toml_edit::DocumentMut;

use evoke_service::config::{self, KEYS};
use evoke_service::Config;

/// Show the current effective configuration.
pub fn show_config(config: &Config) {
    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    for key in KEYS {
        println!("  {}: {}", key, config.get(key).unwrap_or_default());
    }
    println!("  logging: {:?}", config.logging);

    println!("\nPriority: CLI args > ENV vars (EVOKE_*) > Config file > Defaults");
}

/// Get a specific config value.
pub fn get_config(config: &Config, key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        let value = config
            .get(&key)
            .ok_or_else(|| unknown_key(&key))?;
        println!("{}", value);
    } else {
        // No key provided, show entire config file contents
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            print!("{}", contents);
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'evoke config init' to create it.");
        }
    }

    Ok(())
}

/// Set a config value, keeping the rest of the file (comments included)
/// intact.
pub fn set_config(key: &str, value: &str) -> Result<()> {
    let config_path = config::config_file_path();

    config::ensure_config_file()?;

    let contents = std::fs::read_to_string(&config_path)
        .context("Failed to read config file")?;
    let updated = set_value(&contents, key, value)?;

    std::fs::write(&config_path, updated)
        .context("Failed to write config file")?;

    println!("✓ Updated {} = {}", key, value);
    println!("  in {}", config_path.display());

    Ok(())
}

fn set_value(contents: &str, key: &str, value: &str) -> Result<String> {
    if !KEYS.contains(&key) {
        return Err(unknown_key(key));
    }

    let mut doc = contents
        .parse::<DocumentMut>()
        .context("Failed to parse config file")?;

    doc[key] = match key {
        "ml_timeout_secs" | "health_timeout_secs" => {
            let secs: u32 = value
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", key))?;
            toml_edit::value(i64::from(secs))
        }
        _ => toml_edit::value(value),
    };

    Ok(doc.to_string())
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!("Unknown config key: {}\n\nValid keys: {}", key, KEYS.join(", "))
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure evoke.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
