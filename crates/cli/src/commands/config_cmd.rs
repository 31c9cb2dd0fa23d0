//! `panelforge config`: configuration management commands.

use std::path::Path;

use panelforge_config::AppConfig;

use super::{config_file, load_config};

/// Non-fatal problems worth a warning.
pub fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if !config.has_api_key() {
        warnings.push("No API key set (set PANELFORGE_API_KEY, OPENROUTER_API_KEY or OPENAI_API_KEY)");
    }
    if config.gateway.host == "0.0.0.0" {
        warnings.push("Gateway bound to 0.0.0.0 is reachable from other machines");
    }
    if config.assistant.history_limit == 0 {
        warnings.push("assistant.history_limit = 0 hides all previous chat turns from the classifier");
    }
    warnings
}

pub fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("   Config error: {e}");
            return Err(e);
        }
    };
    println!("   Config parsed successfully");

    let warnings = warnings(&config);
    if warnings.is_empty() {
        println!("   All checks passed");
    } else {
        println!();
        for w in &warnings {
            println!("   warning: {w}");
        }
    }

    println!();
    println!("   Provider:  {}", config.default_provider);
    println!("   Model:     {}", config.default_model);
    println!("   Gateway:   {}:{}", config.gateway.host, config.gateway.port);
    println!("   Store:     {}", config.store.resolved_path().display());
    Ok(())
}

pub fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

pub fn path(config_path: Option<&Path>) {
    println!("{}", config_file(config_path).display());
}

pub fn init(config_path: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let file = config_file(config_path);
    if file.exists() && !force {
        return Err(format!("{} already exists (use --force to overwrite)", file.display()).into());
    }
    if let Some(dir) = file.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&file, AppConfig::default_toml())?;
    println!("Wrote {}", file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_warns_only_about_the_key() {
        let config = AppConfig::default();
        let warnings = warnings(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("No API key"));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested").join("config.toml");
        init(Some(&file), false).unwrap();
        assert!(init(Some(&file), false).is_err());
        init(Some(&file), true).unwrap();
        assert!(load_config(Some(&file)).is_ok());
    }
}
