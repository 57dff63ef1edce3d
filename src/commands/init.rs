use std::io::{self, Write};

use crate::config::Config;
use crate::error::{PulseError, Result};

pub async fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() {
        print!(
            "Config file already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("DevPulse Configuration");
    println!("======================\n");

    print!("Tracker base URL (e.g. https://yourteam.atlassian.net): ");
    io::stdout().flush()?;
    let mut base_url = String::new();
    io::stdin().read_line(&mut base_url)?;
    let base_url = base_url.trim();
    if base_url.is_empty() {
        return Err(PulseError::MissingBaseUrl);
    }

    print!("Account email: ");
    io::stdout().flush()?;
    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    let email = email.trim();

    print!("API token (create one in your tracker's security settings): ");
    io::stdout().flush()?;
    let mut api_token = String::new();
    io::stdin().read_line(&mut api_token)?;
    let api_token = api_token.trim();
    if api_token.is_empty() {
        return Err(PulseError::MissingApiToken);
    }

    print!("Default subject user (your display name) [optional]: ");
    io::stdout().flush()?;
    let mut default_user = String::new();
    io::stdin().read_line(&mut default_user)?;
    let default_user = default_user.trim();

    print!("Project keys for the team baseline, comma separated [optional]: ");
    io::stdout().flush()?;
    let mut projects = String::new();
    io::stdin().read_line(&mut projects)?;
    let projects: Vec<&str> = projects
        .trim()
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PulseError::ConfigRead {
            path: config_path.clone(),
            source: e,
        })?;
    }

    let mut config_content = format!("base_url = \"{base_url}\"\n");
    if !email.is_empty() {
        config_content.push_str(&format!("email = \"{email}\"\n"));
    }
    config_content.push_str(&format!("api_token = \"{api_token}\"\n"));
    if !default_user.is_empty() {
        config_content.push_str(&format!("default_user = \"{default_user}\"\n"));
    }
    if !projects.is_empty() {
        let list = projects
            .iter()
            .map(|p| format!("\"{p}\""))
            .collect::<Vec<_>>()
            .join(", ");
        config_content.push_str(&format!("projects = [{list}]\n"));
    }

    std::fs::write(&config_path, config_content).map_err(|e| PulseError::ConfigRead {
        path: config_path.clone(),
        source: e,
    })?;

    println!("\nConfig saved to {}", config_path.display());
    println!("You can now run 'devpulse timing' and friends.");

    Ok(())
}
