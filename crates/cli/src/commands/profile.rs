//! `ost profile` subcommands

use crate::config::{self, Config, Profile};
use anyhow::{Context, Result};
use std::io::{self, Write};
use url::Url;

pub fn run_profile_list() -> Result<()> {
    let config = config::load_config()?;

    if config.profiles.is_empty() {
        println!(
            "No profiles configured in {}. Use 'ost profile set <NAME> <URL>' to create one.",
            config::config_file_path()?.display()
        );
        return Ok(());
    }

    println!("Available profiles:");
    println!();

    for name in config.profile_names() {
        let profile = &config.profiles[name];
        let marker = if name == &config.settings.active_profile { "*" } else { " " };
        println!("{} {} ({})", marker, name, profile.host);
    }

    println!();
    println!("* = active profile");

    Ok(())
}

pub fn run_profile_show(name: Option<&str>) -> Result<()> {
    let config = config::load_config()?;

    let profile_name = name.unwrap_or(&config.settings.active_profile);
    let profile = config
        .get_profile(profile_name)
        .with_context(|| format!("Profile '{}' not found", profile_name))?;

    println!("Profile: {}", profile_name);
    println!("  Host: {}", profile.host);
    if let Some(secs) = profile.timeout_secs {
        println!("  Timeout: {}s", secs);
    }

    Ok(())
}

/// Create or update a profile. The first profile created becomes active.
pub fn set_profile(config: &mut Config, name: &str, host: &str, timeout_secs: Option<u64>) -> Result<()> {
    Url::parse(host).with_context(|| format!("Invalid host URL: {}", host))?;

    let first = config.profiles.is_empty();
    config.set_profile(
        name.to_string(),
        Profile {
            timeout_secs,
            ..Profile::new(host)
        },
    );
    if first {
        config.set_active(name.to_string());
    }
    Ok(())
}

pub fn run_profile_set(name: &str, host: &str, timeout_secs: Option<u64>) -> Result<()> {
    let mut config = config::load_config()?;
    set_profile(&mut config, name, host, timeout_secs)?;
    config::save_config(&config)?;

    println!("Saved profile '{}' ({})", name, host);
    if config.settings.active_profile == name {
        println!("'{}' is the active profile", name);
    }
    Ok(())
}

pub fn run_profile_use(name: &str) -> Result<()> {
    let mut config = config::load_config()?;

    if !config.profiles.contains_key(name) {
        anyhow::bail!(
            "Profile '{}' not found. Use 'ost profile list' to see available profiles.",
            name
        );
    }

    config.set_active(name.to_string());
    config::save_config(&config)?;

    println!("Set '{}' as active profile", name);
    Ok(())
}

pub fn run_profile_delete(name: &str, force: bool) -> Result<()> {
    let mut config = config::load_config()?;

    if !config.profiles.contains_key(name) {
        anyhow::bail!("Profile '{}' not found", name);
    }

    if name == config.settings.active_profile {
        println!("Warning: '{}' is currently the active profile", name);
    }

    if !force {
        print!("Are you sure you want to delete profile '{}'? (y/N): ", name);
        io::stdout().flush()?;
        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().eq_ignore_ascii_case("y") {
            println!("Deletion cancelled");
            return Ok(());
        }
    }

    config.remove_profile(name);
    config::save_config(&config)?;

    println!("Profile '{}' deleted", name);
    Ok(())
}
