use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use manatan_config::Config;
use serde::{Deserialize, Serialize};

/// `MANATAN_HOME`, or `./profiles`
pub fn profiles_dir() -> PathBuf {
    env::var_os("MANATAN_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("profiles"))
}

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

/// Create the profile folder and a main profile from defaults if missing
pub fn init_user_config(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating profile directory {}", dir.display()))?;

    let main_profile = dir.join("main.json");
    if !main_profile.exists() {
        let profile = Profile {
            name: "main".into(),
            value: Config::default(),
        };
        fs::write(&main_profile, serde_json::to_string_pretty(&profile)?)?;
        tracing::info!("Created main profile at {}", main_profile.display());
    }

    Ok(())
}

fn read_profile(path: &Path) -> anyhow::Result<Config> {
    let data = fs::read_to_string(path)?;
    let profile: Profile = serde_json::from_str(&data)
        .with_context(|| format!("parsing profile {}", path.display()))?;
    Ok(profile.value)
}

/// Load a profile by name, falling back to main, then to defaults.
/// Environment overrides apply on top of whatever was loaded.
pub fn load_user_profile(dir: &Path, name: &str) -> anyhow::Result<Config> {
    let profile_file = dir.join(format!("{name}.json"));
    let main_file = dir.join("main.json");

    let mut config = if profile_file.exists() {
        read_profile(&profile_file)?
    } else if main_file.exists() {
        tracing::warn!("Profile {name} not found, falling back to main profile");
        read_profile(&main_file)?
    } else {
        tracing::warn!("No profiles in {}, using defaults", dir.display());
        Config::default()
    };

    config.apply_env();
    config.validate()?;
    Ok(config)
}

/// Add a new profile cloned from main
pub fn add_profile_from_main(dir: &Path, new_name: &str) -> anyhow::Result<PathBuf> {
    let value = load_user_profile(dir, "main")?;
    let profile = Profile {
        name: new_name.into(),
        value,
    };
    let file = dir.join(format!("{new_name}.json"));
    fs::write(&file, serde_json::to_string_pretty(&profile)?)?;
    tracing::info!("Created new profile: {new_name}");
    Ok(file)
}
