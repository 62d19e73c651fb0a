use std::collections::HashMap;
use std::env;
use std::fs;
use std::str::FromStr;

use crate::models::item::Owner;

/// Flat KEY=VALUE config, loaded from an optional env-style file. Process
/// environment variables win over file entries so deployments can override
/// without editing the file.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            match parse_line(line) {
                Ok(Some((key, value))) => {
                    values.insert(key, value);
                }
                Ok(None) => {}
                Err(()) => return Err(format!("Invalid config line {}: {}", idx + 1, line)),
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.values.get(key).cloned())
    }

    /// Which household member the CLI acts for. PLANNER_USER, defaulting to
    /// binyamin (matching the original app's initial state).
    pub fn viewer(&self) -> Owner {
        self.get("PLANNER_USER")
            .and_then(|value| Owner::from_str(&value).ok())
            .unwrap_or(Owner::Binyamin)
    }
}

fn parse_line(line: &str) -> Result<Option<(String, String)>, ()> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let Some((key, value)) = trimmed.split_once('=') else {
        return Err(());
    };
    let mut value = value.trim().to_string();
    if (value.starts_with('"') && value.ends_with('"') && value.len() >= 2)
        || (value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2)
    {
        value = value[1..value.len() - 1].to_string();
    }
    Ok(Some((key.trim().to_string(), value)))
}
