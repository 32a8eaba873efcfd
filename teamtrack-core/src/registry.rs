use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Represents a tracked workspace in the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    /// Path to the workspace data (JSON directory or SQLite file)
    pub path: String,
    /// Description of the workspace
    pub description: String,
}

/// Registry of all workspaces
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Registry {
    pub workspaces: HashMap<String, Workspace>,
    /// Optional default workspace name
    pub default_workspace: Option<String>,
}

impl Registry {
    /// Loads the registry from the provided path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read registry file: {:?}", path.as_ref()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse registry file: {:?}", path.as_ref()))
    }

    /// Gets a workspace by name
    pub fn get_workspace(&self, name: &str) -> Option<&Workspace> {
        self.workspaces.get(name)
    }

    /// Lists all workspace names
    pub fn list_workspaces(&self) -> Vec<&str> {
        self.workspaces.keys().map(|k| k.as_str()).collect()
    }

    /// Registers a new workspace or updates an existing one
    pub fn register_workspace(&mut self, name: String, path: String, description: String) {
        let workspace = Workspace { path, description };

        self.workspaces.insert(name, workspace);
    }

    /// Sets a workspace as the default
    pub fn set_default_workspace(&mut self, name: &str) -> Result<()> {
        if !self.workspaces.contains_key(name) {
            anyhow::bail!("Workspace '{}' not found in registry", name);
        }

        self.default_workspace = Some(name.to_string());

        Ok(())
    }

    /// Gets the default workspace if set
    pub fn get_default_workspace(&self) -> Option<(&str, &Workspace)> {
        if let Some(default_name) = &self.default_workspace {
            if let Some(workspace) = self.workspaces.get(default_name) {
                return Some((default_name, workspace));
            }
        }
        None
    }

    /// Save the registry to the specified path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(&self)?;

        // Ensure parent directories exist
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write registry to {:?}", path.as_ref()))?;

        Ok(())
    }
}

/// Gets the path to the registry file
pub fn get_registry_path() -> Result<PathBuf> {
    // Check if TEAMTRACK_REGISTRY_PATH environment variable is set
    if let Ok(path) = std::env::var("TEAMTRACK_REGISTRY_PATH") {
        return Ok(PathBuf::from(path));
    }

    // Default to ~/.teamtrack.config
    let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

    Ok(home_dir.join(".teamtrack.config"))
}

/// Default data directory used when no workspace is selected
pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home_dir.join(".teamtrack").join("data"))
}

/// Resolves the data path for a run: an explicitly named workspace, else the
/// registry default, else the home-directory fallback
pub fn resolve_data_path(workspace: Option<&str>) -> Result<PathBuf> {
    let registry_path = get_registry_path()?;
    let registry = if registry_path.exists() {
        Registry::load(&registry_path)?
    } else {
        Registry::default()
    };

    if let Some(name) = workspace {
        let ws = registry
            .get_workspace(name)
            .with_context(|| format!("Workspace '{}' not found in registry", name))?;
        return Ok(PathBuf::from(&ws.path));
    }

    if let Some((_, ws)) = registry.get_default_workspace() {
        return Ok(PathBuf::from(&ws.path));
    }

    default_data_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_register_and_default_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.yaml");

        let mut registry = Registry::default();
        registry.register_workspace(
            "acme".into(),
            "/tmp/acme-data".into(),
            "Acme tracker".into(),
        );
        registry.set_default_workspace("acme").unwrap();
        registry.save(&path).unwrap();

        let loaded = Registry::load(&path).unwrap();
        let (name, ws) = loaded.get_default_workspace().unwrap();
        assert_eq!(name, "acme");
        assert_eq!(ws.path, "/tmp/acme-data");
    }

    #[test]
    fn test_set_default_unknown_workspace_fails() {
        let mut registry = Registry::default();
        assert!(registry.set_default_workspace("missing").is_err());
    }
}
