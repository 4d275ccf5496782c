use crate::domain::river::{RiverCatalog, RiverProfile};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub server: ServerSettings,
    pub data: DataSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub debug: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSettings {
    pub directory: PathBuf,
    pub raw_pattern: String,
    pub cleaned_pattern: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RiversConfig {
    #[serde(default)]
    pub rivers: Vec<RiverProfile>,
}

pub fn load_server_config() -> anyhow::Result<ServerConfig> {
    load_server_config_from("config/server")
}

pub fn load_server_config_from(name: &str) -> anyhow::Result<ServerConfig> {
    let settings = config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8050)?
        .set_default("server.debug", true)?
        .set_default("data.directory", ".")?
        .set_default("data.raw_pattern", "${river}_Raw.csv")?
        .set_default("data.cleaned_pattern", "${river}_Cleaned.csv")?
        .add_source(config::File::with_name(name).required(false))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// River schemas from `config/rivers`, or the built-in catalog when the
/// file is absent or declares no rivers.
pub fn load_river_catalog() -> anyhow::Result<RiverCatalog> {
    load_river_catalog_from("config/rivers")
}

pub fn load_river_catalog_from(name: &str) -> anyhow::Result<RiverCatalog> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(name).required(false))
        .build()?;

    let rivers: RiversConfig = settings.try_deserialize()?;
    if rivers.rivers.is_empty() {
        tracing::debug!("No rivers configured in {}, using built-in catalog", name);
        return Ok(RiverCatalog::builtin());
    }
    Ok(RiverCatalog::new(rivers.rivers)?)
}

/// Replace template variables in a file name pattern
pub fn prepare_path(pattern: &str, vars: &HashMap<String, String>) -> String {
    let mut result = pattern.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_prepare_path() {
        let mut vars = HashMap::new();
        vars.insert("river".to_string(), "Bilut".to_string());

        assert_eq!(prepare_path("${river}_Raw.csv", &vars), "Bilut_Raw.csv");
        assert_eq!(prepare_path("data/${river}/cleaned.csv", &vars), "data/Bilut/cleaned.csv");
        assert_eq!(prepare_path("static.csv", &vars), "static.csv");
    }

    #[test]
    fn test_server_defaults_without_file() {
        let dir = tempdir().unwrap();
        let name = dir.path().join("server");
        let config = load_server_config_from(name.to_str().unwrap()).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8050);
        assert!(config.server.debug);
        assert_eq!(config.data.directory, PathBuf::from("."));
        assert_eq!(config.data.raw_pattern, "${river}_Raw.csv");
    }

    #[test]
    fn test_server_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("server.toml"),
            "[server]\nport = 9000\ndebug = false\n\n[data]\ndirectory = \"/srv/rivers\"\n",
        )
        .unwrap();
        let name = dir.path().join("server");
        let config = load_server_config_from(name.to_str().unwrap()).unwrap();

        assert_eq!(config.server.port, 9000);
        assert!(!config.server.debug);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.data.directory, PathBuf::from("/srv/rivers"));
        assert_eq!(config.data.cleaned_pattern, "${river}_Cleaned.csv");
    }

    #[test]
    fn test_river_catalog_from_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("rivers.toml"),
            r#"
[[rivers]]
id = "Pahang"
raw = ["Sample_Time", "PH_Sensor", "DO_Sensor"]
cleaned = ["Timestamp", "DO_Sensor"]
"#,
        )
        .unwrap();
        let name = dir.path().join("rivers");
        let catalog = load_river_catalog_from(name.to_str().unwrap()).unwrap();

        assert_eq!(catalog.rivers().len(), 1);
        let pahang = catalog.get("Pahang").unwrap();
        assert_eq!(pahang.raw[0], "Sample_Time");
        assert_eq!(pahang.parameters(crate::domain::river::DatasetKind::Cleaned), vec!["DO_Sensor"]);
    }

    #[test]
    fn test_river_catalog_rejects_invalid_schema() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("rivers.toml"),
            "[[rivers]]\nid = \"Broken\"\nraw = [\"PH_Sensor\"]\ncleaned = [\"Timestamp\"]\n",
        )
        .unwrap();
        let name = dir.path().join("rivers");
        assert!(load_river_catalog_from(name.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_river_catalog_falls_back_to_builtin() {
        let dir = tempdir().unwrap();
        let name = dir.path().join("rivers");
        let catalog = load_river_catalog_from(name.to_str().unwrap()).unwrap();
        assert_eq!(catalog.rivers().len(), 3);
    }
}
