//! Configuration loading from `config.toml` in the data directory.

use std::path::Path;

use haven_types::config::HavenConfig;

/// Load `config.toml` from the data directory.
///
/// A missing file is normal and yields defaults. A file that cannot be
/// read or parsed is logged and also yields defaults, so a typo never
/// prevents the app from starting.
pub async fn load_config(data_dir: &Path) -> HavenConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return HavenConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return HavenConfig::default();
        }
    };

    match toml::from_str::<HavenConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            HavenConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.chat.model, "Qwen/Qwen2.5-32B-Instruct");
        assert_eq!(config.server.port, 8501);
    }

    #[tokio::test]
    async fn valid_toml_is_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[analytics]
model = "gemini-1.5-pro"
temperature = 0.1

[server]
host = "0.0.0.0"
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.analytics.model, "gemini-1.5-pro");
        assert!((config.analytics.temperature - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.chat.history_window, 40);
    }

    #[tokio::test]
    async fn invalid_toml_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "[chat\nmodel = ")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.chat.max_tokens, 3100);
    }
}
