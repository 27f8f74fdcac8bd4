use anyhow::{Context, Result};
use ski_game::SkiConfig;
use std::{fs, path::Path};

/// Load tuning from an optional JSON file, then apply the slope length
/// override. Validation happens when a session is built.
pub fn load_config(path: Option<&Path>, slope_length: Option<usize>) -> Result<SkiConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            SkiConfig::from_json(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => SkiConfig::default(),
    };
    if let Some(length) = slope_length {
        config.slope.length = length;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn load_config_reads_file_and_applies_override() {
        let path = std::env::temp_dir().join(format!(
            "ski-config-{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::write(&path, r#"{ "slope": { "length": 33 }, "player": { "max_speed": 2 } }"#)
            .expect("write config");

        let cfg = load_config(Some(&path), None).unwrap();
        assert_eq!(cfg.slope.length, 33);
        assert_eq!(cfg.player.max_speed, 2);

        let cfg = load_config(Some(&path), Some(12)).unwrap();
        assert_eq!(cfg.slope.length, 12);

        assert!(load_config(None, Some(0)).is_err());
        assert!(load_config(Some(Path::new("/nonexistent/ski.json")), None).is_err());
    }
}
