use serde::Deserialize;

/// Optional settings; anything left `None` falls back to the CLI flag or
/// the built-in default. CLI flags always win over file values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UntransConfig {
    pub ignore_file: Option<String>,
    pub report_only: Option<bool>,
    pub languages: Option<Vec<LanguageCfg>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageCfg {
    pub name: String,
    pub code: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0}")]
    Other(String),
}

pub fn load_config() -> Result<UntransConfig, ConfigError> {
    // Search order: CWD/untrans.toml, $HOME/.config/untrans/untrans.toml
    let mut merged = UntransConfig::default();
    if let Ok(p) = std::env::current_dir() {
        let path = p.join("untrans.toml");
        if let Ok(s) = std::fs::read_to_string(&path) {
            if let Ok(cfg) = toml::from_str::<UntransConfig>(&s) {
                merged = merge(merged, cfg);
            }
        }
    }
    if let Some(base) = dirs::config_dir() {
        let path = base.join("untrans").join("untrans.toml");
        if let Ok(s) = std::fs::read_to_string(&path) {
            if let Ok(cfg) = toml::from_str::<UntransConfig>(&s) {
                merged = merge(merged, cfg);
            }
        }
    }
    Ok(merged)
}

fn merge(mut a: UntransConfig, b: UntransConfig) -> UntransConfig {
    if a.ignore_file.is_none() {
        a.ignore_file = b.ignore_file;
    }
    if a.report_only.is_none() {
        a.report_only = b.report_only;
    }
    if a.languages.is_none() {
        a.languages = b.languages;
    }
    a
}
