use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Name the bundled model is registered under.
    pub model_name: String,
    /// Model manifest path, relative to `asset_dir`.
    pub model_asset_path: PathBuf,
    pub asset_dir: PathBuf,
    pub confidence_threshold: f32,
    pub results_to_show: usize,
    /// Camera captures are written here and never cleaned up.
    pub cache_dir: PathBuf,
    pub logger_timezone: chrono::FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_name: "barrel_201981112318".to_string(),
            model_asset_path: PathBuf::from("automl/manifest.json"),
            asset_dir: PathBuf::from("assets"),
            confidence_threshold: 0.6,
            results_to_show: 3,
            cache_dir: std::env::temp_dir().join("barrel-recognizer"),
            logger_timezone: japan_standard_time(),
        }
    }
}

impl Config {
    pub fn model_path(&self) -> PathBuf {
        self.asset_dir.join(&self.model_asset_path)
    }
}

fn japan_standard_time() -> chrono::FixedOffset {
    chrono::FixedOffset::east_opt(9 * 3600).unwrap()
}
