//! Application configuration. Analysis endpoint, device sources, timings.

use serde::Deserialize;

pub const DEFAULT_ANALYSIS_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Grant-to-live delay so the preview is rendering before it is shown.
pub const DEFAULT_CAMERA_SETTLE_MS: u64 = 500;
pub const DEFAULT_JPEG_QUALITY: u8 = 85;
pub const DEFAULT_CAMERA_FRAME_PATH: &str = "./camera.jpg";
pub const DEFAULT_OUTPUT_DIR: &str = ".";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Analysis service root URL. Read from EMOLENS_ANALYSIS_URL.
    #[serde(default)]
    pub analysis_url: Option<String>,

    /// Whole-request timeout in seconds. Read from EMOLENS_REQUEST_TIMEOUT_SECS.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Use the mock analysis adapter instead of HTTP. Read from EMOLENS_USE_MOCK_ANALYSIS.
    #[serde(default)]
    pub use_mock_analysis: Option<bool>,

    // ─────────────────────────────────────────────────────────────────────────
    // Capture devices
    // ─────────────────────────────────────────────────────────────────────────
    /// Camera settle delay in ms. Read from EMOLENS_CAMERA_SETTLE_MS.
    #[serde(default)]
    pub camera_settle_ms: Option<u64>,

    /// JPEG quality 1-100 for captured photos. Read from EMOLENS_JPEG_QUALITY.
    #[serde(default)]
    pub jpeg_quality: Option<u8>,

    /// Frame file the camera reads from. Read from EMOLENS_CAMERA_FRAME_PATH.
    #[serde(default)]
    pub camera_frame_path: Option<String>,

    /// cpal input device name; unset or "default" uses the host default.
    /// Read from EMOLENS_MICROPHONE_DEVICE.
    #[serde(default)]
    pub microphone_device: Option<String>,

    /// Directory the result chart is written to. Read from EMOLENS_OUTPUT_DIR.
    #[serde(default)]
    pub output_dir: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("EMOLENS").try_parsing(true));
        if let Ok(path) = std::env::var("EMOLENS_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn analysis_url_or_default(&self) -> String {
        self.analysis_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ANALYSIS_URL.to_string())
    }

    pub fn request_timeout_secs_or_default(&self) -> u64 {
        self.request_timeout_secs
            .filter(|&s| s > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn camera_settle_ms_or_default(&self) -> u64 {
        self.camera_settle_ms.unwrap_or(DEFAULT_CAMERA_SETTLE_MS)
    }

    /// Clamped to 1..=100.
    pub fn jpeg_quality_or_default(&self) -> u8 {
        self.jpeg_quality
            .unwrap_or(DEFAULT_JPEG_QUALITY)
            .clamp(1, 100)
    }

    pub fn camera_frame_path_or_default(&self) -> String {
        self.camera_frame_path
            .clone()
            .unwrap_or_else(|| DEFAULT_CAMERA_FRAME_PATH.to_string())
    }

    pub fn output_dir_or_default(&self) -> String {
        self.output_dir
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string())
    }

    pub fn microphone_device(&self) -> Option<String> {
        self.microphone_device
            .clone()
            .filter(|d| !d.trim().is_empty() && d != "default")
    }

    pub fn is_mock_analysis(&self) -> bool {
        self.use_mock_analysis.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.analysis_url_or_default(), "http://localhost:8000");
        assert_eq!(cfg.request_timeout_secs_or_default(), 60);
        assert_eq!(cfg.camera_settle_ms_or_default(), 500);
        assert_eq!(cfg.jpeg_quality_or_default(), 85);
        assert!(cfg.microphone_device().is_none());
        assert_eq!(cfg.output_dir_or_default(), ".");
        assert!(!cfg.is_mock_analysis());
    }

    #[test]
    fn test_overrides_are_sanitised() {
        let cfg = AppConfig {
            analysis_url: Some("  ".into()),
            request_timeout_secs: Some(0),
            jpeg_quality: Some(0),
            microphone_device: Some("default".into()),
            ..AppConfig::default()
        };
        assert_eq!(cfg.analysis_url_or_default(), DEFAULT_ANALYSIS_URL);
        assert_eq!(cfg.request_timeout_secs_or_default(), 60);
        assert_eq!(cfg.jpeg_quality_or_default(), 1);
        assert!(cfg.microphone_device().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emolens.toml");
        std::fs::write(
            &path,
            "analysis_url = \"http://10.0.0.5:9000\"\ncamera_settle_ms = 0\n",
        )
        .unwrap();
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from(path.as_path()))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.analysis_url_or_default(), "http://10.0.0.5:9000");
        assert_eq!(cfg.camera_settle_ms_or_default(), 0);
    }
}
