//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use emolens::adapters::analysis::{HttpAnalysisAdapter, MockAnalysisAdapter};
use emolens::adapters::devices::{CpalMicrophone, FrameFileCamera};
use emolens::adapters::ui::tui::TuiInputPort;
use emolens::ports::{AnalysisPort, CameraPort, InputPort, MicrophonePort};
use emolens::shared::config::AppConfig;
use emolens::usecases::{
    AnalysisSession, AudioCaptureController, SubmissionService, VideoCaptureController,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    emolens::adapters::ui::init_ui();

    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "config load failed, using defaults");
            AppConfig::default()
        }
    };

    // --- Analysis service ---
    let analysis: Arc<dyn AnalysisPort> = if cfg.is_mock_analysis() {
        warn!("EMOLENS_USE_MOCK_ANALYSIS set, using mock analysis adapter");
        Arc::new(MockAnalysisAdapter::new())
    } else {
        let url = cfg.analysis_url_or_default();
        let timeout_secs = cfg.request_timeout_secs_or_default();
        info!(url = %url, timeout_secs, "analysis service configured");
        Arc::new(
            HttpAnalysisAdapter::new(url, Duration::from_secs(timeout_secs))
                .map_err(|e| anyhow::anyhow!("{}", e))?,
        )
    };
    let submission = Arc::new(SubmissionService::new(analysis));
    if let Err(e) = submission.check_backend().await {
        warn!(error = %e, "analysis service not reachable yet; analyze will fail until it is up");
    }

    // --- Devices ---
    let frame_path = cfg.camera_frame_path_or_default();
    info!(path = %frame_path, "camera frame source");
    let camera: Arc<dyn CameraPort> = Arc::new(FrameFileCamera::new(frame_path));
    let microphone: Arc<dyn MicrophonePort> = Arc::new(CpalMicrophone::new(cfg.microphone_device()));

    let video = VideoCaptureController::new(
        camera,
        Duration::from_millis(cfg.camera_settle_ms_or_default()),
        cfg.jpeg_quality_or_default(),
    );
    let audio = AudioCaptureController::new(microphone);
    let session = AnalysisSession::new(video, audio, Arc::clone(&submission));

    // --- Run (menu -> capture -> analyze) ---
    let output_dir = cfg.output_dir_or_default();
    info!(path = %output_dir, "charts are written here");
    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(session, output_dir));
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!("session ended");
    Ok(())
}
