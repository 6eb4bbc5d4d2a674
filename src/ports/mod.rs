//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by UI/adapter into the application
//! - Outbound: Called by application into devices and the analysis service

pub mod inbound;
pub mod outbound;

pub use inbound::InputPort;
pub use outbound::{
    AnalysisPort, AnalysisRequest, AudioStream, CameraPort, MicrophonePort, RecordedAudio,
    VideoStream,
};
