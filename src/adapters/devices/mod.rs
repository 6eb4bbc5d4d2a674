//! Capture device adapters. Implement CameraPort and MicrophonePort.
//!
//! Dropping a stream handle releases the device.

pub mod cpal_microphone;
pub mod frame_file_camera;
pub mod upload;

pub use cpal_microphone::CpalMicrophone;
pub use frame_file_camera::FrameFileCamera;
pub use upload::{load_clip, load_photo};
