//! Analysis adapters. Implement AnalysisPort.
//!
//! HTTP multipart adapter for the real service and a mock adapter for offline runs.

pub mod http_adapter;
pub mod mock_adapter;

pub use http_adapter::HttpAnalysisAdapter;
pub use mock_adapter::MockAnalysisAdapter;
