//! Infrastructure adapters. Implement outbound ports and drive the inbound one.
//!
//! Analysis service, capture devices, terminal UI. Map errors to DomainError.

pub mod analysis;
pub mod devices;
pub mod ui;
