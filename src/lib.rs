//! emolens: capture text, a face photo and a voice clip, submit them for
//! multimodal emotion analysis, render the scores. Hexagonal architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
