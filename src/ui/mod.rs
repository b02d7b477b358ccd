// src/ui/mod.rs
pub mod charts;
pub mod dashboard;
pub mod upload;
