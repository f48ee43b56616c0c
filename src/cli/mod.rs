//! CLI layer: terminal output for host programs

pub mod output;
