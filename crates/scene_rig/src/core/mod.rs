//! # Core Module
//!
//! Stage-wide configuration shared by the coordinator and the viewer host.

pub mod config;

pub use config::{AxesHelperConfig, FaultPolicy, GridHelperConfig, GuiConfig, StageConfig};
pub use crate::config::{Config, ConfigError, ConfigFormat};
