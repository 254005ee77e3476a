//! # Stage Configuration
//!
//! Settings owned by the [`Stage`](crate::stage::Stage) itself rather than by
//! any single producer: whether the frame loop runs, whether the debug panel
//! and helpers are created at mount, and how callback faults are handled.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// What a flush does when one callback fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Record the fault, log it and keep flushing the remaining callbacks
    #[default]
    Isolate,
    /// Stop the flush at the first fault and return it to the caller
    Abort,
}

/// Grid helper added to the scene at mount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridHelperConfig {
    /// Side length of the grid
    pub size: f32,
    /// Number of divisions along each side
    pub divisions: u32,
    /// Colour of the centre lines
    pub center_color: u32,
    /// Colour of the remaining grid lines
    pub grid_color: u32,
    /// Material opacity; `None` keeps the grid opaque
    pub opacity: Option<f32>,
}

impl Default for GridHelperConfig {
    fn default() -> Self {
        Self {
            size: 10.0,
            divisions: 10,
            center_color: 0x44_44_44,
            grid_color: 0x88_88_88,
            opacity: None,
        }
    }
}

/// Axes helper added to the scene at mount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesHelperConfig {
    /// Length of each axis line
    pub length: f32,
}

impl Default for AxesHelperConfig {
    fn default() -> Self {
        Self { length: 10.0 }
    }
}

/// Debug control panel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiConfig {
    /// Panel title
    pub title: String,
    /// Panel width in pixels
    pub width: u32,
    /// Add a frame-rate readout folder
    pub stats: bool,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            title: "Control Panel".to_string(),
            width: 300,
            stats: false,
        }
    }
}

/// Stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Start the frame driver at mount
    pub looping: bool,
    /// Create the debug control panel at mount
    pub gui: Option<GuiConfig>,
    /// Grid helper, if any
    pub grid_helper: Option<GridHelperConfig>,
    /// Axes helper, if any
    pub axes_helper: Option<AxesHelperConfig>,
    /// Callback fault handling for every flush
    pub fault_policy: FaultPolicy,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            looping: true,
            gui: None,
            grid_helper: None,
            axes_helper: None,
            fault_policy: FaultPolicy::Isolate,
        }
    }
}

impl Config for StageConfig {}
