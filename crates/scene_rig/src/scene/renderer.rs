//! Renderer seam
//!
//! [`RenderBackend`] is the boundary to the real graphics engine. The
//! coordinator only ever sizes it, asks it to paint the scene through the
//! camera, and releases it on dispose. [`HeadlessRenderer`] implements the
//! trait without a GPU and records what it was asked to do.

use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::graph::Scene;
use crate::foundation::math::Mat4;

/// Tone mapping operator applied by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    /// No tone mapping
    #[default]
    None,
    /// Linear
    Linear,
    /// Reinhard
    Reinhard,
    /// Cineon
    Cineon,
    /// ACES filmic
    AcesFilmic,
    /// AgX
    AgX,
    /// Khronos neutral
    Neutral,
}

/// Static renderer settings
#[derive(Debug, Clone, PartialEq)]
pub struct RendererSettings {
    /// Tone mapping operator
    pub tone_mapping: ToneMapping,
    /// Exposure used by the tone mapping operator
    pub tone_mapping_exposure: f32,
    /// Whether shadow maps are enabled
    pub shadows: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            tone_mapping: ToneMapping::None,
            tone_mapping_exposure: 1.0,
            shadows: false,
        }
    }
}

/// Rendering backend trait
pub trait RenderBackend {
    /// Resize the drawing surface
    fn set_size(&mut self, width: u32, height: u32);

    /// Current drawing surface size
    fn size(&self) -> (u32, u32);

    /// Device pixel ratio
    fn set_pixel_ratio(&mut self, ratio: f32);

    /// Clear colour (0xRRGGBB) and alpha
    fn set_clear_color(&mut self, color: u32, alpha: f32);

    /// Paint one frame of `scene` as seen from `camera`
    fn render(&mut self, scene: &Scene, camera: &Camera);

    /// Release every resource the backend holds. Later calls to `render` do nothing.
    fn dispose(&mut self);

    /// Whether `dispose` has run
    fn is_disposed(&self) -> bool;

    /// Number of frames painted so far
    fn frames_rendered(&self) -> u64;
}

/// What the last painted frame looked like
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Nodes in the scene at paint time
    pub node_count: usize,
    /// Camera matrix used
    pub view_projection: Mat4,
    /// Surface size at paint time
    pub size: (u32, u32),
}

/// Backend that paints nothing and counts frames
#[derive(Debug)]
pub struct HeadlessRenderer {
    settings: RendererSettings,
    size: (u32, u32),
    pixel_ratio: f32,
    clear_color: (u32, f32),
    frames: u64,
    last_frame: Option<FrameRecord>,
    disposed: bool,
}

impl HeadlessRenderer {
    /// Create a renderer with the given settings and a zero-sized surface
    pub fn new(settings: RendererSettings) -> Self {
        Self {
            settings,
            size: (0, 0),
            pixel_ratio: 1.0,
            clear_color: (0x00_00_00, 1.0),
            frames: 0,
            last_frame: None,
            disposed: false,
        }
    }

    /// Static settings
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Device pixel ratio
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Clear colour and alpha
    pub fn clear_color(&self) -> (u32, f32) {
        self.clear_color
    }

    /// Record of the most recent paint
    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.last_frame.as_ref()
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new(RendererSettings::default())
    }
}

impl RenderBackend for HeadlessRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        log::trace!("HeadlessRenderer: surface resized to {}x{}", width, height);
        self.size = (width, height);
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    fn set_clear_color(&mut self, color: u32, alpha: f32) {
        self.clear_color = (color, alpha.clamp(0.0, 1.0));
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) {
        if self.disposed {
            log::warn!("HeadlessRenderer: render called after dispose, ignoring");
            return;
        }
        self.frames += 1;
        self.last_frame = Some(FrameRecord {
            node_count: scene.len(),
            view_projection: camera.view_projection_matrix(),
            size: self.size,
        });
    }

    fn dispose(&mut self) {
        if !self.disposed {
            log::debug!("HeadlessRenderer: disposed after {} frames", self.frames);
        }
        self.disposed = true;
        self.last_frame = None;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_counts_frames_until_disposed() {
        let mut renderer = HeadlessRenderer::default();
        let scene = Scene::new();
        let camera = Camera::perspective(50.0, 1.0, 0.1, 100.0);

        renderer.set_size(640, 480);
        renderer.render(&scene, &camera);
        renderer.render(&scene, &camera);
        assert_eq!(renderer.frames_rendered(), 2);
        assert_eq!(renderer.last_frame().unwrap().size, (640, 480));

        renderer.dispose();
        renderer.render(&scene, &camera);
        assert_eq!(renderer.frames_rendered(), 2);
        assert!(renderer.is_disposed());
    }
}
