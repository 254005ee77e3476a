//! Renderer producer

use serde::{Deserialize, Serialize};

use super::Producer;
use crate::context::{ContextError, Handles, Registration, SceneContext};
use crate::scene::{HeadlessRenderer, RenderBackend, RendererSettings, ToneMapping};

/// Renderer props
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererProps {
    /// Device pixel ratio
    pub pixel_ratio: Option<f32>,
    /// Tone mapping operator
    pub tone_mapping: ToneMapping,
    /// Exposure for the tone mapping operator
    pub tone_mapping_exposure: f32,
    /// Enable shadow maps
    pub shadows: bool,
    /// Clear colour as 0xRRGGBB
    pub clear_color: Option<u32>,
    /// Clear alpha, used with `clear_color`
    pub clear_alpha: f32,
}

impl Default for RendererProps {
    fn default() -> Self {
        Self {
            pixel_ratio: None,
            tone_mapping: ToneMapping::None,
            tone_mapping_exposure: 1.0,
            shadows: false,
            clear_color: None,
            clear_alpha: 1.0,
        }
    }
}

impl RendererProps {
    fn settings(&self) -> RendererSettings {
        RendererSettings {
            tone_mapping: self.tone_mapping,
            tone_mapping_exposure: self.tone_mapping_exposure,
            shadows: self.shadows,
        }
    }
}

/// Installs the renderer and repaints on every lifecycle event
pub struct RendererProducer {
    props: RendererProps,
    backend: Box<dyn RenderBackend>,
}

impl RendererProducer {
    /// Producer backed by a [`HeadlessRenderer`]
    pub fn new(props: RendererProps) -> Self {
        let backend = Box::new(HeadlessRenderer::new(props.settings()));
        Self { props, backend }
    }

    /// Producer backed by a host-supplied renderer
    pub fn with_backend(props: RendererProps, backend: Box<dyn RenderBackend>) -> Self {
        Self { props, backend }
    }
}

impl Default for RendererProducer {
    fn default() -> Self {
        Self::new(RendererProps::default())
    }
}

fn fit_to_container(ctx: &mut SceneContext) {
    let Some((width, height)) = ctx.container().map(|container| container.size()) else {
        return;
    };
    if let Some(renderer) = ctx.renderer_mut() {
        renderer.set_size(width, height);
    }
}

impl Producer for RendererProducer {
    fn name(&self) -> &str {
        "renderer"
    }

    fn provides(&self) -> Handles {
        Handles::RENDERER
    }

    fn setup(self, ctx: &mut SceneContext) -> Result<(), ContextError> {
        let Self { props, mut backend } = self;
        if let Some(ratio) = props.pixel_ratio {
            backend.set_pixel_ratio(ratio);
        }
        if let Some(color) = props.clear_color {
            backend.set_clear_color(color, props.clear_alpha);
        }
        ctx.set_renderer(backend)?;

        ctx.register_init(
            Registration::new("renderer.attach").requires(Handles::CONTAINER | Handles::RENDERER),
            |ctx| {
                fit_to_container(ctx);
                ctx.redraw_now();
                Ok(())
            },
        );
        ctx.register_frame("renderer.redraw", |ctx, _tick| {
            ctx.redraw_now();
            Ok(())
        });
        ctx.register_resize("renderer.resize", |ctx| {
            fit_to_container(ctx);
            ctx.redraw_now();
            Ok(())
        });
        ctx.register_dispose("renderer.dispose", |ctx| {
            if let Some(renderer) = ctx.renderer_mut() {
                renderer.dispose();
            }
            Ok(())
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Container, PoolKind};
    use crate::core::StageConfig;
    use crate::producers::{CameraProducer, SceneProducer};
    use crate::stage::Stage;

    #[test]
    fn test_registers_into_every_pool() {
        let mut ctx = SceneContext::default();
        RendererProducer::default().setup(&mut ctx).unwrap();
        assert!(ctx.renderer().is_some());
        for kind in [PoolKind::Init, PoolKind::Frame, PoolKind::Resize, PoolKind::Dispose] {
            assert_eq!(ctx.pools().len(kind), 1, "{kind} pool");
        }
    }

    #[test]
    fn test_fit_to_container() {
        let mut ctx = SceneContext::default();
        RendererProducer::default().setup(&mut ctx).unwrap();
        fit_to_container(&mut ctx);
        assert_eq!(ctx.renderer().unwrap().size(), (0, 0));

        ctx.set_container(Container::new(1, 640, 480));
        fit_to_container(&mut ctx);
        assert_eq!(ctx.renderer().unwrap().size(), (640, 480));
    }

    #[test]
    fn test_resize_refits_and_repaints() {
        let mut stage = Stage::new(StageConfig::default());
        stage
            .compose(SceneProducer::default())
            .unwrap()
            .compose(CameraProducer::default())
            .unwrap()
            .compose(RendererProducer::default())
            .unwrap();
        stage.mount(Container::new(1, 640, 480)).unwrap();
        assert_eq!(stage.context().renderer().unwrap().frames_rendered(), 1);

        stage.resize(1024, 768).unwrap();
        stage.resize(800, 600).unwrap();
        let renderer = stage.context().renderer().unwrap();
        assert_eq!(renderer.frames_rendered(), 3);
        assert_eq!(renderer.size(), (800, 600));
    }

    #[test]
    fn test_props_parse_tone_mapping() {
        let props: RendererProps = toml::from_str("tone_mapping = \"aces_filmic\"\nclear_color = 0x101010").unwrap();
        assert_eq!(props.tone_mapping, ToneMapping::AcesFilmic);
        assert_eq!(props.clear_color, Some(0x10_10_10));
    }
}
