//! Stage lifecycle coordinator

use std::time::{Duration, Instant};

use super::driver::FrameDriver;
use super::error::StageError;
use super::flush::{flush, flush_lifecycle, FlushReport};
use super::ordering::dependency_order;
use crate::context::{
    Container, FrameCallback, Handles, LifecycleCallback, LifecyclePools, PoolKind, SceneContext,
};
use crate::core::StageConfig;
use crate::producers::Producer;
use crate::scene::{BindingTarget, GuiControl, GuiPanel, HelperKind, NodeKind, SceneNode};

/// Where a stage is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePhase {
    /// Producers are being set up; nothing has run yet
    Composing,
    /// Host container attached, init flushed
    Mounted,
    /// Torn down; the stage is never reused
    Disposed,
}

/// Owns one [`SceneContext`] and drives its four pools.
///
/// ```text
/// new ──compose*──> mount ──(tick | resize)*──> unmount
///                     │                            │
///                 init flush                 dispose flush
/// ```
pub struct Stage {
    config: StageConfig,
    context: SceneContext,
    phase: StagePhase,
    driver: FrameDriver,
    resize_attached: bool,
    resize_flushes: u64,
}

impl Stage {
    /// Create a stage with an empty context
    pub fn new(config: StageConfig) -> Self {
        log::debug!("Creating stage (looping: {}, fault policy: {:?})", config.looping, config.fault_policy);
        Self {
            config,
            context: SceneContext::new(),
            phase: StagePhase::Composing,
            driver: FrameDriver::new(),
            resize_attached: false,
            resize_flushes: 0,
        }
    }

    /// Stage configuration
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Lifecycle phase
    pub fn phase(&self) -> StagePhase {
        self.phase
    }

    /// Shared context
    pub fn context(&self) -> &SceneContext {
        &self.context
    }

    /// Shared context, mutably
    pub fn context_mut(&mut self) -> &mut SceneContext {
        &mut self.context
    }

    /// Frame driver
    pub fn driver(&self) -> &FrameDriver {
        &self.driver
    }

    /// Number of resize flushes so far
    pub fn resize_flushes(&self) -> u64 {
        self.resize_flushes
    }

    /// Whether resize signals currently reach the resize pool
    pub fn resize_attached(&self) -> bool {
        self.resize_attached
    }

    /// Run a producer's setup against the context
    pub fn compose<P: Producer>(&mut self, producer: P) -> Result<&mut Self, StageError> {
        self.ensure_composing()?;
        let name = producer.name().to_string();
        let provides = producer.provides();
        log::debug!("Composing producer `{}`", name);
        if let Err(source) = self.context.require(&name, producer.requires()) {
            return Err(StageError::Setup { producer: name, source });
        }
        producer
            .setup(&mut self.context)
            .map_err(|source| StageError::Setup { producer: name.clone(), source })?;

        let unset = provides - self.context.present();
        if !unset.is_empty() {
            log::warn!("Producer `{}` finished setup without setting {:?}", name, unset);
        }
        Ok(self)
    }

    /// Attach the host container and activate the scene.
    ///
    /// Flushes the init pool in dependency order, builds the debug panel and
    /// helpers, starts the frame driver when looping and attaches the resize
    /// listener.
    pub fn mount(&mut self, container: Container) -> Result<FlushReport, StageError> {
        self.ensure_composing()?;
        let (width, height) = container.size();
        log::info!("Mounting stage into container {} ({}x{})", container.id(), width, height);

        self.context.set_container(container);
        self.phase = StagePhase::Mounted;

        let order = dependency_order(&self.context.pools.init, self.context.present());
        let report = flush(
            &mut self.context,
            PoolKind::Init,
            self.config.fault_policy,
            LifecyclePools::init_mut,
            order,
            |callback: &mut LifecycleCallback, ctx: &mut SceneContext| callback(ctx),
        )?;
        log::debug!("Init flush: {} ran, {} skipped, {} faults", report.ran, report.skipped, report.faults.len());

        self.install_gui()?;
        self.install_helpers();

        if self.config.looping {
            self.driver.start();
        }
        self.resize_attached = true;
        Ok(report)
    }

    /// One host animation tick.
    ///
    /// Delivers pending load events, then flushes the frame pool if the
    /// driver is running. Returns `Ok(None)` when no frame ran.
    pub fn tick(&mut self, delta: f32) -> Result<Option<FlushReport>, StageError> {
        self.poll_loads();

        let Some(tick) = self.driver.advance(delta) else {
            return Ok(None);
        };
        let fps = self.driver.stats().fps;
        if let Some(gui) = self.context.gui_mut() {
            gui.set_frame_rate(fps);
        }

        let order = self.context.pools.frame.ids().to_vec();
        flush(
            &mut self.context,
            PoolKind::Frame,
            self.config.fault_policy,
            LifecyclePools::frame_mut,
            order,
            |callback: &mut FrameCallback, ctx: &mut SceneContext| callback(ctx, &tick),
        )
        .map(Some)
    }

    /// Viewport size changed
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Option<FlushReport>, StageError> {
        if self.phase == StagePhase::Disposed {
            return Ok(None);
        }
        if let Some(container) = self.context.container_mut() {
            container.resize(width, height);
        }
        if !self.resize_attached {
            log::trace!("Resize to {}x{} ignored, listener not attached", width, height);
            return Ok(None);
        }

        self.resize_flushes += 1;
        log::debug!("Resize {} to {}x{}", self.resize_flushes, width, height);
        flush_lifecycle(&mut self.context, PoolKind::Resize, self.config.fault_policy).map(Some)
    }

    /// Tear the scene down.
    ///
    /// The first call after mount flushes the dispose pool, detaches the
    /// resize listener, stops the driver and cancels outstanding loads. Later
    /// calls do nothing. Unmounting a stage that never mounted skips the
    /// dispose flush.
    pub fn unmount(&mut self) -> Result<Option<FlushReport>, StageError> {
        match self.phase {
            StagePhase::Disposed => {
                log::debug!("Unmount ignored, stage already disposed");
                Ok(None)
            }
            StagePhase::Composing => {
                log::info!("Stage discarded before mount");
                self.phase = StagePhase::Disposed;
                self.driver.stop();
                Ok(None)
            }
            StagePhase::Mounted => {
                log::info!("Unmounting stage");
                self.phase = StagePhase::Disposed;
                let report = flush_lifecycle(&mut self.context, PoolKind::Dispose, self.config.fault_policy);
                self.resize_attached = false;
                self.driver.stop();
                let cancelled = self.cancel_loads();
                if cancelled > 0 {
                    log::debug!("Cancelled {} outstanding loads", cancelled);
                }
                report.map(Some)
            }
        }
    }

    /// Deliver load events that have already arrived. Returns the number delivered.
    pub fn poll_loads(&mut self) -> usize {
        let mut watches = self.context.loads.take();
        if watches.is_empty() {
            return 0;
        }
        let context = &mut self.context;
        let mut delivered = 0;
        watches.retain_mut(|watch| {
            while let Some(event) = watch.task.poll() {
                delivered += 1;
                (watch.handler)(context, event);
            }
            !watch.task.is_finished()
        });
        self.context.loads.restore(watches);
        delivered
    }

    /// Block until every watched load has completed or `timeout` passes.
    ///
    /// A timeout too large to represent as a deadline waits without limit.
    pub fn finish_loads(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now().checked_add(timeout);
        let mut delivered = self.poll_loads();

        while self.context.pending_loads() > 0 {
            let remaining = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        log::warn!("{} loads still pending after {:?}", self.context.pending_loads(), timeout);
                        break;
                    }
                    deadline - now
                }
                None => Duration::MAX,
            };
            let mut watches = self.context.loads.take();
            if let Some(watch) = watches.first_mut() {
                if let Some(event) = watch.task.wait(remaining) {
                    delivered += 1;
                    (watch.handler)(&mut self.context, event);
                }
            }
            watches.retain(|watch| !watch.task.is_finished());
            self.context.loads.restore(watches);
            delivered += self.poll_loads();
        }
        delivered
    }

    fn cancel_loads(&mut self) -> usize {
        let watches = self.context.loads.take();
        let count = watches.len();
        for mut watch in watches {
            if let Some(event) = watch.task.cancel() {
                (watch.handler)(&mut self.context, event);
            }
        }
        count
    }

    fn ensure_composing(&self) -> Result<(), StageError> {
        match self.phase {
            StagePhase::Composing => Ok(()),
            StagePhase::Mounted => Err(StageError::AlreadyMounted),
            StagePhase::Disposed => Err(StageError::Disposed),
        }
    }

    fn install_gui(&mut self) -> Result<(), StageError> {
        let Some(gui_config) = &self.config.gui else {
            return Ok(());
        };
        if self.context.present().contains(Handles::GUI) {
            log::debug!("Control panel already provided, skipping the stage panel");
            return Ok(());
        }

        let mut panel = GuiPanel::new(gui_config.title.clone(), gui_config.width);
        let scene_folder = panel.add_folder("Scene");
        scene_folder.closed = true;
        scene_folder
            .add_vector("position", BindingTarget::ScenePosition, |control| control.step(0.1))
            .add_vector("rotation", BindingTarget::SceneRotation, |control| control.step(0.1));
        if gui_config.stats {
            panel
                .add_folder("Stats")
                .add(GuiControl::new("fps", BindingTarget::FrameRate).listen());
        }

        self.context.set_gui(panel).map_err(|source| StageError::Setup {
            producer: "stage".to_string(),
            source,
        })
    }

    fn install_helpers(&mut self) {
        if self.config.grid_helper.is_none() && self.config.axes_helper.is_none() {
            return;
        }
        let Some(scene) = self.context.scene_mut() else {
            log::warn!("Helpers requested but no scene was provided");
            return;
        };
        if let Some(grid) = &self.config.grid_helper {
            scene.add(SceneNode::new(
                "grid_helper",
                NodeKind::Helper(HelperKind::Grid {
                    size: grid.size,
                    divisions: grid.divisions,
                    center_color: grid.center_color,
                    grid_color: grid.grid_color,
                    opacity: grid.opacity,
                }),
            ));
        }
        if let Some(axes) = &self.config.axes_helper {
            scene.add(SceneNode::new(
                "axes_helper",
                NodeKind::Helper(HelperKind::Axes { length: axes.length }),
            ));
        }
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        if self.phase == StagePhase::Mounted {
            if let Err(e) = self.unmount() {
                log::error!("Unmount during drop failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AxesHelperConfig, GridHelperConfig, GuiConfig};
    use crate::scene::Scene;

    #[test]
    fn test_mount_twice_is_rejected() {
        let mut stage = Stage::new(StageConfig::default());
        stage.mount(Container::new(1, 10, 10)).unwrap();
        assert!(matches!(stage.mount(Container::new(1, 10, 10)), Err(StageError::AlreadyMounted)));
        stage.unmount().unwrap();
        assert!(matches!(stage.mount(Container::new(1, 10, 10)), Err(StageError::Disposed)));
    }

    #[test]
    fn test_gui_and_helpers_installed_at_mount() {
        let config = StageConfig {
            gui: Some(GuiConfig { stats: true, ..GuiConfig::default() }),
            grid_helper: Some(GridHelperConfig {
                center_color: 0xff_00_00,
                grid_color: 0x00_ff_00,
                ..GridHelperConfig::default()
            }),
            axes_helper: Some(AxesHelperConfig::default()),
            ..StageConfig::default()
        };
        let mut stage = Stage::new(config);
        stage.context_mut().set_scene(Scene::new()).unwrap();
        stage.mount(Container::new(1, 10, 10)).unwrap();

        let gui = stage.context().gui().unwrap();
        assert_eq!(gui.title, "Control Panel");
        assert!(gui.folder("Scene").unwrap().closed);
        assert_eq!(gui.folder("Scene").unwrap().controls.len(), 6);
        assert!(gui.folder("Stats").is_some());
        let scene = stage.context().scene().unwrap();
        assert_eq!(scene.len(), 2);
        assert_eq!(
            scene.count_where(|node| matches!(
                node.kind,
                NodeKind::Helper(HelperKind::Grid { center_color: 0xff_00_00, grid_color: 0x00_ff_00, .. })
            )),
            1
        );
    }

    #[test]
    fn test_non_looping_stage_never_ticks() {
        let config = StageConfig { looping: false, ..StageConfig::default() };
        let mut stage = Stage::new(config);
        stage.mount(Container::new(1, 10, 10)).unwrap();
        assert!(stage.tick(0.016).unwrap().is_none());
        assert!(stage.resize(20, 20).unwrap().is_some());
    }

    #[test]
    fn test_compose_after_mount_is_rejected() {
        let mut stage = Stage::new(StageConfig::default());
        stage.mount(Container::new(1, 10, 10)).unwrap();
        let result = stage.compose(crate::producers::SceneProducer::default());
        assert!(matches!(result, Err(StageError::AlreadyMounted)));
    }
}
