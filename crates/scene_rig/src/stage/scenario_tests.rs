//! End-to-end lifecycle scenarios driven through [`Stage`]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::{dependency_order, Stage, StageError, StagePhase};
use crate::assets::{AssetLoader, CancelToken, FileModelLoader, LoadError, ModelData};
use crate::context::{Container, ContextError, Handles, PoolKind, Registration, SceneContext};
use crate::core::StageConfig;
use crate::producers::{
    CameraProducer, ControlsProducer, LoadOutcome, ModelProducer, ModelProps, Producer, RendererProducer,
    SceneProducer,
};
use crate::scene::{Camera, HeadlessRenderer, NodeKind, Scene};
use approx::assert_relative_eq;

type Log = Rc<RefCell<Vec<String>>>;

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

fn stage() -> Stage {
    Stage::new(StageConfig::default())
}

#[test]
fn test_init_flushes_in_registration_order() {
    for names in [["a", "b", "c", "d"], ["d", "c", "b", "a"], ["c", "a", "d", "b"]] {
        let fired = log();
        let mut stage = stage();
        for name in names {
            let fired = Rc::clone(&fired);
            stage.context_mut().register_init(name, move |_ctx| {
                fired.borrow_mut().push(name.to_string());
                Ok(())
            });
        }

        let report = stage.mount(Container::new(1, 10, 10)).unwrap();
        assert_eq!(report.ran, 4);
        assert_eq!(entries(&fired), names);
    }
}

#[test]
fn test_frames_only_between_mount_and_dispose() {
    let fired = log();
    let mut stage = stage();

    let init = Rc::clone(&fired);
    stage.context_mut().register_init("init", move |_ctx| {
        init.borrow_mut().push("init".into());
        Ok(())
    });
    let frame = Rc::clone(&fired);
    stage.context_mut().register_frame("frame", move |_ctx, tick| {
        frame.borrow_mut().push(format!("frame {}", tick.frame));
        Ok(())
    });
    let dispose = Rc::clone(&fired);
    stage.context_mut().register_dispose("dispose", move |_ctx| {
        dispose.borrow_mut().push("dispose".into());
        Ok(())
    });

    assert!(stage.tick(0.016).unwrap().is_none());
    assert!(entries(&fired).is_empty());

    stage.mount(Container::new(1, 10, 10)).unwrap();
    for _ in 0..3 {
        stage.tick(0.016).unwrap();
    }
    stage.unmount().unwrap();
    assert!(stage.tick(0.016).unwrap().is_none());

    assert_eq!(entries(&fired), ["init", "frame 0", "frame 1", "frame 2", "dispose"]);
    assert_eq!(stage.driver().frames(), 3);
}

#[test]
fn test_each_resize_signal_flushes_once_in_order() {
    let fired = log();
    let mut stage = stage();
    for name in ["first", "second"] {
        let fired = Rc::clone(&fired);
        stage.context_mut().register_resize(name, move |ctx| {
            let (width, height) = ctx.container().map(Container::size).unwrap_or_default();
            fired.borrow_mut().push(format!("{name} {width}x{height}"));
            Ok(())
        });
    }

    assert!(stage.resize(50, 50).unwrap().is_none());
    stage.mount(Container::new(1, 100, 100)).unwrap();
    stage.resize(200, 100).unwrap();
    stage.resize(300, 150).unwrap();

    assert_eq!(stage.resize_flushes(), 2);
    assert_eq!(
        entries(&fired),
        ["first 200x100", "second 200x100", "first 300x150", "second 300x150"]
    );

    stage.unmount().unwrap();
    assert!(!stage.resize_attached());
    assert!(stage.resize(400, 400).unwrap().is_none());
    assert_eq!(stage.resize_flushes(), 2);
}

#[test]
fn test_dispose_runs_once_across_repeated_unmounts() {
    let count = Rc::new(RefCell::new(0));
    {
        let mut stage = stage();
        let seen = Rc::clone(&count);
        stage.context_mut().register_dispose("count", move |_ctx| {
            *seen.borrow_mut() += 1;
            Ok(())
        });
        stage.mount(Container::new(1, 10, 10)).unwrap();

        assert!(stage.unmount().unwrap().is_some());
        assert!(stage.unmount().unwrap().is_none());
        assert!(stage.unmount().unwrap().is_none());
        assert_eq!(stage.phase(), StagePhase::Disposed);
    }
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn test_dropping_a_mounted_stage_disposes_it() {
    let count = Rc::new(RefCell::new(0));
    {
        let mut stage = stage();
        let seen = Rc::clone(&count);
        stage.context_mut().register_dispose("count", move |_ctx| {
            *seen.borrow_mut() += 1;
            Ok(())
        });
        stage.mount(Container::new(1, 10, 10)).unwrap();
    }
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn test_unmount_before_mount_skips_dispose() {
    let count = Rc::new(RefCell::new(0));
    let mut stage = stage();
    let seen = Rc::clone(&count);
    stage.context_mut().register_dispose("count", move |_ctx| {
        *seen.borrow_mut() += 1;
        Ok(())
    });

    assert!(stage.unmount().unwrap().is_none());
    assert_eq!(*count.borrow(), 0);
    assert!(matches!(stage.mount(Container::new(1, 10, 10)), Err(StageError::Disposed)));
}

#[test]
fn test_redraw_paints_only_once_all_handles_are_set() {
    let mut ctx = SceneContext::default();
    assert!(!ctx.redraw_now());

    ctx.set_renderer(Box::new(HeadlessRenderer::default())).unwrap();
    assert!(!ctx.redraw_now());
    ctx.set_scene(Scene::new()).unwrap();
    assert!(!ctx.redraw_now());
    assert_eq!(ctx.renderer().unwrap().frames_rendered(), 0);

    ctx.set_camera(Camera::perspective(50.0, 1.0, 0.1, 100.0)).unwrap();
    assert!(ctx.redraw_now());
    assert_eq!(ctx.renderer().unwrap().frames_rendered(), 1);
}

#[test]
fn test_camera_renderer_controls_mount_in_order() {
    let mut stage = stage();
    stage
        .compose(SceneProducer::default())
        .unwrap()
        .compose(CameraProducer::default())
        .unwrap()
        .compose(RendererProducer::default())
        .unwrap()
        .compose(ControlsProducer::default())
        .unwrap();

    let pool = &stage.context().pools.init;
    let order: Vec<&str> = dependency_order(pool, stage.context().present())
        .into_iter()
        .filter_map(|id| pool.registration(id).map(Registration::label))
        .collect();
    assert_eq!(order, ["camera.aspect", "renderer.attach", "controls.create"]);

    let report = stage.mount(Container::new(1, 800, 400)).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.ran, 3);
    assert!(stage.context().present().contains(Handles::CONTROLS));
    assert_eq!(stage.context().renderer().unwrap().size(), (800, 400));
    assert_eq!(stage.context().renderer().unwrap().frames_rendered(), 1);

    stage.tick(0.016).unwrap();
    assert_eq!(stage.context().renderer().unwrap().frames_rendered(), 2);

    stage.unmount().unwrap();
    assert!(stage.context().renderer().unwrap().is_disposed());
}

#[test]
fn test_controls_composed_first_still_find_camera_and_renderer() {
    let mut stage = stage();
    stage
        .compose(ControlsProducer::default())
        .unwrap()
        .compose(CameraProducer::default())
        .unwrap()
        .compose(RendererProducer::default())
        .unwrap();

    let report = stage.mount(Container::new(1, 100, 100)).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.skipped, 0);
    assert!(stage.context().controls().is_some());
}

#[test]
fn test_zero_width_container_is_survivable() {
    let mut stage = stage();
    stage
        .compose(SceneProducer::default())
        .unwrap()
        .compose(CameraProducer::default())
        .unwrap()
        .compose(RendererProducer::default())
        .unwrap();

    let report = stage.mount(Container::new(1, 0, 600)).unwrap();
    assert!(report.is_clean());
    assert_relative_eq!(stage.context().camera().unwrap().aspect(), 1.0);

    stage.resize(1200, 600).unwrap();
    assert_relative_eq!(stage.context().camera().unwrap().aspect(), 2.0);

    let report = stage.resize(0, 600).unwrap().unwrap();
    assert!(report.is_clean());
    assert_relative_eq!(stage.context().camera().unwrap().aspect(), 2.0);
    assert_eq!(stage.context().renderer().unwrap().size(), (0, 600));
    stage.tick(0.016).unwrap();
}

struct NeedsScene;

impl Producer for NeedsScene {
    fn name(&self) -> &str {
        "needs_scene"
    }

    fn requires(&self) -> Handles {
        Handles::SCENE
    }

    fn setup(self, _ctx: &mut SceneContext) -> Result<(), ContextError> {
        Ok(())
    }
}

#[test]
fn test_compose_checks_declared_requirements() {
    let mut stage = stage();
    let error = stage.compose(NeedsScene).err().unwrap();
    assert!(matches!(
        &error,
        StageError::Setup { producer, source: ContextError::MissingDependency { missing, .. } }
            if producer == "needs_scene" && *missing == Handles::SCENE
    ));

    stage.compose(SceneProducer::default()).unwrap();
    assert!(stage.compose(NeedsScene).is_ok());
}

// --- model loading ---------------------------------------------------------

#[derive(Default)]
struct Observed {
    progress: Vec<u8>,
    outcomes: Vec<LoadOutcome>,
}

fn observed_model(props: ModelProps, loader: Arc<dyn AssetLoader>) -> (ModelProducer, Rc<RefCell<Observed>>) {
    let observed = Rc::new(RefCell::new(Observed::default()));
    let progress = Rc::clone(&observed);
    let complete = Rc::clone(&observed);
    let producer = ModelProducer::new(props, loader)
        .on_progress(move |_url, percent| progress.borrow_mut().progress.push(percent))
        .on_complete(move |outcome| complete.borrow_mut().outcomes.push(outcome));
    (producer, observed)
}

fn model_stage(producer: ModelProducer) -> Stage {
    let mut stage = stage();
    stage
        .compose(SceneProducer::default())
        .unwrap()
        .compose(CameraProducer::default())
        .unwrap()
        .compose(RendererProducer::default())
        .unwrap()
        .compose(producer)
        .unwrap();
    stage
}

#[test]
fn test_large_model_reports_progress_then_loads_once() {
    let dir = std::env::temp_dir();
    let file_name = format!("scene_rig_model_{}.bin", std::process::id());
    std::fs::write(dir.join(&file_name), vec![1u8; 10 * 1024 * 1024]).unwrap();

    let props = ModelProps {
        file_name: file_name.clone(),
        ..ModelProps::default()
    };
    let (producer, observed) = observed_model(props, Arc::new(FileModelLoader::new().with_root(dir.clone())));
    let mut stage = model_stage(producer);
    stage.mount(Container::new(1, 100, 100)).unwrap();
    stage.finish_loads(Duration::from_secs(30));
    std::fs::remove_file(dir.join(&file_name)).unwrap();

    let observed = observed.borrow();
    assert!(!observed.progress.is_empty());
    assert!(observed.progress.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(observed.progress.last(), Some(&100));
    assert_eq!(observed.outcomes.len(), 1);
    let LoadOutcome::Loaded(id) = observed.outcomes[0] else {
        panic!("expected a loaded model, got {:?}", observed.outcomes[0]);
    };

    let scene = stage.context().scene().unwrap();
    assert!(matches!(scene.get(id).unwrap().kind, NodeKind::Model { byte_len, .. } if byte_len == 10 * 1024 * 1024));
    assert_eq!(stage.context().pending_loads(), 0);

    stage.unmount().unwrap();
    assert!(!stage.context().scene().unwrap().contains(id));
    assert_eq!(observed.outcomes.len(), 1);
}

#[test]
fn test_unreachable_model_fails_once_without_progress() {
    let props = ModelProps {
        path: "does/not/exist".into(),
        file_name: "model.glb".into(),
        ..ModelProps::default()
    };
    let (producer, observed) = observed_model(props, Arc::new(FileModelLoader::new()));
    let mut stage = model_stage(producer);
    stage.mount(Container::new(1, 100, 100)).unwrap();
    stage.finish_loads(Duration::MAX);

    let observed = observed.borrow();
    assert!(observed.progress.is_empty());
    assert_eq!(observed.outcomes.len(), 1);
    assert!(matches!(observed.outcomes[0], LoadOutcome::Failed(LoadError::NotFound(_))));
    assert!(stage.context().scene().unwrap().is_empty());
}

struct NeverFinishes;

impl AssetLoader for NeverFinishes {
    fn load(&self, _url: &str, cancel: &CancelToken, progress: &mut dyn FnMut(u8)) -> Result<ModelData, LoadError> {
        progress(5);
        while !cancel.is_cancelled() {
            thread::sleep(Duration::from_millis(1));
        }
        Err(LoadError::Cancelled)
    }
}

#[test]
fn test_unmount_cancels_pending_model_load() {
    let props = ModelProps {
        file_name: "slow.glb".into(),
        ..ModelProps::default()
    };
    let (producer, observed) = observed_model(props, Arc::new(NeverFinishes));
    let mut stage = model_stage(producer);
    stage.mount(Container::new(1, 100, 100)).unwrap();
    assert_eq!(stage.context().pending_loads(), 1);

    stage.unmount().unwrap();
    assert_eq!(stage.context().pending_loads(), 0);
    assert_eq!(stage.poll_loads(), 0);

    let observed = observed.borrow();
    assert_eq!(observed.outcomes.len(), 1);
    assert!(matches!(observed.outcomes[0], LoadOutcome::Failed(LoadError::Cancelled)));
}

#[test]
fn test_model_waits_for_renderer_and_scene() {
    let props = ModelProps {
        file_name: "orphan.glb".into(),
        ..ModelProps::default()
    };
    let (producer, observed) = observed_model(props, Arc::new(FileModelLoader::new()));
    let mut stage = stage();
    stage.compose(producer).unwrap();

    let report = stage.mount(Container::new(1, 10, 10)).unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(stage.context().pending_loads(), 0);
    assert!(observed.borrow().outcomes.is_empty());
    assert_eq!(stage.context().pools().len(PoolKind::Dispose), 1);

    stage.unmount().unwrap();
    stage.unmount().unwrap();
    let observed = observed.borrow();
    assert_eq!(observed.outcomes.len(), 1);
    assert!(matches!(observed.outcomes[0], LoadOutcome::Failed(LoadError::NotStarted)));
}
