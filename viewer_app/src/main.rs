//! Headless scene viewer
//!
//! Builds a stage from a manifest, mounts it into a virtual container and
//! drives it for a fixed number of ticks, resizing once halfway through.
//!
//! ```text
//! scene_viewer [manifest] [ticks]
//! ```

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use scene_rig::foundation::logging;
use scene_rig::prelude::*;

const DEFAULT_MANIFEST: &str = "scenes/demo.toml";
const DEFAULT_TICKS: u32 = 120;
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> Result<(), Box<dyn Error>> {
    logging::init_with_filter("info");

    let mut args = std::env::args().skip(1);
    let manifest_path = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_MANIFEST.to_string()));
    let ticks = match args.next() {
        Some(value) => value.parse::<u32>()?,
        None => DEFAULT_TICKS,
    };

    let asset_root = manifest_path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let loader: Arc<dyn AssetLoader> = Arc::new(FileModelLoader::new().with_root(asset_root));

    let mut stage = SceneManifest::load_and_build(&manifest_path, loader)?;
    let report = stage.mount(Container::new(1, 1280, 720))?;
    if !report.is_clean() {
        for fault in &report.faults {
            log::warn!("Init callback `{}` did not run cleanly: {}", fault.label, fault.error);
        }
    }

    let mut timer = Timer::new();
    for frame in 0..ticks {
        if frame == ticks / 2 {
            stage.resize(1920, 1080)?;
        }
        stage.tick(timer.update())?;
        thread::sleep(FRAME_INTERVAL);
    }
    stage.finish_loads(LOAD_TIMEOUT);

    let frames = stage.driver().frames();
    let fps = stage.driver().stats().fps;
    let painted = stage.context().renderer().map_or(0, |renderer| renderer.frames_rendered());
    let nodes = stage.context().scene().map_or(0, |scene| scene.len());
    stage.unmount()?;

    log::info!(
        "Ran {} frames at {:.1} fps, painted {} frames, {} resize flushes, {} scene nodes",
        frames,
        fps,
        painted,
        stage.resize_flushes(),
        nodes
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_models_are_shipped() {
        let scenes = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenes");
        let manifest = SceneManifest::load_from_file(scenes.join("demo.toml")).unwrap();
        let urls: Vec<String> = manifest
            .producers
            .iter()
            .filter_map(|entry| match entry {
                ProducerSpec::Model(props) => Some(props.url()),
                _ => None,
            })
            .collect();
        assert!(!urls.is_empty());
        for url in urls {
            assert!(scenes.join(&url).is_file(), "missing model {}", url);
        }
    }
}
