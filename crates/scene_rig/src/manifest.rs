//! Scene manifests
//!
//! A manifest describes a whole stage in one TOML or RON file: the stage
//! settings plus an ordered list of producers. Producers are composed in
//! the order they appear.
//!
//! ```toml
//! [stage]
//! looping = true
//!
//! [[producer]]
//! type = "scene"
//! background = 0x202020
//!
//! [[producer]]
//! type = "camera"
//! position = [0.0, 5.0, 10.0]
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::AssetLoader;
use crate::config::Config;
use crate::core::StageConfig;
use crate::producers::{
    CameraProducer, CameraProps, ControlsProducer, ControlsProps, LightProducer, LightProps, ModelProducer,
    ModelProps, RendererProducer, RendererProps, SceneProducer, SceneProps,
};
use crate::stage::{Stage, StageError};

/// One producer entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProducerSpec {
    /// Scene root
    Scene(SceneProps),
    /// Camera
    Camera(CameraProps),
    /// Renderer
    Renderer(RendererProps),
    /// Light
    Light(LightProps),
    /// Orbit controls
    Controls(ControlsProps),
    /// Model
    Model(ModelProps),
}

/// Stage settings plus producers in composition order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneManifest {
    /// Stage settings
    pub stage: StageConfig,
    /// Producers in composition order
    #[serde(rename = "producer")]
    pub producers: Vec<ProducerSpec>,
}

impl Config for SceneManifest {}

impl SceneManifest {
    /// Read a manifest file and compose its stage
    pub fn load_and_build(path: impl AsRef<Path>, loader: Arc<dyn AssetLoader>) -> Result<Stage, StageError> {
        let path = path.as_ref();
        log::info!("Loading scene manifest {}", path.display());
        Self::load_from_file(path)?.build(loader)
    }

    /// Compose a stage from the manifest. Models load through `loader`.
    pub fn build(&self, loader: Arc<dyn AssetLoader>) -> Result<Stage, StageError> {
        let mut stage = Stage::new(self.stage.clone());
        for entry in &self.producers {
            match entry {
                ProducerSpec::Scene(props) => stage.compose(SceneProducer::new(props.clone()))?,
                ProducerSpec::Camera(props) => stage.compose(CameraProducer::new(props.clone()))?,
                ProducerSpec::Renderer(props) => stage.compose(RendererProducer::new(props.clone()))?,
                ProducerSpec::Light(props) => stage.compose(LightProducer::new(props.clone()))?,
                ProducerSpec::Controls(props) => stage.compose(ControlsProducer::new(props.clone()))?,
                ProducerSpec::Model(props) => {
                    let url = props.url();
                    let producer = ModelProducer::new(props.clone(), Arc::clone(&loader))
                        .on_progress(|url, percent| log::info!("Loading {}: {}%", url, percent))
                        .on_complete(move |outcome| log::info!("Model {} finished: {:?}", url, outcome));
                    stage.compose(producer)?
                }
            };
        }
        log::info!("Composed {} producers", self.producers.len());
        Ok(stage)
    }
}
