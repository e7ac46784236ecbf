//! Webcam fortune reader
//!
//! The classifier is an opaque collaborator: a [`ModelLoader`] produces a
//! [`Model`], a [`FrameSource`] supplies frames, and [`FortuneMachine`] drives
//! the load/predict cycle. Nothing here touches the lottery board.

pub mod camera;
pub mod machine;
pub mod model;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

pub use camera::PpmCamera;
pub use machine::{Command, FortuneEvent, FortuneMachine, FortuneState};
pub use model::JsonModelLoader;

#[derive(Debug, Error)]
pub enum FortuneError {
    #[error("model load failed: {0}")]
    ModelLoad(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("bad frame: {0}")]
    Frame(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single RGB image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[u8; 3]>,
}

impl Frame {
    /// Average color over all pixels, `None` for an empty frame
    pub fn mean_color(&self) -> Option<[f32; 3]> {
        if self.pixels.is_empty() {
            return None;
        }
        let mut sum = [0u64; 3];
        for px in &self.pixels {
            for (acc, &c) in sum.iter_mut().zip(px.iter()) {
                *acc += c as u64;
            }
        }
        let n = self.pixels.len() as f32;
        Some(sum.map(|s| s as f32 / n))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
}

/// The most likely prediction, if any
pub fn top_prediction(predictions: &[Prediction]) -> Option<&Prediction> {
    predictions
        .iter()
        .max_by(|a, b| a.probability.total_cmp(&b.probability))
}

pub trait Model: Send + Sync {
    fn total_classes(&self) -> usize;
    fn predict(&self, frame: &Frame) -> Result<Vec<Prediction>, FortuneError>;
}

#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self, model_ref: &str) -> Result<Arc<dyn Model>, FortuneError>;
}

pub trait FrameSource: Send {
    fn grab(&mut self) -> Result<Frame, FortuneError>;
}
