//! Prototype color model
//!
//! A model file is JSON of the form
//! `{ "labels": ["great luck", ...], "prototypes": [[r, g, b], ...] }`.
//! Prediction is a softmax over the negative distance between the frame's
//! mean color and each class prototype.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::{FortuneError, Frame, Model, ModelLoader, Prediction};

/// Distance scale for the softmax; smaller is more decisive
const TEMPERATURE: f32 = 32.0;

#[derive(Debug, Clone, Deserialize)]
pub struct ModelFile {
    pub labels: Vec<String>,
    pub prototypes: Vec<[f32; 3]>,
}

#[derive(Debug, Clone)]
pub struct PrototypeModel {
    labels: Vec<String>,
    prototypes: Vec<[f32; 3]>,
}

impl PrototypeModel {
    pub fn from_file(file: ModelFile) -> Result<Self, FortuneError> {
        if file.labels.is_empty() {
            return Err(FortuneError::InvalidModel("model has no labels".into()));
        }
        if file.labels.len() != file.prototypes.len() {
            return Err(FortuneError::InvalidModel(format!(
                "{} labels but {} prototypes",
                file.labels.len(),
                file.prototypes.len()
            )));
        }
        Ok(Self {
            labels: file.labels,
            prototypes: file.prototypes,
        })
    }

    pub fn parse(json: &str) -> Result<Self, FortuneError> {
        Self::from_file(serde_json::from_str(json)?)
    }
}

impl Model for PrototypeModel {
    fn total_classes(&self) -> usize {
        self.labels.len()
    }

    fn predict(&self, frame: &Frame) -> Result<Vec<Prediction>, FortuneError> {
        let mean = frame
            .mean_color()
            .ok_or_else(|| FortuneError::Frame("frame has no pixels".into()))?;

        let scores: Vec<f32> = self
            .prototypes
            .iter()
            .map(|p| {
                let dist = p
                    .iter()
                    .zip(mean.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f32>()
                    .sqrt();
                -dist / TEMPERATURE
            })
            .collect();

        // Shift by the max score so exp() cannot overflow
        let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let weights: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f32 = weights.iter().sum();

        Ok(self
            .labels
            .iter()
            .zip(weights)
            .map(|(label, w)| Prediction {
                label: label.clone(),
                probability: w / total,
            })
            .collect())
    }
}

/// Loads [`PrototypeModel`]s from JSON files on disk
#[derive(Debug, Clone, Default)]
pub struct JsonModelLoader;

#[async_trait]
impl ModelLoader for JsonModelLoader {
    async fn load(&self, model_ref: &str) -> Result<Arc<dyn Model>, FortuneError> {
        let content = tokio::fs::read_to_string(model_ref)
            .await
            .map_err(|e| FortuneError::ModelLoad(format!("{}: {}", model_ref, e)))?;
        let model = PrototypeModel::parse(&content)?;
        tracing::info!(
            "Loaded fortune model {} with {} classes",
            model_ref,
            model.total_classes()
        );
        Ok(Arc::new(model))
    }
}
