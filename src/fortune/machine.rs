use std::fmt;
use std::sync::Arc;

use super::{top_prediction, FortuneError, Frame, Model, Prediction};

pub enum FortuneState {
    Idle,
    Loading {
        generation: u64,
    },
    Running {
        model: Arc<dyn Model>,
        predictions: Vec<Prediction>,
        frames: u64,
    },
    Failed {
        reason: String,
    },
}

impl fmt::Debug for FortuneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FortuneState::Idle => write!(f, "Idle"),
            FortuneState::Loading { generation } => write!(f, "Loading({})", generation),
            FortuneState::Running { frames, .. } => write!(f, "Running({} frames)", frames),
            FortuneState::Failed { reason } => write!(f, "Failed({})", reason),
        }
    }
}

pub enum FortuneEvent {
    Start,
    LoadSucceeded {
        generation: u64,
        model: Arc<dyn Model>,
    },
    LoadFailed {
        generation: u64,
        error: FortuneError,
    },
    FrameReady(Frame),
    CameraFailed(FortuneError),
    Cancel,
}

/// Work the caller must perform after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Load the model and report back with this generation
    Load { generation: u64 },
}

/// Drives the classifier through Idle → Loading → Running, with Failed as a
/// retryable dead end. Load results carry the generation they were started
/// under; anything from an older generation is dropped.
pub struct FortuneMachine {
    state: FortuneState,
    generation: u64,
}

impl Default for FortuneMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl FortuneMachine {
    pub fn new() -> Self {
        Self {
            state: FortuneState::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> &FortuneState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, FortuneState::Running { .. })
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            FortuneState::Loading { .. } | FortuneState::Running { .. }
        )
    }

    pub fn predictions(&self) -> &[Prediction] {
        match &self.state {
            FortuneState::Running { predictions, .. } => predictions,
            _ => &[],
        }
    }

    pub fn handle(&mut self, event: FortuneEvent) -> Option<Command> {
        match event {
            FortuneEvent::Start => match self.state {
                FortuneState::Idle | FortuneState::Failed { .. } => {
                    self.generation += 1;
                    self.transition(FortuneState::Loading {
                        generation: self.generation,
                    });
                    return Some(Command::Load {
                        generation: self.generation,
                    });
                }
                _ => tracing::debug!("Ignoring start while {:?}", self.state),
            },

            FortuneEvent::LoadSucceeded { generation, model } => {
                if self.is_current_load(generation) {
                    self.transition(FortuneState::Running {
                        model,
                        predictions: Vec::new(),
                        frames: 0,
                    });
                } else {
                    tracing::debug!("Discarding stale model load (generation {})", generation);
                }
            }

            FortuneEvent::LoadFailed { generation, error } => {
                if self.is_current_load(generation) {
                    self.fail(error);
                } else {
                    tracing::debug!("Discarding stale load failure (generation {})", generation);
                }
            }

            FortuneEvent::FrameReady(frame) => {
                if let FortuneState::Running {
                    model,
                    predictions,
                    frames,
                } = &mut self.state
                {
                    tracing::trace!("Classifying {}x{} frame", frame.width, frame.height);
                    match model.predict(&frame) {
                        Ok(p) => {
                            *predictions = p;
                            *frames += 1;
                        }
                        Err(e) => self.fail(e),
                    }
                }
            }

            FortuneEvent::CameraFailed(error) => self.fail(error),

            FortuneEvent::Cancel => self.transition(FortuneState::Idle),
        }
        None
    }

    /// User-visible one-liner for the current state
    pub fn status_line(&self) -> String {
        match &self.state {
            FortuneState::Idle => "Press f to read your fortune".to_string(),
            FortuneState::Loading { .. } => "Loading fortune model...".to_string(),
            FortuneState::Running { model, .. } => match top_prediction(self.predictions()) {
                Some(top) => format!("{} ({:.0}%)", top.label, top.probability * 100.0),
                None => format!("Watching camera ({} classes)...", model.total_classes()),
            },
            FortuneState::Failed { reason } => {
                format!("Fortune failed: {} (press f to retry)", reason)
            }
        }
    }

    fn is_current_load(&self, generation: u64) -> bool {
        matches!(self.state, FortuneState::Loading { generation: g } if g == generation)
    }

    fn fail(&mut self, error: FortuneError) {
        tracing::warn!("Fortune failed: {}", error);
        self.transition(FortuneState::Failed {
            reason: error.to_string(),
        });
    }

    fn transition(&mut self, next: FortuneState) {
        tracing::debug!("Fortune {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
