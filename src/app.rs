use crossterm::event::{KeyCode, KeyEvent};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::fortune::{
    Command, FortuneEvent, FortuneMachine, FrameSource, JsonModelLoader, ModelLoader, PpmCamera,
};
use crate::lotto::render::{Board, Renderer};
use crate::lotto::sampler::Sampler;
use crate::lotto::PickedNumbers;
use crate::theme::{self, Theme, ThemeMode};

/// How many past draws the history panel keeps
pub const HISTORY_LEN: usize = 8;

/// Status messages clear after this long
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub popup: Popup,

    // Lottery board
    pub board: Board,
    renderer: Renderer,
    sampler: Sampler,
    pub history: VecDeque<PickedNumbers>,
    pub draw_count: u64,
    pub ticket: Option<PickedNumbers>,

    // Theme (toggled in memory only)
    pub theme_mode: ThemeMode,
    pub theme: Theme,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    // Fortune reader
    pub fortune: FortuneMachine,
    loader: Arc<dyn ModelLoader>,
    model_path: Option<PathBuf>,
    frames_dir: Option<PathBuf>,
    camera: Option<Box<dyn FrameSource>>,
    frame_interval: Duration,
    last_frame: Instant,
    fortune_tx: mpsc::UnboundedSender<FortuneEvent>,
    fortune_rx: mpsc::UnboundedReceiver<FortuneEvent>,
}

impl App {
    pub fn new(config: &AppConfig, sampler: Sampler, theme_mode: ThemeMode) -> Self {
        Self::with_loader(config, sampler, theme_mode, Arc::new(JsonModelLoader))
    }

    pub fn with_loader(
        config: &AppConfig,
        sampler: Sampler,
        theme_mode: ThemeMode,
        loader: Arc<dyn ModelLoader>,
    ) -> Self {
        let (fortune_tx, fortune_rx) = mpsc::unbounded_channel();
        let renderer = Renderer::new(theme::ball_palette(&config.palette), config.reveal_step());

        let mut app = Self {
            popup: Popup::None,

            board: Board::default(),
            renderer,
            sampler,
            history: VecDeque::with_capacity(HISTORY_LEN),
            draw_count: 0,
            ticket: None,

            theme_mode,
            theme: Theme::for_mode(theme_mode),

            status_message: None,
            status_message_time: None,

            fortune: FortuneMachine::new(),
            loader,
            model_path: config.model_path.clone(),
            frames_dir: config.frames_dir.clone(),
            camera: None,
            frame_interval: config.frame_interval(),
            last_frame: Instant::now(),
            fortune_tx,
            fortune_rx,
        };

        // Board starts out empty
        app.reset();
        app
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup == Popup::Help {
            if matches!(
                key.code,
                KeyCode::Esc
                    | KeyCode::Char('?')
                    | KeyCode::Char('h')
                    | KeyCode::Enter
                    | KeyCode::Char('q')
            ) {
                self.popup = Popup::None;
            }
            return;
        }

        match key.code {
            KeyCode::Char('g') | KeyCode::Char(' ') | KeyCode::Enter => self.generate(),
            KeyCode::Char('r') => self.reset(),

            // Start/stop the fortune reader (also retries after a failure)
            KeyCode::Char('f') => {
                if self.fortune.is_active() {
                    self.cancel_fortune();
                } else {
                    self.start_fortune();
                }
            }
            KeyCode::Esc => {
                if self.fortune.is_active() {
                    self.cancel_fortune();
                }
            }

            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,
            _ => {}
        }
    }

    /// Draw a fresh set of numbers onto the board
    pub fn generate(&mut self) {
        let picked = self.sampler.pick();
        self.renderer.render(&mut self.board, &picked);

        self.history.push_front(picked);
        self.history.truncate(HISTORY_LEN);
        self.draw_count += 1;

        tracing::info!("Draw #{}: {}", self.draw_count, picked);
    }

    /// Put the board back to six unknown slots
    pub fn reset(&mut self) {
        self.renderer.reset(&mut self.board);
    }

    fn toggle_theme(&mut self) {
        self.theme_mode = self.theme_mode.toggled();
        self.theme = Theme::for_mode(self.theme_mode);
        self.set_status(format!("Theme: {}", self.theme_mode.label()));
    }

    fn start_fortune(&mut self) {
        let Some(model_path) = self.model_path.clone() else {
            self.set_status("No fortune model configured (set model_path or use --model)");
            return;
        };
        let Some(frames_dir) = self.frames_dir.clone() else {
            self.set_status("No camera configured (set frames_dir or use --frames)");
            return;
        };

        match PpmCamera::open(&frames_dir) {
            Ok(camera) => {
                tracing::info!("Fortune camera has {} frames", camera.frame_count());
                self.camera = Some(Box::new(camera));
            }
            Err(e) => {
                self.camera = None;
                self.fortune.handle(FortuneEvent::CameraFailed(e));
                return;
            }
        }

        if let Some(Command::Load { generation }) = self.fortune.handle(FortuneEvent::Start) {
            let loader = Arc::clone(&self.loader);
            let tx = self.fortune_tx.clone();
            let model_ref = model_path.to_string_lossy().into_owned();

            tokio::spawn(async move {
                let event = match loader.load(&model_ref).await {
                    Ok(model) => FortuneEvent::LoadSucceeded { generation, model },
                    Err(error) => FortuneEvent::LoadFailed { generation, error },
                };
                // Receiver only goes away when the app exits
                let _ = tx.send(event);
            });
        }
    }

    fn cancel_fortune(&mut self) {
        self.fortune.handle(FortuneEvent::Cancel);
        self.camera = None;
        self.set_status("Fortune reader stopped");
    }

    /// Periodic work: apply finished model loads, feed camera frames,
    /// expire the status message.
    pub fn tick(&mut self) {
        while let Ok(event) = self.fortune_rx.try_recv() {
            self.fortune.handle(event);
        }

        if self.fortune.is_running() && self.last_frame.elapsed() >= self.frame_interval {
            self.last_frame = Instant::now();
            if let Some(camera) = self.camera.as_mut() {
                let event = match camera.grab() {
                    Ok(frame) => FortuneEvent::FrameReady(frame),
                    Err(e) => FortuneEvent::CameraFailed(e),
                };
                self.fortune.handle(event);
            }
        }

        if let Some(time) = self.status_message_time {
            if time.elapsed() >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fortune::FortuneState;
    use crate::lotto::render::{SlotKind, SLOT_COUNT};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(config: AppConfig) -> App {
        App::new(&config, Sampler::from_seed(42), ThemeMode::Dark)
    }

    fn write_fixtures(dir: &std::path::Path) -> AppConfig {
        let model = dir.join("model.json");
        std::fs::write(
            &model,
            r#"{ "labels": ["fire", "water"], "prototypes": [[255, 0, 0], [0, 0, 255]] }"#,
        )
        .unwrap();

        let frames = dir.join("frames");
        std::fs::create_dir(&frames).unwrap();
        let mut ppm = b"P6\n1 1\n255\n".to_vec();
        ppm.extend_from_slice(&[250, 5, 5]);
        std::fs::write(frames.join("0001.ppm"), ppm).unwrap();

        AppConfig {
            model_path: Some(model),
            frames_dir: Some(frames),
            frame_interval_ms: 1,
            ..AppConfig::default()
        }
    }

    async fn tick_until(app: &mut App, done: impl Fn(&App) -> bool) {
        for _ in 0..100 {
            app.tick();
            if done(app) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached, fortune is {:?}", app.fortune.state());
    }

    #[tokio::test]
    async fn test_starts_with_placeholders() {
        let app = app_with(AppConfig::default());
        assert_eq!(app.board.slots().len(), SLOT_COUNT);
        assert!(app.board.slots().iter().all(|s| s.kind == SlotKind::Placeholder));
        assert_eq!(app.draw_count, 0);
    }

    #[tokio::test]
    async fn test_generate_then_reset() {
        let mut app = app_with(AppConfig::default());

        app.handle_key(key(KeyCode::Char('g')));
        assert_eq!(app.draw_count, 1);
        let picked = app.history[0];
        let texts: Vec<String> = app.board.slots().iter().map(|s| s.text.clone()).collect();
        let expected: Vec<String> = picked.iter().map(|n| n.to_string()).collect();
        assert_eq!(texts, expected);

        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.board.slots().iter().all(|s| s.kind == SlotKind::Placeholder));
        assert_eq!(app.history.len(), 1);
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let mut app = app_with(AppConfig::default());
        for _ in 0..(HISTORY_LEN + 5) {
            app.generate();
        }
        assert_eq!(app.history.len(), HISTORY_LEN);
        assert_eq!(app.draw_count, (HISTORY_LEN + 5) as u64);
    }

    #[tokio::test]
    async fn test_help_popup_swallows_keys() {
        let mut app = app_with(AppConfig::default());
        app.handle_key(key(KeyCode::Char('?')));
        assert_eq!(app.popup, Popup::Help);

        app.handle_key(key(KeyCode::Char('g')));
        assert_eq!(app.draw_count, 0);

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.popup, Popup::None);
    }

    #[tokio::test]
    async fn test_fortune_without_model_reports_status() {
        let mut app = app_with(AppConfig::default());
        app.handle_key(key(KeyCode::Char('f')));
        assert!(matches!(app.fortune.state(), FortuneState::Idle));
        assert!(app.status_message.as_deref().unwrap().contains("No fortune model"));
    }

    #[tokio::test]
    async fn test_missing_camera_fails_without_touching_board() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_fixtures(dir.path());
        config.frames_dir = Some(dir.path().join("nowhere"));
        let mut app = app_with(config);
        app.generate();
        let before = app.board.slots().to_vec();

        app.handle_key(key(KeyCode::Char('f')));

        assert!(matches!(app.fortune.state(), FortuneState::Failed { .. }));
        assert!(app.fortune.status_line().contains("press f to retry"));
        assert_eq!(app.board.slots(), before.as_slice());
        assert_eq!(app.draw_count, 1);
    }

    #[tokio::test]
    async fn test_fortune_runs_and_predicts() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(write_fixtures(dir.path()));

        app.handle_key(key(KeyCode::Char('f')));
        assert!(matches!(app.fortune.state(), FortuneState::Loading { .. }));

        tick_until(&mut app, |a| !a.fortune.predictions().is_empty()).await;
        assert!(app.fortune.status_line().starts_with("fire"));

        app.handle_key(key(KeyCode::Esc));
        assert!(matches!(app.fortune.state(), FortuneState::Idle));
    }

    #[tokio::test]
    async fn test_corrupt_frame_fails_instead_of_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_fixtures(dir.path());
        let frame_path = config.frames_dir.clone().unwrap().join("0001.ppm");
        std::fs::write(&frame_path, "P6 9999999999 9999999999 255\n").unwrap();
        let mut app = app_with(config);

        app.handle_key(key(KeyCode::Char('f')));
        tick_until(&mut app, |a| {
            matches!(a.fortune.state(), FortuneState::Failed { .. })
        })
        .await;
        assert!(app.fortune.status_line().contains("image dimensions too large"));
        assert!(app.fortune.status_line().contains("press f to retry"));
        assert!(app.board.slots().iter().all(|s| s.kind == SlotKind::Placeholder));
    }

    #[tokio::test]
    async fn test_bad_model_fails_and_can_retry() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_fixtures(dir.path());
        let model_path = config.model_path.clone().unwrap();
        std::fs::write(&model_path, "not json").unwrap();
        let mut app = app_with(config);

        app.handle_key(key(KeyCode::Char('f')));
        tick_until(&mut app, |a| matches!(a.fortune.state(), FortuneState::Failed { .. })).await;

        std::fs::write(
            &model_path,
            r#"{ "labels": ["fire"], "prototypes": [[255, 0, 0]] }"#,
        )
        .unwrap();
        app.handle_key(key(KeyCode::Char('f')));
        tick_until(&mut app, |a| a.fortune.is_running()).await;
    }

    #[tokio::test]
    async fn test_theme_toggle() {
        let mut app = app_with(AppConfig::default());
        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.theme_mode, ThemeMode::Light);
        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.theme_mode, ThemeMode::Dark);
    }
}
