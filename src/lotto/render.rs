use ratatui::style::Color;
use std::time::{Duration, Instant};

use super::{PickedNumbers, PICK_COUNT};
use crate::theme;

/// Number of positions on the board
pub const SLOT_COUNT: usize = PICK_COUNT;

/// Text shown in a slot that has no number yet
pub const PLACEHOLDER: &str = "?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Ball,
    Placeholder,
}

/// One positional container on the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySlot {
    pub text: String,
    pub color: Option<Color>,
    pub reveal_delay: Duration,
    pub kind: SlotKind,
}

/// Anything the renderer can lay slots out on
pub trait Surface {
    fn clear(&mut self);
    fn push(&mut self, slot: DisplaySlot);
}

impl Surface for Vec<DisplaySlot> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn push(&mut self, slot: DisplaySlot) {
        Vec::push(self, slot);
    }
}

/// The board the UI draws from. Remembers when it was last filled so the
/// staggered reveal can be timed against it.
#[derive(Debug, Clone)]
pub struct Board {
    slots: Vec<DisplaySlot>,
    rendered_at: Instant,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            slots: Vec::with_capacity(SLOT_COUNT),
            rendered_at: Instant::now(),
        }
    }
}

impl Board {
    pub fn slots(&self) -> &[DisplaySlot] {
        &self.slots
    }

    /// Whether a slot's reveal delay has passed since the last render
    pub fn is_revealed(&self, slot: &DisplaySlot) -> bool {
        self.rendered_at.elapsed() >= slot.reveal_delay
    }
}

impl Surface for Board {
    fn clear(&mut self) {
        self.slots.clear();
        self.rendered_at = Instant::now();
    }

    fn push(&mut self, slot: DisplaySlot) {
        self.slots.push(slot);
    }
}

/// Maps picks onto slots, cycling the palette by position
#[derive(Debug, Clone)]
pub struct Renderer {
    palette: Vec<Color>,
    reveal_step: Duration,
}

impl Renderer {
    /// An empty palette falls back to the built-in ball colors
    pub fn new(palette: Vec<Color>, reveal_step: Duration) -> Self {
        let palette = if palette.is_empty() {
            theme::default_ball_palette()
        } else {
            palette
        };
        Self {
            palette,
            reveal_step,
        }
    }

    pub fn render(&self, surface: &mut dyn Surface, numbers: &PickedNumbers) {
        surface.clear();
        for (index, number) in numbers.iter().enumerate() {
            surface.push(DisplaySlot {
                text: number.to_string(),
                color: Some(self.palette[index % self.palette.len()]),
                reveal_delay: self.reveal_step * index as u32,
                kind: SlotKind::Ball,
            });
        }
    }

    pub fn reset(&self, surface: &mut dyn Surface) {
        surface.clear();
        for _ in 0..SLOT_COUNT {
            surface.push(DisplaySlot {
                text: PLACEHOLDER.to_string(),
                color: None,
                reveal_delay: Duration::ZERO,
                kind: SlotKind::Placeholder,
            });
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Vec::new(), Duration::from_millis(80))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_texts_and_colors_in_order() {
        let renderer = Renderer::default();
        let mut slots: Vec<DisplaySlot> = Vec::new();
        let numbers = PickedNumbers::new([1, 2, 3, 4, 5, 6]).unwrap();

        renderer.render(&mut slots, &numbers);

        assert_eq!(slots.len(), SLOT_COUNT);
        for (i, slot) in slots.iter().enumerate() {
            assert_eq!(slot.text, (i + 1).to_string());
            assert_eq!(slot.color, Some(renderer.palette[i]));
            assert_eq!(slot.kind, SlotKind::Ball);
            assert_eq!(slot.reveal_delay, Duration::from_millis(80) * i as u32);
        }
    }

    #[test]
    fn test_render_replaces_previous_state() {
        let renderer = Renderer::default();
        let mut slots: Vec<DisplaySlot> = Vec::new();

        renderer.reset(&mut slots);
        renderer.render(&mut slots, &PickedNumbers::new([10, 20, 30, 40, 41, 45]).unwrap());

        assert_eq!(slots.len(), SLOT_COUNT);
        assert!(slots.iter().all(|s| s.kind == SlotKind::Ball));
        assert_eq!(slots[5].text, "45");
    }

    #[test]
    fn test_reset_places_uncolored_placeholders() {
        let renderer = Renderer::default();
        let mut slots: Vec<DisplaySlot> = Vec::new();

        renderer.reset(&mut slots);

        assert_eq!(slots.len(), SLOT_COUNT);
        for slot in &slots {
            assert_eq!(slot.text, PLACEHOLDER);
            assert_eq!(slot.color, None);
            assert_eq!(slot.kind, SlotKind::Placeholder);
        }
    }

    #[test]
    fn test_reset_is_idempotent() {
        let renderer = Renderer::default();
        let mut once: Vec<DisplaySlot> = Vec::new();
        let mut twice: Vec<DisplaySlot> = Vec::new();

        renderer.reset(&mut once);
        renderer.reset(&mut twice);
        renderer.reset(&mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_short_palette_wraps() {
        let renderer = Renderer::new(vec![Color::Red, Color::Blue], Duration::ZERO);
        let mut slots: Vec<DisplaySlot> = Vec::new();

        renderer.render(&mut slots, &PickedNumbers::new([1, 2, 3, 4, 5, 6]).unwrap());

        let colors: Vec<_> = slots.iter().map(|s| s.color).collect();
        assert_eq!(
            colors,
            vec![
                Some(Color::Red),
                Some(Color::Blue),
                Some(Color::Red),
                Some(Color::Blue),
                Some(Color::Red),
                Some(Color::Blue),
            ]
        );
    }

    #[test]
    fn test_empty_palette_uses_default() {
        let renderer = Renderer::new(Vec::new(), Duration::ZERO);
        assert_eq!(renderer.palette, theme::default_ball_palette());
    }

    #[test]
    fn test_board_reveals_first_slot_immediately() {
        let renderer = Renderer::new(Vec::new(), Duration::from_secs(60));
        let mut board = Board::default();

        renderer.render(&mut board, &PickedNumbers::new([1, 2, 3, 4, 5, 6]).unwrap());

        assert!(board.is_revealed(&board.slots()[0]));
        assert!(!board.is_revealed(&board.slots()[1]));
    }
}
