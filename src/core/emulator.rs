/// Stand-in detector driven by the mouse and keyboard.
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::debug;

use crate::core::game::Tracking;
use crate::core::geometry::Vec2;
use crate::core::landmarks::DetectionFrame;
use crate::gesture::synthetic::{self, HandPreset, PosePreset};

/// COCO labels the emulator can "hold" in front of the camera.
pub const OBJECT_PRESETS: [&str; 10] =
    ["cell phone", "cup", "bottle", "book", "remote", "scissors", "banana", "apple", "mouse", "clock"];

const HAND_SCALE: f32 = 0.2;

#[derive(Debug, Clone)]
pub struct PointerEmulator {
    tracking: Tracking,
    pointer: Vec2,
    preset: usize,
    visible: bool,
}

impl PointerEmulator {
    pub fn new(tracking: Tracking) -> Self {
        Self { tracking, pointer: Vec2::new(0.5, 0.5), preset: 0, visible: true }
    }

    fn preset_count(&self) -> usize {
        match self.tracking {
            Tracking::Hands { .. } => HandPreset::ALL.len(),
            Tracking::Pose => PosePreset::ALL.len(),
            Tracking::Objects => OBJECT_PRESETS.len(),
            Tracking::Face => 1,
        }
    }

    pub fn preset_name(&self) -> &'static str {
        if !self.visible {
            return "NOBODY";
        }
        match self.tracking {
            Tracking::Hands { .. } => HandPreset::ALL[self.preset].name(),
            Tracking::Pose => PosePreset::ALL[self.preset].name(),
            Tracking::Objects => OBJECT_PRESETS[self.preset],
            Tracking::Face => "FACE",
        }
    }

    /// Moves the pointer to a mouse position inside `area`.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if !matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_)) {
            return;
        }
        let w = f32::from(area.width.max(1));
        let h = f32::from(area.height.max(1));
        let x = (f32::from(mouse.column.saturating_sub(area.x)) + 0.5) / w;
        let y = (f32::from(mouse.row.saturating_sub(area.y)) + 0.5) / h;
        self.pointer = Vec2::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
    }

    /// Digits pick a preset, Tab cycles, Backspace hides the subject. Returns whether the key was used.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c @ '0'..='9') => {
                let index = if c == '0' { 9 } else { c as usize - '1' as usize };
                if index < self.preset_count() {
                    self.preset = index;
                    self.visible = true;
                }
            }
            KeyCode::Tab => {
                self.preset = (self.preset + 1) % self.preset_count();
                self.visible = true;
            }
            KeyCode::BackTab => {
                let n = self.preset_count();
                self.preset = (self.preset + n - 1) % n;
                self.visible = true;
            }
            KeyCode::Backspace => self.visible = !self.visible,
            _ => return false,
        }
        debug!(preset = self.preset_name(), "emulator preset");
        true
    }

    pub fn frame(&self) -> DetectionFrame {
        if !self.visible {
            return DetectionFrame::default();
        }
        match self.tracking {
            Tracking::Hands { anchor } => DetectionFrame {
                hands: vec![synthetic::hand(HandPreset::ALL[self.preset], anchor, self.pointer, HAND_SCALE)],
                ..Default::default()
            },
            Tracking::Pose => {
                DetectionFrame { pose: Some(synthetic::pose(PosePreset::ALL[self.preset])), ..Default::default() }
            }
            Tracking::Face => DetectionFrame { faces: vec![synthetic::face(self.pointer)], ..Default::default() },
            Tracking::Objects => DetectionFrame {
                objects: vec![synthetic::object(OBJECT_PRESETS[self.preset], self.pointer)],
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::landmarks::HandLandmark;
    use crossterm::event::{KeyModifiers, MouseButton};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn mouse_moves_the_anchor_landmark() {
        let mut emu = PointerEmulator::new(Tracking::Hands { anchor: HandLandmark::IndexTip });
        let area = Rect::new(0, 0, 100, 50);
        emu.handle_mouse(
            MouseEvent { kind: MouseEventKind::Down(MouseButton::Left), column: 24, row: 9, modifiers: KeyModifiers::NONE },
            area,
        );
        let frame = emu.frame();
        let tip = frame.hands[0].kp(HandLandmark::IndexTip);
        assert!((tip.x - 0.245).abs() < 1e-4);
        assert!((tip.y - 0.19).abs() < 1e-4);
    }

    #[test]
    fn keys_pick_presets_and_hide_subject() {
        let mut emu = PointerEmulator::new(Tracking::Pose);
        assert!(emu.handle_key(key(KeyCode::Char('4'))));
        assert_eq!(emu.preset_name(), "T-POSE");
        assert!(emu.handle_key(key(KeyCode::Backspace)));
        assert!(emu.frame().is_empty());
        assert!(emu.handle_key(key(KeyCode::Tab)));
        assert_eq!(emu.preset_name(), "Y-POSE");
        assert!(!emu.handle_key(key(KeyCode::Char('x'))));
    }

    #[test]
    fn out_of_range_digit_is_ignored() {
        let mut emu = PointerEmulator::new(Tracking::Hands { anchor: HandLandmark::Wrist });
        emu.handle_key(key(KeyCode::Char('9')));
        assert_eq!(emu.preset_name(), "POINT");
    }
}
