/// Stroke history and the RGB raster it paints.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbImage;

use crate::core::geometry::Vec2;

pub type Rgb = [u8; 3];

pub const BACKGROUND: Rgb = [245, 245, 255];

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    /// Dab radius in canvas pixels.
    pub size: f32,
    pub points: Vec<Vec2>,
}

pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
    strokes: Vec<Stroke>,
    current: Option<Stroke>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![BACKGROUND; width * height], strokes: Vec::new(), current: None }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Points outside the canvas are dropped.
    pub fn add_point(&mut self, at: Vec2, color: Rgb, size: f32) {
        if at.x < 0.0 || at.y < 0.0 || at.x >= self.width as f32 || at.y >= self.height as f32 {
            return;
        }
        let extending = self.current.as_mut().filter(|s| s.color == color && s.size == size);
        let previous = match extending {
            Some(stroke) => {
                let previous = stroke.points.last().copied();
                stroke.points.push(at);
                previous
            }
            None => {
                self.end_stroke();
                self.current = Some(Stroke { color, size, points: vec![at] });
                None
            }
        };
        match previous {
            Some(from) => self.stamp_segment(from, at, color, size),
            None => self.stamp(at, color, size),
        }
    }

    /// Closes the stroke in progress so it can be undone as one unit.
    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.current.take() {
            self.strokes.push(stroke);
        }
    }

    pub fn undo(&mut self) -> bool {
        self.end_stroke();
        if self.strokes.pop().is_none() {
            return false;
        }
        self.redraw();
        true
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.current = None;
        self.pixels.fill(BACKGROUND);
    }

    fn redraw(&mut self) {
        self.pixels.fill(BACKGROUND);
        let strokes = std::mem::take(&mut self.strokes);
        for stroke in &strokes {
            if let Some(first) = stroke.points.first() {
                self.stamp(*first, stroke.color, stroke.size);
            }
            for pair in stroke.points.windows(2) {
                self.stamp_segment(pair[0], pair[1], stroke.color, stroke.size);
            }
        }
        self.strokes = strokes;
    }

    fn stamp_segment(&mut self, from: Vec2, to: Vec2, color: Rgb, size: f32) {
        let step = (size / 2.0).max(1.0);
        let steps = (from.distance(to) / step).ceil().max(1.0) as usize;
        for i in 1..=steps {
            self.stamp(from.lerp(to, i as f32 / steps as f32), color, size);
        }
    }

    fn stamp(&mut self, at: Vec2, color: Rgb, radius: f32) {
        let r2 = radius * radius;
        let x0 = (at.x - radius).floor().max(0.0) as usize;
        let y0 = (at.y - radius).floor().max(0.0) as usize;
        let x1 = ((at.x + radius).ceil() as usize).min(self.width.saturating_sub(1));
        let y1 = ((at.y + radius).ceil() as usize).min(self.height.saturating_sub(1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (dx, dy) = (x as f32 - at.x, y as f32 - at.y);
                if dx * dx + dy * dy <= r2 {
                    self.pixels[y * self.width + x] = color;
                }
            }
        }
    }

    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Rgb(self.pixels[y as usize * self.width + x as usize])
        })
    }

    /// Encodes the raster as PNG.
    pub fn write_png(&self, path: &Path) -> Result<()> {
        self.to_image().save(path).with_context(|| format!("failed to save {}", path.display()))
    }

    /// Saves into `dir` as `painting_<unix seconds>.png`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("painting_{}.png", chrono::Utc::now().timestamp()));
        self.write_png(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = [255, 65, 65];

    #[test]
    fn strokes_paint_and_undo_restores() {
        let mut c = Canvas::new(100, 80);
        c.add_point(Vec2::new(10.0, 10.0), RED, 3.0);
        c.add_point(Vec2::new(50.0, 10.0), RED, 3.0);
        c.end_stroke();
        assert_eq!(c.pixel(30, 10), Some(RED));
        assert_eq!(c.strokes().len(), 1);

        c.add_point(Vec2::new(20.0, 60.0), BACKGROUND, 6.0);
        c.add_point(Vec2::new(40.0, 10.0), BACKGROUND, 6.0);
        assert_eq!(c.pixel(40, 10), Some(BACKGROUND));
        assert!(c.undo());
        assert_eq!(c.pixel(40, 10), Some(RED));
        assert!(c.undo());
        assert_eq!(c.pixel(30, 10), Some(BACKGROUND));
        assert!(!c.undo());
    }

    #[test]
    fn off_canvas_points_are_dropped() {
        let mut c = Canvas::new(20, 20);
        c.add_point(Vec2::new(-1.0, 5.0), RED, 2.0);
        c.add_point(Vec2::new(5.0, 20.0), RED, 2.0);
        c.end_stroke();
        assert!(c.strokes().is_empty());
    }

    #[test]
    fn changing_color_starts_a_new_stroke() {
        let mut c = Canvas::new(50, 50);
        c.add_point(Vec2::new(5.0, 5.0), RED, 2.0);
        c.add_point(Vec2::new(10.0, 5.0), [0, 0, 0], 2.0);
        c.end_stroke();
        assert_eq!(c.strokes().len(), 2);
    }

    #[test]
    fn png_decodes_back_to_the_raster() {
        let mut c = Canvas::new(4, 3);
        c.add_point(Vec2::new(0.0, 0.0), RED, 0.5);
        let path = std::env::temp_dir().join(format!("camterm-png-{}.png", std::process::id()));
        c.write_png(&path).unwrap();
        let decoded = image::open(&path).unwrap().to_rgb8();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(0, 0).0, RED);
        assert_eq!(decoded.get_pixel(3, 2).0, BACKGROUND);
    }

    #[test]
    fn saving_into_a_missing_directory_fails() {
        let c = Canvas::new(2, 2);
        let err = c.save(Path::new("/definitely/not/here")).unwrap_err();
        assert!(err.to_string().contains("failed to save"));
    }
}
