//! Shared SVG helpers

use meshfit_core::Result;
use std::path::Path;

/// Maps a data rectangle onto the padded area of a canvas, preserving the
/// data's y-up orientation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    min: (f32, f32),
    scale: (f32, f32),
    offset: (f32, f32),
    height: f32,
}

impl Frame {
    /// Uniform scaling of `x_range` by `y_range` into the canvas, centered.
    pub(crate) fn new(x_range: (f32, f32), y_range: (f32, f32), width: u32, height: u32, padding: u32) -> Self {
        let (available_w, available_h) = available(width, height, padding);
        let content_w = x_range.1 - x_range.0;
        let content_h = y_range.1 - y_range.0;
        let scale = if content_w > 0.0 && content_h > 0.0 {
            (available_w / content_w).min(available_h / content_h)
        } else if content_w > 0.0 {
            available_w / content_w
        } else if content_h > 0.0 {
            available_h / content_h
        } else {
            1.0
        };
        let padding = padding as f32;
        Self {
            min: (x_range.0, y_range.0),
            scale: (scale, scale),
            offset: (
                padding + (available_w - content_w * scale) / 2.0,
                padding + (available_h - content_h * scale) / 2.0,
            ),
            height: height as f32,
        }
    }

    /// Independent x and y scaling that fills the padded area.
    pub(crate) fn stretched(x_range: (f32, f32), y_range: (f32, f32), width: u32, height: u32, padding: u32) -> Self {
        let (available_w, available_h) = available(width, height, padding);
        let span = |r: (f32, f32)| if r.1 > r.0 { r.1 - r.0 } else { 1.0 };
        let padding = padding as f32;
        Self {
            min: (x_range.0, y_range.0),
            scale: (available_w / span(x_range), available_h / span(y_range)),
            offset: (padding, padding),
            height: height as f32,
        }
    }

    /// Fit a uniformly scaled frame around `points`.
    pub(crate) fn fit<I>(points: I, width: u32, height: u32, padding: u32) -> Self
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let (mut x, mut y) = ((f32::INFINITY, f32::NEG_INFINITY), (f32::INFINITY, f32::NEG_INFINITY));
        for (px, py) in points {
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }
        if !x.0.is_finite() {
            x = (-1.0, 1.0);
            y = (-1.0, 1.0);
        }
        Self::new(x, y, width, height, padding)
    }

    /// Canvas position of a data point; SVG y grows downward.
    pub(crate) fn to_canvas(&self, x: f32, y: f32) -> (f32, f32) {
        let cx = self.offset.0 + (x - self.min.0) * self.scale.0;
        let cy = self.height - (self.offset.1 + (y - self.min.1) * self.scale.1);
        (cx, cy)
    }
}

fn available(width: u32, height: u32, padding: u32) -> (f32, f32) {
    let pad = 2.0 * padding as f32;
    ((width as f32 - pad).max(1.0), (height as f32 - pad).max(1.0))
}

/// Escape text for use inside SVG elements.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Write an SVG document to `path`.
pub fn save_svg<P: AsRef<Path>>(svg: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, svg)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frame_corners() {
        let frame = Frame::new((0.0, 2.0), (0.0, 1.0), 220, 120, 10);
        let (x0, y0) = frame.to_canvas(0.0, 0.0);
        let (x1, y1) = frame.to_canvas(2.0, 1.0);
        assert_relative_eq!(x0, 10.0);
        assert_relative_eq!(y0, 110.0);
        assert_relative_eq!(x1, 210.0);
        assert_relative_eq!(y1, 10.0);
    }

    #[test]
    fn test_degenerate_fit() {
        let frame = Frame::fit(std::iter::once((1.0, 1.0)), 100, 100, 10);
        let (x, y) = frame.to_canvas(1.0, 1.0);
        assert!(x.is_finite() && y.is_finite());
    }

    #[test]
    fn test_save_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.svg");
        save_svg("<svg/>", &path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<svg/>");
    }
}
