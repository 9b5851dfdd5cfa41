//! Loss curves as SVG line plots

use crate::svg::{escape, Frame};
use std::fmt::Write;

/// Line colors, cycled per series.
const PALETTE: [&str; 6] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b"];

const TICKS: usize = 5;

/// Parameters for line plots.
#[derive(Debug, Clone)]
pub struct LinePlotParams {
    pub width: u32,
    pub height: u32,
    /// Padding around the axes in pixels.
    pub padding: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Plot log10 of the values; non-positive values are dropped.
    pub log_scale: bool,
    pub background_color: String,
    pub stroke_width: f32,
}

impl Default for LinePlotParams {
    fn default() -> Self {
        Self {
            width: 900,
            height: 500,
            padding: 60,
            title: "Loss vs iterations".to_string(),
            x_label: "Iteration".to_string(),
            y_label: "Loss".to_string(),
            log_scale: false,
            background_color: "#ffffff".to_string(),
            stroke_width: 1.5,
        }
    }
}

impl LinePlotParams {
    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    #[must_use]
    pub const fn with_log_scale(mut self, log_scale: bool) -> Self {
        self.log_scale = log_scale;
        self
    }
}

/// Render named series against their index. Non-finite values break the line.
#[must_use]
pub fn render_line_plot_svg(series: &[(&str, &[f32])], params: &LinePlotParams) -> String {
    let transform = |v: f32| -> Option<f32> {
        if !v.is_finite() {
            None
        } else if params.log_scale {
            (v > 0.0).then(|| v.log10())
        } else {
            Some(v)
        }
    };

    let max_len = series.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
    let (mut y_min, mut y_max) = (f32::INFINITY, f32::NEG_INFINITY);
    for (_, values) in series {
        for y in values.iter().filter_map(|&v| transform(v)) {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if !y_min.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    } else if y_max - y_min < f32::EPSILON {
        y_min -= 0.5;
        y_max += 0.5;
    }
    let x_range = (0.0, max_len.saturating_sub(1).max(1) as f32);
    let frame = Frame::stretched(x_range, (y_min, y_max), params.width, params.height, params.padding);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        params.width, params.height, params.width, params.height
    );
    let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{}"/>"#, params.background_color);
    let _ = writeln!(
        svg,
        r#"  <text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="16">{}</text>"#,
        params.width / 2,
        params.padding / 2,
        escape(&params.title)
    );

    write_axes(&mut svg, &frame, x_range, (y_min, y_max), params);

    for (i, (name, values)) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let mut path = String::new();
        let mut pen_down = false;
        for (x, &v) in values.iter().enumerate() {
            match transform(v) {
                Some(y) => {
                    let (cx, cy) = frame.to_canvas(x as f32, y);
                    let cmd = if pen_down { 'L' } else { 'M' };
                    let _ = write!(path, "{}{:.2} {:.2} ", cmd, cx, cy);
                    pen_down = true;
                }
                None => pen_down = false,
            }
        }
        if !path.is_empty() {
            let _ = writeln!(
                svg,
                r#"  <path d="{}" fill="none" stroke="{}" stroke-width="{:.2}"><title>{}</title></path>"#,
                path.trim_end(),
                color,
                params.stroke_width,
                escape(name)
            );
        }
    }

    write_legend(&mut svg, series, params);
    svg.push_str("</svg>\n");
    svg
}

fn write_axes(svg: &mut String, frame: &Frame, x_range: (f32, f32), y_range: (f32, f32), params: &LinePlotParams) {
    let (left, bottom) = frame.to_canvas(x_range.0, y_range.0);
    let (right, top) = frame.to_canvas(x_range.1, y_range.1);

    let _ = writeln!(
        svg,
        r##"  <g stroke="#333" stroke-width="1" fill="none"><path d="M{:.2} {:.2} L{:.2} {:.2} L{:.2} {:.2}"/></g>"##,
        left, top, left, bottom, right, bottom
    );

    svg.push_str("  <g font-family=\"sans-serif\" font-size=\"11\" fill=\"#333\">\n");
    for i in 0..TICKS {
        let t = i as f32 / (TICKS - 1) as f32;

        let x = x_range.0 + t * (x_range.1 - x_range.0);
        let (cx, _) = frame.to_canvas(x, y_range.0);
        let _ = writeln!(
            svg,
            r#"    <text x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            cx,
            bottom + 16.0,
            x.round()
        );

        let y = y_range.0 + t * (y_range.1 - y_range.0);
        let (_, cy) = frame.to_canvas(x_range.0, y);
        let label = if params.log_scale { format_tick(10f32.powf(y)) } else { format_tick(y) };
        let _ = writeln!(
            svg,
            r#"    <text x="{:.2}" y="{:.2}" text-anchor="end">{}</text>"#,
            left - 6.0,
            cy + 4.0,
            label
        );
    }
    let _ = writeln!(
        svg,
        r#"    <text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="13">{}</text>"#,
        (left + right) / 2.0,
        bottom + 36.0,
        escape(&params.x_label)
    );
    let _ = writeln!(
        svg,
        r#"    <text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="13" transform="rotate(-90 {:.2} {:.2})">{}</text>"#,
        left - 46.0,
        (top + bottom) / 2.0,
        left - 46.0,
        (top + bottom) / 2.0,
        escape(&params.y_label)
    );
    svg.push_str("  </g>\n");
}

fn write_legend(svg: &mut String, series: &[(&str, &[f32])], params: &LinePlotParams) {
    let x = params.width as f32 - params.padding as f32 - 120.0;
    let y = params.padding as f32 + 10.0;
    svg.push_str("  <g font-family=\"sans-serif\" font-size=\"12\" fill=\"#333\">\n");
    for (i, (name, _)) in series.iter().enumerate() {
        let row = y + 18.0 * i as f32;
        let _ = writeln!(
            svg,
            r#"    <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="2"/>"#,
            x,
            row,
            x + 20.0,
            row,
            PALETTE[i % PALETTE.len()]
        );
        let _ = writeln!(
            svg,
            r#"    <text x="{:.2}" y="{:.2}">{} loss</text>"#,
            x + 26.0,
            row + 4.0,
            escape(name)
        );
    }
    svg.push_str("  </g>\n");
}

/// Compact tick label.
fn format_tick(v: f32) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let magnitude = v.abs();
    if !(0.01..10_000.0).contains(&magnitude) {
        return format!("{:.1e}", v);
    }
    let text = format!("{:.3}", v);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
