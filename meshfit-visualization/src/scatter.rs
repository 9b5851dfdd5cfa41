//! SVG scatter snapshots of mesh vertices

use crate::camera::Camera;
use crate::svg::{escape, Frame};
use meshfit_core::{Point3f, TriangleMesh};
use std::fmt::Write;

/// Parameters for scatter snapshots.
#[derive(Debug, Clone)]
pub struct ScatterParams {
    /// Width of the SVG in pixels.
    pub width: u32,
    /// Height of the SVG in pixels.
    pub height: u32,
    /// Padding around the content in pixels.
    pub padding: u32,
    /// Radius of each marker in pixels.
    pub point_radius: f32,
    pub point_color: String,
    pub background_color: String,
    /// Camera elevation in degrees.
    pub elevation: f32,
    /// Camera azimuth in degrees.
    pub azimuth: f32,
    /// Half-size of the visible region in world units, or `None` to fit the points.
    pub extent: Option<f32>,
    /// Fade distant markers.
    pub depth_shade: bool,
}

impl Default for ScatterParams {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            padding: 40,
            point_radius: 1.5,
            point_color: "#1f77b4".to_string(),
            background_color: "#ffffff".to_string(),
            elevation: 190.0,
            azimuth: 30.0,
            extent: None,
            depth_shade: true,
        }
    }
}

impl ScatterParams {
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub const fn with_view(mut self, elevation: f32, azimuth: f32) -> Self {
        self.elevation = elevation;
        self.azimuth = azimuth;
        self
    }

    #[must_use]
    pub const fn with_extent(mut self, extent: Option<f32>) -> Self {
        self.extent = extent;
        self
    }

    fn camera(&self) -> Camera {
        Camera::orbit_view(self.elevation, self.azimuth)
    }
}

/// Reorder mesh coordinates into plot axes `(x, z, -y)`, so a y-up model
/// stands upright on a z-up plot.
pub fn reference_axes(point: &Point3f) -> Point3f {
    Point3f::new(point.x, point.z, -point.y)
}

/// Render a scatter plot of `points`, as seen from the configured camera.
#[must_use]
pub fn render_scatter_svg(points: &[Point3f], title: &str, params: &ScatterParams) -> String {
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
        params.padding / 2 + 6,
        escape(title)
    );

    if points.is_empty() {
        let _ = writeln!(
            svg,
            "  <text x=\"50%\" y=\"50%\" text-anchor=\"middle\" fill=\"#999\">No points</text>"
        );
        svg.push_str("</svg>\n");
        return svg;
    }

    let camera = params.camera();
    // x right, y up, depth growing away from the camera
    let mut projected: Vec<Point3f> = points
        .iter()
        .map(|p| {
            let v = camera.to_view(p);
            Point3f::new(v.x, v.y, -v.z)
        })
        .collect();
    projected.sort_by(|a, b| b.z.total_cmp(&a.z));

    let frame = match params.extent {
        Some(e) => Frame::new((-e, e), (-e, e), params.width, params.height, params.padding),
        None => Frame::fit(projected.iter().map(|p| (p.x, p.y)), params.width, params.height, params.padding),
    };
    let (near, far) = projected
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p.z), hi.max(p.z)));
    let depth_range = (far - near).max(f32::EPSILON);

    let _ = writeln!(svg, r#"  <g fill="{}" stroke="none">"#, params.point_color);
    for p in &projected {
        let (x, y) = frame.to_canvas(p.x, p.y);
        if params.depth_shade {
            let opacity = 1.0 - 0.7 * (p.z - near) / depth_range;
            let _ = writeln!(
                svg,
                r#"    <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill-opacity="{:.3}"/>"#,
                x, y, params.point_radius, opacity
            );
        } else {
            let _ = writeln!(
                svg,
                r#"    <circle cx="{:.2}" cy="{:.2}" r="{:.2}"/>"#,
                x, y, params.point_radius
            );
        }
    }
    svg.push_str("  </g>\n</svg>\n");
    svg
}

/// Snapshot of a mesh's vertices in the reference `(x, z, -y)` view.
#[must_use]
pub fn render_mesh_snapshot(mesh: &TriangleMesh, title: &str, params: &ScatterParams) -> String {
    let points: Vec<Point3f> = mesh.vertices.iter().map(reference_axes).collect();
    render_scatter_svg(&points, title, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(svg: &str, needle: &str) -> usize {
        svg.matches(needle).count()
    }

    #[test]
    fn test_one_marker_per_point() {
        let points = vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.5),
        ];
        let svg = render_scatter_svg(&points, "iter: 0", &ScatterParams::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(count(&svg, "<circle"), 3);
        assert!(svg.contains(">iter: 0</text>"));
    }

    #[test]
    fn test_empty_scatter() {
        let svg = render_scatter_svg(&[], "empty", &ScatterParams::default());
        assert_eq!(count(&svg, "<circle"), 0);
        assert!(svg.contains("No points"));
    }

    #[test]
    fn test_markers_stay_on_canvas() {
        let points: Vec<Point3f> = (0..50)
            .map(|i| {
                let t = i as f32 * 0.3;
                Point3f::new(t.cos() * 3.0, t.sin() * 2.0, t * 0.1 - 1.0)
            })
            .collect();
        let params = ScatterParams::default().with_size(300, 200);
        let svg = render_scatter_svg(&points, "spiral", &params);
        for cap in svg.split("cx=\"").skip(1) {
            let x: f32 = cap.split('"').next().unwrap().parse().unwrap();
            assert!((0.0..=300.0).contains(&x));
        }
        for cap in svg.split("cy=\"").skip(1) {
            let y: f32 = cap.split('"').next().unwrap().parse().unwrap();
            assert!((0.0..=200.0).contains(&y));
        }
    }

    #[test]
    fn test_reference_axes() {
        let p = reference_axes(&Point3f::new(1.0, 2.0, 3.0));
        assert_eq!(p, Point3f::new(1.0, 3.0, -2.0));
    }

    #[test]
    fn test_title_is_escaped() {
        let svg = render_scatter_svg(&[Point3f::origin()], "a < b & c", &ScatterParams::default());
        assert!(svg.contains("a &lt; b &amp; c"));
    }
}
