use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};

use crate::charts::{Arrows, Scatter};
use crate::ui::figure::point_color;

/// Head length of an arrow, as a fraction of its shaft.
const ARROW_HEAD_RATIO: f32 = 0.3;
const TICKS: usize = 4;

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// Orthographic orbit camera around the unit cube. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub azimuth: f32,
    pub elevation: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            azimuth: -60.0,
            elevation: 30.0,
        }
    }
}

impl OrbitCamera {
    /// Project a point of the normalized cube to `(right, up, depth)`.
    pub fn project(&self, [x, y, z]: [f32; 3]) -> [f32; 3] {
        let (sa, ca) = self.azimuth.to_radians().sin_cos();
        let (se, ce) = self.elevation.to_radians().sin_cos();
        let along = ca * x + sa * y;
        let right = -sa * x + ca * y;
        let up = -se * along + ce * z;
        let depth = ce * along + se * z;
        [right, up, depth]
    }

    /// Drag rotates, double-click resets.
    pub fn handle_input(&mut self, response: &egui::Response) {
        if response.double_clicked() {
            *self = Self::default();
            return;
        }
        let delta = response.drag_delta();
        if delta != Vec2::ZERO {
            self.azimuth = (self.azimuth - delta.x * 0.5) % 360.0;
            self.elevation = (self.elevation + delta.y * 0.5).clamp(-90.0, 90.0);
        }
    }
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Axis-aligned data range used to fit the data into `[-1, 1]^3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Bounds {
    /// Range of the finite points. `None` when there are none.
    pub fn from_points(points: impl IntoIterator<Item = [f64; 3]>) -> Option<Self> {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        let mut any = false;
        for p in points {
            if !p.iter().all(|v| v.is_finite()) {
                continue;
            }
            any = true;
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        any.then_some(Bounds { min, max })
    }

    fn half_span(&self, axis: usize) -> f64 {
        let half = (self.max[axis] - self.min[axis]) / 2.0;
        if half.abs() < f64::EPSILON {
            1.0
        } else {
            half
        }
    }

    pub fn normalize(&self, p: [f64; 3]) -> [f32; 3] {
        let mut out = [0.0f32; 3];
        for axis in 0..3 {
            let mid = (self.min[axis] + self.max[axis]) / 2.0;
            out[axis] = ((p[axis] - mid) / self.half_span(axis)) as f32;
        }
        out
    }

    /// Data value at normalized coordinate `t` in `[-1, 1]` on `axis`.
    pub fn denormalize(&self, axis: usize, t: f32) -> f64 {
        let mid = (self.min[axis] + self.max[axis]) / 2.0;
        mid + t as f64 * self.half_span(axis)
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

struct Marker {
    pos: [f32; 3],
    color: Color32,
    radius: f32,
}

struct Segment {
    tail: [f32; 3],
    head: [f32; 3],
}

/// Pre-resolved 3D content: positions normalized, colours looked up once.
pub struct Scene3d {
    bounds: Bounds,
    markers: Vec<Marker>,
    segments: Vec<Segment>,
    arrow_color: Color32,
    labels: [String; 3],
}

fn finite(p: &[f64; 3]) -> bool {
    p.iter().all(|v| v.is_finite())
}

impl Scene3d {
    pub fn new(scatters: &[Scatter], arrows: Option<&Arrows>, labels: [String; 3]) -> Self {
        let scatter_points = scatters.iter().flat_map(|s| {
            (0..s.len()).map(move |i| [s.x[i], s.y[i], s.z.get(i).copied().unwrap_or(f64::NAN)])
        });
        let arrow_points = arrows
            .into_iter()
            .flat_map(|a| a.origins.iter().copied());
        let bounds = Bounds::from_points(scatter_points.chain(arrow_points)).unwrap_or(Bounds {
            min: [-1.0; 3],
            max: [1.0; 3],
        });

        let mut markers = Vec::new();
        for scatter in scatters {
            for i in 0..scatter.len() {
                let p = [scatter.x[i], scatter.y[i], scatter.z.get(i).copied().unwrap_or(f64::NAN)];
                if !finite(&p) {
                    continue;
                }
                let Some(color) = point_color(scatter, i) else {
                    continue;
                };
                markers.push(Marker {
                    pos: bounds.normalize(p),
                    color,
                    radius: scatter.radius,
                });
            }
        }

        let mut segments = Vec::new();
        let mut arrow_color = Color32::BLUE;
        if let Some(arrows) = arrows {
            arrow_color = crate::color::with_alpha(arrows.color, arrows.alpha);
            for (origin, dir) in arrows.origins.iter().zip(&arrows.directions) {
                if !finite(origin) || !finite(dir) {
                    continue;
                }
                let head = [origin[0] + dir[0], origin[1] + dir[1], origin[2] + dir[2]];
                segments.push(Segment {
                    tail: bounds.normalize(*origin),
                    head: bounds.normalize(head),
                });
            }
        }

        Scene3d {
            bounds,
            markers,
            segments,
            arrow_color,
            labels,
        }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn arrow_count(&self) -> usize {
        self.segments.len()
    }

    /// Draw the scene filling the available space.
    pub fn show(&self, ui: &mut Ui, camera: &mut OrbitCamera) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        camera.handle_input(&response);
        let rect = response.rect;

        let to_screen = |p: [f32; 3]| -> Pos2 { screen_pos(rect, camera.project(p)) };

        let text_color = ui.visuals().text_color();
        let grid = Stroke::new(1.0, text_color.gamma_multiply(0.3));
        for (a, b) in cube_edges() {
            painter.line_segment([to_screen(a), to_screen(b)], grid);
        }
        self.draw_axes(&painter, &to_screen, text_color);

        for m in &self.markers {
            painter.circle_filled(to_screen(m.pos), m.radius, m.color);
        }

        let stroke = Stroke::new(1.0, self.arrow_color);
        for seg in &self.segments {
            let tail = to_screen(seg.tail);
            let head = to_screen(seg.head);
            painter.line_segment([tail, head], stroke);
            let shaft = head - tail;
            if shaft.length() > f32::EPSILON {
                let back = -shaft * ARROW_HEAD_RATIO;
                for angle in [0.5f32, -0.5] {
                    let barb = egui::emath::Rot2::from_angle(angle) * back;
                    painter.line_segment([head, head + barb], stroke);
                }
            }
        }
    }

    fn draw_axes(&self, painter: &egui::Painter, to_screen: &dyn Fn([f32; 3]) -> Pos2, color: Color32) {
        let tick_font = FontId::proportional(10.0);
        let label_font = FontId::proportional(12.0);
        let dim = color.gamma_multiply(0.7);

        // Each axis runs along one cube edge; the other two coordinates are fixed.
        let edges: [([f32; 3], usize); 3] = [
            ([0.0, -1.0, -1.0], 0),
            ([1.0, 0.0, -1.0], 1),
            ([-1.0, -1.0, 0.0], 2),
        ];
        for (anchor, axis) in edges {
            for i in 0..=TICKS {
                let t = -1.0 + 2.0 * i as f32 / TICKS as f32;
                let mut p = anchor;
                p[axis] = t;
                let pos = to_screen(p);
                let value = self.bounds.denormalize(axis, t);
                painter.text(pos, Align2::RIGHT_TOP, format_tick(value), tick_font.clone(), dim);
            }
            let mut mid = anchor;
            mid[axis] = 0.0;
            for (k, v) in mid.iter_mut().enumerate() {
                if k != axis {
                    *v *= 1.25;
                }
            }
            painter.text(
                to_screen(mid),
                Align2::CENTER_CENTER,
                &self.labels[axis],
                label_font.clone(),
                color,
            );
        }
    }
}

fn screen_pos(rect: Rect, [right, up, _depth]: [f32; 3]) -> Pos2 {
    let scale = rect.width().min(rect.height()) * 0.3;
    rect.center() + Vec2::new(right * scale, -up * scale)
}

fn cube_edges() -> Vec<([f32; 3], [f32; 3])> {
    let mut edges = Vec::with_capacity(12);
    for axis in 0..3 {
        for a in [-1.0f32, 1.0] {
            for b in [-1.0f32, 1.0] {
                let mut from = [0.0f32; 3];
                let (i, j) = ((axis + 1) % 3, (axis + 2) % 3);
                from[i] = a;
                from[j] = b;
                let mut to = from;
                from[axis] = -1.0;
                to[axis] = 1.0;
                edges.push((from, to));
            }
        }
    }
    edges
}

pub fn format_tick(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.abs() >= 1e4 || value.abs() < 1e-2 {
        format!("{value:.1e}")
    } else if value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::Fill;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn top_of_cube_projects_up() {
        let cam = OrbitCamera::default();
        let [right, up, _] = cam.project([0.0, 0.0, 1.0]);
        assert!(close(right, 0.0));
        assert!(close(up, 30f32.to_radians().cos()));
    }

    #[test]
    fn projection_preserves_length() {
        let cam = OrbitCamera {
            azimuth: 17.0,
            elevation: -42.0,
        };
        let p = [0.3f32, -0.8, 0.5];
        let q = cam.project(p);
        let len = |v: [f32; 3]| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        assert!(close(len(p), len(q)));
    }

    #[test]
    fn bounds_skip_non_finite_points() {
        let bounds =
            Bounds::from_points([[0.0, 1.0, 2.0], [f64::NAN, 9.0, 9.0], [4.0, -1.0, 2.0]]).unwrap();
        assert_eq!(bounds.min, [0.0, -1.0, 2.0]);
        assert_eq!(bounds.max, [4.0, 1.0, 2.0]);
        assert_eq!(bounds.normalize([4.0, -1.0, 2.0]), [1.0, -1.0, 0.0]);
        assert_eq!(bounds.denormalize(0, -1.0), 0.0);
        assert!(Bounds::from_points([[f64::NAN; 3]]).is_none());
    }

    #[test]
    fn scene_drops_points_without_position_or_colour() {
        let scatter = Scatter {
            name: None,
            x: vec![0.0, f64::NAN, 2.0],
            y: vec![0.0, 1.0, 2.0],
            z: vec![0.0, 1.0, 2.0],
            fill: Fill::Mapped {
                values: vec![1.0, 2.0, f64::NAN],
                scale: crate::color::ColorScale::from_values(
                    crate::color::ColorMap::Plasma,
                    &[1.0, 2.0],
                ),
            },
            radius: 1.0,
            alpha: 1.0,
            edge: None,
        };
        let labels = ["x".to_string(), "y".to_string(), "z".to_string()];
        let scene = Scene3d::new(&[scatter], None, labels);
        assert_eq!(scene.marker_count(), 1);
        assert_eq!(scene.arrow_count(), 0);
    }

    #[test]
    fn cube_has_twelve_unit_edges() {
        let edges = cube_edges();
        assert_eq!(edges.len(), 12);
        for (a, b) in edges {
            let diff: Vec<f32> = a.iter().zip(&b).map(|(x, y)| (x - y).abs()).collect();
            assert_eq!(diff.iter().filter(|d| **d == 2.0).count(), 1);
        }
    }

    #[test]
    fn tick_labels_are_compact() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(150.0), "150");
        assert_eq!(format_tick(-12.5), "-12.5");
        assert_eq!(format_tick(25000.0), "2.5e4");
    }
}
