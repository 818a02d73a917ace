use eframe::egui::{self, Align2, Color32, FontId, Rect, RichText, Sense, Stroke, Ui, Vec2};

use crate::charts::{Colorbar, Figure, Fill, Plot, Scatter};
use crate::color::with_alpha;
use crate::ui::plot;
use crate::ui::view3d::{format_tick, OrbitCamera, Scene3d};

const COLORBAR_STEPS: usize = 128;

/// Colour of point `i` with the scatter's opacity applied. `None` when the
/// point's colour value is missing.
pub fn point_color(scatter: &Scatter, i: usize) -> Option<Color32> {
    let base = match &scatter.fill {
        Fill::Uniform(c) => *c,
        Fill::Mapped { values, scale } => scale.color_for(values.get(i).copied()?)?,
    };
    Some(with_alpha(base, scatter.alpha))
}

// ---------------------------------------------------------------------------
// eframe App for a single figure
// ---------------------------------------------------------------------------

/// Window content shared by all charts: heading, colour bar, legend and the
/// plot body.
pub struct FigureApp {
    figure: Figure,
    scene: Option<Scene3d>,
    camera: OrbitCamera,
}

impl FigureApp {
    pub fn new(figure: Figure) -> Self {
        let scene = match &figure.plot {
            Plot::Space3d { scatters, arrows } => {
                let labels = [
                    figure.x_label.clone(),
                    figure.y_label.clone(),
                    figure.z_label.clone().unwrap_or_default(),
                ];
                let scene = Scene3d::new(scatters, arrows.as_ref(), labels);
                log::debug!(
                    "3D scene: {} markers, {} arrows drawn",
                    scene.marker_count(),
                    scene.arrow_count()
                );
                Some(scene)
            }
            _ => None,
        };
        Self {
            figure,
            scene,
            camera: OrbitCamera::default(),
        }
    }
}

impl eframe::App for FigureApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title ----
        egui::TopBottomPanel::top("title").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(RichText::new(&self.figure.title).size(16.0));
            });
        });

        // ---- Right panel: colour bar ----
        if let Some(colorbar) = &self.figure.colorbar {
            egui::SidePanel::right("colorbar")
                .exact_width(110.0)
                .resizable(false)
                .show(ctx, |ui| colorbar_panel(ui, colorbar));
        }

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            match (&self.figure.plot, &self.scene) {
                (Plot::Space3d { scatters, .. }, Some(scene)) => {
                    scene.show(ui, &mut self.camera);
                    if self.figure.legend {
                        draw_legend(ui, scatters);
                    }
                }
                (Plot::Plane { scatters }, _) => plot::plane_scatter(ui, &self.figure, scatters),
                (Plot::Histogram(h), _) => plot::histogram(ui, &self.figure, h),
                (Plot::Space3d { .. }, None) => {}
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Colour bar and legend
// ---------------------------------------------------------------------------

fn colorbar_panel(ui: &mut Ui, colorbar: &Colorbar) {
    let size = Vec2::new(ui.available_width(), ui.available_height() - 8.0);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();

    let bar = Rect::from_min_size(
        rect.left_top() + Vec2::new(10.0, 20.0),
        Vec2::new(18.0, (rect.height() - 40.0).max(40.0)),
    );
    let step = bar.height() / COLORBAR_STEPS as f32;
    for (i, color) in colorbar.scale.map.lut(COLORBAR_STEPS).into_iter().enumerate() {
        // Highest value at the top.
        let bottom = bar.bottom() - i as f32 * step;
        let cell = Rect::from_min_max(
            egui::pos2(bar.left(), bottom - step - 0.5),
            egui::pos2(bar.right(), bottom),
        );
        painter.rect_filled(cell, 0.0, color);
    }
    painter.rect_stroke(bar, 0.0, Stroke::new(1.0, text_color), egui::StrokeKind::Outside);

    let font = FontId::proportional(10.0);
    for i in 0..=4 {
        let t = i as f64 / 4.0;
        let value = colorbar.scale.min + t * (colorbar.scale.max - colorbar.scale.min);
        let y = bar.bottom() - t as f32 * bar.height();
        painter.line_segment(
            [egui::pos2(bar.right(), y), egui::pos2(bar.right() + 4.0, y)],
            Stroke::new(1.0, text_color),
        );
        painter.text(
            egui::pos2(bar.right() + 6.0, y),
            Align2::LEFT_CENTER,
            format_tick(value),
            font.clone(),
            text_color,
        );
    }

    // Vertical label along the right edge, one glyph per line.
    let vertical: String = colorbar
        .label
        .chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    painter.text(
        egui::pos2(rect.right() - 8.0, bar.center().y),
        Align2::RIGHT_CENTER,
        vertical,
        FontId::proportional(9.0),
        text_color,
    );
}

fn draw_legend(ui: &Ui, scatters: &[Scatter]) {
    let painter = ui.painter();
    let text_color = ui.visuals().text_color();
    let mut pos = ui.min_rect().left_top() + Vec2::new(12.0, 12.0);
    for scatter in scatters {
        let Some(name) = &scatter.name else {
            continue;
        };
        let swatch = match scatter.fill {
            Fill::Uniform(c) => with_alpha(c, scatter.alpha.max(0.3)),
            Fill::Mapped { .. } => Color32::GRAY,
        };
        painter.circle_filled(pos + Vec2::new(5.0, 6.0), 5.0, swatch);
        painter.text(
            pos + Vec2::new(16.0, 6.0),
            Align2::LEFT_CENTER,
            name,
            FontId::proportional(12.0),
            text_color,
        );
        pos.y += 18.0;
    }
}
