use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, MarkerShape, Plot, Points};

use crate::charts::{Figure, Fill, Histogram, Scatter};
use crate::color::{with_alpha, LUT_SIZE};

// ---------------------------------------------------------------------------
// Planar scatter
// ---------------------------------------------------------------------------

/// Group the finite points of a scatter by colour.
///
/// A colour-mapped scatter is split over the [`LUT_SIZE`] levels of its map so
/// the plot gets at most that many series instead of one per point.
pub fn colour_groups(scatter: &Scatter) -> Vec<(Color32, Vec<[f64; 2]>)> {
    let finite = |i: usize| scatter.x[i].is_finite() && scatter.y[i].is_finite();

    match &scatter.fill {
        Fill::Uniform(color) => {
            let points: Vec<[f64; 2]> = (0..scatter.len())
                .filter(|&i| finite(i))
                .map(|i| [scatter.x[i], scatter.y[i]])
                .collect();
            vec![(with_alpha(*color, scatter.alpha), points)]
        }
        Fill::Mapped { values, scale } => {
            let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); LUT_SIZE];
            for i in (0..scatter.len()).filter(|&i| finite(i)) {
                if let Some(b) = values.get(i).and_then(|v| scale.bucket(*v)) {
                    buckets[b].push([scatter.x[i], scatter.y[i]]);
                }
            }
            scale
                .map
                .lut(LUT_SIZE)
                .into_iter()
                .zip(buckets)
                .filter(|(_, pts)| !pts.is_empty())
                .map(|(c, pts)| (with_alpha(c, scatter.alpha), pts))
                .collect()
        }
    }
}

/// Render a 2D scatter figure in the central panel.
pub fn plane_scatter(ui: &mut Ui, figure: &Figure, scatters: &[Scatter]) {
    let mut plot = Plot::new("plane_scatter")
        .x_axis_label(figure.x_label.as_str())
        .y_axis_label(figure.y_label.as_str())
        .show_grid(figure.grid)
        .data_aspect(1.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if figure.legend {
        plot = plot.legend(Legend::default());
    }

    plot.show(ui, |plot_ui| {
        for scatter in scatters.iter().filter(|s| !s.is_empty()) {
            let groups = colour_groups(scatter);

            if let Some(edge) = scatter.edge {
                let outline: Vec<[f64; 2]> =
                    groups.iter().flat_map(|(_, pts)| pts.iter().copied()).collect();
                plot_ui.points(
                    Points::new(outline)
                        .shape(MarkerShape::Circle)
                        .filled(false)
                        .radius(scatter.radius)
                        .color(with_alpha(edge, scatter.alpha)),
                );
            }

            for (color, points) in groups {
                let mut series = Points::new(points)
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(scatter.radius)
                    .color(color);
                if let Some(name) = &scatter.name {
                    series = series.name(name);
                }
                plot_ui.points(series);
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

pub fn histogram(ui: &mut Ui, figure: &Figure, hist: &Histogram) {
    let fill = with_alpha(hist.fill, hist.alpha);
    let bars: Vec<Bar> = hist
        .compute_bins()
        .into_iter()
        .map(|bin| {
            Bar::new((bin.lo + bin.hi) / 2.0, bin.count as f64)
                .width(bin.hi - bin.lo)
                .fill(fill)
                .stroke(Stroke::new(1.0, hist.edge))
        })
        .collect();

    Plot::new("histogram")
        .x_axis_label(figure.x_label.as_str())
        .y_axis_label(figure.y_label.as_str())
        .show_grid(figure.grid)
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}
