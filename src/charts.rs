use eframe::egui::Color32;

use crate::color::{ColorMap, ColorScale};
use crate::data::model::{Catalog, Measure};

/// Arrow length in data units after normalization.
pub const ARROW_LENGTH: f64 = 0.1;

/// Bin count of the magnitude histogram.
pub const HISTOGRAM_BINS: usize = 30;

/// Default opacity of the galaxies drawn over the vector field.
pub const DEFAULT_POINT_ALPHA: f32 = 0.5;

const SGX_LABEL: &str = "SGX [Mpc]";
const SGY_LABEL: &str = "SGY [Mpc]";
const SGZ_LABEL: &str = "SGZ [Mpc]";

// ---------------------------------------------------------------------------
// Figure description
// ---------------------------------------------------------------------------

/// Everything a window needs to draw one chart. Built from the catalog by the
/// routines below, consumed by [`crate::ui`].
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Only set for 3D figures.
    pub z_label: Option<String>,
    pub plot: Plot,
    pub colorbar: Option<Colorbar>,
    pub legend: bool,
    pub grid: bool,
}

#[derive(Debug, Clone)]
pub enum Plot {
    Space3d {
        scatters: Vec<Scatter>,
        arrows: Option<Arrows>,
    },
    Plane {
        scatters: Vec<Scatter>,
    },
    Histogram(Histogram),
}

#[derive(Debug, Clone)]
pub enum Fill {
    Uniform(Color32),
    /// One value per point, coloured through the scale.
    Mapped { values: Vec<f64>, scale: ColorScale },
}

/// A point cloud. `z` is empty for planar scatters. Non-finite coordinates
/// are kept and left to the renderer.
#[derive(Debug, Clone)]
pub struct Scatter {
    pub name: Option<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub fill: Fill,
    pub radius: f32,
    pub alpha: f32,
    pub edge: Option<Color32>,
}

impl Scatter {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// 3D arrows, one per catalog row.
#[derive(Debug, Clone)]
pub struct Arrows {
    pub origins: Vec<[f64; 3]>,
    /// Already scaled to [`ARROW_LENGTH`]; non-finite where undefined.
    pub directions: Vec<[f64; 3]>,
    pub color: Color32,
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub struct Histogram {
    pub values: Vec<f64>,
    pub bins: usize,
    pub fill: Color32,
    pub alpha: f32,
    pub edge: Color32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

impl Histogram {
    /// Equal-width bins over the finite range, last bin closed on the right.
    /// A single-valued sample gets a unit-wide range around it.
    pub fn compute_bins(&self) -> Vec<Bin> {
        let bins = self.bins.max(1);
        let Some((mut lo, mut hi)) = crate::color::finite_range(&self.values) else {
            return Vec::new();
        };
        if hi - lo < f64::EPSILON {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / bins as f64;

        let mut counts = vec![0usize; bins];
        for v in self.values.iter().copied().filter(|v| v.is_finite()) {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| Bin {
                lo: lo + i as f64 * width,
                hi: lo + (i + 1) as f64 * width,
                count,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Colorbar {
    pub scale: ColorScale,
    pub label: String,
}

impl Figure {
    fn space(title: &str, plot: Plot) -> Self {
        Figure {
            title: title.to_string(),
            x_label: SGX_LABEL.to_string(),
            y_label: SGY_LABEL.to_string(),
            z_label: Some(SGZ_LABEL.to_string()),
            plot,
            colorbar: None,
            legend: false,
            grid: false,
        }
    }

    /// Number of plotted elements, for logging.
    pub fn element_count(&self) -> usize {
        match &self.plot {
            Plot::Space3d { scatters, arrows } => {
                scatters.iter().map(Scatter::len).sum::<usize>()
                    + arrows.as_ref().map_or(0, |a| a.origins.len())
            }
            Plot::Plane { scatters } => scatters.iter().map(Scatter::len).sum(),
            Plot::Histogram(h) => h.values.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared builders
// ---------------------------------------------------------------------------

fn mapped_scatter_3d(
    catalog: &Catalog,
    by: Measure,
    map: ColorMap,
    label: &str,
) -> (Scatter, Colorbar) {
    let values = catalog.measure_f64(by);
    let scale = ColorScale::from_values(map, &values);
    let scatter = Scatter {
        name: None,
        x: catalog.measure_f64(Measure::Sgx),
        y: catalog.measure_f64(Measure::Sgy),
        z: catalog.measure_f64(Measure::Sgz),
        fill: Fill::Mapped {
            values,
            scale: scale.clone(),
        },
        radius: 1.2,
        alpha: 0.7,
        edge: None,
    };
    let colorbar = Colorbar {
        scale,
        label: label.to_string(),
    };
    (scatter, colorbar)
}

/// Direction `(Vcmb·cos SGZ, Vcmb·sin SGZ, 0)` scaled to `length`.
///
/// The angle is the SGZ coordinate itself, taken in radians. Returns NaNs when
/// the direction is zero or undefined.
pub fn motion_vector(vcmb: f64, sgz: f64, length: f64) -> [f64; 3] {
    let u = vcmb * sgz.cos();
    let v = vcmb * sgz.sin();
    let norm = (u * u + v * v).sqrt();
    if !norm.is_finite() || norm == 0.0 {
        return [f64::NAN; 3];
    }
    [u / norm * length, v / norm * length, 0.0]
}

fn motion_arrows(catalog: &Catalog) -> Arrows {
    let sgx = catalog.measure_f64(Measure::Sgx);
    let sgy = catalog.measure_f64(Measure::Sgy);
    let sgz = catalog.measure_f64(Measure::Sgz);
    let vcmb = catalog.measure_f64(Measure::Vcmb);

    let origins = (0..catalog.len())
        .map(|i| [sgx[i], sgy[i], sgz[i]])
        .collect();
    let directions = vcmb
        .iter()
        .zip(&sgz)
        .map(|(&v, &z)| motion_vector(v, z, ARROW_LENGTH))
        .collect();

    Arrows {
        origins,
        directions,
        color: Color32::BLUE,
        alpha: 0.5,
    }
}

// ---------------------------------------------------------------------------
// The six charts
// ---------------------------------------------------------------------------

/// Galaxies at their supergalactic position, coloured by distance modulus.
pub fn galaxies_3d(catalog: &Catalog) -> Figure {
    let (scatter, colorbar) = mapped_scatter_3d(
        catalog,
        Measure::Dm,
        ColorMap::Plasma,
        "Distance modulus (DM) [mag]",
    );
    let mut figure = Figure::space(
        "Supergalactic coordinates of individual galaxies",
        Plot::Space3d {
            scatters: vec![scatter],
            arrows: None,
        },
    );
    figure.colorbar = Some(colorbar);
    figure
}

/// Same layout as [`galaxies_3d`], coloured by the distance modulus error.
pub fn galaxies_by_error(catalog: &Catalog) -> Figure {
    let (scatter, colorbar) = mapped_scatter_3d(
        catalog,
        Measure::EDm,
        ColorMap::Oranges,
        "Distance modulus error (eDM) [mag]",
    );
    let mut figure = Figure::space(
        "Distance modulus error across measurement methods",
        Plot::Space3d {
            scatters: vec![scatter],
            arrows: None,
        },
    );
    figure.colorbar = Some(colorbar);
    figure
}

pub fn vector_field(catalog: &Catalog) -> Figure {
    Figure::space(
        "Vector field of galaxy motion",
        Plot::Space3d {
            scatters: Vec::new(),
            arrows: Some(motion_arrows(catalog)),
        },
    )
}

/// The vector field with the galaxies drawn at `point_alpha` opacity.
pub fn vector_field_with_galaxies(catalog: &Catalog, point_alpha: f32) -> Figure {
    let galaxies = Scatter {
        name: Some("Galaxies".to_string()),
        x: catalog.measure_f64(Measure::Sgx),
        y: catalog.measure_f64(Measure::Sgy),
        z: catalog.measure_f64(Measure::Sgz),
        fill: Fill::Uniform(Color32::YELLOW),
        radius: 1.6,
        alpha: point_alpha,
        edge: None,
    };
    let mut figure = Figure::space(
        "Vector field of galaxy motion with galaxies plotted",
        Plot::Space3d {
            scatters: vec![galaxies],
            arrows: Some(motion_arrows(catalog)),
        },
    );
    figure.legend = true;
    figure
}

pub fn magnitude_histogram(catalog: &Catalog) -> Figure {
    Figure {
        title: "Distribution of the distance modulus (DM)".to_string(),
        x_label: "Distance modulus (DM)".to_string(),
        y_label: "Frequency".to_string(),
        z_label: None,
        plot: Plot::Histogram(Histogram {
            values: catalog.measure_f64(Measure::Dm),
            bins: HISTOGRAM_BINS,
            fill: Color32::BLUE,
            alpha: 0.7,
            edge: Color32::BLACK,
        }),
        colorbar: None,
        legend: false,
        grid: true,
    }
}

/// SGX against SGY, coloured by distance modulus.
pub fn scatter_with_magnitude(catalog: &Catalog) -> Figure {
    let values = catalog.measure_f64(Measure::Dm);
    let scale = ColorScale::from_values(ColorMap::Blues, &values);
    let scatter = Scatter {
        name: None,
        x: catalog.measure_f64(Measure::Sgx),
        y: catalog.measure_f64(Measure::Sgy),
        z: Vec::new(),
        fill: Fill::Mapped {
            values,
            scale: scale.clone(),
        },
        radius: 3.0,
        alpha: 0.6,
        edge: Some(Color32::BLACK),
    };
    Figure {
        title: "Scatter plot coloured by distance modulus".to_string(),
        x_label: SGX_LABEL.to_string(),
        y_label: SGY_LABEL.to_string(),
        z_label: None,
        plot: Plot::Plane {
            scatters: vec![scatter],
        },
        colorbar: Some(Colorbar {
            scale,
            label: "Distance modulus (DM)".to_string(),
        }),
        legend: false,
        grid: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::COLUMNS;

    fn catalog(rows: &[[(&str, &str); 6]]) -> Catalog {
        let raw: Vec<Vec<Option<String>>> = rows
            .iter()
            .map(|cells| {
                COLUMNS
                    .iter()
                    .map(|col| {
                        cells
                            .iter()
                            .find(|(name, _)| name == col)
                            .map(|(_, v)| v.to_string())
                    })
                    .collect()
            })
            .collect();
        Catalog::from_rows(raw, &COLUMNS).unwrap()
    }

    fn sample() -> Catalog {
        catalog(&[
            [("SGX", "10.0"), ("SGY", "0.0"), ("SGZ", "0.0"), ("DM", "32.5"), ("eDM", ""), ("Vcmb", "1000")],
            [("SGX", "bad"), ("SGY", "5.0"), ("SGZ", "5.0"), ("DM", "30.0"), ("eDM", "0.2"), ("Vcmb", "0")],
            [("SGX", "1.0"), ("SGY", "2.0"), ("SGZ", "3.0"), ("DM", "34.0"), ("eDM", "0.4"), ("Vcmb", "")],
        ])
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn motion_vector_is_unit_length_times_scale() {
        let [u, v, w] = motion_vector(1500.0, 0.3, ARROW_LENGTH);
        assert!(close((u * u + v * v).sqrt(), ARROW_LENGTH));
        assert!(close(u, 0.3f64.cos() * ARROW_LENGTH));
        assert!(close(v, 0.3f64.sin() * ARROW_LENGTH));
        assert_eq!(w, 0.0);
    }

    #[test]
    fn negative_velocity_flips_direction() {
        let [u, v, _] = motion_vector(-20.0, 0.0, 1.0);
        assert!(close(u, -1.0));
        assert!(close(v, 0.0));
    }

    #[test]
    fn undefined_motion_is_nan() {
        assert!(motion_vector(0.0, 1.0, 1.0)[0].is_nan());
        assert!(motion_vector(f64::NAN, 1.0, 1.0)[1].is_nan());
        assert!(motion_vector(100.0, f64::NAN, 1.0)[0].is_nan());
    }

    #[test]
    fn arrows_keep_one_entry_per_row() {
        let figure = vector_field(&sample());
        let Plot::Space3d { scatters, arrows } = figure.plot else {
            panic!("vector field should be 3D");
        };
        assert!(scatters.is_empty());
        let arrows = arrows.unwrap();
        assert_eq!(arrows.origins.len(), 3);
        assert_eq!(arrows.directions.len(), 3);
        assert!(arrows.origins[1][0].is_nan());
        assert!(close(arrows.directions[0][0], ARROW_LENGTH));
        assert!(arrows.directions[1][0].is_nan());
        assert!(arrows.directions[2][0].is_nan());
    }

    #[test]
    fn galaxies_3d_colours_by_dm() {
        let figure = galaxies_3d(&sample());
        assert_eq!(figure.z_label.as_deref(), Some("SGZ [Mpc]"));
        let colorbar = figure.colorbar.unwrap();
        assert_eq!(colorbar.scale.map, ColorMap::Plasma);
        assert_eq!((colorbar.scale.min, colorbar.scale.max), (30.0, 34.0));

        let Plot::Space3d { scatters, .. } = figure.plot else {
            panic!("expected 3D plot");
        };
        assert_eq!(scatters[0].len(), 3);
        assert!(scatters[0].x[1].is_nan());
    }

    #[test]
    fn error_map_uses_edm_range() {
        let figure = galaxies_by_error(&sample());
        let colorbar = figure.colorbar.unwrap();
        assert_eq!(colorbar.scale.map, ColorMap::Oranges);
        assert_eq!((colorbar.scale.min, colorbar.scale.max), (0.2, 0.4));
    }

    #[test]
    fn overlay_uses_requested_alpha() {
        let figure = vector_field_with_galaxies(&sample(), 0.25);
        assert!(figure.legend);
        let Plot::Space3d { scatters, arrows } = figure.plot else {
            panic!("expected 3D plot");
        };
        assert_eq!(scatters[0].alpha, 0.25);
        assert_eq!(scatters[0].name.as_deref(), Some("Galaxies"));
        assert!(arrows.is_some());
    }

    #[test]
    fn histogram_has_thirty_bins_and_counts_finite_values() {
        let figure = magnitude_histogram(&sample());
        let Plot::Histogram(h) = figure.plot else {
            panic!("expected histogram");
        };
        let bins = h.compute_bins();
        assert_eq!(bins.len(), HISTOGRAM_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
        assert_eq!(bins[0].lo, 30.0);
        assert!(close(bins[HISTOGRAM_BINS - 1].hi, 34.0));
        // Max value lands in the closed last bin.
        assert_eq!(bins[HISTOGRAM_BINS - 1].count, 1);
    }

    #[test]
    fn histogram_of_constant_values_is_widened() {
        let h = Histogram {
            values: vec![31.0, 31.0, f64::NAN],
            bins: 10,
            fill: Color32::BLUE,
            alpha: 1.0,
            edge: Color32::BLACK,
        };
        let bins = h.compute_bins();
        assert_eq!(bins.len(), 10);
        assert!(close(bins[0].lo, 30.5));
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn histogram_without_values_is_empty() {
        let h = Histogram {
            values: vec![f64::NAN],
            bins: 30,
            fill: Color32::BLUE,
            alpha: 1.0,
            edge: Color32::BLACK,
        };
        assert!(h.compute_bins().is_empty());
    }

    #[test]
    fn planar_scatter_has_no_z() {
        let figure = scatter_with_magnitude(&sample());
        assert!(figure.grid);
        assert!(figure.z_label.is_none());
        let Plot::Plane { scatters } = figure.plot else {
            panic!("expected planar plot");
        };
        assert!(scatters[0].z.is_empty());
        assert_eq!(scatters[0].edge, Some(Color32::BLACK));
    }
}
