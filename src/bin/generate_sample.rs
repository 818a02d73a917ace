use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use cf4_explorer::config::DEFAULT_CATALOG;
use cf4_explorer::data::model::{Measure, COLUMNS};

/// Hubble constant used to turn distances into velocities, km/s/Mpc.
const H0: f64 = 75.0;

/// Minimal deterministic PRNG (xoshiro256**, Blackman & Vigna), seeded
/// through an LCG so a fixed seed always writes the same catalog.
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Cluster centres in supergalactic coordinates (Mpc) and their spread.
const CLUSTERS: [([f64; 3], f64, usize); 4] = [
    ([-3.0, 16.0, -1.0], 3.0, 400),   // Virgo-like
    ([-2.0, 70.0, 10.0], 6.0, 300),   // Coma-like
    ([-45.0, -20.0, -5.0], 8.0, 250), // Centaurus-like
    ([50.0, -10.0, -30.0], 7.0, 250), // Perseus-Pisces-like
];
const FIELD_GALAXIES: usize = 1800;
const FIELD_RADIUS: f64 = 200.0;

fn positions(rng: &mut SimpleRng) -> Vec<[f64; 3]> {
    let mut out = Vec::new();
    for &(centre, spread, n) in &CLUSTERS {
        for _ in 0..n {
            out.push([
                rng.gauss(centre[0], spread),
                rng.gauss(centre[1], spread),
                rng.gauss(centre[2], spread),
            ]);
        }
    }
    // Field galaxies: uniform in a ball, by rejection.
    while out.len() < CLUSTERS.iter().map(|c| c.2).sum::<usize>() + FIELD_GALAXIES {
        let p = [
            rng.uniform(-FIELD_RADIUS, FIELD_RADIUS),
            rng.uniform(-FIELD_RADIUS, FIELD_RADIUS),
            rng.uniform(-FIELD_RADIUS, FIELD_RADIUS),
        ];
        let r2: f64 = p.iter().map(|v| v * v).sum();
        if r2 <= FIELD_RADIUS * FIELD_RADIUS && r2 > 1.0 {
            out.push(p);
        }
    }
    out
}

fn fmt(v: f64, decimals: usize) -> Option<String> {
    Some(format!("{v:.decimals$}"))
}

fn galaxy_row(id: usize, p: [f64; 3], rng: &mut SimpleRng) -> Vec<Option<String>> {
    let d = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
    let dm = 5.0 * d.log10() + 25.0;
    let edm = rng.uniform(0.15, 0.5);
    let vcmb = H0 * d + rng.gauss(0.0, 300.0);
    let sgl = p[1].atan2(p[0]).to_degrees().rem_euclid(360.0);
    let sgb = (p[2] / d).asin().to_degrees();

    let mut row = vec![None; COLUMNS.len()];
    let mut set = |name: &str, value: Option<String>| {
        if let Some(idx) = COLUMNS.iter().position(|c| *c == name) {
            row[idx] = value;
        }
    };

    let pgc = (id + 2).to_string();
    set("PGC_ID", Some(pgc.clone()));
    set("1PGC", Some(pgc));
    set("T17", rng.chance(0.3).then(|| "1".to_string()));
    set(Measure::Vcmb.name(), fmt(vcmb, 0));
    // A few rows without a usable distance modulus.
    set(
        Measure::Dm.name(),
        if rng.chance(0.01) { Some("--".to_string()) } else { fmt(dm, 3) },
    );
    set(Measure::EDm.name(), fmt(edm, 3));
    if rng.chance(0.6) {
        set(Measure::DmTf.name(), fmt(dm + rng.gauss(0.0, edm), 3));
        set("eDMtf", fmt(edm * 1.1, 3));
    }
    if rng.chance(0.05) {
        set(Measure::DmSnIa.name(), fmt(dm + rng.gauss(0.0, 0.1), 3));
        set("eDMsn1", fmt(0.1, 3));
    }
    if rng.chance(0.15) {
        set("DMfp", fmt(dm + rng.gauss(0.0, edm), 3));
        set("eDMfp", fmt(edm, 3));
    }
    set("sgl", fmt(sgl, 5));
    set("sgb", fmt(sgb, 5));
    set(Measure::Sgx.name(), fmt(p[0], 2));
    set(Measure::Sgy.name(), fmt(p[1], 2));
    set(Measure::Sgz.name(), fmt(p[2], 2));
    row
}

fn write_votable(path: &Path, rows: &[Vec<Option<String>>]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = Writer::new_with_indent(BufWriter::new(file), b' ', 1);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("VOTABLE").with_attributes([
        ("version", "1.2"),
        ("xmlns", "http://www.ivoa.net/xml/VOTable/v1.2"),
    ])))?;
    writer.write_event(Event::Start(BytesStart::new("RESOURCE")))?;
    writer.write_event(Event::Start(
        BytesStart::new("TABLE").with_attributes([("name", "allCf4")]),
    ))?;

    for name in COLUMNS {
        let datatype = if Measure::from_name(name).is_some() { "double" } else { "char" };
        writer.write_event(Event::Empty(
            BytesStart::new("FIELD").with_attributes([("name", name), ("datatype", datatype)]),
        ))?;
    }

    writer.write_event(Event::Start(BytesStart::new("DATA")))?;
    writer.write_event(Event::Start(BytesStart::new("TABLEDATA")))?;
    for row in rows {
        writer.write_event(Event::Start(BytesStart::new("TR")))?;
        for cell in row {
            match cell {
                Some(text) => {
                    writer.write_event(Event::Start(BytesStart::new("TD")))?;
                    writer.write_event(Event::Text(BytesText::new(text)))?;
                    writer.write_event(Event::End(BytesEnd::new("TD")))?;
                }
                None => writer.write_event(Event::Empty(BytesStart::new("TD")))?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new("TR")))?;
    }
    for tag in ["TABLEDATA", "DATA", "TABLE", "RESOURCE", "VOTABLE"] {
        writer.write_event(Event::End(BytesEnd::new(tag)))?;
    }
    writer.into_inner().flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let rows: Vec<Vec<Option<String>>> = positions(&mut rng)
        .into_iter()
        .enumerate()
        .map(|(id, p)| galaxy_row(id, p, &mut rng))
        .collect();

    let output_path = Path::new(DEFAULT_CATALOG);
    if let Some(dir) = output_path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    write_votable(output_path, &rows)?;

    println!(
        "Wrote {} synthetic galaxies ({} columns each) to {}",
        rows.len(),
        COLUMNS.len(),
        output_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_gives_same_catalog() {
        let mut a = SimpleRng::new(42);
        let mut b = SimpleRng::new(42);
        let rows_a: Vec<_> = positions(&mut a)
            .into_iter()
            .enumerate()
            .map(|(id, p)| galaxy_row(id, p, &mut a))
            .collect();
        let rows_b: Vec<_> = positions(&mut b)
            .into_iter()
            .enumerate()
            .map(|(id, p)| galaxy_row(id, p, &mut b))
            .collect();
        assert_eq!(rows_a, rows_b);
        assert_eq!(rows_a.len(), 1200 + FIELD_GALAXIES);
    }

    #[test]
    fn rows_fill_the_schema() {
        let mut rng = SimpleRng::new(7);
        let row = galaxy_row(0, [3.0, 4.0, 0.0], &mut rng);
        assert_eq!(row.len(), COLUMNS.len());

        let cell = |name: &str| {
            let idx = COLUMNS.iter().position(|c| *c == name).unwrap();
            row[idx].clone()
        };
        assert_eq!(cell("PGC_ID").as_deref(), Some("2"));
        assert_eq!(cell("SGX").as_deref(), Some("3.00"));
        assert_eq!(cell("SGZ").as_deref(), Some("0.00"));
        assert!(cell("eDM").is_some());
        assert!(cell("RA").is_none());
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = SimpleRng::new(1);
        for _ in 0..1000 {
            let v = rng.uniform(-2.0, 5.0);
            assert!((-2.0..5.0).contains(&v));
        }
    }
}
