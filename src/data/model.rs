use std::fmt;

use super::error::CatalogError;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Column order of the CF4 `allCf4` table, as published in the VOTable.
pub const COLUMNS: [&str; 31] = [
    "PGC_ID", "1PGC", "T17", "Vcmb", "DM", "eDM", "DMsnIa", "eDMsn1", "DMtf", "eDMtf", "DMfp",
    "eDMfp", "DMsbf", "eDMsbf", "DMsnII", "eDMsn2", "DMtrgb", "eDMt", "DMcep", "eDMcep", "DMmas",
    "eDMmas", "RA", "DE", "glon", "glat", "sgl", "sgb", "SGX", "SGY", "SGZ",
];

/// One row as it comes out of the loader: a cell per column, `None` for empty
/// cells.
pub type RawRow = Vec<Option<String>>;

// ---------------------------------------------------------------------------
// Measure – the numeric columns
// ---------------------------------------------------------------------------

/// The columns that are coerced to numbers when the catalog is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    /// Distance modulus.
    Dm,
    /// Distance modulus from type Ia supernovae.
    DmSnIa,
    /// Distance modulus from the Tully-Fisher relation.
    DmTf,
    /// Error on `DM`.
    EDm,
    Sgx,
    Sgy,
    Sgz,
    /// Velocity in the CMB rest frame.
    Vcmb,
}

impl Measure {
    pub const ALL: [Measure; 8] = [
        Measure::Dm,
        Measure::DmSnIa,
        Measure::DmTf,
        Measure::EDm,
        Measure::Sgx,
        Measure::Sgy,
        Measure::Sgz,
        Measure::Vcmb,
    ];

    /// Column name in the catalog.
    pub fn name(self) -> &'static str {
        match self {
            Measure::Dm => "DM",
            Measure::DmSnIa => "DMsnIa",
            Measure::DmTf => "DMtf",
            Measure::EDm => "eDM",
            Measure::Sgx => "SGX",
            Measure::Sgy => "SGY",
            Measure::Sgz => "SGZ",
            Measure::Vcmb => "Vcmb",
        }
    }

    pub fn from_name(name: &str) -> Option<Measure> {
        Measure::ALL.into_iter().find(|m| m.name() == name)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coerce a raw cell to a number.
///
/// Anything that does not parse (empty, text, `NaN`) is "no data" rather than
/// an error.
pub fn coerce_number(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().parse().ok()?;
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

// ---------------------------------------------------------------------------
// Catalog – the complete loaded table
// ---------------------------------------------------------------------------

/// Presence count and range of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureSummary {
    pub measure: Measure,
    pub present: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl fmt::Display for MeasureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => write!(
                f,
                "{}: {} values in [{lo:.3}, {hi:.3}]",
                self.measure, self.present
            ),
            _ => write!(f, "{}: no values", self.measure),
        }
    }
}

/// The galaxy table. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Catalog {
    column_names: Vec<String>,
    columns: Vec<Column>,
    /// Index into `columns` for each entry of [`Measure::ALL`].
    measure_index: [usize; 8],
    n_rows: usize,
}

impl Catalog {
    /// Bind rows to `column_names` positionally and coerce the measure columns.
    ///
    /// Every row must have exactly one cell per column name.
    pub fn from_rows<S: AsRef<str>>(
        rows: Vec<RawRow>,
        column_names: &[S],
    ) -> Result<Self, CatalogError> {
        let names: Vec<String> = column_names.iter().map(|s| s.as_ref().to_string()).collect();

        let mut measure_index = [0usize; 8];
        for (slot, measure) in measure_index.iter_mut().zip(Measure::ALL) {
            *slot = names
                .iter()
                .position(|n| n == measure.name())
                .ok_or(CatalogError::MissingColumn(measure.name()))?;
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != names.len() {
                return Err(CatalogError::SchemaMismatch {
                    row: i,
                    expected: names.len(),
                    found: row.len(),
                });
            }
        }

        let n_rows = rows.len();
        let mut cells: Vec<Vec<Option<String>>> =
            (0..names.len()).map(|_| Vec::with_capacity(n_rows)).collect();
        for row in rows {
            for (col, cell) in cells.iter_mut().zip(row) {
                col.push(cell);
            }
        }

        let columns = names
            .iter()
            .zip(cells)
            .map(|(name, values)| {
                if Measure::from_name(name).is_some() {
                    Column::Numeric(values.iter().map(|v| coerce_number(v.as_deref())).collect())
                } else {
                    Column::Text(values)
                }
            })
            .collect();

        Ok(Catalog {
            column_names: names,
            columns,
            measure_index,
            n_rows,
        })
    }

    /// Values of a numeric column, `None` where the cell had no number.
    pub fn measure(&self, measure: Measure) -> &[Option<f64>] {
        let idx = self.measure_index[measure as usize];
        match &self.columns[idx] {
            Column::Numeric(v) => v,
            Column::Text(_) => &[],
        }
    }

    /// Like [`measure`](Self::measure) but with missing values as `NaN`, the
    /// form the chart layer consumes.
    pub fn measure_f64(&self, measure: Measure) -> Vec<f64> {
        self.measure(measure)
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        let idx = self.column_names.iter().position(|n| n == name)?;
        self.columns.get(idx)
    }

    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.column(name)? {
            Column::Numeric(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&[Option<String>]> {
        match self.column(name)? {
            Column::Text(v) => Some(v),
            Column::Numeric(_) => None,
        }
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Number of galaxies.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn summary(&self) -> Vec<MeasureSummary> {
        Measure::ALL
            .into_iter()
            .map(|measure| {
                let present: Vec<f64> = self.measure(measure).iter().flatten().copied().collect();
                let min = present.iter().copied().reduce(f64::min);
                let max = present.iter().copied().reduce(f64::max);
                MeasureSummary {
                    measure,
                    present: present.len(),
                    min,
                    max,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        COLUMNS
            .iter()
            .map(|col| {
                cells
                    .iter()
                    .find(|(name, _)| name == col)
                    .map(|(_, v)| v.to_string())
                    .filter(|v| !v.is_empty())
            })
            .collect()
    }

    #[test]
    fn coerce_number_accepts_signed_and_exponent_forms() {
        assert_eq!(coerce_number(Some("32.5")), Some(32.5));
        assert_eq!(coerce_number(Some("-7")), Some(-7.0));
        assert_eq!(coerce_number(Some("+1.5e3")), Some(1500.0));
        assert_eq!(coerce_number(Some(" 4.25 ")), Some(4.25));
        assert_eq!(coerce_number(Some("2E-2")), Some(0.02));
    }

    #[test]
    fn coerce_number_maps_garbage_to_missing() {
        assert_eq!(coerce_number(None), None);
        assert_eq!(coerce_number(Some("")), None);
        assert_eq!(coerce_number(Some("bad")), None);
        assert_eq!(coerce_number(Some("NaN")), None);
        assert_eq!(coerce_number(Some("1.2.3")), None);
    }

    #[test]
    fn two_row_catalog_coerces_measures() {
        let rows = vec![
            row(&[("SGX", "10.0"), ("SGY", "0.0"), ("SGZ", "0.0"), ("DM", "32.5"), ("eDM", "")]),
            row(&[("SGX", "bad"), ("SGY", "5.0"), ("SGZ", "5.0"), ("DM", "30.0"), ("eDM", "0.2")]),
        ];
        let catalog = Catalog::from_rows(rows, &COLUMNS).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.measure(Measure::Dm), &[Some(32.5), Some(30.0)]);
        assert_eq!(catalog.measure(Measure::EDm), &[None, Some(0.2)]);
        assert_eq!(catalog.measure(Measure::Sgx), &[Some(10.0), None]);
        assert_eq!(catalog.numeric("SGY"), Some(&[Some(0.0), Some(5.0)][..]));
    }

    #[test]
    fn only_measure_columns_are_numeric() {
        let rows = vec![row(&[("PGC_ID", "2"), ("RA", "0.0073"), ("DM", "34.1")])];
        let catalog = Catalog::from_rows(rows, &COLUMNS).unwrap();

        let numeric: Vec<&str> = COLUMNS
            .iter()
            .copied()
            .filter(|name| catalog.numeric(name).is_some())
            .collect();
        assert_eq!(numeric.len(), 8);
        for m in Measure::ALL {
            assert!(numeric.contains(&m.name()), "{m} should be numeric");
        }

        // Text columns keep the raw cell, even when it looks numeric.
        assert_eq!(catalog.text("PGC_ID"), Some(&[Some("2".to_string())][..]));
        assert_eq!(catalog.text("RA"), Some(&[Some("0.0073".to_string())][..]));
        assert_eq!(catalog.text("DM"), None);
    }

    #[test]
    fn row_length_mismatch_is_rejected() {
        let mut short = row(&[("DM", "33.0")]);
        short.pop();
        let rows = vec![row(&[("DM", "31.0")]), short];

        match Catalog::from_rows(rows, &COLUMNS) {
            Err(CatalogError::SchemaMismatch {
                row,
                expected,
                found,
            }) => {
                assert_eq!(row, 1);
                assert_eq!(expected, 31);
                assert_eq!(found, 30);
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn schema_without_measure_column_is_rejected() {
        let names = ["PGC_ID", "DM"];
        let err = Catalog::from_rows(vec![], &names).unwrap_err();
        assert!(matches!(err, CatalogError::MissingColumn("DMsnIa")));
    }

    #[test]
    fn empty_catalog_is_valid() {
        let catalog = Catalog::from_rows(vec![], &COLUMNS).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.measure(Measure::Vcmb).is_empty());
        assert_eq!(catalog.column_names().len(), 31);
    }

    #[test]
    fn summary_counts_present_values() {
        let rows = vec![
            row(&[("DM", "30.0"), ("Vcmb", "1200")]),
            row(&[("DM", "35.5")]),
            row(&[("DM", "x")]),
        ];
        let catalog = Catalog::from_rows(rows, &COLUMNS).unwrap();
        let summary = catalog.summary();

        let dm = summary.iter().find(|s| s.measure == Measure::Dm).unwrap();
        assert_eq!(dm.present, 2);
        assert_eq!(dm.min, Some(30.0));
        assert_eq!(dm.max, Some(35.5));

        let sgz = summary.iter().find(|s| s.measure == Measure::Sgz).unwrap();
        assert_eq!(sgz.present, 0);
        assert_eq!(sgz.to_string(), "SGZ: no values");
    }

    #[test]
    fn measure_f64_uses_nan_for_missing() {
        let rows = vec![row(&[("SGZ", "1.5")]), row(&[("SGZ", "")])];
        let catalog = Catalog::from_rows(rows, &COLUMNS).unwrap();
        let sgz = catalog.measure_f64(Measure::Sgz);
        assert_eq!(sgz[0], 1.5);
        assert!(sgz[1].is_nan());
    }
}
