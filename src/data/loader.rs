use std::path::Path;

use super::error::CatalogError;
use super::model::{Catalog, RawRow, COLUMNS};
use super::votable;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the catalog file and build the typed table with the CF4 schema.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let rows = load_rows(path)?;
    Catalog::from_rows(rows, &COLUMNS)
}

/// Read raw rows from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xml` / `.vot` – VOTable with a `TABLEDATA` body (the CF4 distribution format)
/// * `.csv`          – header row plus one record per galaxy, same column order
pub fn load_rows(path: &Path) -> Result<Vec<RawRow>, CatalogError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xml" | "vot" => load_votable(path),
        "csv" => load_csv(path),
        "" => Err(CatalogError::UnsupportedFormat("<none>".to_string())),
        other => Err(CatalogError::UnsupportedFormat(format!(".{other}"))),
    }
}

// ---------------------------------------------------------------------------
// VOTable loader
// ---------------------------------------------------------------------------

fn load_votable(path: &Path) -> Result<Vec<RawRow>, CatalogError> {
    let table = votable::parse_file(path)?;

    if !table.fields.is_empty() && table.fields != COLUMNS {
        log::warn!(
            "{}: FIELD header {:?} differs from the expected schema; binding by position",
            path.display(),
            table.fields
        );
    }

    Ok(table.rows)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row, then one record per galaxy.
/// Empty fields become missing cells.  Record lengths are not checked here so
/// the table builder reports them as a schema mismatch.
fn load_csv(path: &Path) -> Result<Vec<RawRow>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers != COLUMNS {
        log::warn!(
            "{}: CSV header {:?} differs from the expected schema; binding by position",
            path.display(),
            headers
        );
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: RawRow = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    None
                } else {
                    Some(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}
