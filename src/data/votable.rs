use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use super::error::CatalogError;
use super::model::RawRow;

/// Namespace prefix shared by every VOTable version (`.../v1.2`, `.../v1.3`, ...).
pub const VOTABLE_NS_PREFIX: &str = "http://www.ivoa.net/xml/VOTable/";

/// The parts of a VOTable document the catalog needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoTable {
    /// `name` attribute of each `FIELD`, in declaration order.
    pub fields: Vec<String>,
    /// `TABLEDATA` rows, one cell per `TD`.
    pub rows: Vec<RawRow>,
}

pub fn parse_file(path: &Path) -> Result<VoTable, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    parse_str(&text)
}

fn in_votable_ns(ns: &ResolveResult<'_>) -> bool {
    match ns {
        ResolveResult::Bound(ns) => ns.as_ref().starts_with(VOTABLE_NS_PREFIX.as_bytes()),
        _ => false,
    }
}

/// Parse the `FIELD` header and the `TR`/`TD` body of a VOTable.
///
/// Only elements bound to the VOTable namespace are considered. The root must
/// be a namespaced `VOTABLE`, and at least one `TABLE` must be present.
pub fn parse_str(xml: &str) -> Result<VoTable, CatalogError> {
    let mut reader = NsReader::from_str(xml);

    let mut table = VoTable::default();
    let mut saw_root = false;
    let mut saw_table = false;
    // Row being assembled, and the text of the cell currently open.
    let mut row: Option<RawRow> = None;
    let mut cell: Option<Option<String>> = None;
    // Open elements, and whether the root element has been closed.
    let mut depth = 0usize;
    let mut root_closed = false;

    loop {
        let (ns, event) = match reader.read_resolved_event() {
            Ok(next) => next,
            Err(e) => return Err(xml_error(&reader, e)),
        };
        let votable = in_votable_ns(&ns);

        match event {
            Event::Start(_) | Event::Empty(_) if root_closed => {
                return Err(xml_error(&reader, "content after the root element"));
            }
            Event::Start(_) => depth += 1,
            Event::Empty(_) if depth == 0 => root_closed = true,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                root_closed = depth == 0;
            }
            Event::Eof if depth > 0 => {
                return Err(xml_error(&reader, "unexpected end of document"));
            }
            _ => {}
        }

        match event {
            Event::Start(ref e) | Event::Empty(ref e) if !saw_root => {
                if !(votable && e.local_name().as_ref() == b"VOTABLE") {
                    let found = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Err(CatalogError::MissingNamespace { found });
                }
                saw_root = true;
            }
            Event::Start(ref e) if votable => match e.local_name().as_ref() {
                b"TABLE" => saw_table = true,
                b"TR" => row = Some(Vec::new()),
                b"TD" if row.is_some() => cell = Some(None),
                b"FIELD" => table.fields.push(field_name(e, &reader)?),
                _ => {}
            },
            Event::Empty(ref e) if votable => match e.local_name().as_ref() {
                b"TABLE" => saw_table = true,
                b"TR" => table.rows.push(Vec::new()),
                b"TD" => {
                    if let Some(r) = row.as_mut() {
                        r.push(None);
                    }
                }
                b"FIELD" => table.fields.push(field_name(e, &reader)?),
                _ => {}
            },
            Event::Text(ref t) => {
                if let Some(content) = cell.as_mut() {
                    let text = t.unescape().map_err(|e| xml_error(&reader, e))?;
                    content.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Event::CData(ref c) => {
                if let Some(content) = cell.as_mut() {
                    content
                        .get_or_insert_with(String::new)
                        .push_str(&String::from_utf8_lossy(c));
                }
            }
            Event::End(ref e) if votable => match e.local_name().as_ref() {
                b"TD" => {
                    if let (Some(r), Some(content)) = (row.as_mut(), cell.take()) {
                        r.push(content);
                    }
                }
                b"TR" => {
                    if let Some(r) = row.take() {
                        table.rows.push(r);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(CatalogError::MissingNamespace {
            found: String::new(),
        });
    }
    if !saw_table {
        return Err(CatalogError::NoTable);
    }
    Ok(table)
}

fn xml_error(reader: &NsReader<&[u8]>, err: impl ToString) -> CatalogError {
    CatalogError::Xml {
        position: reader.buffer_position() as u64,
        message: err.to_string(),
    }
}

fn field_name(e: &BytesStart<'_>, reader: &NsReader<&[u8]>) -> Result<String, CatalogError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_error(reader, err))?;
        if attr.key.as_ref() == b"name" {
            let value = attr.unescape_value().map_err(|err| xml_error(reader, err))?;
            return Ok(value.into_owned());
        }
    }
    Ok(String::new())
}
