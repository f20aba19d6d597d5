//! XLSX layout reader: column widths, row heights and merged ranges taken
//! straight from the worksheet XML inside the archive, since the cell reader
//! does not expose them.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

use gamesheets_engine::cell_id::CellAddr;
use gamesheets_engine::layout::{ColumnSize, HeightUnit, MergeRange, RowSize, SourceLayout, WidthUnit};

use crate::error::IoError;

/// Stored `<col width>` includes 5px of cell padding at the default 7px
/// digit width.
const COLUMN_PADDING_CHARS: f64 = 5.0 / 7.0;

/// Worksheet limits. Indices past them are malformed and ignored.
pub const MAX_ROWS: usize = 1_048_576;
pub const MAX_COLUMNS: usize = 16_384;

/// Parse one worksheet XML into a source layout.
///
/// Only explicit sizes (`customWidth` / `customHeight`) are kept; widths are
/// in characters, heights in points.
pub fn parse_sheet_layout(xml: &str) -> SourceLayout {
    let mut col_widths: BTreeMap<usize, f64> = BTreeMap::new();
    let mut row_heights: BTreeMap<usize, f64> = BTreeMap::new();
    let mut merges = Vec::new();

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" => {
                    if let Some((row, height)) = custom_row_height(&e) {
                        row_heights.insert(row, height);
                    }
                }
                b"col" => {
                    if let Some((first, last, width)) = custom_column_width(&e) {
                        let chars = (width - COLUMN_PADDING_CHARS).max(0.0);
                        for col in first..=last {
                            col_widths.insert(col, chars);
                        }
                    }
                }
                b"mergeCell" => {
                    if let Some(reference) = attr_text(&e, b"ref") {
                        match parse_merge_ref(&reference) {
                            Some(range) => merges.push(range),
                            None => log::warn!("ignoring malformed merge ref '{reference}'"),
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("worksheet XML parse stopped early: {e}");
                break;
            }
            _ => {}
        }
    }

    SourceLayout {
        column_sizes: dense(col_widths, |value| ColumnSize { value, unit: WidthUnit::Characters }),
        row_sizes: dense(row_heights, |value| RowSize { value, unit: HeightUnit::Points }),
        merges,
    }
}

/// `<row r="4" ht="45" customHeight="1">` → (3, 45.0).
fn custom_row_height(e: &BytesStart) -> Option<(usize, f64)> {
    if !attr_flag(e, b"customHeight") {
        return None;
    }
    let row = one_based(&attr_text(e, b"r")?, MAX_ROWS)?;
    let height = attr_text(e, b"ht")?.parse().ok()?;
    Some((row, height))
}

/// `<col min="3" max="4" width="8.7" customWidth="1">` → (2, 3, 8.7).
fn custom_column_width(e: &BytesStart) -> Option<(usize, usize, f64)> {
    if !attr_flag(e, b"customWidth") {
        return None;
    }
    let first = one_based(&attr_text(e, b"min")?, MAX_COLUMNS)?;
    let last = one_based(&attr_text(e, b"max")?, MAX_COLUMNS)?;
    let width = attr_text(e, b"width")?.parse().ok()?;
    (first <= last).then_some((first, last, width))
}

fn attr_text(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn attr_flag(e: &BytesStart, key: &[u8]) -> bool {
    matches!(attr_text(e, key).as_deref(), Some("1") | Some("true"))
}

/// 1-based index within `1..=limit` to 0-based.
fn one_based(text: &str, limit: usize) -> Option<usize> {
    let n: usize = text.trim().parse().ok()?;
    (1..=limit).contains(&n).then(|| n - 1)
}

fn dense<T>(sparse: BTreeMap<usize, f64>, make: impl Fn(f64) -> T) -> Vec<Option<T>> {
    let len = sparse.keys().next_back().map_or(0, |last| last + 1);
    let mut out: Vec<Option<T>> = (0..len).map(|_| None).collect();
    for (idx, value) in sparse {
        out[idx] = Some(make(value));
    }
    out
}

/// Parse a merge reference such as `C3:D5` or `$B$2:$AA$10`. Corners outside
/// the worksheet limits make the reference invalid.
pub fn parse_merge_ref(reference: &str) -> Option<MergeRange> {
    let (start, end) = reference.split_once(':')?;
    let start = sheet_cell(start)?;
    let end = sheet_cell(end)?;
    Some(MergeRange::new(start.row, start.col, end.row, end.col))
}

fn sheet_cell(reference: &str) -> Option<CellAddr> {
    let addr: CellAddr = reference.replace('$', "").parse().ok()?;
    (addr.row < MAX_ROWS && addr.col < MAX_COLUMNS).then_some(addr)
}

/// Read layouts for the named sheets of an XLSX file, in order. Sheets whose
/// XML cannot be located get an empty layout.
pub fn read_workbook_layouts(path: &Path, sheet_names: &[String]) -> Result<Vec<SourceLayout>, IoError> {
    let file = std::fs::File::open(path).map_err(|e| IoError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| IoError::Workbook(format!("not a ZIP container: {e}")))?;

    let workbook_xml = archive_text(&mut archive, "xl/workbook.xml")?;
    let rels_xml = archive_text(&mut archive, "xl/_rels/workbook.xml.rels")?;
    let entries = worksheet_entries(&workbook_xml, &rels_xml, sheet_names);

    let layouts = entries
        .iter()
        .zip(sheet_names)
        .map(|(entry, name)| {
            let xml = entry
                .as_deref()
                .ok_or_else(|| IoError::Workbook(format!("no worksheet part for '{name}'")))
                .and_then(|entry| archive_text(&mut archive, entry));
            match xml {
                Ok(xml) => parse_sheet_layout(&xml),
                Err(e) => {
                    log::debug!("no layout for sheet '{name}': {e}");
                    SourceLayout::default()
                }
            }
        })
        .collect();
    Ok(layouts)
}

fn archive_text<R: Read + Seek>(archive: &mut ZipArchive<R>, entry: &str) -> Result<String, IoError> {
    let mut file = archive
        .by_name(entry)
        .map_err(|e| IoError::Workbook(format!("missing '{entry}': {e}")))?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| IoError::Workbook(format!("unreadable '{entry}': {e}")))?;
    Ok(content)
}

/// Archive entry of each named sheet's XML, found through the sheet's
/// relationship id.
fn worksheet_entries(workbook_xml: &str, rels_xml: &str, sheet_names: &[String]) -> Vec<Option<String>> {
    let rel_ids: HashMap<String, String> = attribute_pairs(workbook_xml, b"sheet", b"name", b"r:id")
        .into_iter()
        .collect();
    let targets: HashMap<String, String> = attribute_pairs(rels_xml, b"Relationship", b"Id", b"Target")
        .into_iter()
        .collect();

    sheet_names
        .iter()
        .map(|name| {
            let target = targets.get(rel_ids.get(name)?)?;
            Some(match target.strip_prefix('/') {
                Some(absolute) => absolute.to_string(),
                None => format!("xl/{target}"),
            })
        })
        .collect()
}

/// `(first, second)` attribute values of every `tag` element carrying both.
fn attribute_pairs(xml: &str, tag: &[u8], first: &[u8], second: &[u8]) -> Vec<(String, String)> {
    let mut reader = Reader::from_str(xml);
    let mut pairs = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == tag => {
                if let (Some(a), Some(b)) = (attr_text(&e, first), attr_text(&e, second)) {
                    pairs.push((a, b));
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <cols>
    <col min="1" max="1" width="20.7109375" customWidth="1"/>
    <col min="3" max="4" width="8.7109375" customWidth="1"/>
    <col min="5" max="5" width="30" />
  </cols>
  <sheetData>
    <row r="1" ht="30" customHeight="1"><c r="A1" t="s"><v>0</v></c></row>
    <row r="2" ht="15"><c r="A2"><v>1</v></c></row>
    <row r="4" ht="45" customHeight="true"/>
  </sheetData>
  <mergeCells count="2">
    <mergeCell ref="A1:B1"/>
    <mergeCell ref="C3:D5"/>
  </mergeCells>
</worksheet>"#;

    #[test]
    fn test_parse_sheet_layout() {
        let layout = parse_sheet_layout(SHEET_XML);

        assert_eq!(layout.column_sizes.len(), 4);
        let widths: Vec<Option<f64>> = layout
            .column_sizes
            .iter()
            .map(|c| c.map(|c| (c.value * 100.0).round() / 100.0))
            .collect();
        assert_eq!(widths, vec![Some(20.0), None, Some(8.0), Some(8.0)]);
        assert!(layout.column_sizes[0].is_some_and(|c| c.unit == WidthUnit::Characters));

        assert_eq!(layout.row_sizes.len(), 4);
        assert_eq!(layout.row_sizes[0].map(|r| r.value), Some(30.0));
        assert_eq!(layout.row_sizes[1], None);
        assert_eq!(layout.row_sizes[3].map(|r| r.value), Some(45.0));
        assert!(layout.row_sizes[0].is_some_and(|r| r.unit == HeightUnit::Points));

        assert_eq!(
            layout.merges,
            vec![MergeRange::new(0, 0, 0, 1), MergeRange::new(2, 2, 4, 3)]
        );
    }

    #[test]
    fn test_whole_sheet_col_span_stops_at_last_column() {
        let xml = r#"<worksheet><cols><col min="2" max="16384" width="10" customWidth="1"/></cols></worksheet>"#;
        let layout = parse_sheet_layout(xml);
        assert_eq!(layout.column_sizes.len(), MAX_COLUMNS);
        assert!(layout.column_sizes[0].is_none());
        assert!(layout.column_sizes[MAX_COLUMNS - 1].is_some());
    }

    #[test]
    fn test_indices_past_sheet_limits_are_ignored() {
        let xml = r#"<worksheet>
            <cols><col min="3" max="90000" width="10" customWidth="1"/></cols>
            <sheetData>
              <row r="4000000000" ht="40" customHeight="1"/>
              <row r="0" ht="40" customHeight="1"/>
              <row r="2" ht="40" customHeight="1"/>
            </sheetData>
            <mergeCells><mergeCell ref="A1:A2000000"/><mergeCell ref="B2:C3"/></mergeCells>
        </worksheet>"#;
        let layout = parse_sheet_layout(xml);
        assert!(layout.column_sizes.is_empty());
        assert_eq!(layout.row_sizes.len(), 2);
        assert_eq!(layout.merges, vec![MergeRange::new(1, 1, 2, 2)]);
    }

    #[test]
    fn test_parse_merge_ref() {
        assert_eq!(parse_merge_ref("A1:C3"), Some(MergeRange::new(0, 0, 2, 2)));
        assert_eq!(parse_merge_ref("$B$2:$AA$10"), Some(MergeRange::new(1, 1, 9, 26)));
        assert_eq!(parse_merge_ref("D4:B2"), Some(MergeRange::new(1, 1, 3, 3)));
        assert_eq!(parse_merge_ref("A1"), None);
        assert_eq!(parse_merge_ref("A:C"), None);
        assert_eq!(parse_merge_ref("A1:XFE1"), None);
    }

    #[test]
    fn test_worksheet_entries() {
        let workbook = r#"<workbook><sheets>
            <sheet name="Quests" sheetId="1" r:id="rId1"/>
            <sheet name="Loot &amp; Gear" sheetId="2" r:id="rId2"/>
        </sheets></workbook>"#;
        let rels = r#"<Relationships>
            <Relationship Id="rId1" Target="worksheets/sheet1.xml"/>
            <Relationship Id="rId2" Target="/xl/worksheets/sheet2.xml"/>
        </Relationships>"#;
        let names = vec!["Loot & Gear".to_string(), "Quests".to_string(), "Missing".to_string()];
        assert_eq!(
            worksheet_entries(workbook, rels, &names),
            vec![
                Some("xl/worksheets/sheet2.xml".to_string()),
                Some("xl/worksheets/sheet1.xml".to_string()),
                None
            ]
        );
    }
}
