// Spreadsheet import (xlsx, xlsm, xls, xlsb, ods) and export (xlsx only)
//
// Import: cell values come from calamine; layout (widths, heights, merges) is
// read from the worksheet XML for zip-based formats.
// Export: values, merges and layout hints written back with rust_xlsxwriter.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};

use gamesheets_engine::cell::CellValue;
use gamesheets_engine::layout::{HeightUnit, LayoutHints, MergeRange, SourceLayout, WidthUnit};
use gamesheets_engine::matrix::Matrix;

use crate::error::IoError;
use crate::xlsx_layout;
use crate::DecodedSheet;

/// Export statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportResult {
    pub sheets_exported: usize,
    pub cells_exported: usize,
    pub merges_exported: usize,
    /// Merges dropped because they overlap one already written.
    pub merges_skipped: usize,
}

/// Import every sheet of a workbook. `with_layout` reads widths, heights and
/// merges from the zip container (xlsx/xlsm only).
pub fn import(path: &Path, with_layout: bool) -> Result<Vec<DecodedSheet>, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| IoError::Workbook(format!("failed to open '{}': {}", path.display(), e)))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(IoError::NoSheets);
    }

    let layouts = if with_layout {
        match xlsx_layout::read_workbook_layouts(path, &sheet_names) {
            Ok(layouts) => layouts,
            Err(e) => {
                log::warn!("layout unavailable for {}: {}", path.display(), e);
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for (idx, name) in sheet_names.iter().enumerate() {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| IoError::Workbook(format!("failed to read sheet '{}': {}", name, e)))?;

        // Range start offset (data may not begin at A1)
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
        for row in range.rows() {
            let mut cells = vec![CellValue::Empty; start_col as usize];
            cells.extend(row.iter().map(cell_value));
            rows.push(cells);
        }
        let matrix = Matrix::new(rows);

        let mut source = layouts.get(idx).cloned().unwrap_or_default();
        source.column_sizes.truncate(matrix.column_count());
        source.row_sizes.truncate(matrix.row_count());
        let hints = LayoutHints::from_source(&source);

        log::debug!(
            "imported sheet '{}': {} rows x {} cols, {} merges",
            name,
            matrix.row_count(),
            matrix.column_count(),
            hints.merges.len()
        );
        sheets.push(DecodedSheet { name: name.clone(), matrix, hints });
    }

    Ok(sheets)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        // Serial date number, 1900 system
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from(s.as_str()),
    }
}

/// Export sheets to an XLSX file.
pub fn export(sheets: &[DecodedSheet], path: &Path) -> Result<ExportResult, IoError> {
    if sheets.is_empty() {
        return Err(IoError::NoSheets);
    }

    let mut result = ExportResult::default();
    let mut xlsx_workbook = XlsxWorkbook::new();

    for sheet in sheets {
        let worksheet = xlsx_workbook
            .add_worksheet()
            .set_name(&sheet.name)
            .map_err(|e| IoError::Write(format!("failed to create sheet '{}': {}", sheet.name, e)))?;

        // Merges first: merge_range() writes blanks across the range and the
        // anchor value is written over it below.
        let merge_format = Format::new();
        let mut written: Vec<MergeRange> = Vec::new();
        for merge in &sheet.hints.merges {
            if merge.is_single_cell() {
                continue;
            }
            if written.iter().any(|w| overlaps(w, merge)) {
                log::warn!("sheet '{}': skipping overlapping merge {:?}", sheet.name, merge);
                result.merges_skipped += 1;
                continue;
            }
            let (first_row, first_col) = sheet_pos(merge.start_row, merge.start_col)?;
            let (last_row, last_col) = sheet_pos(merge.end_row, merge.end_col)?;
            worksheet.merge_range(first_row, first_col, last_row, last_col, "", &merge_format)?;
            written.push(*merge);
            result.merges_exported += 1;
        }

        result.cells_exported += export_sheet_cells(&sheet.matrix, &sheet.hints, worksheet)?;
        apply_layout(worksheet, &sheet.hints.to_source(WidthUnit::Characters, HeightUnit::Points))?;
        result.sheets_exported += 1;
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| IoError::Write(format!("failed to save '{}': {}", path.display(), e)))?;

    log::debug!(
        "exported {} sheets, {} cells, {} merges to {}",
        result.sheets_exported,
        result.cells_exported,
        result.merges_exported,
        path.display()
    );
    Ok(result)
}

/// XLSX cell position, or a write error when the index cannot be addressed.
fn sheet_pos(row: usize, col: usize) -> Result<(u32, u16), IoError> {
    let row32 = u32::try_from(row).map_err(|_| IoError::Write(format!("row {} is beyond the xlsx grid", row + 1)))?;
    let col16 = u16::try_from(col).map_err(|_| IoError::Write(format!("column {} is beyond the xlsx grid", col + 1)))?;
    Ok((row32, col16))
}

fn overlaps(a: &MergeRange, b: &MergeRange) -> bool {
    a.start_row <= b.end_row && b.start_row <= a.end_row && a.start_col <= b.end_col && b.start_col <= a.end_col
}

fn export_sheet_cells(matrix: &Matrix, hints: &LayoutHints, worksheet: &mut Worksheet) -> Result<usize, IoError> {
    let mut cells_exported = 0;
    for (row, cells) in matrix.rows().iter().enumerate() {
        for (col, value) in cells.iter().enumerate() {
            // Only the anchor of a merge carries a value
            if hints.coverage(row, col) == gamesheets_engine::layout::MergeCoverage::Covered {
                continue;
            }
            if value.is_empty() {
                continue;
            }
            let (row32, col16) = sheet_pos(row, col)?;
            match value {
                CellValue::Empty => continue,
                CellValue::Text(s) => {
                    worksheet.write_string(row32, col16, s)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(row32, col16, *n)?;
                }
                CellValue::Boolean(b) => {
                    worksheet.write_boolean(row32, col16, *b)?;
                }
            }
            cells_exported += 1;
        }
    }
    Ok(cells_exported)
}

fn apply_layout(worksheet: &mut Worksheet, layout: &SourceLayout) -> Result<(), IoError> {
    for (col, size) in layout.column_sizes.iter().enumerate() {
        if let Some(size) = size {
            let (_, col16) = sheet_pos(0, col)?;
            worksheet
                .set_column_width(col16, size.value)
                .map_err(|e| IoError::Write(format!("failed to set column {} width: {}", col, e)))?;
        }
    }

    for (row, size) in layout.row_sizes.iter().enumerate() {
        if let Some(size) = size {
            let (row32, _) = sheet_pos(row, 0)?;
            worksheet
                .set_row_height(row32, size.value)
                .map_err(|e| IoError::Write(format!("failed to set row {} height: {}", row, e)))?;
        }
    }

    Ok(())
}
