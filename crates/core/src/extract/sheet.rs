use calamine::{open_workbook, Data, Range, Reader, Xls, Xlsx};
use std::path::Path;

use super::ExtractError;
use crate::types::{Location, MatchRecord};

/// Legacy binary workbook. Records carry the lower-cased cell value and stop
/// for a sheet once `sheet_limit` matches have been reported.
pub fn search_xls(
    path: &Path,
    term: &str,
    sheet_limit: usize,
) -> Result<Vec<MatchRecord>, ExtractError> {
    let mut workbook: Xls<_> = open_workbook(path).map_err(spreadsheet_error)?;
    let needle = term.to_lowercase();

    let mut records = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name).map_err(spreadsheet_error)?;
        records.extend(scan_capped(&name, absolute_cells(&range), &needle, sheet_limit));
    }
    Ok(records)
}

/// Modern workbook read from cached (formula-evaluated) values.
pub fn search_xlsx(path: &Path, term: &str) -> Result<Vec<MatchRecord>, ExtractError> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(spreadsheet_error)?;
    let needle = term.to_lowercase();

    let mut records = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name).map_err(spreadsheet_error)?;
        records.extend(
            absolute_cells(&range)
                .filter(|(_, _, value)| value.to_lowercase().contains(&needle))
                .map(|(row, col, value)| {
                    MatchRecord::new(
                        Location::SheetCoordinate {
                            sheet: name.clone(),
                            coordinate: cell_reference(row, col),
                        },
                        value,
                    )
                }),
        );
    }
    Ok(records)
}

fn spreadsheet_error(err: impl std::fmt::Display) -> ExtractError {
    ExtractError::Spreadsheet(err.to_string())
}

/// Non-empty cells as 0-based sheet coordinates in row-major order.
fn absolute_cells(range: &Range<Data>) -> impl Iterator<Item = (usize, usize, String)> + '_ {
    let (row0, col0) = range.start().unwrap_or((0, 0));
    range.used_cells().map(move |(row, col, value)| {
        (row0 as usize + row, col0 as usize + col, value.to_string())
    })
}

fn scan_capped(
    sheet: &str,
    cells: impl Iterator<Item = (usize, usize, String)>,
    needle: &str,
    limit: usize,
) -> Vec<MatchRecord> {
    let mut records = Vec::new();
    let mut found = 0;

    for (row, col, value) in cells {
        let value = value.to_lowercase();
        if !value.contains(needle) {
            continue;
        }

        records.push(MatchRecord::new(
            Location::SheetCell {
                sheet: sheet.to_string(),
                row: row + 1,
                column: col + 1,
            },
            value,
        ));
        found += 1;

        if found >= limit {
            records.push(MatchRecord::new(
                Location::MoreInSheet {
                    sheet: sheet.to_string(),
                },
                "",
            ));
            break;
        }
    }

    records
}

/// 0-based (row, col) to an A1-style reference.
pub(crate) fn cell_reference(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect::<String>() + &(row + 1).to_string()
}
