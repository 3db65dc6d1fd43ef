use crate::error::ExtractError;
use crate::model::RecognizedCell;
use crate::warning::{ExtractWarning, WarningCode};

pub const MAX_GRID_CELLS: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    pub page: usize,
    pub table: usize,
    rows: Vec<Vec<String>>,
    width: usize,
}

impl CellGrid {
    #[must_use]
    pub fn empty(page: usize, table: usize) -> Self {
        Self {
            page,
            table,
            rows: Vec::new(),
            width: 0,
        }
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map_or("", String::as_str)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

fn checked_index(
    cell: &RecognizedCell,
    page: usize,
    table: usize,
) -> Result<(usize, usize), ExtractError> {
    let malformed = || ExtractError::MalformedCellIndex {
        page,
        table,
        row: cell.row_index,
        column: cell.column_index,
    };
    let row = usize::try_from(cell.row_index).map_err(|_| malformed())?;
    let column = usize::try_from(cell.column_index).map_err(|_| malformed())?;
    Ok((row, column))
}

pub fn build_grid(
    page: usize,
    table: usize,
    cells: &[RecognizedCell],
) -> Result<(CellGrid, Vec<ExtractWarning>), ExtractError> {
    let positions = cells
        .iter()
        .map(|cell| checked_index(cell, page, table))
        .collect::<Result<Vec<_>, _>>()?;

    let Some(max_row) = positions.iter().map(|(row, _)| *row).max() else {
        return Ok((CellGrid::empty(page, table), Vec::new()));
    };
    let max_column = positions
        .iter()
        .map(|(_, column)| *column)
        .max()
        .unwrap_or(0);
    let too_large = || ExtractError::GridTooLarge {
        page,
        table,
        row: max_row,
        column: max_column,
        limit: MAX_GRID_CELLS,
    };
    let height = max_row.checked_add(1).ok_or_else(too_large)?;
    let width = max_column.checked_add(1).ok_or_else(too_large)?;
    if height
        .checked_mul(width)
        .is_none_or(|slots| slots > MAX_GRID_CELLS)
    {
        return Err(too_large());
    }

    let mut slots: Vec<Vec<Option<&str>>> = vec![vec![None; width]; height];
    let mut warnings = Vec::new();
    for ((row, column), cell) in positions.into_iter().zip(cells) {
        let slot = &mut slots[row][column];
        if let Some(previous) = slot.replace(cell.text.as_str()) {
            warnings.push(
                ExtractWarning::new(
                    WarningCode::DuplicateCell,
                    format!(
                        "duplicate cell at column {column}; replaced {previous:?} with {:?}",
                        cell.text
                    ),
                )
                .with_page(page)
                .with_table(table)
                .with_row(row),
            );
        }
    }

    let rows = slots
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|text| text.unwrap_or_default().to_string())
                .collect()
        })
        .collect();

    Ok((
        CellGrid {
            page,
            table,
            rows,
            width,
        },
        warnings,
    ))
}

#[cfg(test)]
pub(crate) fn grid_from_rows(page: usize, table: usize, rows: &[&[&str]]) -> CellGrid {
    let cells = rows
        .iter()
        .enumerate()
        .flat_map(|(row, texts)| {
            texts.iter().enumerate().map(move |(column, text)| {
                RecognizedCell::new(row as i64, column as i64, *text)
            })
        })
        .collect::<Vec<_>>();
    build_grid(page, table, &cells)
        .expect("test rows have valid indices")
        .0
}
