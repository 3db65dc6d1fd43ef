use crate::error::ExtractError;
use crate::grid::CellGrid;
use crate::schema::{ColumnSchema, HeaderRegistry};

pub const DEFAULT_HEADER_LOOKAHEAD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMatch<'r> {
    pub header_row: usize,
    pub first_data_row: usize,
    pub schema: &'r ColumnSchema,
}

pub(crate) fn normalize_label(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn trimmed_len(cells: &[String]) -> usize {
    cells
        .iter()
        .rposition(|cell| !cell.trim().is_empty())
        .map_or(0, |index| index + 1)
}

pub(crate) fn row_matches_schema(cells: &[String], schema: &ColumnSchema) -> bool {
    if schema.is_empty() || trimmed_len(cells) != schema.len() {
        return false;
    }

    cells.iter().zip(&schema.fields).all(|(cell, field)| {
        let text = normalize_label(cell);
        field
            .labels
            .iter()
            .any(|label| normalize_label(label) == text)
    })
}

pub fn classify_header<'r>(
    grid: &CellGrid,
    registry: &'r HeaderRegistry,
    lookahead: usize,
) -> Result<HeaderMatch<'r>, ExtractError> {
    for (index, cells) in grid.rows().take(lookahead).enumerate() {
        if let Some(schema) = registry
            .schemas
            .iter()
            .find(|schema| row_matches_schema(cells, schema))
        {
            return Ok(HeaderMatch {
                header_row: index,
                first_data_row: index + 1,
                schema,
            });
        }
    }

    Err(ExtractError::SchemaNotRecognized {
        page: grid.page,
        table: grid.table,
        lookahead,
    })
}

#[cfg(test)]
mod tests {
    use super::{classify_header, normalize_label};
    use crate::error::ExtractError;
    use crate::grid::grid_from_rows;
    use crate::schema::HeaderRegistry;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_label("  Hour   of\tDay "), "hour of day");
    }

    #[test]
    fn finds_header_below_title_rows() {
        let grid = grid_from_rows(
            0,
            0,
            &[
                &["TSA Throughput Data"],
                &["Date", "Hour", "Checkpoint", "Throughput"],
                &["2021-03-01", "0600", "Terminal A", "512"],
            ],
        );
        let registry = HeaderRegistry::default();
        let found = classify_header(&grid, &registry, 3).expect("header found");
        assert_eq!(found.header_row, 1);
        assert_eq!(found.first_data_row, 2);
        assert_eq!(found.schema.name, "tsa-throughput-compact");
    }

    #[test]
    fn matches_full_foia_layout_ignoring_trailing_blank_cells() {
        let grid = grid_from_rows(
            0,
            0,
            &[&[
                "Date",
                "Hour of Day",
                "Airport",
                "Name",
                "City",
                "State",
                "Checkpoint",
                "Total Throughput",
                "",
            ]],
        );
        let registry = HeaderRegistry::default();
        let found = classify_header(&grid, &registry, 3).expect("header found");
        assert_eq!(found.schema.name, "tsa-throughput-v1");
    }

    #[test]
    fn shifted_leading_column_is_not_recognized() {
        let grid = grid_from_rows(
            1,
            2,
            &[&["Region", "Date", "Hour", "Checkpoint", "Throughput"]],
        );
        let registry = HeaderRegistry::default();
        let err = classify_header(&grid, &registry, 3).expect_err("no header");
        assert!(matches!(
            err,
            ExtractError::SchemaNotRecognized {
                page: 1,
                table: 2,
                lookahead: 3
            }
        ));
    }

    #[test]
    fn header_beyond_lookahead_is_ignored() {
        let grid = grid_from_rows(
            0,
            0,
            &[
                &["a"],
                &["b"],
                &["Date", "Hour", "Checkpoint", "Throughput"],
            ],
        );
        let registry = HeaderRegistry::default();
        assert!(classify_header(&grid, &registry, 2).is_err());
        assert!(classify_header(&grid, &registry, 3).is_ok());
    }
}
