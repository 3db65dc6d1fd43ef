use tracing::{debug, warn};

use crate::assemble::{Placement, TableAssembler};
use crate::error::ExtractError;
use crate::grid::build_grid;
use crate::mapper::{is_blank_row, map_row};
use crate::model::{ExtractionResult, RecognizedDocument};
use crate::options::ExtractOptions;
use crate::warning::{ExtractWarning, WarningCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    AwaitingHeader,
    Mapping,
    Done,
}

#[derive(Debug, Default)]
struct Tally {
    tables: usize,
    malformed_tables: usize,
    non_empty_grids: usize,
    logical_tables: usize,
}

#[derive(Debug)]
pub(crate) struct PipelineOutput {
    pub result: ExtractionResult,
    pub logical_tables: usize,
}

pub(crate) fn run_pipeline(
    document: &RecognizedDocument,
    options: &ExtractOptions,
) -> Result<PipelineOutput, ExtractError> {
    let mut state = PipelineState::AwaitingHeader;
    let mut assembler = TableAssembler::new(&options.registry, options.header_lookahead);
    let mut result = ExtractionResult::default();
    let mut tally = Tally::default();

    for (page, recognized_page) in document.pages.iter().enumerate() {
        if options
            .pages
            .as_ref()
            .is_some_and(|selection| !selection.contains_index(page))
        {
            debug!(page, "page outside selection; skipping");
            continue;
        }

        for (table, recognized_table) in recognized_page.tables.iter().enumerate() {
            tally.tables += 1;
            let grid = match build_grid(page, table, &recognized_table.cells) {
                Ok((grid, duplicates)) => {
                    result.warnings.extend(duplicates);
                    grid
                }
                Err(error) => {
                    tally.malformed_tables += 1;
                    result.warnings.push(
                        ExtractWarning::new(WarningCode::MalformedCellIndex, error.to_string())
                            .with_page(page)
                            .with_table(table),
                    );
                    continue;
                }
            };
            if !grid.is_empty() {
                tally.non_empty_grids += 1;
            }

            let appended = match assembler.push(&grid) {
                Ok(appended) => appended,
                Err(error) => {
                    result.warnings.push(
                        ExtractWarning::new(WarningCode::SchemaNotRecognized, error.to_string())
                            .with_page(page)
                            .with_table(table),
                    );
                    continue;
                }
            };

            if appended.placement == Placement::NewTable {
                tally.logical_tables += 1;
                debug!(page, table, schema = %appended.schema.name, "header matched");
                state = PipelineState::Mapping;
            }

            for row in &appended.rows {
                if is_blank_row(&row.cells) {
                    result.warnings.push(
                        ExtractWarning::new(WarningCode::BlankRowSkipped, "row has no text")
                            .with_page(row.page)
                            .with_table(row.table)
                            .with_row(row.row),
                    );
                    continue;
                }

                match map_row(row, appended.schema) {
                    Ok(record) => result.records.push(record),
                    Err(rejection) => {
                        let mut warning =
                            ExtractWarning::new(WarningCode::RowRejected, rejection.reason)
                                .with_page(row.page)
                                .with_table(row.table)
                                .with_row(row.row);
                        if let Some(field) = rejection.field {
                            warning = warning.with_field(field);
                        }
                        result.warnings.push(warning);
                    }
                }
            }
        }
    }

    let never_matched = state == PipelineState::AwaitingHeader;
    state = PipelineState::Done;
    debug!(
        ?state,
        records = result.records.len(),
        warnings = result.warnings.len(),
        "document processed"
    );

    if tally.tables > 0 && tally.malformed_tables == tally.tables {
        warn!(tables = tally.tables, "every table has malformed cell indices");
        return Err(ExtractError::ExtractionFailed {
            reason: "every table has malformed cell indices".to_string(),
            warnings: result.warnings,
        });
    }

    if never_matched {
        if tally.non_empty_grids > 0 {
            warn!(grids = tally.non_empty_grids, "no known header in any table");
            return Err(ExtractError::ExtractionFailed {
                reason: "no known header was recognized in any table".to_string(),
                warnings: result.warnings,
            });
        }

        let already_reported = result
            .warnings
            .iter()
            .any(|warning| warning.code == WarningCode::SchemaNotRecognized);
        if !already_reported {
            result.warnings.push(ExtractWarning::new(
                WarningCode::SchemaNotRecognized,
                "document contains no recognized cells",
            ));
        }
    }

    Ok(PipelineOutput {
        result,
        logical_tables: tally.logical_tables,
    })
}

#[cfg(test)]
mod tests {
    use super::run_pipeline;
    use crate::error::ExtractError;
    use crate::model::{RecognizedCell, RecognizedDocument, RecognizedPage, RecognizedTable};
    use crate::options::ExtractOptions;
    use crate::warning::WarningCode;

    fn table(rows: &[&[&str]]) -> RecognizedTable {
        let cells = rows
            .iter()
            .enumerate()
            .flat_map(|(row, texts)| {
                texts.iter().enumerate().map(move |(column, text)| {
                    RecognizedCell::new(row as i64, column as i64, *text)
                })
            })
            .collect();
        RecognizedTable { cells }
    }

    fn document(pages: Vec<Vec<RecognizedTable>>) -> RecognizedDocument {
        RecognizedDocument {
            pages: pages
                .into_iter()
                .map(|tables| RecognizedPage { tables })
                .collect(),
        }
    }

    #[test]
    fn empty_document_warns_without_failing() {
        let output = run_pipeline(&RecognizedDocument::default(), &ExtractOptions::default())
            .expect("empty document is not fatal");
        assert!(output.result.records.is_empty());
        assert_eq!(output.result.warnings.len(), 1);
        assert_eq!(output.result.warnings[0].code, WarningCode::SchemaNotRecognized);
    }

    #[test]
    fn empty_tables_warn_once_each() {
        let doc = document(vec![vec![RecognizedTable::default()]]);
        let output = run_pipeline(&doc, &ExtractOptions::default()).expect("not fatal");
        assert!(output.result.records.is_empty());
        assert_eq!(output.result.warnings.len(), 1);
        assert_eq!(output.result.warnings[0].page, Some(0));
    }

    #[test]
    fn unrecognized_document_fails_with_warnings() {
        let doc = document(vec![vec![table(&[&["Name", "Age"], &["Alice", "30"]])]]);
        let err = run_pipeline(&doc, &ExtractOptions::default()).expect_err("no header anywhere");
        assert!(matches!(err, ExtractError::ExtractionFailed { .. }));
        assert_eq!(err.warnings().len(), 1);
        assert_eq!(err.warnings()[0].code, WarningCode::SchemaNotRecognized);
    }

    #[test]
    fn all_malformed_tables_fail() {
        let doc = document(vec![vec![RecognizedTable {
            cells: vec![RecognizedCell::new(-1, 0, "x")],
        }]]);
        let err = run_pipeline(&doc, &ExtractOptions::default()).expect_err("all malformed");
        assert_eq!(err.warnings()[0].code, WarningCode::MalformedCellIndex);
    }

    #[test]
    fn header_found_on_later_page_after_unrecognized_table() {
        let doc = document(vec![
            vec![table(&[&["Cover page"]])],
            vec![table(&[
                &["Date", "Hour", "Checkpoint", "Throughput"],
                &["2021-03-01", "0600", "Terminal A", "512"],
                &["", "", "", ""],
            ])],
        ]);
        let output = run_pipeline(&doc, &ExtractOptions::default()).expect("extracts");
        assert_eq!(output.result.records.len(), 1);
        assert_eq!(output.logical_tables, 1);
        let codes = output
            .result
            .warnings
            .iter()
            .map(|warning| warning.code)
            .collect::<Vec<_>>();
        assert_eq!(
            codes,
            vec![WarningCode::SchemaNotRecognized, WarningCode::BlankRowSkipped]
        );
    }
}
