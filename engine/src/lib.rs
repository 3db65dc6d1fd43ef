mod assemble;
mod csv_out;
mod error;
mod grid;
mod header;
mod mapper;
mod model;
mod options;
mod pipeline;
mod schema;
mod warning;

use std::path::Path;

use crate::csv_out::{write_csv, write_csv_to_string};
use crate::pipeline::run_pipeline;

pub use assemble::{Appended, LogicalTable, Placement, TableAssembler, assemble_tables};
pub use error::{ExtractError, RowRejection};
pub use grid::{CellGrid, MAX_GRID_CELLS, build_grid};
pub use header::{DEFAULT_HEADER_LOOKAHEAD, HeaderMatch, classify_header};
pub use mapper::{is_blank_row, map_row};
pub use model::{
    ExtractionResult, FieldValue, RecognizedCell, RecognizedDocument, RecognizedPage,
    RecognizedTable, SourceRow, ThroughputRecord,
};
pub use options::{ExtractOptions, PageSelection};
pub use schema::{ColumnSchema, FieldDescriptor, FieldType, HeaderRegistry, REQUIRED_FIELDS};
pub use warning::{ExtractWarning, WarningCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub record_count: usize,
    pub table_count: usize,
    pub warnings: Vec<ExtractWarning>,
}

fn validate_options(options: &ExtractOptions) -> Result<(), ExtractError> {
    if options.header_lookahead == 0 {
        return Err(ExtractError::InvalidOption(
            "header_lookahead must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn extract_with_report(
    document: &RecognizedDocument,
    options: &ExtractOptions,
) -> Result<(ExtractionResult, usize), ExtractError> {
    validate_options(options)?;
    let output = run_pipeline(document, options)?;
    Ok((output.result, output.logical_tables))
}

fn report_for(result: &ExtractionResult, table_count: usize) -> ExtractionReport {
    ExtractionReport {
        record_count: result.records.len(),
        table_count,
        warnings: result.warnings.clone(),
    }
}

pub fn extract_document(
    document: &RecognizedDocument,
    options: &ExtractOptions,
) -> Result<ExtractionResult, ExtractError> {
    extract_with_report(document, options).map(|(result, _)| result)
}

pub fn parse_document_json(json: &str) -> Result<RecognizedDocument, ExtractError> {
    Ok(serde_json::from_str(json)?)
}

pub fn extract_json_str(
    json: &str,
    options: &ExtractOptions,
) -> Result<ExtractionResult, ExtractError> {
    extract_document(&parse_document_json(json)?, options)
}

pub fn result_to_csv_string(
    result: &ExtractionResult,
    options: &ExtractOptions,
) -> Result<String, ExtractError> {
    write_csv_to_string(result, options)
}

pub fn result_to_json_string(result: &ExtractionResult) -> Result<String, ExtractError> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn extract_json_to_csv(
    input_json: &Path,
    output_csv: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    let json = std::fs::read_to_string(input_json)?;
    let (result, table_count) = extract_with_report(&parse_document_json(&json)?, options)?;
    write_csv(output_csv, &result, options)?;
    Ok(report_for(&result, table_count))
}

pub fn extract_json_to_json(
    input_json: &Path,
    output_json: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    let json = std::fs::read_to_string(input_json)?;
    let (result, table_count) = extract_with_report(&parse_document_json(&json)?, options)?;
    std::fs::write(output_json, result_to_json_string(&result)?)?;
    Ok(report_for(&result, table_count))
}

pub fn extract_json_to_csv_string(
    json: &str,
    options: &ExtractOptions,
) -> Result<(String, ExtractionReport), ExtractError> {
    let (result, table_count) = extract_with_report(&parse_document_json(json)?, options)?;
    let csv = write_csv_to_string(&result, options)?;
    Ok((csv, report_for(&result, table_count)))
}
