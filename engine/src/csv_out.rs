use std::io::Write;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::error::ExtractError;
use crate::model::ExtractionResult;
use crate::options::ExtractOptions;
use crate::schema::HeaderRegistry;

const PROVENANCE_COLUMNS: [&str; 3] = ["page", "table", "row"];

fn field_columns(result: &ExtractionResult, registry: &HeaderRegistry) -> Vec<String> {
    let mut seen_schemas = Vec::<&str>::new();
    let mut columns = Vec::<String>::new();

    for record in &result.records {
        if seen_schemas.contains(&record.schema.as_str()) {
            continue;
        }
        seen_schemas.push(record.schema.as_str());
        let names: Vec<&String> = match registry.get(&record.schema) {
            Some(schema) => schema.fields.iter().map(|field| &field.name).collect(),
            None => record.fields.keys().collect(),
        };
        for name in names {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }

    columns
}

fn write_records<W: Write>(
    writer: &mut Writer<W>,
    result: &ExtractionResult,
    columns: &[String],
    no_provenance: bool,
) -> Result<(), ExtractError> {
    let mut header = Vec::with_capacity(columns.len() + PROVENANCE_COLUMNS.len());
    if !no_provenance {
        header.extend(PROVENANCE_COLUMNS.iter().map(|name| (*name).to_string()));
    }
    header.extend(columns.iter().cloned());
    writer.write_record(&header)?;

    for record in &result.records {
        let mut row = Vec::with_capacity(header.len());
        if !no_provenance {
            row.push(record.page.to_string());
            row.push(record.table.to_string());
            row.push(record.row.to_string());
        }
        row.extend(columns.iter().map(|name| {
            record
                .get(name)
                .map(ToString::to_string)
                .unwrap_or_default()
        }));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

pub(crate) fn write_csv(
    path: &Path,
    result: &ExtractionResult,
    options: &ExtractOptions,
) -> Result<(), ExtractError> {
    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_path(path)?;
    let columns = field_columns(result, &options.registry);
    write_records(&mut writer, result, &columns, options.no_provenance)
}

pub(crate) fn write_csv_to_string(
    result: &ExtractionResult,
    options: &ExtractOptions,
) -> Result<String, ExtractError> {
    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(Vec::<u8>::new());
    let columns = field_columns(result, &options.registry);
    write_records(&mut writer, result, &columns, options.no_provenance)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ExtractError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| ExtractError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{field_columns, write_csv_to_string};
    use crate::model::{ExtractionResult, FieldValue, ThroughputRecord};
    use crate::options::ExtractOptions;
    use crate::schema::HeaderRegistry;

    fn record(schema: &str, fields: &[(&str, FieldValue)]) -> ThroughputRecord {
        ThroughputRecord {
            schema: schema.to_string(),
            page: 0,
            table: 0,
            row: 1,
            fields: fields
                .iter()
                .map(|(name, value)| ((*name).to_string(), value.clone()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn unions_columns_in_schema_order() {
        let result = ExtractionResult {
            records: vec![
                record("tsa-throughput-compact", &[("count", FieldValue::Integer(1))]),
                record("tsa-throughput-v1", &[("count", FieldValue::Integer(2))]),
                record("unregistered", &[("lane", FieldValue::Text("3".into()))]),
            ],
            warnings: Vec::new(),
        };
        assert_eq!(
            field_columns(&result, &HeaderRegistry::default()),
            vec![
                "date",
                "hour",
                "checkpoint",
                "count",
                "airport",
                "airport_name",
                "city",
                "state",
                "lane"
            ]
        );
    }

    #[test]
    fn writes_csv_with_and_without_provenance() {
        let result = ExtractionResult {
            records: vec![record(
                "tsa-throughput-compact",
                &[
                    ("checkpoint", FieldValue::Text("Terminal A".into())),
                    ("count", FieldValue::Integer(1512)),
                ],
            )],
            warnings: Vec::new(),
        };

        let csv = write_csv_to_string(&result, &ExtractOptions::default()).expect("csv");
        assert_eq!(
            csv,
            "page,table,row,date,hour,checkpoint,count\n0,0,1,,,Terminal A,1512\n"
        );

        let options = ExtractOptions {
            delimiter: b';',
            no_provenance: true,
            ..ExtractOptions::default()
        };
        let bare = write_csv_to_string(&result, &options).expect("csv");
        assert_eq!(bare, "date;hour;checkpoint;count\n;;Terminal A;1512\n");
    }
}
