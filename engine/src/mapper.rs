use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::RowRejection;
use crate::model::{FieldValue, SourceRow, ThroughputRecord};
use crate::schema::{ColumnSchema, FieldType};

static HOUR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<hour>\d{1,2})(?::?(?P<minute>\d{2}))?\s*(?P<meridiem>[ap]\.?m\.?)?$")
        .expect("hardcoded hour regex is valid")
});

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }

    let parts = value.split('/').map(str::trim).collect::<Vec<_>>();
    let [month, day, year] = parts.as_slice() else {
        return None;
    };
    if !parts
        .iter()
        .all(|part| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit()))
    {
        return None;
    }
    let month = month.parse::<u32>().ok()?;
    let day = day.parse::<u32>().ok()?;
    let year = match year.len() {
        4 => year.parse::<i32>().ok()?,
        2 => 2000 + year.parse::<i32>().ok()?,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Hour of day (0-23). Ranges such as `06:00 - 06:59` use their start.
pub(crate) fn parse_hour(value: &str) -> Option<u64> {
    let start = value
        .split(['-', '–'])
        .next()
        .map(str::trim)
        .filter(|start| !start.is_empty())?;
    let captures = HOUR_RE.captures(start)?;

    // `0600` splits as hour=06, minute=00; minutes never change the hour.
    let hour = captures.name("hour")?.as_str().parse::<u64>().ok()?;
    let minute = captures
        .name("minute")
        .map_or(Ok(0), |minute| minute.as_str().parse::<u64>())
        .ok()?;
    if minute > 59 {
        return None;
    }
    let meridiem = captures
        .name("meridiem")
        .map(|value| value.as_str().to_ascii_lowercase());

    match meridiem.as_deref().map(|m| m.starts_with('p')) {
        None if hour <= 23 => Some(hour),
        Some(false) if (1..=12).contains(&hour) => Some(hour % 12),
        Some(true) if (1..=12).contains(&hour) => Some(hour % 12 + 12),
        _ => None,
    }
}

pub(crate) fn parse_integer(value: &str) -> Option<u64> {
    let digits = value
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect::<String>();
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok()
}

fn parse_field(field_type: FieldType, text: &str) -> Option<FieldValue> {
    match field_type {
        FieldType::Date => parse_date(text).map(FieldValue::Date),
        FieldType::Hour => parse_hour(text).map(FieldValue::Integer),
        FieldType::Integer => parse_integer(text).map(FieldValue::Integer),
        FieldType::Text => Some(FieldValue::Text(collapse_whitespace(text))),
    }
}

#[must_use]
pub fn is_blank_row(cells: &[String]) -> bool {
    cells.iter().all(|cell| cell.trim().is_empty())
}

pub fn map_row(row: &SourceRow, schema: &ColumnSchema) -> Result<ThroughputRecord, RowRejection> {
    let mut fields = BTreeMap::new();

    for (index, field) in schema.fields.iter().enumerate() {
        let Some(text) = row.cells.get(index) else {
            if field.required {
                return Err(RowRejection::for_field(
                    &field.name,
                    format!(
                        "row has {} cell(s) but schema '{}' expects {}; missing required field '{}'",
                        row.cells.len(),
                        schema.name,
                        schema.len(),
                        field.name
                    ),
                ));
            }
            continue;
        };

        if text.trim().is_empty() {
            if field.required {
                return Err(RowRejection::for_field(
                    &field.name,
                    format!("required field '{}' is empty", field.name),
                ));
            }
            continue;
        }

        let value = parse_field(field.field_type, text).ok_or_else(|| {
            RowRejection::for_field(
                &field.name,
                format!(
                    "field '{}' value {:?} is not a valid {:?}",
                    field.name,
                    text.trim(),
                    field.field_type
                ),
            )
        })?;
        fields.insert(field.name.clone(), value);
    }

    Ok(ThroughputRecord {
        schema: schema.name.clone(),
        page: row.page,
        table: row.table,
        row: row.row,
        fields,
    })
}
