use crate::error::ExtractError;
use crate::grid::CellGrid;
use crate::header::classify_header;
use crate::model::SourceRow;
use crate::schema::{ColumnSchema, HeaderRegistry};
use crate::warning::{ExtractWarning, WarningCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalTable {
    pub schema: ColumnSchema,
    pub rows: Vec<SourceRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    NewTable,
    RepeatedHeader,
    Continuation,
}

#[derive(Debug, Clone)]
pub struct Appended<'r> {
    pub placement: Placement,
    pub schema: &'r ColumnSchema,
    pub rows: Vec<SourceRow>,
}

fn source_rows(grid: &CellGrid, first_data_row: usize) -> Vec<SourceRow> {
    grid.rows()
        .enumerate()
        .skip(first_data_row)
        .map(|(row, cells)| SourceRow {
            page: grid.page,
            table: grid.table,
            row,
            cells: cells.to_vec(),
        })
        .collect()
}

pub struct TableAssembler<'r> {
    registry: &'r HeaderRegistry,
    lookahead: usize,
    current: Option<&'r ColumnSchema>,
}

impl<'r> TableAssembler<'r> {
    #[must_use]
    pub fn new(registry: &'r HeaderRegistry, lookahead: usize) -> Self {
        Self {
            registry,
            lookahead,
            current: None,
        }
    }

    #[must_use]
    pub fn current_schema(&self) -> Option<&'r ColumnSchema> {
        self.current
    }

    pub fn push(&mut self, grid: &CellGrid) -> Result<Appended<'r>, ExtractError> {
        let (placement, schema, first_data_row) =
            match classify_header(grid, self.registry, self.lookahead) {
                Ok(found) => {
                    let placement = if self
                        .current
                        .is_some_and(|schema| schema.name == found.schema.name)
                    {
                        Placement::RepeatedHeader
                    } else {
                        Placement::NewTable
                    };
                    (placement, found.schema, found.first_data_row)
                }
                Err(error) => match self.current {
                    Some(schema) if grid.width() <= schema.len() => {
                        (Placement::Continuation, schema, 0)
                    }
                    _ => return Err(error),
                },
            };

        self.current = Some(schema);
        Ok(Appended {
            placement,
            schema,
            rows: source_rows(grid, first_data_row),
        })
    }
}

pub fn assemble_tables(
    grids: &[CellGrid],
    registry: &HeaderRegistry,
    lookahead: usize,
) -> (Vec<LogicalTable>, Vec<ExtractWarning>) {
    let mut assembler = TableAssembler::new(registry, lookahead);
    let mut tables = Vec::<LogicalTable>::new();
    let mut warnings = Vec::new();

    for grid in grids {
        match assembler.push(grid) {
            Ok(appended) => {
                if appended.placement == Placement::NewTable {
                    tables.push(LogicalTable {
                        schema: appended.schema.clone(),
                        rows: appended.rows,
                    });
                } else if let Some(table) = tables.last_mut() {
                    table.rows.extend(appended.rows);
                }
            }
            Err(error) => warnings.push(
                ExtractWarning::new(WarningCode::SchemaNotRecognized, error.to_string())
                    .with_page(grid.page)
                    .with_table(grid.table),
            ),
        }
    }

    (tables, warnings)
}
