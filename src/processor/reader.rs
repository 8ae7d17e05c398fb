//! Raw dataset reading
//!
//! Loads a delimited export with polars, keeping every cell as text. Schema
//! inference is disabled so that prices, ranks and ids are never guessed
//! into numbers before the field parsers see them.

use crate::error::{ListingError, Result};
use crate::models::RawTable;
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Read a delimited file with a header row into a [`RawTable`]
pub fn read_raw_table(path: &Path, separator: u8) -> Result<RawTable> {
    if !path.exists() {
        return Err(ListingError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!(
        "Reading {} with separator '{}'",
        path.display(),
        separator as char
    );

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|options| {
            options
                .with_separator(separator)
                .with_missing_is_null(false)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| ListingError::ProcessingFailed {
            path: path.to_path_buf(),
            reason: format!("Failed to read delimited input: {}", e),
        })?;

    let table = frame_to_raw_table(&df)?;
    debug!(
        "Read {} rows x {} columns from {}",
        table.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

/// Convert a frame into row-major text cells
pub fn frame_to_raw_table(df: &DataFrame) -> Result<RawTable> {
    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut columns: Vec<Vec<Option<String>>> = Vec::with_capacity(headers.len());
    for column in df.get_columns() {
        let series = column.as_materialized_series().cast(&DataType::String)?;
        let values = series
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect();
        columns.push(values);
    }

    let rows = (0..df.height())
        .map(|row| {
            columns
                .iter()
                .map(|column| column.get(row).cloned().flatten())
                .collect()
        })
        .collect();

    Ok(RawTable::new(headers, rows))
}
