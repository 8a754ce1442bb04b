use csv::ReaderBuilder;
use std::io::{Cursor, Read};
use tracing::debug;

use super::{error::IngestError, raw_table::RawTable};

/// Parse one CSV buffer into a [`RawTable`]. The header row is kept as the
/// first record; invalid UTF-8 is replaced rather than rejected.
pub fn parse_csv(file_name: &str, data: &[u8]) -> Result<RawTable, IngestError> {
    let text = String::from_utf8_lossy(data);
    read_table(file_name, Cursor::new(text.as_bytes()))
}

/// Read every record from `reader`. Any reader error aborts with
/// [`IngestError::Parse`].
pub fn read_table<R: Read>(file_name: &str, reader: R) -> Result<RawTable, IngestError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // exports are ragged; short rows read as empty cells downstream
        .from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|source| IngestError::Parse {
            file: file_name.to_string(),
            source,
        })?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let table = RawTable::from_records(records);
    debug!(
        file = file_name,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "parsed csv"
    );
    Ok(table)
}
