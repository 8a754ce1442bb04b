use serde::Serialize;

/// One parsed CSV file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawTable {
    /// Column names, taken from the first record of the file.
    pub headers: Vec<String>,
    /// Every following record, as a Vec of Strings (one per field).
    /// Rows may be shorter or longer than `headers`.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Split parsed records into header + data rows. A leading UTF-8 BOM is
    /// stripped from the header cells.
    pub fn from_records(records: Vec<Vec<String>>) -> Self {
        let mut records = records.into_iter();
        let headers = records
            .next()
            .map(|header| {
                header
                    .into_iter()
                    .map(|h| h.trim_start_matches('\u{feff}').to_string())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            headers,
            rows: records.collect(),
        }
    }

    /// Data rows with at least one non-whitespace cell.
    pub fn data_rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows
            .iter()
            .map(Vec::as_slice)
            .filter(|row| !is_blank_row(row))
    }
}

/// True when every cell is empty or whitespace.
pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Cell text at `idx`, or "" when the row is too short.
pub fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Same as [`cell`] for an optionally-resolved column.
pub fn opt_cell(row: &[String], idx: Option<usize>) -> &str {
    idx.map(|i| cell(row, i)).unwrap_or("")
}

/// Filename → table map used for classification, in upload order.
///
/// Keys are lower-cased. The first table stored under a key is kept; later
/// files with the same name are ignored.
#[derive(Debug, Default)]
pub struct ParsedDatasets<'a> {
    entries: Vec<(String, &'a RawTable)>,
}

impl<'a> ParsedDatasets<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the key was already taken.
    pub fn insert(&mut self, filename: &str, table: &'a RawTable) -> bool {
        let key = filename.to_lowercase();
        if self.entries.iter().any(|(k, _)| *k == key) {
            return false;
        }
        self.entries.push((key, table));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &'a RawTable)> + '_ {
        self.entries.iter().map(|(k, t)| (k.as_str(), *t))
    }

    pub fn filenames(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
