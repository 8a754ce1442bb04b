use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::{
    classify::DatasetKind,
    columns::{self, find_col_idx, find_exact_col_idx, resolve_all},
    normalize::{capitalize_name, format_phone_number, CapitalizeStyle},
    SkipReason,
};
use crate::ingest::raw_table::{cell, opt_cell, RawTable};

/// Prefix of names synthesized for lines with no display name.
pub const UNASSIGNED_LABEL: &str = "Unassigned line";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Regular,
    /// Display name was synthesized from a USER/DEPARTMENT owner.
    Unassigned,
}

/// One phone line from the lines export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineRecord {
    pub display_name: String,
    pub phone_number: String,
    pub raw_display_name: String,
    pub raw_name: String,
    pub desk_phone: String,
    pub kind: LineKind,
}

/// All lines for one rooftop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RooftopAggregate {
    pub rooftop_name: String,
    /// Taken from the last row seen for this rooftop.
    pub inbox_name: String,
    pub lines: Vec<LineRecord>,
}

impl RooftopAggregate {
    /// Regular lines, then unassigned ones; row order kept within each.
    pub fn ordered_lines(&self) -> impl Iterator<Item = &LineRecord> {
        let regular = self.lines.iter().filter(|l| l.kind == LineKind::Regular);
        let unassigned = self.lines.iter().filter(|l| l.kind == LineKind::Unassigned);
        regular.chain(unassigned)
    }
}

/// Lower-cased display name → desk phone, from the optional desk-phones export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeskPhoneLookup {
    phones: HashMap<String, String>,
}

impl DeskPhoneLookup {
    /// Build from the desk-phones table. Later rows win on duplicate names,
    /// including rows with a blank number. A table without usable columns
    /// gives an empty lookup.
    pub fn from_table(table: &RawTable) -> Self {
        let name_idx = columns::find_desk_phone_name_idx(&table.headers);
        let phone_idx = find_col_idx(&table.headers, columns::DESK_PHONE_NUMBER.fragments);

        let (Some(name_idx), Some(phone_idx)) = (name_idx, phone_idx) else {
            warn!(headers = ?table.headers, "desk phones file has no name/phone columns; ignoring it");
            return Self::default();
        };

        let mut phones = HashMap::new();
        for row in table.data_rows() {
            let name = cell(row, name_idx).trim().to_lowercase();
            let phone = cell(row, phone_idx).trim();
            if name.is_empty() {
                continue;
            }
            phones.insert(name, format_phone_number(phone));
        }
        debug!(entries = phones.len(), "built desk phone lookup");
        Self { phones }
    }

    /// Match on the trimmed, lower-cased raw display name. An empty name or
    /// an entry with no number never matches.
    pub fn get(&self, raw_display_name: &str) -> Option<&str> {
        let key = raw_display_name.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.phones
            .get(&key)
            .map(String::as_str)
            .filter(|phone| !phone.is_empty())
    }

    pub fn len(&self) -> usize {
        self.phones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
    }
}

/// Group the lines export by rooftop.
///
/// Rooftops come back in first-seen order and lines in row order. Rows that
/// are blank, too short for the required columns, or have no rooftop are
/// skipped.
pub fn aggregate_lines(
    table: &RawTable,
    desk_phones: &DeskPhoneLookup,
    style: CapitalizeStyle,
) -> Result<Vec<RooftopAggregate>, SkipReason> {
    let required = [
        columns::DISPLAY_NAME,
        columns::PHONE_NUMBER,
        columns::ROOFTOP_NAME,
        columns::INBOX_NAME,
    ];
    let idx = resolve_all(&table.headers, &required).map_err(|missing| {
        SkipReason::MissingColumns {
            dataset: DatasetKind::Lines,
            missing,
            headers: table.headers.clone(),
        }
    })?;
    let (display_idx, phone_idx, rooftop_idx, inbox_idx) = (idx[0], idx[1], idx[2], idx[3]);
    let owner_type_idx = find_col_idx(&table.headers, columns::OWNER_TYPE.fragments);
    let name_idx = find_exact_col_idx(&table.headers, columns::NAME);
    let max_required = idx.iter().copied().max().unwrap_or(0);

    let mut aggregates: Vec<RooftopAggregate> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in table.data_rows() {
        if row.len() <= max_required {
            continue;
        }
        let rooftop = cell(row, rooftop_idx).trim();
        if rooftop.is_empty() {
            continue;
        }

        let pos = *positions.entry(rooftop.to_string()).or_insert_with(|| {
            aggregates.push(RooftopAggregate {
                rooftop_name: rooftop.to_string(),
                inbox_name: String::new(),
                lines: Vec::new(),
            });
            aggregates.len() - 1
        });
        let aggregate = &mut aggregates[pos];
        aggregate.inbox_name = cell(row, inbox_idx).trim().to_string();

        let raw_display_name = cell(row, display_idx).trim();
        let raw_name = opt_cell(row, name_idx).trim();
        let owner_type = opt_cell(row, owner_type_idx).trim().to_uppercase();
        let (display_name, kind) = resolve_display_name(raw_display_name, raw_name, &owner_type, style);

        aggregate.lines.push(LineRecord {
            display_name,
            phone_number: format_phone_number(cell(row, phone_idx).trim()),
            raw_display_name: raw_display_name.to_string(),
            raw_name: raw_name.to_string(),
            desk_phone: desk_phones
                .get(raw_display_name)
                .unwrap_or_default()
                .to_string(),
            kind,
        });
    }

    debug!(rooftops = aggregates.len(), "aggregated lines");
    Ok(aggregates)
}

fn resolve_display_name(
    raw_display_name: &str,
    raw_name: &str,
    owner_type: &str,
    style: CapitalizeStyle,
) -> (String, LineKind) {
    if !raw_display_name.is_empty() {
        return (capitalize_name(raw_display_name, style), LineKind::Regular);
    }
    match owner_type {
        "USER" | "DEPARTMENT" => (
            format!("{} - [{}]", UNASSIGNED_LABEL, capitalize_name(raw_name, style)),
            LineKind::Unassigned,
        ),
        _ if raw_name.is_empty() => ("Unknown".to_string(), LineKind::Regular),
        _ => (capitalize_name(raw_name, style), LineKind::Regular),
    }
}
