//! Header lookup under naming variance.
//!
//! Exports name the same column differently ("Display Name", "display_name",
//! ...), so columns are found by case-insensitive fragment match. The first
//! match wins: fragments are tried in priority order and, for each fragment,
//! headers are scanned left to right.

/// A column the pipeline looks for, with its candidate fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub label: &'static str,
    pub fragments: &'static [&'static str],
}

pub const DISPLAY_NAME: ColumnSpec = ColumnSpec {
    label: "display name",
    fragments: &["display name", "display_name"],
};
pub const PHONE_NUMBER: ColumnSpec = ColumnSpec {
    label: "phone number",
    fragments: &["phone number", "phone_number", "number"],
};
pub const ROOFTOP_NAME: ColumnSpec = ColumnSpec {
    label: "rooftop name",
    fragments: &["rooftop name", "rooftop_name", "rooftop"],
};
pub const INBOX_NAME: ColumnSpec = ColumnSpec {
    label: "inbox name",
    fragments: &["inbox name", "inbox_name", "inbox"],
};
pub const OWNER_TYPE: ColumnSpec = ColumnSpec {
    label: "owner type",
    fragments: &["owner type", "owner_type", "ownertype"],
};
pub const CSM_OWNER: ColumnSpec = ColumnSpec {
    label: "csm owner",
    fragments: &["csm owner", "csm_owner", "csmowner"],
};
pub const DESK_PHONE_NUMBER: ColumnSpec = ColumnSpec {
    label: "desk phone",
    fragments: &[
        "desk phone",
        "desk_phone",
        "phone number",
        "phone_number",
        "number",
        "phone",
    ],
};

/// Exact header for the owner's name. A fragment match would hit "Display Name".
pub const NAME: &str = "name";

/// Name column of the desk-phones export: a display-name header, else an
/// exact [`NAME`] header.
pub const DESK_PHONE_NAME: ColumnSpec = DISPLAY_NAME;

/// Index of the desk-phones name column.
pub fn find_desk_phone_name_idx<S: AsRef<str>>(headers: &[S]) -> Option<usize> {
    find_col_idx(headers, DESK_PHONE_NAME.fragments).or_else(|| find_exact_col_idx(headers, NAME))
}

/// Index of the first header containing any of `fragments`.
pub fn find_col_idx<S: AsRef<str>>(headers: &[S], fragments: &[&str]) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.as_ref().to_lowercase()).collect();
    fragments.iter().find_map(|fragment| {
        let fragment = fragment.to_lowercase();
        lowered.iter().position(|h| h.contains(&fragment))
    })
}

/// Index of the first header equal to `target` after trimming, ignoring case.
pub fn find_exact_col_idx<S: AsRef<str>>(headers: &[S], target: &str) -> Option<usize> {
    let target = target.to_lowercase();
    headers
        .iter()
        .position(|h| h.as_ref().trim().to_lowercase() == target)
}

/// Resolve each column in order. On failure returns the labels that had no match.
pub fn resolve_all<S: AsRef<str>>(
    headers: &[S],
    specs: &[ColumnSpec],
) -> Result<Vec<usize>, Vec<&'static str>> {
    let mut found = Vec::with_capacity(specs.len());
    let mut missing = Vec::new();
    for spec in specs {
        match find_col_idx(headers, spec.fragments) {
            Some(idx) => found.push(idx),
            None => missing.push(spec.label),
        }
    }
    if missing.is_empty() {
        Ok(found)
    } else {
        Err(missing)
    }
}
