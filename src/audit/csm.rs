use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use super::{
    classify::DatasetKind,
    columns::{self, resolve_all},
    lines::RooftopAggregate,
    SkipReason,
};
use crate::ingest::raw_table::{cell, RawTable};

/// Group key for rooftops with no CSM in the rooftop-information export.
pub const UNKNOWN_CSM: &str = "Unknown CSM";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RooftopRef {
    pub rooftop_name: String,
    pub inbox_name: String,
}

/// Rooftops owned by one customer success manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsmGroup {
    pub csm_owner: String,
    pub rooftops: Vec<RooftopRef>,
}

/// Rooftop name → CSM owner from the rooftop-information export.
///
/// Both values are trimmed and must be non-empty; a later row replaces an
/// earlier one for the same rooftop.
pub fn csm_owners(table: &RawTable) -> Result<HashMap<String, String>, SkipReason> {
    let idx = resolve_all(&table.headers, &[columns::ROOFTOP_NAME, columns::CSM_OWNER])
        .map_err(|missing| SkipReason::MissingColumns {
            dataset: DatasetKind::Rooftop,
            missing,
            headers: table.headers.clone(),
        })?;
    let (rooftop_idx, owner_idx) = (idx[0], idx[1]);
    let max_idx = rooftop_idx.max(owner_idx);

    let mut owners = HashMap::new();
    for row in table.data_rows().filter(|row| row.len() > max_idx) {
        let rooftop = cell(row, rooftop_idx).trim();
        let owner = cell(row, owner_idx).trim();
        if !rooftop.is_empty() && !owner.is_empty() {
            owners.insert(rooftop.to_string(), owner.to_string());
        }
    }
    Ok(owners)
}

/// Assign every aggregate to its CSM. Groups appear in the order their first
/// rooftop does; unmatched rooftops land in [`UNKNOWN_CSM`].
pub fn group_by_csm(
    table: &RawTable,
    aggregates: &[RooftopAggregate],
) -> Result<Vec<CsmGroup>, SkipReason> {
    let owners = csm_owners(table)?;

    let mut groups: Vec<CsmGroup> = Vec::new();
    for aggregate in aggregates {
        let owner = owners
            .get(&aggregate.rooftop_name)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CSM);

        let pos = match groups.iter().position(|g| g.csm_owner == owner) {
            Some(pos) => pos,
            None => {
                groups.push(CsmGroup {
                    csm_owner: owner.to_string(),
                    rooftops: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[pos].rooftops.push(RooftopRef {
            rooftop_name: aggregate.rooftop_name.clone(),
            inbox_name: aggregate.inbox_name.clone(),
        });
    }

    debug!(groups = groups.len(), "grouped rooftops by csm");
    Ok(groups)
}
