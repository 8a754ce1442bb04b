// src/audit/mod.rs
pub mod classify;
pub mod columns;
pub mod csm;
pub mod lines;
pub mod normalize;
pub mod render;

use serde::Serialize;
use std::fmt;
use tracing::{info, instrument, warn};

use crate::ingest::{IngestError, ParsedDatasets, Upload};
use crate::preview::TablePreview;
use classify::{classify, DatasetKind};
use csm::{group_by_csm, CsmGroup};
use lines::{aggregate_lines, DeskPhoneLookup, RooftopAggregate};
use normalize::CapitalizeStyle;
use render::{render_csms, render_dealerships, CsmTemplate, DealershipTemplate, TemplateSet};

/// Why a stage produced nothing. Never fatal: raw tables are still shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    MissingDataset {
        missing: Vec<DatasetKind>,
        available: Vec<String>,
    },
    MissingColumns {
        dataset: DatasetKind,
        missing: Vec<&'static str>,
        headers: Vec<String>,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingDataset { missing, available } => {
                let missing: Vec<_> = missing.iter().map(DatasetKind::to_string).collect();
                write!(
                    f,
                    "required file(s) not found: {} (available: {})",
                    missing.join(", "),
                    available.join(", ")
                )
            }
            SkipReason::MissingColumns {
                dataset,
                missing,
                headers,
            } => write!(
                f,
                "could not find column(s) {} in {} (found headers: {})",
                missing.join(", "),
                dataset,
                headers.join(", ")
            ),
        }
    }
}

/// Result of one generation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome<T> {
    Generated(T),
    Skipped(SkipReason),
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn generated(&self) -> Option<&T> {
        match self {
            Outcome::Generated(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuditOptions {
    pub capitalize: CapitalizeStyle,
}

/// Everything the presentation layer needs for one upload.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub source: String,
    pub status: String,
    pub tables: Vec<TablePreview>,
    pub aggregates: Vec<RooftopAggregate>,
    pub csm_groups: Vec<CsmGroup>,
    pub dealership: Outcome<TemplateSet<DealershipTemplate>>,
    pub csm: Outcome<TemplateSet<CsmTemplate>>,
}

impl AuditReport {
    /// Report for an upload that never loaded. All derived state is empty.
    pub fn failed(source: impl Into<String>, err: &IngestError) -> Self {
        let message = err.to_string();
        Self {
            source: source.into(),
            status: format!("Error: {}", message),
            tables: Vec::new(),
            aggregates: Vec::new(),
            csm_groups: Vec::new(),
            dealership: Outcome::Failed(message.clone()),
            csm: Outcome::Failed(message),
        }
    }
}

/// Derived data from the classified datasets, before any presentation.
#[derive(Debug, Clone)]
pub struct Generated {
    pub aggregates: Vec<RooftopAggregate>,
    pub csm_groups: Vec<CsmGroup>,
    pub dealership: Outcome<TemplateSet<DealershipTemplate>>,
    pub csm: Outcome<TemplateSet<CsmTemplate>>,
}

impl Generated {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            aggregates: Vec::new(),
            csm_groups: Vec::new(),
            dealership: Outcome::Skipped(reason.clone()),
            csm: Outcome::Skipped(reason),
        }
    }
}

/// classify → aggregate → group → render.
///
/// Missing datasets or columns skip the affected output; a CSM-side gap
/// still leaves the dealership templates in place.
#[instrument(level = "info", skip_all, fields(files = datasets.len()))]
pub fn generate(datasets: &ParsedDatasets<'_>, options: AuditOptions) -> Generated {
    let classified = classify(datasets);
    let (lines_table, rooftop_table) = match classified.required(datasets) {
        Ok(tables) => tables,
        Err(reason) => {
            info!(%reason, "template generation skipped");
            return Generated::skipped(reason);
        }
    };

    let desk_phones = classified
        .desk_phones
        .map(DeskPhoneLookup::from_table)
        .unwrap_or_default();

    let aggregates = match aggregate_lines(lines_table, &desk_phones, options.capitalize) {
        Ok(aggregates) => aggregates,
        Err(reason) => {
            warn!(%reason, "template generation skipped");
            return Generated::skipped(reason);
        }
    };
    let dealership = Outcome::Generated(render_dealerships(&aggregates));

    let (csm_groups, csm) = match group_by_csm(rooftop_table, &aggregates) {
        Ok(groups) => {
            let templates = render_csms(&groups);
            (groups, Outcome::Generated(templates))
        }
        Err(reason) => {
            warn!(%reason, "csm templates skipped");
            (Vec::new(), Outcome::Skipped(reason))
        }
    };

    info!(
        rooftops = aggregates.len(),
        csms = csm_groups.len(),
        "templates generated"
    );
    Generated {
        aggregates,
        csm_groups,
        dealership,
        csm,
    }
}

/// Run the whole pipeline over a loaded upload.
pub fn run(upload: &Upload, options: AuditOptions) -> AuditReport {
    let generated = generate(&upload.datasets(), options);
    AuditReport {
        source: upload.source.clone(),
        status: upload.status(),
        tables: upload.files.iter().map(TablePreview::from_file).collect(),
        aggregates: generated.aggregates,
        csm_groups: generated.csm_groups,
        dealership: generated.dealership,
        csm: generated.csm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::RawTable;

    fn table(rows: &[&[&str]]) -> RawTable {
        RawTable::from_records(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn lines_table() -> RawTable {
        table(&[
            &["Display Name", "Phone Number", "Rooftop Name", "Inbox Name"],
            &["amy", "5550000001", "Acme", "Sales"],
        ])
    }

    #[test]
    fn missing_datasets_skip_both_outputs() {
        let lines = lines_table();
        let mut ds = ParsedDatasets::new();
        ds.insert("lines_with_low_call_volume.csv", &lines);

        let out = generate(&ds, AuditOptions::default());
        assert!(out.aggregates.is_empty());
        assert!(matches!(
            out.dealership,
            Outcome::Skipped(SkipReason::MissingDataset { .. })
        ));
        assert!(matches!(out.csm, Outcome::Skipped(_)));
    }

    #[test]
    fn csm_column_gap_keeps_dealership_templates() {
        let lines = lines_table();
        let rooftop = table(&[&["Rooftop Name", "Owner"], &["Acme", "Jane"]]);
        let mut ds = ParsedDatasets::new();
        ds.insert("lines_with_low_call_volume.csv", &lines);
        ds.insert("rooftop_information.csv", &rooftop);

        let out = generate(&ds, AuditOptions::default());
        assert_eq!(out.dealership.generated().unwrap().templates.len(), 1);
        assert!(out.csm_groups.is_empty());
        assert!(matches!(
            out.csm,
            Outcome::Skipped(SkipReason::MissingColumns {
                dataset: DatasetKind::Rooftop,
                ..
            })
        ));
    }

    #[test]
    fn skip_reason_reads_well() {
        let reason = SkipReason::MissingDataset {
            missing: vec![DatasetKind::Rooftop],
            available: vec!["a.csv".into()],
        };
        assert_eq!(
            reason.to_string(),
            "required file(s) not found: rooftop_information.csv (available: a.csv)"
        );
    }

    #[test]
    fn failed_report_has_no_derived_state() {
        let report = AuditReport::failed("bad.zip", &IngestError::EmptyArchive("bad.zip".into()));
        assert_eq!(report.status, "Error: no CSV files found in ZIP archive bad.zip");
        assert!(report.tables.is_empty());
        assert!(matches!(report.csm, Outcome::Failed(_)));
    }
}
