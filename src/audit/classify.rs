use serde::Serialize;
use std::fmt;

use super::SkipReason;
use crate::ingest::{ParsedDatasets, RawTable};

/// Which export a file is, going by its (lower-cased) filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Lines,
    Rooftop,
    DeskPhones,
}

impl DatasetKind {
    /// Filename rules, checked in this order:
    /// - lines: contains both "lines_with_low" and "call_volume"
    /// - rooftop: contains "rooftop_informatio" (also catches exports whose
    ///   name was cut short before the final "n")
    /// - desk phones: contains "desk_phones"
    pub fn of(filename: &str) -> Option<Self> {
        if filename.contains("lines_with_low") && filename.contains("call_volume") {
            Some(DatasetKind::Lines)
        } else if filename.contains("rooftop_informatio") {
            Some(DatasetKind::Rooftop)
        } else if filename.contains("desk_phones") {
            Some(DatasetKind::DeskPhones)
        } else {
            None
        }
    }

    pub fn expected_filename(&self) -> &'static str {
        match self {
            DatasetKind::Lines => "lines_with_low_*_call_volume.csv",
            DatasetKind::Rooftop => "rooftop_information.csv",
            DatasetKind::DeskPhones => "desk_phones.csv",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expected_filename())
    }
}

/// The tables the pipeline knows how to use. First file of each kind wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassifiedDatasets<'a> {
    pub lines: Option<&'a RawTable>,
    pub rooftop: Option<&'a RawTable>,
    pub desk_phones: Option<&'a RawTable>,
}

impl<'a> ClassifiedDatasets<'a> {
    /// The lines and rooftop tables, or why generation has nothing to do.
    pub fn required(
        &self,
        datasets: &ParsedDatasets<'_>,
    ) -> Result<(&'a RawTable, &'a RawTable), SkipReason> {
        match (self.lines, self.rooftop) {
            (Some(lines), Some(rooftop)) => Ok((lines, rooftop)),
            (lines, rooftop) => {
                let mut missing = Vec::new();
                if lines.is_none() {
                    missing.push(DatasetKind::Lines);
                }
                if rooftop.is_none() {
                    missing.push(DatasetKind::Rooftop);
                }
                Err(SkipReason::MissingDataset {
                    missing,
                    available: datasets.filenames(),
                })
            }
        }
    }
}

pub fn classify<'a>(datasets: &ParsedDatasets<'a>) -> ClassifiedDatasets<'a> {
    let mut out = ClassifiedDatasets::default();
    for (filename, table) in datasets.iter() {
        let slot = match DatasetKind::of(filename) {
            Some(DatasetKind::Lines) => &mut out.lines,
            Some(DatasetKind::Rooftop) => &mut out.rooftop,
            Some(DatasetKind::DeskPhones) => &mut out.desk_phones,
            None => continue,
        };
        if slot.is_none() {
            *slot = Some(table);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(header: &str) -> RawTable {
        RawTable::from_records(vec![vec![header.to_string()]])
    }

    #[test]
    fn filename_rules() {
        assert_eq!(
            DatasetKind::of("lines_with_low_inbound_call_volume.csv"),
            Some(DatasetKind::Lines)
        );
        assert_eq!(DatasetKind::of("lines_with_low_usage.csv"), None);
        assert_eq!(
            DatasetKind::of("rooftop_information (1).csv"),
            Some(DatasetKind::Rooftop)
        );
        assert_eq!(
            DatasetKind::of("rooftop_informatio.csv"),
            Some(DatasetKind::Rooftop)
        );
        assert_eq!(
            DatasetKind::of("desk_phones_export.csv"),
            Some(DatasetKind::DeskPhones)
        );
        assert_eq!(DatasetKind::of("rooftop_info.csv"), None);
    }

    #[test]
    fn first_match_of_each_kind_wins() {
        let first = table("first");
        let second = table("second");
        let rooftop = table("rooftop");

        let mut ds = ParsedDatasets::new();
        ds.insert("Lines_With_Low_Call_Volume.csv", &first);
        ds.insert("rooftop_information.csv", &rooftop);
        ds.insert("lines_with_low_call_volume_copy.csv", &second);

        let classified = classify(&ds);
        assert_eq!(classified.lines.unwrap().headers, vec!["first"]);
        assert_eq!(classified.rooftop.unwrap().headers, vec!["rooftop"]);
        assert!(classified.desk_phones.is_none());
        assert!(classified.required(&ds).is_ok());
    }

    #[test]
    fn missing_rooftop_file_skips_generation() {
        let lines = table("lines");
        let other = table("other");
        let mut ds = ParsedDatasets::new();
        ds.insert("lines_with_low_call_volume.csv", &lines);
        ds.insert("notes.csv", &other);

        let err = classify(&ds).required(&ds).unwrap_err();
        assert_eq!(
            err,
            SkipReason::MissingDataset {
                missing: vec![DatasetKind::Rooftop],
                available: vec![
                    "lines_with_low_call_volume.csv".to_string(),
                    "notes.csv".to_string()
                ],
            }
        );
    }
}
