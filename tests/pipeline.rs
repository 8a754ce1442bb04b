use anyhow::Result;
use rooftop_audit::{
    audit::{csm::UNKNOWN_CSM, lines::LineKind, normalize::CapitalizeStyle},
    load_upload, run, AuditOptions, Outcome,
};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use tracing_subscriber::{fmt, EnvFilter};
use zip::write::FileOptions;
use zip::CompressionMethod;

const LINES_CSV: &str = "\
Display Name,Phone Number,Rooftop Name,Inbox Name,Owner Type,Name
jane SMITH,555-201-0001,Acme Motors,Sales,USER,jsmith
,1 (555) 201-0002,Acme Motors,Service,USER,bob JONES
";

const ROOFTOP_CSV: &str = "\
Rooftop Name,Region,CSM Owner
Acme Motors,West,Jane Doe
";

fn init_logging() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_target(false)
        .with_test_writer()
        .try_init();
}

fn write_zip(path: &Path, entries: &[(&str, &str)]) -> Result<()> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        for (name, content) in entries {
            let options: FileOptions<'_, ()> =
                FileOptions::default().compression_method(CompressionMethod::Stored);
            zip.start_file(*name, options)?;
            zip.write_all(content.as_bytes())?;
        }
        zip.finish()?;
    }
    std::fs::write(path, buf)?;
    Ok(())
}

fn acme_zip(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("export.zip");
    write_zip(
        &path,
        &[
            ("reports/Lines_With_Low_Call_Volume.csv", LINES_CSV),
            ("reports/Rooftop_Information.csv", ROOFTOP_CSV),
            ("__MACOSX/reports/._Rooftop_Information.csv", "junk"),
        ],
    )?;
    Ok(path)
}

#[tokio::test]
async fn acme_motors_end_to_end() -> Result<()> {
    init_logging();
    let dir = tempdir()?;
    let upload = load_upload(&[acme_zip(dir.path())?]).await?;
    let report = run(&upload, AuditOptions::default());

    assert_eq!(report.status, "✓ Loaded 2 CSV file(s) from export.zip");
    assert_eq!(report.tables.len(), 2);

    // one rooftop, explicit line before the synthesized one
    assert_eq!(report.aggregates.len(), 1);
    let acme = &report.aggregates[0];
    assert_eq!(acme.rooftop_name, "Acme Motors");
    assert_eq!(acme.inbox_name, "Service");
    assert_eq!(acme.lines.len(), 2);
    assert_eq!(acme.lines[0].display_name, "Jane Smith");
    assert_eq!(acme.lines[0].phone_number, "(555) 201-0001");
    assert_eq!(acme.lines[1].display_name, "Unassigned line - [Bob Jones]");
    assert_eq!(acme.lines[1].kind, LineKind::Unassigned);
    assert_eq!(acme.lines[1].phone_number, "(555) 201-0002");

    // one CSM group
    assert_eq!(report.csm_groups.len(), 1);
    assert_eq!(report.csm_groups[0].csm_owner, "Jane Doe");
    assert_eq!(report.csm_groups[0].rooftops[0].rooftop_name, "Acme Motors");
    assert_eq!(report.csm_groups[0].rooftops[0].inbox_name, "Service");

    let dealership = report.dealership.generated().expect("dealership templates");
    assert_eq!(
        dealership.templates[0].subject,
        "Acme Motors - Service: Phoneline forwarding"
    );
    let body = &dealership.templates[0].body;
    let explicit = body.find("• Jane Smith").expect("explicit line");
    let unassigned = body.find("• Unassigned line - [Bob Jones]").expect("unassigned line");
    assert!(explicit < unassigned);

    let csm = report.csm.generated().expect("csm templates");
    assert!(csm.templates[0].body.starts_with("Hi Jane,"));
    assert!(csm.templates[0].body.contains("• Acme Motors – Service"));
    Ok(())
}

#[tokio::test]
async fn first_rooftop_file_wins_over_same_named_copy() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("export.zip");
    write_zip(
        &path,
        &[
            ("a/lines_with_low_call_volume.csv", LINES_CSV),
            ("a/rooftop_information.csv", ROOFTOP_CSV),
            (
                "b/rooftop_information.csv",
                "Rooftop Name,Region,CSM Owner\nAcme Motors,West,Raj Patel\n",
            ),
        ],
    )?;

    let report = run(&load_upload(&[path]).await?, AuditOptions::default());
    assert_eq!(report.tables.len(), 3);
    assert_eq!(report.csm_groups.len(), 1);
    assert_eq!(report.csm_groups[0].csm_owner, "Jane Doe");
    Ok(())
}

#[tokio::test]
async fn rerun_is_byte_identical() -> Result<()> {
    let dir = tempdir()?;
    let zip_path = acme_zip(dir.path())?;

    let first = run(&load_upload(&[zip_path.clone()]).await?, AuditOptions::default());
    let second = run(&load_upload(&[zip_path]).await?, AuditOptions::default());

    assert_eq!(first.dealership, second.dealership);
    assert_eq!(first.csm, second.csm);
    assert_eq!(
        serde_json::to_string(&first)?,
        serde_json::to_string(&second)?
    );
    Ok(())
}

#[tokio::test]
async fn loose_csv_files_with_desk_phones() -> Result<()> {
    let dir = tempdir()?;
    let lines = dir.path().join("lines_with_low_call_volume_oct.csv");
    let rooftop = dir.path().join("rooftop_informatio.csv");
    let desk = dir.path().join("Desk_Phones.csv");
    std::fs::write(
        &lines,
        "Display Name,Phone Number,Rooftop Name,Inbox Name\n\
         Jane Smith,5552010001,Acme Motors,Sales\n\
         Sam Lee,5552010003,Bolt Auto,Main\n",
    )?;
    std::fs::write(&rooftop, "Rooftop,CSM Owner\nAcme Motors,Jane Doe\n")?;
    std::fs::write(&desk, "Name,Desk Phone\njane smith,555.777.0001\n")?;

    let upload = load_upload(&[lines, rooftop, desk]).await?;
    let report = run(
        &upload,
        AuditOptions {
            capitalize: CapitalizeStyle::FirstLetter,
        },
    );

    assert_eq!(report.status, "✓ Loaded 3 CSV file(s)");
    assert_eq!(report.aggregates[0].lines[0].desk_phone, "(555) 777-0001");
    assert_eq!(report.aggregates[0].lines[0].display_name, "Jane smith");

    let owners: Vec<_> = report.csm_groups.iter().map(|g| g.csm_owner.as_str()).collect();
    assert_eq!(owners, vec!["Jane Doe", UNKNOWN_CSM]);

    let dealership = report.dealership.generated().expect("dealership templates");
    assert_eq!(
        dealership.templates[0].desk_phone_candidates[0].desk_phone,
        "(555) 777-0001"
    );
    let divider = "=".repeat(80);
    assert_eq!(dealership.export.matches(&divider).count(), 2);
    Ok(())
}

#[tokio::test]
async fn partial_upload_still_lists_tables() -> Result<()> {
    let dir = tempdir()?;
    let only = dir.path().join("rooftop_information.csv");
    std::fs::write(&only, ROOFTOP_CSV)?;

    let report = run(&load_upload(&[only]).await?, AuditOptions::default());
    assert_eq!(report.tables.len(), 1);
    assert_eq!(report.tables[0].info(), "Rows: 1 | Columns: 3");
    assert!(matches!(report.dealership, Outcome::Skipped(_)));
    assert!(matches!(report.csm, Outcome::Skipped(_)));
    Ok(())
}
