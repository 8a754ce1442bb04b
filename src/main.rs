use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use rooftop_audit::{
    audit::{normalize::CapitalizeStyle, render::TemplateSet},
    load_upload, run, AuditOptions, AuditReport, Outcome,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Capitalize {
    /// Capitalize every word
    Title,
    /// Capitalize only the first letter
    FirstLetter,
}

impl From<Capitalize> for CapitalizeStyle {
    fn from(c: Capitalize) -> Self {
        match c {
            Capitalize::Title => CapitalizeStyle::TitleCase,
            Capitalize::FirstLetter => CapitalizeStyle::FirstLetter,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "rooftop-audit")]
#[command(about = "Build low-call-volume outreach templates from exported CSV reports")]
struct Args {
    /// One ZIP archive, or one or more CSV files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// How names from the exports are capitalized
    #[arg(long, value_enum, default_value = "title")]
    capitalize: Capitalize,

    /// Also write the combined template exports into this directory
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Dump every loaded CSV as a fixed-width table
    #[arg(long)]
    show_tables: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // ─── 1) init logging ─────────────────────────────────────────────
    let default_filter = if args.verbose { "debug" } else { "info" };
    let env =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = AuditOptions {
        capitalize: args.capitalize.into(),
    };
    let source = args
        .inputs
        .first()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    info!(source = %source, "processing");

    // ─── 2) load + run pipeline ──────────────────────────────────────
    let (report, failed) = match load_upload(&args.inputs).await {
        Ok(upload) => (run(&upload, options), false),
        Err(err) => {
            error!("upload failed: {}", err);
            (AuditReport::failed(source, &err), true)
        }
    };

    // ─── 3) present ──────────────────────────────────────────────────
    match args.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing report")?
        ),
        OutputFormat::Text => print_report(&report, args.show_tables),
    }

    if let Some(dir) = &args.export_dir {
        write_exports(dir, &report).await?;
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &AuditReport, show_tables: bool) {
    println!("{}", report.status);
    println!();

    for table in &report.tables {
        if show_tables {
            println!("{}", table.render_fixed_width());
        } else {
            println!("{}  ({})", table.name, table.info());
        }
    }

    print_section("Dealership Templates", &report.dealership, |idx, t| {
        println!("Template {}: {}", idx, t.rooftop_name);
        println!("Subject: {}", t.subject);
        println!();
        println!("{}", t.body);
        println!();
        println!("{} phone line(s)", t.line_count);
        if t.desk_phone_candidates.iter().any(|c| !c.desk_phone.is_empty()) {
            println!("Desk phone candidates:");
            for c in &t.desk_phone_candidates {
                println!(
                    "  {} | {} | {} | {}",
                    c.raw_display_name, c.raw_name, c.phone_number, c.desk_phone
                );
            }
        }
    });

    print_section("CSM Templates", &report.csm, |idx, t| {
        println!("Template {}: {}", idx, t.csm_owner);
        println!();
        println!("{}", t.body);
        println!();
        println!("{} rooftop(s)", t.rooftop_count);
    });
}

fn print_section<T>(
    title: &str,
    outcome: &Outcome<TemplateSet<T>>,
    mut print_one: impl FnMut(usize, &T),
) {
    println!();
    println!("=== {} ===", title);
    match outcome {
        Outcome::Generated(set) => {
            for (idx, template) in set.templates.iter().enumerate() {
                println!();
                print_one(idx + 1, template);
            }
            println!();
            println!("{}", set.summary);
        }
        Outcome::Skipped(reason) => println!("skipped: {}", reason),
        Outcome::Failed(message) => println!("failed: {}", message),
    }
}

async fn write_exports(dir: &Path, report: &AuditReport) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating export directory {}", dir.display()))?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S");

    let exports = [
        (
            "dealership_templates",
            report.dealership.generated().map(|s| s.export.as_str()),
        ),
        ("csm_templates", report.csm.generated().map(|s| s.export.as_str())),
    ];
    for (stem, export) in exports {
        let Some(text) = export else { continue };
        let path = dir.join(format!("{}_{}.txt", stem, stamp));
        tokio::fs::write(&path, text)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote export");
    }
    Ok(())
}
