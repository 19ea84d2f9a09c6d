use std::env;
use std::fs;
use std::process;

use tabled::{Table, Tabled};

use mp_report::error::{ReportError, Result};
use mp_report::{after_report, compose, cross_report, docwriter, loader, pre_report, util};

const PRE_INPUT: &str = "pre_installation_data.csv";
const AFTER_INPUT: &str = "after_installation_data.csv";
const IMAGE_DIR: &str = "_report_images";
const OUTPUT_NAME: &str = "../OZ Different - dátová analýza.pdf";

#[derive(Tabled)]
struct DatasetSummary {
    #[tabled(rename = "Dataset")]
    name: &'static str,
    #[tabled(rename = "Riadky")]
    rows: String,
    #[tabled(rename = "Grafy")]
    charts: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let base = env::current_dir().map_err(|e| ReportError::WriteError {
        path: ".".into(),
        source: e,
    })?;
    let img_dir = base.join(IMAGE_DIR);
    fs::create_dir_all(&img_dir).map_err(|e| ReportError::WriteError {
        path: img_dir.clone(),
        source: e,
    })?;

    let pre_rows = loader::load_pre(&base.join(PRE_INPUT))?;
    let post_rows = loader::load_after(&base.join(AFTER_INPUT))?;

    let pre = pre_report::analyze(&pre_rows, &img_dir)?;
    let after = after_report::analyze(&post_rows, &img_dir)?;
    let cross = cross_report::analyze(&pre_rows, &post_rows, &img_dir)?;

    let report = compose::compose(&pre, &after, &cross);
    let output = base.join(OUTPUT_NAME);
    docwriter::write_pdf(&report, &output)?;

    let summary = vec![
        DatasetSummary {
            name: "Pred inštaláciou",
            rows: util::format_int(pre.num),
            charts: 13,
        },
        DatasetSummary {
            name: "Po inštalácii",
            rows: util::format_int(after.num),
            charts: 16,
        },
        DatasetSummary {
            name: "Krížová analýza",
            rows: util::format_int(pre.num + after.num),
            charts: 2,
        },
    ];
    println!("{}", Table::new(&summary));
    println!("Report: {}", output.display());
    Ok(())
}
