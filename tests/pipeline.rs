// End-to-end run over synthetic questionnaire exports: load both CSVs,
// render every chart, compose the document and check that the narrative
// captions quote the computed shares.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use mp_report::compose::{self, Block};
use mp_report::loader::{self, AFTER_COLUMN_COUNT, PRE_COLUMN_COUNT};
use mp_report::{after_report, cross_report, docwriter, pre_report};

fn write_csv(path: &Path, rows: &[Vec<String>]) {
    let mut f = File::create(path).unwrap();
    for row in rows {
        let line = row
            .iter()
            .map(|c| {
                if c.contains(',') || c.contains('"') {
                    format!("\"{}\"", c.replace('"', "\"\""))
                } else {
                    c.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(",");
        writeln!(f, "{}", line).unwrap();
    }
}

fn pre_row(age: &str, missed: &str) -> Vec<String> {
    let mut row = vec![String::new(); PRE_COLUMN_COUNT];
    row[1] = age.to_string();
    row[2] = "Strednú odbornú školu".to_string();
    row[9] = "2".to_string();
    row[14] = "Áno".to_string();
    row[15] = "Áno".to_string();
    row[16] = "Áno".to_string();
    row[17] = "Áno".to_string();
    row[19] = "12".to_string();
    row[20] = "Nemala som žiadne informácie".to_string();
    row[28] = "1".to_string();
    row[33] = "1".to_string();
    row[34] = "1".to_string();
    row[47] = "1".to_string();
    row[56] = "Áno".to_string();
    row[58] = "Nie".to_string();
    row[59] = missed.to_string();
    row
}

fn after_row(missed: &str, usage: &str) -> Vec<String> {
    let mut row = vec![String::new(); AFTER_COLUMN_COUNT];
    row[1] = "16-18".to_string();
    row[2] = missed.to_string();
    row[3] = "1 deň".to_string();
    row[4] = "Mala som bolesti".to_string();
    row[5] = "Ano".to_string();
    row[6] = usage.to_string();
    row[7] = "Nie, nezmenilo sa to".to_string();
    row[8] = "Rovnako".to_string();
    row[9] = "Ano".to_string();
    row[10] = "Ano".to_string();
    row[11] = "Ano, určite".to_string();
    row[12] = "Skôr ano".to_string();
    row[13] = "Ano".to_string();
    row[14] = "Ano".to_string();
    row[15] = "Skôr ano".to_string();
    row[16] = "Iné".to_string();
    row[20] = "1".to_string();
    row
}

fn header(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Otázka {}", i)).collect()
}

#[test]
fn full_pipeline_produces_charts_and_consistent_narrative() {
    let dir = tempfile::tempdir().unwrap();
    let img_dir = dir.path().join("_report_images");
    std::fs::create_dir_all(&img_dir).unwrap();

    // 6 of 10 pre respondents missed school, 2 of 4 post respondents did.
    let mut pre_rows = vec![header(PRE_COLUMN_COUNT)];
    for _ in 0..6 {
        pre_rows.push(pre_row("16", "Áno"));
    }
    for _ in 0..4 {
        pre_rows.push(pre_row("14", "Nie"));
    }
    let pre_path = dir.path().join("pre_installation_data.csv");
    write_csv(&pre_path, &pre_rows);

    let mut after_rows = vec![header(AFTER_COLUMN_COUNT)];
    after_rows.push(after_row("Ano", "Ano, viackrát"));
    after_rows.push(after_row("Ano", "Ano, raz"));
    after_rows.push(after_row("Nie", "Nie"));
    after_rows.push(after_row("Nie", "Nie"));
    let after_path = dir.path().join("after_installation_data.csv");
    write_csv(&after_path, &after_rows);

    let pre_records = loader::load_pre(&pre_path).unwrap();
    let post_records = loader::load_after(&after_path).unwrap();
    assert_eq!(pre_records.len(), 10);
    assert_eq!(post_records.len(), 4);

    let pre = pre_report::analyze(&pre_records, &img_dir).unwrap();
    let after = after_report::analyze(&post_records, &img_dir).unwrap();
    let cross = cross_report::analyze(&pre_records, &post_records, &img_dir).unwrap();

    // One PNG per chart slug.
    let rendered = std::fs::read_dir(&img_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "png").unwrap_or(false))
        .count();
    assert_eq!(rendered, 31);

    assert_eq!(pre.missed_yes.text(), "60.0%");
    assert_eq!(after.missed_yes.text(), "50.0%");
    assert!(cross.delta_pp < 0.0);

    let report = compose::compose(&pre, &after, &cross);
    let narrative: Vec<&String> = report
        .blocks
        .iter()
        .filter_map(|b| match b {
            Block::Outcome(t) | Block::Bullet(t) | Block::Paragraph(t) => Some(t),
            _ => None,
        })
        .collect();
    assert!(narrative
        .iter()
        .any(|t| t.contains("6 respondentiek (60.0%) uviedlo")));
    assert!(narrative.iter().any(|t| t.contains("klesla z 60.0% na 50.0%")));
    assert!(narrative.iter().any(|t| t.contains("pokles o 10.0")));

    let images = report
        .blocks
        .iter()
        .filter(|b| matches!(b, Block::Image(_)))
        .count();
    assert_eq!(images, 31);
}

#[test]
fn full_pipeline_writes_a_pdf_when_fonts_are_available() {
    if !docwriter::fonts_available() {
        eprintln!("bundled fonts missing, skipping PDF write");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let img_dir = dir.path().join("_report_images");
    std::fs::create_dir_all(&img_dir).unwrap();

    let mut pre_rows = vec![header(PRE_COLUMN_COUNT)];
    for _ in 0..3 {
        pre_rows.push(pre_row("15", "Áno"));
    }
    pre_rows.push(pre_row("17", "Nie"));
    let pre_path = dir.path().join("pre.csv");
    write_csv(&pre_path, &pre_rows);

    let mut after_rows = vec![header(AFTER_COLUMN_COUNT)];
    after_rows.push(after_row("Ano", "Ano, raz"));
    after_rows.push(after_row("Nie", "Nie"));
    let after_path = dir.path().join("after.csv");
    write_csv(&after_path, &after_rows);

    let pre_records = loader::load_pre(&pre_path).unwrap();
    let post_records = loader::load_after(&after_path).unwrap();
    let pre = pre_report::analyze(&pre_records, &img_dir).unwrap();
    let after = after_report::analyze(&post_records, &img_dir).unwrap();
    let cross = cross_report::analyze(&pre_records, &post_records, &img_dir).unwrap();
    let report = compose::compose(&pre, &after, &cross);

    let output = dir.path().join("report.pdf");
    docwriter::write_pdf(&report, &output).unwrap();
    assert!(std::fs::metadata(&output).unwrap().len() > 0);
}
