// PDF rendering of the composed report.
//
// Uses the bundled Roboto family from assets/fonts; the writer refuses to
// start without it so a half-styled document can never be produced. Charts
// are embedded centered at a fixed width, captions are italic gray, section
// headings carry the report's blue.
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use genpdf::elements::{Break, BulletPoint, Image, PageBreak, Paragraph};
use genpdf::fonts::{self, FontData, FontFamily};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Document, Element, Scale, SimplePageDecorator};
use image::GenericImageView;

use crate::compose::{Block, ReportDoc};
use crate::error::{ReportError, Result};

const FONT_FAMILY_NAME: &str = "Roboto";
const FONT_FILES: [&str; 4] = [
    "Roboto-Regular.ttf",
    "Roboto-Bold.ttf",
    "Roboto-Italic.ttf",
    "Roboto-BoldItalic.ttf",
];

const HEADING_COLOR: Color = Color::Rgb(0x1a, 0x4a, 0x6e);
const SUBTITLE_COLOR: Color = Color::Rgb(0x55, 0x55, 0x55);
const OUTCOME_COLOR: Color = Color::Rgb(0x33, 0x33, 0x33);

// Charts are rendered at 200 dpi equivalents; 150 mm keeps them inside the
// text column with room for the page margins.
const CHART_WIDTH_MM: f64 = 150.0;
const MM_PER_INCH: f64 = 25.4;
const IMAGE_DPI: f64 = 300.0;

fn bundled_font_directory() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

/// Whether all bundled font files are present; tests use this to skip PDF
/// rendering on checkouts without the fonts.
pub fn fonts_available() -> bool {
    let directory = bundled_font_directory();
    FONT_FILES.iter().all(|name| directory.join(name).is_file())
}

fn load_fonts() -> Result<FontFamily<FontData>> {
    let directory = bundled_font_directory();
    if !fonts_available() {
        return Err(genpdf::error::Error::new(
            format!(
                "bundled fonts missing under {}; see assets/fonts/README.md",
                directory.display()
            ),
            io::Error::new(io::ErrorKind::NotFound, "bundled fonts missing"),
        )
        .into());
    }
    let family = fonts::from_files(&directory, FONT_FAMILY_NAME, None)?;
    Ok(family)
}

fn chart_image(path: &Path) -> Result<Image> {
    let dynamic = image::open(path).map_err(|e| {
        genpdf::error::Error::new(
            format!("failed to load chart image {}", path.display()),
            io::Error::new(io::ErrorKind::InvalidData, e.to_string()),
        )
    })?;
    let (px_width, _) = dynamic.dimensions();
    let natural_mm = px_width as f64 * MM_PER_INCH / IMAGE_DPI;
    let scale = CHART_WIDTH_MM / natural_mm;

    let mut image = Image::from_dynamic_image(dynamic)?;
    image.set_alignment(Alignment::Center);
    image.set_scale(Scale::new(scale, scale));
    Ok(image)
}

pub fn write_pdf(report: &ReportDoc, output: &Path) -> Result<()> {
    // An unwritable output path is a write failure, not a renderer failure.
    let file = File::create(output).map_err(|e| ReportError::WriteError {
        path: output.to_path_buf(),
        source: e,
    })?;
    let family = load_fonts()?;
    let mut doc = Document::new(family);
    doc.set_title(report.title.as_str());
    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(15);
    doc.set_page_decorator(decorator);

    // Cover page.
    doc.push(Break::new(8.0));
    doc.push(
        Paragraph::new(report.title.as_str())
            .aligned(Alignment::Center)
            .styled(Style::new().bold().with_font_size(36).with_color(HEADING_COLOR)),
    );
    doc.push(Break::new(1.0));
    doc.push(
        Paragraph::new(report.subtitle.as_str())
            .aligned(Alignment::Center)
            .styled(Style::new().with_font_size(18).with_color(SUBTITLE_COLOR)),
    );
    doc.push(Break::new(2.0));
    doc.push(
        Paragraph::new(report.date_line.as_str())
            .aligned(Alignment::Center)
            .styled(Style::new().with_font_size(11).with_color(SUBTITLE_COLOR)),
    );
    doc.push(PageBreak::new());

    for block in &report.blocks {
        match block {
            Block::Heading1(text) => {
                doc.push(
                    Paragraph::new(text.as_str())
                        .styled(Style::new().bold().with_font_size(20).with_color(HEADING_COLOR)),
                );
                doc.push(Break::new(1.0));
            }
            Block::Heading2(text) => {
                doc.push(Break::new(0.5));
                doc.push(
                    Paragraph::new(text.as_str())
                        .styled(Style::new().bold().with_font_size(14).with_color(HEADING_COLOR)),
                );
                doc.push(Break::new(0.5));
            }
            Block::Paragraph(text) => {
                doc.push(Paragraph::new(text.as_str()));
            }
            Block::Outcome(text) => {
                doc.push(
                    Paragraph::new(text.as_str())
                        .styled(Style::new().italic().with_font_size(10).with_color(OUTCOME_COLOR)),
                );
                doc.push(Break::new(1.0));
            }
            Block::Bullet(text) => {
                doc.push(BulletPoint::new(
                    Paragraph::new(text.as_str()).styled(Style::new().with_font_size(10)),
                ));
            }
            Block::Image(path) => {
                doc.push(chart_image(path)?);
                doc.push(Break::new(0.5));
            }
            Block::PageBreak => {
                doc.push(PageBreak::new());
            }
        }
    }

    doc.render(BufWriter::new(file))?;
    log::info!("report written to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{self, Bar};

    fn tiny_report(image: PathBuf) -> ReportDoc {
        ReportDoc {
            title: "OZ Different".to_string(),
            subtitle: "Testovací dokument".to_string(),
            date_line: "01.01.2026".to_string(),
            blocks: vec![
                Block::Heading1("Sekcia".to_string()),
                Block::Heading2("Graf".to_string()),
                Block::Image(image),
                Block::Outcome("Popis grafu.".to_string()),
                Block::Bullet("Jedna odrážka".to_string()),
                Block::PageBreak,
                Block::Paragraph("Záver.".to_string()),
            ],
        }
    }

    fn sample_chart(dir: &Path) -> PathBuf {
        let bars = [Bar {
            label: "Áno".to_string(),
            value: 3.0,
            annotation: "3 (75.0%)".to_string(),
        }];
        chart::horizontal_bars(dir, "sample", "Ukážka", &bars, (400, 200)).unwrap()
    }

    #[test]
    fn renders_a_pdf_with_charts_and_captions() {
        if !fonts_available() {
            eprintln!("bundled fonts missing, skipping PDF render test");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let chart = sample_chart(dir.path());
        let output = dir.path().join("report.pdf");
        write_pdf(&tiny_report(chart), &output).unwrap();
        assert!(output.is_file());
        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }

    #[test]
    fn unwritable_output_path_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let chart = sample_chart(dir.path());
        let target = dir.path().join("missing").join("report.pdf");
        let err = write_pdf(&tiny_report(chart), &target).unwrap_err();
        assert!(matches!(err, ReportError::WriteError { .. }));
    }

    #[test]
    fn missing_fonts_fail_with_a_document_error() {
        if fonts_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let chart = sample_chart(dir.path());
        let err = write_pdf(&tiny_report(chart), &dir.path().join("report.pdf")).unwrap_err();
        assert!(matches!(err, ReportError::Document(_)));
    }
}
