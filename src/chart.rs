// Chart rendering.
//
// Every aggregation becomes one PNG under the image directory, drawn with
// plotters on a white background. The survey charts hide their axes and put
// bold value labels next to each bar, so bars and labels are drawn directly
// in pixel space instead of through an axis mesh. Each render writes exactly
// one file and hands back its path; nothing is kept in memory.
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::{ReportError, Result};

pub const CHART_COLOR: RGBColor = RGBColor(0x1a, 0x4a, 0x6e);
pub const COLOR_YES: RGBColor = RGBColor(0x6b, 0xae, 0xd6);
pub const COLOR_NO: RGBColor = RGBColor(0x21, 0x71, 0xb5);
pub const COLOR_NO_ANSWER: RGBColor = RGBColor(0x08, 0x30, 0x6b);
pub const COLOR_PRE: RGBColor = RGBColor(0x21, 0x71, 0xb5);
pub const COLOR_POST: RGBColor = RGBColor(0x6b, 0xae, 0xd6);
const MEAN_LINE_COLOR: RGBColor = RGBColor(0xd4, 0xa0, 0x17);
const DELTA_GOOD: RGBColor = RGBColor(0x1a, 0x7a, 0x2e);
const DELTA_BAD: RGBColor = RGBColor(0xb3, 0x1b, 0x1b);

/// One bar of a simple chart: display label, raw value and the annotation
/// rendered next to the bar (count + percent, already formatted upstream).
#[derive(Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub annotation: String,
}

/// One group of a multi-series chart; values follow the series order.
#[derive(Debug, Clone)]
pub struct BarGroup {
    pub label: String,
    pub values: Vec<(f64, String)>,
}

fn chart_err(slug: &str, e: impl std::fmt::Display) -> ReportError {
    ReportError::Chart {
        slug: slug.to_string(),
        message: e.to_string(),
    }
}

fn font(size: u32, style: FontStyle) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size as f64, style)
}

type Canvas<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;

fn draw_text(
    root: &Canvas<'_>,
    slug: &str,
    text: &str,
    (x, y): (i32, i32),
    size: u32,
    style: FontStyle,
    color: RGBColor,
    hpos: HPos,
    vpos: VPos,
) -> Result<()> {
    // Multi-line labels (\n) are stacked around the anchor point.
    let lines: Vec<&str> = text.split('\n').collect();
    let line_height = (size + 4) as i32;
    let first_y = match vpos {
        VPos::Center => y - (lines.len() as i32 - 1) * line_height / 2,
        VPos::Bottom => y - (lines.len() as i32 - 1) * line_height,
        _ => y,
    };
    for (i, line) in lines.iter().enumerate() {
        let text_style = TextStyle::from(font(size, style))
            .color(&color)
            .pos(Pos::new(hpos, vpos));
        root.draw(&Text::new(
            line.to_string(),
            (x, first_y + i as i32 * line_height),
            text_style,
        ))
        .map_err(|e| chart_err(slug, e))?;
    }
    Ok(())
}

fn new_canvas<'a>(
    path: &'a Path,
    slug: &str,
    size: (u32, u32),
) -> Result<Canvas<'a>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| chart_err(slug, e))?;
    Ok(root)
}

fn finish(root: Canvas<'_>, slug: &str) -> Result<()> {
    root.present().map_err(|e| chart_err(slug, e))
}

fn target(img_dir: &Path, slug: &str) -> PathBuf {
    img_dir.join(format!("{}.png", slug))
}

/// Horizontal bars with hidden axes, category labels in a left gutter and a
/// bold annotation right of each bar. `bars` are in visual top-to-bottom
/// order.
pub fn horizontal_bars(
    img_dir: &Path,
    slug: &str,
    title: &str,
    bars: &[Bar],
    size: (u32, u32),
) -> Result<PathBuf> {
    let path = target(img_dir, slug);
    {
        let root = new_canvas(&path, slug, size)?;
        let (w, h) = (size.0 as i32, size.1 as i32);
        draw_text(&root, slug, title, (w / 2, 12), 22, FontStyle::Bold, BLACK, HPos::Center, VPos::Top)?;

        let gutter = w * 32 / 100;
        let plot_left = gutter + 10;
        let plot_right = w - 150;
        let plot_top = 52;
        let plot_bottom = h - 16;
        let n = bars.len().max(1) as i32;
        let slot = (plot_bottom - plot_top) / n;
        let bar_h = (slot * 11 / 20).max(6);
        let max = bars.iter().map(|b| b.value).fold(0.0f64, f64::max).max(1.0);
        let scale = (plot_right - plot_left) as f64 / max;

        for (i, bar) in bars.iter().enumerate() {
            let y_center = plot_top + slot * i as i32 + slot / 2;
            let x_end = plot_left + (bar.value * scale).round() as i32;
            root.draw(&Rectangle::new(
                [(plot_left, y_center - bar_h / 2), (x_end, y_center + bar_h / 2)],
                CHART_COLOR.filled(),
            ))
            .map_err(|e| chart_err(slug, e))?;
            draw_text(&root, slug, &bar.label, (gutter, y_center), 16, FontStyle::Normal, BLACK, HPos::Right, VPos::Center)?;
            draw_text(&root, slug, &bar.annotation, (x_end + 6, y_center), 15, FontStyle::Bold, BLACK, HPos::Left, VPos::Center)?;
        }
        finish(root, slug)?;
    }
    log::info!("chart {} -> {}", slug, path.display());
    Ok(path)
}

/// Vertical bars with hidden axes and a (possibly multi-line) annotation
/// above each bar; used by the cohort charts.
pub fn vertical_bars(
    img_dir: &Path,
    slug: &str,
    title: &str,
    bars: &[Bar],
    x_label: Option<&str>,
    size: (u32, u32),
) -> Result<PathBuf> {
    let path = target(img_dir, slug);
    {
        let root = new_canvas(&path, slug, size)?;
        let (w, h) = (size.0 as i32, size.1 as i32);
        draw_text(&root, slug, title, (w / 2, 12), 22, FontStyle::Bold, BLACK, HPos::Center, VPos::Top)?;

        let plot_left = 50;
        let plot_right = w - 50;
        let plot_top = 92;
        let bottom_reserve = if x_label.is_some() { 64 } else { 40 };
        let plot_bottom = h - bottom_reserve;
        let n = bars.len().max(1) as i32;
        let slot = (plot_right - plot_left) / n;
        let bar_w = (slot * 11 / 20).max(6);
        let max = bars.iter().map(|b| b.value).fold(0.0f64, f64::max).max(f64::MIN_POSITIVE);
        let scale = (plot_bottom - plot_top) as f64 / max;

        for (i, bar) in bars.iter().enumerate() {
            let x_center = plot_left + slot * i as i32 + slot / 2;
            let y_top = plot_bottom - (bar.value * scale).round() as i32;
            root.draw(&Rectangle::new(
                [(x_center - bar_w / 2, y_top), (x_center + bar_w / 2, plot_bottom)],
                CHART_COLOR.filled(),
            ))
            .map_err(|e| chart_err(slug, e))?;
            draw_text(&root, slug, &bar.annotation, (x_center, y_top - 6), 15, FontStyle::Bold, BLACK, HPos::Center, VPos::Bottom)?;
            draw_text(&root, slug, &bar.label, (x_center, plot_bottom + 8), 16, FontStyle::Normal, BLACK, HPos::Center, VPos::Top)?;
        }
        if let Some(label) = x_label {
            draw_text(&root, slug, label, (w / 2, h - 22), 16, FontStyle::Normal, BLACK, HPos::Center, VPos::Top)?;
        }
        finish(root, slug)?;
    }
    log::info!("chart {} -> {}", slug, path.display());
    Ok(path)
}

// Horizontal pixel offset of a value on the binned axis; bin i covers
// [bin_start + i, bin_start + i + 1).
fn mean_offset(value: f64, bin_start: i32, bins: i32, span: i32) -> i32 {
    ((value - bin_start as f64) / bins as f64 * span as f64).round() as i32
}

/// Integer-bin histogram with visible axes, per-bin tick labels and a dashed
/// mean line with a small legend.
pub fn histogram(
    img_dir: &Path,
    slug: &str,
    title: &str,
    values: &[f64],
    bin_start: i32,
    bin_end: i32,
    mean: f64,
    x_label: &str,
    y_label: &str,
    size: (u32, u32),
) -> Result<PathBuf> {
    let path = target(img_dir, slug);
    {
        let root = new_canvas(&path, slug, size)?;
        let (w, h) = (size.0 as i32, size.1 as i32);
        draw_text(&root, slug, title, (w / 2, 12), 22, FontStyle::Bold, BLACK, HPos::Center, VPos::Top)?;

        let bins: Vec<usize> = (bin_start..bin_end)
            .map(|b| {
                values
                    .iter()
                    .filter(|v| **v >= b as f64 && **v < (b + 1) as f64)
                    .count()
            })
            .collect();
        let max = bins.iter().copied().max().unwrap_or(0).max(1);

        let plot_left = 70;
        let plot_right = w - 40;
        let plot_top = 52;
        let plot_bottom = h - 70;
        let n = bins.len().max(1) as i32;
        let slot = (plot_right - plot_left) / n;
        let y_scale = (plot_bottom - plot_top) as f64 / max as f64;

        // Axis lines.
        root.draw(&PathElement::new(
            vec![(plot_left, plot_top), (plot_left, plot_bottom), (plot_right, plot_bottom)],
            BLACK.stroke_width(1),
        ))
        .map_err(|e| chart_err(slug, e))?;

        // Y ticks.
        let step = (max / 5).max(1);
        let mut tick = 0usize;
        while tick <= max {
            let y = plot_bottom - (tick as f64 * y_scale).round() as i32;
            root.draw(&PathElement::new(vec![(plot_left - 4, y), (plot_left, y)], BLACK.stroke_width(1)))
                .map_err(|e| chart_err(slug, e))?;
            draw_text(&root, slug, &tick.to_string(), (plot_left - 8, y), 14, FontStyle::Normal, BLACK, HPos::Right, VPos::Center)?;
            tick += step;
        }

        for (i, count) in bins.iter().enumerate() {
            let x0 = plot_left + slot * i as i32 + 2;
            let x1 = plot_left + slot * (i as i32 + 1) - 2;
            let y_top = plot_bottom - (*count as f64 * y_scale).round() as i32;
            if *count > 0 {
                root.draw(&Rectangle::new([(x0, y_top), (x1, plot_bottom)], CHART_COLOR.filled()))
                    .map_err(|e| chart_err(slug, e))?;
                root.draw(&Rectangle::new([(x0, y_top), (x1, plot_bottom)], BLACK.stroke_width(1)))
                    .map_err(|e| chart_err(slug, e))?;
            }
            let bin_label = (bin_start + i as i32).to_string();
            draw_text(&root, slug, &bin_label, ((x0 + x1) / 2, plot_bottom + 6), 14, FontStyle::Normal, BLACK, HPos::Center, VPos::Top)?;
        }

        // Dashed mean line.
        let mean_x = plot_left + mean_offset(mean, bin_start, n, plot_right - plot_left);
        let mut y = plot_top;
        while y < plot_bottom {
            let y1 = (y + 6).min(plot_bottom);
            root.draw(&PathElement::new(vec![(mean_x, y), (mean_x, y1)], MEAN_LINE_COLOR.stroke_width(2)))
                .map_err(|e| chart_err(slug, e))?;
            y += 11;
        }
        let legend = format!("Priemer: {:.2}", mean);
        root.draw(&PathElement::new(
            vec![(plot_right - 150, plot_top + 12), (plot_right - 126, plot_top + 12)],
            MEAN_LINE_COLOR.stroke_width(2),
        ))
        .map_err(|e| chart_err(slug, e))?;
        draw_text(&root, slug, &legend, (plot_right - 120, plot_top + 12), 15, FontStyle::Normal, BLACK, HPos::Left, VPos::Center)?;

        draw_text(&root, slug, x_label, (w / 2, h - 40), 16, FontStyle::Normal, BLACK, HPos::Center, VPos::Top)?;
        draw_text(&root, slug, y_label, (20, (plot_top + plot_bottom) / 2), 16, FontStyle::Normal, BLACK, HPos::Center, VPos::Center)?;
        finish(root, slug)?;
    }
    log::info!("chart {} -> {}", slug, path.display());
    Ok(path)
}

/// Multi-series horizontal bars (one sub-bar per series inside each group)
/// with a legend and an optional annotation box in the lower right corner.
pub fn grouped_horizontal_bars(
    img_dir: &Path,
    slug: &str,
    title: &str,
    groups: &[BarGroup],
    series: &[(&str, RGBColor)],
    note: Option<&str>,
    size: (u32, u32),
) -> Result<PathBuf> {
    let path = target(img_dir, slug);
    {
        let root = new_canvas(&path, slug, size)?;
        let (w, h) = (size.0 as i32, size.1 as i32);
        draw_text(&root, slug, title, (w / 2, 12), 22, FontStyle::Bold, BLACK, HPos::Center, VPos::Top)?;

        let gutter = w * 30 / 100;
        let plot_left = gutter + 10;
        let plot_right = w - 150;
        let plot_top = 52;
        let plot_bottom = h - 20;
        let n = groups.len().max(1) as i32;
        let slot = (plot_bottom - plot_top) / n;
        let sub = slot / (series.len() as i32 + 1);
        let max = groups
            .iter()
            .flat_map(|g| g.values.iter().map(|(v, _)| *v))
            .fold(0.0f64, f64::max)
            .max(1.0);
        let scale = (plot_right - plot_left) as f64 / max;

        for (gi, group) in groups.iter().enumerate() {
            let group_top = plot_top + slot * gi as i32;
            let y_center = group_top + slot / 2;
            draw_text(&root, slug, &group.label, (gutter, y_center), 15, FontStyle::Normal, BLACK, HPos::Right, VPos::Center)?;
            for (si, (value, label)) in group.values.iter().enumerate() {
                let y0 = group_top + sub / 2 + sub * si as i32;
                let x_end = plot_left + (value * scale).round() as i32;
                let color = series[si].1;
                if *value > 0.0 {
                    root.draw(&Rectangle::new(
                        [(plot_left, y0), (x_end, y0 + sub - 2)],
                        color.filled(),
                    ))
                    .map_err(|e| chart_err(slug, e))?;
                    draw_text(&root, slug, label, (x_end + 5, y0 + sub / 2), 13, FontStyle::Normal, BLACK, HPos::Left, VPos::Center)?;
                }
            }
        }

        // Legend, top right.
        for (si, (name, color)) in series.iter().enumerate() {
            let y = plot_top + 4 + si as i32 * 20;
            root.draw(&Rectangle::new(
                [(w - 145, y), (w - 131, y + 12)],
                color.filled(),
            ))
            .map_err(|e| chart_err(slug, e))?;
            draw_text(&root, slug, name, (w - 126, y + 6), 13, FontStyle::Normal, BLACK, HPos::Left, VPos::Center)?;
        }

        if let Some(note) = note {
            draw_text(&root, slug, note, (w - 20, h - 16), 14, FontStyle::Normal, BLACK, HPos::Right, VPos::Bottom)?;
        }
        finish(root, slug)?;
    }
    log::info!("chart {} -> {}", slug, path.display());
    Ok(path)
}

/// Two-series vertical bars comparing matched pre/post categories, with a
/// legend and the signed percentage-point delta annotated above the bars
/// (green when the change is an improvement).
pub fn comparison_bars(
    img_dir: &Path,
    slug: &str,
    title: &str,
    categories: &[&str],
    pre_values: &[f64],
    post_values: &[f64],
    series_labels: (&str, &str),
    delta_pp: f64,
    size: (u32, u32),
) -> Result<PathBuf> {
    let path = target(img_dir, slug);
    {
        let root = new_canvas(&path, slug, size)?;
        let (w, h) = (size.0 as i32, size.1 as i32);
        draw_text(&root, slug, title, (w / 2, 12), 24, FontStyle::Bold, BLACK, HPos::Center, VPos::Top)?;

        let plot_left = 60;
        let plot_right = w - 60;
        let plot_top = 110;
        let plot_bottom = h - 60;
        let n = categories.len().max(1) as i32;
        let slot = (plot_right - plot_left) / n;
        let bar_w = (slot * 7 / 20).max(6);
        let max = pre_values
            .iter()
            .chain(post_values.iter())
            .fold(0.0f64, |a, b| a.max(*b))
            .max(1.0);
        let scale = (plot_bottom - plot_top) as f64 / max;

        for (i, category) in categories.iter().enumerate() {
            let x_center = plot_left + slot * i as i32 + slot / 2;
            for (value, color, offset) in [
                (pre_values[i], COLOR_PRE, -bar_w / 2 - 2),
                (post_values[i], COLOR_POST, bar_w / 2 + 2),
            ] {
                let x_mid = x_center + offset;
                let y_top = plot_bottom - (value * scale).round() as i32;
                root.draw(&Rectangle::new(
                    [(x_mid - bar_w / 2, y_top), (x_mid + bar_w / 2, plot_bottom)],
                    color.filled(),
                ))
                .map_err(|e| chart_err(slug, e))?;
                draw_text(&root, slug, &format!("{:.1}%", value), (x_mid, y_top - 5), 15, FontStyle::Bold, BLACK, HPos::Center, VPos::Bottom)?;
            }
            draw_text(&root, slug, category, (x_center, plot_bottom + 8), 17, FontStyle::Normal, BLACK, HPos::Center, VPos::Top)?;
        }

        let delta_color = if delta_pp < 0.0 { DELTA_GOOD } else { DELTA_BAD };
        let delta = format!("Zmena: {:+.1} pb", delta_pp);
        draw_text(&root, slug, &delta, (plot_left + slot / 2, plot_top - 28), 17, FontStyle::Bold, delta_color, HPos::Center, VPos::Center)?;

        for (i, name) in [series_labels.0, series_labels.1].iter().enumerate() {
            let color = if i == 0 { COLOR_PRE } else { COLOR_POST };
            let y = plot_top - 60 + i as i32 * 20;
            root.draw(&Rectangle::new([(w - 220, y), (w - 206, y + 12)], color.filled()))
                .map_err(|e| chart_err(slug, e))?;
            draw_text(&root, slug, name, (w - 200, y + 6), 14, FontStyle::Normal, BLACK, HPos::Left, VPos::Center)?;
        }
        finish(root, slug)?;
    }
    log::info!("chart {} -> {}", slug, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bars() -> Vec<Bar> {
        vec![
            Bar {
                label: "Áno".to_string(),
                value: 84.0,
                annotation: "84 (63.2%)".to_string(),
            },
            Bar {
                label: "Nie".to_string(),
                value: 45.0,
                annotation: "45 (33.8%)".to_string(),
            },
        ]
    }

    #[test]
    fn horizontal_bars_write_one_file_per_slug() {
        let dir = tempfile::tempdir().unwrap();
        let path = horizontal_bars(dir.path(), "pre_missed_school", "Vynechanie školy", &sample_bars(), (640, 320)).unwrap();
        assert_eq!(path, dir.path().join("pre_missed_school.png"));
        assert!(path.is_file());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn mean_line_sits_at_the_true_value_position() {
        assert_eq!(mean_offset(12.0, 12, 8, 800), 0);
        assert_eq!(mean_offset(16.0, 12, 8, 800), 400);
        assert_eq!(mean_offset(20.0, 12, 8, 800), 800);
        assert_eq!(mean_offset(14.5, 12, 8, 800), 250);
    }

    #[test]
    fn histogram_handles_out_of_range_mean_gracefully() {
        let dir = tempfile::tempdir().unwrap();
        let values = [12.0, 13.0, 13.0, 16.0, 19.0];
        let path = histogram(dir.path(), "pre_age", "Rozdelenie veku", &values, 12, 20, 14.6, "Vek", "Počet respondentiek", (640, 400)).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn comparison_chart_renders_both_series() {
        let dir = tempfile::tempdir().unwrap();
        let path = comparison_bars(
            dir.path(),
            "cross_absence",
            "Chýbanie v škole",
            &["Áno", "Nie"],
            &[63.2, 35.3],
            &[53.2, 45.6],
            ("Pred inštaláciou", "Po inštalácii"),
            -10.0,
            (800, 480),
        )
        .unwrap();
        assert!(path.is_file());
    }
}
