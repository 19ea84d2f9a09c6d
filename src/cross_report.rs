// Pre/post comparison. The absence comparison keeps secondary-school rows
// only on the pre side, since the after-installation survey ran at a single
// secondary school; the satisfaction metrics are computed against the full
// after-installation dataset.
use std::path::{Path, PathBuf};

use crate::aggregate::{count_categories, Share};
use crate::chart::{self, Bar};
use crate::error::Result;
use crate::normalize::Answer;
use crate::types::{PostRecord, PreRecord, ELEMENTARY_SCHOOL};

pub struct CrossCharts {
    pub absence: PathBuf,
    pub satisfaction: PathBuf,
}

pub struct CrossReport {
    pub pre_yes: Share,
    pub pre_no: Share,
    pub post_yes: Share,
    pub post_no: Share,
    /// Percentage-point change of "Áno" absences; negative means fewer girls
    /// missed school after the installation.
    pub delta_pp: f64,
    pub used_at_least_once: Share,
    pub useful_yes: Share,
    pub continue_yes: Share,
    pub future_yes_or_maybe: Share,
    pub charts: CrossCharts,
}

pub fn analyze(
    pre_records: &[PreRecord],
    post_records: &[PostRecord],
    img_dir: &Path,
) -> Result<CrossReport> {
    let num_after = post_records.len();

    let pre_secondary: Vec<&PreRecord> = pre_records
        .iter()
        .filter(|r| r.school != ELEMENTARY_SCHOOL)
        .collect();
    log::info!(
        "cross analysis: {} secondary-school pre rows, {} post rows",
        pre_secondary.len(),
        num_after
    );

    let pre_absence = count_categories(
        pre_secondary
            .iter()
            .map(|r| r.missed_school.cross_label()),
    );
    let post_absence = count_categories(
        post_records
            .iter()
            .map(|r| Answer::parse(&r.missed_school).cross_label()),
    );

    let pre_total = pre_absence.mapped_total();
    let post_total = post_absence.mapped_total();
    let pre_yes = pre_absence.share("Áno", pre_total, "absencia pred (stredná škola)")?;
    let pre_no = pre_absence.share("Nie", pre_total, "absencia pred (stredná škola)")?;
    let post_yes = post_absence.share("Áno", post_total, "absencia po")?;
    let post_no = post_absence.share("Nie", post_total, "absencia po")?;
    let delta_pp = post_yes.pct() - pre_yes.pct();

    let chart_absence = chart::comparison_bars(
        img_dir,
        "cross_absence",
        "Chýbanie v škole kvôli menštruácii",
        &["Áno", "Nie"],
        &[pre_yes.pct(), pre_no.pct()],
        &[post_yes.pct(), post_no.pct()],
        ("Pred inštaláciou", "Po inštalácii"),
        delta_pp,
        (1000, 600),
    )?;

    // Satisfaction metrics, all against the row count of the after survey.
    let used_count = post_records
        .iter()
        .filter(|r| {
            matches!(
                r.free_products_usage.trim(),
                "Ano, viackrát" | "Ano, raz"
            )
        })
        .count();
    let used_at_least_once = Share::new(used_count, num_after, "využitie pomôcok aspoň raz")?;
    let useful_yes = Share::new(
        post_records
            .iter()
            .filter(|r| r.project_useful.trim() == "Ano")
            .count(),
        num_after,
        "užitočnosť projektu",
    )?;
    let continue_yes = Share::new(
        post_records
            .iter()
            .filter(|r| r.keep_providing.trim() == "Ano")
            .count(),
        num_after,
        "pokračovanie projektu",
    )?;
    let future_yes_or_maybe = Share::new(
        post_records
            .iter()
            .filter(|r| matches!(r.future_years.trim(), "Ano, určite" | "Možno"))
            .count(),
        num_after,
        "vložky v ďalších rokoch",
    )?;

    let metric_bars = [
        ("Využili bezplatné pomôcky\naspoň raz", used_at_least_once),
        ("Projekt bol užitočný\npre dievčatá", useful_yes),
        ("Chcú pokračovanie\nprojektu", continue_yes),
        (
            "Chcú bezplatné pomôcky\naj v ďalších rokoch",
            future_yes_or_maybe,
        ),
    ]
    .iter()
    .map(|(label, share)| Bar {
        label: label.to_string(),
        value: share.pct(),
        annotation: format!("{:.1}%", share.pct()),
    })
    .collect::<Vec<_>>();
    let chart_satisfaction = chart::horizontal_bars(
        img_dir,
        "cross_satisfaction",
        "Ukazovatele spokojnosti s projektom",
        &metric_bars,
        (1200, 500),
    )?;

    Ok(CrossReport {
        pre_yes,
        pre_no,
        post_yes,
        post_no,
        delta_pp,
        used_at_least_once,
        useful_yes,
        continue_yes,
        future_yes_or_maybe,
        charts: CrossCharts {
            absence: chart_absence,
            satisfaction: chart_satisfaction,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pre(school: &str, missed: Answer) -> PreRecord {
        PreRecord {
            school: school.to_string(),
            missed_school: missed,
            ..PreRecord::default()
        }
    }

    fn post(missed: &str) -> PostRecord {
        PostRecord {
            missed_school: missed.to_string(),
            free_products_usage: "Ano, raz".to_string(),
            project_useful: "Ano".to_string(),
            keep_providing: "Ano".to_string(),
            future_years: "Možno".to_string(),
            ..PostRecord::default()
        }
    }

    #[test]
    fn elementary_school_rows_are_excluded_from_the_pre_side() {
        let dir = tempfile::tempdir().unwrap();
        let pre_rows = vec![
            pre("Strednú odbornú školu", Answer::Yes),
            pre("Strednú odbornú školu", Answer::Yes),
            pre("Strednú odbornú školu", Answer::No),
            pre(ELEMENTARY_SCHOOL, Answer::Yes),
            pre(ELEMENTARY_SCHOOL, Answer::Yes),
        ];
        let post_rows = vec![post("Ano"), post("Nie"), post("Nie"), post("Nie")];

        let report = analyze(&pre_rows, &post_rows, dir.path()).unwrap();
        // 2 of 3 secondary-school rows said yes.
        assert_eq!(report.pre_yes.count, 2);
        assert_eq!(report.pre_yes.denominator, 3);
        assert_eq!(report.post_yes.count, 1);
        assert_eq!(report.post_yes.denominator, 4);
    }

    #[test]
    fn delta_is_negative_when_absence_drops() {
        let dir = tempfile::tempdir().unwrap();
        let pre_rows = vec![
            pre("Strednú odbornú školu", Answer::Yes),
            pre("Strednú odbornú školu", Answer::Yes),
            pre("Strednú odbornú školu", Answer::No),
        ];
        let post_rows = vec![post("Ano"), post("Nie"), post("Nie"), post("Nie")];
        let report = analyze(&pre_rows, &post_rows, dir.path()).unwrap();
        assert!(report.delta_pp < 0.0);
        assert!((report.delta_pp - (25.0 - 200.0 / 3.0)).abs() < 1e-9);
        assert!(report.charts.absence.is_file());
    }

    #[test]
    fn satisfaction_metrics_divide_by_all_post_rows() {
        let dir = tempfile::tempdir().unwrap();
        let pre_rows = vec![pre("Strednú odbornú školu", Answer::Yes)];
        let mut post_rows = vec![post("Ano"), post("Ano")];
        post_rows[1].free_products_usage = "Nie".to_string();
        post_rows[1].project_useful = "Nie".to_string();

        let report = analyze(&pre_rows, &post_rows, dir.path()).unwrap();
        assert_eq!(report.used_at_least_once.count, 1);
        assert_eq!(report.used_at_least_once.denominator, 2);
        assert_eq!(report.useful_yes.count, 1);
        assert_eq!(report.future_yes_or_maybe.count, 2);
    }
}
