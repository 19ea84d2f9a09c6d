// After-installation analysis: sixteen charts and the shares quoted by the
// report captions. Except for the future-topics multi-select, every chart
// computes its percentages against the mapped answers of its own question.
use std::path::{Path, PathBuf};

use crate::aggregate::{count_categories, indicator_sums, CategoryCount, CategoryCounts, Share};
use crate::chart::{self, Bar};
use crate::error::Result;
use crate::normalize::{
    capitalize, AFTER_AGE, AFTER_ANSWER, ABSENCE_REASON, ATTENDANCE, CONFIDENT, CONTINUE_PROJECT,
    DAYS_MISSED, DISCUSSION, FEELINGS, FREE_PRODUCTS_USAGE, FUTURE_YEARS, LECTURES, PSYCH_BENEFIT,
    SPECIFIC_HELP,
};
use crate::types::PostRecord;

pub struct AfterCharts {
    pub age: PathBuf,
    pub missed_school: PathBuf,
    pub days_missed: PathBuf,
    pub reasons: PathBuf,
    pub used_pads: PathBuf,
    pub products_detail: PathBuf,
    pub attendance: PathBuf,
    pub feelings: PathBuf,
    pub confident: PathBuf,
    pub continue_project: PathBuf,
    pub future: PathBuf,
    pub discussion: PathBuf,
    pub psych: PathBuf,
    pub lectures: PathBuf,
    pub help: PathBuf,
    pub topics: PathBuf,
}

pub struct AfterReport {
    pub num: usize,
    pub age_16_18: Share,
    pub age_over_18: Share,
    pub age_unstated: usize,
    pub missed_yes: Share,
    pub days_one: Share,
    pub days_less_one: Share,
    pub reason_pain: Share,
    pub used_pads_yes: Share,
    pub used_pads_no: Share,
    pub used_multiple: Share,
    pub used_once: Share,
    pub knew_not_needed: Share,
    pub did_not_know: Share,
    pub attendance_more: Share,
    pub attendance_same: Share,
    pub feel_better: Share,
    pub feel_same: Share,
    pub feel_worse: Share,
    pub confident_yes: Share,
    pub continue_yes: Share,
    pub future_definitely: Share,
    pub future_combined: Share,
    pub discussion_definitely: Share,
    pub discussion_positive: Share,
    pub psych_yes: Share,
    pub psych_partial: Share,
    pub psych_positive: Share,
    pub lectures_definitely: Share,
    pub lectures_positive: Share,
    pub help_calmer: Share,
    pub help_overflow: Share,
    pub help_stress: Share,
    pub top_topics: Vec<(&'static str, usize)>,
    pub charts: AfterCharts,
}

fn after_bar(count: usize, label: &str, denominator: usize) -> Bar {
    let pct = count as f64 / denominator.max(1) as f64 * 100.0;
    Bar {
        label: wrap_label(label),
        value: count as f64,
        annotation: format!("{} {:.1}%", count, pct),
    }
}

/// Break labels that would overflow the left gutter into two lines, at the
/// space nearest the middle.
fn wrap_label(label: &str) -> String {
    if label.chars().count() <= 30 || label.contains('\n') {
        return label.to_string();
    }
    let mid = label.len() / 2;
    let split = label
        .char_indices()
        .filter(|(_, c)| *c == ' ')
        .map(|(i, _)| i)
        .min_by_key(|i| i.abs_diff(mid));
    match split {
        Some(i) => format!("{}\n{}", &label[..i], &label[i + 1..]),
        None => label.to_string(),
    }
}

fn bars_from(counts: &[CategoryCount], denominator: usize) -> Vec<Bar> {
    counts
        .iter()
        .map(|c| after_bar(c.count, &c.label, denominator))
        .collect()
}

struct Question {
    counts: CategoryCounts,
}

impl Question {
    fn new<'a>(
        records: &'a [PostRecord],
        field: impl Fn(&'a PostRecord) -> Option<&'static str>,
    ) -> Question {
        Question {
            counts: count_categories(records.iter().map(field)),
        }
    }

    fn denominator(&self) -> usize {
        self.counts.mapped_total()
    }

    fn share(&self, label: &str, context: &str) -> Result<Share> {
        self.counts.share(label, self.denominator(), context)
    }
}

pub fn analyze(records: &[PostRecord], img_dir: &Path) -> Result<AfterReport> {
    let num = records.len();
    log::info!("analyzing after-installation dataset, {} rows", num);

    // Age bands; blanks stay unmapped and are reported separately.
    let age = Question::new(records, |r| AFTER_AGE.canonical(&r.age));
    let age_bars: Vec<Bar> = age
        .counts
        .by_frequency()
        .iter()
        .map(|c| after_bar(c.count, &c.label, age.denominator()))
        .collect();
    let chart_age = chart::vertical_bars(
        img_dir,
        "after_age",
        "Rozdelenie veku respondentiek",
        &age_bars,
        Some("Vek"),
        (800, 500),
    )?;
    let age_16_18 = age.share("16-18", "vek (po)")?;
    let age_over_18 = age.share("Viac ako 18", "vek (po)")?;

    let missed = Question::new(records, |r| AFTER_ANSWER.canonical(&r.missed_school));
    let missed_bars = bars_from(
        &missed
            .counts
            .ordered_zero_filled(&["Áno", "Nie", "Nechcem odpovedať"]),
        missed.denominator(),
    );
    let chart_missed = chart::horizontal_bars(
        img_dir,
        "after_missed_school",
        "Chýbali ste niekedy v škole kvôli menštruácii?",
        &missed_bars,
        (800, 500),
    )?;
    let missed_yes = missed.share("Áno", "absencia (po)")?;

    let days = Question::new(records, |r| DAYS_MISSED.canonical(&r.days_missed));
    let days_order = ["Menej ako 1 deň", "1 deň", "2 dni", "3 dni", "Viac ako 3 dni"];
    let days_bars = bars_from(&days.counts.ordered(&days_order), days.denominator());
    let chart_days = chart::horizontal_bars(
        img_dir,
        "after_days_missed",
        "Koľko dní ste chýbali kvôli menštruácii?",
        &days_bars,
        (800, 500),
    )?;
    let days_one = days.share("1 deň", "vymeškané dni")?;
    let days_less_one = days.share("Menej ako 1 deň", "vymeškané dni")?;

    let reasons = Question::new(records, |r| ABSENCE_REASON.canonical(&r.absence_reason));
    let reason_bars = bars_from(&reasons.counts.by_frequency(), reasons.denominator());
    let chart_reasons = chart::horizontal_bars(
        img_dir,
        "after_reasons",
        "Dôvod absencie počas menštruácie",
        &reason_bars,
        (800, 500),
    )?;
    let reason_pain = reasons.share("Bolesť", "dôvod absencie")?;

    let used_pads = Question::new(records, |r| AFTER_ANSWER.canonical(&r.used_free_pads));
    let used_pads_bars = bars_from(
        &used_pads
            .counts
            .ordered_zero_filled(&["Áno", "Nie", "Nechcem odpovedať"]),
        used_pads.denominator(),
    );
    let chart_used_pads = chart::horizontal_bars(
        img_dir,
        "after_used_pads",
        "Používali ste bezplatné vložky poskytované v škole?",
        &used_pads_bars,
        (800, 500),
    )?;
    let used_pads_yes = used_pads.share("Áno", "bezplatné vložky")?;
    let used_pads_no = used_pads.share("Nie", "bezplatné vložky")?;

    let usage = Question::new(records, |r| {
        FREE_PRODUCTS_USAGE.canonical(&r.free_products_usage)
    });
    let usage_order = [
        "Áno, viackrát",
        "Áno, raz",
        "Nie",
        "Vedela som o nich, ale nepotrebovala som ich",
        "Nevedela som, že sú dostupné",
    ];
    let usage_bars = bars_from(&usage.counts.ordered(&usage_order), usage.denominator());
    let chart_products = chart::horizontal_bars(
        img_dir,
        "after_products_detail",
        "Využili ste niekedy menštruačné pomôcky poskytované v rámci projektu zdarma v škole?",
        &usage_bars,
        (1000, 500),
    )?;
    let used_multiple = usage.share("Áno, viackrát", "využitie pomôcok")?;
    let used_once = usage.share("Áno, raz", "využitie pomôcok")?;
    let knew_not_needed = usage.share(
        "Vedela som o nich, ale nepotrebovala som ich",
        "využitie pomôcok",
    )?;
    let did_not_know = usage.share("Nevedela som, že sú dostupné", "využitie pomôcok")?;

    let attendance = Question::new(records, |r| ATTENDANCE.canonical(&r.attendance));
    let attendance_order = [
        "Áno, chodila som do školy častejšie",
        "Nie, nezmenilo sa to",
        "Neviem posúdiť",
    ];
    let attendance_bars = bars_from(
        &attendance.counts.ordered(&attendance_order),
        attendance.denominator(),
    );
    let chart_attendance = chart::horizontal_bars(
        img_dir,
        "after_attendance",
        "Ovplyvnilo to vašu dochádzku do školy počas menštruácie?",
        &attendance_bars,
        (800, 500),
    )?;
    let attendance_more = attendance.share("Áno, chodila som do školy častejšie", "dochádzka")?;
    let attendance_same = attendance.share("Nie, nezmenilo sa to", "dochádzka")?;

    let feelings = Question::new(records, |r| FEELINGS.canonical(&r.feelings));
    let feelings_order = ["Lepšie ako predtým", "Rovnako", "Horšie"];
    let feelings_bars = bars_from(
        &feelings.counts.ordered(&feelings_order),
        feelings.denominator(),
    );
    let chart_feelings = chart::horizontal_bars(
        img_dir,
        "after_feelings",
        "Ako sa cítite počas menštruácie v škole teraz (počas projektu)?",
        &feelings_bars,
        (800, 500),
    )?;
    let feel_better = feelings.share("Lepšie ako predtým", "pocity v škole")?;
    let feel_same = feelings.share("Rovnako", "pocity v škole")?;
    let feel_worse = feelings.share("Horšie", "pocity v škole")?;

    let confident = Question::new(records, |r| CONFIDENT.canonical(&r.confident));
    let confident_bars = bars_from(
        &confident.counts.ordered(&["Áno", "Nie", "Neviem"]),
        confident.denominator(),
    );
    let chart_confident = chart::horizontal_bars(
        img_dir,
        "after_confident",
        "Cítite sa istejšie, keď viete, že máte v škole k dispozícii hygienické pomôcky?",
        &confident_bars,
        (800, 500),
    )?;
    let confident_yes = confident.share("Áno", "pocit istoty")?;

    let continue_project = Question::new(records, |r| {
        CONTINUE_PROJECT.canonical(&r.keep_providing)
    });
    let continue_bars = bars_from(
        &continue_project
            .counts
            .ordered_zero_filled(&["Áno", "Je mi to jedno"]),
        continue_project.denominator(),
    );
    let chart_continue = chart::horizontal_bars(
        img_dir,
        "after_continue",
        "Chceli by ste, aby sa poskytovanie vložiek na škole zachovalo aj naďalej?",
        &continue_bars,
        (800, 500),
    )?;
    let continue_yes = continue_project.share("Áno", "pokračovanie projektu")?;

    let future = Question::new(records, |r| FUTURE_YEARS.canonical(&r.future_years));
    let future_bars = bars_from(
        &future.counts.ordered_zero_filled(&["Áno, určite", "Možno"]),
        future.denominator(),
    );
    let chart_future = chart::horizontal_bars(
        img_dir,
        "after_future",
        "Chceli by ste, aby boli vložky zadarmo poskytované aj v ďalších školských rokoch?",
        &future_bars,
        (800, 500),
    )?;
    let future_definitely = future.share("Áno, určite", "vložky v ďalších rokoch")?;
    let future_combined = Share::new(
        future.counts.get("Áno, určite") + future.counts.get("Možno"),
        future.denominator(),
        "vložky v ďalších rokoch",
    )?;

    let discussion = Question::new(records, |r| DISCUSSION.canonical(&r.open_discussion));
    let discussion_order = ["Určite áno", "Skôr áno", "Skôr nie", "Určite nie"];
    let discussion_bars = bars_from(
        &discussion.counts.ordered(&discussion_order),
        discussion.denominator(),
    );
    let chart_discussion = chart::horizontal_bars(
        img_dir,
        "after_discussion",
        "Myslíte si, že projekt prispel k otvorenejšej diskusii o menštruácii v škole?",
        &discussion_bars,
        (1000, 500),
    )?;
    let discussion_definitely = discussion.share("Určite áno", "otvorenosť diskusie")?;
    let discussion_positive = Share::new(
        discussion.counts.get("Určite áno") + discussion.counts.get("Skôr áno"),
        discussion.denominator(),
        "otvorenosť diskusie",
    )?;

    // Mixed capitalization in this column, normalized before the lookup.
    let psych = Question::new(records, |r| {
        PSYCH_BENEFIT.canonical(&capitalize(&r.psych_better))
    });
    let psych_bars = bars_from(
        &psych.counts.ordered(&["Áno", "Čiastočne", "Neviem", "Nie"]),
        psych.denominator(),
    );
    let chart_psych = chart::horizontal_bars(
        img_dir,
        "after_psych",
        "Cítili ste sa vďaka projektu psychicky lepšie?",
        &psych_bars,
        (800, 500),
    )?;
    let psych_yes = psych.share("Áno", "psychický prínos")?;
    let psych_partial = psych.share("Čiastočne", "psychický prínos")?;
    let psych_positive = Share::new(
        psych.counts.get("Áno") + psych.counts.get("Čiastočne"),
        psych.denominator(),
        "psychický prínos",
    )?;

    let lectures = Question::new(records, |r| LECTURES.canonical(&r.lectures_helpful));
    let lectures_order = [
        "Určite áno",
        "Skôr áno",
        "Neviem posúdiť",
        "Skôr nie",
        "Určite nie",
    ];
    let lectures_bars = bars_from(
        &lectures.counts.ordered(&lectures_order),
        lectures.denominator(),
    );
    let chart_lectures = chart::horizontal_bars(
        img_dir,
        "after_lectures",
        "Pomohli vám prednášky získať nové informácie alebo iný pohľad na túto tému?",
        &lectures_bars,
        (800, 500),
    )?;
    let lectures_definitely = lectures.share("Určite áno", "prínos prednášok")?;
    let lectures_positive = Share::new(
        lectures.counts.get("Určite áno") + lectures.counts.get("Skôr áno"),
        lectures.denominator(),
        "prínos prednášok",
    )?;

    let help = Question::new(records, |r| SPECIFIC_HELP.canonical(&r.specific_help));
    let help_order = [
        "Cítila som sa pokojnejšie a bezpečnejšie",
        "Pomohlo mi vyhnúť sa pretečeniu/nepríjemnostiam",
        "Nemala som pri sebe pomôcku, pomohlo mi to prekonať stres",
        "Pomohlo mi to s infekciami alebo zdravotným diskomfortom",
        "Nepomohlo / nič z toho sa ma netýka",
        "Iné",
    ];
    let help_bars = bars_from(&help.counts.ordered(&help_order), help.denominator());
    let chart_help = chart::horizontal_bars(
        img_dir,
        "after_help",
        "Pomohlo vám to vyriešiť niektorý konkrétny problém?",
        &help_bars,
        (1000, 500),
    )?;
    let help_calmer = help.share("Cítila som sa pokojnejšie a bezpečnejšie", "konkrétna pomoc")?;
    let help_overflow = help.share(
        "Pomohlo mi vyhnúť sa pretečeniu/nepríjemnostiam",
        "konkrétna pomoc",
    )?;
    let help_stress = help.share(
        "Nemala som pri sebe pomôcku, pomohlo mi to prekonať stres",
        "konkrétna pomoc",
    )?;

    // Multi-select future topics, counted against the whole dataset.
    let topic_items = [
        (
            "Gynekologické problémy a prevencia",
            records.iter().filter(|r| r.topic_gynecology).count(),
        ),
        (
            "Telesné zmeny v období dospievania",
            records.iter().filter(|r| r.topic_body_changes).count(),
        ),
        (
            "Vzťah menštruácie a psychického zdravia",
            records.iter().filter(|r| r.topic_mental_health).count(),
        ),
        (
            "Starostlivosť počas menštruácie",
            records.iter().filter(|r| r.topic_care).count(),
        ),
        (
            "Práva a dôstojnosť žien",
            records.iter().filter(|r| r.topic_rights).count(),
        ),
        ("Iné", records.iter().filter(|r| r.topic_other).count()),
    ];
    let top_topics = indicator_sums(&topic_items, false);
    let topic_bars: Vec<Bar> = top_topics
        .iter()
        .map(|(label, count)| after_bar(*count, label, num))
        .collect();
    let chart_topics = chart::horizontal_bars(
        img_dir,
        "after_topics",
        "Aké témy by ste do budúcna uvítali na prednáškach?",
        &topic_bars,
        (1000, 500),
    )?;

    Ok(AfterReport {
        num,
        age_16_18,
        age_over_18,
        age_unstated: age.counts.unmapped,
        missed_yes,
        days_one,
        days_less_one,
        reason_pain,
        used_pads_yes,
        used_pads_no,
        used_multiple,
        used_once,
        knew_not_needed,
        did_not_know,
        attendance_more,
        attendance_same,
        feel_better,
        feel_same,
        feel_worse,
        confident_yes,
        continue_yes,
        future_definitely,
        future_combined,
        discussion_definitely,
        discussion_positive,
        psych_yes,
        psych_partial,
        psych_positive,
        lectures_definitely,
        lectures_positive,
        help_calmer,
        help_overflow,
        help_stress,
        top_topics,
        charts: AfterCharts {
            age: chart_age,
            missed_school: chart_missed,
            days_missed: chart_days,
            reasons: chart_reasons,
            used_pads: chart_used_pads,
            products_detail: chart_products,
            attendance: chart_attendance,
            feelings: chart_feelings,
            confident: chart_confident,
            continue_project: chart_continue,
            future: chart_future,
            discussion: chart_discussion,
            psych: chart_psych,
            lectures: chart_lectures,
            help: chart_help,
            topics: chart_topics,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(missed: &str, age: &str) -> PostRecord {
        PostRecord {
            age: age.to_string(),
            missed_school: missed.to_string(),
            days_missed: "1 deň".to_string(),
            absence_reason: "Mala som bolesti".to_string(),
            used_free_pads: "Ano".to_string(),
            free_products_usage: "Ano, raz".to_string(),
            attendance: "Nie, nezmenilo sa to".to_string(),
            feelings: "Rovnako".to_string(),
            confident: "Ano".to_string(),
            keep_providing: "Ano".to_string(),
            future_years: "Ano, určite".to_string(),
            open_discussion: "Skôr ano".to_string(),
            psych_better: "ano".to_string(),
            project_useful: "Ano".to_string(),
            lectures_helpful: "Skôr ano".to_string(),
            specific_help: "Iné".to_string(),
            topic_care: true,
            ..PostRecord::default()
        }
    }

    #[test]
    fn chart_shares_use_mapped_totals_not_row_counts() {
        let dir = tempfile::tempdir().unwrap();
        let mut rows = vec![record("Ano", "16-18"); 3];
        rows.push(record("Nie", "16-18"));
        rows.push(record("čosi", ""));

        let report = analyze(&rows, dir.path()).unwrap();
        assert_eq!(report.num, 5);
        // One row with an unknown absence answer drops out of the denominator.
        assert_eq!(report.missed_yes.count, 3);
        assert_eq!(report.missed_yes.denominator, 4);
        assert_eq!(report.age_unstated, 1);
        assert_eq!(report.age_16_18.denominator, 4);
        assert!(report.charts.missed_school.is_file());
        assert!(report.charts.topics.is_file());
    }

    #[test]
    fn psych_answers_are_case_normalized_before_counting() {
        let dir = tempfile::tempdir().unwrap();
        let mut rows = vec![record("Ano", "16-18"); 2];
        rows[0].psych_better = "ANO".to_string();
        rows[1].psych_better = "Čiastočne".to_string();
        let report = analyze(&rows, dir.path()).unwrap();
        assert_eq!(report.psych_yes.count, 1);
        assert_eq!(report.psych_partial.count, 1);
        assert_eq!(report.psych_positive.count, 2);
    }

    #[test]
    fn combined_shares_add_adjacent_categories() {
        let dir = tempfile::tempdir().unwrap();
        let mut rows = vec![record("Ano", "16-18"); 4];
        rows[0].open_discussion = "Určite ano".to_string();
        rows[1].open_discussion = "Určite ano".to_string();
        rows[2].open_discussion = "Skôr ano".to_string();
        rows[3].open_discussion = "Skôr nie".to_string();
        let report = analyze(&rows, dir.path()).unwrap();
        assert_eq!(report.discussion_definitely.count, 2);
        assert_eq!(report.discussion_positive.count, 3);
        assert_eq!(report.discussion_positive.denominator, 4);
    }
}
