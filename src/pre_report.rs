// Pre-installation analysis: thirteen charts plus the headline statistics
// the report narrative interpolates.
use std::path::{Path, PathBuf};

use crate::aggregate::{cohort_means, count_categories, indicator_sums, Cohort, Share};
use crate::chart::{self, Bar, BarGroup};
use crate::error::{ReportError, Result};
use crate::normalize::{Answer, INFO_PREP};
use crate::types::{AgeGroup, PreRecord, SiblingGroup};
use crate::util;

const MISSED_ORDER: [&str; 3] = ["Nechcem odpovedať", "Nie", "Áno"];

#[derive(Debug)]
pub struct PreCharts {
    pub age: PathBuf,
    pub first_period: PathBuf,
    pub missed_school: PathBuf,
    pub afford: PathBuf,
    pub info_prep: PathBuf,
    pub info_sources: PathBuf,
    pub info_age: PathBuf,
    pub products: PathBuf,
    pub amenities: PathBuf,
    pub siblings_amenities: PathBuf,
    pub age_amenities: PathBuf,
    pub symptoms: PathBuf,
    pub tampon_water: PathBuf,
}

/// Everything the pre-installation sections of the report need: chart files
/// and the shares quoted in the captions. Every `Share` carries the
/// denominator it was computed against.
#[derive(Debug)]
pub struct PreReport {
    pub num: usize,
    pub avg_age: f64,
    pub min_age: f64,
    pub max_age: f64,
    pub mode_ages: Vec<i64>,
    pub avg_first_period: f64,
    pub min_first_period: f64,
    pub max_first_period: f64,
    pub mode_first_periods: Vec<i64>,
    pub missed_yes: Share,
    pub afford_yes: Share,
    pub no_info: Share,
    pub partial_info: Share,
    pub insufficient_info: Share,
    pub info_mother: Share,
    pub info_school: Share,
    pub info_internet: Share,
    pub info_lectures: Share,
    pub info_age_means: Vec<(&'static str, f64)>,
    pub product_pads: Share,
    pub product_tampons: Share,
    pub product_liners: Share,
    pub product_panties: Share,
    pub product_rags_count: usize,
    pub full_access: Share,
    pub lacking_any: Share,
    pub sibling_corr: Option<f64>,
    pub sibling_cohorts: Vec<Cohort>,
    pub age_corr: Option<f64>,
    pub age_cohorts: Vec<Cohort>,
    pub symptom_anger: Share,
    pub symptom_pain: Share,
    pub symptom_sadness: Share,
    pub symptom_fatigue: Share,
    pub tampon_users: usize,
    pub tampon_no_water: Share,
    pub stress_change_yes: Share,
    pub charts: PreCharts,
}

impl PreReport {
    /// Mean of a cohort bin; `None` when no respondent fell into the bin, so
    /// the narrative reports the absence instead of a zero.
    pub fn cohort_mean(cohorts: &[Cohort], label: &str) -> Option<f64> {
        cohorts.iter().find(|c| c.label == label).map(|c| c.mean)
    }

    pub fn info_age_mean(&self, label: &str) -> Option<f64> {
        self.info_age_means
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, m)| *m)
    }
}

/// Integer values tied for the highest frequency, ascending.
fn modes(values: &[f64]) -> Vec<i64> {
    let mut counts: Vec<(i64, usize)> = Vec::new();
    for v in values {
        let key = v.round() as i64;
        if let Some(entry) = counts.iter_mut().find(|(k, _)| *k == key) {
            entry.1 += 1;
        } else {
            counts.push((key, 1));
        }
    }
    let best = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let mut modes: Vec<i64> = counts
        .iter()
        .filter(|(_, c)| *c == best)
        .map(|(k, _)| *k)
        .collect();
    modes.sort_unstable();
    modes
}

fn require_mean(values: &[f64], context: &str) -> Result<f64> {
    util::mean(values).ok_or_else(|| ReportError::EmptyAggregation {
        context: context.to_string(),
    })
}

fn count_share(count: usize, denominator: usize, context: &str) -> Result<Share> {
    Share::new(count, denominator, context)
}

fn pre_bar(count: usize, label: &str, denominator: usize) -> Bar {
    let pct = count as f64 / denominator as f64 * 100.0;
    Bar {
        label: label.to_string(),
        value: count as f64,
        annotation: format!("{} ({:.1}%)", count, pct),
    }
}

pub fn analyze(records: &[PreRecord], img_dir: &Path) -> Result<PreReport> {
    let num = records.len();
    log::info!("analyzing pre-installation dataset, {} rows", num);

    let ages: Vec<f64> = records.iter().filter_map(|r| r.age).collect();
    let avg_age = require_mean(&ages, "vek respondentiek (pred)")?;
    let first_periods: Vec<f64> = records.iter().filter_map(|r| r.first_period_age).collect();
    let avg_first_period = require_mean(&first_periods, "vek prvej menštruácie")?;

    let chart_age = chart::histogram(
        img_dir,
        "pre_age",
        "Rozdelenie veku respondentiek",
        &ages,
        12,
        20,
        avg_age,
        "Vek",
        "Počet respondentiek",
        (1000, 600),
    )?;
    let chart_first = chart::histogram(
        img_dir,
        "pre_first_period",
        "Rozdelenie veku prvej menštruácie",
        &first_periods,
        8,
        16,
        avg_first_period,
        "Vek prvej menštruácie",
        "Počet respondentiek",
        (1000, 600),
    )?;

    // Missed school, fixed three-way order with Áno on top.
    let missed = count_categories(records.iter().map(|r| r.missed_school.strict_label()));
    let missed_bars: Vec<Bar> = missed
        .ordered(&MISSED_ORDER)
        .into_iter()
        .rev()
        .map(|c| pre_bar(c.count, &c.label, num))
        .collect();
    let chart_missed = chart::horizontal_bars(
        img_dir,
        "pre_missed_school",
        "Vynechanie školy kvôli menštruácii",
        &missed_bars,
        (1000, 400),
    )?;
    let missed_yes = missed.share("Áno", num, "vynechanie školy (pred)")?;

    // Affordability, most frequent answer at the bottom.
    let afford = count_categories(records.iter().map(|r| r.could_not_afford.strict_label()));
    let afford_bars: Vec<Bar> = afford
        .by_frequency()
        .into_iter()
        .rev()
        .map(|c| pre_bar(c.count, &c.label, num))
        .collect();
    let chart_afford = chart::horizontal_bars(
        img_dir,
        "pre_afford",
        "Nemožnosť kúpiť si menštruačné pomôcky z finančných dôvodov aspoň raz",
        &afford_bars,
        (1000, 400),
    )?;
    let afford_yes = afford.share("Áno", num, "dostupnosť pomôcok (pred)")?;

    let info_prep = count_categories(records.iter().map(|r| INFO_PREP.canonical(&r.preparedness)));
    let info_prep_bars: Vec<Bar> = info_prep
        .by_frequency()
        .into_iter()
        .rev()
        .map(|c| pre_bar(c.count, &c.label, num))
        .collect();
    let chart_info_prep = chart::horizontal_bars(
        img_dir,
        "pre_info_prep",
        "Dostatok informácií pred prvou menštruáciou",
        &info_prep_bars,
        (1000, 400),
    )?;
    let no_info = info_prep.share("Nemala som žiadne informácie", num, "informovanosť (pred)")?;
    let partial_info =
        info_prep.share("Mala som len čiastočné informácie", num, "informovanosť (pred)")?;
    let insufficient_info = Share::new(
        no_info.count + partial_info.count,
        num,
        "informovanosť (pred)",
    )?;

    // Multi-select information sources, largest on top.
    let info_items = [
        ("Mama", records.iter().filter(|r| r.info_mother).count()),
        ("Škola", records.iter().filter(|r| r.info_school).count()),
        ("Internet", records.iter().filter(|r| r.info_internet).count()),
        ("Kamarátky", records.iter().filter(|r| r.info_friends).count()),
        ("Sestra/sestry", records.iter().filter(|r| r.info_sister).count()),
        (
            "Iný rodinný príslušník",
            records.iter().filter(|r| r.info_family).count(),
        ),
        (
            "Prednášky/Workshopy",
            records.iter().filter(|r| r.info_lectures).count(),
        ),
    ];
    let info_sorted = indicator_sums(&info_items, false);
    let info_bars: Vec<Bar> = info_sorted
        .iter()
        .map(|(label, count)| pre_bar(*count, label, num))
        .collect();
    let chart_info_sources = chart::horizontal_bars(
        img_dir,
        "pre_info_sources",
        "Zdroje informácií o menštruácii",
        &info_bars,
        (1000, 500),
    )?;
    let source_share = |label: &str| -> Result<Share> {
        let count = info_items
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, c)| *c)
            .unwrap_or(0);
        count_share(count, num, "zdroje informácií")
    };
    let info_mother = source_share("Mama")?;
    let info_school = source_share("Škola")?;
    let info_internet = source_share("Internet")?;
    let info_lectures = source_share("Prednášky/Workshopy")?;

    // Mean age of first period per preparedness level.
    let prep_levels = [
        "Mala som len čiastočné informácie",
        "Nemala som žiadne informácie",
        "Áno, mala som všetky potrebné informácie",
    ];
    let mut info_age_means = Vec::new();
    for level in prep_levels {
        let values: Vec<f64> = records
            .iter()
            .filter(|r| INFO_PREP.canonical(&r.preparedness) == Some(level))
            .filter_map(|r| r.first_period_age)
            .collect();
        if let Some(mean) = util::mean(&values) {
            info_age_means.push((level, mean));
        }
    }
    let info_age_bars: Vec<Bar> = info_age_means
        .iter()
        .map(|(label, mean)| Bar {
            label: wrap_prep_label(label),
            value: *mean,
            annotation: format!("{:.1} rokov", mean),
        })
        .collect();
    let chart_info_age = chart::vertical_bars(
        img_dir,
        "pre_info_age",
        "Priemerný vek prvej menštruácie podľa úrovne informovanosti",
        &info_age_bars,
        Some("Úroveň informovanosti pred prvou menštruáciou"),
        (1000, 500),
    )?;

    let product_items = [
        ("Menštruačné vložky", records.iter().filter(|r| r.product_pads).count()),
        ("Tampóny", records.iter().filter(|r| r.product_tampons).count()),
        (
            "Menštruačné nohavičky",
            records.iter().filter(|r| r.product_panties).count(),
        ),
        ("Intímky", records.iter().filter(|r| r.product_liners).count()),
        ("Handry", records.iter().filter(|r| r.product_rags).count()),
    ];
    let product_sorted = indicator_sums(&product_items, false);
    let product_bars: Vec<Bar> = product_sorted
        .iter()
        .map(|(label, count)| pre_bar(*count, label, num))
        .collect();
    let chart_products = chart::horizontal_bars(
        img_dir,
        "pre_products",
        "Používané menštruačné pomôcky",
        &product_bars,
        (1000, 500),
    )?;
    let product_count = |label: &str| {
        product_items
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    };
    let product_pads = count_share(product_count("Menštruačné vložky"), num, "pomôcky")?;
    let product_tampons = count_share(product_count("Tampóny"), num, "pomôcky")?;
    let product_liners = count_share(product_count("Intímky"), num, "pomôcky")?;
    let product_panties = count_share(product_count("Menštruačné nohavičky"), num, "pomôcky")?;
    let product_rags_count = product_count("Handry");

    // Amenity access, three answer series per amenity.
    let amenity_series = [
        ("Áno", chart::COLOR_YES),
        ("Nie", chart::COLOR_NO),
        ("Nechcem odpovedať", chart::COLOR_NO_ANSWER),
    ];
    const AMENITY_LABELS: [&str; 4] = [
        "Prístup k teplej vode",
        "Prístup k sprche alebo vani",
        "Prístup k splachovaciemu WC",
        "Prístup ku kúreniu",
    ];
    let mut amenity_groups: Vec<BarGroup> = Vec::new();
    for label in AMENITY_LABELS.iter().rev() {
        let counts = count_categories(records.iter().map(|r| {
            r.amenities()
                .iter()
                .find(|(l, _)| l == label)
                .and_then(|(_, a)| a.strict_label())
        }));
        let values = amenity_series
            .iter()
            .map(|(answer, _)| {
                let count = counts.get(answer);
                let pct = count as f64 / num as f64 * 100.0;
                (count as f64, format!("{} ({:.1}%)", count, pct))
            })
            .collect();
        amenity_groups.push(BarGroup {
            label: label.to_string(),
            values,
        });
    }
    let full_access_count = records.iter().filter(|r| r.lack_count() == 0).count();
    let full_access = count_share(full_access_count, num, "plný prístup k vybavenosti")?;
    let lacking_any = count_share(num - full_access_count, num, "chýbajúca vybavenosť")?;
    let note = format!(
        "Plný prístup: {} ({})\nChýba ≥1: {} ({})",
        full_access.count,
        full_access.text(),
        lacking_any.count,
        lacking_any.text()
    );
    let chart_amenities = chart::grouped_horizontal_bars(
        img_dir,
        "pre_amenities",
        "Prístup k vybavenosti",
        &amenity_groups,
        &amenity_series,
        Some(&note),
        (1000, 600),
    )?;

    let sibling_cohorts = cohort_means(
        records
            .iter()
            .map(|r| (r.sibling_group(), r.lack_count() as f64)),
        &SiblingGroup::ORDER,
        SiblingGroup::label,
    );
    let cohort_bars = |cohorts: &[Cohort]| -> Vec<Bar> {
        cohorts
            .iter()
            .map(|c| Bar {
                label: c.label.to_string(),
                value: c.mean,
                annotation: format!("{:.2}\n(n={})", c.mean, c.n),
            })
            .collect()
    };
    let chart_siblings = chart::vertical_bars(
        img_dir,
        "pre_siblings_amenities",
        "Priemerný počet chýbajúcich vybaveností podľa počtu súrodencov",
        &cohort_bars(&sibling_cohorts),
        Some("Počet súrodencov"),
        (1000, 500),
    )?;
    let sibling_pairs: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| Some((r.siblings_count?, r.lack_count() as f64)))
        .collect();
    let sibling_corr = util::pearson(&sibling_pairs);

    let age_cohorts = cohort_means(
        records
            .iter()
            .map(|r| (r.age_group(), r.lack_count() as f64)),
        &AgeGroup::ORDER,
        AgeGroup::label,
    );
    let chart_age_amenities = chart::vertical_bars(
        img_dir,
        "pre_age_amenities",
        "Priemerný počet chýbajúcich vybaveností podľa vekovej skupiny",
        &cohort_bars(&age_cohorts),
        Some("Veková skupina"),
        (1000, 500),
    )?;
    let age_pairs: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| Some((r.age?, r.lack_count() as f64)))
        .collect();
    let age_corr = util::pearson(&age_pairs);

    let symptom_items = [
        ("Bolesť", records.iter().filter(|r| r.symptom_pain).count()),
        ("Únava", records.iter().filter(|r| r.symptom_fatigue).count()),
        (
            "Hnev / Nervozita / Náladovosť / Stres",
            records.iter().filter(|r| r.symptom_anger).count(),
        ),
        (
            "Smútok / Depresia / Úzkosť / Strach",
            records.iter().filter(|r| r.symptom_sadness).count(),
        ),
    ];
    let symptom_sorted = indicator_sums(&symptom_items, false);
    let symptom_bars: Vec<Bar> = symptom_sorted
        .iter()
        .map(|(label, count)| pre_bar(*count, label, num))
        .collect();
    let chart_symptoms = chart::horizontal_bars(
        img_dir,
        "pre_symptoms",
        "Symptómy pociťované počas menštruácie",
        &symptom_bars,
        (1000, 500),
    )?;
    let symptom_share = |label: &str| -> Result<Share> {
        let count = symptom_items
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, c)| *c)
            .unwrap_or(0);
        count_share(count, num, "symptómy")
    };
    let symptom_pain = symptom_share("Bolesť")?;
    let symptom_fatigue = symptom_share("Únava")?;
    let symptom_anger = symptom_share("Hnev / Nervozita / Náladovosť / Stres")?;
    let symptom_sadness = symptom_share("Smútok / Depresia / Úzkosť / Strach")?;

    // Hot-water access among tampon users only.
    let tampon_rows: Vec<&PreRecord> = records.iter().filter(|r| r.product_tampons).collect();
    let tampon_users = tampon_rows.len();
    let hot_water = count_categories(tampon_rows.iter().map(|r| r.hot_water.strict_label()));
    let tampon_bars: Vec<Bar> = hot_water
        .ordered(&MISSED_ORDER)
        .into_iter()
        .rev()
        .map(|c| pre_bar(c.count, &c.label, tampon_users.max(1)))
        .collect();
    let chart_tampon_water = chart::horizontal_bars(
        img_dir,
        "pre_tampon_water",
        "Prístup k teplej vode medzi používateľkami tampónov",
        &tampon_bars,
        (1000, 400),
    )?;
    let tampon_no_water = hot_water.share(
        "Nie",
        tampon_users,
        "teplá voda medzi používateľkami tampónov",
    )?;

    let stress_yes = records
        .iter()
        .filter(|r| r.change_stressful == Answer::Yes)
        .count();
    let stress_change_yes = count_share(stress_yes, num, "stres pri výmene pomôcok")?;

    Ok(PreReport {
        num,
        avg_age,
        min_age: ages.iter().copied().fold(f64::INFINITY, f64::min),
        max_age: ages.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mode_ages: modes(&ages),
        avg_first_period,
        min_first_period: first_periods.iter().copied().fold(f64::INFINITY, f64::min),
        max_first_period: first_periods
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max),
        mode_first_periods: modes(&first_periods),
        missed_yes,
        afford_yes,
        no_info,
        partial_info,
        insufficient_info,
        info_mother,
        info_school,
        info_internet,
        info_lectures,
        info_age_means,
        product_pads,
        product_tampons,
        product_liners,
        product_panties,
        product_rags_count,
        full_access,
        lacking_any,
        sibling_corr,
        sibling_cohorts,
        age_corr,
        age_cohorts,
        symptom_anger,
        symptom_pain,
        symptom_sadness,
        symptom_fatigue,
        tampon_users,
        tampon_no_water,
        stress_change_yes,
        charts: PreCharts {
            age: chart_age,
            first_period: chart_first,
            missed_school: chart_missed,
            afford: chart_afford,
            info_prep: chart_info_prep,
            info_sources: chart_info_sources,
            info_age: chart_info_age,
            products: chart_products,
            amenities: chart_amenities,
            siblings_amenities: chart_siblings,
            age_amenities: chart_age_amenities,
            symptoms: chart_symptoms,
            tampon_water: chart_tampon_water,
        },
    })
}

fn wrap_prep_label(label: &str) -> String {
    match label {
        "Áno, mala som všetky potrebné informácie" => {
            "Áno, mala som všetky\npotrebné informácie".to_string()
        }
        "Mala som len čiastočné informácie" => "Mala som len\nčiastočné informácie".to_string(),
        "Nemala som žiadne informácie" => "Nemala som\nžiadne informácie".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(age: f64, first: f64, missed: Answer, tampons: bool) -> PreRecord {
        PreRecord {
            age: Some(age),
            first_period_age: Some(first),
            missed_school: missed,
            product_tampons: tampons,
            product_pads: true,
            hot_water: Answer::Yes,
            shower: Answer::Yes,
            flush_toilet: Answer::Yes,
            heating: Answer::Yes,
            could_not_afford: Answer::No,
            preparedness: "Nemala som žiadne informácie".to_string(),
            siblings_count: Some(1.0),
            ..PreRecord::default()
        }
    }

    #[test]
    fn analyze_computes_shares_against_the_full_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut rows = Vec::new();
        for _ in 0..6 {
            rows.push(record(16.0, 12.0, Answer::Yes, true));
        }
        for _ in 0..4 {
            rows.push(record(14.0, 13.0, Answer::No, false));
        }
        let report = analyze(&rows, dir.path()).unwrap();

        assert_eq!(report.num, 10);
        assert_eq!(report.missed_yes.count, 6);
        assert_eq!(report.missed_yes.denominator, 10);
        assert_eq!(report.missed_yes.text(), "60.0%");
        assert_eq!(report.tampon_users, 6);
        assert_eq!(report.tampon_no_water.count, 0);
        assert_eq!(report.tampon_no_water.denominator, 6);
        assert!((report.avg_age - 15.2).abs() < 1e-9);
        assert_eq!(report.mode_ages, vec![16]);
        // Bins and preparedness levels with no rows have no mean at all.
        assert_eq!(PreReport::cohort_mean(&report.sibling_cohorts, "5+"), None);
        assert!(PreReport::cohort_mean(&report.sibling_cohorts, "1-2").is_some());
        assert!(report.info_age_mean("Nemala som žiadne informácie").is_some());
        assert_eq!(
            report.info_age_mean("Áno, mala som všetky potrebné informácie"),
            None
        );
        assert!(report.charts.missed_school.is_file());
        assert!(report.charts.amenities.is_file());
        assert!(report.charts.tampon_water.is_file());
    }

    #[test]
    fn tampon_subgroup_denominator_is_the_subgroup_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut rows = vec![record(15.0, 12.0, Answer::Yes, true); 4];
        rows[0].hot_water = Answer::No;
        rows.push(record(15.0, 12.0, Answer::Yes, false));
        let report = analyze(&rows, dir.path()).unwrap();
        assert_eq!(report.tampon_no_water.denominator, 4);
        assert_eq!(report.tampon_no_water.count, 1);
    }

    #[test]
    fn insufficient_info_combines_none_and_partial_levels() {
        let dir = tempfile::tempdir().unwrap();
        let mut rows = vec![record(15.0, 12.0, Answer::Yes, true); 5];
        rows[0].preparedness = "Mala som len čiastočné informácie".to_string();
        rows[1].preparedness = "Áno, mala som všetky potrebné informácie".to_string();
        let report = analyze(&rows, dir.path()).unwrap();
        assert_eq!(report.no_info.count, 3);
        assert_eq!(report.partial_info.count, 1);
        assert_eq!(report.insufficient_info.count, 4);
        assert_eq!(report.insufficient_info.denominator, 5);
    }

    #[test]
    fn analyze_fails_on_empty_dataset_instead_of_dividing_by_zero() {
        let dir = tempfile::tempdir().unwrap();
        let err = analyze(&[], dir.path()).unwrap_err();
        assert!(matches!(err, ReportError::EmptyAggregation { .. }));
    }
}
