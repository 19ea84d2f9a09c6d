// Report assembly. Builds a renderer-independent document model (headings,
// narrative paragraphs, bullets, chart images, page breaks) from the three
// analysis results; the narrative captions interpolate the computed shares so
// the text can never drift from the charts.
use std::path::PathBuf;

use chrono::Local;

use crate::after_report::AfterReport;
use crate::cross_report::CrossReport;
use crate::pre_report::PreReport;

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading1(String),
    Heading2(String),
    Paragraph(String),
    /// Italic gray caption under a chart.
    Outcome(String),
    Bullet(String),
    Image(PathBuf),
    PageBreak,
}

pub struct ReportDoc {
    pub title: String,
    pub subtitle: String,
    pub date_line: String,
    pub blocks: Vec<Block>,
}

fn join_years(modes: &[i64]) -> String {
    let parts: Vec<String> = modes.iter().map(|m| m.to_string()).collect();
    parts.join(" a ")
}

fn fmt_corr(corr: Option<f64>) -> String {
    match corr {
        Some(c) => format!("{:.2}", c),
        None => "N/A".to_string(),
    }
}

/// Cohort means at two decimals; absent cohorts render as "N/A" instead of a
/// fabricated zero.
fn fmt_mean(mean: Option<f64>) -> String {
    match mean {
        Some(m) => format!("{:.2}", m),
        None => "N/A".to_string(),
    }
}

/// Age means are quoted at one decimal.
fn fmt_age(mean: Option<f64>) -> String {
    match mean {
        Some(m) => format!("{:.1}", m),
        None => "N/A".to_string(),
    }
}

/// "pokles o X" / "nárast o X" depending on the sign of the change.
fn change_phrase(delta_pp: f64) -> String {
    if delta_pp < 0.0 {
        format!("pokles o {:.1} percentuálnych bodov", delta_pp.abs())
    } else {
        format!("nárast o {:.1} percentuálnych bodov", delta_pp.abs())
    }
}

fn absence_sentence(pre_pct: f64, post_pct: f64, delta_pp: f64) -> String {
    let verb = if delta_pp < 0.0 { "klesla" } else { "stúpla" };
    format!(
        "Absencia v škole kvôli menštruácii {} z {:.1}% na {:.1}%, čo predstavuje {}.",
        verb,
        pre_pct,
        post_pct,
        change_phrase(delta_pp)
    )
}

pub fn compose(pre: &PreReport, after: &AfterReport, cross: &CrossReport) -> ReportDoc {
    let mut b: Vec<Block> = Vec::new();
    let h1 = |b: &mut Vec<Block>, t: &str| b.push(Block::Heading1(t.to_string()));
    let h2 = |b: &mut Vec<Block>, t: &str| b.push(Block::Heading2(t.to_string()));
    let bullet = |b: &mut Vec<Block>, t: String| b.push(Block::Bullet(t));
    let outcome = |b: &mut Vec<Block>, t: String| b.push(Block::Outcome(t));
    let image = |b: &mut Vec<Block>, p: &PathBuf| b.push(Block::Image(p.clone()));

    // Collected data.
    h1(&mut b, "Zozbierané dáta");
    h2(&mut b, "Pred inštaláciou menštruačných skriniek:");
    bullet(&mut b, format!("{} respondentiek", pre.num));
    bullet(
        &mut b,
        "2 školy (stredná odborná škola + základná škola)".to_string(),
    );
    h2(&mut b, "Po inštalácii menštruačných skriniek:");
    bullet(&mut b, format!("{} respondentiek", after.num));
    bullet(&mut b, "1 škola (stredná odborná škola)".to_string());
    b.push(Block::PageBreak);

    // Before installation.
    h1(&mut b, "Pred inštaláciou menštruačných skriniek");

    h2(&mut b, "Rozdelenie veku");
    image(&mut b, &pre.charts.age);
    outcome(
        &mut b,
        format!(
            "Zo {} respondentiek bol priemerný vek {:.2} rokov. Najmladšia respondentka mala {:.0} rokov, najstaršia {:.0} rokov. Najväčšie zastúpenie mali {}-ročné respondentky.",
            pre.num, pre.avg_age, pre.min_age, pre.max_age, join_years(&pre.mode_ages)
        ),
    );

    h2(&mut b, "Vek prvej menštruácie");
    image(&mut b, &pre.charts.first_period);
    outcome(
        &mut b,
        format!(
            "Priemerný vek prvej menštruácie bol {:.2} rokov. Najmladšia respondentka dostala prvú menštruáciu v {:.0} rokoch, najstaršia v {:.0} rokoch. Najčastejšie sa prvá menštruácia objavila v {} rokoch.",
            pre.avg_first_period,
            pre.min_first_period,
            pre.max_first_period,
            join_years(&pre.mode_first_periods)
        ),
    );

    h2(&mut b, "Vynechanie školy kvôli menštruácii");
    image(&mut b, &pre.charts.missed_school);
    outcome(
        &mut b,
        format!(
            "{} respondentiek ({}) uviedlo, že niekedy vynechalo školu kvôli menštruácii.",
            pre.missed_yes.count,
            pre.missed_yes.text()
        ),
    );

    h2(&mut b, "Dostupnosť menštruačných pomôcok");
    image(&mut b, &pre.charts.afford);
    outcome(
        &mut b,
        format!(
            "{} respondentiek ({}) uviedlo, že si aspoň raz nemohli dovoliť kúpiť menštruačné pomôcky z finančných dôvodov.",
            pre.afford_yes.count,
            pre.afford_yes.text()
        ),
    );

    h2(&mut b, "Informovanosť o menštruácii");
    image(&mut b, &pre.charts.info_prep);
    outcome(
        &mut b,
        format!(
            "{} respondentiek ({}) nemalo žiadne informácie pred prvou menštruáciou a {} ({}) malo len čiastočné informácie.",
            pre.no_info.count,
            pre.no_info.text(),
            pre.partial_info.count,
            pre.partial_info.text()
        ),
    );

    h2(&mut b, "Zdroje informácií o menštruácii");
    image(&mut b, &pre.charts.info_sources);
    outcome(
        &mut b,
        format!(
            "Hlavným zdrojom informácií o menštruácii bola mama ({}). Škola ({}) a internet ({}) boli ďalšími zdrojmi. Prednášky a workshopy boli zdrojom informácií len pre {} respondentiek.",
            pre.info_mother.text(),
            pre.info_school.text(),
            pre.info_internet.text(),
            pre.info_lectures.text()
        ),
    );

    h2(&mut b, "Informovanosť a vek prvej menštruácie");
    image(&mut b, &pre.charts.info_age);
    outcome(
        &mut b,
        format!(
            "Priemerný vek prvej menštruácie bol {} roka u respondentiek bez informácií, {} roka u čiastočne informovaných a {} roka u plne informovaných.",
            fmt_age(pre.info_age_mean("Nemala som žiadne informácie")),
            fmt_age(pre.info_age_mean("Mala som len čiastočné informácie")),
            fmt_age(pre.info_age_mean("Áno, mala som všetky potrebné informácie"))
        ),
    );

    h2(&mut b, "Používané menštruačné pomôcky");
    image(&mut b, &pre.charts.products);
    outcome(
        &mut b,
        format!(
            "Menštruačné vložky používalo {} respondentiek. Tampóny používalo {}, intímky {} a menštruačné nohavičky {}. Handry uviedlo {} respondentiek.",
            pre.product_pads.text(),
            pre.product_tampons.text(),
            pre.product_liners.text(),
            pre.product_panties.text(),
            pre.product_rags_count
        ),
    );

    h2(&mut b, "Prístup k vybavenosti");
    image(&mut b, &pre.charts.amenities);
    outcome(
        &mut b,
        format!(
            "{} respondentiek ({}) malo plný prístup ku všetkým vybavenostiam. {} respondentiek ({}) nemalo prístup aspoň k jednej zo základných vybaveností (kúrenie, teplá voda, sprcha/vaňa, splachovací WC).",
            pre.full_access.count,
            pre.full_access.text(),
            pre.lacking_any.count,
            pre.lacking_any.text()
        ),
    );

    h2(&mut b, "Vybavenosť podľa počtu súrodencov");
    image(&mut b, &pre.charts.siblings_amenities);
    outcome(
        &mut b,
        format!(
            "Bola zistená korelácia {} medzi počtom súrodencov a nedostatkom vybaveností. Respondentky s 5+ súrodencami mali v priemere {} chýbajúcich vybaveností, zatiaľ čo respondentky bez súrodencov {}.",
            fmt_corr(pre.sibling_corr),
            fmt_mean(PreReport::cohort_mean(&pre.sibling_cohorts, "5+")),
            fmt_mean(PreReport::cohort_mean(&pre.sibling_cohorts, "0"))
        ),
    );

    h2(&mut b, "Vybavenosť podľa veku");
    image(&mut b, &pre.charts.age_amenities);
    outcome(
        &mut b,
        format!(
            "Bola zistená korelácia {} medzi vekom a nedostatkom vybaveností. Mladšie respondentky (12-13 rokov) mali v priemere {} chýbajúcich vybaveností, zatiaľ čo staršie (18-19 rokov) {}.",
            fmt_corr(pre.age_corr),
            fmt_mean(PreReport::cohort_mean(&pre.age_cohorts, "12-13")),
            fmt_mean(PreReport::cohort_mean(&pre.age_cohorts, "18-19"))
        ),
    );

    h2(&mut b, "Symptómy počas menštruácie");
    image(&mut b, &pre.charts.symptoms);
    outcome(
        &mut b,
        format!(
            "Hnev, nervozitu, náladovosť a stres pociťovalo {} respondentiek. Bolesť pociťovalo {}, smútok, depresiu a úzkosť {} a únavu {} respondentiek.",
            pre.symptom_anger.text(),
            pre.symptom_pain.text(),
            pre.symptom_sadness.text(),
            pre.symptom_fatigue.text()
        ),
    );

    h2(&mut b, "Prístup k teplej vode medzi používateľkami tampónov");
    image(&mut b, &pre.charts.tampon_water);
    outcome(
        &mut b,
        format!(
            "Z {} používateliek tampónov {} ({}) nemalo prístup k teplej vode, čo predstavuje hygienické riziko.",
            pre.tampon_users,
            pre.tampon_no_water.count,
            pre.tampon_no_water.text()
        ),
    );
    b.push(Block::PageBreak);

    // Pre-installation summary.
    h1(&mut b, "Zhrnutie zistení – pred inštaláciou");
    b.push(Block::Paragraph(format!("Z {} respondentiek:", pre.num)));
    bullet(
        &mut b,
        format!(
            "Najmladší vek prvej menštruácie bol {:.0} rokov",
            pre.min_first_period
        ),
    );
    bullet(
        &mut b,
        format!("{} vynechalo školu kvôli menštruácii", pre.missed_yes.text()),
    );
    bullet(
        &mut b,
        format!(
            "{} si nemohlo dovoliť menštruačné pomôcky",
            pre.afford_yes.text()
        ),
    );
    bullet(
        &mut b,
        format!(
            "{} nemalo žiadne informácie pred prvou menštruáciou",
            pre.no_info.text()
        ),
    );
    bullet(
        &mut b,
        format!("{} používa menštruačné vložky", pre.product_pads.text()),
    );
    bullet(
        &mut b,
        format!(
            "{} má obmedzený prístup k základnej vybavenosti",
            pre.lacking_any.text()
        ),
    );
    bullet(
        &mut b,
        "Mladšie respondentky a respondentky s viac súrodencami majú väčší nedostatok vybaveností"
            .to_string(),
    );
    bullet(
        &mut b,
        "Respondentky s nižším vekom prvej menštruácie mali menej informácií".to_string(),
    );
    b.push(Block::PageBreak);

    // After installation.
    h1(&mut b, "Po inštalácii menštruačných skriniek");

    h2(&mut b, "Rozdelenie veku");
    image(&mut b, &after.charts.age);
    outcome(
        &mut b,
        format!(
            "Z {} respondentiek bolo {} vo veku 16-18 rokov a {} starších ako 18 rokov. {} respondentiek neuviedlo vek.",
            after.num,
            after.age_16_18.text(),
            after.age_over_18.text(),
            after.age_unstated
        ),
    );

    h2(&mut b, "Absencia v škole");
    image(&mut b, &after.charts.missed_school);
    image(&mut b, &after.charts.days_missed);
    image(&mut b, &after.charts.reasons);
    outcome(
        &mut b,
        format!(
            "{} respondentiek chýbalo v škole kvôli menštruácii. Najčastejšie chýbali 1 deň ({}) alebo menej ako 1 deň ({}). Dominantným dôvodom bola bolesť ({}).",
            after.missed_yes.text(),
            after.days_one.text(),
            after.days_less_one.text(),
            after.reason_pain.text()
        ),
    );

    h2(&mut b, "Používanie bezplatných vložiek v škole");
    image(&mut b, &after.charts.used_pads);
    outcome(
        &mut b,
        format!(
            "{} respondentiek používalo bezplatné vložky poskytované v škole. {} ich nepoužívalo.",
            after.used_pads_yes.text(),
            after.used_pads_no.text()
        ),
    );

    h2(&mut b, "Využitie bezplatných menštruačných pomôcok");
    image(&mut b, &after.charts.products_detail);
    outcome(
        &mut b,
        format!(
            "{} respondentiek využilo bezplatné pomôcky viackrát, {} raz. {} o nich vedelo, ale nepotrebovalo ich. Len {} nevedelo o ich dostupnosti.",
            after.used_multiple.text(),
            after.used_once.text(),
            after.knew_not_needed.text(),
            after.did_not_know.text()
        ),
    );

    h2(&mut b, "Vplyv na dochádzku");
    image(&mut b, &after.charts.attendance);
    outcome(
        &mut b,
        format!(
            "{} respondentiek uviedlo, že vďaka projektu chodili do školy častejšie. Pre väčšinu ({}) sa dochádzka nezmenila.",
            after.attendance_more.text(),
            after.attendance_same.text()
        ),
    );

    h2(&mut b, "Pocity počas menštruácie v škole");
    image(&mut b, &after.charts.feelings);
    outcome(
        &mut b,
        format!(
            "{} respondentiek sa cítilo lepšie ako predtým. {} sa cítilo rovnako. {} uviedlo zhoršenie.",
            after.feel_better.text(),
            after.feel_same.text(),
            after.feel_worse.text()
        ),
    );

    h2(&mut b, "Pocit istoty s dostupnými pomôckami");
    image(&mut b, &after.charts.confident);
    outcome(
        &mut b,
        format!(
            "{} respondentiek sa cítilo istejšie, keď vedeli, že majú v škole k dispozícii hygienické pomôcky.",
            after.confident_yes.text()
        ),
    );

    h2(&mut b, "Pokračovanie projektu");
    image(&mut b, &after.charts.continue_project);
    image(&mut b, &after.charts.future);
    outcome(
        &mut b,
        format!(
            "{} respondentiek chce, aby sa poskytovanie vložiek zachovalo. {} chce bezplatné pomôcky aj v ďalších školských rokoch. Žiadna respondentka nebola vyslovene proti.",
            after.continue_yes.text(),
            after.future_combined.text()
        ),
    );

    h2(&mut b, "Vplyv na otvorenosť diskusie");
    image(&mut b, &after.charts.discussion);
    outcome(
        &mut b,
        format!(
            "{} respondentiek si myslí, že projekt určite prispel k otvorenejšej diskusii o menštruácii v škole. Spolu so \"skôr áno\" je to {}.",
            after.discussion_definitely.text(),
            after.discussion_positive.text()
        ),
    );

    h2(&mut b, "Psychologický prínos projektu");
    image(&mut b, &after.charts.psych);
    outcome(
        &mut b,
        format!(
            "{} respondentiek sa cítilo psychicky lepšie vďaka projektu, {} čiastočne. Spolu {} respondentiek vnímalo pozitívny psychologický vplyv.",
            after.psych_yes.text(),
            after.psych_partial.text(),
            after.psych_positive.text()
        ),
    );

    h2(&mut b, "Prínos prednášok");
    image(&mut b, &after.charts.lectures);
    outcome(
        &mut b,
        format!(
            "{} respondentiek uviedlo, že prednášky im určite pomohli získať nové informácie. Spolu so \"skôr áno\" je to {}.",
            after.lectures_definitely.text(),
            after.lectures_positive.text()
        ),
    );

    h2(&mut b, "Riešenie konkrétnych problémov");
    image(&mut b, &after.charts.help);
    outcome(
        &mut b,
        format!(
            "{} respondentiek sa cítilo pokojnejšie a bezpečnejšie. {} sa vyhlo pretečeniu alebo nepríjemnostiam. {} prekonalo stres z nedostatku pomôcok.",
            after.help_calmer.text(),
            after.help_overflow.text(),
            after.help_stress.text()
        ),
    );

    h2(&mut b, "Témy pre budúce prednášky");
    image(&mut b, &after.charts.topics);
    let topic = |i: usize| {
        after
            .top_topics
            .get(i)
            .map(|(label, _)| *label)
            .unwrap_or("")
    };
    outcome(
        &mut b,
        format!(
            "Najžiadanejšou témou je {}, nasledujú témy {} a {}.",
            topic(0),
            topic(1),
            topic(2)
        ),
    );
    b.push(Block::PageBreak);

    // Cross analysis.
    h1(&mut b, "Krížová analýza: Pred vs Po inštalácii");

    h2(&mut b, "Porovnanie absencie v škole");
    image(&mut b, &cross.charts.absence);
    outcome(
        &mut b,
        absence_sentence(cross.pre_yes.pct(), cross.post_yes.pct(), cross.delta_pp),
    );

    h2(&mut b, "Ukazovatele spokojnosti s projektom");
    image(&mut b, &cross.charts.satisfaction);
    outcome(
        &mut b,
        format!(
            "{} respondentiek využilo bezplatné pomôcky aspoň raz. {} považovalo projekt za užitočný. {} chce pokračovanie projektu a {} respondentiek chce bezplatné pomôcky aj v budúcich rokoch.",
            cross.used_at_least_once.text(),
            cross.useful_yes.text(),
            cross.continue_yes.text(),
            cross.future_yes_or_maybe.text()
        ),
    );
    b.push(Block::PageBreak);

    // Final summary.
    h1(&mut b, "Záverečné zhrnutie");

    h2(&mut b, "Absencia v škole");
    bullet(
        &mut b,
        format!(
            "Pred inštaláciou: {:.1}% respondentiek chýbalo v škole kvôli menštruácii",
            cross.pre_yes.pct()
        ),
    );
    bullet(
        &mut b,
        format!(
            "Po inštalácii: {:.1}% respondentiek chýbalo v škole kvôli menštruácii",
            cross.post_yes.pct()
        ),
    );
    bullet(&mut b, format!("Zmena: {}", change_phrase(cross.delta_pp)));

    h2(&mut b, "Riešenie existujúcich výziev");
    bullet(
        &mut b,
        format!(
            "Pred: {} si nemohlo dovoliť menštruačné pomôcky",
            pre.afford_yes.text()
        ),
    );
    bullet(
        &mut b,
        format!(
            "Po: {} využilo bezplatné pomôcky v škole",
            cross.used_at_least_once.text()
        ),
    );
    bullet(
        &mut b,
        format!(
            "Po: {} sa cíti istejšie s dostupnými pomôckami",
            after.confident_yes.text()
        ),
    );

    h2(&mut b, "Psychologický dopad");
    bullet(
        &mut b,
        format!(
            "Pred: {} pociťovalo stres pri výmene pomôcok mimo domova",
            pre.stress_change_yes.text()
        ),
    );
    bullet(
        &mut b,
        format!(
            "Po: {} sa cítilo psychicky lepšie vďaka projektu",
            after.psych_positive.text()
        ),
    );
    bullet(
        &mut b,
        format!(
            "Po: {} sa cítilo pokojnejšie a bezpečnejšie",
            after.help_calmer.text()
        ),
    );

    h2(&mut b, "Otvorenosť a vzdelávanie");
    bullet(
        &mut b,
        format!(
            "Pred: {} malo nedostatočné informácie pred prvou menštruáciou",
            pre.insufficient_info.text()
        ),
    );
    bullet(
        &mut b,
        format!(
            "Po: {} uviedlo, že projekt prispel k otvorenejšej diskusii",
            after.discussion_positive.text()
        ),
    );
    bullet(
        &mut b,
        format!(
            "Po: {} považovalo prednášky za prínosné",
            after.lectures_positive.text()
        ),
    );

    h2(&mut b, "Podpora projektu");
    bullet(
        &mut b,
        format!(
            "{} považovalo projekt za užitočný pre dievčatá",
            cross.useful_yes.text()
        ),
    );
    bullet(
        &mut b,
        format!("{} chce pokračovanie projektu", cross.continue_yes.text()),
    );
    bullet(
        &mut b,
        format!(
            "{} chce bezplatné pomôcky aj v ďalších školských rokoch",
            cross.future_yes_or_maybe.text()
        ),
    );

    ReportDoc {
        title: "OZ Different".to_string(),
        subtitle: "Dátová analýza výskumu menštruačnej chudoby v Bardejove".to_string(),
        date_line: Local::now().format("%d.%m.%Y").to_string(),
        blocks: b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_phrase_follows_the_sign() {
        assert_eq!(change_phrase(-10.0), "pokles o 10.0 percentuálnych bodov");
        assert_eq!(change_phrase(3.26), "nárast o 3.3 percentuálnych bodov");
    }

    #[test]
    fn absent_means_render_as_not_available() {
        assert_eq!(fmt_mean(None), "N/A");
        assert_eq!(fmt_mean(Some(1.5)), "1.50");
        assert_eq!(fmt_age(None), "N/A");
        assert_eq!(fmt_age(Some(12.34)), "12.3");
    }

    #[test]
    fn absence_sentence_matches_the_direction_of_change() {
        let falling = absence_sentence(63.2, 53.2, -10.0);
        assert!(falling.contains("klesla z 63.2% na 53.2%"));
        assert!(falling.contains("pokles o 10.0"));

        let rising = absence_sentence(40.0, 45.0, 5.0);
        assert!(rising.contains("stúpla"));
        assert!(rising.contains("nárast o 5.0"));
    }

    #[test]
    fn mode_years_are_joined_with_a_conjunction() {
        assert_eq!(join_years(&[16]), "16");
        assert_eq!(join_years(&[11, 13]), "11 a 13");
    }
}
