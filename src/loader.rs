// Dataset loading.
//
// The questionnaire exports carry long free-form Slovak questions as column
// headers, so correspondence between columns and record fields is positional:
// each schema below declares the exact column count of the export, the
// positions of free-text columns that are skipped, and the canonical field
// the remaining positions map to. A count drift fails fast with
// `SchemaMismatch` instead of silently misaligning answers.
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};

use crate::error::{ReportError, Result};
use crate::normalize::Answer;
use crate::types::{PostRecord, PreRecord};
use crate::util::{parse_f64_safe, parse_flag};

/// Pre-installation export: 56 canonical columns plus 6 free-text columns
/// (multi-select originals and open comments) that are dropped on load.
pub const PRE_COLUMN_COUNT: usize = 62;

/// After-installation export.
pub const AFTER_COLUMN_COUNT: usize = 23;

struct Row<'a> {
    record: &'a StringRecord,
    path: &'a Path,
}

impl<'a> Row<'a> {
    fn cell(&self, index: usize, name: &'static str) -> Result<&'a str> {
        self.record
            .get(index)
            .ok_or_else(|| ReportError::MissingColumn {
                path: self.path.to_path_buf(),
                index,
                name,
            })
    }

    fn text(&self, index: usize, name: &'static str) -> Result<String> {
        Ok(self.cell(index, name)?.to_string())
    }

    fn answer(&self, index: usize, name: &'static str) -> Result<Answer> {
        Ok(Answer::parse(self.cell(index, name)?))
    }

    fn number(&self, index: usize, name: &'static str) -> Result<Option<f64>> {
        Ok(parse_f64_safe(self.cell(index, name)?))
    }

    fn flag(&self, index: usize, name: &'static str) -> Result<bool> {
        Ok(parse_flag(self.cell(index, name)?))
    }
}

fn check_schema(path: &Path, headers: &StringRecord, expected: usize) -> Result<()> {
    debug!("{}: header row {:?}", path.display(), headers);
    if headers.len() != expected {
        return Err(ReportError::SchemaMismatch {
            path: path.to_path_buf(),
            expected,
            found: headers.len(),
        });
    }
    Ok(())
}

/// Loads the pre-installation dataset. Every cell is whitespace-trimmed by
/// the reader; numeric cells parse forgivingly into `None` when blank.
pub fn load_pre(path: &Path) -> Result<Vec<PreRecord>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    check_schema(path, &rdr.headers()?.clone(), PRE_COLUMN_COUNT)?;

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row = Row {
            record: &record,
            path,
        };
        // Positions 0, 21, 29, 36, 43, 48 and 61 (timestamp, multi-select
        // originals, open comments) are intentionally not mapped.
        out.push(PreRecord {
            age: row.number(1, "Vek")?,
            school: row.text(2, "Škola")?,
            grade: row.text(3, "Ročník")?,
            household: row.text(4, "S kým aktuálne bývate?")?,
            family_status: row.text(5, "Rodinný stav")?,
            children_count: row.number(6, "Počet detí")?,
            brothers_count: row.number(7, "Počet bratov")?,
            sisters_count: row.number(8, "Počet sestier")?,
            siblings_count: row.number(9, "Počet súrodencov")?,
            father_occupation: row.text(10, "Zamestnanie otca")?,
            father_education: row.text(11, "Vzdelanie otca")?,
            mother_occupation: row.text(12, "Zamestnanie matky")?,
            mother_education: row.text(13, "Vzdelanie matky")?,
            hot_water: row.answer(14, "Prístup k teplej vode")?,
            shower: row.answer(15, "Prístup k sprche alebo vani")?,
            flush_toilet: row.answer(16, "Prístup k splachovaciemu WC")?,
            heating: row.answer(17, "Prístup ku teplu alebo kúreniu")?,
            menstruating: row.answer(18, "Mávate aktuálne menštruáciu")?,
            first_period_age: row.number(19, "Vek prvej menštruácie")?,
            preparedness: row.text(20, "Dostatok informácií pred prvou menštruáciou")?,
            info_family: row.flag(22, "Informácie: iný rodinný príslušník")?,
            info_school: row.flag(23, "Informácie: škola")?,
            info_sister: row.flag(24, "Informácie: sestra/sestry")?,
            info_lectures: row.flag(25, "Informácie: prednášky/workshopy")?,
            info_friends: row.flag(26, "Informácie: kamaráti")?,
            info_internet: row.flag(27, "Informácie: internet")?,
            info_mother: row.flag(28, "Informácie: matka")?,
            product_rags: row.flag(30, "Potreby: handry")?,
            product_panties: row.flag(31, "Potreby: menštruačné nohavičky")?,
            product_liners: row.flag(32, "Potreby: intímky")?,
            product_tampons: row.flag(33, "Potreby: tampóny")?,
            product_pads: row.flag(34, "Potreby: menštruačné vložky")?,
            enough_supplies: row.answer(35, "Dostatok pomôcok")?,
            obstacle_money: row.flag(37, "Prekážka: peniaze")?,
            obstacle_none: row.flag(38, "Prekážka: žiadne")?,
            obstacle_pain: row.flag(39, "Prekážka: bolesť")?,
            tracks_cycle: row.answer(40, "Sledujete svoj menštruačný cyklus?")?,
            tracking_method: row.text(41, "Spôsob zaznamenávania cyklu")?,
            disruption: row.answer(42, "Zásah do každodenných plánov")?,
            symptom_sadness: row.flag(44, "Pocity: smútok/depresia/úzkosť/strach")?,
            symptom_anger: row.flag(45, "Pocity: hnev/nervozita/náladovosť/stres")?,
            symptom_fatigue: row.flag(46, "Pocity: únava")?,
            symptom_pain: row.flag(47, "Pocity: bolesť")?,
            gyn_doctor: row.flag(49, "Gyn. informácie: lekár")?,
            gyn_friends: row.flag(50, "Gyn. informácie: kamaráti")?,
            gyn_internet: row.flag(51, "Gyn. informácie: internet")?,
            gyn_mother: row.flag(52, "Gyn. informácie: mama")?,
            doctor_difficult: row.answer(53, "Ťažká komunikácia s lekárom")?,
            info_preference: row.text(54, "Preferencia pri hľadaní informácií")?,
            carries_supplies: row.answer(55, "Nosí zásobu pomôcok")?,
            change_stressful: row.answer(56, "Stresujúca výmena mimo domova")?,
            embarrassed_buying: row.answer(57, "Trápnosť pri nákupe")?,
            could_not_afford: row.answer(58, "Nemohla si dovoliť pomôcky")?,
            missed_school: row.answer(59, "Vynechanie školy")?,
            perception: row.text(60, "Vnímanie menštruácie")?,
        });
    }
    info!("{}: loaded {} respondents", path.display(), out.len());
    Ok(out)
}

/// Loads the after-installation dataset.
pub fn load_after(path: &Path) -> Result<Vec<PostRecord>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    check_schema(path, &rdr.headers()?.clone(), AFTER_COLUMN_COUNT)?;

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row = Row {
            record: &record,
            path,
        };
        out.push(PostRecord {
            age: row.text(1, "Vek")?,
            missed_school: row.text(2, "Chýbala si niekedy v škole?")?,
            days_missed: row.text(3, "Koľko dní si vymeškala?")?,
            absence_reason: row.text(4, "Dôvod absencie")?,
            used_free_pads: row.text(5, "Používala si bezplatné vložky?")?,
            free_products_usage: row.text(6, "Využitie bezplatných pomôcok")?,
            attendance: row.text(7, "Vplyv na dochádzku")?,
            feelings: row.text(8, "Pocity v škole teraz")?,
            confident: row.text(9, "Pocit istoty")?,
            keep_providing: row.text(10, "Zachovať poskytovanie vložiek")?,
            future_years: row.text(11, "Vložky aj v ďalších rokoch")?,
            open_discussion: row.text(12, "Otvorenejšia diskusia")?,
            psych_better: row.text(13, "Psychicky lepšie")?,
            project_useful: row.text(14, "Projekt bol užitočný")?,
            lectures_helpful: row.text(15, "Prínos prednášok")?,
            specific_help: row.text(16, "Pomoc s konkrétnym problémom")?,
            topic_gynecology: row.flag(17, "Téma: gynekologické problémy a prevencia")?,
            topic_body_changes: row.flag(18, "Téma: telesné zmeny v dospievaní")?,
            topic_mental_health: row.flag(19, "Téma: menštruácia a psychické zdravie")?,
            topic_care: row.flag(20, "Téma: starostlivosť počas menštruácie")?,
            topic_rights: row.flag(21, "Téma: práva a dôstojnosť žien")?,
            topic_other: row.flag(22, "Téma: iné")?,
        });
    }
    info!("{}: loaded {} respondents", path.display(), out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_rows(path: &Path, rows: &[Vec<String>]) {
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

    fn blank_pre_row() -> Vec<String> {
        vec![String::new(); PRE_COLUMN_COUNT]
    }

    fn pre_header() -> Vec<String> {
        (0..PRE_COLUMN_COUNT).map(|i| format!("Otázka {}", i)).collect()
    }

    #[test]
    fn loads_and_trims_pre_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pre.csv");
        let mut row = blank_pre_row();
        row[1] = " 16 ".to_string();
        row[2] = "  Strednú odbornú školu ".to_string();
        row[14] = "Áno".to_string();
        row[15] = "Nie".to_string();
        row[33] = "1".to_string();
        row[59] = "Áno".to_string();
        write_rows(&path, &[pre_header(), row]);

        let records = load_pre(&path).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.age, Some(16.0));
        assert_eq!(r.school, "Strednú odbornú školu");
        assert_eq!(r.hot_water, Answer::Yes);
        assert_eq!(r.shower, Answer::No);
        assert!(r.product_tampons);
        assert_eq!(r.missed_school, Answer::Yes);
        assert_eq!(r.lack_count(), 1);
    }

    #[test]
    fn pre_schema_mismatch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pre.csv");
        let header: Vec<String> = (0..10).map(|i| format!("c{}", i)).collect();
        let row: Vec<String> = vec![String::new(); 10];
        write_rows(&path, &[header, row]);

        match load_pre(&path) {
            Err(ReportError::SchemaMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, PRE_COLUMN_COUNT);
                assert_eq!(found, 10);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other.map(|v| v.len())),
        }
    }

    #[test]
    fn loads_after_rows_positionally() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("after.csv");
        let header: Vec<String> = (0..AFTER_COLUMN_COUNT).map(|i| format!("Otázka {}", i)).collect();
        let mut row = vec![String::new(); AFTER_COLUMN_COUNT];
        row[1] = "16-18".to_string();
        row[2] = "Ano".to_string();
        row[17] = "1".to_string();
        write_rows(&path, &[header, row]);

        let records = load_after(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].age, "16-18");
        assert_eq!(records[0].missed_school, "Ano");
        assert!(records[0].topic_gynecology);
        assert!(!records[0].topic_other);
    }
}
