// Categorical value normalization.
//
// Every free-text answer in the exports is mapped through one of the fixed
// tables below before any counting happens. Unknown values never fall back
// to a default category: they surface as `Answer::Unmapped` or as `None`
// from `CategoryMap::canonical`, and the aggregator keeps them in a separate
// unmapped bucket.
use std::collections::HashMap;

use once_cell::sync::Lazy;

/// The shared yes/no/sometimes/no-answer option set used by the amenity,
/// behavioral, and absence questions of the pre-installation survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Sometimes,
    NoAnswer,
    /// Value not present in the mapping table.
    Unmapped,
}

impl Default for Answer {
    fn default() -> Answer {
        Answer::Unmapped
    }
}

impl Answer {
    pub fn parse(raw: &str) -> Answer {
        match raw.trim() {
            "Áno" | "Ano" | "Yes" => Answer::Yes,
            "Nie" | "No" => Answer::No,
            "Niekedy" | "Sometimes" => Answer::Sometimes,
            "Nechcem odpovedať" | "Don't want to answer" => Answer::NoAnswer,
            _ => Answer::Unmapped,
        }
    }

    /// Numeric code for averaging (1 / 0 / 0.5); no-answer and unmapped
    /// values are excluded from numeric aggregation.
    pub fn code(self) -> Option<f64> {
        match self {
            Answer::Yes => Some(1.0),
            Answer::No => Some(0.0),
            Answer::Sometimes => Some(0.5),
            Answer::NoAnswer | Answer::Unmapped => None,
        }
    }

    /// Canonical display label for the three-way pre-survey charts.
    ///
    /// Mirrors the strict Áno/Nie/Nechcem odpovedať table: `Niekedy` answers
    /// are not part of those charts and land in the unmapped bucket.
    pub fn strict_label(self) -> Option<&'static str> {
        match self {
            Answer::Yes => Some("Áno"),
            Answer::No => Some("Nie"),
            Answer::NoAnswer => Some("Nechcem odpovedať"),
            Answer::Sometimes | Answer::Unmapped => None,
        }
    }

    /// Canonical display label for the cross-dataset comparison, which keeps
    /// all four answer categories.
    pub fn cross_label(self) -> Option<&'static str> {
        match self {
            Answer::Yes => Some("Áno"),
            Answer::No => Some("Nie"),
            Answer::Sometimes => Some("Niekedy"),
            Answer::NoAnswer => Some("Nechcem odpovedať"),
            Answer::Unmapped => None,
        }
    }
}

/// A fixed raw-value → canonical-label table for one survey question.
///
/// Lookups not present in the table return `None` so the caller has to route
/// the value into the unmapped bucket.
pub struct CategoryMap {
    name: &'static str,
    lookup: HashMap<&'static str, &'static str>,
}

impl CategoryMap {
    fn new(name: &'static str, entries: &[(&'static str, &'static str)]) -> CategoryMap {
        CategoryMap {
            name,
            lookup: entries.iter().copied().collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn canonical(&self, raw: &str) -> Option<&'static str> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        self.lookup.get(raw).copied()
    }
}

/// First letter uppercased, rest lowercased. The psychological-benefit
/// column mixes capitalizations in the export and is case-normalized before
/// the table lookup.
pub fn capitalize(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

pub static INFO_PREP: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "informovanosť pred prvou menštruáciou",
        &[
            (
                "Áno, mala som všetky potrebné informácie",
                "Áno, mala som všetky potrebné informácie",
            ),
            (
                "Mala som len čiastočné informácie",
                "Mala som len čiastočné informácie",
            ),
            (
                "Nemala som žiadne informácie",
                "Nemala som žiadne informácie",
            ),
        ],
    )
});

// The after-installation export spells plain answers without diacritics.
pub static AFTER_ANSWER: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "áno/nie (po inštalácii)",
        &[
            ("Ano", "Áno"),
            ("Nie", "Nie"),
            ("Nechcem odpovedať", "Nechcem odpovedať"),
        ],
    )
});

pub static DAYS_MISSED: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "vymeškané dni",
        &[
            ("Menej ako 1 deň", "Menej ako 1 deň"),
            ("1 deň", "1 deň"),
            ("2 dni", "2 dni"),
            ("3 dni", "3 dni"),
            ("Viac ako 3 dni", "Viac ako 3 dni"),
        ],
    )
});

pub static ABSENCE_REASON: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "dôvod absencie",
        &[
            ("Mala som bolesti", "Bolesť"),
            (
                "Nemala som možnosť sa hygienicky upraviť v škole",
                "Nemala som možnosť sa hygienicky upraviť v škole",
            ),
            ("Nemala som hygienické pomôcky", "Nemala som hygienické pomôcky"),
            ("Iné", "Iný dôvod"),
            ("Hanbila som sa", "Hanbila som sa"),
        ],
    )
});

pub static FREE_PRODUCTS_USAGE: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "využitie bezplatných pomôcok",
        &[
            ("Ano, viackrát", "Áno, viackrát"),
            ("Ano, raz", "Áno, raz"),
            ("Nie", "Nie"),
            (
                "Vedela som o nich, ale nepotrebovala som ich",
                "Vedela som o nich, ale nepotrebovala som ich",
            ),
            (
                "Nevedela som, že sú dostupné",
                "Nevedela som, že sú dostupné",
            ),
        ],
    )
});

pub static ATTENDANCE: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "vplyv na dochádzku",
        &[
            (
                "Ano, chodila som do školy častejšie",
                "Áno, chodila som do školy častejšie",
            ),
            ("Nie, nezmenilo sa to", "Nie, nezmenilo sa to"),
            ("Neviem posúdiť", "Neviem posúdiť"),
        ],
    )
});

pub static FEELINGS: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "pocity v škole",
        &[
            ("Lepšie ako predtým", "Lepšie ako predtým"),
            ("Rovnako", "Rovnako"),
            ("Horšie", "Horšie"),
        ],
    )
});

pub static CONFIDENT: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "pocit istoty",
        &[("Ano", "Áno"), ("Nie", "Nie"), ("Neviem", "Neviem")],
    )
});

pub static CONTINUE_PROJECT: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "pokračovanie projektu",
        &[("Ano", "Áno"), ("Je mi to jedno", "Je mi to jedno")],
    )
});

pub static FUTURE_YEARS: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "vložky v ďalších rokoch",
        &[("Ano, určite", "Áno, určite"), ("Možno", "Možno")],
    )
});

pub static DISCUSSION: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "otvorenosť diskusie",
        &[
            ("Určite ano", "Určite áno"),
            ("Skôr ano", "Skôr áno"),
            ("Skôr nie", "Skôr nie"),
            ("Určite nie", "Určite nie"),
        ],
    )
});

pub static PSYCH_BENEFIT: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "psychický prínos",
        &[
            ("Ano", "Áno"),
            ("Nie", "Nie"),
            ("Čiastočne", "Čiastočne"),
            ("Neviem", "Neviem"),
        ],
    )
});

pub static LECTURES: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "prínos prednášok",
        &[
            ("Určite ano", "Určite áno"),
            ("Skôr ano", "Skôr áno"),
            ("Neviem posúdiť", "Neviem posúdiť"),
            ("Skôr nie", "Skôr nie"),
            ("Určite nie", "Určite nie"),
        ],
    )
});

pub static SPECIFIC_HELP: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "riešenie konkrétneho problému",
        &[
            (
                "Cítila som sa pokojnejšie a bezpečnejšie",
                "Cítila som sa pokojnejšie a bezpečnejšie",
            ),
            (
                "Pomohlo mi to vyhnúť sa pretečeniu/nepríjemnosťam",
                "Pomohlo mi vyhnúť sa pretečeniu/nepríjemnostiam",
            ),
            (
                "Nemala som pri sebe pomôcku a pomohlo mi to prekonať stres",
                "Nemala som pri sebe pomôcku, pomohlo mi to prekonať stres",
            ),
            (
                "Pomohlo mi to s infekciami alebo zdravotným diskomfortom",
                "Pomohlo mi to s infekciami alebo zdravotným diskomfortom",
            ),
            (
                "Nepomohlo / nič z toho sa ma netýka",
                "Nepomohlo / nič z toho sa ma netýka",
            ),
            ("Iné", "Iné"),
        ],
    )
});

// The after-installation age question offers two bands; blanks stay
// unmapped and are reported as respondents without a stated age.
pub static AFTER_AGE: Lazy<CategoryMap> = Lazy::new(|| {
    CategoryMap::new(
        "vek (po inštalácii)",
        &[("16-18", "16-18"), ("Viac ako 18", "Viac ako 18")],
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_parses_both_language_variants() {
        assert_eq!(Answer::parse("Áno"), Answer::Yes);
        assert_eq!(Answer::parse("Ano"), Answer::Yes);
        assert_eq!(Answer::parse("Yes"), Answer::Yes);
        assert_eq!(Answer::parse("Niekedy"), Answer::Sometimes);
        assert_eq!(Answer::parse("Don't want to answer"), Answer::NoAnswer);
        assert_eq!(Answer::parse("  Nie "), Answer::No);
    }

    #[test]
    fn unknown_answer_is_unmapped_not_defaulted() {
        let a = Answer::parse("Možno");
        assert_eq!(a, Answer::Unmapped);
        assert_eq!(a.code(), None);
        assert_eq!(a.strict_label(), None);
        assert_eq!(a.cross_label(), None);
    }

    #[test]
    fn numeric_codes_match_the_averaging_table() {
        assert_eq!(Answer::Yes.code(), Some(1.0));
        assert_eq!(Answer::No.code(), Some(0.0));
        assert_eq!(Answer::Sometimes.code(), Some(0.5));
        assert_eq!(Answer::NoAnswer.code(), None);
    }

    #[test]
    fn sometimes_is_excluded_from_strict_charts_but_kept_in_cross() {
        assert_eq!(Answer::Sometimes.strict_label(), None);
        assert_eq!(Answer::Sometimes.cross_label(), Some("Niekedy"));
    }

    #[test]
    fn category_map_rejects_unknown_values() {
        assert_eq!(DAYS_MISSED.canonical("1 deň"), Some("1 deň"));
        assert_eq!(DAYS_MISSED.canonical("4 dni"), None);
        assert_eq!(DAYS_MISSED.canonical(""), None);
        assert_eq!(ABSENCE_REASON.canonical("Mala som bolesti"), Some("Bolesť"));
    }

    #[test]
    fn psych_lookup_goes_through_case_normalization() {
        assert_eq!(capitalize("ano"), "Ano");
        assert_eq!(capitalize("ANO"), "Ano");
        assert_eq!(PSYCH_BENEFIT.canonical(&capitalize("ano")), Some("Áno"));
        assert_eq!(PSYCH_BENEFIT.canonical(&capitalize("čiastočne")), Some("Čiastočne"));
    }
}
