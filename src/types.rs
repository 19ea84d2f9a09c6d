// Respondent records and derived cohort bins.
//
// One struct per dataset; rows are loaded once, read immutably by the
// aggregation passes and never merged across datasets. Derived attributes
// (lack count, cohort bins) are methods so every call site has to handle the
// missing-value case explicitly.
use crate::normalize::Answer;

/// One pre-installation questionnaire row.
///
/// Fields follow the canonical column order of the export (free-text columns
/// are dropped by the loader). Numeric answers are `None` when the cell was
/// blank or unparseable; categorical answers are pre-parsed into [`Answer`]
/// where the question uses the shared yes/no option set.
#[derive(Debug, Clone, Default)]
pub struct PreRecord {
    pub age: Option<f64>,
    pub school: String,
    pub grade: String,
    pub household: String,
    pub family_status: String,
    pub children_count: Option<f64>,
    pub brothers_count: Option<f64>,
    pub sisters_count: Option<f64>,
    pub siblings_count: Option<f64>,
    pub father_occupation: String,
    pub father_education: String,
    pub mother_occupation: String,
    pub mother_education: String,
    pub hot_water: Answer,
    pub shower: Answer,
    pub flush_toilet: Answer,
    pub heating: Answer,
    pub menstruating: Answer,
    pub first_period_age: Option<f64>,
    pub preparedness: String,
    pub info_family: bool,
    pub info_school: bool,
    pub info_sister: bool,
    pub info_lectures: bool,
    pub info_friends: bool,
    pub info_internet: bool,
    pub info_mother: bool,
    pub product_rags: bool,
    pub product_panties: bool,
    pub product_liners: bool,
    pub product_tampons: bool,
    pub product_pads: bool,
    pub enough_supplies: Answer,
    pub obstacle_money: bool,
    pub obstacle_none: bool,
    pub obstacle_pain: bool,
    pub tracks_cycle: Answer,
    pub tracking_method: String,
    pub disruption: Answer,
    pub symptom_sadness: bool,
    pub symptom_anger: bool,
    pub symptom_fatigue: bool,
    pub symptom_pain: bool,
    pub gyn_doctor: bool,
    pub gyn_friends: bool,
    pub gyn_internet: bool,
    pub gyn_mother: bool,
    pub doctor_difficult: Answer,
    pub info_preference: String,
    pub carries_supplies: Answer,
    pub change_stressful: Answer,
    pub embarrassed_buying: Answer,
    pub could_not_afford: Answer,
    pub missed_school: Answer,
    pub perception: String,
}

/// Label of the elementary school in the pre dataset; the cross-dataset
/// comparison keeps secondary-school respondents only.
pub const ELEMENTARY_SCHOOL: &str = "Základnú školu";

impl PreRecord {
    /// The four housing amenities with their display labels, in chart order.
    pub fn amenities(&self) -> [(&'static str, Answer); 4] {
        [
            ("Prístup k teplej vode", self.hot_water),
            ("Prístup k sprche alebo vani", self.shower),
            ("Prístup k splachovaciemu WC", self.flush_toilet),
            ("Prístup ku kúreniu", self.heating),
        ]
    }

    /// Number of amenity questions answered "Nie", range 0..=4.
    pub fn lack_count(&self) -> u32 {
        self.amenities()
            .iter()
            .filter(|(_, a)| *a == Answer::No)
            .count() as u32
    }

    pub fn sibling_group(&self) -> Option<SiblingGroup> {
        SiblingGroup::from_count(self.siblings_count?)
    }

    pub fn age_group(&self) -> Option<AgeGroup> {
        AgeGroup::from_age(self.age?)
    }
}

/// One after-installation questionnaire row.
///
/// Answers stay raw here; each chart routes them through its own mapping
/// table, the same way the per-question option sets differ in the survey.
#[derive(Debug, Clone, Default)]
pub struct PostRecord {
    pub age: String,
    pub missed_school: String,
    pub days_missed: String,
    pub absence_reason: String,
    pub used_free_pads: String,
    pub free_products_usage: String,
    pub attendance: String,
    pub feelings: String,
    pub confident: String,
    pub keep_providing: String,
    pub future_years: String,
    pub open_discussion: String,
    pub psych_better: String,
    pub project_useful: String,
    pub lectures_helpful: String,
    pub specific_help: String,
    pub topic_gynecology: bool,
    pub topic_body_changes: bool,
    pub topic_mental_health: bool,
    pub topic_care: bool,
    pub topic_rights: bool,
    pub topic_other: bool,
}

/// Sibling-count cohort. Bins are fixed, non-overlapping and cover every
/// non-negative count; missing counts have no bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiblingGroup {
    Zero,
    OneTwo,
    ThreeFour,
    FivePlus,
}

impl SiblingGroup {
    pub const ORDER: [SiblingGroup; 4] = [
        SiblingGroup::Zero,
        SiblingGroup::OneTwo,
        SiblingGroup::ThreeFour,
        SiblingGroup::FivePlus,
    ];

    pub fn from_count(n: f64) -> Option<SiblingGroup> {
        if n.is_nan() {
            return None;
        }
        Some(if n <= 0.0 {
            SiblingGroup::Zero
        } else if n <= 2.0 {
            SiblingGroup::OneTwo
        } else if n <= 4.0 {
            SiblingGroup::ThreeFour
        } else {
            SiblingGroup::FivePlus
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            SiblingGroup::Zero => "0",
            SiblingGroup::OneTwo => "1-2",
            SiblingGroup::ThreeFour => "3-4",
            SiblingGroup::FivePlus => "5+",
        }
    }
}

/// Respondent-age cohort of the pre dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    Y12_13,
    Y14_15,
    Y16_17,
    Y18_19,
}

impl AgeGroup {
    pub const ORDER: [AgeGroup; 4] = [
        AgeGroup::Y12_13,
        AgeGroup::Y14_15,
        AgeGroup::Y16_17,
        AgeGroup::Y18_19,
    ];

    pub fn from_age(n: f64) -> Option<AgeGroup> {
        if n.is_nan() {
            return None;
        }
        Some(if n <= 13.0 {
            AgeGroup::Y12_13
        } else if n <= 15.0 {
            AgeGroup::Y14_15
        } else if n <= 17.0 {
            AgeGroup::Y16_17
        } else {
            AgeGroup::Y18_19
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Y12_13 => "12-13",
            AgeGroup::Y14_15 => "14-15",
            AgeGroup::Y16_17 => "16-17",
            AgeGroup::Y18_19 => "18-19",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lack_count_counts_only_no_answers() {
        let r = PreRecord {
            hot_water: Answer::No,
            shower: Answer::No,
            flush_toilet: Answer::Yes,
            heating: Answer::Sometimes,
            ..PreRecord::default()
        };
        assert_eq!(r.lack_count(), 2);

        let full = PreRecord {
            hot_water: Answer::Yes,
            shower: Answer::Yes,
            flush_toilet: Answer::Yes,
            heating: Answer::Yes,
            ..PreRecord::default()
        };
        assert_eq!(full.lack_count(), 0);
    }

    #[test]
    fn age_bins_are_total_and_disjoint_over_defined_ages() {
        for tenth in 120..=190 {
            let age = tenth as f64 / 10.0;
            let matching = AgeGroup::ORDER
                .iter()
                .filter(|g| AgeGroup::from_age(age) == Some(**g))
                .count();
            assert_eq!(matching, 1, "age {} must fall into exactly one bin", age);
        }
        assert_eq!(AgeGroup::from_age(f64::NAN), None);
    }

    #[test]
    fn sibling_bins_are_total_and_disjoint_over_defined_counts() {
        for n in 0..=12 {
            let matching = SiblingGroup::ORDER
                .iter()
                .filter(|g| SiblingGroup::from_count(n as f64) == Some(**g))
                .count();
            assert_eq!(matching, 1, "count {} must fall into exactly one bin", n);
        }
        assert_eq!(SiblingGroup::from_count(f64::NAN), None);
    }

    #[test]
    fn bin_boundaries_match_the_questionnaire_groups() {
        assert_eq!(SiblingGroup::from_count(0.0), Some(SiblingGroup::Zero));
        assert_eq!(SiblingGroup::from_count(2.0), Some(SiblingGroup::OneTwo));
        assert_eq!(SiblingGroup::from_count(3.0), Some(SiblingGroup::ThreeFour));
        assert_eq!(SiblingGroup::from_count(5.0), Some(SiblingGroup::FivePlus));
        assert_eq!(AgeGroup::from_age(13.0), Some(AgeGroup::Y12_13));
        assert_eq!(AgeGroup::from_age(14.0), Some(AgeGroup::Y14_15));
        assert_eq!(AgeGroup::from_age(18.0), Some(AgeGroup::Y18_19));
    }
}
