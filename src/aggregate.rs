// Counting, percentages and cohort grouping over normalized answers.
//
// Denominators are always explicit: a `Share` carries the count together
// with the denominator it was computed against, and refuses to exist for an
// empty subgroup, so no chart or narrative can divide by zero or inherit an
// implicit "percent of total" convention.
use crate::error::{ReportError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Frequency table over the canonical labels of one question.
///
/// Values that did not map to any canonical label are kept in a separate
/// `unmapped` bucket; they never merge into a valid category. Invariant:
/// the mapped counts plus `unmapped` equal `total_rows`.
#[derive(Debug, Clone, Default)]
pub struct CategoryCounts {
    counts: Vec<CategoryCount>,
    pub unmapped: usize,
    pub total_rows: usize,
}

pub fn count_categories<I, S>(labels: I) -> CategoryCounts
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut unmapped = 0usize;
    let mut total_rows = 0usize;
    for label in labels {
        total_rows += 1;
        match label {
            Some(s) => {
                let s = s.as_ref();
                if let Some(entry) = counts.iter_mut().find(|c| c.label == s) {
                    entry.count += 1;
                } else {
                    counts.push(CategoryCount {
                        label: s.to_string(),
                        count: 1,
                    });
                }
            }
            None => unmapped += 1,
        }
    }
    CategoryCounts {
        counts,
        unmapped,
        total_rows,
    }
}

impl CategoryCounts {
    pub fn get(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Sum of the mapped counts; the denominator the after-installation
    /// charts use.
    pub fn mapped_total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    /// Fixed display order; categories absent from the data are omitted.
    pub fn ordered(&self, order: &[&str]) -> Vec<CategoryCount> {
        order
            .iter()
            .filter_map(|label| {
                self.counts
                    .iter()
                    .find(|c| c.label == *label)
                    .cloned()
            })
            .collect()
    }

    /// Fixed display order with absent categories kept at zero, for charts
    /// that need side-by-side comparison slots.
    pub fn ordered_zero_filled(&self, order: &[&str]) -> Vec<CategoryCount> {
        order
            .iter()
            .map(|label| CategoryCount {
                label: label.to_string(),
                count: self.get(label),
            })
            .collect()
    }

    /// Count-descending order (ties keep first-seen order).
    pub fn by_frequency(&self) -> Vec<CategoryCount> {
        let mut sorted = self.counts.clone();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted
    }

    pub fn share(&self, label: &str, denominator: usize, context: &str) -> Result<Share> {
        Share::new(self.get(label), denominator, context)
    }
}

/// A count with the explicit denominator its percentage is computed against.
#[derive(Debug, Clone, Copy)]
pub struct Share {
    pub count: usize,
    pub denominator: usize,
}

impl Share {
    pub fn new(count: usize, denominator: usize, context: &str) -> Result<Share> {
        if denominator == 0 {
            return Err(ReportError::EmptyAggregation {
                context: context.to_string(),
            });
        }
        Ok(Share { count, denominator })
    }

    pub fn pct(&self) -> f64 {
        self.count as f64 / self.denominator as f64 * 100.0
    }

    /// Report-precision percentage string (one decimal place).
    pub fn text(&self) -> String {
        crate::util::format_pct(self.pct())
    }
}

/// Summed boolean indicator columns (multi-select questions), sorted by
/// count. Ties keep the given option order.
pub fn indicator_sums(
    items: &[(&'static str, usize)],
    ascending: bool,
) -> Vec<(&'static str, usize)> {
    let mut sorted = items.to_vec();
    if ascending {
        sorted.sort_by(|a, b| a.1.cmp(&b.1));
    } else {
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
    }
    sorted
}

#[derive(Debug, Clone)]
pub struct Cohort {
    pub label: &'static str,
    pub mean: f64,
    pub n: usize,
}

/// Mean of a metric per cohort bin, in the fixed bin order. Rows with an
/// undefined bin are excluded (not imputed); bins with no rows are omitted.
pub fn cohort_means<B>(
    rows: impl IntoIterator<Item = (Option<B>, f64)>,
    order: &[B],
    label: impl Fn(B) -> &'static str,
) -> Vec<Cohort>
where
    B: Copy + PartialEq,
{
    let mut sums = vec![0.0f64; order.len()];
    let mut counts = vec![0usize; order.len()];
    for (bin, value) in rows {
        let Some(bin) = bin else { continue };
        if let Some(i) = order.iter().position(|b| *b == bin) {
            sums[i] += value;
            counts[i] += 1;
        }
    }
    order
        .iter()
        .enumerate()
        .filter(|(i, _)| counts[*i] > 0)
        .map(|(i, b)| Cohort {
            label: label(*b),
            mean: sums[i] / counts[i] as f64,
            n: counts[i],
        })
        .collect()
}
