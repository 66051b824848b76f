//! View projection: filtered lists and aggregate statistics over a live
//! record set.
//!
//! Everything here is a pure function of the input slice. Statistics are
//! recomputed wholesale on every change; there are no incremental counters
//! that could drift from the source set.

use std::cmp::Reverse;

use grievance_domain::{Grievance, GrievanceCategory, GrievanceStatus};
use serde::Serialize;

/// Three independent predicates composed with logical AND.
///
/// An absent (or blank) value means "no constraint", not "match empty".
#[derive(Debug, Clone, Default)]
pub struct GrievanceFilter {
    /// Case-insensitive substring search over title, description, and
    /// submitter email.
    pub search: Option<String>,
    /// Category equality.
    pub category: Option<GrievanceCategory>,
    /// Status equality.
    pub status: Option<GrievanceStatus>,
}

impl GrievanceFilter {
    /// Returns whether a record passes all three predicates.
    #[must_use]
    pub fn matches(&self, grievance: &Grievance) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                grievance.title().to_lowercase().contains(&term)
                    || grievance.description().to_lowercase().contains(&term)
                    || grievance.submitter_email().to_lowercase().contains(&term)
            }
        };
        let category_ok = self
            .category
            .is_none_or(|category| grievance.category() == category);
        let status_ok = self.status.is_none_or(|status| grievance.status() == status);

        search_ok && category_ok && status_ok
    }

    /// Applies the filter and returns the narrowed list, newest first.
    #[must_use]
    pub fn apply(&self, records: &[Grievance]) -> Vec<Grievance> {
        let mut narrowed: Vec<Grievance> = records
            .iter()
            .filter(|grievance| self.matches(grievance))
            .cloned()
            .collect();
        sort_newest_first(&mut narrowed);

        narrowed
    }
}

/// Sorts records by `created_at` descending. Records without a timestamp
/// (not yet store-acknowledged) sort last, treated as time zero. The store's
/// own delivery order is never trusted as a sort key.
pub fn sort_newest_first(records: &mut [Grievance]) {
    records.sort_by_key(|grievance| {
        Reverse(
            grievance
                .created_at()
                .map(|created| created.timestamp_millis())
                .unwrap_or(0),
        )
    });
}

/// Dashboard statistics over a student's own records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StudentStats {
    /// Records filed by the student.
    pub total: usize,
    /// Records currently `Resolved`.
    pub resolved: usize,
    /// Records currently `Pending` or `In Progress`.
    pub open: usize,
    /// Mean of per-record `ceil(|updated - created|)` in days over resolved
    /// records carrying both timestamps, rounded to the nearest day. Zero
    /// when nothing qualifies.
    pub average_resolution_days: u64,
}

impl StudentStats {
    /// Computes statistics over the student's record set.
    #[must_use]
    pub fn compute(records: &[Grievance]) -> Self {
        let total = records.len();
        let resolved = records
            .iter()
            .filter(|grievance| grievance.status() == GrievanceStatus::Resolved)
            .count();
        let open = records
            .iter()
            .filter(|grievance| grievance.status().is_open())
            .count();

        let mut total_days: u64 = 0;
        let mut measured: u64 = 0;
        for grievance in records {
            if grievance.status() != GrievanceStatus::Resolved {
                continue;
            }

            if let (Some(created), Some(updated)) =
                (grievance.created_at(), grievance.updated_at())
            {
                let seconds = (updated - created).num_seconds().unsigned_abs();
                total_days += seconds.div_ceil(86_400);
                measured += 1;
            }
        }

        let average_resolution_days = if measured == 0 {
            0
        } else {
            (total_days as f64 / measured as f64).round() as u64
        };

        Self {
            total,
            resolved,
            open,
            average_resolution_days,
        }
    }
}

/// One entry of the admin top-categories breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// The category.
    pub category: GrievanceCategory,
    /// How many records carry it.
    pub count: usize,
}

/// Dashboard statistics over the full record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminStats {
    /// All records.
    pub total: usize,
    /// Records currently `Pending`.
    pub pending: usize,
    /// Records currently `In Progress`.
    pub in_progress: usize,
    /// Records currently `Resolved`.
    pub resolved: usize,
    /// Records currently `Escalated`.
    pub escalated: usize,
    /// `round(resolved / total * 100)`, zero when the set is empty.
    pub resolution_rate_percent: u64,
    /// Top five categories by frequency, ties kept in first-seen order.
    pub top_categories: Vec<CategoryCount>,
    /// The five most recent records by `created_at` descending.
    pub recent: Vec<Grievance>,
}

impl AdminStats {
    /// Computes statistics over the full record set.
    #[must_use]
    pub fn compute(records: &[Grievance]) -> Self {
        let total = records.len();
        let count_status = |status: GrievanceStatus| {
            records
                .iter()
                .filter(|grievance| grievance.status() == status)
                .count()
        };
        let pending = count_status(GrievanceStatus::Pending);
        let in_progress = count_status(GrievanceStatus::InProgress);
        let resolved = count_status(GrievanceStatus::Resolved);
        let escalated = count_status(GrievanceStatus::Escalated);

        let resolution_rate_percent = if total == 0 {
            0
        } else {
            ((resolved as f64 / total as f64) * 100.0).round() as u64
        };

        // First-seen insertion order; the stable sort below keeps it for
        // equal counts.
        let mut counts: Vec<(GrievanceCategory, usize)> = Vec::new();
        for grievance in records {
            match counts
                .iter_mut()
                .find(|(category, _)| *category == grievance.category())
            {
                Some((_, count)) => *count += 1,
                None => counts.push((grievance.category(), 1)),
            }
        }
        counts.sort_by(|left, right| right.1.cmp(&left.1));
        let top_categories = counts
            .into_iter()
            .take(5)
            .map(|(category, count)| CategoryCount { category, count })
            .collect();

        let mut recent = records.to_vec();
        sort_newest_first(&mut recent);
        recent.truncate(5);

        Self {
            total,
            pending,
            in_progress,
            resolved,
            escalated,
            resolution_rate_percent,
            top_categories,
            recent,
        }
    }
}
