//! Keyword-matching category suggestion for free-text submissions.

use crate::GrievanceCategory;

/// Keyword tables in category declaration order. The order doubles as the
/// tie-break: on equal match counts the earliest-declared category wins.
static CATEGORY_KEYWORDS: &[(GrievanceCategory, &[&str])] = &[
    (
        GrievanceCategory::Academic,
        &[
            "exam",
            "grade",
            "marks",
            "syllabus",
            "lecture",
            "assignment",
            "professor",
            "course",
        ],
    ),
    (
        GrievanceCategory::Infrastructure,
        &[
            "ac",
            "fan",
            "wifi",
            "electricity",
            "water",
            "projector",
            "repair",
            "bench",
        ],
    ),
    (
        GrievanceCategory::Hostel,
        &[
            "hostel",
            "mess",
            "room",
            "accommodation",
            "warden",
            "laundry",
        ],
    ),
    (
        GrievanceCategory::Library,
        &["library", "book", "journal", "librarian", "reading"],
    ),
    (
        GrievanceCategory::Transport,
        &["bus", "transport", "route", "driver", "shuttle"],
    ),
    (
        GrievanceCategory::Administrative,
        &[
            "fee",
            "admission",
            "certificate",
            "scholarship",
            "document",
            "office",
        ],
    ),
];

/// Returns the keyword set consulted for a category.
#[must_use]
pub fn category_keywords(category: GrievanceCategory) -> &'static [&'static str] {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(candidate, _)| *candidate == category)
        .map(|(_, keywords)| *keywords)
        .unwrap_or(&[])
}

/// Suggests a category for a submission, or `None` when no keyword matches.
///
/// Title and description are concatenated and lowercased; each category is
/// scored by how many of its keywords occur as substrings. The strictly
/// highest count wins; ties keep the earliest-declared category. Advisory
/// only -- the submitter may override the suggestion.
#[must_use]
pub fn suggest_category(title: &str, description: &str) -> Option<GrievanceCategory> {
    let text = format!("{title} {description}").to_lowercase();

    let mut best: Option<(GrievanceCategory, usize)> = None;
    for (category, keywords) in CATEGORY_KEYWORDS {
        let count = keywords
            .iter()
            .filter(|keyword| text.contains(**keyword))
            .count();

        let beats_best = match best {
            None => count > 0,
            Some((_, best_count)) => count > best_count,
        };
        if beats_best {
            best = Some((*category, count));
        }
    }

    best.map(|(category, _)| category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_gives_no_suggestion() {
        assert_eq!(suggest_category("", ""), None);
    }

    #[test]
    fn unmatched_text_gives_no_suggestion() {
        assert_eq!(suggest_category("hello", "nothing relevant here"), None);
    }

    #[test]
    fn two_academic_keywords_beat_single_keyword_categories() {
        let suggested = suggest_category("", "my exam grade was entered wrong");
        assert_eq!(suggested, Some(GrievanceCategory::Academic));
    }

    #[test]
    fn hostel_room_complaint_outscores_the_overlapping_ac_cue() {
        // "ac" is an Infrastructure keyword and appears in the text, but
        // "hostel" + "room" give Hostel the strictly higher count.
        let suggested = suggest_category(
            "Broken AC in Room 204",
            "The AC unit in my hostel room has not worked for 2 weeks",
        );
        assert_eq!(suggested, Some(GrievanceCategory::Hostel));
    }

    #[test]
    fn equal_counts_keep_the_earliest_declared_category() {
        // One Academic keyword ("exam") and one Infrastructure keyword
        // ("fan"): Academic is declared first and wins the tie.
        let suggested = suggest_category("exam hall fan", "");
        assert_eq!(suggested, Some(GrievanceCategory::Academic));
    }

    #[test]
    fn suggestion_is_idempotent() {
        let first = suggest_category("bus route changed", "the shuttle is always late");
        let second = suggest_category("bus route changed", "the shuttle is always late");
        assert_eq!(first, second);
        assert_eq!(first, Some(GrievanceCategory::Transport));
    }

    #[test]
    fn every_category_has_keywords() {
        for category in GrievanceCategory::all() {
            assert!(!category_keywords(*category).is_empty());
        }
    }
}
