//! Filtering and sorting the roster for display.
//!
//! [`view`] is a pure function over a roster snapshot: it never touches the
//! store and applying it twice with the same query gives the same result.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::student::Student;

/// Order in which a view lists students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// By class, then roll, both numerically.
    #[default]
    Roll,
    /// By name, ignoring case and accents except to break ties.
    Name,
    /// By notes, ignoring case and accents except to break ties.
    Notes,
}

/// Parameters of a roster view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    /// Free text matched against name, roll, notes, phone, and guardian.
    pub search: String,
    /// Exact class label to keep; empty keeps every class.
    pub class_filter: String,
    /// Sort order of the result.
    pub sort: SortKey,
}

impl ViewQuery {
    /// A query that keeps everything, sorted by `sort`.
    #[must_use]
    pub fn sorted_by(sort: SortKey) -> Self {
        Self {
            sort,
            ..Self::default()
        }
    }

    /// Set the search text.
    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    /// Set the class filter.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class_filter = class.into();
        self
    }
}

/// Filter and sort a roster snapshot. The sort is stable.
#[must_use]
pub fn view(roster: &[Student], query: &ViewQuery) -> Vec<Student> {
    let needle = query.search.trim().to_lowercase();
    let class_filter = query.class_filter.as_str();

    let mut rows: Vec<Student> = roster
        .iter()
        .filter(|s| matches_search(s, &needle))
        .filter(|s| class_filter.is_empty() || s.student_class == class_filter)
        .cloned()
        .collect();

    match query.sort {
        SortKey::Roll => {
            rows.sort_by_key(|s| (leading_int(&s.student_class), leading_int(&s.roll)));
        }
        SortKey::Name => rows.sort_by_cached_key(|s| CollationKey::new(&s.name)),
        SortKey::Notes => rows.sort_by_cached_key(|s| CollationKey::new(&s.notes)),
    }
    rows
}

/// Whether any searchable field contains the already lower-cased `needle`.
fn matches_search(student: &Student, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        &student.name,
        &student.roll,
        &student.notes,
        &student.phone,
        &student.guardian,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Sort key for human text, compared level by level.
///
/// Base letters decide first (`é` sorts with `e`, case ignored), then
/// accents, then the raw text.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
    base: String,
    accented: String,
    raw: String,
}

impl CollationKey {
    fn new(text: &str) -> Self {
        let accented: String = text.nfd().flat_map(char::to_lowercase).collect();
        let base = accented.chars().filter(|c| !is_combining_mark(*c)).collect();
        Self {
            base,
            accented,
            raw: text.to_string(),
        }
    }
}

/// Parse the leading integer of `s` the way a lenient form field would.
///
/// Leading whitespace and one sign are allowed; parsing stops at the first
/// non-digit. Text without leading digits, or too large to hold, is 0.
#[must_use]
pub fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::{StudentDraft, StudentId};

    fn student(name: &str, roll: &str, class: &str) -> Student {
        Student::from_draft(StudentId::generate(), StudentDraft::new(name, roll, class))
    }

    fn names(rows: &[Student]) -> Vec<&str> {
        rows.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_search_scenario() {
        let roster = vec![student("Bob Jones", "5", "7")];

        let hits = view(&roster, &ViewQuery::default().search("jones"));
        assert_eq!(hits.len(), 1);

        let misses = view(&roster, &ViewQuery::default().search("zzz"));
        assert!(misses.is_empty());
    }

    #[test]
    fn test_search_matches_any_field_case_insensitively() {
        let mut a = student("Ann Lee", "11", "6");
        a.guardian = "Peter Lee".to_string();
        let mut b = student("Ben Roy", "12", "6");
        b.phone = "555-0199".to_string();
        let mut c = student("Cal Day", "13", "6");
        c.notes = "Needs GLASSES".to_string();
        let roster = vec![a, b, c];

        assert_eq!(names(&view(&roster, &ViewQuery::default().search("PETER"))), ["Ann Lee"]);
        assert_eq!(names(&view(&roster, &ViewQuery::default().search("0199"))), ["Ben Roy"]);
        assert_eq!(names(&view(&roster, &ViewQuery::default().search("glasses"))), ["Cal Day"]);
        assert_eq!(names(&view(&roster, &ViewQuery::default().search(" 13 "))), ["Cal Day"]);
        assert_eq!(view(&roster, &ViewQuery::default().search("   ")).len(), 3);
    }

    #[test]
    fn test_class_filter_is_exact_and_anded() {
        let roster = vec![
            student("Ann", "1", "6"),
            student("Ann", "1", "10"),
            student("Ben", "2", "6"),
        ];

        let rows = view(&roster, &ViewQuery::default().class("6"));
        assert_eq!(rows.len(), 2);

        let rows = view(&roster, &ViewQuery::default().class("6").search("ann"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student_class, "6");
    }

    #[test]
    fn test_class_filter_does_not_trim() {
        let roster = vec![student("Ann", "1", "6")];
        assert!(view(&roster, &ViewQuery::default().class(" 6")).is_empty());
        assert_eq!(view(&roster, &ViewQuery::default().class("6")).len(), 1);
    }

    #[test]
    fn test_sort_by_roll_orders_class_then_roll_numerically() {
        let roster = vec![
            student("A", "2", "7"),
            student("B", "10", "6"),
            student("C", "9", "6"),
            student("D", "1", "10"),
        ];

        let rows = view(&roster, &ViewQuery::sorted_by(SortKey::Roll));
        assert_eq!(names(&rows), ["C", "B", "A", "D"]);
    }

    #[test]
    fn test_sort_by_roll_regardless_of_input_order() {
        let forward = vec![student("Seven", "1", "7"), student("Six", "1", "6")];
        let backward: Vec<Student> = forward.iter().rev().cloned().collect();

        for roster in [forward, backward] {
            let rows = view(&roster, &ViewQuery::sorted_by(SortKey::Roll));
            let classes: Vec<&str> = rows.iter().map(|s| s.student_class.as_str()).collect();
            assert_eq!(classes, ["6", "7"]);
        }
    }

    #[test]
    fn test_sort_by_roll_non_numeric_is_zero() {
        let roster = vec![student("A", "3", "6"), student("B", "x", "6")];
        let rows = view(&roster, &ViewQuery::sorted_by(SortKey::Roll));
        assert_eq!(names(&rows), ["B", "A"]);
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let roster = vec![
            student("charlie", "1", "6"),
            student("Alice", "2", "6"),
            student("bob", "3", "6"),
        ];
        let rows = view(&roster, &ViewQuery::sorted_by(SortKey::Name));
        assert_eq!(names(&rows), ["Alice", "bob", "charlie"]);
    }

    #[test]
    fn test_sort_by_notes_missing_first() {
        let mut a = student("A", "1", "6");
        a.notes = "zebra".to_string();
        let b = student("B", "2", "6");
        let mut c = student("C", "3", "6");
        c.notes = "Apple".to_string();

        let rows = view(&[a, b, c], &ViewQuery::sorted_by(SortKey::Notes));
        assert_eq!(names(&rows), ["B", "C", "A"]);
    }

    #[test]
    fn test_view_is_idempotent_and_pure() {
        let roster = vec![student("B", "2", "7"), student("A", "1", "6")];
        let snapshot = roster.clone();
        let query = ViewQuery::sorted_by(SortKey::Name).search("a");

        let once = view(&roster, &query);
        let twice = view(&once, &query);
        assert_eq!(once, twice);
        assert_eq!(roster, snapshot);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("42"), 42);
        assert_eq!(leading_int("  7b"), 7);
        assert_eq!(leading_int("-3"), -3);
        assert_eq!(leading_int("abc"), 0);
        assert_eq!(leading_int(""), 0);
        assert_eq!(leading_int("99999999999999999999"), 0);
    }

    #[test]
    fn test_sort_by_name_places_accented_letters_with_base_letters() {
        let roster = vec![
            student("Zoe Park", "1", "6"),
            student("Émile Zola", "2", "6"),
            student("Eva Ray", "3", "6"),
        ];
        let rows = view(&roster, &ViewQuery::sorted_by(SortKey::Name));
        assert_eq!(names(&rows), ["Émile Zola", "Eva Ray", "Zoe Park"]);
    }

    #[test]
    fn test_accents_and_case_only_break_ties() {
        let roster = vec![
            student("résumé", "1", "6"),
            student("resume", "2", "6"),
            student("Resume", "3", "6"),
        ];
        let rows = view(&roster, &ViewQuery::sorted_by(SortKey::Name));
        assert_eq!(names(&rows), ["Resume", "resume", "résumé"]);
    }

    #[test]
    fn test_sort_by_notes_with_accents() {
        let mut a = student("A", "1", "6");
        a.notes = "zebra".to_string();
        let mut b = student("B", "2", "6");
        b.notes = "Éclair".to_string();
        let mut c = student("C", "3", "6");
        c.notes = "apple".to_string();

        let rows = view(&[a, b, c], &ViewQuery::sorted_by(SortKey::Notes));
        assert_eq!(names(&rows), ["C", "B", "A"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let roster = vec![student("Ann", "2", "6"), student("Ann", "1", "6")];
        let rows = view(&roster, &ViewQuery::sorted_by(SortKey::Name));
        let rolls: Vec<&str> = rows.iter().map(|s| s.roll.as_str()).collect();
        assert_eq!(rolls, ["2", "1"]);
        assert_eq!(SortKey::default(), SortKey::Roll);
    }
}
