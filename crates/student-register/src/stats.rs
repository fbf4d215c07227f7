//! Dashboard aggregates over the roster.

use serde::Serialize;

use crate::student::Student;

/// Number of students in one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassCount {
    /// Class label.
    pub class: String,
    /// Students enrolled in it.
    pub count: usize,
}

/// Totals shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterStats {
    /// Every student in the roster, whatever their class.
    pub total: usize,
    /// One entry per configured class, in configured order.
    pub per_class: Vec<ClassCount>,
}

/// Count students overall and per class.
///
/// Students whose class is not in `classes` count toward the total only.
#[must_use]
pub fn compute_stats(roster: &[Student], classes: &[String]) -> RosterStats {
    let per_class = classes
        .iter()
        .map(|class| ClassCount {
            class: class.clone(),
            count: roster.iter().filter(|s| &s.student_class == class).count(),
        })
        .collect();

    RosterStats {
        total: roster.len(),
        per_class,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::{StudentDraft, StudentId};

    fn student(roll: &str, class: &str) -> Student {
        Student::from_draft(StudentId::generate(), StudentDraft::new("Kid", roll, class))
    }

    fn count_for(stats: &RosterStats, class: &str) -> Option<usize> {
        stats
            .per_class
            .iter()
            .find(|c| c.class == class)
            .map(|c| c.count)
    }

    fn classes() -> Vec<String> {
        ["6", "7", "8", "9", "10"].map(String::from).to_vec()
    }

    #[test]
    fn test_single_student_scenario() {
        let stats = compute_stats(&[student("5", "7")], &classes());
        assert_eq!(stats.total, 1);
        assert_eq!(count_for(&stats, "7"), Some(1));
        assert_eq!(count_for(&stats, "6"), Some(0));
    }

    #[test]
    fn test_unknown_class_counts_in_total_only() {
        let roster = vec![student("1", "6"), student("2", "6"), student("1", "12")];
        let stats = compute_stats(&roster, &classes());

        assert_eq!(stats.total, 3);
        assert_eq!(count_for(&stats, "6"), Some(2));
        assert_eq!(count_for(&stats, "12"), None);
        let listed: usize = stats.per_class.iter().map(|c| c.count).sum();
        assert_eq!(listed, 2);
    }

    #[test]
    fn test_per_class_keeps_configured_order() {
        let stats = compute_stats(&[], &classes());
        let labels: Vec<&str> = stats.per_class.iter().map(|c| c.class.as_str()).collect();
        assert_eq!(labels, ["6", "7", "8", "9", "10"]);
        assert_eq!(stats.total, 0);
    }

    #[test]
    fn test_stats_serialize() {
        let stats = compute_stats(&[student("1", "8")], &classes());
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["per_class"][2]["class"], "8");
        assert_eq!(json["per_class"][2]["count"], 1);
    }
}
