//! A course: identity, capacity, and the scores of its enrolled students.

use crate::models::{CourseInfo, Score, StudentId};

/// One student's slot in a course roster.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub student_id: StudentId,
    /// `None` until a final score is recorded.
    pub score: Option<Score>,
}

/// A course and its roster of `(student, score)` pairs.
///
/// The roster is a vector sorted by student ID with no duplicates, looked up
/// by binary search. Mutation is O(n) because of the contiguous layout; that
/// trade is deliberate — rosters are read far more often than they change,
/// and the sorted order doubles as the stable iteration order everywhere
/// (listings, bulk score entry, persistence).
///
/// Enrollment here touches only the course's own side of the edge; the
/// matching taken-list update on the student happens in [`super::Manager`].
#[derive(Debug, Clone)]
pub struct Course {
    info: CourseInfo,
    /// Sorted by `student_id`, no duplicates, length never above capacity.
    roster: Vec<ScoreEntry>,
}

impl Course {
    pub fn new(info: CourseInfo) -> Self {
        Self {
            info,
            roster: Vec::new(),
        }
    }

    pub fn info(&self) -> &CourseInfo {
        &self.info
    }

    pub(super) fn set_info(&mut self, info: CourseInfo) {
        self.info = info;
    }

    /// The full roster in ascending student-ID order.
    pub fn roster(&self) -> &[ScoreEntry] {
        &self.roster
    }

    pub fn enrollment_count(&self) -> usize {
        self.roster.len()
    }

    pub fn is_enrolled(&self, student_id: StudentId) -> bool {
        self.position(student_id).is_ok()
    }

    /// The student's recorded score, or `None` if they are not enrolled or
    /// have no score yet.
    pub fn score(&self, student_id: StudentId) -> Option<Score> {
        let index = self.position(student_id).ok()?;
        self.roster[index].score
    }

    /// Add a student to the roster with no score. Returns `false` only when
    /// the course is at capacity; enrolling an already-enrolled student is a
    /// successful no-op regardless of how full the course is.
    pub(super) fn enroll(&mut self, student_id: StudentId) -> bool {
        match self.position(student_id) {
            Ok(_) => true,
            Err(position) => {
                if self.roster.len() >= self.info.capacity {
                    return false;
                }
                self.roster.insert(
                    position,
                    ScoreEntry {
                        student_id,
                        score: None,
                    },
                );
                true
            }
        }
    }

    /// Drop a student from the roster, discarding any recorded score.
    /// Returns whether the student had been enrolled.
    pub(super) fn withdraw(&mut self, student_id: StudentId) -> bool {
        match self.position(student_id) {
            Ok(index) => {
                self.roster.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Overwrite the score of an enrolled student. Fails (returns `false`)
    /// if the student is not enrolled.
    pub fn set_score(&mut self, student_id: StudentId, score: Score) -> bool {
        self.put_score(student_id, Some(score))
    }

    /// Like [`Course::set_score`] but can also reset a single student back
    /// to "no score". Used when migrating scores across an ID change.
    pub(super) fn put_score(&mut self, student_id: StudentId, score: Option<Score>) -> bool {
        match self.position(student_id) {
            Ok(index) => {
                self.roster[index].score = score;
                true
            }
            Err(_) => false,
        }
    }

    /// Apply a batch of `(student, score)` pairs, typically parsed from a
    /// grade sheet. Pairs naming students who are not enrolled are ignored;
    /// if a student appears more than once the first occurrence wins. The
    /// returned list holds every enrolled student who still has no score
    /// afterwards, in roster order, so the caller can chase them up one by
    /// one.
    pub fn record_final_scores(&mut self, pairs: &[(StudentId, Score)]) -> Vec<StudentId> {
        let mut touched = vec![false; self.roster.len()];
        for &(student_id, score) in pairs {
            if let Ok(index) = self.position(student_id) {
                if !touched[index] {
                    self.roster[index].score = Some(score);
                    touched[index] = true;
                }
            }
        }

        self.roster
            .iter()
            .filter(|entry| entry.score.is_none())
            .map(|entry| entry.student_id)
            .collect()
    }

    /// Reset every enrolled student back to "no score".
    pub fn clear_scores(&mut self) {
        for entry in &mut self.roster {
            entry.score = None;
        }
    }

    fn position(&self, student_id: StudentId) -> Result<usize, usize> {
        self.roster
            .binary_search_by_key(&student_id, |entry| entry.student_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(capacity: usize) -> Course {
        Course::new(CourseInfo {
            id: "2015F-40250".to_string(),
            name: "Data Structures".to_string(),
            department: 12,
            credit: 4,
            capacity,
            teacher_name: "Deng".to_string(),
        })
    }

    #[test]
    fn enrollment_never_exceeds_capacity() {
        let mut c = course(2);
        assert!(c.enroll(2));
        assert!(c.enroll(1));
        assert!(!c.enroll(3));
        assert!(!c.enroll(3));
        assert_eq!(c.enrollment_count(), 2);
    }

    #[test]
    fn enrolling_twice_is_a_noop_even_when_full() {
        let mut c = course(1);
        assert!(c.enroll(7));
        assert!(c.enroll(7));
        assert_eq!(c.enrollment_count(), 1);
    }

    #[test]
    fn roster_is_sorted_by_student_id() {
        let mut c = course(5);
        for id in [30, 10, 20] {
            c.enroll(id);
        }
        let ids: Vec<_> = c.roster().iter().map(|e| e.student_id).collect();
        assert_eq!(ids, [10, 20, 30]);
    }

    #[test]
    fn scores_start_absent_and_can_be_overwritten() {
        let mut c = course(3);
        c.enroll(1);
        assert_eq!(c.score(1), None);

        assert!(c.set_score(1, 92.0));
        assert_eq!(c.score(1), Some(92.0));
        assert!(c.set_score(1, 60.0));
        assert_eq!(c.score(1), Some(60.0));

        // not enrolled
        assert!(!c.set_score(2, 50.0));
        assert_eq!(c.score(2), None);
    }

    #[test]
    fn bulk_record_reports_unscored_in_roster_order() {
        let mut c = course(4);
        for id in [4, 2, 3, 1] {
            c.enroll(id);
        }
        // 9 is not enrolled and must be ignored; 2 appears twice, first wins
        let unscored = c.record_final_scores(&[(3, 77.0), (9, 50.0), (2, 88.0), (2, 1.0)]);
        assert_eq!(unscored, [1, 4]);
        assert_eq!(c.score(2), Some(88.0));
        assert_eq!(c.score(3), Some(77.0));
    }

    #[test]
    fn clearing_scores_resets_everyone() {
        let mut c = course(3);
        c.enroll(1);
        c.enroll(2);
        c.set_score(1, 95.0);
        c.clear_scores();
        assert_eq!(c.score(1), None);
        assert_eq!(c.score(2), None);
        assert_eq!(c.enrollment_count(), 2);
    }

    #[test]
    fn withdraw_discards_the_score() {
        let mut c = course(3);
        c.enroll(5);
        c.set_score(5, 80.0);
        assert!(c.withdraw(5));
        assert!(!c.withdraw(5));
        assert!(!c.is_enrolled(5));
        assert_eq!(c.score(5), None);
    }
}
