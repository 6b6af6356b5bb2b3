//! Transcript generation: a stateless, read-only pass over the roster that
//! derives per-course statistics and an overall GPA for one student.

use crate::models::{CourseInfo, Score, StudentId, StudentInfo};
use crate::roster::{Course, Manager};

/// One course line on a transcript.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub course: CourseInfo,
    /// This student's score; `None` when nothing is recorded yet.
    pub score: Option<Score>,
    /// Lowest recorded score in the course, `None` when nobody is scored.
    pub min_score: Option<Score>,
    /// Highest recorded score in the course, `None` when nobody is scored.
    pub max_score: Option<Score>,
    /// Total enrollment of the course, scored or not.
    pub enrolled: usize,
    /// Competition rank among recorded scores: 1 + the number of strictly
    /// higher scores, so ties share a rank and the next distinct score skips
    /// the tied count (1, 2, 2, 4, ...). `0` means this student has no
    /// recorded score and is unranked.
    pub rank: usize,
}

/// A student's full transcript: every course they take (in taken-list order,
/// i.e. ascending course ID), the per-course statistics, and the
/// credit-weighted GPA over the scored courses.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub student: StudentInfo,
    pub entries: Vec<TranscriptEntry>,
    /// Sum of credits of the scored courses only; unscored courses do not
    /// count towards the GPA denominator.
    pub total_credit: i32,
    /// `None` when no course has a recorded score yet.
    pub gpa: Option<Score>,
}

/// Build the transcript for `student_id`, covering every course they take.
/// Returns `None` when the student does not exist.
pub fn generate_transcript(manager: &Manager, student_id: StudentId) -> Option<Transcript> {
    generate_transcript_filtered(manager, student_id, |_| true)
}

/// Like [`generate_transcript`] but only over courses accepted by `filter`
/// (e.g. one department, or courses worth credit).
///
/// A course ID in the student's taken-list that the manager cannot resolve
/// is a broken invariant, not a user error, and panics (see
/// [`crate::roster::Manager`]).
pub fn generate_transcript_filtered(
    manager: &Manager,
    student_id: StudentId,
    filter: impl Fn(&Course) -> bool,
) -> Option<Transcript> {
    let student = manager.student(student_id)?;

    let mut entries = Vec::new();
    let mut weighted_sum = 0.0f32;
    let mut total_credit = 0i32;

    for course_id in student.courses_taken() {
        let Some(course) = manager.course(course_id) else {
            panic!("roster corrupted: student {student_id} references missing course {course_id}");
        };
        if !filter(course) {
            continue;
        }

        let score = course.score(student_id);
        let (min_score, max_score, rank) = course_statistics(course, score);

        if let Some(value) = score {
            weighted_sum += value * course.info().credit as f32;
            total_credit += course.info().credit;
        }

        entries.push(TranscriptEntry {
            course: course.info().clone(),
            score,
            min_score,
            max_score,
            enrolled: course.enrollment_count(),
            rank,
        });
    }

    let gpa = if total_credit > 0 {
        Some(weighted_sum / total_credit as f32)
    } else {
        None
    };

    Some(Transcript {
        student: student.info().clone(),
        entries,
        total_credit,
        gpa,
    })
}

/// Scan a course's entire roster once, ignoring unrecorded scores, and
/// compute the min/max plus this student's competition rank.
fn course_statistics(
    course: &Course,
    student_score: Option<Score>,
) -> (Option<Score>, Option<Score>, usize) {
    let mut min_score: Option<Score> = None;
    let mut max_score: Option<Score> = None;
    let mut higher = 0usize;

    for entry in course.roster() {
        let Some(value) = entry.score else {
            continue;
        };
        min_score = Some(min_score.map_or(value, |m| m.min(value)));
        max_score = Some(max_score.map_or(value, |m| m.max(value)));
        if let Some(own) = student_score {
            if value > own {
                higher += 1;
            }
        }
    }

    let rank = match student_score {
        Some(_) => higher + 1,
        None => 0,
    };
    (min_score, max_score, rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseInfo;

    fn setup() -> Manager {
        let mut m = Manager::new();
        for (id, name) in [(1, "A"), (2, "B"), (3, "C"), (4, "D"), (5, "E")] {
            m.add_student(StudentInfo {
                id,
                name: name.to_string(),
                is_male: false,
                department: 0,
            })
            .unwrap();
        }
        m
    }

    fn add_course(m: &mut Manager, id: &str, credit: i32, capacity: usize) {
        m.add_course(CourseInfo {
            id: id.to_string(),
            name: format!("Course {id}"),
            department: 0,
            credit,
            capacity,
            teacher_name: "T".to_string(),
        })
        .unwrap();
    }

    #[test]
    fn unknown_student_yields_none() {
        let m = setup();
        assert!(generate_transcript(&m, 99).is_none());
    }

    #[test]
    fn competition_ranking_with_ties_and_a_gap() {
        let mut m = setup();
        add_course(&mut m, "C1", 3, 5);
        for id in 1..=5 {
            m.enroll(id, "C1").unwrap();
        }
        // A=90, B=80, C=80, D unscored, E=70
        m.set_score(1, "C1", 90.0).unwrap();
        m.set_score(2, "C1", 80.0).unwrap();
        m.set_score(3, "C1", 80.0).unwrap();
        m.set_score(5, "C1", 70.0).unwrap();

        let rank_of = |student: StudentId| {
            let t = generate_transcript(&m, student).unwrap();
            (t.entries[0].rank, t.entries[0].min_score, t.entries[0].max_score)
        };

        assert_eq!(rank_of(1), (1, Some(70.0), Some(90.0)));
        assert_eq!(rank_of(2).0, 2);
        assert_eq!(rank_of(3).0, 2);
        assert_eq!(rank_of(5).0, 4);
        // D has no score: unranked
        assert_eq!(rank_of(4).0, 0);
    }

    #[test]
    fn a_fully_unscored_course_has_no_statistics() {
        let mut m = setup();
        add_course(&mut m, "C1", 3, 5);
        m.enroll(1, "C1").unwrap();
        m.enroll(2, "C1").unwrap();

        let t = generate_transcript(&m, 1).unwrap();
        let entry = &t.entries[0];
        assert_eq!(entry.score, None);
        assert_eq!(entry.min_score, None);
        assert_eq!(entry.max_score, None);
        assert_eq!(entry.rank, 0);
        assert_eq!(entry.enrolled, 2);
        assert_eq!(t.total_credit, 0);
        assert_eq!(t.gpa, None);
    }

    #[test]
    fn gpa_weights_by_credit_and_skips_unscored_courses() {
        let mut m = setup();
        add_course(&mut m, "C1", 3, 5);
        add_course(&mut m, "C2", 4, 5);
        add_course(&mut m, "C3", 2, 5);
        for id in ["C1", "C2", "C3"] {
            m.enroll(1, id).unwrap();
        }
        m.set_score(1, "C1", 90.0).unwrap();
        m.set_score(1, "C2", 80.0).unwrap();
        // C3 left unscored: its 2 credits must not dilute the GPA

        let t = generate_transcript(&m, 1).unwrap();
        assert_eq!(t.total_credit, 7);
        let gpa = t.gpa.unwrap();
        assert!((gpa - 590.0 / 7.0).abs() < 1e-4, "gpa was {gpa}");
    }

    #[test]
    fn entries_follow_taken_list_order() {
        let mut m = setup();
        add_course(&mut m, "2015F-2", 1, 5);
        add_course(&mut m, "2014S-9", 1, 5);
        add_course(&mut m, "2015F-1", 1, 5);
        for id in ["2015F-2", "2014S-9", "2015F-1"] {
            m.enroll(1, id).unwrap();
        }

        let t = generate_transcript(&m, 1).unwrap();
        let ids: Vec<_> = t.entries.iter().map(|e| e.course.id.clone()).collect();
        assert_eq!(ids, ["2014S-9", "2015F-1", "2015F-2"]);
    }

    #[test]
    fn filter_limits_the_entries_and_the_gpa() {
        let mut m = setup();
        add_course(&mut m, "C1", 3, 5);
        add_course(&mut m, "C2", 4, 5);
        m.enroll(1, "C1").unwrap();
        m.enroll(1, "C2").unwrap();
        m.set_score(1, "C1", 90.0).unwrap();
        m.set_score(1, "C2", 60.0).unwrap();

        let t = generate_transcript_filtered(&m, 1, |c| c.info().id == "C1").unwrap();
        assert_eq!(t.entries.len(), 1);
        assert_eq!(t.total_credit, 3);
        assert_eq!(t.gpa, Some(90.0));
    }

    #[test]
    fn statistics_cover_the_whole_course_not_just_this_student() {
        let mut m = setup();
        add_course(&mut m, "C1", 3, 5);
        m.enroll(1, "C1").unwrap();
        m.enroll(2, "C1").unwrap();
        m.set_score(2, "C1", 95.0).unwrap();

        // Student 1 is unscored but still sees the course-wide min/max.
        let t = generate_transcript(&m, 1).unwrap();
        assert_eq!(t.entries[0].min_score, Some(95.0));
        assert_eq!(t.entries[0].max_score, Some(95.0));
        assert_eq!(t.entries[0].rank, 0);
    }
}
