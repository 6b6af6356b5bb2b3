//! The roster core: students, courses and the manager that owns both sides
//! of the enrollment relationship.

mod course;
mod manager;
mod student;

pub use course::{Course, ScoreEntry};
pub use manager::Manager;
pub use student::Student;

use crate::models::{CourseId, StudentId};

/// Expected, caller-visible failures of roster operations. Anything the user
/// can trigger (duplicate IDs, unknown IDs, a full course) comes back through
/// this enum; a broken cross-reference inside the store is a bug and panics
/// instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("student ID {0} is already in use")]
    DuplicateStudent(StudentId),
    #[error("course ID {0} is already in use")]
    DuplicateCourse(CourseId),
    #[error("no student with ID {0}")]
    UnknownStudent(StudentId),
    #[error("no course with ID {0}")]
    UnknownCourse(CourseId),
    #[error("course {0} is at capacity")]
    CourseFull(CourseId),
    #[error("course {id} has {enrolled} enrolled students, cannot shrink capacity to {capacity}")]
    CapacityBelowEnrollment {
        id: CourseId,
        enrolled: usize,
        capacity: usize,
    },
    #[error("student {student_id} is not enrolled in course {course_id}")]
    NotEnrolled {
        student_id: StudentId,
        course_id: CourseId,
    },
}
