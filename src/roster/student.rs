//! A student and the sorted, duplicate-free list of course IDs they take.

use crate::models::{CourseId, StudentInfo};

/// Identity of one student plus the IDs of the courses they are enrolled in.
///
/// The taken-list is kept sorted and unique at all times so membership tests
/// can binary-search it. Only [`super::Manager`] mutates the list; the course
/// side of each enrollment edge lives in [`super::Course`] and the two are
/// kept in step by the manager, never by this type reaching across.
#[derive(Debug, Clone)]
pub struct Student {
    info: StudentInfo,
    /// Sorted ascending, no duplicates.
    courses_taken: Vec<CourseId>,
}

impl Student {
    pub fn new(info: StudentInfo) -> Self {
        Self {
            info,
            courses_taken: Vec::new(),
        }
    }

    pub fn info(&self) -> &StudentInfo {
        &self.info
    }

    pub(super) fn set_info(&mut self, info: StudentInfo) {
        self.info = info;
    }

    /// Course IDs this student takes, in ascending ID order.
    pub fn courses_taken(&self) -> &[CourseId] {
        &self.courses_taken
    }

    /// Insert `course_id` into the sorted taken-list. Idempotent: inserting
    /// an ID that is already present changes nothing.
    pub(super) fn add_course_taken(&mut self, course_id: &CourseId) {
        if let Err(position) = self.courses_taken.binary_search(course_id) {
            self.courses_taken.insert(position, course_id.clone());
        }
    }

    /// Remove `course_id` from the taken-list; no-op if absent.
    pub(super) fn remove_course_taken(&mut self, course_id: &CourseId) {
        if let Ok(position) = self.courses_taken.binary_search(course_id) {
            self.courses_taken.remove(position);
        }
    }

    /// Binary-search membership test over the sorted taken-list.
    pub fn is_taking(&self, course_id: &CourseId) -> bool {
        self.courses_taken.binary_search(course_id).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Student {
        Student::new(StudentInfo {
            id: 2015011100,
            name: "Ada".to_string(),
            is_male: false,
            department: 12,
        })
    }

    #[test]
    fn taken_list_stays_sorted_and_unique() {
        let mut s = student();
        for id in ["2015F-30", "2014S-10", "2015F-20", "2014S-10"] {
            s.add_course_taken(&id.to_string());
        }
        assert_eq!(s.courses_taken(), ["2014S-10", "2015F-20", "2015F-30"]);
    }

    #[test]
    fn membership_follows_add_and_remove() {
        let mut s = student();
        let id = "2015F-40250".to_string();
        assert!(!s.is_taking(&id));

        s.add_course_taken(&id);
        assert!(s.is_taking(&id));

        s.remove_course_taken(&id);
        assert!(!s.is_taking(&id));

        // removing again is a no-op
        s.remove_course_taken(&id);
        assert!(s.courses_taken().is_empty());
    }
}
