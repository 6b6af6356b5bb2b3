//! The entity store. The `Manager` owns every `Student` and `Course`, is the
//! only place either gets created or destroyed, and arbitrates every
//! operation that touches both sides of an enrollment edge.

use std::collections::BTreeMap;

use crate::models::{CourseId, CourseInfo, Score, StudentId, StudentInfo};

use super::{Course, RosterError, Student};

/// In-memory store of all students and courses, keyed by ID.
///
/// Both maps are `BTreeMap`s so iteration is in ascending ID order, which is
/// the order every listing, snapshot and transcript uses. After any public
/// operation returns, the two sides of each enrollment edge agree: a course
/// ID in a student's taken-list always names a stored course whose roster
/// contains that student, and vice versa. A lookup that the invariants
/// guarantee to succeed therefore panics on failure instead of returning an
/// error; continuing with a corrupted store would silently produce wrong
/// transcripts.
#[derive(Debug, Default)]
pub struct Manager {
    students: BTreeMap<StudentId, Student>,
    courses: BTreeMap<CourseId, Course>,
}

impl Manager {
    pub fn new() -> Self {
        Self::default()
    }

    // ===================== Student operations =====================

    /// Create a student with an empty taken-list. Fails if the ID is in use.
    pub fn add_student(&mut self, info: StudentInfo) -> Result<(), RosterError> {
        if self.students.contains_key(&info.id) {
            return Err(RosterError::DuplicateStudent(info.id));
        }
        self.students.insert(info.id, Student::new(info));
        Ok(())
    }

    /// Delete a student, first withdrawing them from every course they take.
    pub fn remove_student(&mut self, student_id: StudentId) -> Result<(), RosterError> {
        let Some(student) = self.students.get(&student_id) else {
            return Err(RosterError::UnknownStudent(student_id));
        };

        let courses_taken = student.courses_taken().to_vec();
        for course_id in &courses_taken {
            match self.courses.get_mut(course_id) {
                Some(course) => {
                    course.withdraw(student_id);
                }
                None => missing_course(student_id, course_id),
            }
        }
        self.students.remove(&student_id);
        Ok(())
    }

    pub fn student(&self, student_id: StudentId) -> Option<&Student> {
        self.students.get(&student_id)
    }

    pub fn has_student(&self, student_id: StudentId) -> bool {
        self.students.contains_key(&student_id)
    }

    /// Replace a student's identity fields. When the ID itself changes, every
    /// score the student holds migrates to the new ID and the old ID becomes
    /// unresolvable; if the new ID is already taken nothing changes at all.
    pub fn update_student(
        &mut self,
        student_id: StudentId,
        info: StudentInfo,
    ) -> Result<(), RosterError> {
        if info.id == student_id {
            return match self.students.get_mut(&student_id) {
                Some(student) => {
                    student.set_info(info);
                    Ok(())
                }
                None => Err(RosterError::UnknownStudent(student_id)),
            };
        }

        // The ID is changing: validate everything up front so the migration
        // below can no longer fail half-way.
        if !self.students.contains_key(&student_id) {
            return Err(RosterError::UnknownStudent(student_id));
        }
        if self.students.contains_key(&info.id) {
            return Err(RosterError::DuplicateStudent(info.id));
        }

        let Some(mut student) = self.students.remove(&student_id) else {
            return Err(RosterError::UnknownStudent(student_id));
        };

        let new_id = info.id;
        for course_id in student.courses_taken().to_vec() {
            let Some(course) = self.courses.get_mut(&course_id) else {
                missing_course(student_id, &course_id);
            };
            // Withdrawing frees a roster slot, so re-enrolling under the new
            // ID cannot hit the capacity limit.
            let saved = course.score(student_id);
            course.withdraw(student_id);
            course.enroll(new_id);
            course.put_score(new_id, saved);
        }

        student.set_info(info);
        self.students.insert(new_id, student);
        Ok(())
    }

    // ===================== Course operations =====================

    /// Create a course with an empty roster. Fails if the ID is in use.
    pub fn add_course(&mut self, info: CourseInfo) -> Result<(), RosterError> {
        if self.courses.contains_key(&info.id) {
            return Err(RosterError::DuplicateCourse(info.id));
        }
        self.courses.insert(info.id.clone(), Course::new(info));
        Ok(())
    }

    /// Delete a course, first removing it from the taken-list of every
    /// enrolled student.
    pub fn remove_course(&mut self, course_id: &str) -> Result<(), RosterError> {
        let Some(course) = self.courses.get(course_id) else {
            return Err(RosterError::UnknownCourse(course_id.to_string()));
        };

        let enrolled: Vec<StudentId> = course.roster().iter().map(|e| e.student_id).collect();
        let key = course.info().id.clone();
        for student_id in enrolled {
            match self.students.get_mut(&student_id) {
                Some(student) => student.remove_course_taken(&key),
                None => missing_student(course_id, student_id),
            }
        }
        self.courses.remove(course_id);
        Ok(())
    }

    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.courses.get(course_id)
    }

    pub fn has_course(&self, course_id: &str) -> bool {
        self.courses.contains_key(course_id)
    }

    /// Replace a course's identity fields. A capacity below the current
    /// enrollment is rejected outright, so the capacity invariant cannot be
    /// broken through this path. When the ID changes, every enrolled
    /// student's taken-list is rewritten to the new ID; scores stay with the
    /// course. All-or-nothing, like [`Manager::update_student`].
    pub fn update_course(&mut self, course_id: &str, info: CourseInfo) -> Result<(), RosterError> {
        let Some(course) = self.courses.get_mut(course_id) else {
            return Err(RosterError::UnknownCourse(course_id.to_string()));
        };
        if info.capacity < course.enrollment_count() {
            return Err(RosterError::CapacityBelowEnrollment {
                id: course.info().id.clone(),
                enrolled: course.enrollment_count(),
                capacity: info.capacity,
            });
        }

        if info.id == course_id {
            course.set_info(info);
            return Ok(());
        }

        if self.courses.contains_key(&info.id) {
            return Err(RosterError::DuplicateCourse(info.id));
        }

        let Some(mut course) = self.courses.remove(course_id) else {
            return Err(RosterError::UnknownCourse(course_id.to_string()));
        };

        let old_key = course.info().id.clone();
        let new_key = info.id.clone();
        for entry in course.roster() {
            match self.students.get_mut(&entry.student_id) {
                Some(student) => {
                    student.remove_course_taken(&old_key);
                    student.add_course_taken(&new_key);
                }
                None => missing_student(&old_key, entry.student_id),
            }
        }

        course.set_info(info);
        self.courses.insert(new_key, course);
        Ok(())
    }

    // ===================== Enrollment edges =====================

    /// Enroll a student in a course, updating both sides of the edge.
    /// Idempotent when the student is already enrolled.
    pub fn enroll(&mut self, student_id: StudentId, course_id: &str) -> Result<(), RosterError> {
        if !self.students.contains_key(&student_id) {
            return Err(RosterError::UnknownStudent(student_id));
        }
        let Some(course) = self.courses.get_mut(course_id) else {
            return Err(RosterError::UnknownCourse(course_id.to_string()));
        };
        if !course.enroll(student_id) {
            return Err(RosterError::CourseFull(course_id.to_string()));
        }
        let key = course.info().id.clone();

        match self.students.get_mut(&student_id) {
            Some(student) => student.add_course_taken(&key),
            None => missing_student(course_id, student_id),
        }
        Ok(())
    }

    /// Best-effort bulk enrollment, e.g. when importing a whole class list.
    /// Unknown student IDs and capacity rejections are skipped silently.
    /// Returns how many of the given students are enrolled afterwards; fails
    /// only when the course itself is unknown.
    pub fn enroll_many(
        &mut self,
        student_ids: &[StudentId],
        course_id: &str,
    ) -> Result<usize, RosterError> {
        if !self.courses.contains_key(course_id) {
            return Err(RosterError::UnknownCourse(course_id.to_string()));
        }

        let mut enrolled = 0;
        for &student_id in student_ids {
            if self.enroll(student_id, course_id).is_ok() {
                enrolled += 1;
            }
        }
        Ok(enrolled)
    }

    /// Withdraw a student from a course, updating both sides of the edge.
    /// Succeeds (as a no-op) when the student was not enrolled; fails only
    /// on unknown IDs.
    pub fn withdraw(&mut self, student_id: StudentId, course_id: &str) -> Result<(), RosterError> {
        if !self.students.contains_key(&student_id) {
            return Err(RosterError::UnknownStudent(student_id));
        }
        let Some(course) = self.courses.get_mut(course_id) else {
            return Err(RosterError::UnknownCourse(course_id.to_string()));
        };
        course.withdraw(student_id);
        let key = course.info().id.clone();

        match self.students.get_mut(&student_id) {
            Some(student) => student.remove_course_taken(&key),
            None => missing_student(course_id, student_id),
        }
        Ok(())
    }

    // ===================== Scores =====================

    /// Apply a grade sheet to a course; see [`Course::record_final_scores`].
    pub fn record_final_scores(
        &mut self,
        course_id: &str,
        pairs: &[(StudentId, Score)],
    ) -> Result<Vec<StudentId>, RosterError> {
        match self.courses.get_mut(course_id) {
            Some(course) => Ok(course.record_final_scores(pairs)),
            None => Err(RosterError::UnknownCourse(course_id.to_string())),
        }
    }

    /// Reset every score in a course; no-op when the course is unknown.
    pub fn clear_final_scores(&mut self, course_id: &str) {
        if let Some(course) = self.courses.get_mut(course_id) {
            course.clear_scores();
        }
    }

    /// A student's score in a course, or `None` when the course is unknown,
    /// the student is not enrolled, or no score has been recorded.
    pub fn score(&self, student_id: StudentId, course_id: &str) -> Option<Score> {
        self.courses.get(course_id)?.score(student_id)
    }

    /// Overwrite one student's score in a course.
    pub fn set_score(
        &mut self,
        student_id: StudentId,
        course_id: &str,
        score: Score,
    ) -> Result<(), RosterError> {
        let Some(course) = self.courses.get_mut(course_id) else {
            return Err(RosterError::UnknownCourse(course_id.to_string()));
        };
        if !course.set_score(student_id, score) {
            return Err(RosterError::NotEnrolled {
                student_id,
                course_id: course_id.to_string(),
            });
        }
        Ok(())
    }

    // ===================== Iteration =====================

    /// All students in ascending ID order.
    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.students.values()
    }

    /// All courses in ascending ID order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }
}

/// A student's taken-list names a course the store does not hold. This can
/// only happen through a bug in `Manager` itself, so there is no recovery.
fn missing_course(student_id: StudentId, course_id: &str) -> ! {
    panic!("roster corrupted: student {student_id} references missing course {course_id}");
}

/// A course roster names a student the store does not hold.
fn missing_student(course_id: &str, student_id: StudentId) -> ! {
    panic!("roster corrupted: course {course_id} references missing student {student_id}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student_info(id: StudentId, name: &str) -> StudentInfo {
        StudentInfo {
            id,
            name: name.to_string(),
            is_male: true,
            department: 12,
        }
    }

    fn course_info(id: &str, credit: i32, capacity: usize) -> CourseInfo {
        CourseInfo {
            id: id.to_string(),
            name: format!("Course {id}"),
            department: 12,
            credit,
            capacity,
            teacher_name: "Deng".to_string(),
        }
    }

    fn manager() -> Manager {
        let mut m = Manager::new();
        m.add_student(student_info(1, "Ada")).unwrap();
        m.add_student(student_info(2, "Brian")).unwrap();
        m.add_student(student_info(3, "Grace")).unwrap();
        m.add_course(course_info("2015F-1", 3, 10)).unwrap();
        m.add_course(course_info("2015F-2", 4, 2)).unwrap();
        m
    }

    /// Both sides of every enrollment edge must agree.
    fn assert_integrity(m: &Manager) {
        for student in m.students() {
            for course_id in student.courses_taken() {
                let course = m
                    .course(course_id)
                    .unwrap_or_else(|| panic!("taken-list names missing course {course_id}"));
                assert!(
                    course.is_enrolled(student.info().id),
                    "student {} takes {course_id} but is not on its roster",
                    student.info().id
                );
            }
        }
        for course in m.courses() {
            for entry in course.roster() {
                let student = m
                    .student(entry.student_id)
                    .unwrap_or_else(|| panic!("roster names missing student {}", entry.student_id));
                assert!(
                    student.is_taking(&course.info().id),
                    "course {} holds student {} who does not take it",
                    course.info().id,
                    entry.student_id
                );
            }
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut m = manager();
        assert_eq!(
            m.add_student(student_info(1, "Imposter")),
            Err(RosterError::DuplicateStudent(1))
        );
        assert_eq!(
            m.add_course(course_info("2015F-1", 1, 1)),
            Err(RosterError::DuplicateCourse("2015F-1".to_string()))
        );
    }

    #[test]
    fn enrollment_updates_both_sides() {
        let mut m = manager();
        m.enroll(1, "2015F-1").unwrap();
        assert!(m.student(1).unwrap().is_taking(&"2015F-1".to_string()));
        assert!(m.course("2015F-1").unwrap().is_enrolled(1));
        assert_integrity(&m);

        m.withdraw(1, "2015F-1").unwrap();
        assert!(!m.student(1).unwrap().is_taking(&"2015F-1".to_string()));
        assert!(!m.course("2015F-1").unwrap().is_enrolled(1));
        assert_integrity(&m);
    }

    #[test]
    fn enroll_validates_both_ids() {
        let mut m = manager();
        assert_eq!(
            m.enroll(99, "2015F-1"),
            Err(RosterError::UnknownStudent(99))
        );
        assert_eq!(
            m.enroll(1, "nope"),
            Err(RosterError::UnknownCourse("nope".to_string()))
        );
    }

    #[test]
    fn repeated_enroll_and_withdraw_are_idempotent() {
        let mut m = manager();
        m.enroll(1, "2015F-1").unwrap();
        m.enroll(1, "2015F-1").unwrap();
        assert_eq!(m.course("2015F-1").unwrap().enrollment_count(), 1);
        assert_eq!(m.student(1).unwrap().courses_taken().len(), 1);

        // withdrawing someone who is not enrolled succeeds and changes nothing
        m.withdraw(2, "2015F-1").unwrap();
        assert_eq!(m.course("2015F-1").unwrap().enrollment_count(), 1);
        assert_integrity(&m);
    }

    #[test]
    fn full_course_rejects_and_stays_unchanged() {
        let mut m = manager();
        m.enroll(1, "2015F-2").unwrap();
        m.enroll(2, "2015F-2").unwrap();

        for _ in 0..3 {
            assert_eq!(
                m.enroll(3, "2015F-2"),
                Err(RosterError::CourseFull("2015F-2".to_string()))
            );
            assert_eq!(m.course("2015F-2").unwrap().enrollment_count(), 2);
        }
        assert!(!m.student(3).unwrap().is_taking(&"2015F-2".to_string()));
        assert_integrity(&m);
    }

    #[test]
    fn enroll_many_is_best_effort() {
        let mut m = manager();
        // capacity 2: student 3 is rejected, 99 is unknown
        let enrolled = m.enroll_many(&[1, 99, 2, 3], "2015F-2").unwrap();
        assert_eq!(enrolled, 2);
        assert!(m.course("2015F-2").unwrap().is_enrolled(1));
        assert!(m.course("2015F-2").unwrap().is_enrolled(2));
        assert!(!m.course("2015F-2").unwrap().is_enrolled(3));
        assert_integrity(&m);

        assert_eq!(
            m.enroll_many(&[1], "nope"),
            Err(RosterError::UnknownCourse("nope".to_string()))
        );
    }

    #[test]
    fn removing_a_student_cascades_to_courses() {
        let mut m = manager();
        m.enroll(1, "2015F-1").unwrap();
        m.enroll(1, "2015F-2").unwrap();
        m.remove_student(1).unwrap();

        assert!(m.student(1).is_none());
        assert!(!m.course("2015F-1").unwrap().is_enrolled(1));
        assert!(!m.course("2015F-2").unwrap().is_enrolled(1));
        assert_integrity(&m);
    }

    #[test]
    fn removing_a_course_cascades_to_students() {
        let mut m = manager();
        m.enroll(1, "2015F-1").unwrap();
        m.enroll(2, "2015F-1").unwrap();
        m.remove_course("2015F-1").unwrap();

        assert!(m.course("2015F-1").is_none());
        assert!(!m.student(1).unwrap().is_taking(&"2015F-1".to_string()));
        assert!(!m.student(2).unwrap().is_taking(&"2015F-1".to_string()));
        assert_integrity(&m);
    }

    #[test]
    fn renaming_a_student_carries_every_score() {
        let mut m = manager();
        m.enroll(1, "2015F-1").unwrap();
        m.enroll(1, "2015F-2").unwrap();
        m.set_score(1, "2015F-1", 91.0).unwrap();
        // 2015F-2 deliberately left unscored

        m.update_student(1, student_info(42, "Ada")).unwrap();

        assert!(m.student(1).is_none());
        assert!(!m.course("2015F-1").unwrap().is_enrolled(1));
        assert_eq!(m.score(42, "2015F-1"), Some(91.0));
        assert_eq!(m.score(42, "2015F-2"), None);
        assert!(m.course("2015F-2").unwrap().is_enrolled(42));
        assert_integrity(&m);
    }

    #[test]
    fn renaming_a_student_works_when_their_course_is_full() {
        let mut m = manager();
        m.enroll(1, "2015F-2").unwrap();
        m.enroll(2, "2015F-2").unwrap();
        m.set_score(1, "2015F-2", 77.5).unwrap();

        m.update_student(1, student_info(42, "Ada")).unwrap();
        assert_eq!(m.score(42, "2015F-2"), Some(77.5));
        assert_eq!(m.course("2015F-2").unwrap().enrollment_count(), 2);
        assert_integrity(&m);
    }

    #[test]
    fn failed_student_rename_changes_nothing() {
        let mut m = manager();
        m.enroll(1, "2015F-1").unwrap();
        m.set_score(1, "2015F-1", 88.0).unwrap();

        // 2 already exists
        assert_eq!(
            m.update_student(1, student_info(2, "Ada")),
            Err(RosterError::DuplicateStudent(2))
        );
        assert_eq!(m.student(1).unwrap().info().name, "Ada");
        assert_eq!(m.score(1, "2015F-1"), Some(88.0));
        assert_integrity(&m);
    }

    #[test]
    fn updating_identity_without_id_change() {
        let mut m = manager();
        let mut info = student_info(1, "Ada Lovelace");
        info.department = 18;
        m.update_student(1, info).unwrap();
        assert_eq!(m.student(1).unwrap().info().name, "Ada Lovelace");
        assert_eq!(m.student(1).unwrap().info().department, 18);

        assert_eq!(
            m.update_student(99, student_info(99, "Ghost")),
            Err(RosterError::UnknownStudent(99))
        );
    }

    #[test]
    fn renaming_a_course_rewrites_taken_lists() {
        let mut m = manager();
        m.enroll(1, "2015F-1").unwrap();
        m.enroll(2, "2015F-1").unwrap();
        m.set_score(1, "2015F-1", 66.0).unwrap();

        m.update_course("2015F-1", course_info("2016S-9", 3, 10))
            .unwrap();

        assert!(m.course("2015F-1").is_none());
        assert!(m.student(1).unwrap().is_taking(&"2016S-9".to_string()));
        assert!(!m.student(1).unwrap().is_taking(&"2015F-1".to_string()));
        assert_eq!(m.score(1, "2016S-9"), Some(66.0));
        assert_integrity(&m);
    }

    #[test]
    fn failed_course_rename_changes_nothing() {
        let mut m = manager();
        m.enroll(1, "2015F-1").unwrap();

        assert_eq!(
            m.update_course("2015F-1", course_info("2015F-2", 3, 10)),
            Err(RosterError::DuplicateCourse("2015F-2".to_string()))
        );
        assert!(m.course("2015F-1").unwrap().is_enrolled(1));
        assert!(m.student(1).unwrap().is_taking(&"2015F-1".to_string()));
        assert_integrity(&m);
    }

    #[test]
    fn course_capacity_cannot_shrink_below_enrollment() {
        let mut m = manager();
        m.enroll(1, "2015F-1").unwrap();
        m.enroll(2, "2015F-1").unwrap();

        assert_eq!(
            m.update_course("2015F-1", course_info("2015F-1", 3, 1)),
            Err(RosterError::CapacityBelowEnrollment {
                id: "2015F-1".to_string(),
                enrolled: 2,
                capacity: 1,
            })
        );
        // shrinking down to the current enrollment is fine
        m.update_course("2015F-1", course_info("2015F-1", 3, 2))
            .unwrap();
        assert_eq!(m.course("2015F-1").unwrap().info().capacity, 2);
    }

    #[test]
    fn score_operations_delegate_to_the_course() {
        let mut m = manager();
        m.enroll(1, "2015F-1").unwrap();
        m.enroll(2, "2015F-1").unwrap();

        let unscored = m
            .record_final_scores("2015F-1", &[(1, 90.0)])
            .unwrap();
        assert_eq!(unscored, [2]);
        assert_eq!(m.score(1, "2015F-1"), Some(90.0));

        assert_eq!(
            m.set_score(3, "2015F-1", 50.0),
            Err(RosterError::NotEnrolled {
                student_id: 3,
                course_id: "2015F-1".to_string(),
            })
        );
        assert_eq!(
            m.record_final_scores("nope", &[]),
            Err(RosterError::UnknownCourse("nope".to_string()))
        );

        m.clear_final_scores("2015F-1");
        assert_eq!(m.score(1, "2015F-1"), None);
        // unknown course: silent no-op
        m.clear_final_scores("nope");
    }

    #[test]
    fn iteration_is_id_sorted() {
        let mut m = Manager::new();
        m.add_student(student_info(30, "C")).unwrap();
        m.add_student(student_info(10, "A")).unwrap();
        m.add_student(student_info(20, "B")).unwrap();
        m.add_course(course_info("B-2", 1, 1)).unwrap();
        m.add_course(course_info("A-1", 1, 1)).unwrap();

        let student_ids: Vec<_> = m.students().map(|s| s.info().id).collect();
        assert_eq!(student_ids, [10, 20, 30]);
        let course_ids: Vec<_> = m.courses().map(|c| c.info().id.clone()).collect();
        assert_eq!(course_ids, ["A-1", "B-2"]);
    }

    #[test]
    fn integrity_holds_across_a_mixed_sequence() {
        let mut m = manager();
        m.enroll_many(&[1, 2, 3], "2015F-1").unwrap();
        m.enroll(2, "2015F-2").unwrap();
        assert_integrity(&m);

        m.update_student(2, student_info(20, "Brian")).unwrap();
        assert_integrity(&m);

        m.update_course("2015F-1", course_info("2017U-5", 2, 5))
            .unwrap();
        assert_integrity(&m);

        m.remove_student(3).unwrap();
        assert_integrity(&m);

        m.remove_course("2015F-2").unwrap();
        assert_integrity(&m);
        assert!(m.student(20).unwrap().is_taking(&"2017U-5".to_string()));
    }
}
