use crate::models::{CourseId, StudentId};
use crate::transcript::Transcript;

/// Read-only transcript view for one student.
pub(crate) struct TranscriptScreen {
    pub(crate) transcript: Transcript,
    pub(crate) scroll: u16,
}

impl TranscriptScreen {
    pub(crate) fn new(transcript: Transcript) -> Self {
        Self {
            transcript,
            scroll: 0,
        }
    }

    pub(crate) fn scroll_by(&mut self, offset: i32) {
        let next = i64::from(self.scroll) + i64::from(offset);
        self.scroll = next.clamp(0, u16::MAX as i64) as u16;
    }
}

/// Drill-down view of one course: info header plus the selectable roster.
pub(crate) struct CourseDetailScreen {
    pub(crate) course_id: CourseId,
    pub(crate) selected: usize,
}

impl CourseDetailScreen {
    pub(crate) fn new(course_id: CourseId) -> Self {
        Self {
            course_id,
            selected: 0,
        }
    }

    /// Move the roster selection, clamped to `len` entries.
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected as isize + offset;
        self.selected = next.clamp(0, len as isize - 1) as usize;
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Modal list of students eligible for enrollment into one course.
pub(crate) struct EnrollPicker {
    pub(crate) course_id: CourseId,
    /// `(id, display line)` for each student not yet enrolled.
    pub(crate) candidates: Vec<(StudentId, String)>,
    pub(crate) selected: usize,
}

impl EnrollPicker {
    pub(crate) fn new(course_id: CourseId, candidates: Vec<(StudentId, String)>) -> Self {
        Self {
            course_id,
            candidates,
            selected: 0,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.candidates.is_empty() {
            self.selected = 0;
            return;
        }
        let next = self.selected as isize + offset;
        self.selected = next.clamp(0, self.candidates.len() as isize - 1) as usize;
    }

    pub(crate) fn current(&self) -> Option<StudentId> {
        self.candidates.get(self.selected).map(|(id, _)| *id)
    }
}
