use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{CourseId, CourseInfo, Score, StudentId, StudentInfo, DEPARTMENTS};

/// Internal representation of the student form fields. Everything is kept as
/// raw text until submit so the user can type freely; `parse_inputs` is the
/// single validation point before anything reaches the roster.
#[derive(Default, Clone)]
pub(crate) struct StudentForm {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) gender: String,
    pub(crate) department: String,
    pub(crate) active: StudentField,
    pub(crate) error: Option<String>,
}

/// Fields available within the student form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum StudentField {
    #[default]
    Id,
    Name,
    Gender,
    Department,
}

impl StudentForm {
    /// Populate the form from an existing student when editing.
    pub(crate) fn from_student(info: &StudentInfo) -> Self {
        Self {
            id: info.id.to_string(),
            name: info.name.clone(),
            gender: info.gender_label().to_string(),
            department: info.department.to_string(),
            active: StudentField::Id,
            error: None,
        }
    }

    /// Cycle focus across the fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            StudentField::Id => StudentField::Name,
            StudentField::Name => StudentField::Gender,
            StudentField::Gender => StudentField::Department,
            StudentField::Department => StudentField::Id,
        };
    }

    /// Append a character to the active field, validating allowed input.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            StudentField::Id => {
                if ch.is_ascii_digit() {
                    self.id.push(ch);
                    true
                } else {
                    false
                }
            }
            StudentField::Name => {
                if !ch.is_control() {
                    self.name.push(ch);
                    true
                } else {
                    false
                }
            }
            StudentField::Gender => {
                // single-letter field; typing replaces the previous value
                if matches!(ch, 'm' | 'M' | 'f' | 'F') {
                    self.gender = ch.to_ascii_uppercase().to_string();
                    true
                } else {
                    false
                }
            }
            StudentField::Department => {
                if ch.is_ascii_digit() {
                    self.department.push(ch);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            StudentField::Id => {
                self.id.pop();
            }
            StudentField::Name => {
                self.name.pop();
            }
            StudentField::Gender => {
                self.gender.pop();
            }
            StudentField::Department => {
                self.department.pop();
            }
        }
    }

    /// Validate the inputs and return a record ready for the roster.
    pub(crate) fn parse_inputs(&self) -> Result<StudentInfo> {
        let id_raw = self.id.trim();
        if id_raw.is_empty() {
            return Err(anyhow!("Student ID is required."));
        }
        let id: StudentId = id_raw
            .parse()
            .context("Student ID must be a whole number.")?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Name is required."));
        }

        let is_male = match self.gender.trim() {
            "M" | "m" => true,
            "F" | "f" => false,
            _ => return Err(anyhow!("Gender must be M or F.")),
        };

        let department: usize = self
            .department
            .trim()
            .parse()
            .context("Department must be a number.")?;
        if department >= DEPARTMENTS.len() {
            return Err(anyhow!(
                "Department must be below {}.",
                DEPARTMENTS.len()
            ));
        }

        Ok(StudentInfo {
            id,
            name: name.to_string(),
            is_male,
            department,
        })
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: StudentField) -> Line<'static> {
        let (value, is_active) = match field {
            StudentField::Id => (&self.id, self.active == StudentField::Id),
            StudentField::Name => (&self.name, self.active == StudentField::Name),
            StudentField::Gender => (&self.gender, self.active == StudentField::Gender),
            StudentField::Department => (&self.department, self.active == StudentField::Department),
        };
        form_line(field_name, value, is_active, "<required>")
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: StudentField) -> usize {
        match field {
            StudentField::Id => self.id.chars().count(),
            StudentField::Name => self.name.chars().count(),
            StudentField::Gender => self.gender.chars().count(),
            StudentField::Department => self.department.chars().count(),
        }
    }
}

/// Form state for course creation/editing.
#[derive(Default, Clone)]
pub(crate) struct CourseForm {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) department: String,
    pub(crate) credit: String,
    pub(crate) capacity: String,
    pub(crate) teacher: String,
    pub(crate) active: CourseField,
    pub(crate) error: Option<String>,
}

/// Enumerates the fields within the course form to drive focus management.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum CourseField {
    #[default]
    Id,
    Name,
    Department,
    Credit,
    Capacity,
    Teacher,
}

impl CourseForm {
    /// Populate the form from an existing course when entering edit mode.
    pub(crate) fn from_course(info: &CourseInfo) -> Self {
        Self {
            id: info.id.clone(),
            name: info.name.clone(),
            department: info.department.to_string(),
            credit: info.credit.to_string(),
            capacity: info.capacity.to_string(),
            teacher: info.teacher_name.clone(),
            active: CourseField::Id,
            error: None,
        }
    }

    /// Cycle focus across the six fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            CourseField::Id => CourseField::Name,
            CourseField::Name => CourseField::Department,
            CourseField::Department => CourseField::Credit,
            CourseField::Credit => CourseField::Capacity,
            CourseField::Capacity => CourseField::Teacher,
            CourseField::Teacher => CourseField::Id,
        };
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            // course IDs may mix digits and letters; only whitespace is out
            CourseField::Id => {
                if ch.is_whitespace() {
                    return false;
                }
                self.id.push(ch);
            }
            CourseField::Name => self.name.push(ch),
            CourseField::Department | CourseField::Credit | CourseField::Capacity => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                match self.active {
                    CourseField::Department => self.department.push(ch),
                    CourseField::Credit => self.credit.push(ch),
                    _ => self.capacity.push(ch),
                }
            }
            CourseField::Teacher => self.teacher.push(ch),
        }
        true
    }

    /// Remove a character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            CourseField::Id => {
                self.id.pop();
            }
            CourseField::Name => {
                self.name.pop();
            }
            CourseField::Department => {
                self.department.pop();
            }
            CourseField::Credit => {
                self.credit.pop();
            }
            CourseField::Capacity => {
                self.capacity.pop();
            }
            CourseField::Teacher => {
                self.teacher.pop();
            }
        }
    }

    /// Validate and normalize form inputs before they reach the roster.
    pub(crate) fn parse_inputs(&self) -> Result<CourseInfo> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(anyhow!("Course ID is required."));
        }

        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Course name is required."));
        }

        let department: usize = self
            .department
            .trim()
            .parse()
            .context("Department must be a number.")?;
        if department >= DEPARTMENTS.len() {
            return Err(anyhow!(
                "Department must be below {}.",
                DEPARTMENTS.len()
            ));
        }

        let credit: i32 = self.credit.trim().parse().context("Credit must be a number.")?;
        let capacity: usize = self
            .capacity
            .trim()
            .parse()
            .context("Capacity must be a number.")?;
        if capacity == 0 {
            return Err(anyhow!("Capacity must be at least 1."));
        }

        let teacher = self.teacher.trim();
        if teacher.is_empty() {
            return Err(anyhow!("Teacher name is required."));
        }

        Ok(CourseInfo {
            id: id.to_string(),
            name: name.to_string(),
            department,
            credit,
            capacity,
            teacher_name: teacher.to_string(),
        })
    }

    /// Render a styled line for the modal form.
    pub(crate) fn build_line(&self, field_name: &str, field: CourseField) -> Line<'static> {
        let (value, is_active) = match field {
            CourseField::Id => (&self.id, self.active == CourseField::Id),
            CourseField::Name => (&self.name, self.active == CourseField::Name),
            CourseField::Department => (&self.department, self.active == CourseField::Department),
            CourseField::Credit => (&self.credit, self.active == CourseField::Credit),
            CourseField::Capacity => (&self.capacity, self.active == CourseField::Capacity),
            CourseField::Teacher => (&self.teacher, self.active == CourseField::Teacher),
        };
        form_line(field_name, value, is_active, "<required>")
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: CourseField) -> usize {
        match field {
            CourseField::Id => self.id.chars().count(),
            CourseField::Name => self.name.chars().count(),
            CourseField::Department => self.department.chars().count(),
            CourseField::Credit => self.credit.chars().count(),
            CourseField::Capacity => self.capacity.chars().count(),
            CourseField::Teacher => self.teacher.chars().count(),
        }
    }
}

/// Single-field form used to overwrite one student's score in a course.
#[derive(Clone)]
pub(crate) struct ScoreForm {
    pub(crate) student_id: StudentId,
    pub(crate) course_id: CourseId,
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl ScoreForm {
    pub(crate) fn new(student_id: StudentId, course_id: CourseId) -> Self {
        Self {
            student_id,
            course_id,
            value: String::new(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_ascii_digit() || (ch == '.' && !self.value.contains('.')) {
            self.value.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    pub(crate) fn parse_input(&self) -> Result<Score> {
        let raw = self.value.trim();
        if raw.is_empty() {
            return Err(anyhow!("Score is required."));
        }
        let score: Score = raw.parse().context("Score must be a number.")?;
        if !(0.0..=100.0).contains(&score) {
            return Err(anyhow!("Score must be between 0 and 100."));
        }
        Ok(score)
    }
}

/// Confirmation state for removing a student from the roster entirely.
#[derive(Clone)]
pub(crate) struct ConfirmStudentDelete {
    pub(crate) id: StudentId,
    pub(crate) name: String,
}

/// Confirmation state for deleting a course and all its enrollments.
#[derive(Clone)]
pub(crate) struct ConfirmCourseDelete {
    pub(crate) id: CourseId,
    pub(crate) name: String,
}

/// Confirmation state for wiping every recorded score in one course.
#[derive(Clone)]
pub(crate) struct ConfirmClearScores {
    pub(crate) id: CourseId,
    pub(crate) name: String,
}

/// Shared field renderer: label, value (or placeholder), focus highlight.
fn form_line(field_name: &str, value: &str, is_active: bool, placeholder: &str) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_form_round_trips_a_record() {
        let info = StudentInfo {
            id: 2015011100,
            name: "Ada".to_string(),
            is_male: false,
            department: 12,
        };
        let form = StudentForm::from_student(&info);
        assert_eq!(form.parse_inputs().unwrap(), info);
    }

    #[test]
    fn student_form_rejects_bad_department() {
        let mut form = StudentForm::from_student(&StudentInfo {
            id: 1,
            name: "Ada".to_string(),
            is_male: false,
            department: 0,
        });
        form.department = DEPARTMENTS.len().to_string();
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn course_form_rejects_zero_capacity() {
        let mut form = CourseForm::from_course(&CourseInfo {
            id: "C1".to_string(),
            name: "X".to_string(),
            department: 0,
            credit: 1,
            capacity: 10,
            teacher_name: "T".to_string(),
        });
        form.capacity = "0".to_string();
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn score_form_bounds_the_value() {
        let mut form = ScoreForm::new(1, "C1".to_string());
        assert!(form.push_char('9'));
        assert!(form.push_char('5'));
        assert!(form.push_char('.'));
        assert!(!form.push_char('.'));
        assert!(form.push_char('5'));
        assert_eq!(form.parse_input().unwrap(), 95.5);

        form.value = "120".to_string();
        assert!(form.parse_input().is_err());
        form.value.clear();
        assert!(form.parse_input().is_err());
    }
}
