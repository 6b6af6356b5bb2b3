use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::db::save_roster;
use crate::models::{format_score, CourseTerm, StudentId};
use crate::roster::{Course, Manager, Student};
use crate::transcript::generate_transcript;

use super::forms::{
    ConfirmClearScores, ConfirmCourseDelete, ConfirmStudentDelete, CourseField, CourseForm,
    ScoreForm, StudentField, StudentForm,
};
use super::helpers::{centered_rect, department_label, fixed_width, surface_error};
use super::screens::{CourseDetailScreen, EnrollPicker, TranscriptScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// High-level navigation states. Keeping this explicit makes it easy to reason
/// about which rendering path runs and what keyboard shortcuts should do.
enum Screen {
    Students,
    Courses,
    Transcript(TranscriptScreen),
    CourseDetail(CourseDetailScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    AddingStudent(StudentForm),
    EditingStudent {
        id: StudentId,
        form: StudentForm,
    },
    ConfirmStudentDelete(ConfirmStudentDelete),
    AddingCourse(CourseForm),
    EditingCourse {
        id: String,
        form: CourseForm,
    },
    ConfirmCourseDelete(ConfirmCourseDelete),
    ConfirmClearScores(ConfirmClearScores),
    EditingScore(ScoreForm),
    PickingEnrollee(EnrollPicker),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    roster: Manager,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    selected_student: usize,
    selected_course: usize,
}

impl App {
    pub fn new(conn: Connection, roster: Manager) -> Self {
        Self {
            conn,
            roster,
            screen: Screen::Students,
            mode: Mode::Normal,
            status: None,
            selected_student: 0,
            selected_course: 0,
        }
    }

    /// Persist the roster; called on exit and on Ctrl-S.
    pub fn save(&mut self) -> Result<()> {
        save_roster(&mut self.conn, &self.roster)
    }

    pub(crate) fn handle_ctrl_s(&mut self) {
        match self.save() {
            Ok(()) => self.set_status("Roster saved.", StatusKind::Info),
            Err(err) => {
                let message = surface_error(&err);
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingStudent(form) => self.handle_add_student(code, form)?,
            Mode::EditingStudent { id, form } => self.handle_edit_student(code, id, form)?,
            Mode::ConfirmStudentDelete(confirm) => {
                self.handle_confirm_student_delete(code, confirm)?
            }
            Mode::AddingCourse(form) => self.handle_add_course(code, form)?,
            Mode::EditingCourse { id, form } => self.handle_edit_course(code, id, form)?,
            Mode::ConfirmCourseDelete(confirm) => {
                self.handle_confirm_course_delete(code, confirm)?
            }
            Mode::ConfirmClearScores(confirm) => self.handle_confirm_clear_scores(code, confirm)?,
            Mode::EditingScore(form) => self.handle_edit_score(code, form)?,
            Mode::PickingEnrollee(picker) => self.handle_pick_enrollee(code, picker)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Students => {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        *exit = true;
                    }
                    KeyCode::Up => self.move_student_selection(-1),
                    KeyCode::Down => self.move_student_selection(1),
                    KeyCode::PageUp => self.move_student_selection(-5),
                    KeyCode::PageDown => self.move_student_selection(5),
                    KeyCode::Home => self.selected_student = 0,
                    KeyCode::End => {
                        self.selected_student = self.roster.student_count().saturating_sub(1);
                    }
                    KeyCode::Tab | KeyCode::BackTab => {
                        self.clear_status();
                        self.screen = Screen::Courses;
                    }
                    KeyCode::Enter => {
                        if let Some(id) = self.current_student().map(|student| student.info().id) {
                            if let Some(transcript) = generate_transcript(&self.roster, id) {
                                self.clear_status();
                                self.screen = Screen::Transcript(TranscriptScreen::new(transcript));
                            }
                        } else {
                            self.set_status("No student selected.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('+') => {
                        self.clear_status();
                        return Ok(Mode::AddingStudent(StudentForm::default()));
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') => {
                        if let Some(info) = self.current_student().map(|s| s.info().clone()) {
                            self.clear_status();
                            return Ok(Mode::EditingStudent {
                                id: info.id,
                                form: StudentForm::from_student(&info),
                            });
                        } else {
                            self.set_status("No student selected to edit.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('-') => {
                        if let Some(info) = self.current_student().map(|s| s.info().clone()) {
                            self.clear_status();
                            return Ok(Mode::ConfirmStudentDelete(ConfirmStudentDelete {
                                id: info.id,
                                name: info.name,
                            }));
                        } else {
                            self.set_status("No student selected to remove.", StatusKind::Error);
                        }
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Courses => {
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc | KeyCode::Tab | KeyCode::BackTab => {
                        self.clear_status();
                        self.screen = Screen::Students;
                    }
                    KeyCode::Up => self.move_course_selection(-1),
                    KeyCode::Down => self.move_course_selection(1),
                    KeyCode::PageUp => self.move_course_selection(-5),
                    KeyCode::PageDown => self.move_course_selection(5),
                    KeyCode::Home => self.selected_course = 0,
                    KeyCode::End => {
                        self.selected_course = self.roster.course_count().saturating_sub(1);
                    }
                    KeyCode::Enter => {
                        if let Some(id) = self.current_course().map(|c| c.info().id.clone()) {
                            self.clear_status();
                            self.screen = Screen::CourseDetail(CourseDetailScreen::new(id));
                        } else {
                            self.set_status("No course selected.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('+') => {
                        self.clear_status();
                        return Ok(Mode::AddingCourse(CourseForm::default()));
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') => {
                        if let Some(info) = self.current_course().map(|c| c.info().clone()) {
                            self.clear_status();
                            return Ok(Mode::EditingCourse {
                                id: info.id.clone(),
                                form: CourseForm::from_course(&info),
                            });
                        } else {
                            self.set_status("No course selected to edit.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('-') => {
                        if let Some(info) = self.current_course().map(|c| c.info().clone()) {
                            self.clear_status();
                            return Ok(Mode::ConfirmCourseDelete(ConfirmCourseDelete {
                                id: info.id,
                                name: info.name,
                            }));
                        } else {
                            self.set_status("No course selected to delete.", StatusKind::Error);
                        }
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Transcript(ref mut view) => {
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc => {
                        self.clear_status();
                        self.screen = Screen::Students;
                    }
                    KeyCode::Up => view.scroll_by(-1),
                    KeyCode::Down => view.scroll_by(1),
                    KeyCode::PageUp => view.scroll_by(-10),
                    KeyCode::PageDown => view.scroll_by(10),
                    KeyCode::Home => view.scroll = 0,
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::CourseDetail(ref mut detail) => {
                let course_id = detail.course_id.clone();
                let mut status_to_set: Option<(String, StatusKind)> = None;
                let mut back_to_courses = false;
                let mut withdraw_target: Option<StudentId> = None;

                {
                    let detail = &mut *detail;
                    let roster_len = self
                        .roster
                        .course(&course_id)
                        .map(|course| course.enrollment_count())
                        .unwrap_or(0);
                    let selected_entry = self
                        .roster
                        .course(&course_id)
                        .and_then(|course| course.roster().get(detail.selected))
                        .map(|entry| entry.student_id);

                    match code {
                        KeyCode::Char('q') => {
                            *exit = true;
                        }
                        KeyCode::Esc => {
                            back_to_courses = true;
                        }
                        KeyCode::Up => detail.move_selection(-1, roster_len),
                        KeyCode::Down => detail.move_selection(1, roster_len),
                        KeyCode::PageUp => detail.move_selection(-5, roster_len),
                        KeyCode::PageDown => detail.move_selection(5, roster_len),
                        KeyCode::Char('+') => {
                            let Some(course) = self.roster.course(&course_id) else {
                                return Ok(Mode::Normal);
                            };
                            if course.enrollment_count() >= course.info().capacity {
                                status_to_set = Some((
                                    format!("Course {course_id} is full."),
                                    StatusKind::Error,
                                ));
                            } else {
                                let candidates: Vec<(StudentId, String)> = self
                                    .roster
                                    .students()
                                    .filter(|student| !student.is_taking(&course_id))
                                    .map(|student| {
                                        let info = student.info();
                                        (info.id, format!("{}  {}", info.id, info.name))
                                    })
                                    .collect();
                                return Ok(Mode::PickingEnrollee(EnrollPicker::new(
                                    course_id.clone(),
                                    candidates,
                                )));
                            }
                        }
                        KeyCode::Char('-') => {
                            if selected_entry.is_some() {
                                withdraw_target = selected_entry;
                            } else {
                                status_to_set = Some((
                                    "No enrolled student selected.".to_string(),
                                    StatusKind::Error,
                                ));
                            }
                        }
                        KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char('S') => {
                            if let Some(student_id) = selected_entry {
                                return Ok(Mode::EditingScore(ScoreForm::new(
                                    student_id,
                                    course_id.clone(),
                                )));
                            } else {
                                status_to_set = Some((
                                    "No enrolled student selected.".to_string(),
                                    StatusKind::Error,
                                ));
                            }
                        }
                        KeyCode::Char('c') | KeyCode::Char('C') => {
                            if let Some(course) = self.roster.course(&course_id) {
                                return Ok(Mode::ConfirmClearScores(ConfirmClearScores {
                                    id: course.info().id.clone(),
                                    name: course.info().name.clone(),
                                }));
                            }
                        }
                        _ => {}
                    }
                }

                if back_to_courses {
                    self.clear_status();
                    self.screen = Screen::Courses;
                } else if let Some(student_id) = withdraw_target {
                    match self.roster.withdraw(student_id, &course_id) {
                        Ok(()) => self.set_status(
                            format!("Withdrew student {student_id} from {course_id}."),
                            StatusKind::Info,
                        ),
                        Err(err) => self.set_status(err.to_string(), StatusKind::Error),
                    }
                    let len = self
                        .roster
                        .course(&course_id)
                        .map(|course| course.enrollment_count())
                        .unwrap_or(0);
                    if let Screen::CourseDetail(detail) = &mut self.screen {
                        detail.ensure_in_bounds(len);
                    }
                } else if let Some((text, kind)) = status_to_set {
                    self.set_status(text, kind);
                }

                Ok(Mode::Normal)
            }
        }
    }

    fn handle_add_student(&mut self, code: KeyCode, mut form: StudentForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add student cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_student(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingStudent(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_edit_student(
        &mut self,
        code: KeyCode,
        id: StudentId,
        mut form: StudentForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_student(id, &form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingStudent { id, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_student_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmStudentDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.roster.remove_student(confirm.id) {
                    Ok(()) => {
                        self.clamp_student_selection();
                        self.set_status(
                            format!("Removed student {} ({}).", confirm.id, confirm.name),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.set_status(err.to_string(), StatusKind::Error);
                        Ok(Mode::ConfirmStudentDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmStudentDelete(confirm)),
        }
    }

    fn handle_add_course(&mut self, code: KeyCode, mut form: CourseForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add course cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_course(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingCourse(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_edit_course(
        &mut self,
        code: KeyCode,
        id: String,
        mut form: CourseForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_course(&id, &form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingCourse { id, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_course_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmCourseDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.roster.remove_course(&confirm.id) {
                    Ok(()) => {
                        self.clamp_course_selection();
                        self.set_status(
                            format!("Deleted course {} ({}).", confirm.id, confirm.name),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.set_status(err.to_string(), StatusKind::Error);
                        Ok(Mode::ConfirmCourseDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmCourseDelete(confirm)),
        }
    }

    fn handle_confirm_clear_scores(
        &mut self,
        code: KeyCode,
        confirm: ConfirmClearScores,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Clearing cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.roster.clear_final_scores(&confirm.id);
                self.set_status(
                    format!("Cleared every score in {}.", confirm.id),
                    StatusKind::Info,
                );
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmClearScores(confirm)),
        }
    }

    fn handle_edit_score(&mut self, code: KeyCode, mut form: ScoreForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Score entry cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_input() {
                Ok(score) => {
                    match self.roster.set_score(form.student_id, &form.course_id, score) {
                        Ok(()) => {
                            self.set_status(
                                format!(
                                    "Recorded {:.1} for student {}.",
                                    score, form.student_id
                                ),
                                StatusKind::Info,
                            );
                            keep_open = false;
                        }
                        Err(err) => {
                            let message = err.to_string();
                            form.error = Some(message.clone());
                            self.set_status(message, StatusKind::Error);
                        }
                    }
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingScore(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_pick_enrollee(&mut self, code: KeyCode, mut picker: EnrollPicker) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Enrollment cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Up => {
                picker.move_selection(-1);
                Ok(Mode::PickingEnrollee(picker))
            }
            KeyCode::Down => {
                picker.move_selection(1);
                Ok(Mode::PickingEnrollee(picker))
            }
            KeyCode::PageUp => {
                picker.move_selection(-5);
                Ok(Mode::PickingEnrollee(picker))
            }
            KeyCode::PageDown => {
                picker.move_selection(5);
                Ok(Mode::PickingEnrollee(picker))
            }
            KeyCode::Enter => {
                let Some(student_id) = picker.current() else {
                    self.set_status("No students left to enroll.", StatusKind::Error);
                    return Ok(Mode::Normal);
                };
                match self.roster.enroll(student_id, &picker.course_id) {
                    Ok(()) => {
                        self.set_status(
                            format!("Enrolled student {} in {}.", student_id, picker.course_id),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.set_status(err.to_string(), StatusKind::Error);
                        Ok(Mode::PickingEnrollee(picker))
                    }
                }
            }
            _ => Ok(Mode::PickingEnrollee(picker)),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Students => self.draw_students(frame, content_area),
            Screen::Courses => self.draw_courses(frame, content_area),
            Screen::Transcript(view) => self.draw_transcript(frame, content_area, view),
            Screen::CourseDetail(detail) => self.draw_course_detail(frame, content_area, detail),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingStudent(form) => self.draw_student_form(frame, area, "Add Student", form),
            Mode::EditingStudent { form, .. } => {
                self.draw_student_form(frame, area, "Edit Student", form)
            }
            Mode::ConfirmStudentDelete(confirm) => self.draw_confirm_student(frame, area, confirm),
            Mode::AddingCourse(form) => self.draw_course_form(frame, area, "Add Course", form),
            Mode::EditingCourse { form, .. } => {
                self.draw_course_form(frame, area, "Edit Course", form)
            }
            Mode::ConfirmCourseDelete(confirm) => self.draw_confirm_course(frame, area, confirm),
            Mode::ConfirmClearScores(confirm) => self.draw_confirm_clear(frame, area, confirm),
            Mode::EditingScore(form) => self.draw_score_form(frame, area, form),
            Mode::PickingEnrollee(picker) => self.draw_enroll_picker(frame, area, picker),
            Mode::Normal => {}
        }
    }

    fn draw_students(&self, frame: &mut Frame, area: Rect) {
        let count = self.roster.student_count();
        if count == 0 {
            let message = Paragraph::new("No students yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Students"));
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .roster
            .students()
            .map(|student| {
                let info = student.info();
                let text = format!(
                    "{} {} {}  {}  {} courses",
                    fixed_width(&info.id.to_string(), 12),
                    fixed_width(&info.name, 20),
                    info.gender_label(),
                    fixed_width(&department_label(info.department), 34),
                    student.courses_taken().len(),
                );
                ListItem::new(text)
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Students ({count})")),
            )
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected_student.min(count - 1)));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_courses(&self, frame: &mut Frame, area: Rect) {
        let count = self.roster.course_count();
        if count == 0 {
            let message = Paragraph::new("No courses yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Courses"));
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .roster
            .courses()
            .map(|course| {
                let info = course.info();
                let text = format!(
                    "{} {} {}  {} cr  {:>3}/{:<3}  {}",
                    fixed_width(&info.id, 14),
                    fixed_width(&info.name, 26),
                    fixed_width(&info.teacher_name, 16),
                    info.credit,
                    course.enrollment_count(),
                    info.capacity,
                    department_label(info.department),
                );
                ListItem::new(text)
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Courses ({count})")),
            )
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected_course.min(count - 1)));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_transcript(&self, frame: &mut Frame, area: Rect, view: &TranscriptScreen) {
        let transcript = &view.transcript;
        let student = &transcript.student;

        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    student.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  {}  {}", student.id, student.gender_label())),
            ]),
            Line::from(department_label(student.department)),
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    "{} {} {} {} {} {} {} {}",
                    fixed_width("Course", 14),
                    fixed_width("Name", 22),
                    fixed_width("Term", 12),
                    fixed_width("Credit", 6),
                    fixed_width("Score", 6),
                    fixed_width("Rank", 5),
                    fixed_width("Min", 6),
                    fixed_width("Max", 6),
                ),
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];

        for entry in &transcript.entries {
            let term = CourseTerm::parse(&entry.course.id)
                .map(|term| term.to_string())
                .unwrap_or_default();
            let rank = if entry.rank == 0 {
                "-".to_string()
            } else {
                format!("{}/{}", entry.rank, entry.enrolled)
            };
            lines.push(Line::from(format!(
                "{} {} {} {} {} {} {} {}",
                fixed_width(&entry.course.id, 14),
                fixed_width(&entry.course.name, 22),
                fixed_width(&term, 12),
                fixed_width(&entry.course.credit.to_string(), 6),
                fixed_width(&format_score(entry.score), 6),
                fixed_width(&rank, 5),
                fixed_width(&format_score(entry.min_score), 6),
                fixed_width(&format_score(entry.max_score), 6),
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw(format!("Credits earned: {}   ", transcript.total_credit)),
            Span::styled(
                format!("GPA: {}", format_score(transcript.gpa)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Transcript"))
            .scroll((view.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_course_detail(&self, frame: &mut Frame, area: Rect, detail: &CourseDetailScreen) {
        let Some(course) = self.roster.course(&detail.course_id) else {
            let message = Paragraph::new("Course no longer exists.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, area);
            return;
        };
        let info = course.info();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(1)])
            .split(area);

        let term = CourseTerm::parse(&info.id)
            .map(|term| format!("  {term}"))
            .unwrap_or_default();
        let header = Paragraph::new(vec![
            Line::from(vec![
                Span::styled(
                    info.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  {}{}", info.id, term)),
            ]),
            Line::from(format!(
                "{}  {} credits  taught by {}",
                department_label(info.department),
                info.credit,
                info.teacher_name,
            )),
        ])
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).title("Course"));
        frame.render_widget(header, chunks[0]);

        if course.roster().is_empty() {
            let message = Paragraph::new("No students enrolled. Press '+' to enroll one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = course
            .roster()
            .iter()
            .map(|entry| {
                let name = self
                    .roster
                    .student(entry.student_id)
                    .map(|student| student.info().name.clone())
                    .unwrap_or_default();
                let text = format!(
                    "{} {} {}",
                    fixed_width(&entry.student_id.to_string(), 12),
                    fixed_width(&name, 24),
                    format_score(entry.score),
                );
                ListItem::new(text)
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Enrolled ({}/{})",
                course.enrollment_count(),
                info.capacity
            )))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(detail.selected.min(course.roster().len() - 1)));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::PickingEnrollee(_)) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Enroll   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (Screen::Transcript(_), _) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Scroll   "),
                Span::styled("[PgUp/PgDn]", key_style),
                Span::raw(" Page   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Back   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::CourseDetail(_), _) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[+]", key_style),
                Span::raw(" Enroll   "),
                Span::styled("[-]", key_style),
                Span::raw(" Withdraw   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Score   "),
                Span::styled("[c]", key_style),
                Span::raw(" Clear Scores   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Back   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::Courses, _) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Open   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Students   "),
                Span::styled("[+]", key_style),
                Span::raw(" Add   "),
                Span::styled("[-]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[e]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[Ctrl-S]", key_style),
                Span::raw(" Save   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            _ => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Transcript   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Courses   "),
                Span::styled("[+]", key_style),
                Span::raw(" Add   "),
                Span::styled("[-]", key_style),
                Span::raw(" Remove   "),
                Span::styled("[e]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[Ctrl-S]", key_style),
                Span::raw(" Save   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_student_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &StudentForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("ID", StudentField::Id),
            form.build_line("Name", StudentField::Name),
            form.build_line("Gender", StudentField::Gender),
            form.build_line("Department", StudentField::Department),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            StudentField::Id => ("ID: ", 0),
            StudentField::Name => ("Name: ", 1),
            StudentField::Gender => ("Gender: ", 2),
            StudentField::Department => ("Department: ", 3),
        };
        let cursor_x = inner.x + prefix.len() as u16 + form.value_len(form.active) as u16;
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_course_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &CourseForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("ID", CourseField::Id),
            form.build_line("Name", CourseField::Name),
            form.build_line("Department", CourseField::Department),
            form.build_line("Credit", CourseField::Credit),
            form.build_line("Capacity", CourseField::Capacity),
            form.build_line("Teacher", CourseField::Teacher),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            CourseField::Id => ("ID: ", 0),
            CourseField::Name => ("Name: ", 1),
            CourseField::Department => ("Department: ", 2),
            CourseField::Credit => ("Credit: ", 3),
            CourseField::Capacity => ("Capacity: ", 4),
            CourseField::Teacher => ("Teacher: ", 5),
        };
        let cursor_x = inner.x + prefix.len() as u16 + form.value_len(form.active) as u16;
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_score_form(&self, frame: &mut Frame, area: Rect, form: &ScoreForm) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Record Score").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let display = if form.value.is_empty() {
            "<0-100>".to_string()
        } else {
            form.value.clone()
        };
        let value_style = if form.value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Yellow)
        };

        let mut lines = vec![
            Line::from(format!(
                "Student {} in {}",
                form.student_id, form.course_id
            )),
            Line::from(vec![Span::raw("Score: "), Span::styled(display, value_style)]),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let cursor_x = inner.x + "Score: ".len() as u16 + form.value.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y + 1));
    }

    fn draw_confirm_student(
        &self,
        frame: &mut Frame,
        area: Rect,
        confirm: &ConfirmStudentDelete,
    ) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Remove student {} ({})?", confirm.id, confirm.name)),
            Line::from("They will be withdrawn from every course."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_course(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmCourseDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete course {} ({})?", confirm.id, confirm.name)),
            Line::from("All enrollments and scores will be dropped."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_clear(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmClearScores) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Clearing")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Clear every score in {} ({})?",
                confirm.id, confirm.name
            )),
            Line::from("Enrollment is kept; only the scores are wiped."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_enroll_picker(&self, frame: &mut Frame, area: Rect, picker: &EnrollPicker) {
        let popup_area = centered_rect(60, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Enroll in {}", picker.course_id))
            .borders(Borders::ALL);

        if picker.candidates.is_empty() {
            let message = Paragraph::new("Every student is already enrolled.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, popup_area);
            return;
        }

        let items: Vec<ListItem> = picker
            .candidates
            .iter()
            .map(|(_, line)| ListItem::new(line.clone()))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(picker.selected));
        frame.render_stateful_widget(list, popup_area, &mut state);
    }

    fn current_student(&self) -> Option<&Student> {
        self.roster.students().nth(self.selected_student)
    }

    fn current_course(&self) -> Option<&Course> {
        self.roster.courses().nth(self.selected_course)
    }

    fn move_student_selection(&mut self, offset: isize) {
        let len = self.roster.student_count();
        if len == 0 {
            self.selected_student = 0;
            return;
        }
        let next = self.selected_student as isize + offset;
        self.selected_student = next.clamp(0, len as isize - 1) as usize;
    }

    fn move_course_selection(&mut self, offset: isize) {
        let len = self.roster.course_count();
        if len == 0 {
            self.selected_course = 0;
            return;
        }
        let next = self.selected_course as isize + offset;
        self.selected_course = next.clamp(0, len as isize - 1) as usize;
    }

    fn clamp_student_selection(&mut self) {
        let len = self.roster.student_count();
        if len == 0 {
            self.selected_student = 0;
        } else if self.selected_student >= len {
            self.selected_student = len - 1;
        }
    }

    fn clamp_course_selection(&mut self) {
        let len = self.roster.course_count();
        if len == 0 {
            self.selected_course = 0;
        } else if self.selected_course >= len {
            self.selected_course = len - 1;
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn save_new_student(&mut self, form: &StudentForm) -> Result<()> {
        let info = form.parse_inputs()?;
        let id = info.id;
        self.roster.add_student(info)?;
        self.selected_student = self
            .roster
            .students()
            .position(|student| student.info().id == id)
            .unwrap_or(0);
        self.set_status(format!("Added student {id}."), StatusKind::Info);
        Ok(())
    }

    fn save_existing_student(&mut self, id: StudentId, form: &StudentForm) -> Result<()> {
        let info = form.parse_inputs()?;
        let new_id = info.id;
        self.roster.update_student(id, info)?;
        self.selected_student = self
            .roster
            .students()
            .position(|student| student.info().id == new_id)
            .unwrap_or(0);
        self.set_status(format!("Updated student {new_id}."), StatusKind::Info);
        Ok(())
    }

    fn save_new_course(&mut self, form: &CourseForm) -> Result<()> {
        let info = form.parse_inputs()?;
        let id = info.id.clone();
        self.roster.add_course(info)?;
        self.selected_course = self
            .roster
            .courses()
            .position(|course| course.info().id == id)
            .unwrap_or(0);
        self.set_status(format!("Added course {id}."), StatusKind::Info);
        Ok(())
    }

    fn save_existing_course(&mut self, id: &str, form: &CourseForm) -> Result<()> {
        let info = form.parse_inputs()?;
        let new_id = info.id.clone();
        self.roster.update_course(id, info)?;
        self.selected_course = self
            .roster
            .courses()
            .position(|course| course.info().id == new_id)
            .unwrap_or(0);
        // a detail view open on the old ID would dangle after a rename
        if let Screen::CourseDetail(detail) = &mut self.screen {
            if detail.course_id == id {
                detail.course_id = new_id.clone();
            }
        }
        self.set_status(format!("Updated course {new_id}."), StatusKind::Info);
        Ok(())
    }
}
