//! Domain records shared by the roster core, the SQLite snapshot layer and
//! the TUI. These types stay light-weight data holders so the other layers
//! can focus on invariant enforcement, persistence and presentation. The
//! enrollment relationship itself lives in `roster`, not here.

use std::fmt;

/// Student identifiers are externally assigned (think university ID cards),
/// never generated by this program.
pub type StudentId = u64;
/// Course identifiers may contain letters (`2015F-40250`), so they are plain
/// strings rather than integers.
pub type CourseId = String;
/// A recorded score. "No score yet" is `Option::<Score>::None` everywhere;
/// there is deliberately no in-band sentinel value.
pub type Score = f32;

#[derive(Debug, Clone, PartialEq)]
/// Identity attributes of a student. The enrollment list is kept on
/// `roster::Student`, which wraps this record.
pub struct StudentInfo {
    /// Externally assigned, globally unique among students.
    pub id: StudentId,
    pub name: String,
    pub is_male: bool,
    /// Index into [`DEPARTMENTS`]. Validated by the forms before it gets
    /// anywhere near the core (the core only stores it).
    pub department: usize,
}

impl StudentInfo {
    /// Short gender label used by listings and the transcript header.
    pub fn gender_label(&self) -> &'static str {
        if self.is_male {
            "M"
        } else {
            "F"
        }
    }
}

impl fmt::Display for StudentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Identity attributes of a course. A repeated class in a different semester
/// gets a different `id`, so the ID doubles as the semester marker (see
/// [`CourseTerm`]).
pub struct CourseInfo {
    /// Globally unique among courses; may contain non-numeric characters.
    pub id: CourseId,
    pub name: String,
    /// Index into [`DEPARTMENTS`].
    pub department: usize,
    /// GPA weight of this course.
    pub credit: i32,
    /// Maximum simultaneous enrollment.
    pub capacity: usize,
    pub teacher_name: String,
}

impl fmt::Display for CourseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Process-wide department table. The core stores only indices into this
/// array; display code resolves them through [`department_name`] so an
/// out-of-range index can never walk past the end.
pub const DEPARTMENTS: &[&str] = &[
    "School of Architecture",
    "Department of Civil Engineering",
    "Department of Hydraulic Engineering",
    "School of Environment",
    "School of Mechanical Engineering",
    "Department of Precision Instruments",
    "Department of Thermal Engineering",
    "Department of Automotive Engineering",
    "Department of Industrial Engineering",
    "School of Information Science",
    "Department of Electrical Engineering",
    "Department of Electronic Engineering",
    "Department of Computer Science",
    "Department of Automation",
    "School of Aerospace",
    "Department of Engineering Physics",
    "Department of Chemical Engineering",
    "School of Materials Science",
    "Department of Mathematical Sciences",
    "Department of Physics",
    "Department of Chemistry",
    "School of Life Sciences",
    "School of Economics and Management",
    "School of Law",
    "School of Journalism",
    "Department of Chinese Language",
    "Department of Foreign Languages",
    "School of Medicine",
    "School of Software",
];

/// Bounds-checked lookup into [`DEPARTMENTS`].
pub fn department_name(index: usize) -> Option<&'static str> {
    DEPARTMENTS.get(index).copied()
}

/// Render an optional score for display. An unrecorded score shows as `*`, a
/// recorded one with a single decimal.
pub fn format_score(score: Option<Score>) -> String {
    match score {
        Some(value) => format!("{value:.1}"),
        None => "*".to_string(),
    }
}

/// Term a course ran in, recovered from its ID purely for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseTerm {
    pub year: i32,
    pub season: Season,
    /// Course sequence number within the term.
    pub sequence: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }
}

impl CourseTerm {
    /// Split an ID shaped like `2015F-40250` (year, season letter, dash,
    /// sequence) into its parts. Any other shape yields `None`; course IDs
    /// are not required to follow this convention, it is cosmetic only.
    pub fn parse(course_id: &str) -> Option<CourseTerm> {
        let (term, sequence) = course_id.split_once('-')?;
        let season_char = term.chars().last()?;
        let year_str = &term[..term.len() - season_char.len_utf8()];

        let season = match season_char {
            'S' => Season::Spring,
            'U' => Season::Summer,
            'F' => Season::Fall,
            _ => return None,
        };
        let year = year_str.parse().ok()?;
        let sequence = sequence.parse().ok()?;

        Some(CourseTerm {
            year,
            season,
            sequence,
        })
    }
}

impl fmt::Display for CourseTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.season.label(), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_lookup_is_bounds_checked() {
        assert_eq!(department_name(0), Some("School of Architecture"));
        assert_eq!(department_name(DEPARTMENTS.len()), None);
        assert_eq!(department_name(usize::MAX), None);
    }

    #[test]
    fn course_term_parses_well_formed_ids() {
        let term = CourseTerm::parse("2015F-40250").unwrap();
        assert_eq!(term.year, 2015);
        assert_eq!(term.season, Season::Fall);
        assert_eq!(term.sequence, 40250);
        assert_eq!(term.to_string(), "Fall 2015");
    }

    #[test]
    fn course_term_rejects_other_shapes() {
        assert_eq!(CourseTerm::parse("CS101"), None);
        assert_eq!(CourseTerm::parse("2015X-1"), None);
        assert_eq!(CourseTerm::parse("F-1"), None);
        assert_eq!(CourseTerm::parse("2015F-abc"), None);
        assert_eq!(CourseTerm::parse(""), None);
    }

    #[test]
    fn unscored_renders_as_placeholder() {
        assert_eq!(format_score(None), "*");
        assert_eq!(format_score(Some(89.5)), "89.5");
    }
}
