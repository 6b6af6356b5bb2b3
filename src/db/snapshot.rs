//! Whole-roster save and load. A snapshot is rebuilt by replaying stored
//! records through the `Manager`'s own operations, so everything loaded has
//! passed the same validation as live input and the in-memory invariants
//! hold by construction.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::models::{CourseInfo, Score, StudentId, StudentInfo};
use crate::roster::Manager;

/// Rebuild a `Manager` from the database.
pub fn load_roster(conn: &Connection) -> Result<Manager> {
    let mut manager = Manager::new();

    let mut stmt = conn
        .prepare("SELECT id, name, is_male, department FROM students ORDER BY id")
        .context("failed to prepare student query")?;
    let students = stmt
        .query_map([], |row| {
            Ok(StudentInfo {
                id: row.get::<_, i64>(0)? as StudentId,
                name: row.get(1)?,
                is_male: row.get(2)?,
                department: row.get::<_, i64>(3)? as usize,
            })
        })
        .context("failed to load students")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect students")?;
    for info in students {
        let id = info.id;
        manager
            .add_student(info)
            .with_context(|| format!("stored student {id} could not be restored"))?;
    }

    let mut stmt = conn
        .prepare("SELECT id, name, department, credit, capacity, teacher FROM courses ORDER BY id")
        .context("failed to prepare course query")?;
    let courses = stmt
        .query_map([], |row| {
            Ok(CourseInfo {
                id: row.get(0)?,
                name: row.get(1)?,
                department: row.get::<_, i64>(2)? as usize,
                credit: row.get(3)?,
                capacity: row.get::<_, i64>(4)? as usize,
                teacher_name: row.get(5)?,
            })
        })
        .context("failed to load courses")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect courses")?;
    for info in courses {
        let id = info.id.clone();
        manager
            .add_course(info)
            .with_context(|| format!("stored course {id} could not be restored"))?;
    }

    let mut stmt = conn
        .prepare(
            "SELECT student_id, course_id, score FROM enrollments
             ORDER BY course_id, student_id",
        )
        .context("failed to prepare enrollment query")?;
    let enrollments = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)? as StudentId,
                row.get::<_, String>(1)?,
                row.get::<_, Option<Score>>(2)?,
            ))
        })
        .context("failed to load enrollments")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect enrollments")?;
    for (student_id, course_id, score) in enrollments {
        manager
            .enroll(student_id, &course_id)
            .with_context(|| format!("stored enrollment {student_id}/{course_id} is invalid"))?;
        if let Some(value) = score {
            manager
                .set_score(student_id, &course_id, value)
                .with_context(|| format!("stored score {student_id}/{course_id} is invalid"))?;
        }
    }

    Ok(manager)
}

/// Write the entire roster out, replacing whatever the database held. One
/// transaction, so a crash mid-save leaves the previous snapshot intact.
pub fn save_roster(conn: &mut Connection, manager: &Manager) -> Result<()> {
    let tx = conn.transaction().context("failed to begin save")?;

    // child table first so the foreign keys stay satisfied
    tx.execute("DELETE FROM enrollments", [])
        .context("failed to clear enrollments")?;
    tx.execute("DELETE FROM students", [])
        .context("failed to clear students")?;
    tx.execute("DELETE FROM courses", [])
        .context("failed to clear courses")?;

    for student in manager.students() {
        let info = student.info();
        tx.execute(
            "INSERT INTO students (id, name, is_male, department) VALUES (?1, ?2, ?3, ?4)",
            params![info.id as i64, info.name, info.is_male, info.department as i64],
        )
        .context("failed to insert student")?;
    }

    for course in manager.courses() {
        let info = course.info();
        tx.execute(
            "INSERT INTO courses (id, name, department, credit, capacity, teacher)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                info.id,
                info.name,
                info.department as i64,
                info.credit,
                info.capacity as i64,
                info.teacher_name
            ],
        )
        .context("failed to insert course")?;

        for entry in course.roster() {
            tx.execute(
                "INSERT INTO enrollments (student_id, course_id, score) VALUES (?1, ?2, ?3)",
                params![entry.student_id as i64, info.id, entry.score],
            )
            .context("failed to insert enrollment")?;
        }
    }

    tx.commit().context("failed to commit save")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn sample_manager() -> Manager {
        let mut m = Manager::new();
        m.add_student(StudentInfo {
            id: 2015011100,
            name: "Ada".to_string(),
            is_male: false,
            department: 12,
        })
        .unwrap();
        m.add_student(StudentInfo {
            id: 2015011101,
            name: "Brian".to_string(),
            is_male: true,
            department: 18,
        })
        .unwrap();
        m.add_course(CourseInfo {
            id: "2015F-40250".to_string(),
            name: "Data Structures".to_string(),
            department: 12,
            credit: 4,
            capacity: 100,
            teacher_name: "Deng".to_string(),
        })
        .unwrap();
        m.enroll(2015011100, "2015F-40250").unwrap();
        m.enroll(2015011101, "2015F-40250").unwrap();
        m.set_score(2015011100, "2015F-40250", 93.5).unwrap();
        m
    }

    #[test]
    fn save_then_load_round_trips_the_roster() {
        let mut conn = open_in_memory().unwrap();
        let original = sample_manager();
        save_roster(&mut conn, &original).unwrap();

        let restored = load_roster(&conn).unwrap();
        assert_eq!(restored.student_count(), 2);
        assert_eq!(restored.course_count(), 1);

        let ada = restored.student(2015011100).unwrap();
        assert_eq!(ada.info().name, "Ada");
        assert!(ada.is_taking(&"2015F-40250".to_string()));

        // recorded score survives; the missing one stays missing
        assert_eq!(restored.score(2015011100, "2015F-40250"), Some(93.5));
        assert_eq!(restored.score(2015011101, "2015F-40250"), None);

        let course = restored.course("2015F-40250").unwrap();
        assert_eq!(course.info().capacity, 100);
        assert_eq!(course.enrollment_count(), 2);
    }

    #[test]
    fn saving_replaces_the_previous_snapshot() {
        let mut conn = open_in_memory().unwrap();
        save_roster(&mut conn, &sample_manager()).unwrap();

        let mut smaller = sample_manager();
        smaller.remove_student(2015011101).unwrap();
        save_roster(&mut conn, &smaller).unwrap();

        let restored = load_roster(&conn).unwrap();
        assert_eq!(restored.student_count(), 1);
        assert!(!restored.course("2015F-40250").unwrap().is_enrolled(2015011101));
    }

    #[test]
    fn loading_an_empty_database_yields_an_empty_roster() {
        let conn = open_in_memory().unwrap();
        let manager = load_roster(&conn).unwrap();
        assert_eq!(manager.student_count(), 0);
        assert_eq!(manager.course_count(), 0);
    }
}
