use std::collections::HashMap;

use jarlift_core::DeployError;

/// One student-class pairing from the query output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub name: String,
    pub age: String,
    pub class_name: String,
    pub grade: String,
}

impl ReportRow {
    pub fn student_label(&self) -> String {
        format!("{} ({})", self.name, self.age)
    }
}

/// Grades pivoted to one row per student and one column per class.
///
/// Rows and columns keep first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportTable {
    students: Vec<String>,
    classes: Vec<String>,
    cells: HashMap<(usize, usize), String>,
}

impl ReportTable {
    pub const INDEX_HEADER: &'static str = "Student";

    /// Fails when the same student appears twice for one class.
    pub fn pivot(rows: &[ReportRow]) -> Result<Self, DeployError> {
        let mut table = Self::default();
        let mut student_index: HashMap<String, usize> = HashMap::new();
        let mut class_index: HashMap<String, usize> = HashMap::new();

        for (position, row) in rows.iter().enumerate() {
            let student = row.student_label();
            let row_idx = *student_index.entry(student.clone()).or_insert_with(|| {
                table.students.push(student.clone());
                table.students.len() - 1
            });
            let col_idx = *class_index
                .entry(row.class_name.clone())
                .or_insert_with(|| {
                    table.classes.push(row.class_name.clone());
                    table.classes.len() - 1
                });

            if table
                .cells
                .insert((row_idx, col_idx), row.grade.clone())
                .is_some()
            {
                return Err(DeployError::Parse {
                    line: position + 1,
                    reason: format!(
                        "duplicate grade for '{student}' in class '{}'",
                        row.class_name
                    ),
                });
            }
        }

        Ok(table)
    }

    pub fn row_labels(&self) -> &[String] {
        &self.students
    }

    pub fn column_labels(&self) -> &[String] {
        &self.classes
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn cell(&self, student: &str, class_name: &str) -> Option<&str> {
        let row = self.students.iter().position(|label| label == student)?;
        let col = self.classes.iter().position(|label| label == class_name)?;
        self.cell_at(row, col)
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(&(row, col)).map(String::as_str)
    }

    pub fn render(&self) -> String {
        crate::render_grid(self)
    }
}
