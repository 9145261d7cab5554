pub mod loader;
pub mod synthetic;

use crate::error::{CfResult, ClassForgeError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use strum_macros::{Display, EnumIter, EnumString};

pub use self::loader::{load_individuals, load_roster, load_roster_from_reader};

/// Prior-phase placements of students that were assigned as individuals
/// (name, class), in the order they were recorded.
pub type IndividualPlacements = Vec<(String, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize)]
#[strum(ascii_case_insensitive)]
pub enum Gender {
    #[strum(to_string = "B", serialize = "Α", serialize = "boy", serialize = "m")]
    Boy,
    #[strum(to_string = "G", serialize = "Κ", serialize = "girl", serialize = "f")]
    Girl,
}

/// Greek-language proficiency.
///
/// The Greek `Ν` (Nu, yes) and the Latin `N` (no) render alike. The loader
/// rejects a column that mixes Greek and Latin tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize)]
#[strum(ascii_case_insensitive)]
pub enum Knowledge {
    #[strum(to_string = "Y", serialize = "Ν", serialize = "yes", serialize = "good")]
    Good,
    #[strum(to_string = "N", serialize = "Ο", serialize = "no", serialize = "not_good")]
    NotGood,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub name: String,
    pub gender: Gender,
    pub knowledge: Knowledge,
    pub friends: Vec<String>,
    pub broken_friendship: bool,
    /// Placement column -> class. Absent means unplaced in that column.
    pub placements: BTreeMap<String, String>,
}

impl Student {
    pub fn new(name: impl Into<String>, gender: Gender, knowledge: Knowledge) -> Self {
        Self {
            name: name.into(),
            gender,
            knowledge,
            friends: Vec::new(),
            broken_friendship: false,
            placements: BTreeMap::new(),
        }
    }

    pub fn with_friends<S: AsRef<str>>(mut self, friends: &[S]) -> Self {
        self.friends = friends.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    pub fn placed(mut self, column: impl Into<String>, class: impl Into<String>) -> Self {
        self.placements.insert(column.into(), class.into());
        self
    }

    pub fn with_broken_friendship(mut self, broken: bool) -> Self {
        self.broken_friendship = broken;
        self
    }

    pub fn placement(&self, column: &str) -> Option<&str> {
        self.placements.get(column).map(String::as_str)
    }

    pub fn has_friend(&self, name: &str) -> bool {
        self.friends.iter().any(|f| f == name)
    }
}

/// The student table: ordered rows, unique names and a set of placement columns.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    students: Vec<Student>,
    index: HashMap<String, usize>,
    columns: Vec<String>,
}

impl Roster {
    /// Builds a roster whose placement columns are every column any student
    /// carries, in lexical order.
    pub fn new(students: Vec<Student>) -> CfResult<Self> {
        let columns: BTreeSet<String> = students
            .iter()
            .flat_map(|s| s.placements.keys().cloned())
            .collect();
        Self::with_columns(students, columns.into_iter().collect())
    }

    pub fn with_columns(students: Vec<Student>, columns: Vec<String>) -> CfResult<Self> {
        let mut index = HashMap::with_capacity(students.len());
        for (i, s) in students.iter().enumerate() {
            if s.name.trim().is_empty() {
                return Err(ClassForgeError::Validation(format!(
                    "Student at position {} has an empty name",
                    i + 1
                )));
            }
            if index.insert(s.name.clone(), i).is_some() {
                return Err(ClassForgeError::Validation(format!(
                    "Duplicate student name '{}'",
                    s.name
                )));
            }
        }

        let mut roster = Self {
            students,
            index,
            columns: Vec::new(),
        };
        for c in columns {
            roster.add_column(&c);
        }
        for s in &roster.students {
            for c in s.placements.keys() {
                if !roster.columns.contains(c) {
                    return Err(ClassForgeError::Validation(format!(
                        "Student '{}' is placed in undeclared column '{}'",
                        s.name, c
                    )));
                }
            }
        }
        Ok(roster)
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Student> {
        self.index.get(name).map(|&i| &self.students[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Registers a placement column. Existing columns are left untouched.
    pub fn add_column(&mut self, column: &str) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
    }

    pub fn placement(&self, name: &str, column: &str) -> Option<&str> {
        self.get(name).and_then(|s| s.placement(column))
    }

    /// Sets or clears a placement. Returns false for unknown students.
    pub fn set_placement(&mut self, name: &str, column: &str, class: Option<&str>) -> bool {
        let Some(&i) = self.index.get(name) else {
            return false;
        };
        self.add_column(column);
        let student = &mut self.students[i];
        match class {
            Some(c) => {
                student.placements.insert(column.to_string(), c.to_string());
            }
            None => {
                student.placements.remove(column);
            }
        }
        true
    }

    /// Students placed in `column`, in roster order.
    pub fn assigned<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Student> + 'a {
        self.students
            .iter()
            .filter(move |s| s.placement(column).is_some())
    }

    /// Students placed in `class` under `column`, in roster order.
    pub fn in_class<'a>(
        &'a self,
        column: &'a str,
        class: &'a str,
    ) -> impl Iterator<Item = &'a Student> + 'a {
        self.students
            .iter()
            .filter(move |s| s.placement(column) == Some(class))
    }
}
