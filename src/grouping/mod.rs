pub mod category;

use crate::roster::{Roster, Student};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub use self::category::{
    categorize_groups, get_group_characteristics, get_opposite_category, Category,
};

/// A fully mutual friendship group of unplaced students.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    members: Vec<String>,
}

impl Group {
    pub fn pair(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            members: vec![a.into(), b.into()],
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.members.join(" + "))
    }
}

/// True only if every member lists every other member as a friend.
///
/// Fails closed: fewer than two members, or any member missing from the
/// roster, yields false.
pub fn is_fully_mutual<S: AsRef<str>>(roster: &Roster, group: &[S]) -> bool {
    if group.len() < 2 {
        return false;
    }

    let mut resolved: Vec<&Student> = Vec::with_capacity(group.len());
    for name in group {
        match roster.get(name.as_ref()) {
            Some(s) => resolved.push(s),
            None => return false,
        }
    }

    resolved.iter().all(|a| {
        group
            .iter()
            .map(|b| b.as_ref())
            .filter(|b| *b != a.name)
            .all(|b| a.has_friend(b))
    })
}

/// Greedy first-fit discovery of disjoint mutual pairs among students
/// unplaced in `column`.
///
/// Students with a broken friendship, no friends, or no friend inside the
/// eligible pool never enter the enumeration. Once a name is consumed by an
/// accepted pair it is not reconsidered.
pub fn create_fully_mutual_groups(roster: &Roster, column: &str) -> Vec<Group> {
    let eligible: Vec<&Student> = roster
        .students()
        .iter()
        .filter(|s| s.placement(column).is_none() && !s.friends.is_empty())
        .filter(|s| !s.broken_friendship)
        .collect();

    if eligible.is_empty() {
        return Vec::new();
    }

    let pool: HashSet<&str> = eligible.iter().map(|s| s.name.as_str()).collect();
    let names: Vec<&str> = eligible
        .iter()
        .filter(|s| s.friends.iter().any(|f| pool.contains(f.as_str())))
        .map(|s| s.name.as_str())
        .collect();

    let mut used: HashSet<&str> = HashSet::new();
    let mut groups = Vec::new();

    for (i, &a) in names.iter().enumerate() {
        for &b in &names[i + 1..] {
            if used.contains(a) || used.contains(b) {
                continue;
            }
            if is_fully_mutual(roster, &[a, b]) {
                used.insert(a);
                used.insert(b);
                groups.push(Group::pair(a, b));
            }
        }
    }

    groups
}
