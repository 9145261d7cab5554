use super::Group;
use crate::roster::{Gender, Knowledge, Roster, Student};
use serde::Serialize;
use strum_macros::{Display, EnumCount, EnumIter};

/// Classification of a group by gender and language-proficiency composition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount, Display, Serialize,
)]
pub enum Category {
    #[strum(to_string = "Mixed-Gender Group")]
    MixedGender,
    #[strum(to_string = "Good Knowledge (Boys)")]
    GoodBoys,
    #[strum(to_string = "Good Knowledge (Girls)")]
    GoodGirls,
    #[strum(to_string = "Not Good Knowledge (Boys)")]
    NotGoodBoys,
    #[strum(to_string = "Not Good Knowledge (Girls)")]
    NotGoodGirls,
    #[strum(to_string = "Mixed Knowledge (Boys)")]
    MixedBoys,
    #[strum(to_string = "Mixed Knowledge (Girls)")]
    MixedGirls,
}

impl Category {
    /// Dense index for per-category counter arrays.
    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The category alternation pairs this one with. Mixed-gender groups have none.
    pub fn opposite(self) -> Option<Category> {
        match self {
            Self::GoodBoys => Some(Self::NotGoodGirls),
            Self::NotGoodGirls => Some(Self::GoodBoys),
            Self::GoodGirls => Some(Self::NotGoodBoys),
            Self::NotGoodBoys => Some(Self::GoodGirls),
            Self::MixedBoys => Some(Self::MixedGirls),
            Self::MixedGirls => Some(Self::MixedBoys),
            Self::MixedGender => None,
        }
    }

    /// Classifies a set of students.
    ///
    /// More than one gender is always `MixedGender`. Otherwise the gender label
    /// is Boys when a boy is present (Girls for an empty set), and knowledge is
    /// Good/NotGood when every member agrees, Mixed otherwise.
    pub fn of_students<'a, I>(students: I) -> Category
    where
        I: IntoIterator<Item = &'a Student>,
    {
        let mut boys = false;
        let mut girls = false;
        let mut good = false;
        let mut not_good = false;

        for s in students {
            match s.gender {
                Gender::Boy => boys = true,
                Gender::Girl => girls = true,
            }
            match s.knowledge {
                Knowledge::Good => good = true,
                Knowledge::NotGood => not_good = true,
            }
        }

        if boys && girls {
            return Self::MixedGender;
        }

        match (boys, good, not_good) {
            (true, true, false) => Self::GoodBoys,
            (true, false, true) => Self::NotGoodBoys,
            (true, _, _) => Self::MixedBoys,
            (false, true, false) => Self::GoodGirls,
            (false, false, true) => Self::NotGoodGirls,
            (false, _, _) => Self::MixedGirls,
        }
    }
}

/// Category of the named members. Names missing from the roster are ignored.
pub fn get_group_characteristics<S: AsRef<str>>(roster: &Roster, members: &[S]) -> Category {
    Category::of_students(members.iter().filter_map(|m| roster.get(m.as_ref())))
}

pub fn get_opposite_category(category: Category) -> Option<Category> {
    category.opposite()
}

/// Buckets groups by category, buckets ordered by first appearance.
pub fn categorize_groups(roster: &Roster, groups: &[Group]) -> Vec<(Category, Vec<Group>)> {
    let mut buckets: Vec<(Category, Vec<Group>)> = Vec::new();
    for g in groups {
        let category = get_group_characteristics(roster, g.members());
        match buckets.iter_mut().find(|(c, _)| *c == category) {
            Some((_, list)) => list.push(g.clone()),
            None => buckets.push((category, vec![g.clone()])),
        }
    }
    buckets
}
