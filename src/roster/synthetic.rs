use super::{Gender, Knowledge, Roster, Student};
use crate::config::class_names;
use crate::error::CfResult;

/// Shape of a generated roster.
#[derive(Debug, Clone)]
pub struct SyntheticOptions {
    pub students: usize,
    pub num_classes: usize,
    pub column: String,
    pub class_prefix: String,
    /// Fraction of students already placed in `column`.
    pub placed_ratio: f32,
    /// Fraction of students that end up in a reciprocal pair.
    pub mutual_ratio: f32,
    /// Probability of an extra one-way friendship per student.
    pub one_way_ratio: f32,
    pub broken_ratio: f32,
    pub good_knowledge_ratio: f32,
}

impl Default for SyntheticOptions {
    fn default() -> Self {
        Self {
            students: 50,
            num_classes: 2,
            column: "STEP3_SCENARIO_1".to_string(),
            class_prefix: "A".to_string(),
            placed_ratio: 0.6,
            mutual_ratio: 0.5,
            one_way_ratio: 0.3,
            broken_ratio: 0.05,
            good_knowledge_ratio: 0.7,
        }
    }
}

fn student_name(i: usize) -> String {
    format!("S{:03}", i + 1)
}

/// Generates a roster with a mix of reciprocal pairs, one-way friendships and
/// students already placed round-robin into classes.
pub fn generate_roster(opts: &SyntheticOptions, rng: &mut fastrand::Rng) -> CfResult<Roster> {
    let n = opts.students;
    let classes = class_names(&opts.class_prefix, opts.num_classes.max(1));

    let mut students: Vec<Student> = (0..n)
        .map(|i| {
            let gender = if rng.bool() { Gender::Boy } else { Gender::Girl };
            let knowledge = if rng.f32() < opts.good_knowledge_ratio {
                Knowledge::Good
            } else {
                Knowledge::NotGood
            };
            Student::new(student_name(i), gender, knowledge)
                .with_broken_friendship(rng.f32() < opts.broken_ratio)
        })
        .collect();

    // Reciprocal pairs over a shuffled order
    let mut order: Vec<usize> = (0..n).collect();
    rng.shuffle(&mut order);
    let paired = ((n as f32 * opts.mutual_ratio) as usize / 2) * 2;
    for pair in order[..paired.min(n)].chunks_exact(2) {
        let (a, b) = (pair[0], pair[1]);
        let (name_a, name_b) = (students[a].name.clone(), students[b].name.clone());
        students[a].friends.push(name_b);
        students[b].friends.push(name_a);
    }

    if n > 1 {
        for i in 0..n {
            if rng.f32() < opts.one_way_ratio {
                let j = rng.usize(0..n);
                if j != i {
                    let target = students[j].name.clone();
                    if !students[i].has_friend(&target) {
                        students[i].friends.push(target);
                    }
                }
            }
        }
    }

    let mut placed_order: Vec<usize> = (0..n).collect();
    rng.shuffle(&mut placed_order);
    let placed = (n as f32 * opts.placed_ratio) as usize;
    for (k, &i) in placed_order[..placed.min(n)].iter().enumerate() {
        let class = &classes[k % classes.len()];
        students[i]
            .placements
            .insert(opts.column.clone(), class.clone());
    }

    Roster::with_columns(students, vec![opts.column.clone()])
}
