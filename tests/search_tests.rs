use classforge::config::{BalanceLimits, Config};
use classforge::grouping::{Category, Group};
use classforge::placement::existing::ExistingGroups;
use classforge::placement::ideal::IdealDistribution;
use classforge::placement::{
    accept, build_plan, penalty, preferred_classes, rank_results, solve, solve_columns,
    ClassCounts, NoopObserver, Placement, ScenarioResult, SearchObserver, TracingObserver,
};
use classforge::roster::{Gender, Knowledge, Roster, Student};
use classforge::ClassForgeError;
use strum::EnumCount;

const COLUMN: &str = "STEP3_SCENARIO_1";

/// Two placed students in A1 and two unplaced mutual pairs.
fn scenario_roster() -> Roster {
    Roster::with_columns(
        vec![
            Student::new("P1", Gender::Boy, Knowledge::Good).placed(COLUMN, "A1"),
            Student::new("P2", Gender::Girl, Knowledge::NotGood).placed(COLUMN, "A1"),
            Student::new("B1", Gender::Boy, Knowledge::Good).with_friends(&["B2"]),
            Student::new("B2", Gender::Boy, Knowledge::Good).with_friends(&["B1"]),
            Student::new("G1", Gender::Girl, Knowledge::NotGood).with_friends(&["G2"]),
            Student::new("G2", Gender::Girl, Knowledge::NotGood).with_friends(&["G1"]),
        ],
        vec![COLUMN.to_string()],
    )
    .unwrap()
}

fn boys() -> Group {
    Group::pair("B1", "B2")
}

fn girls() -> Group {
    Group::pair("G1", "G2")
}

#[derive(Default)]
struct Recorder {
    plans: usize,
    results: Vec<usize>,
    complete: Option<(usize, usize, bool)>,
}

impl SearchObserver for Recorder {
    fn on_plan(&mut self, _column: &str, _ideal: &IdealDistribution, _existing: &ExistingGroups) {
        self.plans += 1;
    }

    fn on_result(&mut self, penalty: usize, _accepted_so_far: usize) {
        self.results.push(penalty);
    }

    fn on_complete(&mut self, nodes: usize, accepted: usize, budget_exhausted: bool) {
        self.complete = Some((nodes, accepted, budget_exhausted));
    }
}

// --- PLAN ---

#[test]
fn test_plan_for_small_roster() {
    let plan = build_plan(&scenario_roster(), COLUMN, &Config::default(), None);

    assert_eq!(plan.classes, vec!["A1", "A2"]);
    assert_eq!(plan.groups, vec![boys(), girls()]);
    assert!(plan.preserved_pairs.is_empty());
    assert_eq!(plan.existing.for_class("A1", Category::GoodBoys), 1);
    assert_eq!(plan.existing.for_class("A1", Category::NotGoodGirls), 1);
    assert_eq!(plan.ideal.get(&Category::GoodBoys), Some(&1));
    assert_eq!(plan.ideal.get(&Category::NotGoodGirls), Some(&1));
    assert_eq!(plan.items.len(), 2);
    assert_eq!(plan.items[0].group, boys());
    assert_eq!(
        plan.base,
        vec![
            ClassCounts {
                total: 2,
                good: 1,
                boys: 1,
                girls: 1
            },
            ClassCounts::default()
        ]
    );
}

#[test]
fn test_high_need_categories_are_placed_first() {
    let mut students = vec![
        Student::new("B1", Gender::Boy, Knowledge::Good).with_friends(&["B2"]),
        Student::new("B2", Gender::Boy, Knowledge::Good).with_friends(&["B1"]),
        Student::new("M1", Gender::Boy, Knowledge::NotGood).with_friends(&["M2"]),
        Student::new("M2", Gender::Girl, Knowledge::Good).with_friends(&["M1"]),
    ];
    // A1 already holds a good-boys singleton, so that category has no need left
    students.push(Student::new("P1", Gender::Boy, Knowledge::Good).placed(COLUMN, "A1"));
    let roster = Roster::with_columns(students, vec![COLUMN.to_string()]).unwrap();

    let plan = build_plan(&roster, COLUMN, &Config::default(), None);
    assert_eq!(plan.items[0].category, Category::MixedGender);
    assert_eq!(plan.items[1].category, Category::GoodBoys);
}

// --- SEARCH ---

#[test]
fn test_scenario_ranks_two_accepted_placements() {
    let roster = scenario_roster();
    let solution = solve(&roster, COLUMN, &Config::default(), None, &mut NoopObserver);

    assert_eq!(solution.results.len(), 2);
    assert!(!solution.budget_exhausted);

    let best = solution.best().unwrap();
    assert_eq!(best.penalty, 1);
    assert_eq!(best.placement.class_of_group(&boys()), Some("A2"));
    assert_eq!(best.placement.class_of_group(&girls()), Some("A2"));
    assert_eq!(best.placement.class_of_student("G1"), Some("A2"));
    assert_eq!(best.counts[0].total, 2);
    assert_eq!(best.counts[1].total, 4);

    let second = &solution.results[1];
    assert_eq!(second.penalty, 3);
    assert_eq!(second.placement.class_of_group(&boys()), Some("A2"));
    assert_eq!(second.placement.class_of_group(&girls()), Some("A1"));
}

#[test]
fn test_max_results_one_stops_after_first_acceptance() {
    let roster = scenario_roster();
    let mut config = Config::default();
    config.search.max_results = 1;

    let mut recorder = Recorder::default();
    let solution = solve(&roster, COLUMN, &config, None, &mut recorder);

    assert_eq!(solution.results.len(), 1);
    assert_eq!(recorder.results, vec![1]);
    // root, second item, first leaf
    assert_eq!(solution.nodes, 3);
    assert_eq!(recorder.complete, Some((3, 1, false)));
    assert_eq!(recorder.plans, 1);
}

#[test]
fn test_exhaustive_explores_pruned_branches() {
    let roster = scenario_roster();
    let mut config = Config::default();
    config.search.exhaustive = true;

    let solution = solve(&roster, COLUMN, &config, None, &mut NoopObserver);
    let penalties: Vec<usize> = solution.results.iter().map(|r| r.penalty).collect();
    assert_eq!(penalties, vec![1, 3, 4]);

    let bounded = solve(&roster, COLUMN, &Config::default(), None, &mut NoopObserver);
    assert!(solution.nodes > bounded.nodes);
}

#[test]
fn test_exhaustive_ignores_node_budget() {
    let roster = scenario_roster();
    let mut config = Config::default();
    config.search.exhaustive = true;
    config.search.max_nodes = Some(1);

    let solution = solve(&roster, COLUMN, &config, None, &mut NoopObserver);
    assert!(!solution.budget_exhausted);
    assert_eq!(solution.results.len(), 3);
}

#[test]
fn test_node_budget_stops_search() {
    let roster = scenario_roster();
    let mut config = Config::default();
    config.search.max_nodes = Some(2);

    let mut recorder = Recorder::default();
    let solution = solve(&roster, COLUMN, &config, None, &mut recorder);

    assert!(solution.budget_exhausted);
    assert!(solution.results.is_empty());
    assert_eq!(recorder.complete, Some((3, 0, true)));
}

#[test]
fn test_zero_node_budget_means_unbounded() {
    let roster = scenario_roster();
    let mut config = Config::default();
    config.search.max_nodes = Some(0);

    let solution = solve(&roster, COLUMN, &config, None, &mut NoopObserver);
    assert!(!solution.budget_exhausted);
    assert_eq!(solution.results.len(), 2);
}

#[test]
fn test_infeasible_limits_yield_no_results() {
    let roster = scenario_roster();
    let mut config = Config::default();
    config.limits.max_population_diff = 0;

    let solution = solve(&roster, COLUMN, &config, None, &mut NoopObserver);
    assert!(solution.results.is_empty());
    assert!(!solution.budget_exhausted);
}

#[test]
fn test_no_pairs_yields_empty_results() {
    let roster = Roster::with_columns(
        vec![
            Student::new("a", Gender::Boy, Knowledge::Good).with_friends(&["b"]),
            Student::new("b", Gender::Girl, Knowledge::Good),
        ],
        vec![COLUMN.to_string()],
    )
    .unwrap();
    let mut recorder = Recorder::default();
    let solution = solve(&roster, COLUMN, &Config::default(), None, &mut recorder);

    assert!(solution.results.is_empty());
    assert_eq!(solution.nodes, 0);
    assert!(recorder.complete.is_none());
}

#[test]
fn test_results_satisfy_limits_and_penalty() {
    let roster = scenario_roster();
    let mut config = Config::default();
    config.search.exhaustive = true;
    let limits = BalanceLimits::default();

    let solution = solve(&roster, COLUMN, &config, None, &mut NoopObserver);
    for r in &solution.results {
        assert!(accept(&r.counts, &limits));
        assert_eq!(penalty(&r.counts, &limits), r.penalty);
        assert_eq!(r.placement.len(), solution.plan.items.len());
        let placed: usize = r.counts.iter().map(|c| c.total).sum();
        assert_eq!(placed, roster.len());
    }
    assert!(solution
        .results
        .windows(2)
        .all(|w| w[0].penalty <= w[1].penalty));
}

#[test]
fn test_search_is_deterministic() {
    let roster = scenario_roster();
    let mut config = Config::default();
    config.search.exhaustive = true;

    let a = solve(&roster, COLUMN, &config, None, &mut NoopObserver);
    let b = solve(&roster, COLUMN, &config, None, &mut NoopObserver);
    assert_eq!(a.results, b.results);
    assert_eq!(a.nodes, b.nodes);
}

#[test]
fn test_explicit_class_count() {
    let roster = scenario_roster();
    let mut config = Config::default();
    config.search.num_classes = Some(3);
    config.search.class_prefix = "C".to_string();

    let plan = build_plan(&roster, COLUMN, &config, None);
    assert_eq!(plan.classes, vec!["C1", "C2", "C3"]);
    // nobody sits in a "C" class yet
    assert!(plan.base.iter().all(|c| c.total == 0));
}

// --- PREFERENCE ORDER ---

fn loads(totals: &[usize]) -> Vec<ClassCounts> {
    totals
        .iter()
        .map(|&total| ClassCounts {
            total,
            ..Default::default()
        })
        .collect()
}

#[test]
fn test_preferred_classes_tiers() {
    let classes: Vec<String> = (1..=4).map(|i| format!("A{}", i)).collect();
    let existing = ExistingGroups::empty(&classes);
    let ideal: IdealDistribution = [(Category::GoodBoys, 1)].into();

    let mut placed = vec![[0usize; Category::COUNT]; 4];
    placed[0][Category::GoodBoys.index()] = 1;
    placed[3][Category::GoodBoys.index()] = 1;
    let last = vec![
        Some(Category::GoodBoys),
        None,
        None,
        Some(Category::NotGoodGirls),
    ];

    // load order is [0, 3, 2, 1]; 1 and 2 are below quota, 3 alternates
    let order = preferred_classes(
        Category::GoodBoys,
        &loads(&[0, 5, 3, 1]),
        &existing,
        &placed,
        &last,
        &ideal,
    );
    assert_eq!(order, vec![2, 1, 3, 0]);
}

#[test]
fn test_mixed_gender_never_alternates() {
    let classes: Vec<String> = (1..=4).map(|i| format!("A{}", i)).collect();
    let existing = ExistingGroups::empty(&classes);
    let ideal: IdealDistribution = [(Category::MixedGender, 1)].into();

    let mut placed = vec![[0usize; Category::COUNT]; 4];
    placed[0][Category::MixedGender.index()] = 1;
    placed[3][Category::MixedGender.index()] = 1;
    let last = vec![
        Some(Category::GoodBoys),
        None,
        None,
        Some(Category::NotGoodGirls),
    ];

    let order = preferred_classes(
        Category::MixedGender,
        &loads(&[0, 5, 3, 1]),
        &existing,
        &placed,
        &last,
        &ideal,
    );
    assert_eq!(order, vec![2, 1, 0, 3]);
}

#[test]
fn test_preferred_falls_back_to_load_order() {
    let classes: Vec<String> = (1..=3).map(|i| format!("A{}", i)).collect();
    let existing = ExistingGroups::empty(&classes);
    let ideal: IdealDistribution = [(Category::MixedBoys, 0)].into();
    let placed = vec![[0usize; Category::COUNT]; 3];
    let last: Vec<Option<Category>> = vec![None; 3];

    let mut counts = loads(&[4, 4, 2]);
    counts[0].good = 3;
    counts[1].good = 1;
    let order = preferred_classes(
        Category::MixedBoys,
        &counts,
        &existing,
        &placed,
        &last,
        &ideal,
    );
    assert_eq!(order, vec![2, 1, 0]);
}

// --- RANKING & BATCH ---

#[test]
fn test_rank_results_is_stable() {
    let mk = |class: &str, penalty: usize| ScenarioResult {
        placement: Placement::new(vec![(boys(), class.to_string())]),
        penalty,
        counts: Vec::new(),
    };
    let ranked = rank_results(vec![mk("A1", 2), mk("A2", 0), mk("A3", 2), mk("A4", 0)], 3);
    let classes: Vec<&str> = ranked
        .iter()
        .map(|r| r.placement.assignments()[0].1.as_str())
        .collect();
    assert_eq!(classes, vec!["A2", "A4", "A1"]);
}

#[test]
fn test_solve_columns_in_parallel() {
    let mut roster = scenario_roster();
    roster.add_column("OTHER");
    roster.set_placement("B1", "OTHER", Some("A1"));

    let columns = vec![COLUMN.to_string(), "OTHER".to_string()];
    let solutions = solve_columns(&roster, &columns, &Config::default(), None).unwrap();

    assert_eq!(solutions.len(), 2);
    assert_eq!(solutions[0].plan.column, COLUMN);
    assert_eq!(solutions[0].results.len(), 2);
    assert_eq!(solutions[1].plan.column, "OTHER");
    assert_eq!(solutions[1].plan.groups, vec![girls()]);
}

#[test]
fn test_solve_columns_rejects_unknown_column() {
    let roster = scenario_roster();
    let columns = vec!["MISSING".to_string()];
    let err = solve_columns(&roster, &columns, &Config::default(), None).unwrap_err();
    assert!(matches!(err, ClassForgeError::Config(_)));
}

/// Twenty students already in the Greek class `Α1` plus one unplaced pair.
fn greek_class_roster() -> Roster {
    let mut students: Vec<Student> = (0..20)
        .map(|i| {
            let gender = if i % 2 == 0 { Gender::Boy } else { Gender::Girl };
            Student::new(format!("S{}", i), gender, Knowledge::Good).placed(COLUMN, "Α1")
        })
        .collect();
    students.push(Student::new("X", Gender::Boy, Knowledge::Good).with_friends(&["Y"]));
    students.push(Student::new("Y", Gender::Boy, Knowledge::Good).with_friends(&["X"]));
    Roster::with_columns(students, vec![COLUMN.to_string()]).unwrap()
}

#[test]
fn test_plan_reports_placements_outside_its_classes() {
    let plan = build_plan(&greek_class_roster(), COLUMN, &Config::default(), None);
    assert_eq!(plan.classes, vec!["A1", "A2"]);
    assert_eq!(plan.unknown_classes.get("Α1"), Some(&20));
    assert!(plan.base.iter().all(|c| c.total == 0));
}

#[test]
fn test_solve_columns_rejects_class_prefix_mismatch() {
    let roster = greek_class_roster();
    let columns = vec![COLUMN.to_string()];
    match solve_columns(&roster, &columns, &Config::default(), None) {
        Err(ClassForgeError::Config(msg)) => {
            assert!(msg.contains("'Α1' (20)"), "{}", msg);
            assert!(msg.contains("--class-prefix"), "{}", msg);
        }
        other => panic!("expected config error, got {:?}", other.map(|s| s.len())),
    }
}

#[test]
fn test_matching_class_prefix_counts_prior_placements() {
    let roster = greek_class_roster();
    let mut config = Config::default();
    config.search.class_prefix = "Α".to_string();

    let columns = vec![COLUMN.to_string()];
    let solutions = solve_columns(&roster, &columns, &config, None).unwrap();
    let plan = &solutions[0].plan;
    assert_eq!(plan.classes, vec!["Α1", "Α2"]);
    assert!(plan.unknown_classes.is_empty());
    assert_eq!(plan.base[0].total, 20);
    assert_eq!(plan.base[1].total, 0);

    // 22 vs 0 or 20 vs 2 both break the population spread
    assert!(solutions[0].results.is_empty());
}

#[test]
fn test_tracing_observer_matches_noop() {
    let roster = scenario_roster();
    let config = Config::default();
    let quiet = solve(&roster, COLUMN, &config, None, &mut NoopObserver);
    let traced = solve(&roster, COLUMN, &config, None, &mut TracingObserver::default());
    assert_eq!(quiet.results, traced.results);
    assert_eq!(quiet.nodes, traced.nodes);
}
