use classforge::grouping::Category;
use classforge::placement::ideal::ideal_for;
use classforge::placement::{ClassCounts, SearchPlan, Solution, Spreads};
use classforge::scenario::ScenarioSummary;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::collections::BTreeSet;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn right_align(table: &mut Table, from: usize, to: usize) {
    for i in from..=to {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_plan_summary(solution: &Solution) {
    let plan = &solution.plan;
    println!(
        "\n📊 Column '{}': {} classes, {} mutual pair(s), {} preserved pair(s), {} nodes{}",
        plan.column,
        plan.classes.len(),
        plan.groups.len(),
        plan.preserved_pairs.len(),
        solution.nodes,
        if solution.budget_exhausted {
            " (budget reached)"
        } else {
            ""
        }
    );
    print_ideal_table(plan);
}

pub fn print_ideal_table(plan: &SearchPlan) {
    if plan.ideal.is_empty() {
        return;
    }
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Category").add_attribute(Attribute::Bold),
        Cell::new("Existing"),
        Cell::new("New"),
        Cell::new("Ideal / Class").fg(Color::Cyan),
    ]);

    for (category, ideal) in &plan.ideal {
        let new_groups = plan.items.iter().filter(|i| i.category == *category).count();
        table.add_row(vec![
            Cell::new(category.to_string()),
            Cell::new(plan.existing.total(*category)),
            Cell::new(new_groups),
            Cell::new(ideal),
        ]);
    }
    right_align(&mut table, 1, 3);
    println!("{}", table);
}

pub fn print_scenario_table(solution: &Solution) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Rank").add_attribute(Attribute::Bold),
        Cell::new("Penalty").fg(Color::Cyan),
        Cell::new("Pop Δ"),
        Cell::new("Good Δ"),
        Cell::new("Boys Δ"),
        Cell::new("Girls Δ"),
        Cell::new("Pairs"),
    ]);

    for (rank, r) in solution.results.iter().enumerate() {
        let s = Spreads::of(&r.counts);
        let penalty_cell = if r.penalty == 0 {
            Cell::new(r.penalty).fg(Color::Green)
        } else {
            Cell::new(r.penalty)
        };
        table.add_row(vec![
            Cell::new(rank + 1),
            penalty_cell,
            Cell::new(s.population),
            Cell::new(s.good),
            Cell::new(s.boys),
            Cell::new(s.girls),
            Cell::new(r.placement.len()),
        ]);
    }
    right_align(&mut table, 0, 6);
    println!("{}", table);

    if let Some(best) = solution.best() {
        let mut placements = new_table();
        placements.set_header(vec![
            Cell::new("Pair").add_attribute(Attribute::Bold),
            Cell::new("Class").fg(Color::Cyan),
        ]);
        for (group, class) in best.placement.assignments() {
            placements.add_row(vec![Cell::new(group.to_string()), Cell::new(class)]);
        }
        println!("Best scenario placements:\n{}", placements);
    }
}

pub fn print_class_counts(classes: &[String], counts: &[ClassCounts]) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Class").add_attribute(Attribute::Bold),
        Cell::new("Total"),
        Cell::new("Good"),
        Cell::new("Boys"),
        Cell::new("Girls"),
    ]);
    for (class, c) in classes.iter().zip(counts) {
        table.add_row(vec![
            Cell::new(class),
            Cell::new(c.total),
            Cell::new(c.good),
            Cell::new(c.boys),
            Cell::new(c.girls),
        ]);
    }
    right_align(&mut table, 1, 4);
    println!("{}", table);
}

pub fn print_materialized(summaries: &[ScenarioSummary]) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Column").add_attribute(Attribute::Bold),
        Cell::new("Penalty"),
        Cell::new("Placed"),
        Cell::new("Unplaced").fg(Color::Red),
    ]);
    for s in summaries {
        table.add_row(vec![
            Cell::new(&s.column),
            Cell::new(s.penalty),
            Cell::new(s.assigned),
            Cell::new(s.unassigned),
        ]);
    }
    right_align(&mut table, 1, 3);
    println!("{}", table);
}

pub fn print_pairs_table(plan: &SearchPlan) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Pair"),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Need"),
    ]);
    for (i, item) in plan.items.iter().enumerate() {
        let ideal = ideal_for(&plan.ideal, item.category);
        let need = ideal.saturating_sub(plan.existing.total(item.category));
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(item.group.to_string()),
            Cell::new(item.category.to_string()),
            Cell::new(need),
        ]);
    }
    println!("Mutual pairs (search order):\n{}", table);
}

pub fn print_preserved_pairs(plan: &SearchPlan) {
    if plan.preserved_pairs.is_empty() {
        println!("No preserved pairs among placed students.");
        return;
    }
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Class").add_attribute(Attribute::Bold),
        Cell::new("Pair"),
    ]);
    for p in &plan.preserved_pairs {
        table.add_row(vec![
            Cell::new(&p.class),
            Cell::new(format!("{} + {}", p.first, p.second)),
        ]);
    }
    println!("Preserved pairs:\n{}", table);
}

pub fn print_existing_table(plan: &SearchPlan) {
    let breakdown = plan.existing.breakdown();
    let categories: BTreeSet<Category> = breakdown
        .iter()
        .flat_map(|(_, m)| m.keys().copied())
        .collect();
    if categories.is_empty() {
        println!("No groups placed by earlier phases.");
        return;
    }

    let mut header = vec![Cell::new("Category").add_attribute(Attribute::Bold)];
    header.extend(plan.classes.iter().map(Cell::new));
    let mut table = new_table();
    table.set_header(header);

    for category in &categories {
        let mut row = vec![Cell::new(category.to_string())];
        row.extend(
            breakdown
                .iter()
                .map(|(_, m)| Cell::new(m.get(category).copied().unwrap_or(0))),
        );
        table.add_row(row);
    }
    right_align(&mut table, 1, plan.classes.len());
    println!("Existing groups per class:\n{}", table);
}
