use super::existing::ExistingGroups;
use super::ideal::IdealDistribution;
use crate::grouping::{Category, Group};
use tracing::{debug, info, Level};

/// Receives diagnostics from a solve. Every hook defaults to a no-op.
pub trait SearchObserver {
    fn on_plan(&mut self, _column: &str, _ideal: &IdealDistribution, _existing: &ExistingGroups) {}

    fn on_preferred_order(
        &mut self,
        _group: &Group,
        _category: Category,
        _order: &[usize],
        _classes: &[String],
    ) {
    }

    fn on_result(&mut self, _penalty: usize, _accepted_so_far: usize) {}

    fn on_complete(&mut self, _nodes: usize, _accepted: usize, _budget_exhausted: bool) {}
}

pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Forwards search diagnostics to `tracing`.
#[derive(Default)]
pub struct TracingObserver {
    column: String,
}

impl SearchObserver for TracingObserver {
    fn on_plan(&mut self, column: &str, ideal: &IdealDistribution, existing: &ExistingGroups) {
        self.column = column.to_string();
        let ideal_str = ideal
            .iter()
            .map(|(c, n)| format!("{}={}", c, n))
            .collect::<Vec<_>>()
            .join(", ");
        info!("[{}] Ideal distribution per category: {}", column, ideal_str);
        for (class, counts) in existing.breakdown() {
            debug!("[{}] Existing groups in {}: {:?}", column, class, counts);
        }
    }

    fn on_preferred_order(
        &mut self,
        group: &Group,
        category: Category,
        order: &[usize],
        classes: &[String],
    ) {
        if !tracing::enabled!(Level::DEBUG) {
            return;
        }
        let names: Vec<&str> = order.iter().take(3).map(|&c| classes[c].as_str()).collect();
        debug!(
            "[{}] Group {} ({}) -> preferred order: {:?}",
            self.column, group, category, names
        );
    }

    fn on_result(&mut self, penalty: usize, accepted_so_far: usize) {
        debug!(
            "[{}] Accepted assignment #{} (penalty {})",
            self.column, accepted_so_far, penalty
        );
    }

    fn on_complete(&mut self, nodes: usize, accepted: usize, budget_exhausted: bool) {
        if budget_exhausted {
            info!(
                "[{}] Node budget reached after {} nodes; {} assignment(s) accepted",
                self.column, nodes, accepted
            );
        } else {
            info!(
                "[{}] Search finished: {} nodes, {} assignment(s) accepted",
                self.column, nodes, accepted
            );
        }
    }
}
