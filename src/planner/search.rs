//! Search over resource orders
//!
//! FFD is sensitive to the order in which resource dimensions break ties.
//! The search runs it once with the dimensions sorted by criticality (total
//! demand / per-server capacity, highest first) and then with a seeded
//! sample of random orders, keeping the plan with the fewest servers.

use super::{first_fit_decreasing, Instance, Plan, ResourceKind, Resources, Strategy};
use tracing::debug;

/// Total demand / capacity per dimension, in canonical order
pub fn criticality(instances: &[Instance], capacity: &Resources) -> Vec<(ResourceKind, f64)> {
    let mut demand = Resources::default();
    for instance in instances {
        demand.add(&instance.demand);
    }
    ResourceKind::ALL
        .iter()
        .map(|&k| (k, demand.get(k) / capacity.get(k)))
        .collect()
}

/// Dimensions sorted by criticality, highest first; ties keep canonical order.
pub fn criticality_order(instances: &[Instance], capacity: &Resources) -> Vec<ResourceKind> {
    let mut scored = criticality(instances, capacity);
    scored.sort_by(|(_, a), (_, b)| b.total_cmp(a));
    scored.into_iter().map(|(k, _)| k).collect()
}

/// Every ordering of the five dimensions (120 of them)
pub fn all_orders() -> Vec<Vec<ResourceKind>> {
    fn permute(rest: &[ResourceKind], prefix: &mut Vec<ResourceKind>, out: &mut Vec<Vec<ResourceKind>>) {
        if rest.is_empty() {
            out.push(prefix.clone());
            return;
        }
        for i in 0..rest.len() {
            let mut remaining = rest.to_vec();
            let next = remaining.remove(i);
            prefix.push(next);
            permute(&remaining, prefix, out);
            prefix.pop();
        }
    }

    let mut out = Vec::new();
    permute(&ResourceKind::ALL, &mut Vec::new(), &mut out);
    out
}

/// Criticality order first, then up to `samples` distinct random orders.
pub fn candidate_orders(
    instances: &[Instance],
    capacity: &Resources,
    seed: u64,
    samples: usize,
) -> Vec<Vec<ResourceKind>> {
    let mut random = all_orders();
    let mut rng = fastrand::Rng::with_seed(seed);
    rng.shuffle(&mut random);
    random.truncate(samples);

    let mut orders = Vec::with_capacity(random.len() + 1);
    orders.push(criticality_order(instances, capacity));
    orders.extend(random);
    orders
}

/// True when `candidate` should replace `best`.
fn is_better(candidate: &Plan, best: &Plan) -> bool {
    match candidate.server_count().cmp(&best.server_count()) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        // Same server count means the same total spare capacity, so prefer
        // the plan whose fullest server has the most headroom
        std::cmp::Ordering::Equal => candidate.peak_utilization() < best.peak_utilization(),
    }
}

/// Run FFD for every candidate order and keep the best plan.
///
/// Inputs are assumed validated (see `planner::plan`).
pub fn best_plan(instances: &[Instance], capacity: &Resources, seed: u64, samples: usize) -> Plan {
    let orders = candidate_orders(instances, capacity, seed, samples);
    debug!(candidates = orders.len(), seed, "searching resource orders");

    let mut best: Option<Plan> = None;
    for order in orders {
        let candidate = Plan {
            capacity: *capacity,
            servers: first_fit_decreasing(instances, capacity, &order),
            strategy: Strategy::Search,
            seed,
            order,
        };
        let replace = match &best {
            None => true,
            Some(current) => is_better(&candidate, current),
        };
        if replace {
            debug!(
                servers = candidate.server_count(),
                order = ?candidate.order,
                "new best plan"
            );
            best = Some(candidate);
        }
    }

    // candidate_orders always yields the criticality order
    best.unwrap_or_else(|| Plan {
        capacity: *capacity,
        servers: Vec::new(),
        strategy: Strategy::Search,
        seed,
        order: ResourceKind::ALL.to_vec(),
    })
}
