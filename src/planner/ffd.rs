//! First-Fit-Decreasing with anti-affinity

use super::{Instance, ResourceKind, Resources, Server};
use std::cmp::Ordering;

/// Order used by the simple strategy
pub const SIMPLE_ORDER: [ResourceKind; 3] =
    [ResourceKind::Cpu, ResourceKind::Network, ResourceKind::Memory];

/// Demand of `instance` in each dimension of `order`, normalised by capacity.
fn sort_key(instance: &Instance, capacity: &Resources, order: &[ResourceKind]) -> Vec<f64> {
    order
        .iter()
        .map(|&k| instance.demand.get(k) / capacity.get(k))
        .collect()
}

fn compare_keys(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Pack `instances` onto as few servers as first-fit finds.
///
/// Instances are sorted descending by their normalised demand tuple in
/// `order` (stable, so equal keys keep input order) and each one goes to the
/// first open server that can host it; otherwise a new server is opened.
pub fn first_fit_decreasing(
    instances: &[Instance],
    capacity: &Resources,
    order: &[ResourceKind],
) -> Vec<Server> {
    let mut keyed: Vec<(Vec<f64>, &Instance)> = instances
        .iter()
        .map(|i| (sort_key(i, capacity, order), i))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_keys(b, a));

    let mut servers: Vec<Server> = Vec::new();
    for (_, instance) in keyed {
        match servers.iter_mut().find(|s| s.can_host(instance, capacity)) {
            Some(server) => server.place(instance),
            None => {
                let index = servers.len() + 1;
                servers.push(Server::open(index, instance));
            }
        }
    }
    servers
}
