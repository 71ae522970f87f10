//! Capacity planning: pack service replicas onto identical servers
//!
//! Every service replica becomes an `Instance` with a demand in five
//! dimensions. Instances are packed First-Fit-Decreasing onto servers of a
//! fixed effective capacity, with anti-affinity: a server never hosts two
//! replicas of the same service. The number of servers in the resulting
//! `Plan` is what gets priced.

pub mod ffd;
pub mod search;
pub mod workload;

pub use ffd::first_fit_decreasing;
pub use search::{best_plan, candidate_orders, criticality};
pub use workload::{expand_instances, load_instances, read_services, ServiceSpec};

use crate::error::{FleetError, Result};
use crate::pricing::{ResourceDescriptor, ResourceMap};
use crate::validation::{validate_capacity, MAX_VOLUME_SIZE_GB};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Resource dimensions, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Cpu,
    Memory,
    Network,
    DiskIo,
    Storage,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Cpu,
        ResourceKind::Memory,
        ResourceKind::Network,
        ResourceKind::DiskIo,
        ResourceKind::Storage,
    ];

    pub fn unit(self) -> &'static str {
        match self {
            ResourceKind::Cpu => "cores",
            ResourceKind::Memory => "GB",
            ResourceKind::Network => "Mbps",
            ResourceKind::DiskIo => "MB/s",
            ResourceKind::Storage => "GB",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Cpu => "cpu",
            ResourceKind::Memory => "memory",
            ResourceKind::Network => "network",
            ResourceKind::DiskIo => "disk_io",
            ResourceKind::Storage => "storage",
        };
        f.write_str(name)
    }
}

/// An amount of every resource dimension: a demand, a usage, or a capacity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Resources {
    /// Cores
    pub cpu: f64,
    /// GB
    pub memory: f64,
    /// Mbps
    pub network: f64,
    /// MB/s
    pub disk_io: f64,
    /// GB
    pub storage: f64,
}

impl Resources {
    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Cpu => self.cpu,
            ResourceKind::Memory => self.memory,
            ResourceKind::Network => self.network,
            ResourceKind::DiskIo => self.disk_io,
            ResourceKind::Storage => self.storage,
        }
    }

    pub fn add(&mut self, other: &Resources) {
        self.cpu += other.cpu;
        self.memory += other.memory;
        self.network += other.network;
        self.disk_io += other.disk_io;
        self.storage += other.storage;
    }

    /// True when `self + extra` stays within `capacity` in every dimension
    pub fn fits_with(&self, extra: &Resources, capacity: &Resources) -> bool {
        ResourceKind::ALL
            .iter()
            .all(|&k| self.get(k) + extra.get(k) <= capacity.get(k))
    }

    /// Check that every dimension is usable as a server capacity
    pub fn validate_capacity(&self) -> Result<()> {
        for kind in ResourceKind::ALL {
            validate_capacity(&format!("capacity.{}", kind), self.get(kind))?;
        }
        Ok(())
    }
}

/// One replica of a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub service: String,
    pub demand: Resources,
}

/// A server and what has been placed on it
#[derive(Debug, Clone)]
pub struct Server {
    pub name: String,
    pub used: Resources,
    pub services: BTreeSet<String>,
    pub instances: Vec<Instance>,
}

impl Server {
    /// Open a server named `S<index>` holding `first`.
    pub fn open(index: usize, first: &Instance) -> Self {
        let mut server = Self {
            name: format!("S{}", index),
            used: Resources::default(),
            services: BTreeSet::new(),
            instances: Vec::new(),
        };
        server.place(first);
        server
    }

    /// Anti-affinity plus capacity check
    pub fn can_host(&self, instance: &Instance, capacity: &Resources) -> bool {
        !self.services.contains(&instance.service) && self.used.fits_with(&instance.demand, capacity)
    }

    pub fn place(&mut self, instance: &Instance) {
        self.used.add(&instance.demand);
        self.services.insert(instance.service.clone());
        self.instances.push(instance.clone());
    }

    /// Used / capacity for one dimension, as a fraction
    pub fn utilization(&self, kind: ResourceKind, capacity: &Resources) -> f64 {
        self.used.get(kind) / capacity.get(kind)
    }
}

/// How candidate resource orders are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One pass sorted by CPU, then network, then memory
    Simple,
    /// Criticality order plus seeded random orders; fewest servers wins
    Search,
}

/// Planner knobs
#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub strategy: Strategy,
    pub seed: u64,
    pub permutation_samples: usize,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Search,
            seed: 1,
            permutation_samples: 100,
        }
    }
}

/// A complete assignment of instances to servers
#[derive(Debug, Clone)]
pub struct Plan {
    pub capacity: Resources,
    pub servers: Vec<Server>,
    pub strategy: Strategy,
    pub seed: u64,
    /// Resource order whose FFD pass produced this plan
    pub order: Vec<ResourceKind>,
}

impl Plan {
    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn instance_count(&self) -> usize {
        self.servers.iter().map(|s| s.instances.len()).sum()
    }

    /// Sum of usage over all servers
    pub fn total_used(&self) -> Resources {
        let mut total = Resources::default();
        for server in &self.servers {
            total.add(&server.used);
        }
        total
    }

    /// Highest single-dimension utilisation on any server (0 for an empty plan)
    pub fn peak_utilization(&self) -> f64 {
        self.servers
            .iter()
            .flat_map(|s| ResourceKind::ALL.iter().map(move |&k| s.utilization(k, &self.capacity)))
            .fold(0.0, f64::max)
    }

    /// Serializable view written to the plan file
    pub fn report(&self) -> PlanReport {
        PlanReport {
            capacity: self.capacity,
            strategy: self.strategy,
            seed: self.seed,
            order: self.order.clone(),
            server_count: self.server_count(),
            servers: self
                .servers
                .iter()
                .map(|s| ServerReport {
                    name: s.name.clone(),
                    services: s.services.iter().cloned().collect(),
                    used: s.used,
                })
                .collect(),
            generated_at: Utc::now(),
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        crate::validation::validate_path(&path.to_string_lossy())?;
        crate::utils::ensure_parent_dir(path)?;
        let content = serde_json::to_string_pretty(&self.report())?;
        std::fs::write(path, content)?;
        info!(path = %path.display(), servers = self.server_count(), "wrote plan");
        Ok(())
    }

    /// Resource map with one descriptor covering every server in the plan.
    ///
    /// Each server gets a volume sized to the storage capacity, capped at the
    /// largest single volume.
    pub fn to_resource_map(
        &self,
        instance_type: &str,
        location: Option<&str>,
        volume_type: &str,
    ) -> ResourceMap {
        let storage_gb = self.capacity.storage.ceil().max(1.0);
        let volume_size_gb = if storage_gb > MAX_VOLUME_SIZE_GB as f64 {
            warn!(
                storage_gb,
                max = MAX_VOLUME_SIZE_GB,
                "server storage exceeds one volume; pricing the largest volume"
            );
            MAX_VOLUME_SIZE_GB
        } else {
            storage_gb as u32
        };

        let mut map = ResourceMap::new();
        map.insert(
            "servers".to_string(),
            ResourceDescriptor {
                instance_type: instance_type.to_string(),
                location: location.map(str::to_string),
                quantity: self.server_count() as u32,
                volume_type: volume_type.to_string(),
                volume_size_gb: Some(volume_size_gb),
            },
        );
        map
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerReport {
    pub name: String,
    pub services: Vec<String>,
    #[serde(flatten)]
    pub used: Resources,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub capacity: Resources,
    pub strategy: Strategy,
    pub seed: u64,
    pub order: Vec<ResourceKind>,
    pub server_count: usize,
    pub servers: Vec<ServerReport>,
    pub generated_at: DateTime<Utc>,
}

/// Fail if some instance cannot fit even on an empty server.
pub fn check_placeable(instances: &[Instance], capacity: &Resources) -> Result<()> {
    for instance in instances {
        for kind in ResourceKind::ALL {
            let demand = instance.demand.get(kind);
            if demand > capacity.get(kind) {
                return Err(FleetError::Unplaceable {
                    service: instance.service.clone(),
                    resource: kind.to_string(),
                    demand,
                    capacity: capacity.get(kind),
                });
            }
        }
    }
    Ok(())
}

/// Validate inputs and run the chosen strategy.
pub fn plan(instances: &[Instance], capacity: &Resources, options: &PlanOptions) -> Result<Plan> {
    capacity.validate_capacity()?;
    check_placeable(instances, capacity)?;

    let plan = match options.strategy {
        Strategy::Simple => {
            let order = ffd::SIMPLE_ORDER.to_vec();
            Plan {
                capacity: *capacity,
                servers: first_fit_decreasing(instances, capacity, &order),
                strategy: Strategy::Simple,
                seed: options.seed,
                order,
            }
        }
        Strategy::Search => best_plan(instances, capacity, options.seed, options.permutation_samples),
    };

    info!(
        strategy = ?plan.strategy,
        instances = instances.len(),
        servers = plan.server_count(),
        "planned"
    );
    Ok(plan)
}
