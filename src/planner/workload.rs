//! Workload CSV loading
//!
//! One row per service:
//!
//! ```text
//! service,quantity,cpu_percent,network_mbps,disk_io_mbps,storage_gb,memory_gb
//! api,3,120,80,15,20,2
//! ```
//!
//! The Spanish column headers used by older capacity sheets
//! (`Servicios,Cantidad,USO CPU (%),E/S Red (Mbs),E/S disco (MB/s),Uso Disco (GB),Memoria (GB)`)
//! are accepted as well.

use super::{Instance, Resources};
use crate::error::{FleetError, Result};
use crate::validation::validate_demand;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct WorkloadRow {
    #[serde(alias = "Servicios")]
    service: String,
    #[serde(alias = "Cantidad")]
    quantity: u32,
    /// Percent of one core; 250 means two and a half cores
    #[serde(alias = "USO CPU (%)")]
    cpu_percent: f64,
    #[serde(alias = "E/S Red (Mbs)")]
    network_mbps: f64,
    #[serde(alias = "E/S disco (MB/s)")]
    disk_io_mbps: f64,
    #[serde(alias = "Uso Disco (GB)")]
    storage_gb: f64,
    #[serde(alias = "Memoria (GB)")]
    memory_gb: f64,
}

/// A service and how many replicas of it to place
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSpec {
    pub service: String,
    pub quantity: u32,
    /// Demand of a single replica
    pub demand: Resources,
}

impl WorkloadRow {
    fn into_spec(self) -> Result<ServiceSpec> {
        if self.service.trim().is_empty() {
            return Err(FleetError::validation("service", "Service name cannot be empty"));
        }
        let field = |name: &str| format!("{}.{}", self.service, name);
        validate_demand(&field("cpu_percent"), self.cpu_percent)?;
        validate_demand(&field("memory_gb"), self.memory_gb)?;
        validate_demand(&field("network_mbps"), self.network_mbps)?;
        validate_demand(&field("disk_io_mbps"), self.disk_io_mbps)?;
        validate_demand(&field("storage_gb"), self.storage_gb)?;

        Ok(ServiceSpec {
            demand: Resources {
                cpu: self.cpu_percent / 100.0,
                memory: self.memory_gb,
                network: self.network_mbps,
                disk_io: self.disk_io_mbps,
                storage: self.storage_gb,
            },
            quantity: self.quantity,
            service: self.service,
        })
    }
}

/// Parse service rows from any CSV source.
pub fn read_services<R: Read>(reader: R) -> Result<Vec<ServiceSpec>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut services = Vec::new();
    for row in csv_reader.deserialize::<WorkloadRow>() {
        let spec = row?.into_spec()?;
        debug!(service = %spec.service, quantity = spec.quantity, "loaded service");
        services.push(spec);
    }
    Ok(services)
}

/// One `Instance` per replica, in row order.
pub fn expand_instances(services: &[ServiceSpec]) -> Vec<Instance> {
    services
        .iter()
        .flat_map(|spec| {
            (0..spec.quantity).map(move |_| Instance {
                service: spec.service.clone(),
                demand: spec.demand,
            })
        })
        .collect()
}

/// Read a workload file and expand it into instances.
pub fn load_instances(path: &Path) -> Result<Vec<Instance>> {
    let file = std::fs::File::open(path)?;
    let services = read_services(file)?;
    let instances = expand_instances(&services);
    debug!(
        path = %path.display(),
        services = services.len(),
        instances = instances.len(),
        "expanded workload"
    );
    Ok(instances)
}
