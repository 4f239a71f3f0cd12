use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Vm {
    pub name: String,
    pub hostname: String,
    pub virtualization_node: String,
    pub physical_server_model_name: String,
    #[serde(rename = "CappedCPU")]
    pub capped_cpu: bool,
    pub is_ercole_installed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VirtualizationNodeStats {
    pub virtualization_node: String,
    #[serde(rename = "TotalVMsCount")]
    pub total_vms_count: i64,
    #[serde(rename = "TotalVMsWithErcoleAgentCount")]
    pub total_vms_with_agent_count: i64,
    #[serde(rename = "TotalVMsWithoutErcoleAgentCount")]
    pub total_vms_without_agent_count: i64,
}

/// A hypervisor cluster as reported by its virtualization agent.
///
/// In `clusternames` mode only `Name` is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Cluster {
    #[serde(rename = "ID")]
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub environment: String,
    pub location: String,
    pub fetch_endpoint: String,
    pub hostname: String,
    pub hostname_agent_virtualization: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "CPU")]
    pub cpu: i64,
    pub sockets: i64,
    pub virtualization_nodes: Vec<String>,
    pub virtualization_nodes_count: i64,
    pub virtualization_nodes_stats: Vec<VirtualizationNodeStats>,
    #[serde(rename = "VMs")]
    pub vms: Vec<Vm>,
    #[serde(rename = "VMsCount")]
    pub vms_count: i64,
    #[serde(rename = "VMsErcoleAgentCount")]
    pub vms_ercole_agent_count: i64,
    pub physical_server_model_names: Vec<String>,
}

impl Cluster {
    /// Recompute counters and per-node statistics from the VM list
    pub fn with_computed_stats(mut self) -> Self {
        let mut per_node: BTreeMap<&str, VirtualizationNodeStats> = BTreeMap::new();
        for vm in &self.vms {
            let stats = per_node
                .entry(vm.virtualization_node.as_str())
                .or_insert_with(|| VirtualizationNodeStats {
                    virtualization_node: vm.virtualization_node.clone(),
                    ..VirtualizationNodeStats::default()
                });
            stats.total_vms_count += 1;
            if vm.is_ercole_installed {
                stats.total_vms_with_agent_count += 1;
            } else {
                stats.total_vms_without_agent_count += 1;
            }
        }

        let models: BTreeSet<&str> = self
            .vms
            .iter()
            .map(|vm| vm.physical_server_model_name.as_str())
            .filter(|name| !name.is_empty())
            .collect();

        let stats: Vec<VirtualizationNodeStats> = per_node.into_values().collect();
        self.virtualization_nodes = stats
            .iter()
            .map(|s| s.virtualization_node.clone())
            .collect();
        self.virtualization_nodes_count = stats.len() as i64;
        self.physical_server_model_names = models.into_iter().map(str::to_string).collect();
        self.vms_count = self.vms.len() as i64;
        self.vms_ercole_agent_count =
            self.vms.iter().filter(|vm| vm.is_ercole_installed).count() as i64;
        self.virtualization_nodes_stats = stats;
        self
    }
}
