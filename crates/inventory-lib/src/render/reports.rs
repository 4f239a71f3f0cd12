use chrono::{DateTime, Utc};

use super::xlsx::{Cell, SheetLayout, SheetRow};
use crate::models::{
    Addm, Alert, Cluster, HostSummary, LmsRow, PatchAdvisor, PostgreSqlInstance, SegmentAdvisor,
    Vm,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn timestamp(t: &DateTime<Utc>) -> Cell {
    Cell::Text(t.format(TIMESTAMP_FORMAT).to_string())
}

fn joined(values: &[String]) -> Cell {
    Cell::Text(values.join(", "))
}

pub const ADDM_LAYOUT: SheetLayout = SheetLayout {
    name: "Addm",
    title: None,
    headers: &[
        "Action",
        "Benefit",
        "CreatedAt",
        "Dbname",
        "Environment",
        "Finding",
        "Hostname",
        "Location",
        "Recommendation",
    ],
    header_row: 0,
    first_data_row: 1,
};

impl SheetRow for Addm {
    fn cells(&self) -> Vec<Cell> {
        vec![
            (&self.action).into(),
            self.benefit.into(),
            timestamp(&self.created_at),
            (&self.dbname).into(),
            (&self.environment).into(),
            (&self.finding).into(),
            (&self.hostname).into(),
            (&self.location).into(),
            (&self.recommendation).into(),
        ]
    }
}

pub const SEGMENT_ADVISOR_LAYOUT: SheetLayout = SheetLayout {
    name: "Segment_Advisor",
    title: None,
    headers: &[
        "Dbname",
        "Environment",
        "Hostname",
        "PartitionName",
        "Reclaimable",
        "Recommendation",
        "SegmentName",
        "SegmentOwner",
        "SegmentType",
    ],
    header_row: 0,
    first_data_row: 1,
};

impl SheetRow for SegmentAdvisor {
    fn cells(&self) -> Vec<Cell> {
        vec![
            (&self.dbname).into(),
            (&self.environment).into(),
            (&self.hostname).into(),
            (&self.partition_name).into(),
            (&self.reclaimable).into(),
            (&self.recommendation).into(),
            (&self.segment_name).into(),
            (&self.segment_owner).into(),
            (&self.segment_type).into(),
        ]
    }
}

pub const PATCH_ADVISOR_LAYOUT: SheetLayout = SheetLayout {
    name: "Patch_Advisor",
    title: None,
    headers: &["Description", "Hostname", "Dbname", "Dbver", "Date", "Status"],
    header_row: 0,
    first_data_row: 1,
};

impl SheetRow for PatchAdvisor {
    fn cells(&self) -> Vec<Cell> {
        vec![
            (&self.description).into(),
            (&self.hostname).into(),
            (&self.dbname).into(),
            (&self.dbver).into(),
            self.date.as_ref().map_or(Cell::Empty, timestamp),
            self.status.as_str().into(),
        ]
    }
}

pub const HOSTS_LAYOUT: SheetLayout = SheetLayout {
    name: "Hosts",
    title: None,
    headers: &[
        "Hostname",
        "Environment",
        "HostType",
        "Cluster",
        "PhysicalHost",
        "Version",
        "CreatedAt",
        "Databases",
        "OS",
        "Kernel",
        "OracleCluster",
        "SunCluster",
        "VeritasCluster",
        "Virtual",
        "Type",
        "CPUThreads",
        "CPUCores",
        "Socket",
        "MemTotal",
        "SwapTotal",
        "CPUModel",
    ],
    header_row: 0,
    first_data_row: 1,
};

impl SheetRow for HostSummary {
    fn cells(&self) -> Vec<Cell> {
        vec![
            (&self.hostname).into(),
            (&self.environment).into(),
            (&self.host_type).into(),
            self.cluster.as_ref().map_or(Cell::Empty, Cell::from),
            self.physical_host.as_ref().map_or(Cell::Empty, Cell::from),
            (&self.version).into(),
            timestamp(&self.created_at),
            joined(&self.databases),
            (&self.os).into(),
            (&self.kernel).into(),
            self.oracle_cluster.into(),
            self.sun_cluster.into(),
            self.veritas_cluster.into(),
            self.is_virtual.into(),
            (&self.hardware_abstraction_technology).into(),
            self.cpu_threads.into(),
            self.cpu_cores.into(),
            self.socket.into(),
            self.mem_total.into(),
            self.swap_total.into(),
            (&self.cpu_model).into(),
        ]
    }
}

/// Oracle LMS "Database & EBS" form; column G is left for the auditor
pub const LMS_LAYOUT: SheetLayout = SheetLayout {
    name: "Database_&_EBS",
    title: Some("Oracle LMS - Database & EBS"),
    headers: &[
        "Physical Server Name",
        "Virtual Server Name",
        "Virtualization Technology",
        "DB Instance Name",
        "Pluggable Database Name",
        "Connect String",
        "",
        "Product Version",
        "Product Edition",
        "Environment",
        "Features",
        "RAC Node Names",
        "Processor Model",
        "Processors",
        "Cores per Processor",
        "Physical Cores",
        "Threads per Core",
        "Processor Speed",
        "Server Purchase Date",
        "Operating System",
        "Notes",
    ],
    header_row: 2,
    first_data_row: 3,
};

impl SheetRow for LmsRow {
    fn cells(&self) -> Vec<Cell> {
        vec![
            (&self.physical_server_name).into(),
            (&self.virtual_server_name).into(),
            (&self.virtualization_technology).into(),
            (&self.db_instance_name).into(),
            (&self.pluggable_database_name).into(),
            (&self.connect_string).into(),
            Cell::Empty,
            (&self.product_version).into(),
            (&self.product_edition).into(),
            (&self.environment).into(),
            (&self.features).into(),
            (&self.rac_node_names).into(),
            (&self.processor_model).into(),
            self.processors.into(),
            self.cores_per_processor.into(),
            self.physical_cores.into(),
            self.threads_per_core.into(),
            (&self.processor_speed).into(),
            (&self.server_purchase_date).into(),
            (&self.operating_system).into(),
            (&self.notes).into(),
        ]
    }
}

pub const CLUSTERS_LAYOUT: SheetLayout = SheetLayout {
    name: "Hypervisor",
    title: None,
    headers: &[
        "Name",
        "Type",
        "CPU",
        "Sockets",
        "VirtualizationNodes",
        "PhysicalServerModelNames",
        "VMsCount",
        "VMsErcoleAgentCount",
    ],
    header_row: 0,
    first_data_row: 1,
};

impl SheetRow for Cluster {
    fn cells(&self) -> Vec<Cell> {
        vec![
            (&self.name).into(),
            (&self.kind).into(),
            self.cpu.into(),
            self.sockets.into(),
            joined(&self.virtualization_nodes),
            joined(&self.physical_server_model_names),
            self.vms_count.into(),
            self.vms_ercole_agent_count.into(),
        ]
    }
}

/// VMs of a single cluster
pub const CLUSTER_VMS_LAYOUT: SheetLayout = SheetLayout {
    name: "VMs",
    title: None,
    headers: &[
        "Physical Hosts",
        "Hostname",
        "VirtualizationNode",
        "PhysicalServerModelName",
        "CappedCPU",
    ],
    header_row: 0,
    first_data_row: 1,
};

impl SheetRow for Vm {
    fn cells(&self) -> Vec<Cell> {
        vec![
            (&self.name).into(),
            (&self.hostname).into(),
            (&self.virtualization_node).into(),
            (&self.physical_server_model_name).into(),
            self.capped_cpu.into(),
        ]
    }
}

pub const ALERTS_LAYOUT: SheetLayout = SheetLayout {
    name: "Alerts",
    title: None,
    headers: &["Type", "Date", "Severity", "Hostname", "Code", "Description"],
    header_row: 0,
    first_data_row: 1,
};

impl SheetRow for Alert {
    fn cells(&self) -> Vec<Cell> {
        vec![
            (&self.alert_category).into(),
            timestamp(&self.date),
            self.alert_severity.as_str().into(),
            (&self.hostname).into(),
            (&self.alert_code).into(),
            (&self.description).into(),
        ]
    }
}

pub const POSTGRESQL_INSTANCES_LAYOUT: SheetLayout = SheetLayout {
    name: "Instances",
    title: None,
    headers: &[
        "Hostname",
        "Environment",
        "Location",
        "Name",
        "Version",
        "Charset",
        "Port",
        "Databases",
        "Users",
    ],
    header_row: 0,
    first_data_row: 1,
};

impl SheetRow for PostgreSqlInstance {
    fn cells(&self) -> Vec<Cell> {
        vec![
            (&self.hostname).into(),
            (&self.environment).into(),
            (&self.location).into(),
            (&self.name).into(),
            (&self.version).into(),
            (&self.charset).into(),
            self.port.into(),
            self.databases.into(),
            self.users.into(),
        ]
    }
}
