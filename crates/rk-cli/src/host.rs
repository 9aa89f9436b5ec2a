//! Host context attached to every run record, so timings collected on
//! different machines can be told apart.

use serde::Serialize;
use sysinfo::System;

/// Hosts with less memory than this are classed as edge devices.
const EDGE_MEM_MB: u64 = 4096;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostProfile {
    pub device_name: String,
    /// How the kernels reach the processor. Always "CPU-only" here.
    pub bus_type: String,
    pub mem_total_mb: u64,
    pub cpu_count: usize,
    /// System-wide CPU load sampled before the run. The first sample of a
    /// process has no earlier reading to diff against and reads 0.
    pub cpu_load_pct: f32,
    pub is_edge: bool,
}

impl HostProfile {
    /// Reads the host name, memory and CPU state of the current machine.
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu();

        let device_name = System::host_name().unwrap_or_else(|| "Unknown".to_string());
        let mem_total_mb = sys.total_memory() / (1024 * 1024);
        let is_edge = is_edge(&device_name, mem_total_mb);
        let load = sys.global_cpu_info().cpu_usage();
        HostProfile {
            device_name,
            bus_type: "CPU-only".to_string(),
            mem_total_mb,
            cpu_count: sys.cpus().len(),
            cpu_load_pct: if load.is_finite() { load } else { 0.0 },
            is_edge,
        }
    }
}

/// Jetson/Tegra boards and small-memory hosts count as edge devices.
pub fn is_edge(device_name: &str, mem_total_mb: u64) -> bool {
    device_name.contains("Jetson") || device_name.contains("Tegra") || mem_total_mb < EDGE_MEM_MB
}
