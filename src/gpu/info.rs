use crate::error::DriverError;
use crate::gpu::driver::{DriverSession, ManagementInterface};
use crate::gpu::process::GpuProcessInfo;
use crate::utils::formatting::{bounded, DEVICE_NAME_MAX_LEN, PROCESS_NAME_MAX_LEN};
use log::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GpuInfo {
    pub index: u32,
    pub name: String,
    pub utilization: u32,
    pub memory_used: u64,
    pub memory_total: u64,
    pub processes: Vec<GpuProcessInfo>,
}

impl GpuInfo {
    pub fn in_use(&self) -> bool {
        !self.processes.is_empty()
    }
}

/// Reads every device and its compute processes, then shuts the interface
/// down. The interface is shut down exactly once whether or not collection
/// succeeds; the first failing query aborts the whole run.
pub fn enumerate<M: ManagementInterface>(interface: M) -> Result<Vec<GpuInfo>, DriverError> {
    let session = DriverSession::new(interface);
    let gpu_infos = collect_gpu_info(session.interface())?;
    session.shutdown()?;
    Ok(gpu_infos)
}

pub fn collect_gpu_info<M: ManagementInterface>(nvml: &M) -> Result<Vec<GpuInfo>, DriverError> {
    let device_count = nvml
        .device_count()
        .map_err(|e| DriverError::query("query device count", e))?;
    info!(
        "Found {} device{}",
        device_count,
        if device_count != 1 { "s" } else { "" }
    );

    let mut gpu_infos = Vec::with_capacity(device_count as usize);
    for index in 0..device_count {
        gpu_infos.push(collect_device(nvml, index)?);
    }

    Ok(gpu_infos)
}

fn collect_device<M: ManagementInterface>(nvml: &M, index: u32) -> Result<GpuInfo, DriverError> {
    let device = nvml
        .device_handle(index)
        .map_err(|e| DriverError::query(format!("get handle for device {index}"), e))?;
    let name = nvml
        .device_name(&device)
        .map_err(|e| DriverError::query(format!("get name of device {index}"), e))?;
    let utilization = nvml
        .device_utilization(&device)
        .map_err(|e| DriverError::query(format!("get utilization of device {index}"), e))?;
    let memory = nvml
        .device_memory(&device)
        .map_err(|e| DriverError::query(format!("get memory info of device {index}"), e))?;
    let pids = nvml
        .device_compute_processes(&device)
        .map_err(|e| DriverError::query(format!("get processes of device {index}"), e))?;

    debug!("Device {index} reports {} compute processes", pids.len());

    let processes = pids
        .into_iter()
        .enumerate()
        .map(|(j, pid)| {
            let name = nvml.process_name(pid).map_err(|e| {
                DriverError::query(
                    format!("get process name of device {index} process {j}"),
                    e,
                )
            })?;
            Ok(GpuProcessInfo::new(pid, bounded(name, PROCESS_NAME_MAX_LEN)))
        })
        .collect::<Result<Vec<_>, DriverError>>()?;

    Ok(GpuInfo {
        index,
        name: bounded(name, DEVICE_NAME_MAX_LEN),
        utilization,
        memory_used: memory.used,
        memory_total: memory.total,
        processes,
    })
}
