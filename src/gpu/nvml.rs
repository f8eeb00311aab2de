use crate::error::DriverError;
use crate::gpu::driver::{ManagementInterface, MemoryUsage};
use crate::utils::formatting::PROCESS_NAME_BUFFER_SIZE;
use log::info;
use nvml_wrapper::error::NvmlError;
use nvml_wrapper::{Device, Nvml};

/// NVML-backed management interface.
///
/// The two-call sizing of the compute process list happens inside
/// `nvml-wrapper`; a list that outgrows its buffer comes back as
/// `NvmlError::InsufficientSize` rather than a truncated list.
pub struct NvmlInterface {
    nvml: Nvml,
}

impl NvmlInterface {
    pub fn init() -> Result<Self, DriverError> {
        let nvml = Nvml::init().map_err(DriverError::init)?;
        info!("Initialized NVML");
        Ok(NvmlInterface { nvml })
    }
}

impl ManagementInterface for NvmlInterface {
    type Handle<'a> = Device<'a> where Self: 'a;
    type Error = NvmlError;

    fn device_count(&self) -> Result<u32, NvmlError> {
        self.nvml.device_count()
    }

    fn device_handle(&self, index: u32) -> Result<Device<'_>, NvmlError> {
        self.nvml.device_by_index(index)
    }

    fn device_name(&self, device: &Device<'_>) -> Result<String, NvmlError> {
        device.name()
    }

    fn device_utilization(&self, device: &Device<'_>) -> Result<u32, NvmlError> {
        Ok(device.utilization_rates()?.gpu)
    }

    fn device_memory(&self, device: &Device<'_>) -> Result<MemoryUsage, NvmlError> {
        let memory = device.memory_info()?;
        Ok(MemoryUsage {
            used: memory.used,
            total: memory.total,
        })
    }

    fn device_compute_processes(&self, device: &Device<'_>) -> Result<Vec<u32>, NvmlError> {
        Ok(device
            .running_compute_processes()?
            .into_iter()
            .map(|p| p.pid)
            .collect())
    }

    fn process_name(&self, pid: u32) -> Result<String, NvmlError> {
        self.nvml.sys_process_name(pid, PROCESS_NAME_BUFFER_SIZE)
    }

    fn shutdown(self) -> Result<(), NvmlError> {
        self.nvml.shutdown()
    }
}
