use crate::gpu::info::GpuInfo;
use crate::gpu::process::Owner;

/// Rows to emphasize in the report, chosen on the command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Highlight {
    pub gpu: Option<u32>,
    pub username: Option<String>,
}

impl Highlight {
    /// A GPU is highlighted when it is the selected one or runs a process of
    /// the selected user. Its process rows follow the GPU.
    pub fn matches(&self, gpu_info: &GpuInfo) -> bool {
        self.gpu == Some(gpu_info.index)
            || self.username.as_deref().is_some_and(|username| {
                gpu_info
                    .processes
                    .iter()
                    .any(|p| matches!(&p.owner, Owner::Resolved { name, .. } if name == username))
            })
    }
}
