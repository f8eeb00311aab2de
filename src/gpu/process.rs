/// Placeholder shown when the owner of a process cannot be resolved.
pub const OWNER_ERROR: &str = "ERROR";

/// Who a GPU process belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Owner {
    /// Resolution has not been attempted yet.
    Unresolved,
    Resolved {
        uid: u32,
        name: String,
    },
    /// Resolution was attempted and failed. `uid` is kept when only the
    /// user database lookup failed.
    Failed {
        uid: Option<u32>,
    },
}

impl Owner {
    pub fn display_name(&self) -> &str {
        match self {
            Owner::Resolved { name, .. } => name,
            Owner::Failed { .. } | Owner::Unresolved => OWNER_ERROR,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GpuProcessInfo {
    pub pid: u32,
    pub name: String,
    pub owner: Owner,
}

impl GpuProcessInfo {
    pub fn new(pid: u32, name: String) -> Self {
        GpuProcessInfo {
            pid,
            name,
            owner: Owner::Unresolved,
        }
    }
}
