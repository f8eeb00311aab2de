use crate::error::OwnershipError;
use crate::gpu::info::GpuInfo;
use crate::gpu::process::Owner;
use crate::utils::formatting::{bounded, USER_NAME_MAX_LEN};
use log::debug;
use nix::unistd::{Uid, User};
use procfs::process::Process;

pub trait OwnerLookup {
    fn owner_uid(&self, pid: u32) -> Result<u32, OwnershipError>;
    fn user_name(&self, uid: u32) -> Result<String, OwnershipError>;
}

pub struct SystemOwnerLookup;

impl OwnerLookup for SystemOwnerLookup {
    fn owner_uid(&self, pid: u32) -> Result<u32, OwnershipError> {
        let raw_pid = i32::try_from(pid).map_err(|_| OwnershipError::InvalidPid { pid })?;
        let unavailable = |e: procfs::ProcError| OwnershipError::ProcessUnavailable {
            pid,
            cause: e.to_string(),
        };
        Process::new(raw_pid).map_err(unavailable)?.uid().map_err(unavailable)
    }

    fn user_name(&self, uid: u32) -> Result<String, OwnershipError> {
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(Some(user)) => Ok(user.name),
            Ok(None) => Err(OwnershipError::UnknownUser { uid }),
            Err(errno) => Err(OwnershipError::UserLookup {
                uid,
                cause: errno.to_string(),
            }),
        }
    }
}

pub fn resolve_owner<L: OwnerLookup>(lookup: &L, pid: u32) -> Result<(u32, String), OwnershipError> {
    let uid = lookup.owner_uid(pid)?;
    let name = lookup.user_name(uid)?;
    Ok((uid, bounded(name, USER_NAME_MAX_LEN)))
}

// A process that exited since enumeration ends up as `Owner::Failed`
// without affecting the others.
pub fn resolve_owners<L: OwnerLookup>(lookup: &L, gpu_infos: &mut [GpuInfo]) {
    for gpu_info in gpu_infos.iter_mut() {
        for process in gpu_info.processes.iter_mut() {
            process.owner = match resolve_owner(lookup, process.pid) {
                Ok((uid, name)) => Owner::Resolved { uid, name },
                Err(e) => {
                    debug!("Cannot resolve owner of pid {}: {}", process.pid, e);
                    Owner::Failed { uid: e.uid() }
                }
            };
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::OwnerLookup;
    use crate::error::OwnershipError;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct MapOwnerLookup {
        pub uids: HashMap<u32, u32>,
        pub users: HashMap<u32, String>,
    }

    impl MapOwnerLookup {
        pub fn with_process(mut self, pid: u32, uid: u32) -> Self {
            self.uids.insert(pid, uid);
            self
        }

        pub fn with_user(mut self, uid: u32, name: &str) -> Self {
            self.users.insert(uid, name.to_string());
            self
        }
    }

    impl OwnerLookup for MapOwnerLookup {
        fn owner_uid(&self, pid: u32) -> Result<u32, OwnershipError> {
            self.uids
                .get(&pid)
                .copied()
                .ok_or_else(|| OwnershipError::ProcessUnavailable {
                    pid,
                    cause: "No such file or directory (os error 2)".to_string(),
                })
        }

        fn user_name(&self, uid: u32) -> Result<String, OwnershipError> {
            self.users
                .get(&uid)
                .cloned()
                .ok_or(OwnershipError::UnknownUser { uid })
        }
    }
}
