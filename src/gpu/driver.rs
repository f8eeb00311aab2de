use crate::error::DriverError;
use log::warn;
use std::fmt::Display;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryUsage {
    pub used: u64,
    pub total: u64,
}

// Implementations own an initialized library handle.
pub trait ManagementInterface {
    type Handle<'a>
    where
        Self: 'a;
    type Error: Display;

    fn device_count(&self) -> Result<u32, Self::Error>;
    fn device_handle(&self, index: u32) -> Result<Self::Handle<'_>, Self::Error>;
    fn device_name(&self, device: &Self::Handle<'_>) -> Result<String, Self::Error>;
    // percent
    fn device_utilization(&self, device: &Self::Handle<'_>) -> Result<u32, Self::Error>;
    fn device_memory(&self, device: &Self::Handle<'_>) -> Result<MemoryUsage, Self::Error>;
    fn device_compute_processes(&self, device: &Self::Handle<'_>)
        -> Result<Vec<u32>, Self::Error>;
    fn process_name(&self, pid: u32) -> Result<String, Self::Error>;
    fn shutdown(self) -> Result<(), Self::Error>
    where
        Self: Sized;
}

/// Shuts the interface down exactly once, on `shutdown()` or on drop.
pub struct DriverSession<M: ManagementInterface> {
    interface: Option<M>,
}

impl<M: ManagementInterface> DriverSession<M> {
    pub fn new(interface: M) -> Self {
        DriverSession {
            interface: Some(interface),
        }
    }

    pub fn interface(&self) -> &M {
        match &self.interface {
            Some(interface) => interface,
            None => unreachable!("interface is only taken when the session ends"),
        }
    }

    pub fn shutdown(mut self) -> Result<(), DriverError> {
        match self.interface.take() {
            Some(interface) => interface.shutdown().map_err(DriverError::shutdown),
            None => Ok(()),
        }
    }
}

impl<M: ManagementInterface> Drop for DriverSession<M> {
    fn drop(&mut self) {
        if let Some(interface) = self.interface.take() {
            if let Err(e) = interface.shutdown() {
                warn!("{}", DriverError::shutdown(e));
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mock::{MockDevice, MockDriver};
    use super::*;

    #[test]
    fn dropping_a_session_shuts_down_once() {
        let driver = MockDriver::new(vec![MockDevice::new("A100", 0, 0, 0)]);
        let shutdowns = driver.shutdown_counter();
        {
            let session = DriverSession::new(driver);
            assert_eq!(session.interface().device_count(), Ok(1));
        }
        assert_eq!(shutdowns.get(), 1);
    }

    #[test]
    fn explicit_shutdown_is_not_repeated_on_drop() {
        let driver = MockDriver::new(Vec::new());
        let shutdowns = driver.shutdown_counter();
        DriverSession::new(driver).shutdown().unwrap();
        assert_eq!(shutdowns.get(), 1);
    }

    #[test]
    fn explicit_shutdown_reports_failure() {
        let driver = MockDriver::new(Vec::new()).failing_on("shutdown");
        let shutdowns = driver.shutdown_counter();
        let err = DriverSession::new(driver).shutdown().unwrap_err();
        assert_eq!(err, DriverError::shutdown("Unknown Error"));
        assert_eq!(shutdowns.get(), 1);
    }
}
