pub mod driver;
pub mod info;
pub mod nvml;
pub mod process;
