mod app_state;
mod error;
mod gpu;
mod ui;
mod utils;

use app_state::Highlight;
use clap::{value_parser, Arg, Command};
use error::DriverError;
use flexi_logger::Logger;
use gpu::driver::ManagementInterface;
use gpu::info::enumerate;
use gpu::nvml::NvmlInterface;
use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;
use ui::render::render;
use utils::system::{resolve_owners, OwnerLookup, SystemOwnerLookup};

fn main() -> ExitCode {
    ExitCode::from(exit_status(run(), &mut io::stderr()))
}

// stderr is the only channel a fatal error is reported on.
fn exit_status(result: Result<(), Box<dyn Error>>, stderr: &mut impl Write) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(stderr, "{e}");
            1
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let matches = Command::new("gpuw")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Shows who is using which GPU and what they are running")
        .arg(
            Arg::new("gpu")
                .long("gpu")
                .value_name("ID")
                .value_parser(value_parser!(u32))
                .help("Highlight the GPU with this id")
                .required(false),
        )
        .arg(
            Arg::new("username")
                .long("username")
                .value_name("NAME")
                .help("Highlight GPUs running processes of this user")
                .required(false),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("SPEC")
                .default_value("warn")
                .help("Log specification for messages written to stderr"),
        )
        .get_matches();

    let log_spec = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("warn");
    let _logger = Logger::try_with_env_or_str(log_spec)?
        .log_to_stderr()
        .start()?;

    let highlight = Highlight {
        gpu: matches.get_one::<u32>("gpu").copied(),
        username: matches.get_one::<String>("username").cloned(),
    };

    let nvml = NvmlInterface::init()?;
    let report = build_report(nvml, &SystemOwnerLookup, &highlight)?;
    print!("{report}");

    Ok(())
}

/// Collects, resolves and renders one snapshot. Nothing is rendered unless
/// every driver query succeeded.
fn build_report<M, L>(interface: M, lookup: &L, highlight: &Highlight) -> Result<String, DriverError>
where
    M: ManagementInterface,
    L: OwnerLookup,
{
    let mut gpu_infos = enumerate(interface)?;
    resolve_owners(lookup, &mut gpu_infos);
    Ok(render(&gpu_infos, highlight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpu::driver::mock::{MockDevice, MockDriver};
    use pretty_assertions::assert_eq;
    use utils::system::mock::MapOwnerLookup;

    const MIB: u64 = 1_048_576;

    fn two_devices() -> MockDriver {
        MockDriver::new(vec![
            MockDevice::new("A100", 42, 2 * MIB, 40 * MIB).with_process(100, "train.py"),
            MockDevice::new("A100-X", 0, 0, 40 * MIB),
        ])
    }

    #[test]
    fn end_to_end_report() {
        let lookup = MapOwnerLookup::default()
            .with_process(100, 1000)
            .with_user(1000, "alice");

        let report = build_report(two_devices(), &lookup, &Highlight::default()).unwrap();

        assert_eq!(
            report,
            "GPU   Name     Util   Memory Usage   Memory Total   In Use\n\
             ---   ------   ----   ------------   ------------   ------\n  \
             0   A100      42%          2 MiB         40 MiB      Yes\n  \
             1   A100-X     0%          0 MiB         40 MiB       No\n\
             \n\
             User    GPU   Process\n\
             -----   ---   --------\n\
             alice     0   train.py\n"
        );
    }

    #[test]
    fn unresolvable_owner_renders_error() {
        let report =
            build_report(two_devices(), &MapOwnerLookup::default(), &Highlight::default()).unwrap();
        assert!(report.ends_with("ERROR     0   train.py\n"), "{report}");
    }

    #[test]
    fn driver_failure_yields_no_report() {
        let driver = two_devices().failing_on("device_memory");
        let shutdowns = driver.shutdown_counter();

        let result = build_report(driver, &MapOwnerLookup::default(), &Highlight::default());

        assert_eq!(
            result,
            Err(DriverError::query("get memory info of device 0", "Unknown Error"))
        );
        assert_eq!(shutdowns.get(), 1);
    }

    #[test]
    fn fatal_error_is_reported_once() {
        let err = DriverError::init("Driver Not Loaded");
        let mut stderr = Vec::new();

        let status = exit_status(Err(Box::new(err)), &mut stderr);

        assert_eq!(status, 1);
        assert_eq!(
            String::from_utf8(stderr).unwrap(),
            "Failed to initialize NVML: Driver Not Loaded\n"
        );
    }

    #[test]
    fn success_writes_nothing_to_stderr() {
        let mut stderr = Vec::new();
        assert_eq!(exit_status(Ok(()), &mut stderr), 0);
        assert!(stderr.is_empty());
    }
}
