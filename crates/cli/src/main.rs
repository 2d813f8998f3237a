mod command;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use command::{Cli, Commands};
use jobgate_core::conditions::gate;
use jobgate_core::config::JobgateCfg;
use jobgate_core::environment::network::{DeviceState, PlatformError};
use jobgate_core::runtime::{Monitor, ShutdownGuard};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code when a check or query comes back negative.
const EXIT_NEGATIVE: u8 = 1;
/// Exit code when device state could not be read at all.
/// Usage errors exit 2 through clap.
const EXIT_PLATFORM_FAILED: u8 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let cfg = JobgateCfg::from_env();

    // Logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(cfg.log_json.then(|| fmt::layer().json().with_target(true).with_writer(std::io::stderr)))
        .with((!cfg.log_json).then(|| fmt::layer().with_target(false).with_writer(std::io::stderr)))
        .init();

    let sysfs = Arc::new(cfg.sysfs_host());
    let device_state = DeviceState::new(sysfs.clone());

    match cli.command {
        Commands::Snapshot => {
            let conditions = match sysfs.device_conditions() {
                Ok(c) => c,
                Err(e) => return Ok(platform_failed(&e)),
            };
            println!("{}", serde_json::to_string_pretty(&conditions)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Unmetered => {
            let result = device_state.try_is_unmetered_network_available();
            match &result {
                Ok(unmetered) => println!("{unmetered}"),
                Err(e) => tracing::error!(error = %e, "cannot read network state"),
            }
            Ok(ExitCode::from(unmetered_exit_code(&result)))
        }
        Commands::Check(args) => {
            let trigger = args.trigger(&cfg);
            let device = match sysfs.device_conditions() {
                Ok(d) => d,
                Err(e) => return Ok(platform_failed(&e)),
            };
            let unmetered = device_state.is_unmetered_network_available();
            let result = gate::check(&trigger, &device, unmetered);
            tracing::debug!(?trigger, ?result, "trigger evaluated");

            let report = serde_json::json!({
                "trigger": trigger,
                "device": device,
                "unmetered": unmetered,
                "gate": result,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::from(exit_code(result.is_admitted())))
        }
        Commands::Watch => {
            let shutdown = ShutdownGuard::new();
            shutdown.spawn_signal_listener();

            let (mut monitor, mut signal_rx) = Monitor::new(&cfg, sysfs, device_state);
            let printer = tokio::spawn(async move {
                while let Some(signal) = signal_rx.recv().await {
                    match serde_json::to_string(&signal) {
                        Ok(line) => println!("{line}"),
                        Err(e) => tracing::warn!(error = %e, "failed to encode signal"),
                    }
                }
            });

            monitor.run(shutdown.token()).await;
            // closes the signal channel
            drop(monitor);
            printer.await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(positive: bool) -> u8 {
    if positive { 0 } else { EXIT_NEGATIVE }
}

fn unmetered_exit_code(result: &Result<bool, PlatformError>) -> u8 {
    match result {
        Ok(unmetered) => exit_code(*unmetered),
        Err(_) => EXIT_PLATFORM_FAILED,
    }
}

fn platform_failed(e: &PlatformError) -> ExitCode {
    tracing::error!(error = %e, "cannot read device conditions");
    ExitCode::from(EXIT_PLATFORM_FAILED)
}
