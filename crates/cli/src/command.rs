use clap::{Parser, Subcommand};
use jobgate_core::conditions::TriggerConditions;
use jobgate_core::config::JobgateCfg;

#[derive(Parser, Debug)]
#[command(name = "jobgate")]
#[command(about = "Decide whether deferred work may run on this device", long_about = None)]
#[command(after_help = "Settings are read from JOBGATE_* environment variables; logs honour RUST_LOG.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the current device conditions as JSON
    Snapshot,
    /// Print whether the active network is unmetered (exit 1 when metered)
    Unmetered,
    /// Evaluate trigger conditions (exit 1 when deferred)
    Check(CheckArgs),
    /// Report condition changes until interrupted
    Watch,
}

/// Flags for `check`. Unset flags fall back to config.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckArgs {
    /// Require the device to be connected to power
    #[arg(long)]
    pub require_power: bool,
    /// Require an unmetered network
    #[arg(long, conflicts_with = "any_network")]
    pub require_unmetered: bool,
    /// Accept any network, overriding a configured unmetered requirement
    #[arg(long)]
    pub any_network: bool,
}

impl CheckArgs {
    /// Merge flags over the configured trigger conditions.
    pub fn trigger(&self, cfg: &JobgateCfg) -> TriggerConditions {
        let require_unmetered = if self.any_network {
            false
        } else {
            self.require_unmetered || cfg.require_unmetered_network
        };
        TriggerConditions::new(
            self.require_power || cfg.require_power_connected,
            require_unmetered,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Commands, clap::Error> {
        Cli::try_parse_from(std::iter::once("jobgate").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse(&["snapshot"]).unwrap(), Commands::Snapshot);
        assert_eq!(parse(&["unmetered"]).unwrap(), Commands::Unmetered);
        assert_eq!(parse(&["watch"]).unwrap(), Commands::Watch);
    }

    #[test]
    fn check_flags() {
        assert_eq!(parse(&["check"]).unwrap(), Commands::Check(CheckArgs::default()));
        assert_eq!(
            parse(&["check", "--require-power", "--any-network"]).unwrap(),
            Commands::Check(CheckArgs { require_power: true, require_unmetered: false, any_network: true })
        );
    }

    #[test]
    fn unmetered_and_any_network_conflict() {
        let err = parse(&["check", "--require-unmetered", "--any-network"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn rejects_unknown() {
        assert!(parse(&["reboot"]).is_err());
        assert!(parse(&["check", "--now"]).is_err());
        assert!(parse(&["snapshot", "extra"]).is_err());
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn any_network_overrides_config() {
        let cfg = JobgateCfg { require_unmetered_network: true, ..JobgateCfg::default() };
        let args = CheckArgs { any_network: true, ..CheckArgs::default() };
        assert_eq!(args.trigger(&cfg), TriggerConditions::new(false, false));
    }

    #[test]
    fn flags_add_to_config() {
        let cfg = JobgateCfg {
            require_power_connected: false,
            require_unmetered_network: false,
            ..JobgateCfg::default()
        };
        assert_eq!(CheckArgs::default().trigger(&cfg), TriggerConditions::new(false, false));
        let args = CheckArgs { require_power: true, require_unmetered: true, any_network: false };
        assert_eq!(args.trigger(&cfg), TriggerConditions::new(true, true));
    }

    #[test]
    fn config_applies_without_flags() {
        let cfg = JobgateCfg { require_power_connected: true, ..JobgateCfg::default() };
        assert_eq!(CheckArgs::default().trigger(&cfg), TriggerConditions::new(true, true));
    }
}
