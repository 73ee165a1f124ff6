//! Subcommands of the binary besides the main monitoring run.

pub mod dry_run;

pub use dry_run::DryRunArgs;
