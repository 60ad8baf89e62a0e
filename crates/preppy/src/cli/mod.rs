//! Command-line interface for preppy.
//!
//! This module provides the CLI structure for the `preppy` binary; the
//! handlers live in the binary itself.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    BuildCommand, CatalogCommand, ChecklistCommand, ConfigCommand, ContactArgs, ContactsCommand,
    CustomCommand, EvacuationCommand, EventArgs, HouseholdCommand, HouseholdSetCommand, KitArg,
    MarkCommand, MedicalArgs, MedicalCommand, ProviderArgs, ProvidersCommand, RecommendCommand,
    RoutineCommand, StatusCommand, UserArg,
};

/// preppy - Plan your household's emergency kits
///
/// Builds go-bag, shelter-in-place and task checklists from a catalog of
/// disasters and supplies, tailored to who lives in your home and where.
#[derive(Debug, Parser)]
#[command(name = "preppy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and inspect the disaster and supply catalog
    #[command(subcommand)]
    Catalog(CatalogCommand),

    /// View or set a household profile
    #[command(subcommand)]
    Household(HouseholdCommand),

    /// Show recommended items for a kit
    Recommend(RecommendCommand),

    /// Choose the catalog items in a kit
    Build(BuildCommand),

    /// Show a kit's checklist
    Checklist(ChecklistCommand),

    /// Record which checklist items are acquired or done
    Mark(MarkCommand),

    /// Manage items of your own
    #[command(subcommand)]
    Custom(CustomCommand),

    /// Manage emergency contacts
    #[command(subcommand)]
    Contacts(ContactsCommand),

    /// Manage medical records
    #[command(subcommand)]
    Medical(MedicalCommand),

    /// Manage doctors, pharmacies and other providers
    #[command(subcommand)]
    Providers(ProvidersCommand),

    /// Track where household members are during the week
    #[command(subcommand)]
    Routine(RoutineCommand),

    /// Manage evacuation meet-up points
    #[command(subcommand)]
    Evacuation(EvacuationCommand),

    /// Show database and catalog status
    Status(StatusCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                2 => crate::logging::Verbosity::Debug,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "preppy");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["preppy", "status"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["preppy", "-v", "status"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["preppy", "-vv", "status"]).verbosity(), Verbosity::Debug);
        assert_eq!(parse(&["preppy", "-vvvv", "status"]).verbosity(), Verbosity::Trace);
        assert_eq!(parse(&["preppy", "-q", "status"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["preppy", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_build() {
        let cli = parse(&[
            "preppy",
            "build",
            "--user",
            "1",
            "--kit",
            "go-bag",
            "water-uuid",
            "flashlight-uuid",
        ]);
        let Command::Build(cmd) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(cmd.user.user, 1);
        assert_eq!(cmd.kit, KitArg::GoBag);
        assert_eq!(cmd.keys, vec!["water-uuid", "flashlight-uuid"]);
    }

    #[test]
    fn test_parse_mark_without_keys() {
        let cli = parse(&["preppy", "mark", "-u", "3", "-k", "task"]);
        let Command::Mark(cmd) = cli.command else {
            panic!("expected mark");
        };
        assert!(cmd.keys.is_empty());
    }

    #[test]
    fn test_parse_unknown_kit_rejected() {
        let result = Cli::try_parse_from(["preppy", "checklist", "-u", "1", "-k", "bunker"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_user_required() {
        let result = Cli::try_parse_from(["preppy", "recommend", "--kit", "shelter"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_household_set() {
        let cli = parse(&[
            "preppy", "household", "set", "--user", "1", "--name", "Rivera", "--adults", "2",
            "--state", "CA",
        ]);
        let Command::Household(HouseholdCommand::Set(cmd)) = cli.command else {
            panic!("expected household set");
        };
        assert_eq!(cmd.form().state.as_deref(), Some("CA"));
        assert!(cmd.form().pets.is_none());
    }

    #[test]
    fn test_parse_custom_add() {
        let cli = parse(&["preppy", "custom", "add", "-u", "1", "-k", "shelter", "Tarp"]);
        assert!(matches!(
            cli.command,
            Command::Custom(CustomCommand::Add { ref name, .. }) if name == "Tarp"
        ));
    }

    #[test]
    fn test_parse_contacts_edit() {
        let cli = parse(&[
            "preppy", "contacts", "edit", "-u", "1", "4", "--phone", "555-0199",
        ]);
        let Command::Contacts(ContactsCommand::Edit { id, details, .. }) = cli.command else {
            panic!("expected contacts edit");
        };
        assert_eq!(id, 4);
        assert_eq!(details.phone.as_deref(), Some("555-0199"));
        assert!(details.first.is_none());
    }

    #[test]
    fn test_parse_medical_add() {
        let cli = parse(&[
            "preppy", "medical", "add", "-u", "2", "--first", "Ana", "--blood-type", "AB-",
        ]);
        let Command::Medical(MedicalCommand::Add { user, details }) = cli.command else {
            panic!("expected medical add");
        };
        assert_eq!(user.user, 2);
        assert_eq!(details.blood_type.as_deref(), Some("AB-"));
        assert!(details.allergies.is_none());
    }

    #[test]
    fn test_parse_providers_remove() {
        let cli = parse(&["preppy", "providers", "remove", "-u", "1", "7"]);
        assert!(matches!(
            cli.command,
            Command::Providers(ProvidersCommand::Remove { id: 7, .. })
        ));
    }

    #[test]
    fn test_parse_routine_add_event() {
        let cli = parse(&[
            "preppy",
            "routine",
            "add-event",
            "-u",
            "1",
            "--member",
            "3",
            "--title",
            "School",
            "--start-day",
            "2024-09-02",
            "--start-time",
            "08:00",
        ]);
        let Command::Routine(RoutineCommand::AddEvent { details, .. }) = cli.command else {
            panic!("expected routine add-event");
        };
        assert_eq!(details.member.as_deref(), Some("3"));
        assert_eq!(details.start_time.as_deref(), Some("08:00"));
        assert!(details.end_day.is_none());
    }

    #[test]
    fn test_parse_evacuation_add_negative_coordinates() {
        let cli = parse(&[
            "preppy", "evacuation", "add", "-u", "1", "--lat", "-33.9", "--lon", "-70.6",
        ]);
        let Command::Evacuation(EvacuationCommand::Add { lat, lon, title, .. }) = cli.command
        else {
            panic!("expected evacuation add");
        };
        assert!((lat + 33.9).abs() < f64::EPSILON);
        assert!((lon + 70.6).abs() < f64::EPSILON);
        assert_eq!(title, "");
    }

    #[test]
    fn test_parse_evacuation_set() {
        let cli = parse(&[
            "preppy",
            "evacuation",
            "set",
            "-u",
            "1",
            "-33.9,18.4,Beach",
            "37.77,-122.42",
        ]);
        let Command::Evacuation(EvacuationCommand::Set { points, .. }) = cli.command else {
            panic!("expected evacuation set");
        };
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].title, "Beach");
        assert_eq!(points[1].title, "");
    }

    #[test]
    fn test_parse_evacuation_set_rejects_bad_point() {
        let result = Cli::try_parse_from(["preppy", "evacuation", "set", "-u", "1", "north"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_catalog_load_default_dir() {
        let cli = parse(&["preppy", "catalog", "load"]);
        assert!(matches!(
            cli.command,
            Command::Catalog(CatalogCommand::Load { dir: None })
        ));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = parse(&["preppy", "config", "validate", "-f", "/tmp/x.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }
}
