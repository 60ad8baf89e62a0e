//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::contacts::ContactDetails;
use crate::evacuation::MeetupPoint;
use crate::household::HouseholdForm;
use crate::kit::KitType;
use crate::medical::MedicalDetails;
use crate::providers::ProviderDetails;
use crate::routine::EventForm;

/// The user a command acts for.
#[derive(Debug, Clone, Copy, Args)]
pub struct UserArg {
    /// User id
    #[arg(short, long, value_name = "ID")]
    pub user: i64,
}

/// Kit argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KitArg {
    /// Evacuation go-bag
    GoBag,
    /// Shelter-in-place supplies
    Shelter,
    /// Preparedness tasks
    Task,
}

impl From<KitArg> for KitType {
    fn from(arg: KitArg) -> Self {
        match arg {
            KitArg::GoBag => Self::GoBag,
            KitArg::Shelter => Self::Shelter,
            KitArg::Task => Self::Task,
        }
    }
}

/// Catalog commands.
#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Replace the catalog with the CSV files in a directory
    Load {
        /// Catalog directory (defaults to the configured one)
        dir: Option<PathBuf>,
    },

    /// List known states
    States {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show catalog row counts
    Stats {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Household commands.
#[derive(Debug, Subcommand)]
pub enum HouseholdCommand {
    /// Show a household profile
    Show {
        /// User the command acts for
        #[command(flatten)]
        user: UserArg,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Create or replace a household profile
    Set(HouseholdSetCommand),
}

/// Household profile fields, as entered.
#[derive(Debug, Args)]
pub struct HouseholdSetCommand {
    /// User the command acts for
    #[command(flatten)]
    pub user: UserArg,

    /// Household last name
    #[arg(long)]
    pub name: Option<String>,

    /// Number of adults
    #[arg(long)]
    pub adults: Option<String>,

    /// Number of seniors
    #[arg(long)]
    pub seniors: Option<String>,

    /// Number of children
    #[arg(long)]
    pub children: Option<String>,

    /// Number of pets
    #[arg(long)]
    pub pets: Option<String>,

    /// Home state code, e.g. CA
    #[arg(long)]
    pub state: Option<String>,

    /// Special needs note
    #[arg(long)]
    pub special: Option<String>,
}

impl HouseholdSetCommand {
    /// The raw form to validate.
    #[must_use]
    pub fn form(&self) -> HouseholdForm {
        HouseholdForm {
            name: self.name.clone(),
            adults: self.adults.clone(),
            seniors: self.seniors.clone(),
            children: self.children.clone(),
            pets: self.pets.clone(),
            state: self.state.clone(),
            special: self.special.clone(),
        }
    }
}

/// Recommend command arguments.
#[derive(Debug, Args)]
pub struct RecommendCommand {
    /// User the command acts for
    #[command(flatten)]
    pub user: UserArg,

    /// Kit to recommend items for
    #[arg(short, long, value_enum)]
    pub kit: KitArg,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Build command arguments.
#[derive(Debug, Args)]
pub struct BuildCommand {
    /// User the command acts for
    #[command(flatten)]
    pub user: UserArg,

    /// Kit to build
    #[arg(short, long, value_enum)]
    pub kit: KitArg,

    /// Every catalog item key the kit should contain
    #[arg(value_name = "KEY")]
    pub keys: Vec<String>,
}

/// Checklist command arguments.
#[derive(Debug, Args)]
pub struct ChecklistCommand {
    /// User the command acts for
    #[command(flatten)]
    pub user: UserArg,

    /// Kit to show
    #[arg(short, long, value_enum)]
    pub kit: KitArg,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Mark command arguments.
#[derive(Debug, Args)]
pub struct MarkCommand {
    /// User the command acts for
    #[command(flatten)]
    pub user: UserArg,

    /// Kit to update
    #[arg(short, long, value_enum)]
    pub kit: KitArg,

    /// Every item key that is acquired or done; the rest are cleared
    #[arg(value_name = "KEY")]
    pub keys: Vec<String>,
}

/// Custom item commands.
#[derive(Debug, Subcommand)]
pub enum CustomCommand {
    /// Add an item of your own to a kit
    Add {
        /// User the command acts for
        #[command(flatten)]
        user: UserArg,

        /// Kit to add to
        #[arg(short, long, value_enum)]
        kit: KitArg,

        /// Item name
        name: String,
    },

    /// Remove an item (custom or catalog) from a kit
    Remove {
        /// User the command acts for
        #[command(flatten)]
        user: UserArg,

        /// Kit to remove from
        #[arg(short, long, value_enum)]
        kit: KitArg,

        /// Item key
        key: String,
    },

    /// List your custom items for a kit
    List {
        /// User the command acts for
        #[command(flatten)]
        user: UserArg,

        /// Kit to list
        #[arg(short, long, value_enum)]
        kit: KitArg,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Contact fields; omitted fields are left unchanged on edit.
#[derive(Debug, Clone, Default, Args)]
pub struct ContactArgs {
    /// First name
    #[arg(long)]
    pub first: Option<String>,

    /// Last name
    #[arg(long)]
    pub last: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,
}

impl ContactArgs {
    /// Overlay the given fields on existing details.
    #[must_use]
    pub fn apply_to(&self, mut details: ContactDetails) -> ContactDetails {
        let fields = [
            (&self.first, &mut details.first_name),
            (&self.last, &mut details.last_name),
            (&self.phone, &mut details.phone),
            (&self.email, &mut details.email),
            (&self.address, &mut details.address),
        ];
        for (given, field) in fields {
            if let Some(value) = given {
                field.clone_from(value);
            }
        }
        details
    }
}

/// Emergency contact commands.
#[derive(Debug, Subcommand)]
pub enum ContactsCommand {
    /// List contacts
    List {
        /// User the command acts for
        #[command(flatten)]
        user: UserArg,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add a contact
    Add {
        /// User the command acts for
        #[command(flatten)]
        user: UserArg,

        /// Contact fields
        #[command(flatten)]
        details: ContactArgs,
    },

    /// Change some fields of a contact
    Edit {
        /// User the command acts for
        #[command(flatten)]
        user: UserArg,

        /// Contact id
        id: i64,

        /// Fields to change
        #[command(flatten)]
        details: ContactArgs,
    },

    /// Remove a contact
    Remove {
        /// User the command acts for
        #[command(flatten)]
        user: UserArg,

        /// Contact id
        id: i64,
    },
}

/// Medical record fields; omitted fields are left unchanged on edit.
#[derive(Debug, Clone, Default, Args)]
pub struct MedicalArgs {
    /// First name
    #[arg(long)]
    pub first: Option<String>,

    /// Last name
    #[arg(long)]
    pub last: Option<String>,

    /// Blood type, e.g. O+ or Unknown
    #[arg(long)]
    pub blood_type: Option<String>,

    /// Current medications
    #[arg(long)]
    pub medications: Option<String>,

    /// Known allergies
    #[arg(long)]
    pub allergies: Option<String>,

    /// Anything else worth knowing
    #[arg(long)]
    pub other: Option<String>,

    /// Insurance carrier
    #[arg(long)]
    pub insurance: Option<String>,

    /// Insurance policy number
    #[arg(long)]
    pub policy: Option<String>,
}

impl MedicalArgs {
    /// Overlay the given fields on an existing record.
    #[must_use]
    pub fn apply_to(&self, mut details: MedicalDetails) -> MedicalDetails {
        let fields = [
            (&self.first, &mut details.first_name),
            (&self.last, &mut details.last_name),
            (&self.blood_type, &mut details.blood_type),
            (&self.medications, &mut details.medications),
            (&self.allergies, &mut details.allergies),
            (&self.other, &mut details.other),
            (&self.insurance, &mut details.insurance),
            (&self.policy, &mut details.policy),
        ];
        for (given, field) in fields {
            if let Some(value) = given {
                field.clone_from(value);
            }
        }
        details
    }
}

/// Medical record commands.
#[derive(Debug, Subcommand)]
pub enum MedicalCommand {
    /// List medical records
    List {
        /// User whose records to list
        #[command(flatten)]
        user: UserArg,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add a medical record
    Add {
        /// User the record belongs to
        #[command(flatten)]
        user: UserArg,

        /// Record fields
        #[command(flatten)]
        details: MedicalArgs,
    },

    /// Change some fields of a medical record
    Edit {
        /// User the record belongs to
        #[command(flatten)]
        user: UserArg,

        /// Record id
        id: i64,

        /// Fields to change
        #[command(flatten)]
        details: MedicalArgs,
    },

    /// Remove a medical record
    Remove {
        /// User the record belongs to
        #[command(flatten)]
        user: UserArg,

        /// Record id
        id: i64,
    },
}

/// Provider fields; omitted fields are left unchanged on edit.
#[derive(Debug, Clone, Default, Args)]
pub struct ProviderArgs {
    /// First name
    #[arg(long)]
    pub first: Option<String>,

    /// Last name or practice name
    #[arg(long)]
    pub last: Option<String>,

    /// Household member the provider sees
    #[arg(long)]
    pub patient: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Office address
    #[arg(long)]
    pub address: Option<String>,
}

impl ProviderArgs {
    /// Overlay the given fields on existing details.
    #[must_use]
    pub fn apply_to(&self, mut details: ProviderDetails) -> ProviderDetails {
        let fields = [
            (&self.first, &mut details.first_name),
            (&self.last, &mut details.last_name),
            (&self.patient, &mut details.patient),
            (&self.phone, &mut details.phone),
            (&self.address, &mut details.address),
        ];
        for (given, field) in fields {
            if let Some(value) = given {
                field.clone_from(value);
            }
        }
        details
    }
}

/// Medical provider commands.
#[derive(Debug, Subcommand)]
pub enum ProvidersCommand {
    /// List providers
    List {
        /// User whose providers to list
        #[command(flatten)]
        user: UserArg,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add a provider
    Add {
        /// User the provider belongs to
        #[command(flatten)]
        user: UserArg,

        /// Provider fields
        #[command(flatten)]
        details: ProviderArgs,
    },

    /// Change some fields of a provider
    Edit {
        /// User the provider belongs to
        #[command(flatten)]
        user: UserArg,

        /// Provider id
        id: i64,

        /// Fields to change
        #[command(flatten)]
        details: ProviderArgs,
    },

    /// Remove a provider
    Remove {
        /// User the provider belongs to
        #[command(flatten)]
        user: UserArg,

        /// Provider id
        id: i64,
    },
}

/// Event fields; omitted fields are left unchanged on edit.
#[derive(Debug, Clone, Default, Args)]
pub struct EventArgs {
    /// Member id the event belongs to
    #[arg(long)]
    pub member: Option<String>,

    /// Short title
    #[arg(long)]
    pub title: Option<String>,

    /// First day, YYYY-MM-DD
    #[arg(long)]
    pub start_day: Option<String>,

    /// Start time, HH:MM
    #[arg(long)]
    pub start_time: Option<String>,

    /// Last day, YYYY-MM-DD
    #[arg(long)]
    pub end_day: Option<String>,

    /// End time, HH:MM
    #[arg(long)]
    pub end_time: Option<String>,

    /// Where the member is
    #[arg(long)]
    pub address: Option<String>,

    /// Notes
    #[arg(long)]
    pub description: Option<String>,
}

impl EventArgs {
    /// Overlay the given fields on an existing form.
    #[must_use]
    pub fn apply_to(&self, mut form: EventForm) -> EventForm {
        let fields = [
            (&self.member, &mut form.member),
            (&self.title, &mut form.title),
            (&self.start_day, &mut form.start_day),
            (&self.start_time, &mut form.start_time),
            (&self.end_day, &mut form.end_day),
            (&self.end_time, &mut form.end_time),
            (&self.address, &mut form.address),
            (&self.description, &mut form.description),
        ];
        for (given, field) in fields {
            if given.is_some() {
                field.clone_from(given);
            }
        }
        form
    }
}

/// Routine schedule commands.
#[derive(Debug, Subcommand)]
pub enum RoutineCommand {
    /// List household members on the schedule
    Members {
        /// User whose members to list
        #[command(flatten)]
        user: UserArg,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add a household member to the schedule
    AddMember {
        /// User the member belongs to
        #[command(flatten)]
        user: UserArg,

        /// Member name
        name: String,
    },

    /// Remove a member and their events
    RemoveMember {
        /// User the member belongs to
        #[command(flatten)]
        user: UserArg,

        /// Member id
        id: i64,
    },

    /// List scheduled events
    Events {
        /// User whose events to list
        #[command(flatten)]
        user: UserArg,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add an event
    AddEvent {
        /// User the event belongs to
        #[command(flatten)]
        user: UserArg,

        /// Event fields
        #[command(flatten)]
        details: EventArgs,
    },

    /// Change some fields of an event
    EditEvent {
        /// User the event belongs to
        #[command(flatten)]
        user: UserArg,

        /// Event id
        id: i64,

        /// Fields to change
        #[command(flatten)]
        details: EventArgs,
    },

    /// Remove an event
    RemoveEvent {
        /// User the event belongs to
        #[command(flatten)]
        user: UserArg,

        /// Event id
        id: i64,
    },
}

/// Evacuation meet-up point commands.
#[derive(Debug, Subcommand)]
pub enum EvacuationCommand {
    /// List meet-up points
    List {
        /// User whose points to list
        #[command(flatten)]
        user: UserArg,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add a meet-up point, or retitle the one at those coordinates
    Add {
        /// User the point belongs to
        #[command(flatten)]
        user: UserArg,

        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Label, e.g. "Library parking lot"
        #[arg(long, default_value = "")]
        title: String,
    },

    /// Remove the meet-up point at the given coordinates
    Remove {
        /// User the point belongs to
        #[command(flatten)]
        user: UserArg,

        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Replace every meet-up point; points not listed are removed
    Set {
        /// User the points belong to
        #[command(flatten)]
        user: UserArg,

        /// Points as LAT,LON or LAT,LON,TITLE
        #[arg(value_name = "POINT", value_parser = parse_point, allow_hyphen_values = true)]
        points: Vec<MeetupPoint>,
    },
}

fn parse_point(raw: &str) -> Result<MeetupPoint, String> {
    raw.parse().map_err(|err: crate::Error| err.to_string())
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
