//! `preppy` - A household emergency-preparedness planner
//!
//! This library recommends go-bag, shelter-in-place and task checklists from
//! a catalog of disasters, supplies and tasks, filtered to the people living
//! in a household and ranked by how likely each disaster is. It keeps each
//! user's kit selections and progress in `SQLite`, reconciling every
//! submitted checklist against what is stored in a single transaction.
//!
//! Alongside the kits it keeps the records a household needs in an
//! emergency: contacts, medical records, providers, a routine schedule of
//! where everyone usually is, and evacuation meet-up points.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod checklist;
pub mod cli;
pub mod config;
pub mod contacts;
pub mod error;
pub mod evacuation;
pub mod household;
pub mod kit;
pub mod logging;
pub mod medical;
pub mod providers;
pub mod recommend;
pub mod reconcile;
pub mod routine;
pub mod storage;

pub use catalog::Catalog;
pub use checklist::{Checklist, ChecklistEntry, CustomItem, VisibleItem};
pub use config::Config;
pub use contacts::{Contact, ContactDetails};
pub use error::{Error, Result};
pub use evacuation::{MeetupPlan, MeetupPoint};
pub use household::{HouseholdForm, HouseholdProfile};
pub use kit::KitType;
pub use logging::init_logging;
pub use medical::{MedicalDetails, MedicalRecord};
pub use providers::{Provider, ProviderDetails};
pub use recommend::Recommendation;
pub use reconcile::{Operation, Plan};
pub use routine::{Event, EventDetails, EventForm, Member};
pub use storage::{Storage, StorageStats};
