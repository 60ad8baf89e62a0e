//! `preppy` - CLI for the household emergency-preparedness planner
//!
//! This binary loads the catalog, manages household profiles and walks a
//! user through recommending, building and checking off their kits.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::Parser;
use serde::Serialize;
use tracing::error;

use preppy::cli::{
    BuildCommand, CatalogCommand, ChecklistCommand, Cli, Command, ConfigCommand, ContactsCommand,
    CustomCommand, EvacuationCommand, HouseholdCommand, MarkCommand, MedicalCommand,
    ProvidersCommand, RecommendCommand, RoutineCommand,
};
use preppy::routine::{member_name, DAY_FORMAT, TIME_FORMAT};
use preppy::{
    init_logging, Catalog, Checklist, Config, ContactDetails, CustomItem, Error, EventForm,
    KitType, MedicalDetails, MeetupPoint, ProviderDetails, Storage,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err
                .downcast_ref::<Error>()
                .is_some_and(Error::is_storage)
            {
                error!("Storage failure: {err:#}");
            }
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    let command = match cli.command {
        Command::Config(config_cmd) => return handle_config(&config, config_cmd),
        command => command,
    };

    let storage = Storage::open_configured(&config)?;
    match command {
        Command::Catalog(cmd) => handle_catalog(&storage, &config, cmd),
        Command::Household(cmd) => handle_household(&storage, &config, cmd),
        Command::Recommend(cmd) => handle_recommend(&storage, &cmd),
        Command::Build(cmd) => handle_build(&storage, &cmd),
        Command::Checklist(cmd) => handle_checklist(&storage, &cmd),
        Command::Mark(cmd) => handle_mark(&storage, &cmd),
        Command::Custom(cmd) => handle_custom(&storage, &config, cmd),
        Command::Contacts(cmd) => handle_contacts(&storage, &config, cmd),
        Command::Medical(cmd) => handle_medical(&storage, &config, cmd),
        Command::Providers(cmd) => handle_providers(&storage, &config, cmd),
        Command::Routine(cmd) => handle_routine(&storage, &config, cmd),
        Command::Evacuation(cmd) => handle_evacuation(&storage, &config, cmd),
        Command::Status(cmd) => handle_status(&storage, &config, cmd.json),
        Command::Config(_) => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_catalog(storage: &Storage, config: &Config, cmd: CatalogCommand) -> anyhow::Result<()> {
    match cmd {
        CatalogCommand::Load { dir } => {
            let dir = dir.unwrap_or_else(|| config.catalog_dir());
            let catalog = Catalog::load_dir(&dir)?;
            storage.load_catalog(&catalog)?;
            println!(
                "Loaded catalog from {}: {} disasters, {} states, {} supplies, {} tasks",
                dir.display(),
                catalog.disasters.len(),
                catalog.states.len(),
                catalog.supplies.len(),
                catalog.tasks.len()
            );
        }
        CatalogCommand::States { json } => {
            let states = storage.states()?;
            if json {
                print_json(&states)?;
            } else {
                for state in states {
                    println!("{:<4} {}", state.code, state.full_name);
                }
            }
        }
        CatalogCommand::Stats { json } => {
            let stats = storage.catalog_stats()?;
            if json {
                print_json(&stats)?;
            } else {
                println!("Disasters: {}", stats.disasters);
                println!("States:    {}", stats.states);
                println!("Supplies:  {}", stats.supplies);
                println!("Tasks:     {}", stats.tasks);
            }
        }
    }
    Ok(())
}

fn handle_household(
    storage: &Storage,
    config: &Config,
    cmd: HouseholdCommand,
) -> anyhow::Result<()> {
    match cmd {
        HouseholdCommand::Show { user, json } => match storage.household(user.user)? {
            Some(profile) if json => print_json(&profile)?,
            Some(profile) => {
                println!("The {} household", profile.last_name);
                println!("  Adults:        {}", profile.adults);
                println!("  Seniors:       {}", profile.seniors);
                println!("  Children:      {}", profile.children);
                println!("  Pets:          {}", profile.pets);
                println!(
                    "  State:         {}",
                    profile.state.as_deref().unwrap_or("(not set)")
                );
                println!("  Special needs: {}", profile.special_needs);
            }
            None => {
                return Err(Error::MissingHousehold { user_id: user.user }.into());
            }
        },
        HouseholdCommand::Set(cmd) => {
            let profile = storage.submit_household(cmd.user.user, &cmd.form(), &config.limits)?;
            println!(
                "Saved the {} household: {} people, {} pets, in {}",
                profile.last_name,
                profile.people(),
                profile.pets,
                profile.home_state()?
            );
        }
    }
    Ok(())
}

fn handle_recommend(storage: &Storage, cmd: &RecommendCommand) -> anyhow::Result<()> {
    let kit = KitType::from(cmd.kit);
    let rec = storage.recommend(cmd.user.user, kit)?;
    if cmd.json {
        return print_json(&rec);
    }

    println!("Recommended {} items", kit.label());
    for sit in &rec.sits {
        let marker = if sit.checked { "*" } else { " " };
        println!("{marker} {}: {}", sit.name, sit.items.join(", "));
    }
    println!();
    println!("Choose from:");
    for item in &rec.all_items {
        println!("  {:<38} {}", item.key, item.name);
    }
    println!();
    println!("* likely in your state");
    Ok(())
}

fn handle_build(storage: &Storage, cmd: &BuildCommand) -> anyhow::Result<()> {
    let kit = KitType::from(cmd.kit);
    let plan = storage.save_selection(cmd.user.user, kit, &cmd.keys)?;
    if plan.is_empty() {
        println!("{} unchanged.", kit.label());
    } else {
        println!(
            "{} saved: {} added, {} removed.",
            kit.label(),
            plan.inserts(),
            plan.deletes()
        );
    }
    Ok(())
}

fn handle_checklist(storage: &Storage, cmd: &ChecklistCommand) -> anyhow::Result<()> {
    let kit = KitType::from(cmd.kit);
    let checklist = storage.checklist(cmd.user.user, kit)?;
    if cmd.json {
        return print_json(&checklist);
    }

    match checklist {
        Checklist::NotBuilt => {
            println!(
                "Your {} has not been built yet. Run `preppy recommend --kit {kit}` and then `preppy build`.",
                kit.label()
            );
        }
        Checklist::Built(entries) => {
            println!("{}", kit.label());
            for entry in entries {
                let mark = if entry.acquired { "x" } else { " " };
                let custom = if entry.custom { " (custom)" } else { "" };
                println!("[{mark}] {}{custom}  {}", entry.name, entry.key);
            }
        }
    }
    Ok(())
}

fn handle_mark(storage: &Storage, cmd: &MarkCommand) -> anyhow::Result<()> {
    let kit = KitType::from(cmd.kit);
    storage.save_progress(cmd.user.user, kit, &cmd.keys)?;
    let checklist = storage.checklist(cmd.user.user, kit)?;
    let entries = checklist.entries();
    println!(
        "{}: {} of {} checked off.",
        kit.label(),
        entries.iter().filter(|e| e.acquired).count(),
        entries.len()
    );
    Ok(())
}

fn handle_custom(storage: &Storage, config: &Config, cmd: CustomCommand) -> anyhow::Result<()> {
    match cmd {
        CustomCommand::Add { user, kit, name } => {
            let kit = KitType::from(kit);
            let item = CustomItem::new(user.user, kit, &name, &config.limits)?;
            storage.add_custom_item(&item)?;
            println!("Added {} to your {} ({})", item.name, kit.label(), item.key);
        }
        CustomCommand::Remove { user, kit, key } => {
            let kit = KitType::from(kit);
            if storage.remove_item(user.user, kit, &key)? {
                println!("Removed {key} from your {}.", kit.label());
            } else {
                println!("{key} is not in your {}.", kit.label());
            }
        }
        CustomCommand::List { user, kit, json } => {
            let items = storage.custom_items(user.user, KitType::from(kit))?;
            if json {
                print_json(&items)?;
            } else {
                for item in items {
                    println!("{:<38} {}", item.key, item.name);
                }
            }
        }
    }
    Ok(())
}

fn handle_contacts(storage: &Storage, config: &Config, cmd: ContactsCommand) -> anyhow::Result<()> {
    match cmd {
        ContactsCommand::List { user, json } => {
            let contacts = storage.contacts(user.user)?;
            if json {
                print_json(&contacts)?;
            } else {
                for contact in contacts {
                    let details = &contact.details;
                    println!(
                        "{:>4}  {:<24} {:<16} {}",
                        contact.id,
                        details.display_name(),
                        details.phone,
                        details.email
                    );
                }
            }
        }
        ContactsCommand::Add { user, details } => {
            let details = details
                .apply_to(ContactDetails::default())
                .validated(&config.limits)?;
            let contact = storage.add_contact(user.user, &details)?;
            println!("Added contact {} ({})", details.display_name(), contact.id);
        }
        ContactsCommand::Edit { user, id, details } => {
            let existing = storage
                .contact(user.user, id)?
                .ok_or_else(|| anyhow!("no contact {id} for user {}", user.user))?;
            let details = details.apply_to(existing.details).validated(&config.limits)?;
            storage.update_contact(user.user, id, &details)?;
            println!("Updated contact {}", details.display_name());
        }
        ContactsCommand::Remove { user, id } => {
            if storage.delete_contact(user.user, id)? {
                println!("Removed contact {id}.");
            } else {
                return Err(anyhow!("no contact {id} for user {}", user.user));
            }
        }
    }
    Ok(())
}

fn handle_medical(storage: &Storage, config: &Config, cmd: MedicalCommand) -> anyhow::Result<()> {
    match cmd {
        MedicalCommand::List { user, json } => {
            let records = storage.medical_records(user.user)?;
            if json {
                print_json(&records)?;
            } else {
                for record in records {
                    let details = &record.details;
                    println!(
                        "{:>4}  {:<24} {:<8} {}",
                        record.id,
                        details.display_name(),
                        details.blood_type,
                        details.allergies
                    );
                }
            }
        }
        MedicalCommand::Add { user, details } => {
            let details = details
                .apply_to(MedicalDetails::default())
                .validated(&config.limits)?;
            let record = storage.add_medical_record(user.user, &details)?;
            println!(
                "Added medical record for {} ({})",
                details.display_name(),
                record.id
            );
        }
        MedicalCommand::Edit { user, id, details } => {
            let existing = storage
                .medical_record(user.user, id)?
                .ok_or_else(|| anyhow!("no medical record {id} for user {}", user.user))?;
            let details = details.apply_to(existing.details).validated(&config.limits)?;
            storage.update_medical_record(user.user, id, &details)?;
            println!("Updated medical record for {}", details.display_name());
        }
        MedicalCommand::Remove { user, id } => {
            if storage.delete_medical_record(user.user, id)? {
                println!("Removed medical record {id}.");
            } else {
                return Err(anyhow!("no medical record {id} for user {}", user.user));
            }
        }
    }
    Ok(())
}

fn handle_providers(
    storage: &Storage,
    config: &Config,
    cmd: ProvidersCommand,
) -> anyhow::Result<()> {
    match cmd {
        ProvidersCommand::List { user, json } => {
            let providers = storage.providers(user.user)?;
            if json {
                print_json(&providers)?;
            } else {
                for provider in providers {
                    let details = &provider.details;
                    println!(
                        "{:>4}  {:<24} {:<16} {}",
                        provider.id,
                        details.display_name(),
                        details.phone,
                        details.patient
                    );
                }
            }
        }
        ProvidersCommand::Add { user, details } => {
            let details = details
                .apply_to(ProviderDetails::default())
                .validated(&config.limits)?;
            let provider = storage.add_provider(user.user, &details)?;
            println!("Added provider {} ({})", details.display_name(), provider.id);
        }
        ProvidersCommand::Edit { user, id, details } => {
            let existing = storage
                .provider(user.user, id)?
                .ok_or_else(|| anyhow!("no provider {id} for user {}", user.user))?;
            let details = details.apply_to(existing.details).validated(&config.limits)?;
            storage.update_provider(user.user, id, &details)?;
            println!("Updated provider {}", details.display_name());
        }
        ProvidersCommand::Remove { user, id } => {
            if storage.delete_provider(user.user, id)? {
                println!("Removed provider {id}.");
            } else {
                return Err(anyhow!("no provider {id} for user {}", user.user));
            }
        }
    }
    Ok(())
}

fn handle_routine(storage: &Storage, config: &Config, cmd: RoutineCommand) -> anyhow::Result<()> {
    match cmd {
        RoutineCommand::Members { user, json } => {
            let members = storage.members(user.user)?;
            if json {
                print_json(&members)?;
            } else {
                for member in members {
                    println!("{:>4}  {}", member.id, member.name);
                }
            }
        }
        RoutineCommand::AddMember { user, name } => {
            let name = member_name(&name, &config.limits)?;
            let member = storage.add_member(user.user, &name)?;
            println!("Added {} to your schedule ({})", member.name, member.id);
        }
        RoutineCommand::RemoveMember { user, id } => {
            if storage.remove_member(user.user, id)? {
                println!("Removed member {id} and their events.");
            } else {
                return Err(anyhow!("no member {id} for user {}", user.user));
            }
        }
        RoutineCommand::Events { user, json } => {
            let events = storage.events(user.user)?;
            if json {
                print_json(&events)?;
            } else {
                let members = storage.members(user.user)?;
                for event in events {
                    let details = &event.details;
                    let who = members
                        .iter()
                        .find(|m| m.id == details.member_id)
                        .map_or("?", |m| m.name.as_str());
                    println!(
                        "{:>4}  {} {} - {} {}  {:<12} {}  @ {}",
                        event.id,
                        details.start_day.format(DAY_FORMAT),
                        details.start_time.format(TIME_FORMAT),
                        details.end_day.format(DAY_FORMAT),
                        details.end_time.format(TIME_FORMAT),
                        who,
                        details.title,
                        details.address
                    );
                }
            }
        }
        RoutineCommand::AddEvent { user, details } => {
            let details = details
                .apply_to(EventForm::default())
                .validate(&config.limits)?;
            let event = storage.add_event(user.user, &details)?;
            println!("Added event {} ({})", details.title, event.id);
        }
        RoutineCommand::EditEvent { user, id, details } => {
            let existing = storage
                .event(user.user, id)?
                .ok_or_else(|| anyhow!("no event {id} for user {}", user.user))?;
            let details = details
                .apply_to(EventForm::from(&existing.details))
                .validate(&config.limits)?;
            storage.update_event(user.user, id, &details)?;
            println!("Updated event {}", details.title);
        }
        RoutineCommand::RemoveEvent { user, id } => {
            if storage.delete_event(user.user, id)? {
                println!("Removed event {id}.");
            } else {
                return Err(anyhow!("no event {id} for user {}", user.user));
            }
        }
    }
    Ok(())
}

fn handle_evacuation(
    storage: &Storage,
    config: &Config,
    cmd: EvacuationCommand,
) -> anyhow::Result<()> {
    match cmd {
        EvacuationCommand::List { user, json } => {
            let points = storage.meetup_points(user.user)?;
            if json {
                print_json(&points)?;
            } else {
                for point in points {
                    println!("{point}");
                }
            }
        }
        EvacuationCommand::Add {
            user,
            lat,
            lon,
            title,
        } => {
            let point = MeetupPoint {
                latitude: lat,
                longitude: lon,
                title,
            }
            .validated(&config.limits)?;
            storage.add_meetup_point(user.user, &point)?;
            println!("Saved meet-up point {point}");
        }
        EvacuationCommand::Remove { user, lat, lon } => {
            // Same -0.0 folding as `MeetupPoint::validated`.
            if storage.remove_meetup_point(user.user, lat + 0.0, lon + 0.0)? {
                println!("Removed meet-up point {lat},{lon}.");
            } else {
                return Err(anyhow!(
                    "no meet-up point at {lat},{lon} for user {}",
                    user.user
                ));
            }
        }
        EvacuationCommand::Set { user, points } => {
            let points = points
                .into_iter()
                .map(|point| point.validated(&config.limits))
                .collect::<preppy::Result<Vec<_>>>()?;
            let plan = storage.save_meetup_points(user.user, &points)?;
            if plan.is_empty() {
                println!("Meet-up points unchanged.");
            } else {
                println!(
                    "Meet-up points saved: {} added, {} removed, {} retitled.",
                    plan.add.len(),
                    plan.remove.len(),
                    plan.retitle.len()
                );
            }
        }
    }
    Ok(())
}

fn handle_status(storage: &Storage, config: &Config, json: bool) -> anyhow::Result<()> {
    let stats = storage.stats()?;
    let catalog = storage.catalog_stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "catalog_dir": config.catalog_dir(),
            "storage": stats,
            "catalog": catalog,
        });
        return print_json(&status);
    }

    println!("preppy status");
    println!("-------------");
    println!("Database:      {}", storage.path().display());
    println!("Schema:        v{}", stats.schema_version);
    println!("Size:          {} bytes", stats.db_size_bytes);
    if catalog.is_empty() {
        println!(
            "Catalog:       not loaded (run `preppy catalog load`, default {})",
            config.catalog_dir().display()
        );
    } else {
        println!(
            "Catalog:       {} disasters, {} supplies, {} tasks",
            catalog.disasters, catalog.supplies, catalog.tasks
        );
    }
    println!("Households:    {}", stats.households);
    println!("Selections:    {}", stats.selections);
    println!("Custom items:  {}", stats.custom_items);
    println!("Contacts:      {}", stats.contacts);
    println!("Medical:       {}", stats.medical_records);
    println!("Providers:     {}", stats.providers);
    println!("Events:        {}", stats.routine_events);
    println!("Meet-up points: {}", stats.meetup_points);
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                print_json(config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Busy timeout (ms):  {}", config.storage.busy_timeout_ms);
                println!();
                println!("[Catalog]");
                println!("  Data directory:     {}", config.catalog_dir().display());
                println!();
                println!("[Limits]");
                println!("  Max name length:    {}", config.limits.max_name_length);
                println!(
                    "  Max household count: {}",
                    config.limits.max_household_count
                );
                println!("  Max note length:    {}", config.limits.max_note_length);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use preppy::cli::{KitArg, UserArg};

    fn storage_with_catalog() -> Storage {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("sits.csv", "id,sit,probability\n1,Flood,2\n2,Earthquake,1\n"),
            ("states.csv", "id,state,full_name\n1,CA,California\n"),
            (
                "supplies.csv",
                "id,uuid,item,per_person,gobag,shelter,adult,senior,child,pet\n\
                 1,water-uuid,Water,1,yes,yes,yes,yes,yes,no\n\
                 2,flashlight-uuid,Flashlight,,yes,no,yes,no,no,no\n",
            ),
            ("tasks.csv", "id,key,task,description\n1,plan-uuid,Make a plan,\n"),
            ("disastersupplies.csv", "disaster_id,supply_id\n1,1\n2,1\n2,2\n"),
            ("disastertasks.csv", "disaster_id,task_id\n2,1\n"),
            ("statedisasters.csv", "state_id,disaster_id\n1,2\n"),
        ];
        for (name, contents) in files {
            std::fs::write(dir.path().join(name), contents).unwrap();
        }

        let storage = Storage::open_in_memory().unwrap();
        let config = Config::default();
        handle_catalog(
            &storage,
            &config,
            CatalogCommand::Load {
                dir: Some(dir.path().to_path_buf()),
            },
        )
        .unwrap();
        storage
    }

    fn user() -> UserArg {
        UserArg { user: 1 }
    }

    #[test]
    fn test_recommend_requires_household() {
        let storage = storage_with_catalog();
        let cmd = RecommendCommand {
            user: user(),
            kit: KitArg::GoBag,
            json: false,
        };
        let err = handle_recommend(&storage, &cmd).unwrap_err();
        assert!(err
            .downcast_ref::<Error>()
            .is_some_and(Error::is_missing_household));
    }

    #[test]
    fn test_build_and_mark_flow() {
        let storage = storage_with_catalog();
        let config = Config::default();
        let cli = Cli::try_parse_from([
            "preppy", "household", "set", "-u", "1", "--name", "Rivera", "--adults", "1",
            "--seniors", "0", "--children", "0", "--pets", "0", "--state", "ca", "--special",
            "No",
        ])
        .unwrap();
        let Command::Household(cmd) = cli.command else {
            panic!("expected household command");
        };
        handle_household(&storage, &config, cmd).unwrap();

        handle_recommend(
            &storage,
            &RecommendCommand {
                user: user(),
                kit: KitArg::GoBag,
                json: true,
            },
        )
        .unwrap();
        handle_build(
            &storage,
            &BuildCommand {
                user: user(),
                kit: KitArg::GoBag,
                keys: vec!["water-uuid".to_string(), "flashlight-uuid".to_string()],
            },
        )
        .unwrap();
        handle_mark(
            &storage,
            &MarkCommand {
                user: user(),
                kit: KitArg::GoBag,
                keys: vec!["water-uuid".to_string()],
            },
        )
        .unwrap();

        assert_eq!(storage.acquired_keys(1, KitType::GoBag).unwrap().len(), 1);
        handle_checklist(
            &storage,
            &ChecklistCommand {
                user: user(),
                kit: KitArg::GoBag,
                json: false,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_contacts_edit_missing_contact() {
        let storage = storage_with_catalog();
        let err = handle_contacts(
            &storage,
            &Config::default(),
            ContactsCommand::Edit {
                user: user(),
                id: 99,
                details: preppy::cli::ContactArgs::default(),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("no contact 99"));
    }

    #[test]
    fn test_contacts_add_validates() {
        let storage = storage_with_catalog();
        let err = handle_contacts(
            &storage,
            &Config::default(),
            ContactsCommand::Add {
                user: user(),
                details: preppy::cli::ContactArgs::default(),
            },
        )
        .unwrap_err();
        assert!(err.downcast_ref::<Error>().is_some_and(Error::is_validation));
        assert!(storage.contacts(1).unwrap().is_empty());
    }

    #[test]
    fn test_medical_add_requires_blood_type() {
        let storage = Storage::open_in_memory().unwrap();
        let config = Config::default();
        let details = preppy::cli::MedicalArgs {
            first: Some("Ana".to_string()),
            ..Default::default()
        };
        let err = handle_medical(
            &storage,
            &config,
            MedicalCommand::Add {
                user: user(),
                details: details.clone(),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("blood type"));

        let details = preppy::cli::MedicalArgs {
            blood_type: Some("ab-".to_string()),
            ..details
        };
        handle_medical(&storage, &config, MedicalCommand::Add { user: user(), details }).unwrap();
        assert_eq!(storage.medical_records(1).unwrap()[0].details.blood_type, "AB-");
    }

    #[test]
    fn test_providers_edit_keeps_other_fields() {
        let storage = Storage::open_in_memory().unwrap();
        let config = Config::default();
        let added = storage
            .add_provider(
                1,
                &ProviderDetails {
                    last_name: "Osei".to_string(),
                    phone: "555-0142".to_string(),
                    address: "12 Main St".to_string(),
                    ..ProviderDetails::default()
                },
            )
            .unwrap();

        handle_providers(
            &storage,
            &config,
            ProvidersCommand::Edit {
                user: user(),
                id: added.id,
                details: preppy::cli::ProviderArgs {
                    patient: Some("Ana".to_string()),
                    ..Default::default()
                },
            },
        )
        .unwrap();
        let loaded = storage.provider(1, added.id).unwrap().unwrap();
        assert_eq!(loaded.details.patient, "Ana");
        assert_eq!(loaded.details.phone, "555-0142");
    }

    #[test]
    fn test_routine_event_flow() {
        let storage = Storage::open_in_memory().unwrap();
        let config = Config::default();
        handle_routine(
            &storage,
            &config,
            RoutineCommand::AddMember {
                user: user(),
                name: "  Ana ".to_string(),
            },
        )
        .unwrap();
        let member = storage.members(1).unwrap().remove(0);
        assert_eq!(member.name, "Ana");

        let cli = Cli::try_parse_from([
            "preppy",
            "routine",
            "add-event",
            "-u",
            "1",
            "--member",
            &member.id.to_string(),
            "--title",
            "School",
            "--start-day",
            "2024-09-02",
            "--start-time",
            "08:00",
            "--end-day",
            "2024-09-02",
            "--end-time",
            "15:00",
            "--address",
            "40 Oak Ave",
        ])
        .unwrap();
        let Command::Routine(cmd) = cli.command else {
            panic!("expected routine command");
        };
        handle_routine(&storage, &config, cmd).unwrap();
        let event = storage.events(1).unwrap().remove(0);

        let err = handle_routine(
            &storage,
            &config,
            RoutineCommand::EditEvent {
                user: user(),
                id: event.id,
                details: preppy::cli::EventArgs {
                    end_time: Some("07:00".to_string()),
                    ..Default::default()
                },
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("cannot end before it starts"));

        handle_routine(
            &storage,
            &config,
            RoutineCommand::RemoveMember {
                user: user(),
                id: member.id,
            },
        )
        .unwrap();
        assert!(storage.events(1).unwrap().is_empty());
    }

    #[test]
    fn test_evacuation_set_validates_every_point() {
        let storage = Storage::open_in_memory().unwrap();
        let config = Config::default();
        let point = |latitude, longitude| MeetupPoint {
            latitude,
            longitude,
            title: String::new(),
        };

        let err = handle_evacuation(
            &storage,
            &config,
            EvacuationCommand::Set {
                user: user(),
                points: vec![point(10.0, 10.0), point(95.0, 10.0)],
            },
        )
        .unwrap_err();
        assert!(err.downcast_ref::<Error>().is_some_and(Error::is_validation));
        assert!(storage.meetup_points(1).unwrap().is_empty());

        handle_evacuation(
            &storage,
            &config,
            EvacuationCommand::Set {
                user: user(),
                points: vec![point(-0.0, 10.0)],
            },
        )
        .unwrap();
        handle_evacuation(
            &storage,
            &config,
            EvacuationCommand::Remove {
                user: user(),
                lat: -0.0,
                lon: 10.0,
            },
        )
        .unwrap();
        assert!(storage.meetup_points(1).unwrap().is_empty());
    }

    #[test]
    fn test_status_runs_without_catalog() {
        let storage = Storage::open_in_memory().unwrap();
        handle_status(&storage, &Config::default(), true).unwrap();
    }
}
