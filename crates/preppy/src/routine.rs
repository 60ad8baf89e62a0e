//! Routine schedule: where each household member usually is, and when.
//!
//! Knowing who is at work, school or practice at a given hour tells a
//! household where everyone will be when something happens.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;
use crate::error::{Error, Result};

/// Format accepted for event days.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Format accepted for event times.
pub const TIME_FORMAT: &str = "%H:%M";

/// A household member shown on the routine schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Row id.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Display name.
    pub name: String,
}

/// Trim and check a member name.
///
/// # Errors
///
/// Returns `Error::Validation` if the name is blank or too long.
pub fn member_name(name: &str, limits: &LimitsConfig) -> Result<String> {
    let name = name.trim();
    let mut violations = Vec::new();
    if name.is_empty() {
        violations.push("Please enter a name.".to_string());
    }
    violations.extend(limits.name_violations(&[("Name", name)]));
    Error::check(violations)?;
    Ok(name.to_string())
}

/// A stored routine event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Row id.
    pub id: i64,
    /// Event fields.
    #[serde(flatten)]
    pub details: EventDetails,
}

/// A validated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Member the event belongs to.
    pub member_id: i64,
    /// Short title, may be empty.
    pub title: String,
    /// First day.
    pub start_day: NaiveDate,
    /// Start time on the first day.
    pub start_time: NaiveTime,
    /// Last day.
    pub end_day: NaiveDate,
    /// End time on the last day.
    pub end_time: NaiveTime,
    /// Where the member is during the event.
    pub address: String,
    /// Free-text notes.
    pub description: String,
}

impl EventDetails {
    /// When the event starts.
    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        self.start_day.and_time(self.start_time)
    }

    /// When the event ends.
    #[must_use]
    pub fn end(&self) -> NaiveDateTime {
        self.end_day.and_time(self.end_time)
    }
}

/// Raw event input, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventForm {
    /// Member id, as entered.
    pub member: Option<String>,
    /// Title.
    pub title: Option<String>,
    /// First day, `YYYY-MM-DD`.
    pub start_day: Option<String>,
    /// Start time, `HH:MM`.
    pub start_time: Option<String>,
    /// Last day, `YYYY-MM-DD`.
    pub end_day: Option<String>,
    /// End time, `HH:MM`.
    pub end_time: Option<String>,
    /// Address.
    pub address: Option<String>,
    /// Notes.
    pub description: Option<String>,
}

impl From<&EventDetails> for EventForm {
    fn from(details: &EventDetails) -> Self {
        Self {
            member: Some(details.member_id.to_string()),
            title: Some(details.title.clone()),
            start_day: Some(details.start_day.format(DAY_FORMAT).to_string()),
            start_time: Some(details.start_time.format(TIME_FORMAT).to_string()),
            end_day: Some(details.end_day.format(DAY_FORMAT).to_string()),
            end_time: Some(details.end_time.format(TIME_FORMAT).to_string()),
            address: Some(details.address.clone()),
            description: Some(details.description.clone()),
        }
    }
}

impl EventForm {
    /// Validate the form.
    ///
    /// Member, both days, both times and the address are required. Days and
    /// times must parse, and the event may not end before it starts. Whether
    /// the member belongs to the user is checked when the event is stored.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` listing every violation found.
    pub fn validate(&self, limits: &LimitsConfig) -> Result<EventDetails> {
        let mut violations = Vec::new();

        let member = required(self.member.as_deref(), "Member", &mut violations);
        let start_day = required(self.start_day.as_deref(), "Start day", &mut violations);
        let start_time = required(self.start_time.as_deref(), "Start time", &mut violations);
        let end_day = required(self.end_day.as_deref(), "End day", &mut violations);
        let end_time = required(self.end_time.as_deref(), "End time", &mut violations);
        let address = required(self.address.as_deref(), "Address", &mut violations);
        let title = trimmed(self.title.as_deref());
        let description = trimmed(self.description.as_deref());

        let member_id = member.and_then(|raw| match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                violations.push("Invalid member id.".to_string());
                None
            }
        });
        let start_day = start_day.and_then(|raw| parse_day(raw, "Start day", &mut violations));
        let end_day = end_day.and_then(|raw| parse_day(raw, "End day", &mut violations));
        let start_time =
            start_time.and_then(|raw| parse_time(raw, "Start time", &mut violations));
        let end_time = end_time.and_then(|raw| parse_time(raw, "End time", &mut violations));

        violations.extend(limits.name_violations(&[
            ("Title", title),
            ("Address", address.unwrap_or_default()),
        ]));
        violations.extend(limits.note_violations(&[("Description", description)]));

        let (
            Some(member_id),
            Some(start_day),
            Some(start_time),
            Some(end_day),
            Some(end_time),
            Some(address),
        ) = (member_id, start_day, start_time, end_day, end_time, address)
        else {
            return Err(Error::Validation { violations });
        };

        let details = EventDetails {
            member_id,
            title: title.to_string(),
            start_day,
            start_time,
            end_day,
            end_time,
            address: address.to_string(),
            description: description.to_string(),
        };
        if details.end() < details.start() {
            violations.push("An event cannot end before it starts.".to_string());
        }

        Error::check(violations)?;
        Ok(details)
    }
}

fn trimmed(value: Option<&str>) -> &str {
    value.map_or("", str::trim)
}

fn required<'a>(
    value: Option<&'a str>,
    label: &str,
    violations: &mut Vec<String>,
) -> Option<&'a str> {
    let value = trimmed(value);
    if value.is_empty() {
        violations.push(format!("{label} is required."));
        None
    } else {
        Some(value)
    }
}

fn parse_day(raw: &str, label: &str, violations: &mut Vec<String>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .map_err(|_| violations.push(format!("{label} must be a date like 2024-05-01.")))
        .ok()
}

fn parse_time(raw: &str, label: &str, violations: &mut Vec<String>) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .map_err(|_| violations.push(format!("{label} must be a time like 08:30.")))
        .ok()
}
