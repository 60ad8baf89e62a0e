//! Evacuation meet-up points.
//!
//! A point is identified by its coordinates; the title is a label that can
//! change without moving the point.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;
use crate::error::{Error, Result};

/// A place the household agrees to meet after evacuating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetupPoint {
    /// Degrees north, -90 to 90.
    pub latitude: f64,
    /// Degrees east, -180 to 180.
    pub longitude: f64,
    /// Label, e.g. `Library parking lot`. May be empty.
    #[serde(default)]
    pub title: String,
}

impl MeetupPoint {
    /// Check the coordinates are on the globe and trim the title.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` listing every violation found.
    pub fn validated(self, limits: &LimitsConfig) -> Result<Self> {
        let point = Self {
            // Adding zero folds -0.0 into 0.0 so equal points compare equal.
            latitude: self.latitude + 0.0,
            longitude: self.longitude + 0.0,
            title: self.title.trim().to_string(),
        };

        let mut violations = Vec::new();
        if !(-90.0..=90.0).contains(&point.latitude) {
            violations.push(format!(
                "Latitude {} must be between -90 and 90.",
                point.latitude
            ));
        }
        if !(-180.0..=180.0).contains(&point.longitude) {
            violations.push(format!(
                "Longitude {} must be between -180 and 180.",
                point.longitude
            ));
        }
        violations.extend(limits.name_violations(&[("Title", point.title.as_str())]));

        Error::check(violations)?;
        Ok(point)
    }

    /// Identity of the point: its exact coordinates.
    #[must_use]
    pub fn position(&self) -> (u64, u64) {
        (self.latitude.to_bits(), self.longitude.to_bits())
    }
}

impl fmt::Display for MeetupPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)?;
        if !self.title.is_empty() {
            write!(f, " {}", self.title)?;
        }
        Ok(())
    }
}

/// Parses `LAT,LON` or `LAT,LON,TITLE`. The title may itself contain commas.
impl FromStr for MeetupPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ',');
        let (Some(lat), Some(lon)) = (parts.next(), parts.next()) else {
            return Err(Error::invalid(format!(
                "Meet-up point {s:?} must look like LAT,LON or LAT,LON,TITLE."
            )));
        };
        let coordinate = |raw: &str, label: &str| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| Error::invalid(format!("{label} {raw:?} is not a number.")))
        };

        Ok(Self {
            latitude: coordinate(lat, "Latitude")?,
            longitude: coordinate(lon, "Longitude")?,
            title: parts.next().unwrap_or_default().to_string(),
        })
    }
}

/// Changes turning a user's stored meet-up points into a submitted set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeetupPlan {
    /// Stored points missing from the submission.
    pub remove: Vec<MeetupPoint>,
    /// Submitted points not yet stored.
    pub add: Vec<MeetupPoint>,
    /// Stored points whose title changed; each carries the new title.
    pub retitle: Vec<MeetupPoint>,
}

impl MeetupPlan {
    /// Whether the submission matches what is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty() && self.retitle.is_empty()
    }
}

/// Diff the stored points against the full submitted set.
///
/// Points are matched by coordinates. Unchanged points produce nothing, so
/// resubmitting the stored set yields an empty plan.
///
/// # Errors
///
/// Returns `Error::Validation` if the submission lists the same coordinates
/// twice.
pub fn plan_meetup_points(
    stored: &[MeetupPoint],
    submitted: &[MeetupPoint],
) -> Result<MeetupPlan> {
    let mut wanted = BTreeMap::new();
    let mut violations = Vec::new();
    for point in submitted {
        if wanted.insert(point.position(), point).is_some() {
            violations.push(format!(
                "Meet-up point {},{} is listed twice.",
                point.latitude, point.longitude
            ));
        }
    }
    Error::check(violations)?;

    let mut plan = MeetupPlan::default();
    let mut seen = HashSet::new();
    for point in stored {
        seen.insert(point.position());
        match wanted.get(&point.position()) {
            None => plan.remove.push(point.clone()),
            Some(new) if new.title != point.title => plan.retitle.push((*new).clone()),
            Some(_) => {}
        }
    }
    plan.add = submitted
        .iter()
        .filter(|point| !seen.contains(&point.position()))
        .cloned()
        .collect();
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: f64, longitude: f64) -> MeetupPoint {
        MeetupPoint {
            latitude,
            longitude,
            title: String::new(),
        }
    }

    #[test]
    fn test_parse_with_title() {
        let p: MeetupPoint = "37.77, -122.42,City Hall, north steps".parse().unwrap();
        assert!((p.latitude - 37.77).abs() < f64::EPSILON);
        assert!((p.longitude + 122.42).abs() < f64::EPSILON);
        assert_eq!(p.title, "City Hall, north steps");
    }

    #[test]
    fn test_parse_without_title() {
        let p: MeetupPoint = "-33.9,18.4".parse().unwrap();
        assert_eq!(p.title, "");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("37.77".parse::<MeetupPoint>().unwrap_err().is_validation());
        assert!("north,-122".parse::<MeetupPoint>().is_err());
        assert!("NaN,0".parse::<MeetupPoint>().is_err());
    }

    #[test]
    fn test_validated_ranges() {
        let Err(Error::Validation { violations }) =
            point(91.0, -181.0).validated(&LimitsConfig::default())
        else {
            panic!("expected validation error");
        };
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_validated_folds_negative_zero() {
        let a = point(-0.0, 10.0).validated(&LimitsConfig::default()).unwrap();
        let b = point(0.0, 10.0).validated(&LimitsConfig::default()).unwrap();
        assert_eq!(a.position(), b.position());
    }

    #[test]
    fn test_display() {
        let mut p = point(1.5, -2.25);
        assert_eq!(p.to_string(), "1.5,-2.25");
        p.title = "Park".to_string();
        assert_eq!(p.to_string(), "1.5,-2.25 Park");
    }

    fn titled(latitude: f64, longitude: f64, title: &str) -> MeetupPoint {
        MeetupPoint {
            title: title.to_string(),
            ..point(latitude, longitude)
        }
    }

    #[test]
    fn test_plan_adds_removes_and_retitles() {
        let stored = vec![titled(1.0, 1.0, "Park"), titled(2.0, 2.0, "School")];
        let submitted = vec![titled(2.0, 2.0, "School gym"), titled(3.0, 3.0, "Church")];

        let plan = plan_meetup_points(&stored, &submitted).unwrap();
        assert_eq!(plan.remove, vec![titled(1.0, 1.0, "Park")]);
        assert_eq!(plan.retitle, vec![titled(2.0, 2.0, "School gym")]);
        assert_eq!(plan.add, vec![titled(3.0, 3.0, "Church")]);
    }

    #[test]
    fn test_plan_resubmission_is_empty() {
        let stored = vec![titled(1.0, 1.0, "Park"), titled(2.0, 2.0, "")];
        let plan = plan_meetup_points(&stored, &stored).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_empty_submission_removes_everything() {
        let stored = vec![titled(1.0, 1.0, "Park")];
        let plan = plan_meetup_points(&stored, &[]).unwrap();
        assert_eq!(plan.remove.len(), 1);
        assert!(plan.add.is_empty());
    }

    #[test]
    fn test_plan_rejects_duplicate_coordinates() {
        let submitted = vec![titled(1.0, 1.0, "Park"), titled(1.0, 1.0, "Also park")];
        let err = plan_meetup_points(&[], &submitted).unwrap_err();
        assert!(err.to_string().contains("listed twice"));
    }
}
