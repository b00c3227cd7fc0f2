use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub const WEEKDAY_KEYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Opening and closing time for one weekday, as "HH:MM". Both unset means closed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DayHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl DayHours {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.window().is_some()
    }

    pub fn window(&self) -> Option<(NaiveTime, NaiveTime)> {
        let start = parse_time(self.start.as_deref()?).ok()?;
        let end = parse_time(self.end.as_deref()?).ok()?;
        Some((start, end))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OperatingHours {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thursday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunday: Option<DayHours>,
}

impl OperatingHours {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let hours: OperatingHours = serde_json::from_str(s)?;
        hours.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(hours)
    }

    /// Looks up a weekday by its lowercase English key.
    pub fn get(&self, key: &str) -> Option<&DayHours> {
        match key {
            "monday" => self.monday.as_ref(),
            "tuesday" => self.tuesday.as_ref(),
            "wednesday" => self.wednesday.as_ref(),
            "thursday" => self.thursday.as_ref(),
            "friday" => self.friday.as_ref(),
            "saturday" => self.saturday.as_ref(),
            "sunday" => self.sunday.as_ref(),
            _ => None,
        }
    }

    /// Hours for `key` only when the unit actually opens that day.
    pub fn open_on(&self, key: &str) -> Option<&DayHours> {
        self.get(key).filter(|h| h.is_open())
    }

    pub fn validate(&self) -> Result<(), String> {
        for key in WEEKDAY_KEYS {
            let Some(day) = self.get(key) else {
                continue;
            };

            match (day.start.as_deref(), day.end.as_deref()) {
                (None, None) => {}
                (Some(_), None) | (None, Some(_)) => {
                    return Err(format!("{key}: start and end must be set together"));
                }
                (Some(start), Some(end)) => {
                    let start_time = parse_time(start).map_err(|e| format!("{key}: {e}"))?;
                    let end_time = parse_time(end).map_err(|e| format!("{key}: {e}"))?;
                    if start_time >= end_time {
                        return Err(format!("{key}: start {start} must be before end {end}"));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn to_human_readable(&self) -> String {
        WEEKDAY_KEYS
            .iter()
            .filter_map(|key| {
                let day = self.open_on(key)?;
                Some(format!(
                    "{}: {}-{}",
                    capitalize(key),
                    day.start.as_deref().unwrap_or_default(),
                    day.end.as_deref().unwrap_or_default()
                ))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().to_string() + c.as_str(),
    }
}

pub fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| format!("invalid time format: {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let json = r#"{"monday":{"start":"09:00","end":"17:00"},"tuesday":{"start":"09:00","end":"17:00"}}"#;
        let hours = OperatingHours::from_json(json).unwrap();
        assert_eq!(hours.monday, Some(DayHours::new("09:00", "17:00")));
        assert!(hours.sunday.is_none());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(OperatingHours::from_json("not json").is_err());
    }

    #[test]
    fn test_start_without_end_rejected() {
        let json = r#"{"monday":{"start":"09:00"}}"#;
        assert!(OperatingHours::from_json(json).is_err());
    }

    #[test]
    fn test_start_after_end_rejected() {
        let json = r#"{"friday":{"start":"18:00","end":"09:00"}}"#;
        let err = OperatingHours::from_json(json).unwrap_err();
        assert!(err.to_string().contains("friday"));
    }

    #[test]
    fn test_invalid_time_rejected() {
        let json = r#"{"monday":{"start":"25:00","end":"17:00"}}"#;
        assert!(OperatingHours::from_json(json).is_err());
    }

    #[test]
    fn test_sunday_unset_means_closed() {
        let json = r#"{"monday":{"start":"09:00","end":"12:00"},"sunday":{}}"#;
        let hours = OperatingHours::from_json(json).unwrap();
        assert!(hours.open_on("sunday").is_none());
        assert!(hours.open_on("monday").is_some());
        assert!(hours.open_on("someday").is_none());
    }

    #[test]
    fn test_to_human_readable() {
        let json = r#"{"friday":{"start":"10:00","end":"16:00"},"monday":{"start":"09:00","end":"17:00"}}"#;
        let hours = OperatingHours::from_json(json).unwrap();
        assert_eq!(hours.to_human_readable(), "Monday: 09:00-17:00, Friday: 10:00-16:00");
    }
}
