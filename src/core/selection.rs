// Date / hour selection as emitted by the picker widgets

use crate::core::constants::*;
use crate::core::error::{DashError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hour restriction applied after the date filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HourSelection {
    #[default]
    NoFilter,
    SingleHour { hour: u32 },
    HourSet { hours: BTreeSet<u32> },
}

/// A single element of the legacy hour dropdown value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HourToken {
    Number(i64),
    Text(String),
}

impl HourToken {
    fn text(&self) -> String {
        match self {
            HourToken::Number(n) => n.to_string(),
            HourToken::Text(s) => s.clone(),
        }
    }

    fn hour(&self) -> Result<u32> {
        let text = self.text();
        let hour: u32 = text
            .trim()
            .parse()
            .map_err(|_| DashError::MalformedSelection(format!("not an hour: {:?}", text)))?;
        if hour >= HOURS_PER_DAY {
            return Err(DashError::MalformedSelection(format!(
                "hour out of range: {}",
                hour
            )));
        }
        Ok(hour)
    }
}

impl HourSelection {
    /// Decodes the dropdown's raw value.
    ///
    /// Empty means no filter. A first token longer than two characters (the
    /// widget's `["13:00", "13"]` default) selects exactly the hour in the second
    /// token. Anything else is an explicit set of hours.
    pub fn from_wire(tokens: &[HourToken]) -> Result<Self> {
        let Some(first) = tokens.first() else {
            return Ok(HourSelection::NoFilter);
        };

        if first.text().chars().count() > HOUR_TOKEN_MAX_LEN {
            let second = tokens.get(1).ok_or_else(|| {
                DashError::MalformedSelection(format!(
                    "{:?} needs a second element carrying the hour",
                    first.text()
                ))
            })?;
            return Ok(HourSelection::SingleHour {
                hour: second.hour()?,
            });
        }

        let hours = tokens
            .iter()
            .map(HourToken::hour)
            .collect::<Result<BTreeSet<u32>>>()?;
        Ok(HourSelection::HourSet { hours })
    }

    pub fn matches(&self, hour: u32) -> bool {
        match self {
            HourSelection::NoFilter => true,
            HourSelection::SingleHour { hour: h } => *h == hour,
            HourSelection::HourSet { hours } => hours.contains(&hour),
        }
    }
}

/// Hour restriction in either accepted wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HoursInput {
    Legacy(Vec<HourToken>),
    Tagged(HourSelection),
}

impl Default for HoursInput {
    fn default() -> Self {
        HoursInput::Legacy(Vec::new())
    }
}

impl HoursInput {
    pub fn resolve(&self) -> Result<HourSelection> {
        match self {
            HoursInput::Legacy(tokens) => HourSelection::from_wire(tokens),
            HoursInput::Tagged(HourSelection::SingleHour { hour }) if *hour >= HOURS_PER_DAY => {
                Err(DashError::MalformedSelection(format!(
                    "hour out of range: {}",
                    hour
                )))
            }
            HoursInput::Tagged(HourSelection::HourSet { hours }) if hours.is_empty() => {
                Ok(HourSelection::NoFilter)
            }
            HoursInput::Tagged(HourSelection::HourSet { hours })
                if hours.iter().any(|h| *h >= HOURS_PER_DAY) =>
            {
                Err(DashError::MalformedSelection(
                    "hour set contains an hour out of range".to_string(),
                ))
            }
            HoursInput::Tagged(selection) => Ok(selection.clone()),
        }
    }
}

/// One calendar day plus an hour restriction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub date: NaiveDate,
    pub hours: HourSelection,
}

impl Selection {
    pub fn new(date: NaiveDate, hours: HourSelection) -> Self {
        Self { date, hours }
    }

    pub fn parse(date: &str, hours: &HoursInput) -> Result<Self> {
        Ok(Self {
            date: parse_date(date)?,
            hours: hours.resolve()?,
        })
    }
}

/// Parses the `YYYY-MM-DD` prefix of a date or datetime string.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let prefix = text
        .trim()
        .get(..DATE_PREFIX_LEN)
        .ok_or_else(|| DashError::InvalidDate(text.to_string()))?;
    NaiveDate::parse_from_str(prefix, DATE_FORMAT).map_err(|_| DashError::InvalidDate(text.to_string()))
}

/// Option offered by the hour dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourOption {
    pub label: String,
    pub value: String,
}

pub fn hour_options() -> Vec<HourOption> {
    (0..HOURS_PER_DAY)
        .map(|n| HourOption {
            label: format!("{}:00", n),
            value: n.to_string(),
        })
        .collect()
}
