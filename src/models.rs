use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{DashboardError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub state: String,
    pub county: String,
    pub cases: f64,
    pub deaths: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cases,
    Deaths,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Cases, Metric::Deaths];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Cases => "cases",
            Metric::Deaths => "deaths",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cases" => Ok(Metric::Cases),
            "deaths" => Ok(Metric::Deaths),
            other => Err(DashboardError::InvalidMetric(other.to_string())),
        }
    }
}

/// How stored running totals are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Cumulative,
    Difference,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Cumulative => "cumulative",
            Method::Difference => "difference",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cumulative" => Ok(Method::Cumulative),
            "difference" => Ok(Method::Difference),
            other => Err(DashboardError::InvalidMethod(other.to_string())),
        }
    }
}

/// Geographic scope of an aggregation. A county always carries its state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    National,
    State(String),
    County(String, String),
}

impl Scope {
    pub fn state(&self) -> Option<&str> {
        match self {
            Scope::National => None,
            Scope::State(state) | Scope::County(state, _) => Some(state),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::National => f.write_str("national"),
            Scope::State(state) => write!(f, "state:{state}"),
            Scope::County(state, county) => write!(f, "county:{state}:{county}"),
        }
    }
}

/// Parses `national`, `state:<name>` or `county:<state>:<county>`.
impl FromStr for Scope {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().splitn(3, ':');
        let kind = parts.next().unwrap_or_default().to_ascii_lowercase();
        let state = parts.next().map(str::trim).filter(|v| !v.is_empty());
        let county = parts.next().map(str::trim).filter(|v| !v.is_empty());

        match (kind.as_str(), state, county) {
            ("national", None, None) => Ok(Scope::National),
            ("state", Some(state), None) => Ok(Scope::State(state.to_string())),
            ("county", Some(state), Some(county)) => {
                Ok(Scope::County(state.to_string(), county.to_string()))
            }
            _ => Err(DashboardError::InvalidScope(s.to_string())),
        }
    }
}

/// Width of the backward rolling average; 1 disables smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RollingWindow(u32);

impl RollingWindow {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 14;

    pub fn new(width: u32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&width) {
            Ok(Self(width))
        } else {
            Err(DashboardError::InvalidWindow(width))
        }
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Value paired with the previous day's value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CobwebPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelParams {
    pub scope: Scope,
    pub metric: Metric,
    pub method: Method,
    pub window: RollingWindow,
}

impl PanelParams {
    pub fn new(metric: Metric) -> Self {
        Self {
            scope: Scope::National,
            metric,
            method: Method::default(),
            window: RollingWindow::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_parses_all_kinds() {
        assert_eq!("national".parse::<Scope>().unwrap(), Scope::National);
        assert_eq!(
            "state:New York".parse::<Scope>().unwrap(),
            Scope::State("New York".to_string())
        );
        assert_eq!(
            "County:California:Contra Costa".parse::<Scope>().unwrap(),
            Scope::County("California".to_string(), "Contra Costa".to_string())
        );
    }

    #[test]
    fn scope_rejects_county_without_state() {
        assert!("county:Alameda".parse::<Scope>().is_err());
        assert!("state:".parse::<Scope>().is_err());
        assert!("planet".parse::<Scope>().is_err());
    }

    #[test]
    fn scope_display_round_trips() {
        let scope = Scope::County("California".to_string(), "Alameda".to_string());
        assert_eq!(scope.to_string().parse::<Scope>().unwrap(), scope);
    }

    #[test]
    fn window_accepts_slider_range_only() {
        assert_eq!(RollingWindow::new(1).unwrap().get(), 1);
        assert_eq!(RollingWindow::new(14).unwrap().get(), 14);
        assert_eq!(
            RollingWindow::new(0),
            Err(DashboardError::InvalidWindow(0))
        );
        assert_eq!(
            RollingWindow::new(15),
            Err(DashboardError::InvalidWindow(15))
        );
    }

    #[test]
    fn metric_and_method_parse_case_insensitively() {
        assert_eq!("Deaths".parse::<Metric>().unwrap(), Metric::Deaths);
        assert_eq!("DIFFERENCE".parse::<Method>().unwrap(), Method::Difference);
        assert!("hospitalizations".parse::<Metric>().is_err());
    }
}
