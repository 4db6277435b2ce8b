//! Analytics backend abstraction and the tables it produces.

use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const DEFAULT_FUNNEL: [&str; 3] = ["acquired", "activated", "converted"];

/// Ordered list of stage names. The first stage is the base stage that every
/// base-relative ratio is computed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FunnelDefinition {
    stages: Vec<String>,
}

impl FunnelDefinition {
    pub fn new<I, S>(stages: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stages: Vec<String> = stages.into_iter().map(Into::into).collect();
        if stages.is_empty() {
            return Err(CoreError::EmptyFunnel);
        }
        Ok(Self { stages })
    }

    /// Parse a comma-separated stage list, e.g. `acquired,activated,converted`.
    /// Blank entries are dropped; stage names keep their case.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        )
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn base_stage(&self) -> &str {
        &self.stages[0]
    }

    pub fn final_stage(&self) -> &str {
        &self.stages[self.stages.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always `false`: construction rejects an empty stage list. Present to
    /// pair with [`FunnelDefinition::len`].
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Vec<String>> for FunnelDefinition {
    type Error = CoreError;

    fn try_from(stages: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(stages)
    }
}

impl From<FunnelDefinition> for Vec<String> {
    fn from(funnel: FunnelDefinition) -> Self {
        funnel.stages
    }
}

impl Default for FunnelDefinition {
    fn default() -> Self {
        Self {
            stages: DEFAULT_FUNNEL.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CohortGranularity {
    Day,
    Week,
    #[default]
    Month,
}

impl CohortGranularity {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("month") => Ok(Self::Month),
            Some("week") => Ok(Self::Week),
            Some("day") => Ok(Self::Day),
            Some(_) => Err(anyhow!("granularity must be one of: day, week, month")),
        }
    }

    /// First day of the period containing `date`. Weeks start on Monday.
    pub fn truncate(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => date - Duration::days(i64::from(date.weekday().num_days_from_monday())),
            Self::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// Display label for a truncated period start.
    pub fn label(&self, period_start: NaiveDate) -> String {
        match self {
            Self::Month => period_start.format("%Y-%m").to_string(),
            Self::Day | Self::Week => period_start.format("%Y-%m-%d").to_string(),
        }
    }
}

/// How a user with acquisition events in several periods is assigned to a
/// cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionPolicy {
    /// The period of the user's earliest acquisition event.
    #[default]
    Earliest,
    /// The period of the user's latest acquisition event.
    Latest,
    /// The user is a member of every distinct period they were acquired in.
    EachPeriod,
    /// Acquisitions in more than one period fail the query.
    Reject,
}

impl AcquisitionPolicy {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("earliest") => Ok(Self::Earliest),
            Some("latest") => Ok(Self::Latest),
            Some("each_period") => Ok(Self::EachPeriod),
            Some("reject") => Ok(Self::Reject),
            Some(_) => Err(anyhow!(
                "policy must be one of: earliest, latest, each_period, reject"
            )),
        }
    }
}

/// Which converted events count towards a cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    /// Any converted event counts, even one dated before acquisition.
    #[default]
    AnyTime,
    /// The converted event must be dated at or after the acquisition event.
    OnOrAfterAcquisition,
}

impl ConversionMode {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("any_time") => Ok(Self::AnyTime),
            Some("on_or_after_acquisition") => Ok(Self::OnOrAfterAcquisition),
            Some(_) => Err(anyhow!(
                "conversion must be one of: any_time, on_or_after_acquisition"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortQuery {
    pub acquired_stage: String,
    pub converted_stage: String,
    pub granularity: CohortGranularity,
    pub acquisition_policy: AcquisitionPolicy,
    pub conversion_mode: ConversionMode,
}

impl Default for CohortQuery {
    fn default() -> Self {
        Self {
            acquired_stage: "acquired".to_string(),
            converted_stage: "converted".to_string(),
            granularity: CohortGranularity::default(),
            acquisition_policy: AcquisitionPolicy::default(),
            conversion_mode: ConversionMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStageRow {
    pub stage: String,
    pub users: i64,
    #[serde(rename = "conv_from_prev_%")]
    pub conv_from_prev: f64,
    #[serde(rename = "conv_from_base_%")]
    pub conv_from_base: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelReport {
    pub stages: Vec<FunnelStageRow>,
    /// Unique users at the base stage.
    pub total_entered: i64,
    /// `conv_from_base_%` of the last stage.
    pub final_conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRow {
    pub channel: String,
    pub unique_users: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageChannelWinner {
    pub stage: String,
    pub channel: String,
    pub unique_users: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortRow {
    pub acquisition_period: String,
    pub cohort_size: i64,
    pub converted: i64,
    #[serde(rename = "converted_%")]
    pub converted_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortResponse {
    pub granularity: CohortGranularity,
    pub acquisition_policy: AcquisitionPolicy,
    pub conversion_mode: ConversionMode,
    pub rows: Vec<CohortRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    pub stage: String,
    pub users: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionSummary {
    pub acquired: i64,
    pub converted: i64,
    /// Percentage of acquired users that converted; 0.0 with no acquired users.
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub stages: Vec<StageCount>,
    pub overall: ConversionSummary,
}

/// Read-side interface the presentation layer computes tables through.
///
/// Every method is a pure function of the backend's current event table.
pub trait AnalyticsBackend: Send + Sync + 'static {
    fn event_count(&self) -> usize;

    fn get_funnel(&self, funnel: &FunnelDefinition) -> FunnelReport;

    fn get_channel_breakdown(&self, stage: &str) -> Vec<ChannelRow>;

    fn get_top_channels(&self, funnel: &FunnelDefinition) -> Vec<StageChannelWinner>;

    fn get_cohorts(&self, query: &CohortQuery) -> Result<CohortResponse, CoreError>;

    fn get_kpis(
        &self,
        funnel: &FunnelDefinition,
        acquired_stage: &str,
        converted_stage: &str,
    ) -> KpiSummary;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn funnel_definition_rejects_empty() {
        assert!(matches!(
            FunnelDefinition::new(Vec::<String>::new()),
            Err(CoreError::EmptyFunnel)
        ));
        assert!(matches!(
            FunnelDefinition::parse(" , ,"),
            Err(CoreError::EmptyFunnel)
        ));
    }

    #[test]
    fn funnel_definition_parse_keeps_order_and_case() {
        let funnel = FunnelDefinition::parse("Acquired, activated ,converted").expect("funnel");
        assert_eq!(funnel.stages(), ["Acquired", "activated", "converted"]);
        assert_eq!(funnel.base_stage(), "Acquired");
        assert_eq!(funnel.final_stage(), "converted");
    }

    #[test]
    fn granularity_truncates_and_labels() {
        let d = date(2024, 3, 14); // Thursday
        assert_eq!(CohortGranularity::Month.label(CohortGranularity::Month.truncate(d)), "2024-03");
        assert_eq!(CohortGranularity::Week.label(CohortGranularity::Week.truncate(d)), "2024-03-11");
        assert_eq!(CohortGranularity::Day.label(CohortGranularity::Day.truncate(d)), "2024-03-14");
    }

    #[test]
    fn enum_parsers_default_and_reject_unknown() {
        assert_eq!(CohortGranularity::parse(None).expect("default"), CohortGranularity::Month);
        assert!(CohortGranularity::parse(Some("quarter")).is_err());
        assert_eq!(AcquisitionPolicy::parse(Some("latest")).expect("latest"), AcquisitionPolicy::Latest);
        assert!(AcquisitionPolicy::parse(Some("first")).is_err());
        assert_eq!(
            ConversionMode::parse(Some("on_or_after_acquisition")).expect("strict"),
            ConversionMode::OnOrAfterAcquisition
        );
        assert!(ConversionMode::parse(Some("strict")).is_err());
    }

    #[test]
    fn funnel_row_serializes_with_contract_names() {
        let row = FunnelStageRow {
            stage: "acquired".to_string(),
            users: 3,
            conv_from_prev: 100.0,
            conv_from_base: 100.0,
        };
        let value = serde_json::to_value(&row).expect("serialize");
        assert_eq!(value["conv_from_prev_%"], 100.0);
        assert_eq!(value["conv_from_base_%"], 100.0);
    }
}
