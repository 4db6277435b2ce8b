use crate::analytics::{
    AcquisitionPolicy, CohortGranularity, CohortQuery, ConversionMode, FunnelDefinition,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// CSV event log loaded at startup and on reload.
    pub data_path: String,
    pub funnel: FunnelDefinition,
    pub acquired_stage: String,
    pub converted_stage: String,
    pub cohort_granularity: CohortGranularity,
    pub acquisition_policy: AcquisitionPolicy,
    pub conversion_mode: ConversionMode,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let funnel = match std::env::var("JOURNEYLYTICS_FUNNEL") {
            Ok(raw) => FunnelDefinition::parse(&raw)
                .map_err(|e| format!("invalid JOURNEYLYTICS_FUNNEL: {e}"))?,
            Err(_) => FunnelDefinition::default(),
        };

        Ok(Self {
            port: std::env::var("JOURNEYLYTICS_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_path: std::env::var("JOURNEYLYTICS_DATA_PATH")
                .unwrap_or_else(|_| "sample_data/events.csv".to_string()),
            acquired_stage: std::env::var("JOURNEYLYTICS_ACQUIRED_STAGE")
                .unwrap_or_else(|_| funnel.base_stage().to_string()),
            converted_stage: std::env::var("JOURNEYLYTICS_CONVERTED_STAGE")
                .unwrap_or_else(|_| "converted".to_string()),
            cohort_granularity: CohortGranularity::parse(
                std::env::var("JOURNEYLYTICS_COHORT_GRANULARITY").ok().as_deref(),
            )
            .map_err(|e| format!("invalid JOURNEYLYTICS_COHORT_GRANULARITY: {e}"))?,
            acquisition_policy: AcquisitionPolicy::parse(
                std::env::var("JOURNEYLYTICS_ACQUISITION_POLICY").ok().as_deref(),
            )
            .map_err(|e| format!("invalid JOURNEYLYTICS_ACQUISITION_POLICY: {e}"))?,
            conversion_mode: ConversionMode::parse(
                std::env::var("JOURNEYLYTICS_COHORT_CONVERSION").ok().as_deref(),
            )
            .map_err(|e| format!("invalid JOURNEYLYTICS_COHORT_CONVERSION: {e}"))?,
            cors_origins: std::env::var("JOURNEYLYTICS_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            funnel,
        })
    }

    /// Cohort query built from the configured defaults.
    pub fn cohort_query(&self) -> CohortQuery {
        CohortQuery {
            acquired_stage: self.acquired_stage.clone(),
            converted_stage: self.converted_stage.clone(),
            granularity: self.cohort_granularity.clone(),
            acquisition_policy: self.acquisition_policy.clone(),
            conversion_mode: self.conversion_mode.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let funnel = FunnelDefinition::default();
        Self {
            port: 3000,
            data_path: "sample_data/events.csv".to_string(),
            acquired_stage: funnel.base_stage().to_string(),
            converted_stage: "converted".to_string(),
            cohort_granularity: CohortGranularity::default(),
            acquisition_policy: AcquisitionPolicy::default(),
            conversion_mode: ConversionMode::default(),
            cors_origins: Vec::new(),
            funnel,
        }
    }
}
