use journeylytics_core::analytics::{
    AnalyticsBackend, ChannelRow, CohortQuery, CohortResponse, FunnelDefinition, FunnelReport,
    KpiSummary, StageChannelWinner,
};
use journeylytics_core::error::CoreError;

use crate::MemoryBackend;

impl AnalyticsBackend for MemoryBackend {
    fn event_count(&self) -> usize {
        self.snapshot().len()
    }

    fn get_funnel(&self, funnel: &FunnelDefinition) -> FunnelReport {
        crate::queries::funnels::get_funnel_inner(&self.snapshot(), funnel)
    }

    fn get_channel_breakdown(&self, stage: &str) -> Vec<ChannelRow> {
        crate::queries::channels::channel_breakdown(&self.snapshot(), stage)
    }

    fn get_top_channels(&self, funnel: &FunnelDefinition) -> Vec<StageChannelWinner> {
        crate::queries::channels::top_channels(&self.snapshot(), funnel)
    }

    fn get_cohorts(&self, query: &CohortQuery) -> Result<CohortResponse, CoreError> {
        crate::queries::cohorts::get_cohorts_inner(&self.snapshot(), query)
    }

    fn get_kpis(
        &self,
        funnel: &FunnelDefinition,
        acquired_stage: &str,
        converted_stage: &str,
    ) -> KpiSummary {
        let table = self.snapshot();
        KpiSummary {
            stages: crate::queries::summary::stage_counts(&table, funnel),
            overall: crate::queries::summary::conversion_summary(
                &table,
                acquired_stage,
                converted_stage,
            ),
        }
    }
}
