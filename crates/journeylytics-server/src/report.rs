//! Plain-text journey report printed by `journeylytics report`.

use journeylytics_core::analytics::{AnalyticsBackend, FunnelStageRow};
use journeylytics_core::config::Config;

const FUNNEL_HEADERS: [&str; 4] = ["stage", "users", "conv_from_prev_%", "conv_from_base_%"];

/// Uppercase the first letter of each whitespace- or underscore-separated word.
fn title_case(stage: &str) -> String {
    let mut out = String::with_capacity(stage.len());
    let mut at_word_start = true;
    for c in stage.chars() {
        if at_word_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            if c.is_alphabetic() {
                out.extend(c.to_lowercase());
            } else {
                out.push(c);
            }
            at_word_start = !c.is_alphanumeric();
        }
    }
    out
}

/// Right-aligned table, one line per stage, header first.
fn render_funnel_table(rows: &[FunnelStageRow]) -> String {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|r| {
            [
                r.stage.clone(),
                r.users.to_string(),
                format!("{:.1}", r.conv_from_prev),
                format!("{:.1}", r.conv_from_base),
            ]
        })
        .collect();

    let mut widths = FUNNEL_HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = FUNNEL_HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{h:>w$}"))
        .collect();
    out.push_str(&header.join(" "));
    out.push('\n');
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:>w$}"))
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

/// Full report: funnel table, leading channel per stage, overall conversion.
pub fn render_report(analytics: &dyn AnalyticsBackend, config: &Config) -> String {
    let funnel = analytics.get_funnel(&config.funnel);
    let winners = analytics.get_top_channels(&config.funnel);
    let kpis = analytics.get_kpis(&config.funnel, &config.acquired_stage, &config.converted_stage);

    let mut out = String::new();
    out.push_str("Customer Journey: Funnel Summary\n\n");
    out.push_str(&render_funnel_table(&funnel.stages));

    out.push_str("\nTop Channels by Stage\n");
    for w in &winners {
        out.push_str(&format!(
            "- {}: {} ({} users)\n",
            title_case(&w.stage),
            w.channel,
            w.unique_users
        ));
    }

    out.push_str(&format!(
        "\nOverall conversion rate: {:.1}%\n",
        kpis.overall.conversion_rate
    ));
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use journeylytics_core::event::{EventRecord, EventTable};
    use journeylytics_engine::MemoryBackend;

    use super::*;

    #[test]
    fn title_case_matches_report_style() {
        assert_eq!(title_case("acquired"), "Acquired");
        assert_eq!(title_case("trial started"), "Trial Started");
        assert_eq!(title_case("PAID_plan"), "Paid_Plan");
    }

    #[test]
    fn report_lists_table_winners_and_rate() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date");
        let table = EventTable::new(vec![
            EventRecord::new("A", at, "acquired", "X"),
            EventRecord::new("B", at, "acquired", "X"),
            EventRecord::new("C", at, "acquired", "Y"),
            EventRecord::new("A", at, "activated", "X"),
            EventRecord::new("B", at, "activated", "X"),
            EventRecord::new("A", at, "converted", "X"),
        ]);
        let backend = MemoryBackend::new(table);
        let text = render_report(&backend, &Config::default());

        let expected_table = concat!(
            "    stage users conv_from_prev_% conv_from_base_%\n",
            " acquired     3            100.0            100.0\n",
            "activated     2             66.7             66.7\n",
            "converted     1             50.0             33.3\n",
        );
        assert!(text.starts_with("Customer Journey: Funnel Summary\n\n"));
        assert!(text.contains(expected_table));
        assert!(text.contains("- Acquired: X (2 users)"));
        assert!(text.contains("- Activated: X (2 users)"));
        assert!(text.contains("- Converted: X (1 users)"));
        assert!(text.ends_with("Overall conversion rate: 33.3%\n"));
    }

    #[test]
    fn empty_log_reports_zero_rows_and_zero_rate() {
        let backend = MemoryBackend::new(EventTable::default());
        let text = render_report(&backend, &Config::default());

        assert!(text.contains(" acquired     0            100.0              0.0\n"));
        assert!(text.contains("Top Channels by Stage\n\nOverall conversion rate: 0.0%\n"));
    }
}
