use std::fmt::Write;

use serde::Serialize;

use crate::dashboard::Dashboard;
use crate::models::{CobwebPoint, Metric, Method, SeriesPoint};
use crate::panel::Panel;

const RECENT_POINTS: usize = 7;

/// Everything the presentation side needs to draw one panel.
#[derive(Debug, Clone, Serialize)]
pub struct PanelView {
    pub panel: usize,
    pub scope: String,
    pub metric: Metric,
    pub method: Method,
    pub window: usize,
    pub title: String,
    pub value_label: String,
    pub cobweb_x_label: String,
    pub cobweb_y_label: String,
    pub county_options: Vec<String>,
    pub series: Vec<SeriesPoint>,
    pub cobweb: Vec<CobwebPoint>,
}

impl PanelView {
    pub fn from_panel(panel: &Panel) -> Self {
        let params = panel.params();
        let labels = panel.labels();
        Self {
            panel: panel.index() + 1,
            scope: params.scope.to_string(),
            metric: params.metric,
            method: params.method,
            window: params.window.get(),
            title: labels.title,
            value_label: labels.value_label,
            cobweb_x_label: labels.cobweb_x_label,
            cobweb_y_label: labels.cobweb_y_label,
            county_options: panel.county_options().to_vec(),
            series: panel.series().to_vec(),
            cobweb: panel.cobweb().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub states: Vec<String>,
    pub shared_window: usize,
    pub panels: Vec<PanelView>,
}

impl DashboardView {
    pub fn from_dashboard(dashboard: &Dashboard) -> Self {
        Self {
            states: dashboard.states().to_vec(),
            shared_window: dashboard.shared_window().get(),
            panels: dashboard.panels().iter().map(PanelView::from_panel).collect(),
        }
    }
}

fn peak(series: &[SeriesPoint]) -> Option<&SeriesPoint> {
    series.iter().max_by(|a, b| {
        a.value
            .partial_cmp(&b.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

pub fn render_markdown(dashboard: &DashboardView) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# COVID-19 Panel Report");
    let _ = writeln!(
        output,
        "{} states available, shared rolling window {}",
        dashboard.states.len(),
        dashboard.shared_window
    );

    for view in &dashboard.panels {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Panel {}: {}", view.panel, view.title);
        let _ = writeln!(
            output,
            "Scope {}, {} ({}), rolling window {}",
            view.scope, view.metric, view.method, view.window
        );
        let _ = writeln!(output);

        if !view.county_options.is_empty() {
            let _ = writeln!(
                output,
                "County options: {}",
                view.county_options.join(", ")
            );
            let _ = writeln!(output);
        }

        let (Some(first), Some(last)) = (view.series.first(), view.series.last()) else {
            let _ = writeln!(output, "No data for this scope.");
            continue;
        };

        let _ = writeln!(
            output,
            "- Points: {} ({} to {})",
            view.series.len(),
            first.date,
            last.date
        );
        let _ = writeln!(
            output,
            "- Latest {}: {:.2} on {}",
            view.value_label, last.value, last.date
        );
        if let Some(peak) = peak(&view.series) {
            let _ = writeln!(output, "- Peak: {:.2} on {}", peak.value, peak.date);
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "### Recent Values");
        let _ = writeln!(
            output,
            "| date | {} | {} |",
            view.cobweb_x_label, view.cobweb_y_label
        );
        let _ = writeln!(output, "|---|---:|---:|");
        let skip = view.series.len().saturating_sub(RECENT_POINTS);
        for (point, pair) in view.series.iter().zip(&view.cobweb).skip(skip) {
            let _ = writeln!(
                output,
                "| {} | {:.2} | {:.2} |",
                point.date, pair.x, pair.y
            );
        }
    }

    output
}

pub fn render_json(dashboard: &DashboardView) -> serde_json::Result<String> {
    serde_json::to_string_pretty(dashboard)
}
