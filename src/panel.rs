//! One independently configured view over the shared record store.
//!
//! A panel owns its parameters and derived series. Every accepted event runs
//! the whole filter, aggregate, transform, cobweb chain synchronously before
//! returning, so callers only ever observe an idle panel whose output matches
//! its parameters.

use tracing::debug;

use crate::aggregate::aggregate;
use crate::cobweb::cobweb;
use crate::models::{CobwebPoint, Method, Metric, PanelParams, RollingWindow, Scope, SeriesPoint};
use crate::scope::{self, distinct_counties};
use crate::store::RecordStore;
use crate::transform;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    SetScope(Scope),
    /// Moves to another state, keeping the current scope kind. A national
    /// panel becomes a state panel.
    SelectState(String),
    SetMetric(Metric),
    SetMethod(Method),
    SetWindow(RollingWindow),
    /// Scope copied from another panel by the synchronizer.
    SyncScope(Scope),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    Idle,
    Recomputing,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelOutput {
    pub series: Vec<SeriesPoint>,
    pub cobweb: Vec<CobwebPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLabels {
    pub title: String,
    pub value_label: String,
    pub cobweb_x_label: String,
    pub cobweb_y_label: String,
}

impl PanelLabels {
    pub fn for_params(params: &PanelParams) -> Self {
        let title = match &params.scope {
            Scope::National => "NYT COVID-19 data: National".to_string(),
            Scope::State(state) => format!("NYT COVID-19 data: State: {state}"),
            Scope::County(_, county) => format!("NYT COVID-19 data: County: {county}"),
        };
        let prefix = match params.method {
            Method::Cumulative => "Cumulative",
            Method::Difference => "New",
        };
        let value_label = format!("{prefix} {}", params.metric);

        Self {
            title,
            cobweb_x_label: format!("{value_label} today"),
            cobweb_y_label: format!("{value_label} tomorrow"),
            value_label,
        }
    }
}

/// Full recompute from scratch: filter, aggregate, transform, pair.
pub fn recompute(store: &RecordStore, params: &PanelParams) -> PanelOutput {
    let aggregated = aggregate_scope(store, &params.scope, params.metric);
    derive(&aggregated, params)
}

fn aggregate_scope(store: &RecordStore, scope: &Scope, metric: Metric) -> Vec<SeriesPoint> {
    let indices = scope::select(store, scope);
    aggregate(store, &indices, &[metric]).points(metric)
}

fn derive(aggregated: &[SeriesPoint], params: &PanelParams) -> PanelOutput {
    let series = transform::transform(aggregated, params.method, params.window);
    let cobweb = cobweb(&series);
    PanelOutput { series, cobweb }
}

fn county_options_for(store: &RecordStore, scope: &Scope) -> Vec<String> {
    scope
        .state()
        .map(|state| distinct_counties(store, state))
        .unwrap_or_default()
}

struct AggregateCache {
    scope: Scope,
    metric: Metric,
    points: Vec<SeriesPoint>,
}

pub struct Panel {
    index: usize,
    params: PanelParams,
    county_options: Vec<String>,
    cache: Option<AggregateCache>,
    output: PanelOutput,
    phase: PanelPhase,
    recomputes: u64,
    aggregations: u64,
}

impl Panel {
    pub fn new(index: usize, store: &RecordStore, mut params: PanelParams) -> Self {
        let county_options = county_options_for(store, &params.scope);
        params.scope = scope::resolve(params.scope, &county_options);

        let mut panel = Self {
            index,
            params,
            county_options,
            cache: None,
            output: PanelOutput::default(),
            phase: PanelPhase::Idle,
            recomputes: 0,
            aggregations: 0,
        };
        panel.refresh(store);
        panel
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn params(&self) -> &PanelParams {
        &self.params
    }

    pub fn scope(&self) -> &Scope {
        &self.params.scope
    }

    pub fn county_options(&self) -> &[String] {
        &self.county_options
    }

    pub fn series(&self) -> &[SeriesPoint] {
        &self.output.series
    }

    pub fn cobweb(&self) -> &[CobwebPoint] {
        &self.output.cobweb
    }

    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    pub fn labels(&self) -> PanelLabels {
        PanelLabels::for_params(&self.params)
    }

    /// Number of completed recompute transitions, construction included.
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }

    /// Number of times the scope was re-aggregated from raw records.
    pub fn aggregations(&self) -> u64 {
        self.aggregations
    }

    /// Applies one parameter change and recomputes. Returns `false` when the
    /// event leaves the parameters unchanged, in which case nothing is rerun.
    pub fn handle(&mut self, store: &RecordStore, event: PanelEvent) -> bool {
        let changed = match event {
            PanelEvent::SetScope(scope) | PanelEvent::SyncScope(scope) => {
                self.apply_scope(store, scope)
            }
            PanelEvent::SelectState(state) => {
                let scope = match &self.params.scope {
                    Scope::County(_, county) => Scope::County(state, county.clone()),
                    Scope::National | Scope::State(_) => Scope::State(state),
                };
                self.apply_scope(store, scope)
            }
            PanelEvent::SetMetric(metric) => replace(&mut self.params.metric, metric),
            PanelEvent::SetMethod(method) => replace(&mut self.params.method, method),
            PanelEvent::SetWindow(window) => replace(&mut self.params.window, window),
        };

        if changed {
            self.refresh(store);
        }
        changed
    }

    /// Validates the county against the state's options before any field is
    /// written, so the scope is replaced as one unit.
    fn apply_scope(&mut self, store: &RecordStore, scope: Scope) -> bool {
        let county_options = county_options_for(store, &scope);
        let scope = scope::resolve(scope, &county_options);
        self.county_options = county_options;
        replace(&mut self.params.scope, scope)
    }

    fn refresh(&mut self, store: &RecordStore) {
        self.phase = PanelPhase::Recomputing;

        let reusable = self.cache.as_ref().is_some_and(|cache| {
            cache.scope == self.params.scope && cache.metric == self.params.metric
        });
        if !reusable {
            let points = aggregate_scope(store, &self.params.scope, self.params.metric);
            self.aggregations += 1;
            self.cache = Some(AggregateCache {
                scope: self.params.scope.clone(),
                metric: self.params.metric,
                points,
            });
        }

        let points = self
            .cache
            .as_ref()
            .map(|cache| cache.points.as_slice())
            .unwrap_or_default();
        self.output = derive(points, &self.params);
        self.recomputes += 1;
        self.phase = PanelPhase::Idle;

        debug!(
            panel = self.index,
            scope = %self.params.scope,
            metric = %self.params.metric,
            method = %self.params.method,
            window = self.params.window.get(),
            reaggregated = !reusable,
            points = self.output.series.len(),
            "panel recomputed"
        );
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use chrono::NaiveDate;

    fn record(day: u32, state: &str, county: &str, cases: f64, deaths: f64) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
            state: state.to_string(),
            county: county.to_string(),
            cases,
            deaths,
        }
    }

    fn sample_store() -> RecordStore {
        RecordStore::from_records(vec![
            record(1, "CA", "Alameda", 1.0, 0.0),
            record(1, "CA", "Contra Costa", 2.0, 0.0),
            record(1, "OR", "Lane", 4.0, 1.0),
            record(2, "CA", "Alameda", 3.0, 1.0),
            record(2, "CA", "Contra Costa", 5.0, 0.0),
            record(2, "OR", "Lane", 6.0, 1.0),
            record(3, "CA", "Alameda", 6.0, 1.0),
            record(3, "CA", "Contra Costa", 9.0, 2.0),
        ])
    }

    fn values(panel: &Panel) -> Vec<f64> {
        panel.series().iter().map(|p| p.value).collect()
    }

    #[test]
    fn national_panel_starts_idle_with_output() {
        let store = sample_store();
        let panel = Panel::new(0, &store, PanelParams::new(Metric::Cases));
        assert_eq!(panel.phase(), PanelPhase::Idle);
        assert_eq!(values(&panel), vec![7.0, 14.0, 15.0]);
        assert_eq!(panel.cobweb()[1], CobwebPoint { x: 7.0, y: 14.0 });
        assert!(panel.county_options().is_empty());
        assert_eq!(panel.recomputes(), 1);
    }

    #[test]
    fn state_scope_sums_counties_per_date() {
        let store = sample_store();
        let mut panel = Panel::new(0, &store, PanelParams::new(Metric::Cases));
        assert!(panel.handle(&store, PanelEvent::SetScope(Scope::State("CA".to_string()))));
        assert_eq!(values(&panel), vec![3.0, 8.0, 15.0]);
        assert_eq!(panel.county_options(), &["Alameda", "Contra Costa"]);
    }

    #[test]
    fn unknown_county_falls_back_to_first_in_state() {
        let store = sample_store();
        let mut panel = Panel::new(0, &store, PanelParams::new(Metric::Cases));
        panel.handle(&store, PanelEvent::SetScope(Scope::State("CA".to_string())));
        panel.handle(
            &store,
            PanelEvent::SetScope(Scope::County("CA".to_string(), "Zzy".to_string())),
        );
        assert_eq!(
            panel.scope(),
            &Scope::County("CA".to_string(), "Alameda".to_string())
        );
        assert_eq!(panel.county_options(), &["Alameda", "Contra Costa"]);
        assert_eq!(values(&panel), vec![1.0, 3.0, 6.0]);
    }

    #[test]
    fn selecting_state_revalidates_county() {
        let store = sample_store();
        let mut params = PanelParams::new(Metric::Cases);
        params.scope = Scope::County("CA".to_string(), "Contra Costa".to_string());
        let mut panel = Panel::new(0, &store, params);

        panel.handle(&store, PanelEvent::SelectState("OR".to_string()));
        assert_eq!(panel.scope(), &Scope::County("OR".to_string(), "Lane".to_string()));
        assert_eq!(panel.county_options(), &["Lane"]);
        assert_eq!(values(&panel), vec![4.0, 6.0]);

        let mut national = Panel::new(1, &store, PanelParams::new(Metric::Cases));
        national.handle(&store, PanelEvent::SelectState("OR".to_string()));
        assert_eq!(national.scope(), &Scope::State("OR".to_string()));
    }

    #[test]
    fn empty_scope_propagates_as_empty_series() {
        let store = sample_store();
        let mut panel = Panel::new(0, &store, PanelParams::new(Metric::Deaths));
        panel.handle(&store, PanelEvent::SetScope(Scope::State("TX".to_string())));
        assert!(panel.series().is_empty());
        assert!(panel.cobweb().is_empty());
        assert!(panel.county_options().is_empty());
        assert_eq!(panel.phase(), PanelPhase::Idle);
    }

    #[test]
    fn method_and_window_changes_reuse_aggregation() {
        let store = sample_store();
        let mut panel = Panel::new(0, &store, PanelParams::new(Metric::Cases));
        assert_eq!(panel.aggregations(), 1);

        panel.handle(&store, PanelEvent::SetMethod(Method::Difference));
        assert_eq!(values(&panel), vec![7.0, 7.0, 1.0]);
        panel.handle(&store, PanelEvent::SetWindow(RollingWindow::new(2).unwrap()));
        assert_eq!(values(&panel), vec![7.0, 14.0 / 3.0, 5.0]);
        assert_eq!(panel.aggregations(), 1);
        assert_eq!(panel.recomputes(), 3);

        panel.handle(&store, PanelEvent::SetMetric(Metric::Deaths));
        assert_eq!(panel.aggregations(), 2);
    }

    #[test]
    fn unchanged_parameters_do_not_recompute() {
        let store = sample_store();
        let mut panel = Panel::new(0, &store, PanelParams::new(Metric::Cases));
        assert!(!panel.handle(&store, PanelEvent::SetMetric(Metric::Cases)));
        assert!(!panel.handle(&store, PanelEvent::SetScope(Scope::National)));
        assert_eq!(panel.recomputes(), 1);
    }

    #[test]
    fn incremental_output_matches_full_recompute() {
        let store = sample_store();
        let mut panel = Panel::new(0, &store, PanelParams::new(Metric::Cases));
        panel.handle(&store, PanelEvent::SetMethod(Method::Difference));
        panel.handle(&store, PanelEvent::SetWindow(RollingWindow::new(3).unwrap()));
        panel.handle(&store, PanelEvent::SetScope(Scope::State("CA".to_string())));

        let fresh = recompute(&store, panel.params());
        assert_eq!(panel.series(), fresh.series.as_slice());
        assert_eq!(panel.cobweb(), fresh.cobweb.as_slice());
    }

    #[test]
    fn labels_follow_scope_and_method() {
        let mut params = PanelParams::new(Metric::Deaths);
        params.scope = Scope::County("CA".to_string(), "Alameda".to_string());
        params.method = Method::Difference;
        let labels = PanelLabels::for_params(&params);

        assert_eq!(labels.title, "NYT COVID-19 data: County: Alameda");
        assert_eq!(labels.value_label, "New deaths");
        assert_eq!(labels.cobweb_x_label, "New deaths today");
        assert_eq!(labels.cobweb_y_label, "New deaths tomorrow");

        let national = PanelLabels::for_params(&PanelParams::new(Metric::Cases));
        assert_eq!(national.title, "NYT COVID-19 data: National");
        assert_eq!(national.value_label, "Cumulative cases");
    }
}
