use tracing::{debug, info};

use crate::error::{DashboardError, Result};
use crate::models::{Metric, PanelParams, RollingWindow};
use crate::panel::{Panel, PanelEvent};
use crate::store::RecordStore;

pub const DEFAULT_PANELS: usize = 2;

/// The shared store plus every panel observing it.
///
/// Panels only change through [`Dashboard::dispatch`], the shared window
/// control, or [`Dashboard::synchronize`]; each call finishes every triggered
/// recompute before it returns.
pub struct Dashboard {
    store: RecordStore,
    states: Vec<String>,
    panels: Vec<Panel>,
    shared_window: RollingWindow,
}

impl Dashboard {
    pub fn new(store: RecordStore, panel_count: usize) -> Result<Self> {
        if store.is_empty() {
            return Err(DashboardError::DatasetUnavailable(
                "record store holds no records".to_string(),
            ));
        }

        let states = store.distinct_states();
        let panels = (0..panel_count.max(1))
            .map(|i| Panel::new(i, &store, PanelParams::new(Metric::ALL[i % Metric::ALL.len()])))
            .collect::<Vec<_>>();
        info!(
            records = store.len(),
            states = states.len(),
            panels = panels.len(),
            "dashboard ready"
        );

        Ok(Self {
            store,
            states,
            panels,
            shared_window: RollingWindow::default(),
        })
    }

    /// State selector options, sorted.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, index: usize) -> Result<&Panel> {
        self.panels.get(index).ok_or(DashboardError::PanelIndex {
            index,
            len: self.panels.len(),
        })
    }

    pub fn shared_window(&self) -> RollingWindow {
        self.shared_window
    }

    pub fn dispatch(&mut self, index: usize, event: PanelEvent) -> Result<bool> {
        let len = self.panels.len();
        let panel = self
            .panels
            .get_mut(index)
            .ok_or(DashboardError::PanelIndex { index, len })?;
        debug!(panel = index, ?event, "dispatch");
        Ok(panel.handle(&self.store, event))
    }

    /// Moves the shared rolling-window control and fans the new width out to
    /// every panel. Returns how many panels recomputed.
    pub fn set_shared_window(&mut self, window: RollingWindow) -> usize {
        self.shared_window = window;
        let recomputed = self
            .panels
            .iter_mut()
            .map(|panel| panel.handle(&self.store, PanelEvent::SetWindow(window)))
            .filter(|&changed| changed)
            .count();
        debug!(window = window.get(), recomputed, "shared window changed");
        recomputed
    }

    /// Copies the first panel's scope into every other panel as one command
    /// per panel. Metric, method and window are left alone. Returns how many
    /// panels changed; a repeat call with nothing modified in between
    /// returns zero.
    pub fn synchronize(&mut self) -> usize {
        let Some((source, targets)) = self.panels.split_first_mut() else {
            return 0;
        };
        let scope = source.scope().clone();
        let changed = targets
            .iter_mut()
            .map(|panel| panel.handle(&self.store, PanelEvent::SyncScope(scope.clone())))
            .filter(|&changed| changed)
            .count();
        info!(%scope, changed, "panels synchronized");
        changed
    }
}
