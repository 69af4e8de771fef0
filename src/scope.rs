use std::collections::BTreeSet;

use crate::models::Scope;
use crate::store::RecordStore;

/// Indices of the records inside `scope`, in source order.
pub fn select(store: &RecordStore, scope: &Scope) -> Vec<usize> {
    let states = store.states();
    let counties = store.counties();

    match scope {
        Scope::National => (0..store.len()).collect(),
        Scope::State(state) => (0..store.len()).filter(|&i| states[i] == *state).collect(),
        Scope::County(state, county) => (0..store.len())
            .filter(|&i| states[i] == *state && counties[i] == *county)
            .collect(),
    }
}

/// County names reported for `state`, sorted ascending.
pub fn distinct_counties(store: &RecordStore, state: &str) -> Vec<String> {
    let set: BTreeSet<&str> = store
        .states()
        .iter()
        .zip(store.counties().iter())
        .filter(|(s, _)| s.as_str() == state)
        .map(|(_, county)| county.as_str())
        .collect();
    set.into_iter().map(str::to_string).collect()
}

/// Applies the county fallback: a county that is not reported for its state
/// is replaced by the state's first county. A state with no counties at all
/// keeps the requested scope and simply selects nothing.
pub fn resolve(scope: Scope, county_options: &[String]) -> Scope {
    match scope {
        Scope::County(state, county) if !county_options.contains(&county) => {
            match county_options.first() {
                Some(first) => {
                    tracing::debug!(%state, requested = %county, fallback = %first, "county not in state");
                    Scope::County(state, first.clone())
                }
                None => Scope::County(state, county),
            }
        }
        other => other,
    }
}
