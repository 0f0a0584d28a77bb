use arbor_core::NodeId;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Lifecycle of one node's visual element (and of the edge leading into it).
///
/// `Absent → Entering → Settled → Exiting → Absent`. The transient states end at `until`, in
/// the same time units the drawing layer passes to [`VisualStates::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum VisualState {
    Absent,
    Entering { until: f64 },
    Settled,
    Exiting { until: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdvanceReport {
    /// Finished entering.
    pub settled: Vec<NodeId>,
    /// Finished exiting; their elements can be destroyed.
    pub removed: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct VisualStates {
    states: FxHashMap<NodeId, VisualState>,
}

impl VisualStates {
    pub(crate) fn get(&self, id: NodeId) -> VisualState {
        self.states.get(&id).copied().unwrap_or(VisualState::Absent)
    }

    /// New element, or one that was still shrinking away and gets reused.
    pub(crate) fn enter(&mut self, id: NodeId, until: f64) {
        self.states.insert(id, VisualState::Entering { until });
    }

    /// Element stays; an unfinished entrance is stretched over the new transition.
    pub(crate) fn update(&mut self, id: NodeId, until: f64) {
        let next = match self.get(id) {
            VisualState::Entering { .. } => VisualState::Entering { until },
            VisualState::Absent | VisualState::Exiting { .. } => {
                tracing::warn!(%id, "updating an element that is not on screen");
                VisualState::Entering { until }
            }
            VisualState::Settled => VisualState::Settled,
        };
        self.states.insert(id, next);
    }

    pub(crate) fn exit(&mut self, id: NodeId, until: f64) {
        self.states.insert(id, VisualState::Exiting { until });
    }

    pub(crate) fn advance(&mut self, now: f64) -> AdvanceReport {
        let mut report = AdvanceReport::default();
        self.states.retain(|&id, state| match *state {
            VisualState::Entering { until } if until <= now => {
                *state = VisualState::Settled;
                report.settled.push(id);
                true
            }
            VisualState::Exiting { until } if until <= now => {
                report.removed.push(id);
                false
            }
            VisualState::Absent => false,
            _ => true,
        });
        report.settled.sort_unstable();
        report.removed.sort_unstable();
        report
    }

    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }
}
