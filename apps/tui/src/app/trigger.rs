use crate::app::analysis::AnalysisMode;
use crate::app::selection::SelectionState;

/// The analyze button: its label, whether it can be pressed, and whether an
/// action it started is still running.
#[derive(Debug, Clone)]
pub struct TriggerControl {
    in_flight: bool,
    ready: bool,
    label: String,
    completed_runs: u64,
}

impl Default for TriggerControl {
    fn default() -> Self {
        Self {
            in_flight: false,
            ready: false,
            label: idle_label(false, AnalysisMode::default(), &SelectionState::default()),
            completed_runs: 0,
        }
    }
}

fn idle_label(ready: bool, mode: AnalysisMode, selection: &SelectionState) -> String {
    if !ready {
        return "Select a session first".to_string();
    }
    match mode {
        AnalysisMode::Realtime => format!("Analyze ({})", selection.visualization_type()),
        AnalysisMode::Precomputed => format!("Fetch ({})", selection.visualization_type()),
    }
}

impl TriggerControl {
    pub fn is_enabled(&self) -> bool {
        !self.in_flight && self.ready
    }

    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of actions that have started and released the trigger.
    pub const fn completed_runs(&self) -> u64 {
        self.completed_runs
    }

    /// Disables the trigger for an action. Returns false if one is already running.
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        self.label = "Analyzing...".to_string();
        true
    }

    /// Re-enables the trigger after an action, whatever its outcome.
    pub fn finish(&mut self, mode: AnalysisMode, selection: &SelectionState) {
        if !self.in_flight {
            tracing::warn!("trigger released without a running action");
            return;
        }
        self.in_flight = false;
        self.completed_runs += 1;
        self.refresh(mode, selection);
    }

    /// Recomputes label and readiness from the current selection.
    pub fn refresh(&mut self, mode: AnalysisMode, selection: &SelectionState) {
        self.ready = selection.analysis_target().is_some();
        if !self.in_flight {
            self.label = idle_label(self.ready, mode, selection);
        }
    }
}
