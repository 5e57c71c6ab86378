/// The four panels of the analysis wizard, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    RoundSelect = 1,
    SessionSelect = 2,
    VisualizationSelect = 3,
    Results = 4,
}

impl WizardStep {
    pub const ALL: [Self; 4] = [
        Self::RoundSelect,
        Self::SessionSelect,
        Self::VisualizationSelect,
        Self::Results,
    ];

    pub const fn number(self) -> u8 {
        self as u8
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::RoundSelect => "1. Round",
            Self::SessionSelect => "2. Session",
            Self::VisualizationSelect => "3. Visualization",
            Self::Results => "4. Results",
        }
    }
}

/// Tracks which wizard panels are shown. Panel N is visible iff every panel
/// before it is visible.
#[derive(Debug, Clone)]
pub struct Wizard {
    step: WizardStep,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub const fn new() -> Self {
        Self {
            step: WizardStep::RoundSelect,
        }
    }

    pub const fn step(&self) -> WizardStep {
        self.step
    }

    /// Shows panels `1..=step` and hides the rest. Re-entering the current step is a no-op.
    pub fn go_to(&mut self, step: WizardStep) {
        if self.step != step {
            tracing::debug!(from = self.step.number(), to = step.number(), "wizard step");
            self.step = step;
        }
    }

    pub fn is_visible(&self, panel: WizardStep) -> bool {
        panel <= self.step
    }

    pub fn visible_panels(&self) -> impl Iterator<Item = WizardStep> + '_ {
        WizardStep::ALL
            .into_iter()
            .filter(move |panel| self.is_visible(*panel))
    }

    pub fn on_round_selected(&mut self, has_round: bool) {
        self.go_to(if has_round {
            WizardStep::SessionSelect
        } else {
            WizardStep::RoundSelect
        });
    }

    pub fn on_session_selected(&mut self, has_session: bool) {
        self.go_to(if has_session {
            WizardStep::VisualizationSelect
        } else {
            WizardStep::SessionSelect
        });
    }

    pub fn on_analysis_succeeded(&mut self) {
        self.go_to(WizardStep::Results);
    }
}
