use crate::domain::{RealtimeBatch, Session, VisualizationType};

/// Identifies the round a session request was issued for.
///
/// `generation` increases on every round change, so a response for an older
/// selection of the same round is still recognised as stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTag {
    pub generation: u64,
    pub round: String,
}

/// What the user has picked so far.
#[derive(Debug, Default)]
pub struct SelectionState {
    current_round: Option<String>,
    selected_session: Option<Session>,
    visualization_type: VisualizationType,
    last_realtime_batch: Option<RealtimeBatch>,
    generation: u64,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_round(&self) -> Option<&str> {
        self.current_round.as_deref()
    }

    pub const fn selected_session(&self) -> Option<&Session> {
        self.selected_session.as_ref()
    }

    pub const fn visualization_type(&self) -> VisualizationType {
        self.visualization_type
    }

    pub const fn last_realtime_batch(&self) -> Option<&RealtimeBatch> {
        self.last_realtime_batch.as_ref()
    }

    /// Changes the round. Session and cached batch are cleared before the new
    /// round is stored. Returns the tag a session fetch for the new round must
    /// carry, or `None` when the round was cleared.
    pub fn set_round(&mut self, round: Option<String>) -> Option<RoundTag> {
        self.clear_session();
        self.clear_realtime_cache();
        self.generation += 1;
        self.current_round = round.filter(|round| !round.trim().is_empty());

        self.current_round.as_ref().map(|round| RoundTag {
            generation: self.generation,
            round: round.clone(),
        })
    }

    /// A different session invalidates the cached batch, which belongs to the old one.
    pub fn set_session(&mut self, session: Option<Session>) {
        if self.selected_session != session {
            self.last_realtime_batch = None;
        }
        self.selected_session = session;
    }

    pub fn set_visualization_type(&mut self, kind: VisualizationType) {
        self.visualization_type = kind;
    }

    pub fn cache_realtime_batch(&mut self, batch: RealtimeBatch) {
        self.last_realtime_batch = Some(batch);
    }

    pub fn clear_session(&mut self) {
        self.set_session(None);
    }

    pub fn clear_realtime_cache(&mut self) {
        self.last_realtime_batch = None;
    }

    /// Whether a session list fetched under `tag` still belongs to the current round.
    pub fn accepts_sessions(&self, tag: &RoundTag) -> bool {
        tag.generation == self.generation && self.current_round.as_deref() == Some(&tag.round)
    }

    /// Round and session, when both are chosen.
    pub fn analysis_target(&self) -> Option<(String, Session)> {
        match (&self.current_round, &self.selected_session) {
            (Some(round), Some(session)) => Some((round.clone(), session.clone())),
            _ => None,
        }
    }
}
