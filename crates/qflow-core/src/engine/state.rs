//! Máquina de estados lineal con dos salidas de fallback.
//!
//! ```text
//! Init -> Exporting -> Quantizing -> Done
//!            |failure       |failure
//!            v              v
//!     FallbackToSource  FallbackToExported
//!            |              |
//!            v              v
//!          Done            Done
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Init,
    Exporting,
    Quantizing,
    FallbackToSource,
    FallbackToExported,
    Done,
}

impl PipelineState {
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!((self, next),
                 (Init, Exporting)
                 | (Exporting, Quantizing)
                 | (Exporting, FallbackToSource)
                 | (Quantizing, Done)
                 | (Quantizing, FallbackToExported)
                 | (FallbackToSource, Done)
                 | (FallbackToExported, Done))
    }

    pub fn is_terminal(self) -> bool {
        self == PipelineState::Done
    }
}

/// Estado actual más la traza de estados visitados.
#[derive(Debug, Clone)]
pub struct StateMachine {
    trace: Vec<PipelineState>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self { trace: vec![PipelineState::Init] }
    }

    pub fn current(&self) -> PipelineState {
        self.trace.last().copied().unwrap_or(PipelineState::Init)
    }

    pub fn advance(&mut self, next: PipelineState) -> Result<(), PipelineError> {
        let current = self.current();
        if !current.can_transition_to(next) {
            return Err(PipelineError::Internal(format!("invalid transition {current:?} -> {next:?}")));
        }
        debug!("pipeline state {current:?} -> {next:?}");
        self.trace.push(next);
        Ok(())
    }

    pub fn trace(&self) -> &[PipelineState] {
        &self.trace
    }

    pub fn into_trace(self) -> Vec<PipelineState> {
        self.trace
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineState::*;

    #[test]
    fn happy_path_transitions() {
        let mut m = StateMachine::new();
        for s in [Exporting, Quantizing, Done] {
            m.advance(s).expect("valid transition");
        }
        assert!(m.current().is_terminal());
        assert_eq!(m.trace(), &[Init, Exporting, Quantizing, Done]);
    }

    #[test]
    fn cannot_skip_export_or_leave_done() {
        let mut m = StateMachine::new();
        assert!(m.advance(Quantizing).is_err());
        assert!(m.advance(Done).is_err());
        m.advance(Exporting).expect("export");
        assert!(m.advance(FallbackToExported).is_err());
        m.advance(FallbackToSource).expect("fallback");
        m.advance(Done).expect("done");
        assert!(m.advance(Exporting).is_err());
    }
}
