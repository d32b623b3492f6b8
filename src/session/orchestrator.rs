use crate::{
    clarify::manager::{
        Applied, ClarificationAnswer, ClarificationQuestion, apply_clarifications, questions_for,
    },
    compose::pipeline::{ComposeOpts, ComposedPattern, compose_pattern},
    foundation::error::{LuminaError, LuminaResult},
    intent::model::DesignIntent,
    roofline::model::RooflineConfig,
    validate::validator::validate_intent,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
/// Where a design request stands.
///
/// `Ready`, `Error` and `ManualRequested` are terminal for the current request.
pub enum OrchestratorState {
    /// Nothing processed yet.
    Idle,
    /// Validation and composition are running.
    Processing,
    /// The intent needs answers before it can be composed.
    NeedsClarification {
        /// Ranked questions for the presentation layer.
        questions: Vec<ClarificationQuestion>,
    },
    /// The design was composed.
    Ready {
        /// Final output.
        pattern: ComposedPattern,
    },
    /// Automatic composition failed.
    Error {
        /// Human-readable reason.
        message: String,
        /// Things the user can try next.
        suggestions: Vec<String>,
        /// Steer the user to manual controls rather than retrying.
        recommend_manual: bool,
    },
    /// The user chose to set the lights by hand.
    ManualRequested {
        /// Why automatic composition stopped.
        reason: String,
    },
}

impl OrchestratorState {
    /// `true` for states that end the request.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Ready { .. } | Self::Error { .. } | Self::ManualRequested { .. }
        )
    }

    /// Short state name, as used in logs and JSON.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::NeedsClarification { .. } => "needsClarification",
            Self::Ready { .. } => "ready",
            Self::Error { .. } => "error",
            Self::ManualRequested { .. } => "manualRequested",
        }
    }

    fn error(message: impl Into<String>, suggestions: Vec<String>, recommend_manual: bool) -> Self {
        Self::Error {
            message: message.into(),
            suggestions,
            recommend_manual,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// A design request threaded through the clarification loop by the caller.
///
/// Every transition consumes the session and returns the next one; the composer keeps nothing
/// between calls.
pub struct DesignSession {
    /// Current state.
    pub state: OrchestratorState,
    /// Intent as refined so far, with the latest validation results attached.
    pub intent: DesignIntent,
    /// Answer batches applied so far.
    pub rounds: u32,
}

impl DesignSession {
    /// Start a request in the `idle` state.
    pub fn new(intent: DesignIntent) -> Self {
        Self {
            state: OrchestratorState::Idle,
            intent,
            rounds: 0,
        }
    }

    /// Validate the intent and either ask questions or compose it.
    ///
    /// Domain outcomes (questions, failures, manual fallback) are reported through the returned
    /// state, never as an `Err`.
    #[tracing::instrument(skip_all, fields(rounds = self.rounds))]
    pub fn process(mut self, map: &RooflineConfig, opts: &ComposeOpts) -> Self {
        self.transition(OrchestratorState::Processing);
        let next = self.run(map, opts);
        self.transition(next);
        self
    }

    /// Fold answers into the intent and process it again.
    ///
    /// Only valid while questions are open. Answering in any other state, or answering a question
    /// that is not open, is an error; callers that want to retry should clone the session first.
    #[tracing::instrument(skip_all, fields(rounds = self.rounds, answers = answers.len()))]
    pub fn answer(
        mut self,
        answers: &[ClarificationAnswer],
        map: &RooflineConfig,
        opts: &ComposeOpts,
    ) -> LuminaResult<Self> {
        if !matches!(self.state, OrchestratorState::NeedsClarification { .. }) {
            return Err(LuminaError::clarification(format!(
                "cannot answer questions in state '{}'",
                self.state.name()
            )));
        }

        match apply_clarifications(&self.intent, answers)? {
            Applied::ManualRequested { question_id } => {
                self.transition(OrchestratorState::ManualRequested {
                    reason: format!("manual controls requested while answering '{question_id}'"),
                });
                Ok(self)
            }
            Applied::Refined(intent) => {
                self.intent = intent;
                self.rounds += 1;
                Ok(self.process(map, opts))
            }
        }
    }

    fn run(&mut self, map: &RooflineConfig, opts: &ComposeOpts) -> OrchestratorState {
        if let Err(e) = self.intent.validate() {
            return OrchestratorState::error(
                e.to_string(),
                vec!["Correct the design and try again".to_string()],
                false,
            );
        }
        if self.intent.enabled_layers().next().is_none() {
            return OrchestratorState::error(
                "design has no enabled layers",
                vec!["Describe at least one lighting layer".to_string()],
                false,
            );
        }

        self.intent = validate_intent(&self.intent, map);

        let blocking: Vec<String> = self
            .intent
            .constraints
            .iter()
            .filter(|c| !c.satisfied && !c.waived && c.alternatives.is_empty())
            .map(|c| {
                c.failure_reason
                    .clone()
                    .unwrap_or_else(|| format!("constraint '{}' is not met", c.id))
            })
            .collect();
        if !blocking.is_empty() {
            return OrchestratorState::error(
                blocking.join("; "),
                vec![
                    "Check the roofline map".to_string(),
                    "Set the lights manually".to_string(),
                ],
                true,
            );
        }

        if self.intent.needs_clarification() {
            if self.rounds >= opts.max_clarification_rounds {
                return OrchestratorState::error(
                    format!(
                        "design still ambiguous after {} clarification rounds",
                        self.rounds
                    ),
                    vec!["Set the lights manually".to_string()],
                    true,
                );
            }
            return OrchestratorState::NeedsClarification {
                questions: questions_for(&self.intent),
            };
        }

        match compose_pattern(&self.intent, map, opts) {
            Ok(pattern) => OrchestratorState::Ready { pattern },
            Err(e) => {
                let recommend_manual = e.recommends_manual();
                let suggestions = if recommend_manual {
                    vec!["Set the lights manually".to_string()]
                } else {
                    Vec::new()
                };
                OrchestratorState::error(e.to_string(), suggestions, recommend_manual)
            }
        }
    }

    fn transition(&mut self, next: OrchestratorState) {
        tracing::debug!(from = self.state.name(), to = next.name(), "session transition");
        self.state = next;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/orchestrator.rs"]
mod tests;
