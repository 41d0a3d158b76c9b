use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::client::{Fetched, RecommendClient};
use crate::config::Config;
use crate::error::WizardError;
use crate::session::{RoundSelections, WizardSession};
use crate::types::{FinalSuggestion, ImagePair, OtherPersonProfile, SelfProfile};

/// Where the wizard currently is. Fetches happen inside the submit calls, so
/// the two "fetching" phases are simply the awaited sections of
/// [`WizardController::submit_other_profile`] and
/// [`WizardController::submit_round_choice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    CollectingSelf,
    CollectingOther,
    ChoosingImages { round: usize },
    ShowingSuggestions,
}

impl WizardState {
    fn name(self) -> &'static str {
        match self {
            WizardState::CollectingSelf => "CollectingSelf",
            WizardState::CollectingOther => "CollectingOther",
            WizardState::ChoosingImages { .. } => "ChoosingImages",
            WizardState::ShowingSuggestions => "ShowingSuggestions",
        }
    }
}

/// Whether a step was answered by the real service or by fallback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Remote,
    Fallback,
}

impl<T> From<&Fetched<T>> for DataSource {
    fn from(fetched: &Fetched<T>) -> Self {
        if fetched.is_fallback() {
            DataSource::Fallback
        } else {
            DataSource::Remote
        }
    }
}

/// What happened after a round choice was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// More comparisons remain; the view should show this round next.
    NextRound { round: usize },
    /// That was the last round: final suggestions are fetched and the
    /// transient wizard state is cleared.
    Finished { source: DataSource },
}

/// Drives the ordered wizard steps over a session and a client.
///
/// Each step reads prior state and writes the next, gated so no step can run
/// without its prerequisites. The view layer calls the submit methods in
/// response to user input and renders from the accessors.
pub struct WizardController {
    session: WizardSession,
    client: RecommendClient,
    state: WizardState,
    pending: RoundSelections,
}

impl WizardController {
    pub fn new(config: Config) -> Self {
        Self::with_parts(RecommendClient::new(config), WizardSession::new())
    }

    /// Build from an existing client and session, for injection in tests or
    /// when the embedder wants a non-default clear policy.
    pub fn with_parts(client: RecommendClient, session: WizardSession) -> Self {
        Self {
            session,
            client,
            state: WizardState::CollectingSelf,
            pending: RoundSelections::new(),
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    /// Number of comparison rounds, once pairs have been fetched.
    pub fn total_rounds(&self) -> usize {
        self.session.image_pairs().map_or(0, <[ImagePair]>::len)
    }

    /// The pair the view should render for the given round.
    pub fn pair(&self, round: usize) -> Option<&ImagePair> {
        self.session.image_pairs()?.get(round)
    }

    /// Read-only accessor for the results page. Depending on the session's
    /// clear policy this keeps answering after the wizard resets.
    pub fn final_suggestions(&self) -> Option<&[FinalSuggestion]> {
        self.session.final_suggestions()
    }

    /// Accept the gift giver's profile and move on to the recipient form.
    /// Allowed again from the recipient form, which overwrites the earlier
    /// answers before any fetch has consumed them.
    pub fn submit_self_profile(&mut self, profile: SelfProfile) -> Result<(), WizardError> {
        match self.state {
            WizardState::CollectingSelf | WizardState::CollectingOther => {}
            state => {
                return Err(WizardError::StepOutOfOrder {
                    state: state.name(),
                    action: "submit the self profile",
                })
            }
        }
        profile.validate()?;
        self.session.set_self_profile(profile);
        self.state = WizardState::CollectingOther;
        Ok(())
    }

    /// Accept the recipient's profile and fetch the comparison pairs before
    /// allowing navigation onward. Returns where the pairs came from.
    pub async fn submit_other_profile(
        &mut self,
        profile: OtherPersonProfile,
        cancel: Option<&CancellationToken>,
    ) -> Result<DataSource, WizardError> {
        if self.state != WizardState::CollectingOther {
            return Err(WizardError::StepOutOfOrder {
                state: self.state.name(),
                action: "submit the other person's profile",
            });
        }
        profile.validate()?;
        self.session.set_other_profile(profile);

        let fetched = self.client.fetch_image_pairs(&mut self.session, cancel).await?;
        let source = DataSource::from(&fetched);

        self.pending = RoundSelections::new();
        self.state = WizardState::ChoosingImages { round: 0 };
        info!(
            "Wizard entering image comparison: {} rounds ({source:?})",
            self.total_rounds()
        );
        Ok(source)
    }

    /// Record the user's pick for the current round.
    ///
    /// Only the current round is accepted and the value must name one of its
    /// two candidates. On the last round this assembles the full selection
    /// set, fetches the final suggestions, and clears the transient state.
    /// A cancelled final fetch leaves the round uncommitted so the same
    /// choice can be resubmitted.
    pub async fn submit_round_choice(
        &mut self,
        round: usize,
        value: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<RoundOutcome, WizardError> {
        let current = match self.state {
            WizardState::ChoosingImages { round } => round,
            state => {
                return Err(WizardError::StepOutOfOrder {
                    state: state.name(),
                    action: "submit a round choice",
                })
            }
        };
        if round != current {
            return Err(WizardError::RoundOutOfOrder {
                got: round,
                expected: current,
            });
        }
        let pair = self.pair(round).ok_or(WizardError::PairsMissing)?;
        if !pair.contains(value) {
            return Err(WizardError::UnknownCandidate {
                round,
                value: value.to_string(),
            });
        }

        let total = self.total_rounds();
        if round + 1 < total {
            self.pending.record(round, value)?;
            self.state = WizardState::ChoosingImages { round: round + 1 };
            return Ok(RoundOutcome::NextRound { round: round + 1 });
        }

        // Last round: assemble the complete set on a copy so a cancelled
        // fetch leaves `pending` resumable.
        let mut selections = self.pending.clone();
        selections.record(round, value)?;
        self.session.record_selections(selections);

        let fetched = match self
            .client
            .fetch_final_suggestions(&mut self.session, cancel)
            .await
        {
            Ok(fetched) => fetched,
            Err(err) => {
                // Nothing may stay committed for a fetch that never settled.
                self.session.drop_selections();
                return Err(err);
            }
        };
        let source = DataSource::from(&fetched);

        self.session.clear();
        self.pending = RoundSelections::new();
        self.state = WizardState::ShowingSuggestions;
        info!("Wizard finished: {} suggestions ({source:?})", fetched.data().len());
        Ok(RoundOutcome::Finished { source })
    }

    /// Re-enter the first form. Comparison pairs and recorded choices are
    /// dropped so a fresh submit refetches cleanly; stored profiles stay and
    /// are overwritten on resubmit.
    pub fn back_to_self(&mut self) {
        self.session.drop_image_pairs();
        self.pending = RoundSelections::new();
        self.state = WizardState::CollectingSelf;
    }

    /// Re-enter the recipient form, keeping the self profile.
    pub fn back_to_other(&mut self) {
        if self.state == WizardState::CollectingSelf {
            return;
        }
        self.session.drop_image_pairs();
        self.pending = RoundSelections::new();
        self.state = WizardState::CollectingOther;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gender, Occasion, Style};
    use url::Url;

    // Nothing listens on the discard port, so every fetch degrades to the
    // fallback dataset without waiting on a timeout.
    fn offline_controller() -> WizardController {
        let config = Config::with_base_url(Url::parse("http://127.0.0.1:9").unwrap());
        WizardController::new(config)
    }

    fn self_profile() -> SelfProfile {
        SelfProfile {
            age: 70,
            budget: 20,
            relationship: 85,
            occasion: Occasion::Birthday,
        }
    }

    fn other_profile() -> OtherPersonProfile {
        OtherPersonProfile {
            gender: Gender::Male,
            personality: 10,
            technical: 80,
            creative: 20,
            managerial: 40,
            academic: 60,
            style: Style::Modern,
        }
    }

    #[tokio::test]
    async fn test_steps_are_gated() {
        let mut controller = offline_controller();
        assert_eq!(controller.state(), WizardState::CollectingSelf);

        // The recipient form cannot run before the self profile is in.
        let err = controller
            .submit_other_profile(other_profile(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::StepOutOfOrder { .. }));
    }

    #[tokio::test]
    async fn test_self_profile_can_be_resubmitted_before_fetch() {
        let mut controller = offline_controller();
        controller.submit_self_profile(self_profile()).unwrap();
        assert_eq!(controller.state(), WizardState::CollectingOther);

        // Overwriting from the next form is allowed until a fetch consumes it.
        let mut revised = self_profile();
        revised.budget = 90;
        controller.submit_self_profile(revised).unwrap();
        assert_eq!(controller.state(), WizardState::CollectingOther);
    }

    #[tokio::test]
    async fn test_invalid_profile_rejected() {
        let mut controller = offline_controller();
        let mut bad = self_profile();
        bad.relationship = 150;
        let err = controller.submit_self_profile(bad).unwrap_err();
        assert!(matches!(err, WizardError::ScoreOutOfRange { .. }));
        assert_eq!(controller.state(), WizardState::CollectingSelf);
    }

    #[tokio::test]
    async fn test_offline_run_reaches_choosing_with_fallback() {
        let mut controller = offline_controller();
        controller.submit_self_profile(self_profile()).unwrap();
        let source = controller
            .submit_other_profile(other_profile(), None)
            .await
            .unwrap();
        assert_eq!(source, DataSource::Fallback);
        assert_eq!(controller.state(), WizardState::ChoosingImages { round: 0 });
        assert_eq!(controller.total_rounds(), 5);
    }

    #[tokio::test]
    async fn test_round_choices_enforce_order_and_candidates() {
        let mut controller = offline_controller();
        controller.submit_self_profile(self_profile()).unwrap();
        controller
            .submit_other_profile(other_profile(), None)
            .await
            .unwrap();

        // Skipping ahead is rejected.
        let err = controller
            .submit_round_choice(2, "gift_001", None)
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::RoundOutOfOrder { got: 2, expected: 0 }));

        // A value outside the round's pair is rejected.
        let err = controller
            .submit_round_choice(0, "gift_999", None)
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::UnknownCandidate { .. }));

        // A proper pick advances.
        let left = controller.pair(0).unwrap().left.value.clone();
        let outcome = controller.submit_round_choice(0, &left, None).await.unwrap();
        assert_eq!(outcome, RoundOutcome::NextRound { round: 1 });
    }

    #[tokio::test]
    async fn test_back_navigation_drops_pairs() {
        let mut controller = offline_controller();
        controller.submit_self_profile(self_profile()).unwrap();
        controller
            .submit_other_profile(other_profile(), None)
            .await
            .unwrap();
        let left = controller.pair(0).unwrap().left.value.clone();
        controller.submit_round_choice(0, &left, None).await.unwrap();

        controller.back_to_other();
        assert_eq!(controller.state(), WizardState::CollectingOther);
        assert_eq!(controller.total_rounds(), 0);

        // Resubmitting refetches a fresh set of pairs and restarts rounds.
        controller
            .submit_other_profile(other_profile(), None)
            .await
            .unwrap();
        assert_eq!(controller.state(), WizardState::ChoosingImages { round: 0 });
    }

    #[tokio::test]
    async fn test_cancelled_final_fetch_is_resumable() {
        let mut controller = offline_controller();
        controller.submit_self_profile(self_profile()).unwrap();
        controller
            .submit_other_profile(other_profile(), None)
            .await
            .unwrap();
        for round in 0..4 {
            let choice = controller.pair(round).unwrap().left.value.clone();
            controller.submit_round_choice(round, &choice, None).await.unwrap();
        }

        let token = CancellationToken::new();
        token.cancel();
        let last = controller.pair(4).unwrap().left.value.clone();
        let err = controller
            .submit_round_choice(4, &last, Some(&token))
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::Cancelled));
        assert_eq!(controller.state(), WizardState::ChoosingImages { round: 4 });
        assert!(controller.final_suggestions().is_none());

        // The interrupted round was never committed anywhere, so the same
        // choice goes through cleanly on resubmit.
        let outcome = controller.submit_round_choice(4, &last, None).await.unwrap();
        assert!(matches!(outcome, RoundOutcome::Finished { .. }));
        assert_eq!(controller.state(), WizardState::ShowingSuggestions);
    }

    #[tokio::test]
    async fn test_cancelled_pair_fetch_leaves_state() {
        let mut controller = offline_controller();
        controller.submit_self_profile(self_profile()).unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let err = controller
            .submit_other_profile(other_profile(), Some(&token))
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::Cancelled));
        assert_eq!(controller.state(), WizardState::CollectingOther);
        assert_eq!(controller.total_rounds(), 0);
    }
}
