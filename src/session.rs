use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::error::WizardError;
use crate::types::{FinalSuggestion, ImagePair, OtherPersonProfile, SelfProfile};

/// Append-only record of which candidate won each comparison round.
///
/// Entries can only be added for the next round in order, so the set can never
/// have gaps. On the wire it serializes to the `selectedImages` object the
/// backend expects: `{"image0": "gift_001", "image1": "gift_002", ...}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundSelections {
    chosen: Vec<String>,
}

impl RoundSelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the winner of `round`. Only the next unrecorded round is
    /// accepted; anything else is an ordering error.
    pub fn record(&mut self, round: usize, value: impl Into<String>) -> Result<(), WizardError> {
        if round != self.chosen.len() {
            return Err(WizardError::RoundOutOfOrder {
                got: round,
                expected: self.chosen.len(),
            });
        }
        self.chosen.push(value.into());
        Ok(())
    }

    pub fn get(&self, round: usize) -> Option<&str> {
        self.chosen.get(round).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// Whether one winner has been recorded for every generated pair.
    pub fn is_complete(&self, expected_rounds: usize) -> bool {
        self.chosen.len() == expected_rounds
    }
}

impl Serialize for RoundSelections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.chosen.len()))?;
        for (round, value) in self.chosen.iter().enumerate() {
            map.serialize_entry(&format!("image{round}"), value)?;
        }
        map.end()
    }
}

/// What `clear()` does with previously fetched final suggestions.
///
/// The transient wizard state (profiles, pairs, selections) is always dropped;
/// retaining the suggestion list lets the results page keep rendering after
/// the wizard resets for a fresh run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearPolicy {
    #[default]
    RetainSuggestions,
    DropSuggestions,
}

/// State for one in-flight wizard run.
///
/// Explicitly constructed and owned by the controller; there is exactly one
/// writer at a time because the wizard flow is linear.
#[derive(Debug, Default)]
pub struct WizardSession {
    self_profile: Option<SelfProfile>,
    other_profile: Option<OtherPersonProfile>,
    image_pairs: Option<Vec<ImagePair>>,
    selections: Option<RoundSelections>,
    final_suggestions: Option<Vec<FinalSuggestion>>,
    clear_policy: ClearPolicy,
}

impl WizardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clear_policy(policy: ClearPolicy) -> Self {
        Self {
            clear_policy: policy,
            ..Self::default()
        }
    }

    pub fn set_self_profile(&mut self, profile: SelfProfile) {
        self.self_profile = Some(profile);
    }

    pub fn set_other_profile(&mut self, profile: OtherPersonProfile) {
        self.other_profile = Some(profile);
    }

    pub fn self_profile(&self) -> Option<&SelfProfile> {
        self.self_profile.as_ref()
    }

    pub fn other_profile(&self) -> Option<&OtherPersonProfile> {
        self.other_profile.as_ref()
    }

    /// The last fetched comparison pairs, or None before the first fetch.
    pub fn image_pairs(&self) -> Option<&[ImagePair]> {
        self.image_pairs.as_deref()
    }

    /// Replace the comparison pairs. Any recorded selections refer to the old
    /// pairs and are invalidated.
    pub fn set_image_pairs(&mut self, pairs: Vec<ImagePair>) {
        if self.selections.take().is_some() {
            debug!("Image pairs replaced, dropping stale round selections");
        }
        self.image_pairs = Some(pairs);
    }

    /// Drop the pairs and any selections that referred to them, e.g. when
    /// the user navigates back to a profile form.
    pub fn drop_image_pairs(&mut self) {
        self.image_pairs = None;
        self.selections = None;
    }

    /// Store a caller-assembled selection set verbatim.
    pub fn record_selections(&mut self, selections: RoundSelections) {
        self.selections = Some(selections);
    }

    pub fn selections(&self) -> Option<&RoundSelections> {
        self.selections.as_ref()
    }

    /// Drop a recorded selection set, e.g. when the fetch it was assembled
    /// for was cancelled before settling.
    pub fn drop_selections(&mut self) {
        self.selections = None;
    }

    pub fn set_final_suggestions(&mut self, suggestions: Vec<FinalSuggestion>) {
        self.final_suggestions = Some(suggestions);
    }

    pub fn final_suggestions(&self) -> Option<&[FinalSuggestion]> {
        self.final_suggestions.as_deref()
    }

    /// Reset the transient wizard state. Idempotent. The final suggestion
    /// list survives or not depending on the session's [`ClearPolicy`].
    pub fn clear(&mut self) {
        self.self_profile = None;
        self.other_profile = None;
        self.image_pairs = None;
        self.selections = None;
        if self.clear_policy == ClearPolicy::DropSuggestions {
            self.final_suggestions = None;
        }
    }
}
