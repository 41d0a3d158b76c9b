use serde::{Deserialize, Serialize};

use crate::error::WizardError;

/// The gift giver's answers from the first wizard step.
/// All sliders are on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfProfile {
    /// How old the giver feels (0-100).
    pub age: u8,
    /// Willingness to spend (0-100).
    pub budget: u8,
    /// Closeness to the recipient: 0 acquaintance, 100 more than a friend.
    pub relationship: u8,
    pub occasion: Occasion,
}

impl SelfProfile {
    /// Check that every slider value is within the 0-100 scale.
    pub fn validate(&self) -> Result<(), WizardError> {
        check_score("age", self.age)?;
        check_score("budget", self.budget)?;
        check_score("relationship", self.relationship)
    }
}

/// The recipient's answers from the second wizard step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherPersonProfile {
    pub gender: Gender,
    /// Introvert (0) to extrovert (100).
    pub personality: u8,
    pub technical: u8,
    pub creative: u8,
    pub managerial: u8,
    pub academic: u8,
    pub style: Style,
}

impl OtherPersonProfile {
    pub fn validate(&self) -> Result<(), WizardError> {
        check_score("personality", self.personality)?;
        check_score("technical", self.technical)?;
        check_score("creative", self.creative)?;
        check_score("managerial", self.managerial)?;
        check_score("academic", self.academic)
    }
}

fn check_score(field: &'static str, value: u8) -> Result<(), WizardError> {
    if value > 100 {
        return Err(WizardError::ScoreOutOfRange { field, value });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occasion {
    Birthday,
    Anniversary,
    Graduation,
    Holiday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Style {
    Classic,
    Modern,
    Trendy,
    Minimalist,
}

/// One candidate image inside a comparison pair.
/// `value` is the backend's opaque gift id; the view layer only displays
/// `path` and `name` and reports `value` back on click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftImage {
    pub path: String,
    pub value: String,
    pub name: String,
}

/// An ordered comparison pair. Left/right placement is meaningful: it decides
/// which slot a click in the view layer records.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePair {
    pub left: GiftImage,
    pub right: GiftImage,
}

impl ImagePair {
    /// Whether `value` names one of the two candidates.
    pub fn contains(&self, value: &str) -> bool {
        self.left.value == value || self.right.value == value
    }
}

/// A ranked gift suggestion from the final remote call.
/// `category` and `fuzzy_score` are only present when the real backend
/// answered; the fallback dataset leaves them empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSuggestion {
    pub path: String,
    pub value: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amazon_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy_score: Option<f64>,
}
