//! Client core for the multi-step gift recommender wizard.
//!
//! The wizard walks a user through two profile forms and a series of pairwise
//! image comparisons, then shows ranked gift suggestions computed by a remote
//! recommendation service. This crate holds everything below the view layer:
//! the session state, the two service calls with their fallback policy, and
//! the step controller. Rendering and routing live in the embedding UI.
//!
//! The one contract worth calling out: past the precondition checks, a
//! transport failure never blocks the wizard. Both remote calls degrade to
//! fixed local datasets ([`fallback`]) and report that they did so through
//! [`client::Fetched`].

pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod session;
pub mod types;
pub mod wizard;

pub use client::{Fetched, RecommendClient};
pub use config::{Config, Mode};
pub use error::{FetchFailure, WizardError};
pub use session::{ClearPolicy, RoundSelections, WizardSession};
pub use types::{
    FinalSuggestion, Gender, GiftImage, ImagePair, Occasion, OtherPersonProfile, SelfProfile,
    Style,
};
pub use wizard::{DataSource, RoundOutcome, WizardController, WizardState};
