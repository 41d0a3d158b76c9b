use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{FetchFailure, WizardError};
use crate::fallback;
use crate::session::{RoundSelections, WizardSession};
use crate::types::{FinalSuggestion, GiftImage, ImagePair, OtherPersonProfile, SelfProfile};

const PAIRS_PATH: &str = "/api/generate-image-pairs";
const FINAL_PATH: &str = "/api/generate-final-images";

/// How a remote call was answered.
///
/// A transport, status, or parse failure is folded into `Fallback` with the
/// locally substituted dataset and the reason, so the wizard keeps moving
/// and callers can still tell which path was taken.
#[derive(Debug)]
pub enum Fetched<T> {
    /// The service answered with a 2xx status and a parseable body.
    Remote(T),
    /// The service was unreachable or answered with garbage; `T` is the
    /// built-in fallback dataset.
    Fallback(T, FetchFailure),
}

impl<T> Fetched<T> {
    pub fn data(&self) -> &T {
        match self {
            Fetched::Remote(data) | Fetched::Fallback(data, _) => data,
        }
    }

    pub fn into_data(self) -> T {
        match self {
            Fetched::Remote(data) | Fetched::Fallback(data, _) => data,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Fetched::Fallback(..))
    }
}

#[derive(Serialize)]
struct PairsRequest<'a> {
    user: &'a SelfProfile,
    other: &'a OtherPersonProfile,
}

#[derive(Deserialize)]
struct PairsResponse {
    #[serde(rename = "imagePairs")]
    image_pairs: Vec<Vec<GiftImage>>,
}

#[derive(Serialize)]
struct FinalRequest<'a> {
    user: &'a SelfProfile,
    other: &'a OtherPersonProfile,
    #[serde(rename = "selectedImages")]
    selected_images: &'a RoundSelections,
}

#[derive(Deserialize)]
struct FinalResponse {
    #[serde(rename = "finalImages")]
    final_images: Vec<FinalSuggestion>,
}

/// Client for the two recommendation service calls.
///
/// Both operations share one contract: precondition failures surface as
/// [`WizardError`] before any network I/O, and every failure past that point
/// substitutes the fixed fallback dataset instead of erroring. A transport
/// failure must never block the wizard.
pub struct RecommendClient {
    http: reqwest::Client,
    config: Config,
}

impl RecommendClient {
    pub fn new(config: Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build reqwest client");
        Self { http, config }
    }

    /// Ask the service to generate comparison pairs for the stored profiles.
    ///
    /// Requires both profiles in the session. The session's pair state is
    /// overwritten with whatever this returns, remote or fallback, and any
    /// stale selections are dropped with it.
    pub async fn fetch_image_pairs(
        &self,
        session: &mut WizardSession,
        cancel: Option<&CancellationToken>,
    ) -> Result<Fetched<Vec<ImagePair>>, WizardError> {
        let fetched = {
            let (user, other) = match (session.self_profile(), session.other_profile()) {
                (Some(user), Some(other)) => (user, other),
                _ => return Err(WizardError::ProfilesMissing),
            };

            let url = self.config.endpoint(PAIRS_PATH);
            let body = PairsRequest { user, other };
            self.post_json::<_, PairsResponse>(url, &body, cancel)
                .await?
                .and_then(|response| pairs_from_wire(response.image_pairs))
        };

        let outcome = match fetched {
            Ok(pairs) => {
                info!("Received {} image pairs from service", pairs.len());
                Fetched::Remote(pairs)
            }
            Err(failure) => {
                warn!("Image pair fetch failed ({failure}), using fallback mock data");
                Fetched::Fallback(fallback::image_pairs(), failure)
            }
        };

        session.set_image_pairs(outcome.data().clone());
        Ok(outcome)
    }

    /// Ask the service to rank final suggestions from the completed rounds.
    ///
    /// Requires profiles, pairs, and one recorded choice per pair. The
    /// resulting list is stored in the session for the results page.
    pub async fn fetch_final_suggestions(
        &self,
        session: &mut WizardSession,
        cancel: Option<&CancellationToken>,
    ) -> Result<Fetched<Vec<FinalSuggestion>>, WizardError> {
        let fetched = {
            let (user, other) = match (session.self_profile(), session.other_profile()) {
                (Some(user), Some(other)) => (user, other),
                _ => return Err(WizardError::ProfilesMissing),
            };
            let pairs = session.image_pairs().ok_or(WizardError::PairsMissing)?;
            let selections = session.selections();
            let recorded = selections.map_or(0, RoundSelections::len);
            let selections = match selections {
                Some(s) if s.is_complete(pairs.len()) => s,
                _ => {
                    return Err(WizardError::SelectionsIncomplete {
                        recorded,
                        expected: pairs.len(),
                    })
                }
            };

            let url = self.config.endpoint(FINAL_PATH);
            let body = FinalRequest {
                user,
                other,
                selected_images: selections,
            };
            self.post_json::<_, FinalResponse>(url, &body, cancel)
                .await?
                .map(|response| response.final_images)
        };

        let outcome = match fetched {
            Ok(suggestions) => {
                info!("Received {} final suggestions from service", suggestions.len());
                Fetched::Remote(suggestions)
            }
            Err(failure) => {
                warn!("Final suggestion fetch failed ({failure}), using fallback mock data");
                Fetched::Fallback(fallback::final_suggestions(), failure)
            }
        };

        session.set_final_suggestions(outcome.data().clone());
        Ok(outcome)
    }

    /// POST a JSON body and parse a JSON response.
    ///
    /// The outer error is cancellation only; everything that went wrong on
    /// the wire comes back as an inner [`FetchFailure`] for the caller to
    /// fold into fallback data. If the token fires first, the request is
    /// abandoned before any state is committed.
    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        cancel: Option<&CancellationToken>,
    ) -> Result<Result<R, FetchFailure>, WizardError> {
        let send = async {
            let response = self.http.post(url).json(body).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read body>".to_string());
                return Err(FetchFailure::Status {
                    status,
                    body: truncate(body, 1024),
                });
            }
            let text = response.text().await?;
            Ok(serde_json::from_str(&text)?)
        };

        match cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(WizardError::Cancelled),
                result = send => Ok(result),
            },
            None => Ok(send.await),
        }
    }
}

/// The wire encodes a pair as a two-element array; anything else is treated
/// as a malformed body. An empty pair list is too: a wizard with zero rounds
/// has nowhere to go, so it degrades to the fallback set instead.
fn pairs_from_wire(raw: Vec<Vec<GiftImage>>) -> Result<Vec<ImagePair>, FetchFailure> {
    if raw.is_empty() {
        return Err(FetchFailure::EmptyPairs);
    }
    raw.into_iter()
        .map(|pair| {
            let [left, right] = <[GiftImage; 2]>::try_from(pair)
                .map_err(|bad| FetchFailure::MalformedPair(bad.len()))?;
            Ok(ImagePair { left, right })
        })
        .collect()
}

/// Cap a diagnostic body for logging. The cut must land on a char boundary
/// or slicing a multi-byte body would panic mid-fallback.
fn truncate(text: String, limit: usize) -> String {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
