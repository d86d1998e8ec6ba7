//! Pre-flight availability gate
//!
//! Runs once before any file is touched. Both checks are fatal: an
//! unreachable service or an unregistered model ends the run.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{error::AnnotationError, service::AnnotationService, Result};

/// How a requested model name is matched against registered names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelMatch {
    /// Equal names, or an untagged request matching `{name}:latest`.
    #[default]
    Exact,
    /// The request appears anywhere in a registered name.
    Substring,
}

impl ModelMatch {
    /// Return the first registered name accepted for `requested`.
    pub fn find<'a>(&self, requested: &str, registered: &'a [String]) -> Option<&'a str> {
        registered
            .iter()
            .find(|name| self.matches(requested, name))
            .map(String::as_str)
    }

    pub fn matches(&self, requested: &str, registered: &str) -> bool {
        match self {
            ModelMatch::Exact => {
                registered == requested
                    || (!requested.contains(':')
                        && registered.strip_suffix(":latest") == Some(requested))
            }
            ModelMatch::Substring => registered.contains(requested),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AvailabilityGate {
    policy: ModelMatch,
}

impl AvailabilityGate {
    pub fn new(policy: ModelMatch) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ModelMatch {
        self.policy
    }

    /// Verify the service is reachable and `model` is registered.
    ///
    /// Returns the registered name that satisfied the match.
    pub async fn verify<S>(&self, service: &S, model: &str) -> Result<String>
    where
        S: AnnotationService + ?Sized,
    {
        if model.trim().is_empty() {
            return Err(AnnotationError::InvalidModelName(
                "Model name cannot be empty".to_string(),
            ));
        }

        if !service.is_reachable().await {
            return Err(AnnotationError::Unreachable {
                url: service.endpoint().to_string(),
                message: "no response to model listing".to_string(),
            });
        }

        let registered = service.registered_models().await?;
        debug!(count = registered.len(), policy = ?self.policy, "Checking model registry");

        match self.policy.find(model, &registered) {
            Some(name) => {
                info!(requested = %model, matched = %name, "Model is available");
                Ok(name.to_string())
            }
            None => Err(AnnotationError::ModelNotFound {
                model: model.to_string(),
                available: registered,
            }),
        }
    }
}
