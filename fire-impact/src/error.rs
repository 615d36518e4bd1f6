//! Erreurs côté requête

use thiserror::Error;

/// Requête refusée avant tout calcul géométrique
///
/// `field` nomme l'entrée fautive, pour une réponse 4xx précise côté service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}: {reason}")]
pub struct InvalidRequestError {
    pub field: &'static str,
    pub reason: String,
}

impl InvalidRequestError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
