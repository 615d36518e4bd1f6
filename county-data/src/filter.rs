//! Filtrage des territoires hors périmètre

use std::collections::HashSet;

/// Ensemble des états/territoires exclus, comparés sans tenir compte de la casse
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    states: HashSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            states: states.into_iter().map(|s| normalize(s.as_ref())).collect(),
        }
    }

    /// Le comté de cet état doit-il être écarté ?
    pub fn contains(&self, state: &str) -> bool {
        self.states.contains(&normalize(state))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

fn normalize(state: &str) -> String {
    state.trim().to_lowercase()
}
