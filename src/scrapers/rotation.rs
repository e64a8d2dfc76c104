//! Proxy and user-agent rotation.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::seq::IndexedRandom;

use crate::config::{ConfigError, RotationSettings};

/// Proxy and user agent used for a single request attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationChoice {
    /// Proxy URL, or `None` for a direct connection.
    pub proxy: Option<String>,
    pub user_agent: String,
}

/// Supplies a fresh [`RotationChoice`] for each attempt.
pub trait RotationSource: Send + Sync {
    fn next_choice(&self) -> RotationChoice;
}

/// Picks proxy and user agent independently and uniformly at random.
#[derive(Debug, Clone)]
pub struct RandomRotation {
    proxies: Vec<String>,
    user_agents: Vec<String>,
}

impl RandomRotation {
    /// Build from fixed pools. The user agent pool must not be empty; an empty
    /// proxy pool means every request goes out directly.
    pub fn new(proxies: Vec<String>, user_agents: Vec<String>) -> Result<Self, ConfigError> {
        let user_agents: Vec<String> = user_agents
            .into_iter()
            .filter(|ua| !ua.trim().is_empty())
            .collect();
        if user_agents.is_empty() {
            return Err(ConfigError::EmptyUserAgentPool);
        }
        let proxies = proxies
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect();
        Ok(Self {
            proxies,
            user_agents,
        })
    }

    pub fn from_settings(settings: &RotationSettings) -> Result<Self, ConfigError> {
        Self::new(settings.proxies.clone(), settings.user_agents.clone())
    }

    pub fn proxies(&self) -> &[String] {
        &self.proxies
    }

    pub fn user_agents(&self) -> &[String] {
        &self.user_agents
    }
}

impl RotationSource for RandomRotation {
    fn next_choice(&self) -> RotationChoice {
        let mut rng = rand::rng();
        let proxy = self.proxies.choose(&mut rng).cloned();
        let user_agent = self
            .user_agents
            .choose(&mut rng)
            .cloned()
            .unwrap_or_default();
        RotationChoice { proxy, user_agent }
    }
}

/// Cycles through a fixed list of choices in order.
#[derive(Debug)]
pub struct SequenceRotation {
    choices: Vec<RotationChoice>,
    next: AtomicUsize,
}

impl SequenceRotation {
    pub fn new(choices: Vec<RotationChoice>) -> Self {
        Self {
            choices,
            next: AtomicUsize::new(0),
        }
    }

    /// A single direct-connection choice with the given user agent, repeated forever.
    pub fn direct(user_agent: &str) -> Self {
        Self::new(vec![RotationChoice {
            proxy: None,
            user_agent: user_agent.to_string(),
        }])
    }
}

impl RotationSource for SequenceRotation {
    fn next_choice(&self) -> RotationChoice {
        if self.choices.is_empty() {
            return RotationChoice {
                proxy: None,
                user_agent: String::new(),
            };
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.choices.len();
        self.choices[index].clone()
    }
}
