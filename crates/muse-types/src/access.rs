use serde::{Deserialize, Serialize};

use crate::agent::{Agent, PrivacyLevel};

/// Resolved identity of whoever issued the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: String,
    #[serde(default)]
    pub is_superuser: bool,
}

impl Caller {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_superuser: false,
        }
    }

    pub fn superuser(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_superuser: true,
        }
    }
}

/// Authorization predicate over agents
pub trait AccessPolicy: Send + Sync {
    fn can_use_agent(&self, agent: &Agent, caller: &Caller) -> bool;

    /// Whether the caller may modify or delete the agent
    fn can_manage_agent(&self, agent: &Agent, caller: &Caller) -> bool {
        caller.is_superuser || agent.creator_id.as_deref() == Some(caller.user_id.as_str())
    }
}

/// Public agents are open to everyone, creators always see their own, and
/// protected agents are additionally open to superusers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAccessPolicy;

impl AccessPolicy for DefaultAccessPolicy {
    fn can_use_agent(&self, agent: &Agent, caller: &Caller) -> bool {
        match agent.privacy_level {
            PrivacyLevel::Public => true,
            _ if agent.creator_id.as_deref() == Some(caller.user_id.as_str()) => true,
            PrivacyLevel::Protected => caller.is_superuser,
            PrivacyLevel::Private => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(privacy: PrivacyLevel) -> Agent {
        let mut agent = Agent::new("Budget Helper", Some("alice".to_string()));
        agent.privacy_level = privacy;
        agent
    }

    #[test]
    fn test_private_agent_only_for_creator() {
        let policy = DefaultAccessPolicy;
        let private = agent(PrivacyLevel::Private);

        assert!(policy.can_use_agent(&private, &Caller::new("alice")));
        assert!(!policy.can_use_agent(&private, &Caller::new("bob")));
        assert!(!policy.can_use_agent(&private, &Caller::superuser("root")));
    }

    #[test]
    fn test_public_agent_for_everyone() {
        let policy = DefaultAccessPolicy;
        let public = agent(PrivacyLevel::Public);

        assert!(policy.can_use_agent(&public, &Caller::new("alice")));
        assert!(policy.can_use_agent(&public, &Caller::new("bob")));
    }

    #[test]
    fn test_protected_agent_for_superuser() {
        let policy = DefaultAccessPolicy;
        let protected = agent(PrivacyLevel::Protected);

        assert!(!policy.can_use_agent(&protected, &Caller::new("bob")));
        assert!(policy.can_use_agent(&protected, &Caller::superuser("root")));
    }

    #[test]
    fn test_manage_requires_creator_or_superuser() {
        let policy = DefaultAccessPolicy;
        let public = agent(PrivacyLevel::Public);

        assert!(policy.can_manage_agent(&public, &Caller::new("alice")));
        assert!(!policy.can_manage_agent(&public, &Caller::new("bob")));
        assert!(policy.can_manage_agent(&public, &Caller::superuser("root")));
    }
}
