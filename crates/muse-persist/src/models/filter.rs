use muse_types::Entry;

/// Who an entry may belong to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOwner {
    User(String),
    Agent(String),
}

/// Selection over stored entries. An entry matches when it belongs to any
/// of `owners` and passes every other set field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub owners: Vec<EntryOwner>,
    pub file_types: Vec<String>,
    pub file_name: Option<String>,
}

impl EntryFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            owners: vec![EntryOwner::User(user_id.into())],
            ..Self::default()
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.owners.push(EntryOwner::Agent(agent_id.into()));
        self
    }

    pub fn file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_types.push(file_type.into());
        self
    }

    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// No owners means nothing matches
    pub fn matches(&self, entry: &Entry) -> bool {
        let owned = self.owners.iter().any(|owner| match owner {
            EntryOwner::User(id) => entry.user_id.as_deref() == Some(id.as_str()),
            EntryOwner::Agent(id) => entry.agent_id.as_deref() == Some(id.as_str()),
        });
        if !owned {
            return false;
        }
        if !self.file_types.is_empty()
            && !self.file_types.iter().any(|t| t.eq_ignore_ascii_case(&entry.file_type))
        {
            return false;
        }
        match &self.file_name {
            Some(name) => entry.file_name.as_deref() == Some(name.as_str()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_requires_owner() {
        let entry = Entry::new(Some("alice".to_string()), "notes", "markdown");
        assert!(!EntryFilter::default().matches(&entry));
        assert!(EntryFilter::for_user("alice").matches(&entry));
        assert!(!EntryFilter::for_user("bob").matches(&entry));
    }

    #[test]
    fn test_filter_by_type_and_name() {
        let entry = Entry::new(Some("alice".to_string()), "notes", "markdown").with_file_name("a.md");

        assert!(EntryFilter::for_user("alice").file_type("Markdown").matches(&entry));
        assert!(!EntryFilter::for_user("alice").file_type("org").matches(&entry));
        assert!(EntryFilter::for_user("alice").file_name("a.md").matches(&entry));
        assert!(!EntryFilter::for_user("alice").file_name("b.md").matches(&entry));
    }

    #[test]
    fn test_agent_owner_widens_scope() {
        let mut entry = Entry::new(None, "agent knowledge", "plaintext");
        entry.agent_id = Some("agent-1".to_string());

        assert!(!EntryFilter::for_user("alice").matches(&entry));
        assert!(EntryFilter::for_user("alice").with_agent("agent-1").matches(&entry));
    }
}
