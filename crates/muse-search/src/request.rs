use muse_types::{Agent, SearchType};

pub const DEFAULT_RESULT_COUNT: usize = 5;

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub q: String,
    pub n: usize,
    pub t: SearchType,
    pub rerank: bool,
    /// `None` means unbounded
    pub max_distance: Option<f64>,
    pub dedupe: bool,
    pub agent: Option<Agent>,
}

impl SearchRequest {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            n: DEFAULT_RESULT_COUNT,
            t: SearchType::All,
            rerank: false,
            max_distance: None,
            dedupe: true,
            agent: None,
        }
    }

    pub fn n(mut self, n: usize) -> Self {
        self.n = n;
        self
    }

    pub fn search_type(mut self, t: SearchType) -> Self {
        self.t = t;
        self
    }

    pub fn rerank(mut self, rerank: bool) -> Self {
        self.rerank = rerank;
        self
    }

    pub fn max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    pub fn dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn agent(mut self, agent: Agent) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Cache key: `"{query}-{n}-{type}-{rerank}-{max_distance}-{dedupe}"`
    /// over the trimmed query. Searches scoped to an agent carry its id as
    /// a trailing component since they read a different entry set.
    pub fn signature(&self) -> String {
        let max_distance = match self.max_distance {
            Some(d) => d.to_string(),
            None => "inf".to_string(),
        };
        let mut signature = format!(
            "{}-{}-{}-{}-{}-{}",
            self.q.trim(),
            self.n,
            self.t,
            self.rerank,
            max_distance,
            self.dedupe
        );
        if let Some(agent) = &self.agent {
            signature.push_str("-agent:");
            signature.push_str(&agent.id);
        }
        signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_defaults() {
        assert_eq!(SearchRequest::new("  budget ").signature(), "budget-5-all-false-inf-true");
    }

    #[test]
    fn test_signature_changes_with_every_parameter() {
        let base = SearchRequest::new("budget");
        let variants = [
            base.clone().n(2),
            base.clone().search_type(SearchType::Org),
            base.clone().rerank(true),
            base.clone().max_distance(0.5),
            base.clone().dedupe(false),
        ];
        for variant in variants {
            assert_ne!(variant.signature(), base.signature());
        }
        assert_eq!(base.clone().max_distance(0.5).signature(), "budget-5-all-false-0.5-true");
    }
}
