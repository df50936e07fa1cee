/// Collects streamed fragments into the reply that gets persisted.
///
/// Independent of how fragments reach the client.
#[derive(Debug, Default, Clone)]
pub struct ReplyAccumulator {
    text: String,
    fragments: usize,
}

impl ReplyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: &str) {
        self.text.push_str(fragment);
        self.fragments += 1;
    }

    pub fn fragments(&self) -> usize {
        self.fragments
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn finish(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_concatenate_in_order() {
        let mut acc = ReplyAccumulator::new();
        for fragment in ["Hel", "lo", ", world"] {
            acc.push(fragment);
        }
        assert_eq!(acc.fragments(), 3);
        assert_eq!(acc.finish(), "Hello, world");
    }

    #[test]
    fn test_empty_accumulator() {
        let acc = ReplyAccumulator::new();
        assert!(acc.is_empty());
        assert_eq!(acc.text(), "");
    }
}
