/// Case-sensitive substring match against the raw payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFilter {
    needle: String,
}

impl MessageFilter {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }

    /// The whole payload, envelope and binary fields included, is read as
    /// lossy UTF-8 before matching.
    pub fn matches(&self, payload: &[u8]) -> bool {
        String::from_utf8_lossy(payload).contains(self.needle.as_str())
    }
}
