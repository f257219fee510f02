//! The credential a request is made on behalf of.

/// One API account: bearer token, optional proxy and a display ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub token: String,
    pub proxy: Option<String>,
    pub index: usize,
}

impl Account {
    pub fn new(token: impl Into<String>, proxy: Option<String>, index: usize) -> Self {
        Self {
            token: token.into(),
            proxy: proxy.filter(|p| !p.trim().is_empty()),
            index,
        }
    }

    /// Two-digit ordinal used to prefix log lines, e.g. `07`.
    pub fn label(&self) -> String {
        format!("{:02}", self.index)
    }
}
