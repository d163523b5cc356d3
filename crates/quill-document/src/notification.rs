use serde::Serialize;

/// A banner message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub header: String,
    pub body: String,
}

impl Notification {
    pub fn new(header: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            body: body.into(),
        }
    }

    pub fn header_only(header: impl Into<String>) -> Self {
        Self::new(header, String::new())
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.body.is_empty() {
            f.write_str(&self.header)
        } else {
            write!(f, "{} {}", self.header, self.body)
        }
    }
}
