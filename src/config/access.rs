//! Optional password gate in front of a session.

/// Checks a candidate password against the configured access secret.
///
/// With no secret configured the gate is open.
#[derive(Clone, Default)]
pub struct AccessGate {
    secret: Option<String>,
}

impl AccessGate {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    pub fn is_open(&self) -> bool {
        self.secret.is_none()
    }

    pub fn check(&self, candidate: &str) -> bool {
        match &self.secret {
            None => true,
            Some(secret) => constant_time_eq(secret.as_bytes(), candidate.as_bytes()),
        }
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("open", &self.is_open())
            .finish()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
