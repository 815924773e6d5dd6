use std::fmt;

use tokio::sync::RwLock;

use super::dialects::DialectKind;

/// A fully specified database target.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub dialect: DialectKind,
    pub connection_string: String,
}

impl ConnectionDescriptor {
    pub fn new(dialect: DialectKind, connection_string: impl Into<String>) -> Self {
        Self {
            dialect,
            connection_string: connection_string.into(),
        }
    }
}

// Connection strings carry credentials; only their length is printed.
impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("dialect", &self.dialect)
            .field("connection_string_len", &self.connection_string.len())
            .finish()
    }
}

/// Holds the single active session. The descriptor is swapped as a whole,
/// so readers never observe a mix of two connect attempts.
#[derive(Default)]
pub struct SessionStore {
    current: RwLock<Option<ConnectionDescriptor>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<ConnectionDescriptor> {
        self.current.read().await.clone()
    }

    pub async fn set(&self, descriptor: ConnectionDescriptor) {
        *self.current.write().await = Some(descriptor);
    }
}
