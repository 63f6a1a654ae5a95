use serde::{Deserialize, Serialize};

/// Who the server says the current admin is. Both fields are optional; the
/// `/api/admin/me` endpoint may answer with nothing more than `{ "ok": true }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: None,
        }
    }
}

/// A token together with the identity it was issued for.
///
/// Keeping the two in one value means a token can never be cleared while an
/// identity lingers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAuth {
    pub token: String,
    pub identity: Identity,
}

/// The current admin session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Flips to true once the startup check has finished, success or not.
    pub resolved: bool,
    pub auth: Option<AdminAuth>,
}

impl Session {
    /// State at startup, before the persisted token has been checked.
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn signed_out() -> Self {
        Self {
            resolved: true,
            auth: None,
        }
    }

    pub fn signed_in(token: impl Into<String>, identity: Identity) -> Self {
        Self {
            resolved: true,
            auth: Some(AdminAuth {
                token: token.into(),
                identity,
            }),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.token.as_str())
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.auth.as_ref().map(|a| &a.identity)
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    /// Name shown in the dashboard header.
    pub fn display_name(&self) -> &str {
        self.identity()
            .and_then(|i| i.name.as_deref())
            .unwrap_or("Admin")
    }
}
