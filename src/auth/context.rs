/// Authenticated client information
///
/// Inserted into request extensions by the auth middleware. Handlers extract
/// it via `Extension<Auth>`; `id` is `None` when authentication is disabled.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Auth {
    /// Identifier of the matched API secret (e.g. "dashboard")
    #[serde(default)]
    pub id: Option<String>,
}

impl Auth {
    /// Create a new Auth with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }

    /// Create an empty Auth (no id)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }
}
