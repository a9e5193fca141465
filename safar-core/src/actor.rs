use serde::{Deserialize, Serialize};

/// Who performed an operation, for audit attribution. The storefront's auth
/// layer resolves the identity; this core only records it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
    pub role: ActorRole,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Customer,
    ExpertReviewer,
    FinancialReviewer,
    Admin,
    System,
}

impl Actor {
    pub fn new(name: impl Into<String>, role: ActorRole) -> Self {
        Self { name: name.into(), role }
    }

    pub fn admin(name: impl Into<String>) -> Self {
        Self::new(name, ActorRole::Admin)
    }

    pub fn system() -> Self {
        Self::new("system", ActorRole::System)
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
