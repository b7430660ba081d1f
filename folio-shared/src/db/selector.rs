/// Role-to-connection selection
///
/// The application holds two long-lived pools against the same logical
/// database: one connected as the read-only visitor role and one as the
/// owner role with full grants. Every domain query resolves its pool
/// through [`RolePools::pool_for`] so that the caller's privilege tier,
/// not the handler's discipline, bounds what a query can touch.
///
/// Selection never fails. An absent, unparseable, or unrecognized role
/// degrades to the visitor pool; only an exact owner claim yields the
/// owner pool. Route-level authentication still rejects unauthenticated
/// callers on protected endpoints; the selector is the layer behind it
/// that limits blast radius when a handler forgets a check.
///
/// # Example
///
/// ```no_run
/// use folio_shared::db::selector::{Role, RolePools};
/// # async fn example(pools: RolePools) -> Result<(), sqlx::Error> {
/// // An anonymous request reads through the visitor connection.
/// let pool = pools.pool_for(None);
/// let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
///     .fetch_one(pool)
///     .await?;
/// # Ok(())
/// # }
/// ```
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Privilege tier of an authenticated caller
///
/// Attached to every issued session token; determines which pool a request
/// is routed to and which operations are authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Site owner: full read/write grants on content tables
    Owner,

    /// Visitor: read-only grants on public content tables
    Visitor,
}

impl Role {
    /// Gets role as the string stored in token claims
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Visitor => "VISITOR",
        }
    }

    /// Parses a role claim string; unknown values map to None
    pub fn from_claim(claim: &str) -> Option<Self> {
        match claim {
            "OWNER" => Some(Role::Owner),
            "VISITOR" => Some(Role::Visitor),
            _ => None,
        }
    }

    /// Database tier this role is routed to
    pub fn tier(&self) -> Tier {
        match self {
            Role::Owner => Tier::Owner,
            Role::Visitor => Tier::Visitor,
        }
    }
}

/// Database connection tier
///
/// Separated from [`Role`] so the mapping from caller identity to
/// connection privilege is a pure, testable step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Owner,
    Visitor,
}

impl Tier {
    /// Maps an optional role claim to a tier, degrading to `Visitor`
    pub fn for_role(role: Option<Role>) -> Tier {
        match role {
            Some(Role::Owner) => Tier::Owner,
            _ => Tier::Visitor,
        }
    }
}

/// The two role-scoped pools, created once at startup
#[derive(Clone)]
pub struct RolePools {
    /// Pool connected as the owner database role
    pub owner: PgPool,

    /// Pool connected as the visitor database role
    pub visitor: PgPool,
}

impl RolePools {
    pub fn new(owner: PgPool, visitor: PgPool) -> Self {
        Self { owner, visitor }
    }

    /// Returns the pool matching the caller's role
    ///
    /// Never errors; anything other than an exact `Role::Owner` claim
    /// resolves to the visitor pool.
    pub fn pool_for(&self, role: Option<Role>) -> &PgPool {
        match Tier::for_role(role) {
            Tier::Owner => &self.owner,
            Tier::Visitor => &self.visitor,
        }
    }

    /// Closes both pools, for graceful shutdown
    pub async fn close(&self) {
        self.owner.close().await;
        self.visitor.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_claim_roundtrip() {
        assert_eq!(Role::from_claim("OWNER"), Some(Role::Owner));
        assert_eq!(Role::from_claim("VISITOR"), Some(Role::Visitor));
        assert_eq!(Role::Owner.as_str(), "OWNER");
        assert_eq!(Role::Visitor.as_str(), "VISITOR");
    }

    #[test]
    fn test_unknown_claims_are_rejected() {
        assert_eq!(Role::from_claim("owner"), None);
        assert_eq!(Role::from_claim("ADMIN"), None);
        assert_eq!(Role::from_claim(""), None);
    }

    #[test]
    fn test_only_owner_reaches_owner_tier() {
        assert_eq!(Tier::for_role(Some(Role::Owner)), Tier::Owner);
        assert_eq!(Tier::for_role(Some(Role::Visitor)), Tier::Visitor);
        assert_eq!(Tier::for_role(None), Tier::Visitor);
    }

    #[test]
    fn test_role_serde_uses_uppercase() {
        let json = serde_json::to_string(&Role::Owner).unwrap();
        assert_eq!(json, "\"OWNER\"");

        let role: Role = serde_json::from_str("\"VISITOR\"").unwrap();
        assert_eq!(role, Role::Visitor);
    }
}
