use crate::domain::documents::{DocumentSummary, ListScope};

/// The two facts about a document that visibility depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentAccess {
    pub owner_id: i64,
    pub public: bool,
}

impl From<&DocumentSummary> for DocumentAccess {
    fn from(doc: &DocumentSummary) -> Self {
        Self {
            owner_id: doc.owner_id,
            public: doc.public,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReason {
    Owner,
    Public,
    Granted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow(AccessReason),
    Deny,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, AccessDecision::Allow(_))
    }
}

// Ownership wins over public, public over grants.
pub fn decide(doc: &DocumentAccess, requester_id: i64, grantee_ids: &[i64]) -> AccessDecision {
    if doc.owner_id == requester_id {
        AccessDecision::Allow(AccessReason::Owner)
    } else if doc.public {
        AccessDecision::Allow(AccessReason::Public)
    } else if grantee_ids.contains(&requester_id) {
        AccessDecision::Allow(AccessReason::Granted)
    } else {
        AccessDecision::Deny
    }
}

/// Whether a listed document belongs in the requested scope for this requester.
pub fn admits(
    scope: &ListScope,
    doc: &DocumentAccess,
    requester_id: i64,
    grantee_ids: &[i64],
) -> bool {
    match scope {
        ListScope::Owner => {
            decide(doc, requester_id, grantee_ids) == AccessDecision::Allow(AccessReason::Owner)
        }
        ListScope::Shared { owner_id } => {
            if doc.owner_id != *owner_id {
                return false;
            }
            match decide(doc, requester_id, grantee_ids) {
                AccessDecision::Allow(AccessReason::Public | AccessReason::Granted) => true,
                // browsing one's own library through the shared lens
                AccessDecision::Allow(AccessReason::Owner) => {
                    doc.public || grantee_ids.contains(&requester_id)
                }
                AccessDecision::Deny => false,
            }
        }
    }
}
