//! Directory lookups and recipient scope resolution.
//!
//! The directory (organizations, departments, positions, roles, users) is
//! reference data owned elsewhere; the lifecycle only reads it, to expand
//! request targets into recipient users and to constrain the candidate
//! recipients a composer may pick.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::types::DirectoryRef;

/// A user profile as seen by the lifecycle core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    /// Role name, if any.
    pub role: Option<String>,
    /// Senior/management designation on the role.
    pub is_senior: bool,
    pub department: Option<DirectoryRef>,
    pub organizations: Vec<DirectoryRef>,
    pub is_active: bool,
}

/// The candidate-recipient scope for a composing user.
///
/// Computed fresh on every compose/forward action from the caller's own
/// profile; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "id")]
pub enum RecipientScope {
    /// May target any user.
    All,
    /// May target only users of this department.
    Department(Uuid),
    /// May target only users of this organization.
    Organization(Uuid),
}

/// Resolve the recipient scope for a composing user.
///
/// Senior/management roles may target anyone; department members are limited
/// to their department; users with only organization membership are limited
/// to their first organization; users with neither are unrestricted.
#[must_use]
pub fn resolve_recipient_scope(user: &UserProfile) -> RecipientScope {
    if user.is_senior {
        return RecipientScope::All;
    }
    if let Some(department) = &user.department {
        return RecipientScope::Department(department.id);
    }
    if let Some(first_org) = user.organizations.first() {
        return RecipientScope::Organization(first_org.id);
    }
    RecipientScope::All
}

/// Read-only directory access used by the lifecycle services.
#[async_trait::async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Load a user profile.
    async fn get_user(&self, id: Uuid) -> Result<Option<UserProfile>>;

    /// List user ids belonging to a department.
    async fn users_in_department(&self, department_id: Uuid) -> Result<Vec<Uuid>>;

    /// List user ids belonging to an organization.
    async fn users_in_organization(&self, organization_id: Uuid) -> Result<Vec<Uuid>>;
}

/// Expand request targets (users, departments, organizations) into the
/// de-duplicated set of recipient user ids.
pub async fn resolve_recipients(
    directory: &dyn DirectoryStore,
    target_users: &[Uuid],
    target_departments: &[Uuid],
    target_organizations: &[Uuid],
) -> Result<Vec<Uuid>> {
    let mut recipients: HashSet<Uuid> = target_users.iter().copied().collect();
    for department_id in target_departments {
        recipients.extend(directory.users_in_department(*department_id).await?);
    }
    for organization_id in target_organizations {
        recipients.extend(directory.users_in_organization(*organization_id).await?);
    }
    Ok(recipients.into_iter().collect())
}

/// In-memory directory for testing.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryStore {
    users: Arc<RwLock<HashMap<Uuid, UserProfile>>>,
}

impl InMemoryDirectoryStore {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user profile.
    pub async fn put_user(&self, profile: UserProfile) {
        self.users.write().await.insert(profile.id, profile);
    }
}

#[async_trait::async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<UserProfile>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn users_in_department(&self, department_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.department.as_ref().is_some_and(|d| d.id == department_id))
            .map(|u| u.id)
            .collect())
    }

    async fn users_in_organization(&self, organization_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.organizations.iter().any(|o| o.id == organization_id))
            .map(|u| u.id)
            .collect())
    }
}

#[cfg(test)]
pub(crate) fn test_profile(id: Uuid) -> UserProfile {
    UserProfile {
        id,
        full_name: "Test User".to_string(),
        email: None,
        role: None,
        is_senior: false,
        department: None,
        organizations: vec![],
        is_active: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn department(name: &str) -> DirectoryRef {
        DirectoryRef {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_senior_scope_is_all() {
        let mut user = test_profile(Uuid::new_v4());
        user.is_senior = true;
        user.department = Some(department("Planning"));
        assert_eq!(resolve_recipient_scope(&user), RecipientScope::All);
    }

    #[test]
    fn test_department_scope() {
        let dept = department("Planning");
        let mut user = test_profile(Uuid::new_v4());
        user.department = Some(dept.clone());
        user.organizations = vec![department("Org A")];
        assert_eq!(
            resolve_recipient_scope(&user),
            RecipientScope::Department(dept.id)
        );
    }

    #[test]
    fn test_organization_scope_uses_first() {
        let org_a = department("Org A");
        let org_b = department("Org B");
        let mut user = test_profile(Uuid::new_v4());
        user.organizations = vec![org_a.clone(), org_b];
        assert_eq!(
            resolve_recipient_scope(&user),
            RecipientScope::Organization(org_a.id)
        );
    }

    #[test]
    fn test_fallback_scope_is_all() {
        let user = test_profile(Uuid::new_v4());
        assert_eq!(resolve_recipient_scope(&user), RecipientScope::All);
    }

    #[tokio::test]
    async fn test_resolve_recipients_deduplicates() {
        let directory = InMemoryDirectoryStore::new();
        let dept = department("Planning");

        let direct = Uuid::new_v4();
        let via_dept = Uuid::new_v4();

        directory.put_user(test_profile(direct)).await;
        let mut member = test_profile(via_dept);
        member.department = Some(dept.clone());
        directory.put_user(member).await;

        // direct user also belongs to the department; must not be counted twice
        let mut direct_member = test_profile(direct);
        direct_member.department = Some(dept.clone());
        directory.put_user(direct_member).await;

        let recipients = resolve_recipients(&directory, &[direct], &[dept.id], &[])
            .await
            .unwrap();
        let mut recipients = recipients;
        recipients.sort();
        let mut expected = vec![direct, via_dept];
        expected.sort();
        assert_eq!(recipients, expected);
    }

    #[tokio::test]
    async fn test_resolve_recipients_organizations() {
        let directory = InMemoryDirectoryStore::new();
        let org = department("Org A");

        let member = Uuid::new_v4();
        let mut profile = test_profile(member);
        profile.organizations = vec![org.clone()];
        directory.put_user(profile).await;

        let recipients = resolve_recipients(&directory, &[], &[], &[org.id])
            .await
            .unwrap();
        assert_eq!(recipients, vec![member]);
    }
}
