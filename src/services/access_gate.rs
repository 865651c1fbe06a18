//! Authorization rules for the admin API and the ministry portal.
//!
//! The admin namespace is guarded by a blanket role check (ADMIN or PASTOR).
//! The portal is open to any authenticated member, with per-ministry checks
//! that consult the membership and admin relations independently.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

use crate::models::{
    role::{ROLE_ADMIN, ROLE_PASTOR},
    MemberRole, MinistryAdmin, MinistryMember, Zone,
};

/// Roles that unlock the admin namespace
pub const APP_ADMIN_ROLES: [&str; 2] = [ROLE_ADMIN, ROLE_PASTOR];

/// Store lookups the gate depends on
#[async_trait]
pub trait AccessDirectory: Send + Sync {
    async fn role_names(&self, member_id: Uuid) -> Result<Vec<String>, sqlx::Error>;

    async fn is_ministry_member(
        &self,
        ministry_id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, sqlx::Error>;

    async fn is_ministry_admin(
        &self,
        ministry_id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, sqlx::Error>;

    async fn administers_any_ministry(&self, member_id: Uuid) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl AccessDirectory for PgPool {
    async fn role_names(&self, member_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        MemberRole::role_names(self, member_id).await
    }

    async fn is_ministry_member(
        &self,
        ministry_id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        MinistryMember::exists(self, ministry_id, member_id).await
    }

    async fn is_ministry_admin(
        &self,
        ministry_id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        Ok(MinistryAdmin::find(self, ministry_id, member_id)
            .await?
            .is_some())
    }

    async fn administers_any_ministry(&self, member_id: Uuid) -> Result<bool, sqlx::Error> {
        MinistryAdmin::exists_for_member(self, member_id).await
    }
}

/// An authenticated caller with its resolved roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub member_id: Uuid,
    pub roles: Vec<String>,
}

/// Identity flags shown on the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalFlags {
    pub is_admin: bool,
    pub is_pastor: bool,
    pub is_app_admin: bool,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    pub fn is_pastor(&self) -> bool {
        self.has_role(ROLE_PASTOR)
    }

    pub fn flags(&self) -> PortalFlags {
        let is_admin = self.is_admin();
        let is_pastor = self.is_pastor();
        PortalFlags {
            is_admin,
            is_pastor,
            is_app_admin: is_admin || is_pastor,
        }
    }
}

/// Loads the roles of an authenticated member
pub async fn resolve_principal<D>(directory: &D, member_id: Uuid) -> Result<Principal, sqlx::Error>
where
    D: AccessDirectory + ?Sized,
{
    let roles = directory.role_names(member_id).await?;
    Ok(Principal { member_id, roles })
}

/// Mutations on a ministry that only its admins may perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinistryAction {
    SendJoinRequest,
    ChangeMemberRole,
    RemoveMember,
}

impl fmt::Display for MinistryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MinistryAction::SendJoinRequest => "send join requests",
            MinistryAction::ChangeMemberRole => "change member roles",
            MinistryAction::RemoveMember => "remove members",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write(MinistryAction),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    #[error("{0} role required")]
    RoleRequired(String),

    #[error("Not a member of this ministry")]
    NotMinistryMember,

    #[error("Only ministry leaders can {0}")]
    MinistryLeaderRequired(MinistryAction),

    #[error("A ministry admin assignment is required to list members")]
    MinistryAdminRequired,

    #[error("Pastors may only view statistics for their own zone")]
    ZoneNotOwned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(denial) => Err(denial),
        }
    }
}

/// Allows the principal when it holds at least one of the required roles.
pub fn authorize(principal: &Principal, required_roles: &[&str]) -> Decision {
    if required_roles.iter().any(|role| principal.has_role(role)) {
        Decision::Allow
    } else {
        Decision::Deny(Denial::RoleRequired(required_roles.join(" or ")))
    }
}

/// Ministry-scoped portal check.
///
/// Reads need membership or admin-ship; writes need admin-ship.
pub async fn authorize_ministry_access<D>(
    directory: &D,
    principal: &Principal,
    ministry_id: Uuid,
    mode: AccessMode,
) -> Result<Decision, sqlx::Error>
where
    D: AccessDirectory + ?Sized,
{
    let is_admin = directory
        .is_ministry_admin(ministry_id, principal.member_id)
        .await?;

    let decision = match mode {
        AccessMode::Read => {
            let is_member = directory
                .is_ministry_member(ministry_id, principal.member_id)
                .await?;
            if is_member || is_admin {
                Decision::Allow
            } else {
                Decision::Deny(Denial::NotMinistryMember)
            }
        }
        AccessMode::Write(action) => {
            if is_admin {
                Decision::Allow
            } else {
                Decision::Deny(Denial::MinistryLeaderRequired(action))
            }
        }
    };

    if let Decision::Deny(ref denial) = decision {
        tracing::warn!(
            member_id = %principal.member_id,
            ministry_id = %ministry_id,
            reason = %denial,
            "Ministry access denied"
        );
    }

    Ok(decision)
}

/// Listing every member is reserved for principals administering some ministry.
pub async fn authorize_member_listing<D>(
    directory: &D,
    principal: &Principal,
) -> Result<Decision, sqlx::Error>
where
    D: AccessDirectory + ?Sized,
{
    if directory
        .administers_any_ministry(principal.member_id)
        .await?
    {
        Ok(Decision::Allow)
    } else {
        Ok(Decision::Deny(Denial::MinistryAdminRequired))
    }
}

/// Zone statistics: the blanket role check, then optionally pastor ownership.
pub fn authorize_zone_stats(principal: &Principal, zone: &Zone, enforce_ownership: bool) -> Decision {
    if let Decision::Deny(denial) = authorize(principal, &APP_ADMIN_ROLES) {
        return Decision::Deny(denial);
    }

    if principal.is_admin() || !enforce_ownership {
        return Decision::Allow;
    }

    if zone.pastor_id == Some(principal.member_id) {
        Decision::Allow
    } else {
        Decision::Deny(Denial::ZoneNotOwned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::{HashMap, HashSet};

    #[derive(Default)]
    struct FakeDirectory {
        roles: HashMap<Uuid, Vec<String>>,
        members: HashSet<(Uuid, Uuid)>,
        admins: HashSet<(Uuid, Uuid)>,
    }

    #[async_trait]
    impl AccessDirectory for FakeDirectory {
        async fn role_names(&self, member_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
            Ok(self.roles.get(&member_id).cloned().unwrap_or_default())
        }

        async fn is_ministry_member(
            &self,
            ministry_id: Uuid,
            member_id: Uuid,
        ) -> Result<bool, sqlx::Error> {
            Ok(self.members.contains(&(ministry_id, member_id)))
        }

        async fn is_ministry_admin(
            &self,
            ministry_id: Uuid,
            member_id: Uuid,
        ) -> Result<bool, sqlx::Error> {
            Ok(self.admins.contains(&(ministry_id, member_id)))
        }

        async fn administers_any_ministry(&self, member_id: Uuid) -> Result<bool, sqlx::Error> {
            Ok(self.admins.iter().any(|(_, m)| *m == member_id))
        }
    }

    fn principal(roles: &[&str]) -> Principal {
        Principal {
            member_id: Uuid::new_v4(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn zone_led_by(pastor_id: Option<Uuid>) -> Zone {
        Zone {
            id: Uuid::new_v4(),
            name: "North".to_string(),
            description: None,
            pastor_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_authorize_denies_principal_without_roles() {
        let decision = authorize(&principal(&[]), &APP_ADMIN_ROLES);
        assert_eq!(
            decision,
            Decision::Deny(Denial::RoleRequired("ADMIN or PASTOR".to_string()))
        );
    }

    #[test]
    fn test_authorize_allows_admin_and_pastor() {
        assert!(authorize(&principal(&["ADMIN"]), &APP_ADMIN_ROLES).is_allowed());
        assert!(authorize(&principal(&["PASTOR"]), &APP_ADMIN_ROLES).is_allowed());
        assert!(!authorize(&principal(&["USHER"]), &APP_ADMIN_ROLES).is_allowed());
    }

    #[test]
    fn test_portal_flags() {
        let flags = principal(&["PASTOR"]).flags();
        assert!(!flags.is_admin);
        assert!(flags.is_pastor);
        assert!(flags.is_app_admin);

        let flags = principal(&[]).flags();
        assert!(!flags.is_app_admin);
    }

    #[tokio::test]
    async fn test_read_allows_member_or_admin_and_denies_outsider() {
        let ministry_id = Uuid::new_v4();
        let member = principal(&[]);
        let admin = principal(&[]);
        let outsider = principal(&[]);

        let mut directory = FakeDirectory::default();
        directory.members.insert((ministry_id, member.member_id));
        directory.admins.insert((ministry_id, admin.member_id));

        for allowed in [&member, &admin] {
            let decision =
                authorize_ministry_access(&directory, allowed, ministry_id, AccessMode::Read)
                    .await
                    .unwrap();
            assert_eq!(decision, Decision::Allow);
        }

        let decision =
            authorize_ministry_access(&directory, &outsider, ministry_id, AccessMode::Read)
                .await
                .unwrap();
        assert_eq!(decision, Decision::Deny(Denial::NotMinistryMember));
    }

    #[tokio::test]
    async fn test_write_denies_plain_member_who_can_read() {
        let ministry_id = Uuid::new_v4();
        let member = principal(&[]);

        let mut directory = FakeDirectory::default();
        directory.members.insert((ministry_id, member.member_id));

        let read = authorize_ministry_access(&directory, &member, ministry_id, AccessMode::Read)
            .await
            .unwrap();
        assert!(read.is_allowed());

        let write = authorize_ministry_access(
            &directory,
            &member,
            ministry_id,
            AccessMode::Write(MinistryAction::RemoveMember),
        )
        .await
        .unwrap();
        assert_eq!(
            write,
            Decision::Deny(Denial::MinistryLeaderRequired(MinistryAction::RemoveMember))
        );
    }

    #[tokio::test]
    async fn test_write_allows_ministry_admin_who_is_not_member() {
        let ministry_id = Uuid::new_v4();
        let admin = principal(&[]);

        let mut directory = FakeDirectory::default();
        directory.admins.insert((ministry_id, admin.member_id));

        let decision = authorize_ministry_access(
            &directory,
            &admin,
            ministry_id,
            AccessMode::Write(MinistryAction::SendJoinRequest),
        )
        .await
        .unwrap();
        assert_eq!(decision, Decision::Allow);
    }

    #[tokio::test]
    async fn test_admin_of_other_ministry_cannot_write() {
        let ministry_id = Uuid::new_v4();
        let other_ministry = Uuid::new_v4();
        let admin = principal(&[]);

        let mut directory = FakeDirectory::default();
        directory.admins.insert((other_ministry, admin.member_id));

        let decision = authorize_ministry_access(
            &directory,
            &admin,
            ministry_id,
            AccessMode::Write(MinistryAction::ChangeMemberRole),
        )
        .await
        .unwrap();
        assert!(!decision.is_allowed());
    }

    #[test]
    fn test_denial_messages_distinguish_actions() {
        assert_eq!(
            Denial::MinistryLeaderRequired(MinistryAction::SendJoinRequest).to_string(),
            "Only ministry leaders can send join requests"
        );
        assert_eq!(
            Denial::MinistryLeaderRequired(MinistryAction::ChangeMemberRole).to_string(),
            "Only ministry leaders can change member roles"
        );
        assert_eq!(
            Denial::MinistryLeaderRequired(MinistryAction::RemoveMember).to_string(),
            "Only ministry leaders can remove members"
        );
    }

    #[tokio::test]
    async fn test_member_listing_requires_any_admin_assignment() {
        let admin = principal(&[]);
        let member = principal(&[]);

        let mut directory = FakeDirectory::default();
        directory.admins.insert((Uuid::new_v4(), admin.member_id));

        assert!(authorize_member_listing(&directory, &admin)
            .await
            .unwrap()
            .is_allowed());
        assert_eq!(
            authorize_member_listing(&directory, &member).await.unwrap(),
            Decision::Deny(Denial::MinistryAdminRequired)
        );
    }

    #[tokio::test]
    async fn test_resolve_principal_loads_roles() {
        let member_id = Uuid::new_v4();
        let mut directory = FakeDirectory::default();
        directory
            .roles
            .insert(member_id, vec!["ADMIN".to_string()]);

        let resolved = resolve_principal(&directory, member_id).await.unwrap();
        assert_eq!(resolved.member_id, member_id);
        assert!(resolved.is_admin());
    }

    #[test]
    fn test_zone_stats_ownership() {
        let pastor = principal(&["PASTOR"]);
        let own_zone = zone_led_by(Some(pastor.member_id));
        let other_zone = zone_led_by(Some(Uuid::new_v4()));

        assert!(authorize_zone_stats(&pastor, &own_zone, true).is_allowed());
        assert_eq!(
            authorize_zone_stats(&pastor, &other_zone, true),
            Decision::Deny(Denial::ZoneNotOwned)
        );
        assert!(authorize_zone_stats(&pastor, &other_zone, false).is_allowed());

        let admin = principal(&["ADMIN"]);
        assert!(authorize_zone_stats(&admin, &other_zone, true).is_allowed());

        let member = principal(&[]);
        assert!(!authorize_zone_stats(&member, &own_zone, false).is_allowed());
    }
}
