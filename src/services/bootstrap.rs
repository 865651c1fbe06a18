use secrecy::{ExposeSecret, Secret};
use sqlx::PgPool;

use crate::config::Config;
use crate::models::{member::MemberData, role::ROLE_ADMIN, Credential, Member, MemberRole, Role};
use crate::services::credentials;

#[derive(thiserror::Error, Debug)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Credential error: {0}")]
    Credential(#[from] credentials::CredentialError),

    #[error("Role {0} is missing; migrations have not run")]
    MissingRole(&'static str),
}

/// Outcome of the start-up check, logged by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Someone can already sign in
    AlreadyProvisioned,
    /// No credentials exist and none were configured
    NotConfigured,
    Created,
}

/// Seeds the first ADMIN with login credentials when nobody can sign in yet.
///
/// Reuses an existing member with the configured email, otherwise creates
/// one named after the mailbox.
pub async fn ensure_admin(pool: &PgPool, config: &Config) -> Result<BootstrapOutcome, BootstrapError> {
    if Credential::any_exist(pool).await? {
        return Ok(BootstrapOutcome::AlreadyProvisioned);
    }

    let (email, password) = match (
        config.bootstrap_admin_email.as_deref(),
        config.bootstrap_admin_password.as_ref(),
    ) {
        (Some(email), Some(password)) if !email.trim().is_empty() => (email.trim(), password),
        _ => {
            tracing::warn!("No login credentials exist and no bootstrap admin is configured");
            return Ok(BootstrapOutcome::NotConfigured);
        }
    };

    let member = match Member::find_by_email(pool, email).await? {
        Some(member) => member,
        None => Member::create(pool, &bootstrap_member(email)).await?,
    };

    let role = Role::find_by_name(pool, ROLE_ADMIN)
        .await?
        .ok_or(BootstrapError::MissingRole(ROLE_ADMIN))?;

    MemberRole::assign(pool, member.id, role.id).await?;
    Credential::set(pool, member.id, &hash_password(password)?).await?;

    tracing::info!(
        member_id = %member.id,
        name = %member.full_name(),
        "Bootstrap administrator provisioned"
    );

    Ok(BootstrapOutcome::Created)
}

fn hash_password(
    password: &Secret<String>,
) -> Result<credentials::HashedSecret, credentials::CredentialError> {
    credentials::hash_secret(password.expose_secret())
}

fn bootstrap_member(email: &str) -> MemberData {
    let first_name = email
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .unwrap_or("Admin");

    MemberData {
        first_name: first_name.to_string(),
        last_name: "Administrator".to_string(),
        email: Some(email.to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_member_named_after_mailbox() {
        let data = bootstrap_member("office@church.example");
        assert_eq!(data.first_name, "office");
        assert_eq!(data.last_name, "Administrator");
        assert_eq!(data.email.as_deref(), Some("office@church.example"));
        assert!(data.zone_id.is_none());
    }

    #[test]
    fn test_bootstrap_member_without_local_part() {
        let data = bootstrap_member("@church.example");
        assert_eq!(data.first_name, "Admin");
    }

    #[test]
    fn test_hash_password_rejects_empty_secret() {
        let empty = Secret::new(String::new());
        assert!(hash_password(&empty).is_err());

        let hashed = hash_password(&Secret::new("s3cret".to_string())).unwrap();
        assert!(credentials::verify_secret("s3cret", &hashed).unwrap());
    }
}
