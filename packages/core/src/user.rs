use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitrine_storage::EntityKind;

use crate::entity::{Entity, deserialize_opt_id};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// Back-office view of a user. Credentials live elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl Entity for UserProfile {
    const KIND: EntityKind = EntityKind::Users;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRecord {
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub user_email: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub user_agent: String,
}

impl Entity for LoginRecord {
    const KIND: EntityKind = EntityKind::LoginHistory;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Newest first, at most `limit` records
pub fn latest_logins(mut records: Vec<LoginRecord>, limit: usize) -> Vec<LoginRecord> {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records.truncate(limit);
    records
}

/// Password hash for the local identity provider. The row id is the
/// normalized e-mail address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub user_id: String,
    pub password_hash: String,
}

impl Entity for Credential {
    const KIND: EntityKind = EntityKind::Credentials;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn login(email: &str, day: u32) -> LoginRecord {
        LoginRecord {
            id: None,
            user_email: email.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, day, 8, 0, 0).unwrap(),
            user_agent: "test".to_string(),
        }
    }

    #[test]
    fn latest_logins_orders_newest_first_and_limits() {
        let records = vec![login("a@x.com", 1), login("b@x.com", 3), login("c@x.com", 2)];
        let latest = latest_logins(records, 2);
        let emails: Vec<_> = latest.iter().map(|r| r.user_email.as_str()).collect();
        assert_eq!(emails, vec!["b@x.com", "c@x.com"]);
    }

    #[test]
    fn role_defaults_to_user() {
        let profile: UserProfile =
            serde_json::from_value(serde_json::json!({"email": "a@x.com"})).unwrap();
        assert_eq!(profile.role, Role::User);
        assert!(!profile.is_admin());
    }
}
