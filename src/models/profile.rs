use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of days a freshly created profile keeps its starter plan window.
pub const DEFAULT_PLAN_DAYS: i64 = 7;

/// Credits granted to each meter when a profile is first created.
pub const DEFAULT_CREDITS: u32 = 25;

/// Subscription plan for a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Starter,
    Pro,
}

impl Plan {
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        matches!(self, Self::Starter | Self::Pro)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Free => "free",
            Self::Starter => "starter",
            Self::Pro => "pro",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "starter" => Ok(Self::Starter),
            "pro" => Ok(Self::Pro),
            other => Err(format!("unknown plan: {other}")),
        }
    }
}

/// One row of the profiles table.
///
/// `created_at` / `updated_at` are stamped by the store on write, so they are
/// absent on a record that has not been persisted yet and skipped when
/// serializing an insert payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub plan: Plan,
    pub credits_find: u32,
    pub credits_verify: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_expiry: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Builds the row to insert for an identity seen for the first time.
    #[must_use]
    pub fn new_for(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone().unwrap_or_default(),
            full_name: identity.display_name(),
            plan: Plan::Free,
            credits_find: DEFAULT_CREDITS,
            credits_verify: DEFAULT_CREDITS,
            plan_expiry: Some(Utc::now() + Duration::days(DEFAULT_PLAN_DAYS)),
            created_at: None,
            updated_at: None,
        }
    }
}

/// The authenticated caller's id/email/name bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display name for a new profile: the explicit hint if present,
    /// otherwise the local part of the email.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = &self.name
            && !name.trim().is_empty()
        {
            return Some(name.trim().to_string());
        }

        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .map(ToString::to_string)
    }
}

/// Partial update for a profile row. `None` fields are left untouched by the
/// store, so the serialized patch only carries what changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_expiry: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_find: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_verify: Option<u32>,
}

impl ProfilePatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.plan.is_none()
            && self.plan_expiry.is_none()
            && self.credits_find.is_none()
            && self.credits_verify.is_none()
    }
}
