use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::utils::fields::present;

pub const DEFAULT_PLAN: &str = "demo";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub subscription_plan: String,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    /// Absent stores an empty name, an explicit `null` stores NULL.
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
}

impl CreateUserRequest {
    pub fn name(&self) -> Option<&str> {
        match &self.name {
            None => Some(""),
            Some(name) => name.as_deref(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    pub subscription_plan: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub subscription_expires_at: Option<Option<DateTime<Utc>>>,
}

/// One column assignment of a user update.
#[derive(Debug, Clone, PartialEq)]
pub enum UserChange {
    Name(Option<String>),
    SubscriptionPlan(String),
    SubscriptionExpiresAt(Option<DateTime<Utc>>),
}

impl UserChange {
    pub fn column(&self) -> &'static str {
        match self {
            UserChange::Name(_) => "name",
            UserChange::SubscriptionPlan(_) => "subscription_plan",
            UserChange::SubscriptionExpiresAt(_) => "subscription_expires_at",
        }
    }

    pub fn apply(&self, user: &mut User) {
        match self {
            UserChange::Name(name) => user.name = name.clone(),
            UserChange::SubscriptionPlan(plan) => user.subscription_plan = plan.clone(),
            UserChange::SubscriptionExpiresAt(at) => user.subscription_expires_at = *at,
        }
    }
}

impl UpdateUserRequest {
    pub fn changes(&self) -> Vec<UserChange> {
        let mut changes = Vec::new();
        if let Some(name) = &self.name {
            changes.push(UserChange::Name(name.clone()));
        }
        if let Some(plan) = &self.subscription_plan {
            changes.push(UserChange::SubscriptionPlan(plan.clone()));
        }
        if let Some(expires_at) = self.subscription_expires_at {
            changes.push(UserChange::SubscriptionExpiresAt(expires_at));
        }
        changes
    }
}
