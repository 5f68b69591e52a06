//! User and profile models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public fields of a credential record; the password hash never leaves the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "emailOrPhone")]
    pub email_or_phone: String,
}

/// Profile document shown on the profile page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub email_or_phone: String,
    #[serde(default)]
    pub farm_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub preferred_crop: Option<String>,
    pub member_since: DateTime<Utc>,
}

/// Partial update of a profile; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub farm_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub preferred_crop: Option<String>,
}

impl UserProfile {
    pub fn for_user(user: &PublicUser, member_since: DateTime<Utc>) -> Self {
        Self {
            name: user.name.clone(),
            email_or_phone: user.email_or_phone.clone(),
            farm_name: None,
            location: None,
            phone: None,
            preferred_crop: None,
            member_since,
        }
    }

    pub fn apply(mut self, update: ProfileUpdate) -> Self {
        if let Some(name) = update.name {
            self.name = name;
        }
        self.farm_name = update.farm_name.or(self.farm_name);
        self.location = update.location.or(self.location);
        self.phone = update.phone.or(self.phone);
        self.preferred_crop = update.preferred_crop.or(self.preferred_crop);
        self
    }
}
