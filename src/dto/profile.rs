use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;

use crate::{
    dao::models::User,
    dto::validation::{validate_optional_email, validate_picture},
};

/// Profile form. `None` keeps the stored value; an empty string clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[validate(length(max = 64, message = "Display name must be at most 64 characters long."))]
    pub display_name: Option<String>,
    #[validate(custom(function = "validate_optional_email"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_picture"))]
    pub profile_picture_base64: Option<String>,
}

/// Password change form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdateRequest {
    /// Replacement password.
    pub new_password: String,
    /// Must repeat `new_password`.
    pub confirm_password: String,
}

impl PasswordUpdateRequest {
    /// Build a password change form.
    pub fn new(new_password: impl Into<String>, confirm_password: impl Into<String>) -> Self {
        Self {
            new_password: new_password.into(),
            confirm_password: confirm_password.into(),
        }
    }
}

/// Public profile data; never carries the password hash.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    /// Login name.
    pub username: String,
    /// Name shown instead of the username.
    pub display_name: Option<String>,
    /// Contact address.
    pub email: Option<String>,
    /// Avatar, standard base64 text.
    pub profile_picture_base64: Option<String>,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            profile_picture_base64: user.profile_picture_base64.clone(),
        }
    }
}
