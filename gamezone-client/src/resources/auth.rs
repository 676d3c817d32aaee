//! Credential exchange against the admin and member login endpoints.
//!
//! Both endpoints answer `{success, message, admin|user, token?}`. A 401
//! here means "unknown user", so these requests opt out of the global
//! session-expiry handling.

use gamezone_core::{
    AdminLoginResponse, ApiError, ApiResult, Identity, MemberLoginResponse, Role,
};
use serde_json::json;

use crate::http::{ApiRequest, HttpClient};

/// A successful exchange: who logged in, and the credential the backend
/// issued (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct LoginGrant {
    pub identity: Identity,
    pub token: Option<String>,
}

/// Login calls for both account kinds.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: HttpClient,
}

impl AuthClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `POST /admin/login {username}`.
    pub async fn admin_login(&self, username: &str) -> ApiResult<LoginGrant> {
        let request = ApiRequest::post("/admin/login")
            .with_json(&json!({ "username": username }))?
            .without_auth_expiry();
        let response: AdminLoginResponse = self.http.send_json(&request).await?;
        admin_grant(response)
    }

    /// `POST /members/login {email}`.
    pub async fn member_login(&self, email: &str) -> ApiResult<LoginGrant> {
        let request = ApiRequest::post("/members/login")
            .with_json(&json!({ "email": email }))?
            .without_auth_expiry();
        let response: MemberLoginResponse = self.http.send_json(&request).await?;
        member_grant(response)
    }
}

pub(crate) fn admin_grant(response: AdminLoginResponse) -> ApiResult<LoginGrant> {
    let admin = match (response.success, response.admin) {
        (true, Some(admin)) => admin,
        (success, _) => return Err(rejected(success, response.message)),
    };
    let identity = Identity {
        id: admin.id.to_string(),
        name: admin.full_name,
        email: admin.email,
        role: Role::Admin,
        member_id: None,
        phone_number: None,
        token: response.token.clone(),
    };
    Ok(LoginGrant {
        identity,
        token: response.token,
    })
}

pub(crate) fn member_grant(response: MemberLoginResponse) -> ApiResult<LoginGrant> {
    let user = match (response.success, response.user) {
        (true, Some(user)) => user,
        (success, _) => return Err(rejected(success, response.message)),
    };
    let identity = Identity {
        id: user.id.to_string(),
        name: user.name,
        email: user.email,
        role: Role::User,
        member_id: Some(user.id),
        phone_number: user.phone_number,
        token: response.token.clone(),
    };
    Ok(LoginGrant {
        identity,
        token: response.token,
    })
}

fn rejected(success: bool, message: Option<String>) -> ApiError {
    if success {
        // 2xx claiming success without an account record.
        ApiError::MalformedResponse {
            status_code: 200,
            reason: "login response missing account".to_string(),
        }
    } else {
        ApiError::http(401, message.unwrap_or_else(|| "Login failed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamezone_core::{AdminAccount, MemberAccount, MemberId};

    #[test]
    fn test_admin_grant_maps_role() {
        let grant = admin_grant(AdminLoginResponse {
            success: true,
            message: None,
            admin: Some(AdminAccount {
                id: "1".into(),
                full_name: "Root".into(),
                email: "root@zone.gg".into(),
                username: "admin".into(),
            }),
            token: None,
        })
        .unwrap();
        assert_eq!(grant.identity.role, Role::Admin);
        assert_eq!(grant.identity.name, "Root");
        assert!(grant.identity.member_id.is_none());
        assert!(grant.token.is_none());
    }

    #[test]
    fn test_member_grant_carries_member_id_and_token() {
        let grant = member_grant(MemberLoginResponse {
            success: true,
            message: None,
            user: Some(MemberAccount {
                id: "m-9".into(),
                name: "Ana".into(),
                email: "ana@zone.gg".into(),
                phone_number: Some("555".into()),
                balance: 12.5,
            }),
            token: Some("jwt".into()),
        })
        .unwrap();
        assert_eq!(grant.identity.role, Role::User);
        assert_eq!(grant.identity.member_id, Some(MemberId::new("m-9")));
        assert_eq!(grant.token.as_deref(), Some("jwt"));
    }

    #[test]
    fn test_unsuccessful_or_incomplete_responses_rejected() {
        let failed = member_grant(MemberLoginResponse {
            success: false,
            message: Some("Invalid email".into()),
            user: None,
            token: None,
        });
        assert_eq!(failed.unwrap_err().status_code(), 401);

        let incomplete = admin_grant(AdminLoginResponse {
            success: true,
            message: None,
            admin: None,
            token: None,
        });
        assert!(matches!(incomplete, Err(ApiError::MalformedResponse { .. })));
    }
}
