use gamezone_core::{ApiResult, Member, MemberForm, MemberId, MemberProfile, SearchRequest};

use super::id_path;
use crate::http::{ApiRequest, HttpClient};

/// Member accounts and phone lookup.
#[derive(Debug, Clone)]
pub struct MembersClient {
    http: HttpClient,
}

impl MembersClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `GET /members`.
    pub async fn list(&self) -> ApiResult<Vec<Member>> {
        self.http.get_json("/members").await
    }

    /// `GET /members/:id`.
    pub async fn get(&self, id: &MemberId) -> ApiResult<Member> {
        self.http.get_json(&id_path("/members", id.as_str())?).await
    }

    /// Signup.
    pub async fn create(&self, form: &MemberForm) -> ApiResult<Member> {
        self.http.post_json("/members", form).await
    }

    /// `PUT /members/:id`.
    pub async fn update(&self, id: &MemberId, form: &MemberForm) -> ApiResult<Member> {
        self.http
            .put_json(&id_path("/members", id.as_str())?, form)
            .await
    }

    /// `DELETE /members/:id`.
    pub async fn delete(&self, id: &MemberId) -> ApiResult<()> {
        self.http.delete(&id_path("/members", id.as_str())?).await
    }

    /// `POST /members/search`. A read despite the verb, but still never
    /// retried.
    pub async fn search_by_phone(&self, phone: &str) -> ApiResult<MemberProfile> {
        let request = ApiRequest::post("/members/search").with_json(&SearchRequest {
            phone: phone.to_string(),
        })?;
        self.http.send_json(&request).await
    }
}
