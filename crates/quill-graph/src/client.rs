use crate::{GraphError, SendMailRequest, StagedFile};
use quill_core::{Session, UserProfile};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use url::Url;

const API_VERSION: &str = "v1.0";

/// The subset of the Graph `user` resource the app reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphUser {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub mail: Option<String>,
    pub user_principal_name: Option<String>,
}

impl From<GraphUser> for UserProfile {
    fn from(user: GraphUser) -> Self {
        Self {
            display_name: user.display_name.unwrap_or_default(),
            email: user
                .mail
                .filter(|mail| !mail.is_empty())
                .or(user.user_principal_name)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub web_url: Option<Url>,
    pub size: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ExploreResponse {
    pub status: StatusCode,
    /// Parsed JSON when the body is JSON, otherwise the raw text as a string value.
    pub body: serde_json::Value,
}

/// Thin REST wrapper over the Microsoft Graph endpoints the app calls.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GraphClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, GraphError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GraphError::Data(format!("{} cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .push(API_VERSION)
            .extend(segments);
        Ok(url)
    }

    pub async fn me(&self, session: &Session) -> Result<GraphUser, GraphError> {
        let url = self.endpoint(["me"])?;
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, session.authorization_header())
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    /// Returns the raw status; Graph answers 202 when the message was accepted.
    pub async fn send_mail(
        &self,
        session: &Session,
        request: &SendMailRequest,
    ) -> Result<StatusCode, GraphError> {
        let url = self.endpoint(["me", "sendMail"])?;
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, session.authorization_header())
            .json(request)
            .send()
            .await?;
        Ok(response.status())
    }

    pub async fn upload_file(
        &self,
        session: &Session,
        folder: &str,
        file: &StagedFile,
    ) -> Result<UploadedItem, GraphError> {
        let mut segments = vec!["me", "drive", "root:"];
        segments.extend(folder.split('/').filter(|part| !part.is_empty()));
        let leaf = format!("{}:", file.name);
        segments.push(&leaf);
        segments.push("content");

        let url = self.endpoint(segments)?;
        let response = self
            .http
            .put(url)
            .header(AUTHORIZATION, session.authorization_header())
            .header(CONTENT_TYPE, "text/plain")
            .body(file.content.clone())
            .send()
            .await?;
        let text = ensure_success(response).await?.text().await?;
        Ok(parse_uploaded_item(&text))
    }

    /// POSTs `body` to a Graph URL chosen by the caller.
    ///
    /// `target` may be a path such as `/v1.0/me/events` or an absolute URL on
    /// the configured Graph host. Other hosts never see the bearer token.
    pub async fn explore(
        &self,
        session: &Session,
        target: &str,
        body: &str,
    ) -> Result<ExploreResponse, GraphError> {
        let url = self.resolve_explore_target(target)?;
        let mut request = self
            .http
            .post(url)
            .header(AUTHORIZATION, session.authorization_header());
        if !body.trim().is_empty() {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
        Ok(ExploreResponse { status, body })
    }

    fn resolve_explore_target(&self, target: &str) -> Result<Url, GraphError> {
        let url = self.base_url.join(target.trim())?;
        if url.origin() != self.base_url.origin() {
            return Err(GraphError::ForeignHost(
                url.host_str().unwrap_or_default().to_string(),
            ));
        }
        Ok(url)
    }
}

/// Any 2xx is an upload; the item metadata is best effort.
fn parse_uploaded_item(text: &str) -> UploadedItem {
    if text.trim().is_empty() {
        return UploadedItem::default();
    }
    serde_json::from_str(text).unwrap_or_else(|err| {
        tracing::warn!("upload response is not a drive item: {err}");
        UploadedItem::default()
    })
}

async fn ensure_success(response: Response) -> Result<Response, GraphError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GraphError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_bytes, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session() -> Session {
        Session::new("test-token", i64::MAX)
    }

    fn client_for(server: &MockServer) -> GraphClient {
        GraphClient::new(Url::parse(&server.uri()).expect("mock uri"))
    }

    #[test]
    fn profile_prefers_mail_over_principal_name() {
        let user: GraphUser = serde_json::from_value(serde_json::json!({
            "displayName": "Grace Hopper",
            "mail": null,
            "userPrincipalName": "grace@contoso.onmicrosoft.com"
        }))
        .expect("user json");
        let profile = UserProfile::from(user);
        assert_eq!(profile.email, "grace@contoso.onmicrosoft.com");

        let user = GraphUser {
            mail: Some("grace@contoso.com".to_string()),
            user_principal_name: Some("grace@contoso.onmicrosoft.com".to_string()),
            ..GraphUser::default()
        };
        assert_eq!(UserProfile::from(user).email, "grace@contoso.com");
    }

    #[tokio::test]
    async fn me_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "1",
                "displayName": "Grace Hopper",
                "mail": "grace@contoso.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = client_for(&server).me(&session()).await.expect("me");
        assert_eq!(user.display_name.as_deref(), Some("Grace Hopper"));
    }

    #[tokio::test]
    async fn me_maps_errors_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("InvalidAuthenticationToken"))
            .mount(&server)
            .await;

        let err = client_for(&server).me(&session()).await.expect_err("401");
        assert!(matches!(
            err,
            GraphError::Status { status, .. } if status == StatusCode::UNAUTHORIZED
        ));
    }

    #[tokio::test]
    async fn upload_puts_raw_bytes_under_folder() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1.0/me/drive/root:/Documents/Quarterly%20Report.docx:/content"))
            .and(header("content-type", "text/plain"))
            .and(body_bytes(b"raw bytes".to_vec()))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "item-1",
                "name": "Quarterly Report.docx",
                "webUrl": "https://contoso-my.sharepoint.com/doc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = StagedFile {
            name: "Quarterly Report.docx".to_string(),
            content: b"raw bytes".to_vec(),
        };
        let item = client_for(&server)
            .upload_file(&session(), "Documents", &file)
            .await
            .expect("upload");
        assert_eq!(
            item.web_url.map(|url| url.to_string()).as_deref(),
            Some("https://contoso-my.sharepoint.com/doc")
        );
    }

    #[tokio::test]
    async fn upload_tolerates_bodies_without_item_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/v1.0/me/drive/root:/Documents/odd.txt:/content"))
            .respond_with(ResponseTemplate::new(201).set_body_string("<ok/>"))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let empty = StagedFile {
            name: "empty.txt".to_string(),
            content: Vec::new(),
        };
        let item = client
            .upload_file(&session(), "Documents", &empty)
            .await
            .expect("bare 200");
        assert!(item.web_url.is_none());

        let odd = StagedFile {
            name: "odd.txt".to_string(),
            content: b"x".to_vec(),
        };
        let item = client
            .upload_file(&session(), "Documents", &odd)
            .await
            .expect("non-json 201");
        assert!(item.web_url.is_none());
    }

    #[tokio::test]
    async fn explore_accepts_relative_paths_and_keeps_text_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1.0/me/events"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(400).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .explore(&session(), "/v1.0/me/events", r#"{"subject":"sync"}"#)
            .await
            .expect("explore");
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body, serde_json::Value::String("not json".to_string()));
    }

    #[tokio::test]
    async fn explore_refuses_other_hosts() {
        let server = MockServer::start().await;
        let err = client_for(&server)
            .explore(&session(), "https://attacker.example.com/collect", "{}")
            .await
            .expect_err("foreign host");
        assert!(matches!(err, GraphError::ForeignHost(host) if host == "attacker.example.com"));
    }
}
