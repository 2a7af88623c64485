use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{QuillClientError, QuillClientResult};
use crate::models::{
    AuthResponse, Comment, ListPostsResponse, Post, PostDraft, PostFilter, TagSummary, User,
};

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    confirm_password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RequestPasswordResetDto<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct ConfirmPasswordResetDto<'a> {
    token: &'a str,
    password: &'a str,
    confirm_password: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateAccountDto<'a> {
    username: &'a str,
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateCommentDto<'a> {
    name: &'a str,
    comment: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListPostsResponseDto {
    posts: Vec<Post>,
    limit: u32,
    offset: u32,
    total: i64,
}

#[derive(Serialize)]
struct ListPostsQuery<'a> {
    limit: u32,
    offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    q: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
}

impl From<ListPostsResponseDto> for ListPostsResponse {
    fn from(value: ListPostsResponseDto) -> Self {
        Self {
            posts: value.posts,
            limit: value.limit,
            offset: value.offset,
            total: value.total.max(0) as u64,
        }
    }
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `quill-server`.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    pub(crate) fn new(base_url: impl Into<String>) -> QuillClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode_error(response: reqwest::Response) -> QuillClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body
                .error
                .unwrap_or_else(|| format!("http status {status}")),
            Err(_) => format!("http status {status}"),
        };
        QuillClientError::from_http_status(status, Some(message))
    }

    async fn execute(request: RequestBuilder) -> QuillClientResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(QuillClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    /// отправка запроса с разбором json-ответа
    async fn execute_json<TRes>(request: RequestBuilder) -> QuillClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        Self::execute(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(QuillClientError::from_reqwest)
    }

    pub(crate) async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> QuillClientResult<AuthResponse> {
        let payload = RegisterRequestDto {
            username,
            email,
            password,
            confirm_password: password,
        };
        Self::execute_json(
            self.request(Method::POST, "/api/auth/register", None)
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn login(&self, email: &str, password: &str) -> QuillClientResult<AuthResponse> {
        let payload = LoginRequestDto { email, password };
        Self::execute_json(self.request(Method::POST, "/api/auth/login", None).json(&payload)).await
    }

    pub(crate) async fn request_password_reset(&self, email: &str) -> QuillClientResult<()> {
        let payload = RequestPasswordResetDto { email };
        Self::execute(
            self.request(Method::POST, "/api/auth/password-reset/request", None)
                .json(&payload),
        )
        .await?;
        Ok(())
    }

    pub(crate) async fn confirm_password_reset(
        &self,
        token: &str,
        password: &str,
    ) -> QuillClientResult<()> {
        let payload = ConfirmPasswordResetDto {
            token,
            password,
            confirm_password: password,
        };
        Self::execute(
            self.request(Method::POST, "/api/auth/password-reset/confirm", None)
                .json(&payload),
        )
        .await?;
        Ok(())
    }

    pub(crate) async fn current_account(&self, token: &str) -> QuillClientResult<User> {
        Self::execute_json(self.request(Method::GET, "/api/account", Some(token))).await
    }

    pub(crate) async fn update_account(
        &self,
        token: &str,
        username: &str,
        email: &str,
    ) -> QuillClientResult<User> {
        let payload = UpdateAccountDto { username, email };
        Self::execute_json(
            self.request(Method::PUT, "/api/account", Some(token))
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn create_post(&self, token: &str, draft: &PostDraft) -> QuillClientResult<Post> {
        Self::execute_json(
            self.request(Method::POST, "/api/posts", Some(token))
                .json(draft),
        )
        .await
    }

    pub(crate) async fn get_post(&self, id: i64) -> QuillClientResult<Post> {
        Self::execute_json(self.request(Method::GET, &format!("/api/posts/{id}"), None)).await
    }

    pub(crate) async fn update_post(
        &self,
        token: &str,
        id: i64,
        draft: &PostDraft,
    ) -> QuillClientResult<Post> {
        Self::execute_json(
            self.request(Method::PUT, &format!("/api/posts/{id}"), Some(token))
                .json(draft),
        )
        .await
    }

    pub(crate) async fn delete_post(&self, token: &str, id: i64) -> QuillClientResult<()> {
        Self::execute(self.request(Method::DELETE, &format!("/api/posts/{id}"), Some(token))).await?;
        Ok(())
    }

    pub(crate) async fn list_posts(
        &self,
        limit: u32,
        offset: u32,
        filter: &PostFilter,
    ) -> QuillClientResult<ListPostsResponse> {
        let query = ListPostsQuery {
            limit,
            offset,
            q: filter.query.as_deref(),
            tag: filter.tag.as_deref(),
        };

        let dto: ListPostsResponseDto =
            Self::execute_json(self.request(Method::GET, "/api/posts", None).query(&query)).await?;
        Ok(dto.into())
    }

    pub(crate) async fn list_tags(&self) -> QuillClientResult<Vec<TagSummary>> {
        Self::execute_json(self.request(Method::GET, "/api/tags", None)).await
    }

    pub(crate) async fn add_comment(
        &self,
        post_id: i64,
        name: &str,
        comment: &str,
    ) -> QuillClientResult<Comment> {
        let payload = CreateCommentDto { name, comment };
        Self::execute_json(
            self.request(Method::POST, &format!("/api/posts/{post_id}/comments"), None)
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn list_comments(&self, post_id: i64) -> QuillClientResult<Vec<Comment>> {
        Self::execute_json(self.request(
            Method::GET,
            &format!("/api/posts/{post_id}/comments"),
            None,
        ))
        .await
    }
}
