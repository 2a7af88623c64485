//! Клиентская библиотека для работы с quill-server по HTTP.
//!
//! Предоставляет `QuillClient` поверх REST API (`reqwest`): учётная запись,
//! сброс пароля, посты с тегами и поиском, комментарии.
//!
//! Клиент хранит JWT-токен после `register`/`login` и автоматически использует
//! его в защищённых операциях.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{QuillClientError, QuillClientResult};
pub use models::{
    AuthResponse, Comment, ListPostsResponse, Post, PostDraft, PostFilter, Tag, TagSummary, User,
};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Клиент блог-сервиса.
pub struct QuillClient {
    http: HttpClient,
    token: Option<String>,
}

impl QuillClient {
    /// Создаёт клиент для сервера с базовым URL, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> QuillClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Устанавливает JWT-токен вручную.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий JWT-токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый JWT-токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Регистрирует пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> QuillClientResult<AuthResponse> {
        let result = self.http.register(username, email, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Выполняет вход по email и сохраняет полученный JWT-токен в клиенте.
    pub async fn login(&mut self, email: &str, password: &str) -> QuillClientResult<AuthResponse> {
        let result = self.http.login(email, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Запрашивает письмо со ссылкой для сброса пароля.
    ///
    /// Сервер отвечает одинаково для существующих и несуществующих адресов.
    pub async fn request_password_reset(&self, email: &str) -> QuillClientResult<()> {
        self.http.request_password_reset(email).await
    }

    /// Устанавливает новый пароль по токену из письма.
    pub async fn confirm_password_reset(&self, token: &str, password: &str) -> QuillClientResult<()> {
        self.http.confirm_password_reset(token, password).await
    }

    /// Возвращает текущего пользователя.
    ///
    /// Требует установленный JWT-токен.
    pub async fn current_account(&self) -> QuillClientResult<User> {
        let token = self.require_token()?;
        self.http.current_account(token).await
    }

    /// Обновляет имя пользователя и email.
    ///
    /// Требует установленный JWT-токен.
    pub async fn update_account(&self, username: &str, email: &str) -> QuillClientResult<User> {
        let token = self.require_token()?;
        self.http.update_account(token, username, email).await
    }

    /// Создаёт новый пост.
    ///
    /// Требует установленный JWT-токен.
    pub async fn create_post(&self, draft: &PostDraft) -> QuillClientResult<Post> {
        let token = self.require_token()?;
        self.http.create_post(token, draft).await
    }

    /// Возвращает пост по идентификатору.
    pub async fn get_post(&self, id: i64) -> QuillClientResult<Post> {
        self.http.get_post(id).await
    }

    /// Полностью обновляет пост, включая набор тегов.
    ///
    /// Требует установленный JWT-токен.
    pub async fn update_post(&self, id: i64, draft: &PostDraft) -> QuillClientResult<Post> {
        let token = self.require_token()?;
        self.http.update_post(token, id, draft).await
    }

    /// Удаляет пост по идентификатору.
    ///
    /// Требует установленный JWT-токен.
    pub async fn delete_post(&self, id: i64) -> QuillClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_post(token, id).await
    }

    /// Возвращает список постов с пагинацией `limit/offset` и фильтрами.
    pub async fn list_posts(
        &self,
        limit: u32,
        offset: u32,
        filter: &PostFilter,
    ) -> QuillClientResult<ListPostsResponse> {
        self.http.list_posts(limit, offset, filter).await
    }

    /// Возвращает все теги с количеством постов.
    pub async fn list_tags(&self) -> QuillClientResult<Vec<TagSummary>> {
        self.http.list_tags().await
    }

    /// Добавляет комментарий к посту.
    pub async fn add_comment(
        &self,
        post_id: i64,
        name: &str,
        comment: &str,
    ) -> QuillClientResult<Comment> {
        self.http.add_comment(post_id, name, comment).await
    }

    /// Возвращает комментарии поста, старые первыми.
    pub async fn list_comments(&self, post_id: i64) -> QuillClientResult<Vec<Comment>> {
        self.http.list_comments(post_id).await
    }

    fn require_token(&self) -> QuillClientResult<&str> {
        self.token.as_deref().ok_or(QuillClientError::Unauthorized)
    }
}
