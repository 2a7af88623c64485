use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Имя файла аватара.
    pub image_file: String,
    /// Дата и время создания пользователя (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Тег, прикреплённый к посту.
pub struct Tag {
    /// Идентификатор тега.
    pub id: i64,
    /// Имя тега (регистр учитывается).
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Тег с количеством постов.
pub struct TagSummary {
    /// Идентификатор тега.
    pub id: i64,
    /// Имя тега.
    pub name: String,
    /// Количество постов с этим тегом.
    pub post_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок поста.
    pub title: String,
    /// Содержимое поста.
    pub content: String,
    /// Китайская версия содержимого.
    pub chinese_content: String,
    /// Идентификатор автора.
    pub author_id: i64,
    /// Теги поста, отсортированные по имени.
    pub tags: Vec<Tag>,
    /// Количество комментариев.
    pub total_comments: i64,
    /// Дата и время создания поста (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления поста (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Данные для создания или полного обновления поста.
pub struct PostDraft {
    /// Заголовок (1..100 символов).
    pub title: String,
    /// Содержимое.
    pub content: String,
    /// Китайская версия содержимого.
    pub chinese_content: String,
    /// Теги через запятую, например `"rust, web"`. При обновлении заменяют
    /// текущий набор тегов целиком.
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Default)]
/// Фильтры списка постов.
pub struct PostFilter {
    /// Поиск подстроки без учёта регистра.
    pub query: Option<String>,
    /// Точное имя тега.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Комментарий к посту.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Идентификатор поста.
    pub post_id: i64,
    /// Имя автора комментария.
    pub name: String,
    /// Текст комментария.
    pub comment: String,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ после успешной регистрации или входа.
pub struct AuthResponse {
    /// JWT access token.
    pub access_token: String,
    /// Данные пользователя.
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ списка постов с параметрами пагинации.
pub struct ListPostsResponse {
    /// Список постов на текущей странице.
    pub posts: Vec<Post>,
    /// Размер страницы.
    pub limit: u32,
    /// Смещение от начала выборки.
    pub offset: u32,
    /// Общее количество постов, подходящих под фильтр.
    pub total: u64,
}
