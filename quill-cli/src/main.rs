use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quill_client::{
    AuthResponse, Comment, ListPostsResponse, Post, PostDraft, PostFilter, QuillClient,
    QuillClientError, TagSummary, User,
};
use serde::Serialize;

const TOKEN_FILE: &str = ".quill_token";
const DEFAULT_HTTP_SERVER: &str = "http://127.0.0.1:8080";
const SERVER_ENV: &str = "QUILL_SERVER";

#[derive(Debug, Parser)]
#[command(name = "quill-cli", version, about = "CLI клиент для quill-server")]
struct Cli {
    /// Адрес HTTP-сервера (по умолчанию $QUILL_SERVER или http://127.0.0.1:8080).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Печатать ответ сервера в формате JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Вход пользователя по email.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: удаляет сохранённый токен.
    Logout,
    /// Запрос письма для сброса пароля.
    ResetRequest {
        #[arg(long)]
        email: String,
    },
    /// Установка нового пароля по токену из письма.
    ResetConfirm {
        #[arg(long)]
        token: String,
        #[arg(long)]
        password: String,
    },
    /// Текущий пользователь (требует токен).
    Account,
    /// Обновление учётной записи (требует токен).
    ///
    /// Неуказанные поля остаются без изменений.
    UpdateAccount {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Создание поста (требует токен).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        chinese_content: String,
        /// Теги через запятую, например "rust, web".
        #[arg(long)]
        tags: Option<String>,
    },
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Обновление поста (требует токен).
    ///
    /// Неуказанные поля берутся из текущей версии поста, включая теги.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        chinese_content: Option<String>,
        /// Новый набор тегов; пустая строка удаляет все теги.
        #[arg(long)]
        tags: Option<String>,
    },
    /// Удаление поста (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Список постов.
    List {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Поиск по заголовку и содержимому.
        #[arg(long)]
        query: Option<String>,
        /// Фильтр по имени тега.
        #[arg(long)]
        tag: Option<String>,
    },
    /// Список тегов с количеством постов.
    Tags,
    /// Добавление комментария к посту.
    Comment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        text: String,
    },
    /// Комментарии поста.
    Comments {
        #[arg(long)]
        post_id: i64,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let server = resolve_server(cli.server, std::env::var(SERVER_ENV).ok());
    let mut client = QuillClient::new(server).map_err(map_client_error)?;

    if let Some(token) = load_token().context("не удалось прочитать .quill_token")? {
        client.set_token(token);
    }

    let json = cli.json;
    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let auth = client
                .register(&username, &email, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            output(json, &auth, |auth| print_auth("Регистрация успешна", auth))?;
        }
        Command::Login { email, password } => {
            let auth = client
                .login(&email, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            output(json, &auth, |auth| print_auth("Вход выполнен", auth))?;
        }
        Command::Logout => {
            remove_token().context("не удалось удалить токен")?;
            println!("Токен удалён");
        }
        Command::ResetRequest { email } => {
            client
                .request_password_reset(&email)
                .await
                .map_err(map_client_error)?;
            println!("Если адрес зарегистрирован, письмо со ссылкой для сброса отправлено");
        }
        Command::ResetConfirm { token, password } => {
            client
                .confirm_password_reset(&token, &password)
                .await
                .map_err(map_client_error)?;
            println!("Пароль изменён, выполните вход");
        }
        Command::Account => {
            let user = client.current_account().await.map_err(map_client_error)?;
            output(json, &user, |user| print_user("Учётная запись", user))?;
        }
        Command::UpdateAccount { username, email } => {
            let current = client.current_account().await.map_err(map_client_error)?;
            let username = username.unwrap_or(current.username);
            let email = email.unwrap_or(current.email);

            let user = client
                .update_account(&username, &email)
                .await
                .map_err(map_client_error)?;
            output(json, &user, |user| print_user("Учётная запись обновлена", user))?;
        }
        Command::Create {
            title,
            content,
            chinese_content,
            tags,
        } => {
            let draft = PostDraft {
                title,
                content,
                chinese_content,
                tags,
            };
            let post = client
                .create_post(&draft)
                .await
                .map_err(map_client_error)?;
            output(json, &post, |post| print_post("Пост создан", post))?;
        }
        Command::Get { id } => {
            let post = client.get_post(id).await.map_err(map_client_error)?;
            output(json, &post, |post| print_post("Пост", post))?;
        }
        Command::Update {
            id,
            title,
            content,
            chinese_content,
            tags,
        } => {
            let current = client.get_post(id).await.map_err(map_client_error)?;
            let draft = merge_draft(current, title, content, chinese_content, tags);

            let post = client
                .update_post(id, &draft)
                .await
                .map_err(map_client_error)?;
            output(json, &post, |post| print_post("Пост обновлён", post))?;
        }
        Command::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
        Command::List {
            limit,
            offset,
            query,
            tag,
        } => {
            let filter = PostFilter { query, tag };
            let list = client
                .list_posts(limit, offset, &filter)
                .await
                .map_err(map_client_error)?;
            output(json, &list, print_list)?;
        }
        Command::Tags => {
            let tags = client.list_tags().await.map_err(map_client_error)?;
            output(json, &tags, |tags| print_tags(tags))?;
        }
        Command::Comment {
            post_id,
            name,
            text,
        } => {
            let comment = client
                .add_comment(post_id, &name, &text)
                .await
                .map_err(map_client_error)?;
            output(json, &comment, |comment| {
                println!("Комментарий добавлен");
                print_comment(comment);
            })?;
        }
        Command::Comments { post_id } => {
            let comments = client
                .list_comments(post_id)
                .await
                .map_err(map_client_error)?;
            output(json, &comments, |comments| print_comments(comments))?;
        }
    }

    Ok(())
}

fn resolve_server(flag: Option<String>, env: Option<String>) -> String {
    let raw = flag
        .or(env)
        .filter(|server| !server.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_HTTP_SERVER.to_string());
    normalize_server(raw.trim().to_string())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn merge_draft(
    current: Post,
    title: Option<String>,
    content: Option<String>,
    chinese_content: Option<String>,
    tags: Option<String>,
) -> PostDraft {
    // обновление на сервере заменяет теги целиком, поэтому передаём текущие
    let tags = tags.or_else(|| {
        let names: Vec<&str> = current.tags.iter().map(|tag| tag.name.as_str()).collect();
        (!names.is_empty()).then(|| names.join(", "))
    });

    PostDraft {
        title: title.unwrap_or(current.title),
        content: content.unwrap_or(current.content),
        chinese_content: chinese_content.unwrap_or(current.chinese_content),
        tags,
    }
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(client: &QuillClient) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn remove_token() -> io::Result<()> {
    match fs::remove_file(TOKEN_FILE) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn map_client_error(err: QuillClientError) -> anyhow::Error {
    let message = match err {
        QuillClientError::Unauthorized => {
            "требуется авторизация: выполните `quill-cli login ...` или `quill-cli register ...`"
                .to_string()
        }
        QuillClientError::Forbidden => "операция доступна только автору поста".to_string(),
        QuillClientError::NotFound => "ресурс не найден".to_string(),
        QuillClientError::Conflict(message) => format!("конфликт: {message}"),
        QuillClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        QuillClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

fn output<T: Serialize>(json: bool, value: &T, print: impl FnOnce(&T)) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(value).context("не удалось сериализовать ответ")?;
        println!("{rendered}");
    } else {
        print(value);
    }
    Ok(())
}

fn print_auth(title: &str, auth: &AuthResponse) {
    println!("{title}");
    println!("token: {}", auth.access_token);
    print_user("user:", &auth.user);
}

fn print_user(title: &str, user: &User) {
    println!("{title}");
    println!("  id: {}", user.id);
    println!("  username: {}", user.username);
    println!("  email: {}", user.email);
    println!("  image_file: {}", user.image_file);
    println!("  created_at: {}", user.created_at);
}

fn format_tags(post: &Post) -> String {
    post.tags
        .iter()
        .map(|tag| tag.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("content: {}", post.content);
    println!("chinese_content: {}", post.chinese_content);
    println!("tags: {}", format_tags(post));
    println!("comments: {}", post.total_comments);
    println!("author_id: {}", post.author_id);
    println!("created_at: {}", post.created_at);
    println!("updated_at: {}", post.updated_at);
}

fn print_list(list: &ListPostsResponse) {
    println!(
        "Постов: {} (limit={}, offset={}, total={})",
        list.posts.len(),
        list.limit,
        list.offset,
        list.total
    );

    for post in &list.posts {
        println!(
            "- [{}] {} [{}] (author_id={}, comments={})",
            post.id,
            post.title,
            format_tags(post),
            post.author_id,
            post.total_comments
        );
    }
}

fn print_tags(tags: &[TagSummary]) {
    println!("Тегов: {}", tags.len());
    for tag in tags {
        println!("- {} ({})", tag.name, tag.post_count);
    }
}

fn print_comment(comment: &Comment) {
    println!(
        "- [{}] {} ({}): {}",
        comment.id, comment.name, comment.created_at, comment.comment
    );
}

fn print_comments(comments: &[Comment]) {
    println!("Комментариев: {}", comments.len());
    for comment in comments {
        print_comment(comment);
    }
}
