use std::time::{SystemTime, UNIX_EPOCH};

use quill_client::{PostDraft, PostFilter, QuillClient, QuillClientError};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{}", nanos % 1_000_000_000_000)
}

#[tokio::test]
#[ignore = "requires running HTTP server and database"]
async fn http_smoke_flow() {
    let base_url =
        std::env::var("QUILL_HTTP_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    let mut client = QuillClient::new(base_url).expect("client must build");

    let suffix = unique_suffix();
    let username = format!("u{}", &suffix[suffix.len().saturating_sub(12)..]);
    let email = format!("smoke_{suffix}@example.com");
    let password = "password123";

    let register = client
        .register(&username, &email, password)
        .await
        .expect("register must succeed");
    assert!(!register.access_token.is_empty());
    assert_eq!(register.user.username, username);
    assert_eq!(register.user.image_file, "default.jpg");

    let login = client
        .login(&email, password)
        .await
        .expect("login must succeed");
    assert_eq!(login.user.id, register.user.id);

    let tag = format!("smoke-{suffix}");
    let created = client
        .create_post(&PostDraft {
            title: "smoke title".to_string(),
            content: "smoke content".to_string(),
            chinese_content: "冒烟测试".to_string(),
            tags: Some(format!("{tag}, {tag}, rust")),
        })
        .await
        .expect("create_post must succeed");
    let tag_names: Vec<&str> = created.tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(tag_names.len(), 2);
    assert!(tag_names.contains(&tag.as_str()));

    let listed = client
        .list_posts(
            20,
            0,
            &PostFilter {
                query: None,
                tag: Some(tag.clone()),
            },
        )
        .await
        .expect("list_posts must succeed");
    assert_eq!(listed.total, 1);
    assert_eq!(listed.posts[0].id, created.id);

    client
        .add_comment(created.id, "reader", "nice post")
        .await
        .expect("add_comment must succeed");
    let comments = client
        .list_comments(created.id)
        .await
        .expect("list_comments must succeed");
    assert_eq!(comments.len(), 1);
    assert_eq!(
        client
            .get_post(created.id)
            .await
            .expect("get_post must succeed")
            .total_comments,
        1
    );

    let updated = client
        .update_post(
            created.id,
            &PostDraft {
                title: "smoke title updated".to_string(),
                content: "smoke content".to_string(),
                chinese_content: "冒烟测试".to_string(),
                tags: None,
            },
        )
        .await
        .expect("update_post must succeed");
    assert!(updated.tags.is_empty());

    client
        .request_password_reset(&email)
        .await
        .expect("reset request must be accepted");
    let bad_reset = client
        .confirm_password_reset("garbage-string", "another-password")
        .await;
    assert!(matches!(bad_reset, Err(QuillClientError::InvalidRequest(_))));

    client
        .delete_post(created.id)
        .await
        .expect("delete_post must succeed");

    let after_delete = client.get_post(created.id).await;
    assert!(matches!(after_delete, Err(QuillClientError::NotFound)));
}
