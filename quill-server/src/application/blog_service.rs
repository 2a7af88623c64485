use crate::application::tag_resolver::TagResolver;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::data::tag_repository::TagRepository;
use crate::domain::comment::{Comment, CreateCommentRequest};
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, PostSearch, UpdatePostRequest};
use crate::domain::tag::TagSummary;

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<Post>,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
    pub(crate) total: i64,
}

pub(crate) struct BlogService<P, T, C>
where
    P: PostRepository,
    T: TagRepository + Clone,
    C: CommentRepository,
{
    posts: P,
    tags: T,
    comments: C,
    tag_resolver: TagResolver<T>,
}

impl<P, T, C> BlogService<P, T, C>
where
    P: PostRepository,
    T: TagRepository + Clone,
    C: CommentRepository,
{
    pub(crate) fn new(posts: P, tags: T, comments: C) -> Self {
        let tag_resolver = TagResolver::new(tags.clone());
        Self {
            posts,
            tags,
            comments,
            tag_resolver,
        }
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let tags = self.tag_resolver.resolve(req.tags.as_deref()).await?;

        let new_post = NewPost {
            title: req.title,
            content: req.content,
            chinese_content: req.chinese_content,
            author_id,
            tags,
        };
        self.posts.create_post(new_post).await
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let original_post = self.get_post(post_id).await?;
        if original_post.author_id != actor_user_id {
            return Err(DomainError::Forbidden);
        }

        let tags = self.tag_resolver.resolve(req.tags.as_deref()).await?;
        let patch = PostPatch {
            title: req.title,
            content: req.content,
            chinese_content: req.chinese_content,
            tags,
        };
        self.posts
            .update_post_owned(post_id, actor_user_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))
    }

    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let original_post = self.get_post(post_id).await?;

        if original_post.author_id != actor_user_id {
            return Err(DomainError::Forbidden);
        }

        let deleted = self.posts.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        Ok(())
    }

    pub(crate) async fn list_posts(
        &self,
        limit: u32,
        offset: u32,
        search: PostSearch,
    ) -> Result<ListPostsResult, DomainError> {
        let pagination = Pagination { limit, offset };
        let posts = self.posts.list_posts(&search, pagination).await?;
        let total = self.posts.total_posts(&search).await?;

        Ok(ListPostsResult {
            posts,
            limit,
            offset,
            total,
        })
    }

    pub(crate) async fn list_tags(&self) -> Result<Vec<TagSummary>, DomainError> {
        self.tags.list_with_counts().await
    }

    pub(crate) async fn add_comment(
        &self,
        post_id: i64,
        req: CreateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        self.get_post(post_id).await?;

        self.comments
            .create_comment(NewComment {
                post_id,
                name: req.name,
                comment: req.comment,
            })
            .await
    }

    pub(crate) async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        self.get_post(post_id).await?;
        self.comments.list_for_post(post_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::BlogService;
    use crate::data::comment_repository::{CommentRepository, NewComment};
    use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
    use crate::data::tag_repository::TagRepository;
    use crate::domain::comment::{Comment, CreateCommentRequest};
    use crate::domain::error::DomainError;
    use crate::domain::post::{CreatePostRequest, Post, PostSearch, UpdatePostRequest};
    use crate::domain::tag::{Tag, TagSummary};

    #[derive(Clone)]
    struct FakePostRepo {
        created_input: Arc<Mutex<Option<NewPost>>>,
        post_for_get: Arc<Mutex<Option<Post>>>,
        update_owned_result: Arc<Mutex<Option<Post>>>,
        update_owned_call: Arc<Mutex<Option<(i64, i64, PostPatch)>>>,
        delete_result: Arc<Mutex<bool>>,
        list_result: Arc<Mutex<Vec<Post>>>,
        list_search: Arc<Mutex<Option<PostSearch>>>,
        list_pagination: Arc<Mutex<Option<Pagination>>>,
        total_result: Arc<Mutex<i64>>,
    }

    impl FakePostRepo {
        fn new() -> Self {
            Self {
                created_input: Arc::new(Mutex::new(None)),
                post_for_get: Arc::new(Mutex::new(None)),
                update_owned_result: Arc::new(Mutex::new(None)),
                update_owned_call: Arc::new(Mutex::new(None)),
                delete_result: Arc::new(Mutex::new(true)),
                list_result: Arc::new(Mutex::new(Vec::new())),
                list_search: Arc::new(Mutex::new(None)),
                list_pagination: Arc::new(Mutex::new(None)),
                total_result: Arc::new(Mutex::new(0)),
            }
        }

        fn set_post(&self, post: Post) {
            *self
                .post_for_get
                .lock()
                .expect("post_for_get mutex poisoned") = Some(post);
        }
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
            *self
                .created_input
                .lock()
                .expect("created_input mutex poisoned") = Some(input.clone());
            let tags = input
                .tags
                .existing
                .iter()
                .cloned()
                .chain(input.tags.new.iter().enumerate().map(|(idx, tag)| {
                    Tag::new(100 + idx as i64, tag.name.clone()).expect("valid tag")
                }))
                .collect();
            Ok(sample_post(1, &input.title, input.author_id).with_tags(tags))
        }

        async fn get_post(&self, _id: i64) -> Result<Option<Post>, DomainError> {
            Ok(self
                .post_for_get
                .lock()
                .expect("post_for_get mutex poisoned")
                .clone())
        }

        async fn update_post_owned(
            &self,
            post_id: i64,
            owner_id: i64,
            patch: PostPatch,
        ) -> Result<Option<Post>, DomainError> {
            *self
                .update_owned_call
                .lock()
                .expect("update_owned_call mutex poisoned") = Some((post_id, owner_id, patch));
            Ok(self
                .update_owned_result
                .lock()
                .expect("update_owned_result mutex poisoned")
                .clone())
        }

        async fn delete_post(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(*self
                .delete_result
                .lock()
                .expect("delete_result mutex poisoned"))
        }

        async fn list_posts(
            &self,
            search: &PostSearch,
            pagination: Pagination,
        ) -> Result<Vec<Post>, DomainError> {
            *self.list_search.lock().expect("list_search mutex poisoned") = Some(search.clone());
            *self
                .list_pagination
                .lock()
                .expect("list_pagination mutex poisoned") = Some(pagination);
            Ok(self
                .list_result
                .lock()
                .expect("list_result mutex poisoned")
                .clone())
        }

        async fn total_posts(&self, _search: &PostSearch) -> Result<i64, DomainError> {
            Ok(*self
                .total_result
                .lock()
                .expect("total_result mutex poisoned"))
        }
    }

    #[derive(Clone, Default)]
    struct FakeTagRepo {
        stored: Arc<Mutex<Vec<Tag>>>,
        summaries: Arc<Mutex<Vec<TagSummary>>>,
    }

    #[async_trait]
    impl TagRepository for FakeTagRepo {
        async fn find_by_names(&self, names: &BTreeSet<String>) -> Result<Vec<Tag>, DomainError> {
            Ok(self
                .stored
                .lock()
                .expect("stored mutex poisoned")
                .iter()
                .filter(|tag| names.contains(&tag.name))
                .cloned()
                .collect())
        }

        async fn list_with_counts(&self) -> Result<Vec<TagSummary>, DomainError> {
            Ok(self
                .summaries
                .lock()
                .expect("summaries mutex poisoned")
                .clone())
        }
    }

    #[derive(Clone, Default)]
    struct FakeCommentRepo {
        stored: Arc<Mutex<Vec<Comment>>>,
    }

    #[async_trait]
    impl CommentRepository for FakeCommentRepo {
        async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
            let mut stored = self.stored.lock().expect("stored mutex poisoned");
            let comment = Comment::new(
                stored.len() as i64 + 1,
                input.post_id,
                input.name,
                input.comment,
                Utc::now(),
            )?;
            stored.push(comment.clone());
            Ok(comment)
        }

        async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
            Ok(self
                .stored
                .lock()
                .expect("stored mutex poisoned")
                .iter()
                .filter(|comment| comment.post_id == post_id)
                .cloned()
                .collect())
        }
    }

    type TestService = BlogService<FakePostRepo, FakeTagRepo, FakeCommentRepo>;

    fn service(posts: FakePostRepo, tags: FakeTagRepo) -> TestService {
        BlogService::new(posts, tags, FakeCommentRepo::default())
    }

    fn tag_repo_with(tags: &[(i64, &str)]) -> FakeTagRepo {
        let repo = FakeTagRepo::default();
        *repo.stored.lock().expect("stored mutex poisoned") = tags
            .iter()
            .map(|(id, name)| Tag::new(*id, *name).expect("valid tag"))
            .collect();
        repo
    }

    fn create_request(title: &str, tags: Option<&str>) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            content: "  content  ".to_string(),
            chinese_content: "内容".to_string(),
            tags: tags.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_post_normalizes_request_before_repo_call() {
        let repo = FakePostRepo::new();
        let service = service(repo.clone(), FakeTagRepo::default());

        let created = service
            .create_post(10, create_request("  title  ", None))
            .await
            .expect("create_post must succeed");

        assert_eq!(created.title, "title");

        let input = repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("repo input must be captured");
        assert_eq!(input.title, "title");
        assert_eq!(input.content, "content");
        assert_eq!(input.author_id, 10);
        assert!(input.tags.is_empty());
    }

    #[tokio::test]
    async fn create_post_passes_resolved_tags_to_repo() {
        let repo = FakePostRepo::new();
        let service = service(repo.clone(), tag_repo_with(&[(1, "x"), (2, "y")]));

        let created = service
            .create_post(10, create_request("title", Some("x, z, x")))
            .await
            .expect("create_post must succeed");

        let input = repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("repo input must be captured");
        assert_eq!(input.tags.existing, vec![Tag::new(1, "x").expect("valid tag")]);
        assert_eq!(input.tags.new.len(), 1);
        assert_eq!(input.tags.new[0].name, "z");

        let names: Vec<&str> = created.tags.iter().map(|tag| tag.name.as_str()).collect();
        assert_eq!(names, vec!["x", "z"]);
    }

    #[tokio::test]
    async fn get_post_returns_not_found_when_missing() {
        let service = service(FakePostRepo::new(), FakeTagRepo::default());

        let err = service
            .get_post(42)
            .await
            .expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_post_uses_update_post_owned_contract() {
        let repo = FakePostRepo::new();
        repo.set_post(sample_post(7, "old", 10));
        *repo
            .update_owned_result
            .lock()
            .expect("update_owned_result mutex poisoned") = Some(sample_post(7, "new", 10));

        let service = service(repo.clone(), tag_repo_with(&[(3, "rust")]));
        let req = UpdatePostRequest {
            title: "  new  ".to_string(),
            content: "  body  ".to_string(),
            chinese_content: "正文".to_string(),
            tags: Some("rust".to_string()),
        };

        let updated = service
            .update_post(10, 7, req)
            .await
            .expect("update must succeed");
        assert_eq!(updated.id, 7);

        let call = repo
            .update_owned_call
            .lock()
            .expect("update_owned_call mutex poisoned")
            .clone()
            .expect("update call must be captured");
        assert_eq!(call.0, 7);
        assert_eq!(call.1, 10);
        assert_eq!(call.2.title, "new");
        assert_eq!(call.2.content, "body");
        assert_eq!(call.2.tags.existing[0].id, 3);
    }

    #[tokio::test]
    async fn update_post_returns_forbidden_for_non_owner() {
        let repo = FakePostRepo::new();
        repo.set_post(sample_post(7, "title", 99));

        let service = service(repo.clone(), FakeTagRepo::default());
        let req = UpdatePostRequest {
            title: "new".to_string(),
            content: "body".to_string(),
            chinese_content: "正文".to_string(),
            tags: None,
        };

        let err = service
            .update_post(10, 7, req)
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
        assert!(
            repo.update_owned_call
                .lock()
                .expect("update_owned_call mutex poisoned")
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_post_returns_forbidden_for_non_owner() {
        let repo = FakePostRepo::new();
        repo.set_post(sample_post(7, "title", 99));

        let service = service(repo, FakeTagRepo::default());
        let err = service
            .delete_post(10, 7)
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn list_posts_returns_posts_and_total() {
        let repo = FakePostRepo::new();
        *repo.list_result.lock().expect("list_result mutex poisoned") =
            vec![sample_post(1, "a", 10)];
        *repo
            .total_result
            .lock()
            .expect("total_result mutex poisoned") = 1;

        let service = service(repo.clone(), FakeTagRepo::default());
        let result = service
            .list_posts(
                10,
                0,
                PostSearch::new(Some("  rust ".to_string()), Some(" ".to_string())),
            )
            .await
            .expect("list_posts must succeed");

        assert_eq!(result.limit, 10);
        assert_eq!(result.offset, 0);
        assert_eq!(result.total, 1);
        assert_eq!(result.posts.len(), 1);

        let search = repo
            .list_search
            .lock()
            .expect("list_search mutex poisoned")
            .clone()
            .expect("search must be captured");
        assert_eq!(search.query.as_deref(), Some("rust"));
        assert!(search.tag.is_none());
    }

    #[tokio::test]
    async fn list_posts_passes_unaligned_offset_through() {
        let repo = FakePostRepo::new();
        let service = service(repo.clone(), FakeTagRepo::default());

        let result = service
            .list_posts(10, 5, PostSearch::new(None, None))
            .await
            .expect("list_posts must succeed");

        assert_eq!(result.limit, 10);
        assert_eq!(result.offset, 5);

        let pagination = repo
            .list_pagination
            .lock()
            .expect("list_pagination mutex poisoned")
            .expect("pagination must be captured");
        assert_eq!(pagination.limit, 10);
        assert_eq!(pagination.offset, 5);
    }

    #[tokio::test]
    async fn list_tags_returns_repository_summaries() {
        let tags = FakeTagRepo::default();
        *tags.summaries.lock().expect("summaries mutex poisoned") = vec![TagSummary {
            id: 1,
            name: "rust".to_string(),
            post_count: 3,
        }];

        let service = service(FakePostRepo::new(), tags);
        let summaries = service.list_tags().await.expect("list_tags must succeed");

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].post_count, 3);
    }

    #[tokio::test]
    async fn add_comment_requires_existing_post() {
        let service = service(FakePostRepo::new(), FakeTagRepo::default());

        let err = service
            .add_comment(
                5,
                CreateCommentRequest {
                    name: "reader".to_string(),
                    comment: "nice".to_string(),
                },
            )
            .await
            .expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn added_comments_are_listed_for_their_post() {
        let repo = FakePostRepo::new();
        repo.set_post(sample_post(5, "title", 10));
        let service = service(repo, FakeTagRepo::default());

        let comment = service
            .add_comment(
                5,
                CreateCommentRequest {
                    name: "  reader ".to_string(),
                    comment: "nice post".to_string(),
                },
            )
            .await
            .expect("add_comment must succeed");
        assert_eq!(comment.name, "reader");

        let comments = service
            .list_comments(5)
            .await
            .expect("list_comments must succeed");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].comment, "nice post");
    }

    fn sample_post(id: i64, title: &str, author_id: i64) -> Post {
        Post::new(
            id,
            title.to_string(),
            "content".to_string(),
            "内容".to_string(),
            author_id,
            Utc::now(),
            Utc::now(),
        )
        .expect("sample post must be valid")
    }
}
