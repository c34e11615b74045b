use chrono::Utc;
use tracing::{info, warn};

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::{NewPost, Pagination, PostFilter, PostPatch, PostRepository};
use crate::domain::comment::{Comment, CommentForm};
use crate::domain::error::DomainError;
use crate::domain::identity::Actor;
use crate::domain::post::{Post, PostForm};

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<Post>,
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) total: i64,
}

/// Which slice of the feed to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PostScope {
    Feed,
    Author(i64),
    Category(i64),
    Location(i64),
}

/// Result of replacing a post image; `previous` is the path that is no
/// longer referenced.
#[derive(Debug, Clone)]
pub(crate) struct ImageChange {
    pub(crate) post: Post,
    pub(crate) previous: Option<String>,
}

pub(crate) struct BlogService<P: PostRepository, C: CommentRepository> {
    posts: P,
    comments: C,
}

impl<P: PostRepository, C: CommentRepository> BlogService<P, C> {
    pub(crate) fn new(posts: P, comments: C) -> Self {
        Self { posts, comments }
    }

    pub(crate) async fn create_post(
        &self,
        actor: &Actor,
        form: PostForm,
    ) -> Result<Post, DomainError> {
        let form = form.validate()?;
        let post = self
            .posts
            .create_post(NewPost::from_form(form, actor.user_id))
            .await?;

        info!(post_id = post.id, author_id = actor.user_id, "post created");
        Ok(post)
    }

    /// Hidden posts read as missing to everyone but their author.
    pub(crate) async fn get_post(
        &self,
        viewer: Option<&Actor>,
        post_id: i64,
    ) -> Result<Post, DomainError> {
        let post = self.find_post(post_id).await?;
        if !post.is_visible_to(viewer, Utc::now()) {
            return Err(DomainError::not_found("post", post_id));
        }
        Ok(post)
    }

    /// Fetches a post the actor is allowed to change.
    pub(crate) async fn get_post_for_edit(
        &self,
        actor: &Actor,
        post_id: i64,
    ) -> Result<Post, DomainError> {
        let post = self.find_post(post_id).await?;
        if let Err(err) = actor.ensure_can_manage(post.author.id) {
            warn!(post_id, actor_id = actor.user_id, "post edit rejected");
            return Err(err);
        }
        Ok(post)
    }

    pub(crate) async fn update_post(
        &self,
        actor: &Actor,
        post_id: i64,
        form: PostForm,
    ) -> Result<Post, DomainError> {
        let form = form.validate()?;
        self.get_post_for_edit(actor, post_id).await?;

        let post = self
            .posts
            .update_post(post_id, PostPatch::from(form))
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        info!(post_id, actor_id = actor.user_id, "post updated");
        Ok(post)
    }

    pub(crate) async fn replace_post_image(
        &self,
        actor: &Actor,
        post_id: i64,
        image: Option<String>,
    ) -> Result<ImageChange, DomainError> {
        let current = self.get_post_for_edit(actor, post_id).await?;

        let post = self
            .posts
            .set_image(post_id, image)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        Ok(ImageChange {
            previous: current.image.filter(|old| post.image.as_ref() != Some(old)),
            post,
        })
    }

    /// Deletes the post with its comments and returns what was removed.
    pub(crate) async fn delete_post(&self, actor: &Actor, post_id: i64) -> Result<Post, DomainError> {
        let post = self.get_post_for_edit(actor, post_id).await?;

        if !self.posts.delete_post(post_id).await? {
            return Err(DomainError::not_found("post", post_id));
        }

        info!(post_id, actor_id = actor.user_id, "post deleted");
        Ok(post)
    }

    pub(crate) async fn list_posts(
        &self,
        viewer: Option<&Actor>,
        scope: PostScope,
        page: u32,
        page_size: u32,
    ) -> Result<ListPostsResult, DomainError> {
        let filter = PostFilter::visible_to(viewer.map(|actor| actor.user_id), Utc::now());
        let filter = match scope {
            PostScope::Feed => filter,
            PostScope::Author(id) => filter.by_author(id),
            PostScope::Category(id) => filter.in_category(id),
            PostScope::Location(id) => filter.at_location(id),
        };
        self.page_of_posts(&filter, page, page_size).await
    }

    /// Every post regardless of status, for moderation.
    pub(crate) async fn list_all_posts(
        &self,
        actor: &Actor,
        page: u32,
        page_size: u32,
    ) -> Result<ListPostsResult, DomainError> {
        actor.ensure_staff()?;
        self.page_of_posts(&PostFilter::everything(Utc::now()), page, page_size)
            .await
    }

    pub(crate) async fn list_comments(
        &self,
        viewer: Option<&Actor>,
        post_id: i64,
    ) -> Result<Vec<Comment>, DomainError> {
        self.get_post(viewer, post_id).await?;
        self.comments.list_for_post(post_id).await
    }

    pub(crate) async fn add_comment(
        &self,
        actor: &Actor,
        post_id: i64,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        let form = form.validate()?;
        self.get_post(Some(actor), post_id).await?;

        let comment = self
            .comments
            .create_comment(NewComment {
                text: form.text,
                author_id: actor.user_id,
                post_id,
            })
            .await?;

        info!(comment_id = comment.id, post_id, author_id = actor.user_id, "comment added");
        Ok(comment)
    }

    pub(crate) async fn get_comment_for_edit(
        &self,
        actor: &Actor,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Comment, DomainError> {
        let comment = self
            .comments
            .get_comment(comment_id)
            .await?
            .filter(|comment| comment.post_id == post_id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))?;

        if let Err(err) = actor.ensure_can_manage(comment.author.id) {
            warn!(comment_id, actor_id = actor.user_id, "comment edit rejected");
            return Err(err);
        }
        Ok(comment)
    }

    pub(crate) async fn update_comment(
        &self,
        actor: &Actor,
        post_id: i64,
        comment_id: i64,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        let form = form.validate()?;
        self.get_comment_for_edit(actor, post_id, comment_id).await?;

        self.comments
            .update_comment(comment_id, form.text)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }

    pub(crate) async fn delete_comment(
        &self,
        actor: &Actor,
        post_id: i64,
        comment_id: i64,
    ) -> Result<(), DomainError> {
        self.get_comment_for_edit(actor, post_id, comment_id).await?;

        if !self.comments.delete_comment(comment_id).await? {
            return Err(DomainError::not_found("comment", comment_id));
        }

        info!(comment_id, post_id, actor_id = actor.user_id, "comment deleted");
        Ok(())
    }

    pub(crate) async fn list_all_comments(
        &self,
        actor: &Actor,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Comment>, DomainError> {
        actor.ensure_staff()?;
        self.comments
            .list_comments(Pagination { page, page_size })
            .await
    }

    async fn find_post(&self, post_id: i64) -> Result<Post, DomainError> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn page_of_posts(
        &self,
        filter: &PostFilter,
        page: u32,
        page_size: u32,
    ) -> Result<ListPostsResult, DomainError> {
        let posts = self
            .posts
            .list_posts(filter, Pagination { page, page_size })
            .await?;
        let total = self.posts.count_posts(filter).await?;

        Ok(ListPostsResult {
            posts,
            page,
            page_size,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{BlogService, PostScope};
    use crate::application::in_memory::InMemoryStore;
    use crate::data::category_repository::CategoryRepository;
    use crate::data::location_repository::LocationRepository;
    use crate::domain::comment::CommentForm;
    use crate::domain::error::DomainError;
    use crate::domain::identity::Actor;
    use crate::domain::post::PostForm;
    use crate::domain::user::User;

    struct Fixture {
        store: InMemoryStore,
        service: BlogService<InMemoryStore, InMemoryStore>,
        author: Actor,
        reader: Actor,
        admin: Actor,
        news_id: i64,
    }

    fn actor(user: &User) -> Actor {
        Actor::new(user.id, user.is_staff)
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let author = actor(&store.seed_user("u1", false));
        let reader = actor(&store.seed_user("u2", false));
        let admin = actor(&store.seed_user("admin", true));
        let news_id = store.seed_category("news", true).id;
        Fixture {
            service: BlogService::new(store.clone(), store.clone()),
            store,
            author,
            reader,
            admin,
            news_id,
        }
    }

    fn post_form(category_id: Option<i64>, pub_offset: Duration, is_published: bool) -> PostForm {
        PostForm {
            title: "Hi".to_string(),
            text: "Hello world".to_string(),
            pub_date: Utc::now() + pub_offset,
            is_published,
            location_id: None,
            category_id,
        }
    }

    fn comment(text: &str) -> CommentForm {
        CommentForm {
            text: text.to_string(),
        }
    }

    async fn feed_ids(f: &Fixture, viewer: Option<&Actor>) -> Vec<i64> {
        f.service
            .list_posts(viewer, PostScope::Feed, 1, 50)
            .await
            .expect("listing must succeed")
            .posts
            .iter()
            .map(|post| post.id)
            .collect()
    }

    #[tokio::test]
    async fn unpublishing_hides_post_from_public_but_not_from_author() {
        let f = fixture();
        let post = f
            .service
            .create_post(&f.author, post_form(Some(f.news_id), -Duration::days(1), true))
            .await
            .expect("post must be created");

        assert_eq!(feed_ids(&f, None).await, vec![post.id]);
        assert_eq!(feed_ids(&f, Some(&f.reader)).await, vec![post.id]);

        f.service
            .update_post(&f.author, post.id, post_form(Some(f.news_id), -Duration::days(1), false))
            .await
            .expect("author may update");

        assert!(feed_ids(&f, None).await.is_empty());
        assert!(feed_ids(&f, Some(&f.reader)).await.is_empty());
        assert_eq!(feed_ids(&f, Some(&f.author)).await, vec![post.id]);

        let err = f
            .service
            .get_post(None, post.id)
            .await
            .expect_err("hidden post must read as missing");
        assert!(matches!(err, DomainError::NotFound { .. }));
        f.service
            .get_post(Some(&f.author), post.id)
            .await
            .expect("author sees own hidden post");
    }

    #[tokio::test]
    async fn deferred_and_uncategorised_posts_stay_out_of_public_feed() {
        let f = fixture();
        let deferred = f
            .service
            .create_post(&f.author, post_form(Some(f.news_id), Duration::days(1), true))
            .await
            .expect("post must be created");
        f.service
            .create_post(&f.author, post_form(None, -Duration::days(1), true))
            .await
            .expect("post must be created");

        assert!(feed_ids(&f, None).await.is_empty());
        let own = feed_ids(&f, Some(&f.author)).await;
        assert_eq!(own.len(), 2);
        assert_eq!(own[0], deferred.id, "newest pub_date comes first");
    }

    #[tokio::test]
    async fn unknown_category_is_a_validation_error_and_nothing_is_written() {
        let f = fixture();
        let err = f
            .service
            .create_post(&f.author, post_form(Some(9_999), -Duration::days(1), true))
            .await
            .expect_err("unknown category must fail");

        assert!(matches!(err, DomainError::Validation { field: "category", .. }));
        assert_eq!(f.store.post_count(), 0);
    }

    #[tokio::test]
    async fn created_at_survives_updates() {
        let f = fixture();
        let post = f
            .service
            .create_post(&f.author, post_form(Some(f.news_id), -Duration::days(1), true))
            .await
            .expect("post must be created");

        let updated = f
            .service
            .update_post(&f.author, post.id, post_form(None, Duration::days(2), false))
            .await
            .expect("update must succeed");

        assert_eq!(updated.publication.created_at, post.publication.created_at);
        assert!(updated.category.is_none());
    }

    #[tokio::test]
    async fn only_author_or_admin_may_delete_a_post() {
        let f = fixture();
        let post = f
            .service
            .create_post(&f.author, post_form(Some(f.news_id), -Duration::days(1), true))
            .await
            .expect("post must be created");

        let err = f
            .service
            .delete_post(&f.reader, post.id)
            .await
            .expect_err("non-owner must be rejected");
        assert!(matches!(err, DomainError::Forbidden));
        assert_eq!(f.store.post_count(), 1);

        f.service
            .delete_post(&f.admin, post.id)
            .await
            .expect("admin may delete");
        assert_eq!(f.store.post_count(), 0);
    }

    #[tokio::test]
    async fn deleting_a_post_removes_its_comments() {
        let f = fixture();
        let post = f
            .service
            .create_post(&f.author, post_form(Some(f.news_id), -Duration::days(1), true))
            .await
            .expect("post must be created");
        f.service
            .add_comment(&f.reader, post.id, comment("first"))
            .await
            .expect("comment must be added");
        f.service
            .add_comment(&f.author, post.id, comment("second"))
            .await
            .expect("comment must be added");
        assert_eq!(f.store.comment_count(), 2);

        f.service
            .delete_post(&f.author, post.id)
            .await
            .expect("author may delete");
        assert_eq!(f.store.comment_count(), 0);
    }

    #[tokio::test]
    async fn comments_are_listed_oldest_first() {
        let f = fixture();
        let post = f
            .service
            .create_post(&f.author, post_form(Some(f.news_id), -Duration::days(1), true))
            .await
            .expect("post must be created");
        for text in ["one", "two", "three"] {
            f.service
                .add_comment(&f.reader, post.id, comment(text))
                .await
                .expect("comment must be added");
        }

        let comments = f
            .service
            .list_comments(None, post.id)
            .await
            .expect("comments must be listed");
        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert!(comments.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn cannot_comment_on_a_post_hidden_from_the_commenter() {
        let f = fixture();
        let post = f
            .service
            .create_post(&f.author, post_form(Some(f.news_id), Duration::days(1), true))
            .await
            .expect("post must be created");

        let err = f
            .service
            .add_comment(&f.reader, post.id, comment("early"))
            .await
            .expect_err("deferred post is hidden");
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(f.store.comment_count(), 0);
    }

    #[tokio::test]
    async fn only_comment_author_or_admin_may_change_a_comment() {
        let f = fixture();
        let post = f
            .service
            .create_post(&f.author, post_form(Some(f.news_id), -Duration::days(1), true))
            .await
            .expect("post must be created");
        let own = f
            .service
            .add_comment(&f.reader, post.id, comment("mine"))
            .await
            .expect("comment must be added");

        let err = f
            .service
            .update_comment(&f.author, post.id, own.id, comment("hijack"))
            .await
            .expect_err("post author is not the comment author");
        assert!(matches!(err, DomainError::Forbidden));

        let edited = f
            .service
            .update_comment(&f.reader, post.id, own.id, comment(" edited "))
            .await
            .expect("comment author may edit");
        assert_eq!(edited.text, "edited");
        assert_eq!(edited.created_at, own.created_at);

        let err = f
            .service
            .delete_comment(&f.admin, post.id + 1, own.id)
            .await
            .expect_err("comment belongs to another post");
        assert!(matches!(err, DomainError::NotFound { .. }));

        f.service
            .delete_comment(&f.admin, post.id, own.id)
            .await
            .expect("admin may delete");
        assert_eq!(f.store.comment_count(), 0);
    }

    #[tokio::test]
    async fn category_and_location_deletion_detach_posts() {
        let f = fixture();
        let place = f.store.seed_location("Moscow", true);
        let post = f
            .service
            .create_post(
                &f.author,
                PostForm {
                    location_id: Some(place.id),
                    ..post_form(Some(f.news_id), -Duration::days(1), true)
                },
            )
            .await
            .expect("post must be created");

        assert!(f.store.delete_location(place.id).await.expect("delete location"));
        assert!(f.store.delete_category(f.news_id).await.expect("delete category"));

        let survivor = f
            .service
            .get_post(Some(&f.author), post.id)
            .await
            .expect("post must survive");
        assert!(survivor.location.is_none());
        assert!(survivor.category.is_none());
    }

    #[tokio::test]
    async fn moderation_listings_are_staff_only() {
        let f = fixture();
        f.service
            .create_post(&f.author, post_form(None, Duration::days(3), false))
            .await
            .expect("post must be created");

        let err = f
            .service
            .list_all_posts(&f.author, 1, 10)
            .await
            .expect_err("regular users cannot moderate");
        assert!(matches!(err, DomainError::Forbidden));

        let all = f
            .service
            .list_all_posts(&f.admin, 1, 10)
            .await
            .expect("admin lists everything");
        assert_eq!(all.total, 1);
    }
}
