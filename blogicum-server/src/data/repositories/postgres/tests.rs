//! Repository tests against a live PostgreSQL. They run only when
//! `DATABASE_URL` is set and create uniquely named rows, so a shared
//! database can be reused between runs.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::category_repository::PostgresCategoryRepository;
use super::comment_repository::PostgresCommentRepository;
use super::location_repository::PostgresLocationRepository;
use super::post_repository::PostgresPostRepository;
use super::user_repository::PostgresUserRepository;
use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::location_repository::LocationRepository;
use crate::data::post_repository::{NewPost, Pagination, PostFilter, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::category::{Category, CategoryForm};
use crate::domain::error::DomainError;
use crate::domain::location::LocationForm;
use crate::domain::user::User;
use crate::infrastructure::database::{create_pool, run_migrations};

async fn pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = create_pool(&url, 2).await.expect("database must be reachable");
    run_migrations(&pool).await.expect("migrations must apply");
    Some(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

async fn user(pool: &PgPool) -> User {
    let name = unique("user");
    PostgresUserRepository::new(pool.clone())
        .create_user(NewUser {
            email: format!("{name}@example.com"),
            username: name,
            password_hash: "hash".to_string(),
            is_staff: false,
        })
        .await
        .expect("user must be created")
}

async fn category(pool: &PgPool, is_published: bool) -> Category {
    PostgresCategoryRepository::new(pool.clone())
        .create_category(CategoryForm {
            title: "Travel".to_string(),
            description: "Trips".to_string(),
            slug: unique("travel"),
            is_published,
        })
        .await
        .expect("category must be created")
}

fn post(author_id: i64, category_id: i64, is_published: bool, days_from_now: i64) -> NewPost {
    NewPost {
        title: unique("post"),
        text: "text".to_string(),
        pub_date: Utc::now() + Duration::days(days_from_now),
        is_published,
        location_id: None,
        category_id: Some(category_id),
        author_id,
    }
}

fn page() -> Pagination {
    Pagination {
        page: 1,
        page_size: 50,
    }
}

#[tokio::test]
async fn hidden_posts_are_listed_for_their_author_only() {
    let Some(pool) = pool().await else {
        return;
    };
    let posts = PostgresPostRepository::new(pool.clone());
    let author = user(&pool).await;
    let stranger = user(&pool).await;
    let open = category(&pool, true).await;
    let closed = category(&pool, false).await;

    let visible = posts
        .create_post(post(author.id, open.id, true, -1))
        .await
        .expect("post must be created");
    posts
        .create_post(post(author.id, open.id, false, -1))
        .await
        .expect("draft must be created");
    posts
        .create_post(post(author.id, open.id, true, 3))
        .await
        .expect("deferred post must be created");
    let now = Utc::now();

    let anonymous = PostFilter::visible_to(None, now).in_category(open.id);
    let listed = posts
        .list_posts(&anonymous, page())
        .await
        .expect("listing must succeed");
    assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![visible.id]);
    assert_eq!(posts.count_posts(&anonymous).await.expect("count"), 1);

    let other = PostFilter::visible_to(Some(stranger.id), now).in_category(open.id);
    assert_eq!(posts.count_posts(&other).await.expect("count"), 1);

    let own = PostFilter::visible_to(Some(author.id), now).in_category(open.id);
    assert_eq!(posts.count_posts(&own).await.expect("count"), 3);
    assert_eq!(
        posts.list_posts(&own, page()).await.expect("listing").len(),
        3
    );

    posts
        .create_post(post(author.id, closed.id, true, -1))
        .await
        .expect("post must be created");
    let unlisted = PostFilter::visible_to(None, now).in_category(closed.id);
    assert_eq!(posts.count_posts(&unlisted).await.expect("count"), 0);
    let everything = PostFilter::everything(now).in_category(closed.id);
    assert_eq!(posts.count_posts(&everything).await.expect("count"), 1);
}

#[tokio::test]
async fn deleting_a_post_removes_its_comments() {
    let Some(pool) = pool().await else {
        return;
    };
    let posts = PostgresPostRepository::new(pool.clone());
    let comments = PostgresCommentRepository::new(pool.clone());
    let author = user(&pool).await;
    let open = category(&pool, true).await;

    let created = posts
        .create_post(post(author.id, open.id, true, -1))
        .await
        .expect("post must be created");
    let comment = comments
        .create_comment(NewComment {
            text: "first".to_string(),
            author_id: author.id,
            post_id: created.id,
        })
        .await
        .expect("comment must be created");
    assert_eq!(
        posts
            .get_post(created.id)
            .await
            .expect("lookup")
            .expect("post must exist")
            .comment_count,
        1
    );

    assert!(posts.delete_post(created.id).await.expect("delete"));
    assert!(comments.get_comment(comment.id).await.expect("lookup").is_none());
    assert!(!posts.delete_post(created.id).await.expect("delete"));
}

#[tokio::test]
async fn deleting_a_category_or_location_keeps_its_posts() {
    let Some(pool) = pool().await else {
        return;
    };
    let posts = PostgresPostRepository::new(pool.clone());
    let categories = PostgresCategoryRepository::new(pool.clone());
    let locations = PostgresLocationRepository::new(pool.clone());
    let author = user(&pool).await;
    let open = category(&pool, true).await;
    let place = locations
        .create_location(LocationForm {
            name: unique("Lisbon"),
            is_published: true,
        })
        .await
        .expect("location must be created");

    let created = posts
        .create_post(NewPost {
            location_id: Some(place.id),
            ..post(author.id, open.id, true, -1)
        })
        .await
        .expect("post must be created");

    assert!(categories.delete_category(open.id).await.expect("delete"));
    assert!(locations.delete_location(place.id).await.expect("delete"));

    let kept = posts
        .get_post(created.id)
        .await
        .expect("lookup")
        .expect("post must survive");
    assert!(kept.category.is_none());
    assert!(kept.location.is_none());
}

#[tokio::test]
async fn deleting_a_user_returns_their_post_images() {
    let Some(pool) = pool().await else {
        return;
    };
    let users = PostgresUserRepository::new(pool.clone());
    let posts = PostgresPostRepository::new(pool.clone());
    let comments = PostgresCommentRepository::new(pool.clone());
    let author = user(&pool).await;
    let reader = user(&pool).await;
    let open = category(&pool, true).await;

    let pictured = posts
        .create_post(post(author.id, open.id, true, -1))
        .await
        .expect("post must be created");
    posts
        .set_image(pictured.id, Some("post_images/cover.png".to_string()))
        .await
        .expect("image must be attached");
    posts
        .create_post(post(author.id, open.id, true, -1))
        .await
        .expect("post must be created");
    let reader_comment = comments
        .create_comment(NewComment {
            text: "nice".to_string(),
            author_id: reader.id,
            post_id: pictured.id,
        })
        .await
        .expect("comment must be created");

    let images = users
        .delete_user(author.id)
        .await
        .expect("delete")
        .expect("user must exist");
    assert_eq!(images, vec!["post_images/cover.png".to_string()]);
    assert!(posts.get_post(pictured.id).await.expect("lookup").is_none());
    assert!(
        comments
            .get_comment(reader_comment.id)
            .await
            .expect("lookup")
            .is_none()
    );
    assert!(users.delete_user(author.id).await.expect("delete").is_none());
    assert!(users.get_user(reader.id).await.expect("lookup").is_some());
}

#[tokio::test]
async fn constraint_violations_become_domain_errors() {
    let Some(pool) = pool().await else {
        return;
    };
    let categories = PostgresCategoryRepository::new(pool.clone());
    let users = PostgresUserRepository::new(pool.clone());
    let posts = PostgresPostRepository::new(pool.clone());
    let existing = category(&pool, true).await;
    let author = user(&pool).await;

    let err = categories
        .create_category(CategoryForm {
            title: "Copy".to_string(),
            description: "Same slug".to_string(),
            slug: existing.slug.clone(),
            is_published: true,
        })
        .await
        .expect_err("duplicate slug must be rejected");
    assert!(matches!(err, DomainError::Validation { field: "slug", .. }));

    let err = users
        .create_user(NewUser {
            username: author.username.clone(),
            email: format!("{}@example.org", unique("other")),
            password_hash: "hash".to_string(),
            is_staff: false,
        })
        .await
        .expect_err("duplicate username must be rejected");
    assert!(matches!(err, DomainError::AlreadyExists("username")));

    let err = posts
        .create_post(post(author.id, i64::MAX, true, -1))
        .await
        .expect_err("missing category must be rejected");
    assert!(matches!(
        err,
        DomainError::Validation {
            field: "category",
            ..
        }
    ));
}

#[tokio::test]
async fn updates_keep_the_creation_time() {
    let Some(pool) = pool().await else {
        return;
    };
    let posts = PostgresPostRepository::new(pool.clone());
    let author = user(&pool).await;
    let open = category(&pool, true).await;

    let created = posts
        .create_post(post(author.id, open.id, false, -1))
        .await
        .expect("post must be created");
    let updated = posts
        .update_post(
            created.id,
            PostPatch {
                title: "Renamed".to_string(),
                text: "new text".to_string(),
                pub_date: created.pub_date,
                is_published: true,
                location_id: None,
                category_id: Some(open.id),
            },
        )
        .await
        .expect("update")
        .expect("post must exist");

    assert_eq!(updated.title, "Renamed");
    assert!(updated.publication.is_published);
    assert_eq!(updated.publication.created_at, created.publication.created_at);
    assert_eq!(updated.author.id, author.id);
}
