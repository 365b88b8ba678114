use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::ContentStore;
use crate::error::{AppError, Result};
use crate::models::{
    Comment, Follow, Group, Like, NewGroup, NewPost, Post, PostChanges, PostFilter, User,
};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

const POST_SELECT: &str = r#"
    SELECT p.id, p.text, p.pub_date, p.author_id, u.username AS author_username,
           p.group_id, g.slug AS group_slug, p.image
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.post_id, c.author_id, u.username AS author_username, c.text, c.created
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

/// PostgreSQL content store (source of truth)
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// SQLSTATE and constraint name of a database error, if it is one.
fn db_error_code(err: &sqlx::Error) -> Option<(String, Option<String>)> {
    err.as_database_error().and_then(|db| {
        db.code()
            .map(|code| (code.to_string(), db.constraint().map(str::to_string)))
    })
}

/// WHERE clause for a feed scope plus its bound argument.
/// With an argument the clause uses `$1` and LIMIT/OFFSET shift to `$2`/`$3`.
fn filter_clause(filter: PostFilter) -> (&'static str, Option<i64>) {
    match filter {
        PostFilter::All => ("TRUE", None),
        PostFilter::Group(group_id) => ("p.group_id = $1", Some(group_id)),
        PostFilter::Author(author_id) => ("p.author_id = $1", Some(author_id)),
        PostFilter::FollowedBy(user_id) => (
            "p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = $1)",
            Some(user_id),
        ),
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn create_user(&self, username: &str) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username)
            VALUES ($1)
            RETURNING id, username, created_at
            "#,
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match db_error_code(&err) {
            Some((code, _)) if code == UNIQUE_VIOLATION => AppError::invalid_field(
                "username",
                "A user with that username already exists.",
            ),
            _ => err.into(),
        })
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_group(&self, group: &NewGroup) -> Result<Group> {
        sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match db_error_code(&err) {
            Some((code, _)) if code == UNIQUE_VIOLATION => {
                AppError::invalid_field("slug", "Group with this slug already exists.")
            }
            _ => err.into(),
        })
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups WHERE id = $1",
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn delete_group(&self, group_id: i64) -> Result<bool> {
        // posts.group_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(group_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        let created = sqlx::query_as::<_, Post>(
            r#"
            WITH p AS (
                INSERT INTO posts (text, author_id, group_id, image)
                VALUES ($1, $2, $3, $4)
                RETURNING id, text, pub_date, author_id, group_id, image
            )
            SELECT p.id, p.text, p.pub_date, p.author_id, u.username AS author_username,
                   p.group_id, g.slug AS group_slug, p.image
            FROM p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            "#,
        )
        .bind(&post.text)
        .bind(post.author_id)
        .bind(post.group_id)
        .bind(&post.image)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match db_error_code(&err) {
            Some((code, _)) if code == CHECK_VIOLATION => {
                AppError::invalid_field("text", "This field is required.")
            }
            Some((code, constraint)) if code == FOREIGN_KEY_VIOLATION => {
                if constraint.as_deref().is_some_and(|c| c.contains("group")) {
                    AppError::invalid_field("group", "Select a valid choice.")
                } else {
                    AppError::NotFound(format!("user {}", post.author_id))
                }
            }
            _ => err.into(),
        })?;

        debug!(post_id = created.id, author_id = created.author_id, "Created post");
        Ok(created)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        let sql = format!("{POST_SELECT} WHERE p.id = $1");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn update_post(&self, post_id: i64, changes: &PostChanges) -> Result<Option<Post>> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET text = $1, group_id = $2, image = $3
            WHERE id = $4
            "#,
        )
        .bind(&changes.text)
        .bind(changes.group_id)
        .bind(&changes.image)
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(|err| match db_error_code(&err) {
            Some((code, _)) if code == CHECK_VIOLATION => {
                AppError::invalid_field("text", "This field is required.")
            }
            Some((code, _)) if code == FOREIGN_KEY_VIOLATION => {
                AppError::invalid_field("group", "Select a valid choice.")
            }
            _ => err.into(),
        })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_post(post_id).await
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        // comments and likes are ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64> {
        let (clause, arg) = filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM posts p WHERE {clause}");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(value) = arg {
            query = query.bind(value);
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn list_posts(&self, filter: PostFilter, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let (clause, arg) = filter_clause(filter);
        let (limit_idx, offset_idx) = if arg.is_some() { (2, 3) } else { (1, 2) };
        let sql = format!(
            "{POST_SELECT} WHERE {clause} ORDER BY p.pub_date DESC, p.id DESC LIMIT ${limit_idx} OFFSET ${offset_idx}"
        );

        let mut query = sqlx::query_as::<_, Post>(&sql);
        if let Some(value) = arg {
            query = query.bind(value);
        }

        let posts = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH c AS (
                INSERT INTO comments (post_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, author_id, text, created
            )
            SELECT c.id, c.post_id, c.author_id, u.username AS author_username, c.text, c.created
            FROM c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match db_error_code(&err) {
            Some((code, _)) if code == CHECK_VIOLATION => {
                AppError::invalid_field("text", "This field is required.")
            }
            Some((code, constraint)) if code == FOREIGN_KEY_VIOLATION => {
                if constraint.as_deref().is_some_and(|c| c.contains("post")) {
                    AppError::NotFound(format!("post {}", post_id))
                } else {
                    AppError::NotFound(format!("user {}", author_id))
                }
            }
            _ => err.into(),
        })?;

        Ok(comment)
    }

    async fn find_comment(&self, comment_id: i64) -> Result<Option<Comment>> {
        let sql = format!("{COMMENT_SELECT} WHERE c.id = $1");
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let sql = format!("{COMMENT_SELECT} WHERE c.post_id = $1 ORDER BY c.created ASC, c.id ASC");
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(comments)
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<Follow> {
        // A concurrent unfollow can remove the conflicting row between the
        // insert and the select; one retry covers that window.
        for _ in 0..2 {
            let inserted = sqlx::query_as::<_, Follow>(
                r#"
                INSERT INTO follows (user_id, author_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, author_id) DO NOTHING
                RETURNING id, user_id, author_id
                "#,
            )
            .bind(user_id)
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| match db_error_code(&err) {
                Some((code, _)) if code == FOREIGN_KEY_VIOLATION => {
                    AppError::NotFound(format!("user {} or {}", user_id, author_id))
                }
                _ => err.into(),
            })?;

            if let Some(follow) = inserted {
                debug!(user_id, author_id, "Created follow");
                return Ok(follow);
            }

            let existing = sqlx::query_as::<_, Follow>(
                "SELECT id, user_id, author_id FROM follows WHERE user_id = $1 AND author_id = $2",
            )
            .bind(user_id)
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(follow) = existing {
                return Ok(follow);
            }
        }

        Err(AppError::Internal(format!(
            "follow {} -> {} could not be created",
            user_id, author_id
        )))
    }

    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let affected = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_following(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_followers(&self, author_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create_like(&self, post_id: i64, user_id: i64) -> Result<Like> {
        for _ in 0..2 {
            let inserted = sqlx::query_as::<_, Like>(
                r#"
                INSERT INTO likes (post_id, user_id, flag)
                VALUES ($1, $2, TRUE)
                ON CONFLICT (post_id, user_id) DO NOTHING
                RETURNING id, post_id, user_id, flag
                "#,
            )
            .bind(post_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| match db_error_code(&err) {
                Some((code, _)) if code == FOREIGN_KEY_VIOLATION => {
                    AppError::NotFound(format!("post {}", post_id))
                }
                _ => err.into(),
            })?;

            if let Some(like) = inserted {
                return Ok(like);
            }

            let existing = sqlx::query_as::<_, Like>(
                "SELECT id, post_id, user_id, flag FROM likes WHERE post_id = $1 AND user_id = $2",
            )
            .bind(post_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(like) = existing {
                return Ok(like);
            }
        }

        Err(AppError::Internal(format!(
            "like on post {} by {} could not be created",
            post_id, user_id
        )))
    }

    async fn delete_like(&self, post_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_likes(&self, post_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn has_liked(&self, post_id: i64, user_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE post_id = $1 AND user_id = $2)",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
