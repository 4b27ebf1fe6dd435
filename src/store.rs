use crate::blog::{Post, PostUpdate, Slug};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid slug {0:?}")]
    InvalidSlug(Slug),
    #[error("post {0} not found")]
    NotFound(Slug),
    #[error("post {0} already exists")]
    AlreadyExists(Slug),
    #[error("io error for post {slug}: {source}")]
    Io {
        slug: Slug,
        #[source]
        source: std::io::Error,
    },
    #[error("stored post {slug} is corrupt: {source}")]
    Corrupt {
        slug: Slug,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(slug: &str, source: std::io::Error) -> StoreError {
        StoreError::Io {
            slug: slug.to_owned(),
            source,
        }
    }
}

/// Posts stored as one JSON file per slug under `<root>/post`.
#[derive(Debug, Clone)]
pub struct PostStore {
    post_dir: PathBuf,
}

impl PostStore {
    pub async fn open(root: impl AsRef<Path>) -> std::io::Result<PostStore> {
        let post_dir = root.as_ref().join("post");
        tokio::fs::create_dir_all(&post_dir).await?;

        Ok(PostStore { post_dir })
    }

    fn post_path(&self, slug: &str) -> Result<PathBuf, StoreError> {
        if !crate::blog::is_valid_slug(slug) {
            return Err(StoreError::InvalidSlug(slug.to_owned()));
        }
        Ok(self.post_dir.join(format!("{slug}.json")))
    }

    pub async fn create(&self, post: &Post) -> Result<(), StoreError> {
        let path = self.post_path(&post.slug)?;
        let bytes = encode(post)?;

        // create_new so two concurrent creators can't both claim a slug
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(it) => it,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(post.slug.clone()));
            }
            Err(err) => return Err(StoreError::io(&post.slug, err)),
        };

        let written = async {
            file.write_all(&bytes).await?;
            file.sync_all().await
        }
        .await;
        if let Err(err) = written {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(StoreError::io(&post.slug, err));
        }

        tracing::debug!(slug = %post.slug, "created post");
        Ok(())
    }

    pub async fn get(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let path = self.post_path(slug)?;

        let file = match tokio::fs::read(&path).await {
            Ok(it) => it,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::io(slug, err)),
        };

        serde_json::from_slice(&file)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                slug: slug.to_owned(),
                source,
            })
    }

    /// No locking: a `delete` landing between the read and the rename below
    /// is undone by the rename.
    pub async fn update(&self, slug: &str, update: PostUpdate) -> Result<Post, StoreError> {
        let Some(post) = self.get(slug).await? else {
            return Err(StoreError::NotFound(slug.to_owned()));
        };

        let post = Post {
            title: update.title,
            markdown: update.markdown,
            updated_at: chrono::Utc::now(),
            ..post
        };
        self.replace(&post).await?;

        tracing::debug!(%slug, "updated post");
        Ok(post)
    }

    pub async fn delete(&self, slug: &str) -> Result<(), StoreError> {
        let path = self.post_path(slug)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(%slug, "deleted post");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(slug.to_owned()))
            }
            Err(err) => Err(StoreError::io(slug, err)),
        }
    }

    /// Every stored post, most recently updated first.
    pub async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let mut post_files = tokio::fs::read_dir(&self.post_dir)
            .await
            .map_err(|err| StoreError::io("*", err))?;

        let mut posts = Vec::new();
        while let Some(entry) = post_files
            .next_entry()
            .await
            .map_err(|err| StoreError::io("*", err))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if !crate::blog::is_valid_slug(slug) {
                tracing::warn!(?path, "skipping file with invalid slug in post store");
                continue;
            }

            // a concurrent delete may remove the file between listing and reading it
            match self.get(slug).await {
                Ok(Some(post)) => posts.push(post),
                Ok(None) => (),
                Err(err @ StoreError::Corrupt { .. }) => {
                    tracing::warn!(?path, error = %err, "skipping corrupt post file");
                }
                Err(err) => return Err(err),
            }
        }

        posts.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(posts)
    }

    // write to a sibling temp file, then rename over the post
    async fn replace(&self, post: &Post) -> Result<(), StoreError> {
        let path = self.post_path(&post.slug)?;
        let temp_path = self.post_dir.join(format!(
            ".{}.{}.tmp",
            post.slug,
            crate::blog::get_random_hex_string::<{ crate::blog::TEMP_SUFFIX_BYTES }>()
        ));

        let bytes = encode(post)?;
        let result = async {
            tokio::fs::write(&temp_path, &bytes).await?;
            tokio::fs::rename(&temp_path, &path).await
        }
        .await;

        if let Err(err) = result {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::io(&post.slug, err));
        }
        Ok(())
    }
}

fn encode(post: &Post) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(post).map_err(|source| StoreError::Corrupt {
        slug: post.slug.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, PostStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PostStore::open(dir.path()).await.unwrap();
        (dir, store)
    }

    fn post(slug: &str) -> Post {
        Post::new(slug.to_owned(), format!("Title {slug}"), format!("# {slug}"))
    }

    #[tokio::test]
    async fn create_then_get() {
        let (_dir, store) = store().await;
        let created = post("hello");
        store.create(&created).await.unwrap();

        assert_eq!(store.get("hello").await.unwrap(), Some(created));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_refuses_existing_slug() {
        let (_dir, store) = store().await;
        store.create(&post("hello")).await.unwrap();

        let err = store.create(&post("hello")).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(slug) if slug == "hello"));
    }

    #[tokio::test]
    async fn update_replaces_title_and_markdown() {
        let (_dir, store) = store().await;
        store.create(&post("hello")).await.unwrap();

        let updated = store
            .update(
                "hello",
                PostUpdate {
                    title: "New".to_owned(),
                    markdown: "*new*".to_owned(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.slug, "hello");
        let stored = store.get("hello").await.unwrap().unwrap();
        assert_eq!(stored.title, "New");
        assert_eq!(stored.markdown, "*new*");
    }

    #[tokio::test]
    async fn update_bumps_timestamp() {
        let (_dir, store) = store().await;
        let mut stale = post("hello");
        stale.updated_at = chrono::Utc::now() - chrono::Duration::days(1);
        store.create(&stale).await.unwrap();

        let updated = store
            .update(
                "hello",
                PostUpdate {
                    title: "t".to_owned(),
                    markdown: "m".to_owned(),
                },
            )
            .await
            .unwrap();

        assert!(updated.updated_at > stale.updated_at);
        let stored = store.get("hello").await.unwrap().unwrap();
        assert_eq!(stored.updated_at, updated.updated_at);
    }

    #[tokio::test]
    async fn update_missing_post_is_not_found() {
        let (_dir, store) = store().await;
        let err = store
            .update(
                "ghost",
                PostUpdate {
                    title: "t".to_owned(),
                    markdown: "m".to_owned(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_post() {
        let (_dir, store) = store().await;
        store.create(&post("hello")).await.unwrap();

        store.delete("hello").await.unwrap();
        assert_eq!(store.get("hello").await.unwrap(), None);
        assert!(matches!(
            store.delete("hello").await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn invalid_slugs_never_touch_disk() {
        let (_dir, store) = store().await;
        assert!(matches!(
            store.get("../secret").await.unwrap_err(),
            StoreError::InvalidSlug(_)
        ));
        assert!(matches!(
            store.create(&post("a b")).await.unwrap_err(),
            StoreError::InvalidSlug(_)
        ));
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let (dir, store) = store().await;
        tokio::fs::write(dir.path().join("post").join("broken.json"), b"{not json")
            .await
            .unwrap();

        assert!(matches!(
            store.get("broken").await.unwrap_err(),
            StoreError::Corrupt { .. }
        ));
    }

    #[tokio::test]
    async fn list_orders_newest_first_and_skips_foreign_files() {
        let (dir, store) = store().await;
        let mut older = post("older");
        older.updated_at = chrono::Utc::now() - chrono::Duration::hours(1);
        store.create(&older).await.unwrap();
        store.create(&post("newer")).await.unwrap();
        tokio::fs::write(dir.path().join("post").join("notes.txt"), b"ignored")
            .await
            .unwrap();

        let slugs = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|post| post.slug)
            .collect::<Vec<_>>();
        assert_eq!(slugs, ["newer", "older"]);
    }

    #[tokio::test]
    async fn list_breaks_timestamp_ties_by_slug() {
        let (_dir, store) = store().await;
        let at = chrono::Utc::now();
        for slug in ["bravo", "alpha", "charlie"] {
            let mut same = post(slug);
            same.updated_at = at;
            store.create(&same).await.unwrap();
        }

        let slugs = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|post| post.slug)
            .collect::<Vec<_>>();
        assert_eq!(slugs, ["alpha", "bravo", "charlie"]);
    }

    #[tokio::test]
    async fn list_skips_corrupt_files() {
        let (dir, store) = store().await;
        store.create(&post("good")).await.unwrap();
        tokio::fs::write(dir.path().join("post").join("bad.json"), b"{oops")
            .await
            .unwrap();

        let posts = store.list().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "good");
    }
}
