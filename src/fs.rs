use std::{io::ErrorKind, path::Path};

use async_recursion::async_recursion;
use tokio::fs::{copy, create_dir, create_dir_all, read_dir, remove_dir_all, try_exists, write};
use tracing::debug;

use crate::error::{ContextExt, KijiErr};

pub async fn exists(path: &Path) -> Result<bool, KijiErr> {
    try_exists(path)
        .await
        .with_context(|| format!("check path: {}", path.display()))
}

pub async fn ensure_dir(path: &Path) -> Result<(), KijiErr> {
    create_dir_all(path)
        .await
        .with_context(|| format!("create directory: {}", path.display()))
}

/// Creates `path`, failing with [`KijiErr::Conflict`] if it is already there.
pub async fn create_new_dir(path: &Path) -> Result<(), KijiErr> {
    match create_dir(path).await {
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(KijiErr::Conflict(path.to_owned())),
        result => result.with_context(|| format!("create directory: {}", path.display())),
    }
}

pub async fn remove_dir_if_exists(path: &Path) -> Result<(), KijiErr> {
    match remove_dir_all(path).await {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        result => result.with_context(|| format!("remove directory: {}", path.display())),
    }
}

pub async fn write_file(path: &Path, content: &[u8]) -> Result<(), KijiErr> {
    if let Some(prefix) = path.parent() {
        ensure_dir(prefix).await?;
    }
    debug!("write to file: {}", path.display());
    write(path, content)
        .await
        .with_context(|| format!("write to file: {}", path.display()))
}

/// Copies the tree at `src` to a fresh `dst`, creating missing parents of `dst`.
/// Fails with [`KijiErr::Conflict`] if `dst` itself exists.
#[async_recursion]
pub async fn copy_dir_new(src: &Path, dst: &Path) -> Result<(), KijiErr> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent).await?;
    }
    create_new_dir(dst).await?;
    let mut entries = read_dir(src)
        .await
        .with_context(|| format!("read directory: {}", src.display()))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("read directory: {}", src.display()))?
    {
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if from.is_dir() {
            copy_dir_new(&from, &to).await?;
        } else {
            copy_file(&from, &to).await?;
        }
    }
    Ok(())
}

/// Copies the contents of `src` into `dst`, creating directories as needed and overwriting
/// files that are already there.
#[async_recursion]
pub async fn copy_dir_into(src: &Path, dst: &Path) -> Result<(), KijiErr> {
    ensure_dir(dst).await?;
    let mut entries = read_dir(src)
        .await
        .with_context(|| format!("read directory: {}", src.display()))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("read directory: {}", src.display()))?
    {
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if from.is_dir() {
            copy_dir_into(&from, &to).await?;
        } else {
            copy_file(&from, &to).await?;
        }
    }
    Ok(())
}

async fn copy_file(from: &Path, to: &Path) -> Result<(), KijiErr> {
    debug!("copy file: {} to {}", from.display(), to.display());
    copy(from, to)
        .await
        .with_context(|| format!("copy file: {} to {}", from.display(), to.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn copy_dir_new_copies_nested_tree() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("a.png"), b"a").unwrap();
        std::fs::write(src.join("nested/b.png"), b"b").unwrap();

        let dst = dir.path().join("dst");
        copy_dir_new(&src, &dst).await.unwrap();
        assert_eq!(std::fs::read(dst.join("a.png")).unwrap(), b"a");
        assert_eq!(std::fs::read(dst.join("nested/b.png")).unwrap(), b"b");
    }

    #[tokio::test]
    async fn copy_dir_new_creates_missing_parents() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("images");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("pic.png"), b"png").unwrap();

        let dst = dir.path().join("public/articles/20240101000000/images");
        copy_dir_new(&src, &dst).await.unwrap();
        assert_eq!(std::fs::read(dst.join("pic.png")).unwrap(), b"png");
    }

    #[tokio::test]
    async fn copy_dir_new_refuses_existing_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&dst).unwrap();

        let err = copy_dir_new(&src, &dst).await.unwrap_err();
        assert!(matches!(err, KijiErr::Conflict(path) if path == dst));
    }

    #[tokio::test]
    async fn copy_dir_into_overwrites() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&dst).unwrap();
        std::fs::write(src.join("CNAME"), b"new").unwrap();
        std::fs::write(dst.join("CNAME"), b"old").unwrap();
        std::fs::write(dst.join("keep.txt"), b"keep").unwrap();

        copy_dir_into(&src, &dst).await.unwrap();
        assert_eq!(std::fs::read(dst.join("CNAME")).unwrap(), b"new");
        assert_eq!(std::fs::read(dst.join("keep.txt")).unwrap(), b"keep");
    }

    #[tokio::test]
    async fn write_file_creates_parents_and_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/index.html");
        write_file(&path, b"<p>hi</p>").await.unwrap();
        assert!(exists(&path).await.unwrap());

        remove_dir_if_exists(&dir.path().join("a")).await.unwrap();
        remove_dir_if_exists(&dir.path().join("a")).await.unwrap();
        assert!(!exists(&path).await.unwrap());
    }
}
