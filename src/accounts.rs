//! Account identity helpers: email normalization, password hashing, capabilities.

use bcrypt::{hash, verify, DEFAULT_COST};

/// What a privileged handler requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create carousel slides, testimonials, team members, news, videos, pages, links, locations.
    ManageContent,
    /// Create blog posts.
    PublishBlog,
    /// Create and list events.
    UploadEvents,
    /// Read contact messages and newsletter subscriptions.
    ReadInbox,
}

/// Normalize an email address: trim surrounding whitespace and lower-case the domain part.
/// The local part is left untouched.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Hash a password off the async executor; bcrypt is CPU-bound.
pub async fn hash_password(password: String) -> anyhow::Result<String> {
    let hashed = tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST)).await??;
    Ok(hashed)
}

/// Verify a password against a stored bcrypt hash. Malformed hashes verify as false.
pub async fn verify_password(password: String, password_hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify(password, &password_hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "Jane.Doe@example.com");
    }

    #[test]
    fn test_normalize_email_without_at_is_trimmed() {
        assert_eq!(normalize_email(" not-an-email "), "not-an-email");
    }

    #[test]
    fn test_normalize_email_uses_last_at_sign() {
        assert_eq!(normalize_email("\"a@b\"@HOST.org"), "\"a@b\"@host.org");
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hashed = hash_password("correct horse".to_string()).await.unwrap();
        assert!(verify_password("correct horse".to_string(), hashed.clone()).await);
        assert!(!verify_password("wrong".to_string(), hashed).await);
    }

    #[tokio::test]
    async fn test_verify_against_garbage_hash_is_false() {
        assert!(!verify_password("x".to_string(), "not-a-hash".to_string()).await);
    }
}
