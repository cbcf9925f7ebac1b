//! Resolution of stored image references into absolute URLs.
//!
//! Stored references come in three shapes: empty, already absolute
//! (`http://` or `https://`), or a path relative to the media host. The base
//! URL is injected through [`MediaConfig`] rather than read from the process
//! environment at call time.

/// Environment variable read by [`MediaConfig::from_env`].
pub const BASE_URL_ENV: &str = "PROMPTS_MEDIA_BASE_URL";

/// Asset served when a user has no avatar.
pub const DEFAULT_AVATAR: &str = "default-avatar.png";

/// Asset served when a prompt has no image.
pub const DEFAULT_PROMPT_IMAGE: &str = "default-prompt.png";

/// Errors raised while building a [`MediaConfig`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MediaConfigError {
    /// The environment variable holding the base URL is not set.
    #[error("environment variable {0} is not set")]
    MissingBaseUrl(&'static str),
    /// The base URL is blank.
    #[error("media base URL must not be empty")]
    EmptyBaseUrl,
}

/// Configuration of the media host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    base_url: String,
}

impl MediaConfig {
    /// Creates a configuration for the given base URL.
    ///
    /// Trailing slashes are removed so that joined URLs never contain `//`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, MediaConfigError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(MediaConfigError::EmptyBaseUrl);
        }
        Ok(Self {
            base_url: trimmed.to_string(),
        })
    }

    /// Reads the base URL from [`BASE_URL_ENV`].
    pub fn from_env() -> Result<Self, MediaConfigError> {
        let base_url =
            std::env::var(BASE_URL_ENV).map_err(|_| MediaConfigError::MissingBaseUrl(BASE_URL_ENV))?;
        Self::new(base_url)
    }

    /// The normalized base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Resolves `image_path` against `base_url`.
///
/// - `None` or `""` resolves to `base_url/default_asset`.
/// - Absolute `http://` and `https://` URLs are returned unchanged.
/// - Anything else is appended to `base_url`, adding a `/` only when the
///   path does not start with one.
pub fn resolve_media_url(base_url: &str, image_path: Option<&str>, default_asset: &str) -> String {
    match image_path {
        None | Some("") => format!("{base_url}/{default_asset}"),
        Some(path) if path.starts_with("http://") || path.starts_with("https://") => {
            path.to_string()
        }
        Some(path) if path.starts_with('/') => format!("{base_url}{path}"),
        Some(path) => format!("{base_url}/{path}"),
    }
}

/// Resolves avatar and prompt image references for a configured media host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUrls {
    config: MediaConfig,
}

impl MediaUrls {
    /// Creates a resolver bound to `config`.
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    /// Absolute URL of a user's avatar.
    pub fn avatar_url(&self, image_path: Option<&str>) -> String {
        resolve_media_url(self.config.base_url(), image_path, DEFAULT_AVATAR)
    }

    /// Absolute URL of a prompt's image.
    pub fn prompt_image_url(&self, image_path: Option<&str>) -> String {
        resolve_media_url(self.config.base_url(), image_path, DEFAULT_PROMPT_IMAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const BASE: &str = "https://r1.example.com";

    fn urls() -> MediaUrls {
        MediaUrls::new(MediaConfig::new(BASE).unwrap())
    }

    #[test]
    fn missing_avatar_uses_default_asset() {
        let urls = urls();
        assert_eq!(urls.avatar_url(None), format!("{BASE}/default-avatar.png"));
        assert_eq!(urls.avatar_url(Some("")), format!("{BASE}/default-avatar.png"));
    }

    #[test]
    fn missing_prompt_image_uses_its_own_default() {
        assert_eq!(
            urls().prompt_image_url(None),
            format!("{BASE}/default-prompt.png")
        );
    }

    #[test]
    fn absolute_urls_are_returned_unchanged() {
        let urls = urls();
        assert_eq!(
            urls.avatar_url(Some("https://cdn.example.com/a.png")),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(
            urls.prompt_image_url(Some("http://cdn.example.com/b.png")),
            "http://cdn.example.com/b.png"
        );
    }

    #[test]
    fn leading_slash_is_not_doubled() {
        assert_eq!(
            urls().avatar_url(Some("/uploads/a.png")),
            format!("{BASE}/uploads/a.png")
        );
    }

    #[test]
    fn missing_slash_is_inserted() {
        assert_eq!(
            urls().avatar_url(Some("uploads/a.png")),
            format!("{BASE}/uploads/a.png")
        );
    }

    #[test]
    fn trailing_slash_on_base_is_trimmed() {
        let config = MediaConfig::new("https://r1.example.com/").unwrap();
        assert_eq!(config.base_url(), BASE);
        let urls = MediaUrls::new(config);
        assert_eq!(
            urls.avatar_url(Some("/uploads/a.png")),
            format!("{BASE}/uploads/a.png")
        );
    }

    #[test]
    fn blank_base_url_is_rejected() {
        assert_eq!(MediaConfig::new("  "), Err(MediaConfigError::EmptyBaseUrl));
        assert_eq!(MediaConfig::new("/"), Err(MediaConfigError::EmptyBaseUrl));
    }

    #[test]
    fn resolve_media_url_is_usable_without_config() {
        assert_eq!(
            resolve_media_url("http://localhost:3000", Some("a.png"), DEFAULT_AVATAR),
            "http://localhost:3000/a.png"
        );
    }

    #[test]
    #[serial]
    fn from_env_reads_and_normalizes_base_url() {
        // SAFETY: env-mutating tests are serialized.
        unsafe { std::env::set_var(BASE_URL_ENV, "https://media.r1.example.com/") };
        let config = MediaConfig::from_env();
        unsafe { std::env::remove_var(BASE_URL_ENV) };

        let config = config.unwrap();
        assert_eq!(config.base_url(), "https://media.r1.example.com");
        assert_eq!(
            MediaUrls::new(config).avatar_url(Some("uploads/a.png")),
            "https://media.r1.example.com/uploads/a.png"
        );
    }

    #[test]
    #[serial]
    fn from_env_fails_when_variable_is_unset() {
        // SAFETY: env-mutating tests are serialized.
        unsafe { std::env::remove_var(BASE_URL_ENV) };
        assert_eq!(
            MediaConfig::from_env(),
            Err(MediaConfigError::MissingBaseUrl(BASE_URL_ENV))
        );
    }

    #[test]
    #[serial]
    fn from_env_rejects_blank_value() {
        // SAFETY: env-mutating tests are serialized.
        unsafe { std::env::set_var(BASE_URL_ENV, "   ") };
        let config = MediaConfig::from_env();
        unsafe { std::env::remove_var(BASE_URL_ENV) };

        assert_eq!(config, Err(MediaConfigError::EmptyBaseUrl));
    }
}
