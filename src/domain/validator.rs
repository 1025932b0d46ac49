//! URL predicates consumed by the shortening core.

/// Pure URL checks supplied by the embedding application.
///
/// Both predicates receive the URL after scheme normalization and must not
/// have side effects.
///
/// # Implementations
///
/// - [`crate::utils::url_normalizer::HostValidator`] - `url`-crate parsing plus
///   a self-reference block for the service's own domain
#[cfg_attr(test, mockall::automock)]
pub trait UrlValidator: Send + Sync {
    /// Returns `true` when `url` is syntactically acceptable for shortening.
    fn is_valid_url(&self, url: &str) -> bool;

    /// Returns `true` when `url` points back at the shortener itself.
    fn is_blocked_domain(&self, url: &str) -> bool;
}
