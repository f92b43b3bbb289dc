//! The context capability rule leaves are evaluated against.

use crate::error::ContextError;

/// Result of a context query
pub type ContextResult<T> = std::result::Result<T, ContextError>;

/// Questions a rule tree may ask about the page being served.
///
/// Implemented by the host integration so evaluation never reaches into the
/// host directly. Errors propagate unchanged out of evaluation.
pub trait ContextQuery {
    /// Whether the current page is the site's home page.
    fn is_homepage(&self) -> ContextResult<bool>;

    /// Post type of the content being edited or displayed, if any.
    fn current_post_type(&self) -> ContextResult<Option<String>>;

    /// Whether the current page is an archive; of `post_type` when given.
    fn is_archive(&self, post_type: Option<&str>) -> ContextResult<bool>;
}

/// A fixed context, handy for tests and offline tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticContext {
    pub homepage: bool,
    pub post_type: Option<String>,
    /// `Some(None)` is an archive of no particular type.
    pub archive: Option<Option<String>>,
}

impl StaticContext {
    /// Editing a single item of `post_type`.
    pub fn editing(post_type: impl Into<String>) -> Self {
        Self {
            post_type: Some(post_type.into()),
            ..Self::default()
        }
    }

    /// The home page.
    pub fn homepage() -> Self {
        Self {
            homepage: true,
            ..Self::default()
        }
    }

    /// An archive page, of `post_type` when given.
    pub fn archive(post_type: Option<&str>) -> Self {
        Self {
            archive: Some(post_type.map(str::to_string)),
            ..Self::default()
        }
    }
}

impl ContextQuery for StaticContext {
    fn is_homepage(&self) -> ContextResult<bool> {
        Ok(self.homepage)
    }

    fn current_post_type(&self) -> ContextResult<Option<String>> {
        Ok(self.post_type.clone())
    }

    fn is_archive(&self, post_type: Option<&str>) -> ContextResult<bool> {
        Ok(match (&self.archive, post_type) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(kind), Some(wanted)) => kind.as_deref() == Some(wanted),
        })
    }
}

impl<T: ContextQuery + ?Sized> ContextQuery for &T {
    fn is_homepage(&self) -> ContextResult<bool> {
        (**self).is_homepage()
    }

    fn current_post_type(&self) -> ContextResult<Option<String>> {
        (**self).current_post_type()
    }

    fn is_archive(&self, post_type: Option<&str>) -> ContextResult<bool> {
        (**self).is_archive(post_type)
    }
}
