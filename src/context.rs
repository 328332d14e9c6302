//! Per-call configuration.

use std::fmt;
use std::sync::Arc;

use crate::collation::{CollationService, NoCollation};
use crate::error::Result;
use crate::locale::LocaleId;

/// Environment variable read by [`OrderContext::from_env`].
pub const LOCALE_ENV_VAR: &str = "LOCSORT_LOCALE";

/// Configuration threaded through every order and group call.
///
/// Holds an optional locale override and the collation service used for
/// named locales. The default context has no override and no collation
/// service, so only the `"C"` locale resolves.
#[derive(Clone)]
pub struct OrderContext {
    locale: Option<LocaleId>,
    collation: Arc<dyn CollationService>,
}

impl OrderContext {
    pub fn new() -> Self {
        Self {
            locale: None,
            collation: Arc::new(NoCollation),
        }
    }

    /// Builds a context whose locale override comes from `LOCSORT_LOCALE`.
    ///
    /// An unset or empty variable leaves the override unset. A malformed
    /// value is an error rather than being ignored.
    pub fn from_env() -> Result<Self> {
        let mut ctx = Self::new();
        if let Ok(tag) = std::env::var(LOCALE_ENV_VAR)
            && !tag.trim().is_empty()
        {
            ctx.locale = Some(LocaleId::parse(&tag)?);
        }
        Ok(ctx)
    }

    pub fn with_locale(mut self, locale: LocaleId) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn without_locale(mut self) -> Self {
        self.locale = None;
        self
    }

    pub fn with_collation(mut self, collation: Arc<dyn CollationService>) -> Self {
        self.collation = collation;
        self
    }

    pub fn locale(&self) -> Option<&LocaleId> {
        self.locale.as_ref()
    }

    pub fn collation(&self) -> &Arc<dyn CollationService> {
        &self.collation
    }
}

impl Default for OrderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OrderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderContext")
            .field("locale", &self.locale)
            .field("collation", &self.collation.name())
            .finish()
    }
}
