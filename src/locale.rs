//! Locale identifiers and collation resolution.
//!
//! The effective collation of a call is resolved exactly once, before any
//! row is touched, from (in order of precedence):
//!
//! 1. the locale passed explicitly with the call,
//! 2. the locale set on the [`OrderContext`],
//! 3. the process-wide override ([`set_global_locale`]),
//! 4. the reproducible `"C"` byte-order collation.
//!
//! Named locales need a collation service that supports them. A missing
//! service is a hard error; the resolver never falls back to byte order on
//! its own.
//!
//! The process-wide override is the only state shared across calls. Writers
//! race with last-writer-wins semantics; a call reads it once.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::collation::{CollationService, TextKeyStrategy};
use crate::context::OrderContext;
use crate::error::{OrderError, Result};

/// A parsed locale tag, either the reproducible `"C"` locale or a named
/// `language[_COUNTRY]` locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocaleId {
    /// Byte-order collation. Available everywhere.
    C,
    Named {
        /// ISO 639 language code, lowercase.
        language: String,
        /// ISO 3166 country code, uppercase.
        country: Option<String>,
    },
}

impl LocaleId {
    /// Tag of the reproducible byte-order locale.
    pub const REPRODUCIBLE_TAG: &'static str = "C";

    /// Parses `"C"`, `"POSIX"`, `"en"`, `"en_US"` or `"en-US"`.
    pub fn parse(tag: &str) -> Result<Self> {
        let trimmed = tag.trim();
        if trimmed == Self::REPRODUCIBLE_TAG || trimmed == "POSIX" {
            return Ok(LocaleId::C);
        }

        let invalid = || OrderError::InvalidLocale {
            tag: tag.to_string(),
        };

        let mut parts = trimmed.split(['_', '-']);
        let language = parts.next().unwrap_or_default().to_ascii_lowercase();
        if !(2..=3).contains(&language.len())
            || !language.bytes().all(|b| b.is_ascii_alphabetic())
        {
            return Err(invalid());
        }

        let country = match parts.next() {
            Some(c) if !c.is_empty() && c.bytes().all(|b| b.is_ascii_alphanumeric()) => {
                Some(c.to_ascii_uppercase())
            }
            Some(_) => return Err(invalid()),
            None => None,
        };

        debug!(
            locale = %trimmed,
            language = %language,
            country = country.as_deref().unwrap_or("(none)"),
            "parsed locale"
        );

        Ok(LocaleId::Named { language, country })
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            LocaleId::C => None,
            LocaleId::Named { language, .. } => Some(language),
        }
    }

    pub fn country(&self) -> Option<&str> {
        match self {
            LocaleId::C => None,
            LocaleId::Named { country, .. } => country.as_deref(),
        }
    }

    pub fn is_reproducible(&self) -> bool {
        matches!(self, LocaleId::C)
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocaleId::C => f.write_str(Self::REPRODUCIBLE_TAG),
            LocaleId::Named {
                language,
                country: Some(c),
            } => write!(f, "{language}_{c}"),
            LocaleId::Named { language, .. } => f.write_str(language),
        }
    }
}

impl FromStr for LocaleId {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self> {
        LocaleId::parse(s)
    }
}

/// The collation in force for one call.
#[derive(Debug, Clone)]
pub enum ResolvedLocale {
    ByteOrder,
    Collated {
        locale: LocaleId,
        service: Arc<dyn CollationService>,
    },
}

impl ResolvedLocale {
    pub fn locale(&self) -> LocaleId {
        match self {
            ResolvedLocale::ByteOrder => LocaleId::C,
            ResolvedLocale::Collated { locale, .. } => locale.clone(),
        }
    }

    pub fn is_byte_order(&self) -> bool {
        matches!(self, ResolvedLocale::ByteOrder)
    }
}

impl TextKeyStrategy for ResolvedLocale {
    #[inline]
    fn append_key(&self, text: &str, out: &mut Vec<u8>) {
        match self {
            ResolvedLocale::ByteOrder => out.extend_from_slice(text.as_bytes()),
            ResolvedLocale::Collated { locale, service } => service.sort_key(text, locale, out),
        }
    }
}

static GLOBAL_LOCALE: RwLock<Option<LocaleId>> = RwLock::new(None);

/// Sets (or clears, with `None`) the process-wide locale override and
/// returns the previous value.
pub fn set_global_locale(locale: Option<LocaleId>) -> Option<LocaleId> {
    let previous = std::mem::replace(&mut *GLOBAL_LOCALE.write(), locale.clone());
    debug!(
        locale = %locale.as_ref().map_or_else(|| "(unset)".to_string(), ToString::to_string),
        "process-wide locale override updated"
    );
    previous
}

/// Clears the process-wide locale override.
pub fn clear_global_locale() -> Option<LocaleId> {
    set_global_locale(None)
}

/// Current process-wide locale override, if any.
pub fn global_locale() -> Option<LocaleId> {
    GLOBAL_LOCALE.read().clone()
}

/// Resolves the collation for one call.
///
/// Fails with [`OrderError::UnavailableCollationService`] when the chosen
/// locale is named and the context's service does not support it.
pub fn resolve_locale(explicit: Option<&LocaleId>, ctx: &OrderContext) -> Result<ResolvedLocale> {
    let (locale, source) = match (explicit, ctx.locale()) {
        (Some(locale), _) => (locale.clone(), "explicit"),
        (None, Some(locale)) => (locale.clone(), "context"),
        (None, None) => match global_locale() {
            Some(locale) => (locale, "global"),
            None => (LocaleId::C, "default"),
        },
    };

    let resolved = match locale {
        LocaleId::C => ResolvedLocale::ByteOrder,
        named => {
            let service = ctx.collation();
            if !service.supports(&named) {
                return Err(OrderError::UnavailableCollationService {
                    locale: named.to_string(),
                });
            }
            ResolvedLocale::Collated {
                locale: named,
                service: Arc::clone(service),
            }
        }
    };

    debug!(
        locale = %resolved.locale(),
        source,
        byte_order = resolved.is_byte_order(),
        "resolved collation"
    );
    Ok(resolved)
}
