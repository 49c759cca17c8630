//! Cookie jar shared by requests.
//!
//! Cookies are kept per thread by default so that concurrent requests on
//! different threads never see each other's cookies. [`CookieManager::Scoped`]
//! keys the jars by an explicit [`CookieScope`] instead, and
//! [`CookieManager::Disabled`] turns persistence off.

mod parse;
mod store;

pub use self::parse::Cookie;
pub use self::store::{CookieScope, CookieStore, ScopedCookieStore, ThreadCookieStore};

use crate::error::{HttpError, HttpResult};
use courier_url::UrlBuilder;
use http::header::{HeaderName, HeaderValue, COOKIE, SET_COOKIE};
use http::HeaderMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Legacy `Set-Cookie2` header.
pub const SET_COOKIE2: &str = "set-cookie2";

/// Where cookies are persisted, if anywhere.
///
/// Clones share their stores; every constructor call creates new, empty ones.
#[derive(Debug, Clone)]
pub enum CookieManager {
    /// Cookies are neither attached nor stored.
    Disabled,
    /// One store per OS thread.
    Thread(Arc<ThreadCookieStore>),
    /// One store per caller-supplied scope.
    Scoped(Arc<ScopedCookieStore>),
}

impl Default for CookieManager {
    fn default() -> Self {
        Self::thread()
    }
}

impl CookieManager {
    /// Per-thread manager, empty on every thread.
    pub fn thread() -> Self {
        CookieManager::Thread(Arc::new(ThreadCookieStore::new()))
    }

    /// Manager over a fresh set of scoped stores.
    pub fn scoped() -> Self {
        CookieManager::Scoped(Arc::new(ScopedCookieStore::new()))
    }

    /// Whether cookies are persisted.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, CookieManager::Disabled)
    }

    fn with_store<R>(
        &self,
        scope: Option<CookieScope>,
        f: impl FnOnce(&mut CookieStore) -> R,
    ) -> HttpResult<Option<R>> {
        match (self, scope) {
            (CookieManager::Disabled, _) => Ok(None),
            (CookieManager::Thread(stores), _) => stores.with_current(f).map(Some),
            (CookieManager::Scoped(stores), Some(scope)) => Ok(Some(stores.with_scope(scope, f))),
            (CookieManager::Scoped(_), None) => {
                debug!("Scoped cookie manager used without a scope");
                Ok(None)
            }
        }
    }

    /// Stored cookies for `uri` as a single `Cookie` header.
    ///
    /// The map is empty when nothing matches or the manager is disabled.
    pub fn headers_for(&self, uri: &UrlBuilder, scope: Option<CookieScope>) -> HttpResult<HeaderMap> {
        let cookies = self.with_store(scope, |store| store.get(uri))?.unwrap_or_default();
        let mut headers = HeaderMap::new();
        if cookies.is_empty() {
            return Ok(headers);
        }

        let line = cookies
            .iter()
            .map(Cookie::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        let value = HeaderValue::from_str(&line)
            .map_err(|e| HttpError::cookie(format!("cannot encode cookies for {}", uri.host()), e))?;
        headers.insert(COOKIE, value);
        Ok(headers)
    }

    /// Persist the `Set-Cookie`/`Set-Cookie2` values of a response to `uri`.
    ///
    /// Returns the number of cookies stored or deleted.
    pub fn put(&self, uri: &UrlBuilder, headers: &HeaderMap, scope: Option<CookieScope>) -> HttpResult<usize> {
        if !self.is_enabled() {
            return Ok(0);
        }

        let mut cookies = Vec::new();
        for value in headers.get_all(SET_COOKIE) {
            let text = header_text(value, SET_COOKIE.as_str())?;
            cookies.extend(Cookie::parse(text, uri));
        }
        for value in headers.get_all(HeaderName::from_static(SET_COOKIE2)) {
            let text = header_text(value, SET_COOKIE2)?;
            cookies.extend(text.split(',').filter_map(|part| Cookie::parse(part, uri)));
        }

        let count = cookies.len();
        if count > 0 {
            self.with_store(scope, |store| {
                for cookie in cookies {
                    store.add(cookie);
                }
            })?;
        }
        Ok(count)
    }
}

fn header_text<'a>(value: &'a HeaderValue, name: &str) -> HttpResult<&'a str> {
    value
        .to_str()
        .map_err(|e| HttpError::cookie(format!("unreadable {} header", name), e))
}

/// Attaches stored cookies to requests and stores cookies from responses.
///
/// A dispatcher built with [`CookieDispatcher::global`] (or `default()`)
/// looks up the process-wide manager on every call, so swapping or disabling
/// it applies to existing dispatchers at once.
#[derive(Debug, Clone, Default)]
pub struct CookieDispatcher {
    manager: Option<CookieManager>,
}

impl CookieDispatcher {
    /// Dispatcher over an explicit manager.
    pub fn new(manager: CookieManager) -> Self {
        Self { manager: Some(manager) }
    }

    /// Dispatcher that follows the process-wide manager.
    pub fn global() -> Self {
        Self { manager: None }
    }

    /// Whether this dispatcher follows the process-wide manager.
    pub fn is_global(&self) -> bool {
        self.manager.is_none()
    }

    /// The manager calls made now would use.
    pub fn manager(&self) -> CookieManager {
        match &self.manager {
            Some(manager) => manager.clone(),
            None => global_manager(),
        }
    }

    /// Merge stored cookies for `uri` into `headers`.
    ///
    /// Headers the caller already set are left untouched.
    pub fn add(&self, headers: &mut HeaderMap, uri: &UrlBuilder, scope: Option<CookieScope>) -> HttpResult<()> {
        let manager = self.manager();
        if !manager.is_enabled() {
            return Ok(());
        }

        let stored = manager.headers_for(uri, scope)?;
        let mut added = 0;
        for (name, value) in stored.iter() {
            if !headers.contains_key(name) {
                headers.insert(name.clone(), value.clone());
                added += 1;
            }
        }
        debug!(host = uri.host(), added, "Attached cookies");
        Ok(())
    }

    /// Store cookies set by a response to `uri`.
    pub fn store(&self, headers: &HeaderMap, uri: &UrlBuilder, scope: Option<CookieScope>) -> HttpResult<usize> {
        let stored = self.manager().put(uri, headers, scope)?;
        if stored > 0 {
            debug!(host = uri.host(), stored, "Stored cookies");
        }
        Ok(stored)
    }
}

static GLOBAL_MANAGER: Lazy<RwLock<CookieManager>> = Lazy::new(|| RwLock::new(CookieManager::thread()));

/// Replace the process-wide cookie manager.
///
/// Global dispatchers use the new manager from their next call.
pub fn set_global_manager(manager: CookieManager) {
    info!(enabled = manager.is_enabled(), "Replacing global cookie manager");
    *GLOBAL_MANAGER.write() = manager;
}

/// The process-wide cookie manager.
pub fn global_manager() -> CookieManager {
    GLOBAL_MANAGER.read().clone()
}

/// Turn cookie persistence off process-wide.
pub fn disable_global() {
    set_global_manager(CookieManager::Disabled);
}
