//! Cookie storage: a plain store, per-thread stores and caller-scoped stores.

use super::Cookie;
use crate::error::{HttpError, HttpResult};
use chrono::{DateTime, Utc};
use courier_url::UrlBuilder;
use parking_lot::{Mutex, ReentrantMutex};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::thread::{self, ThreadId};
use uuid::Uuid;

/// In-memory cookie store keyed by domain, path and name.
#[derive(Debug, Clone, Default)]
pub struct CookieStore {
    cookies: HashMap<(String, String, String), Cookie>,
}

impl CookieStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `cookie`, replacing one with the same key.
    ///
    /// An already expired cookie deletes the stored one instead.
    pub fn add(&mut self, cookie: Cookie) {
        self.add_at(cookie, Utc::now());
    }

    pub(crate) fn add_at(&mut self, cookie: Cookie, now: DateTime<Utc>) {
        if cookie.is_expired(now) {
            self.cookies.remove(&cookie.key());
        } else {
            self.cookies.insert(cookie.key(), cookie);
        }
    }

    /// Cookies to send with a request to `uri`, longer paths first.
    pub fn get(&self, uri: &UrlBuilder) -> Vec<Cookie> {
        self.get_at(uri, Utc::now())
    }

    pub(crate) fn get_at(&self, uri: &UrlBuilder, now: DateTime<Utc>) -> Vec<Cookie> {
        let mut matched: Vec<Cookie> = self
            .cookies
            .values()
            .filter(|cookie| cookie.matches(uri, now))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.path()
                .len()
                .cmp(&a.path().len())
                .then_with(|| a.name().cmp(b.name()))
        });
        matched
    }

    /// All stored cookies, expired ones included.
    pub fn cookies(&self) -> Vec<Cookie> {
        self.cookies.values().cloned().collect()
    }

    /// Drop every cookie.
    pub fn remove_all(&mut self) {
        self.cookies.clear();
    }

    /// Number of stored cookies.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// One cookie store per OS thread, owned by a single manager.
///
/// A thread's store is created empty the first time the thread touches it.
/// Stores of threads that have exited stay until [`remove_current`] is called
/// on them or the whole value is dropped.
///
/// [`remove_current`]: ThreadCookieStore::remove_current
#[derive(Debug, Default)]
pub struct ThreadCookieStore {
    stores: ReentrantMutex<RefCell<HashMap<ThreadId, CookieStore>>>,
}

impl ThreadCookieStore {
    /// Create a set of per-thread stores, empty on every thread.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the calling thread's store.
    ///
    /// Reaching the same store again from inside `f` is a
    /// [`HttpError::Cookie`] fault.
    pub fn with_current<R>(&self, f: impl FnOnce(&mut CookieStore) -> R) -> HttpResult<R> {
        let guard = self.stores.lock();
        let mut stores = guard
            .try_borrow_mut()
            .map_err(|e| HttpError::cookie("thread cookie store is already in use", e))?;
        Ok(f(stores.entry(thread::current().id()).or_default()))
    }

    /// Clear the calling thread's store, leaving other threads untouched.
    pub fn remove_current(&self) -> HttpResult<()> {
        let guard = self.stores.lock();
        let mut stores = guard
            .try_borrow_mut()
            .map_err(|e| HttpError::cookie("thread cookie store is already in use", e))?;
        stores.remove(&thread::current().id());
        Ok(())
    }

    /// Number of threads holding a store.
    pub fn thread_count(&self) -> usize {
        self.stores.lock().borrow().len()
    }
}

/// Identifier of an isolated cookie jar, independent of threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CookieScope(Uuid);

impl CookieScope {
    /// Create a fresh scope.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying identifier.
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for CookieScope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CookieScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cookie stores keyed by caller-supplied [`CookieScope`]s.
///
/// Isolation follows whatever unit of work owns the scope, so it also holds
/// when tasks migrate between threads.
#[derive(Debug, Default)]
pub struct ScopedCookieStore {
    stores: Mutex<HashMap<CookieScope, CookieStore>>,
}

impl ScopedCookieStore {
    /// Create an empty set of scoped stores.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the store of `scope`, creating it empty if needed.
    ///
    /// `f` must not call back into this value; the stores stay locked while
    /// it runs.
    pub fn with_scope<R>(&self, scope: CookieScope, f: impl FnOnce(&mut CookieStore) -> R) -> R {
        let mut stores = self.stores.lock();
        f(stores.entry(scope).or_default())
    }

    /// Drop the store of `scope`.
    pub fn remove(&self, scope: CookieScope) {
        self.stores.lock().remove(&scope);
    }

    /// Number of scopes holding a store.
    pub fn scope_count(&self) -> usize {
        self.stores.lock().len()
    }
}
