//! Ordered collection of resources.

use super::Resource;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

/// Several resources sent or read one after another.
///
/// Multipart bodies walk every member through [`iter`](Self::iter). Call
/// sites that expect a single resource use the cursor instead: the
/// [`Resource`] impl answers for the member under the cursor.
#[derive(Debug, Clone, Default)]
pub struct MultiResource {
    resources: Vec<Arc<dyn Resource>>,
    cursor: usize,
}

impl MultiResource {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resource.
    pub fn add(&mut self, resource: impl Resource + 'static) -> &mut Self {
        self.resources.push(Arc::new(resource));
        self
    }

    /// Append a shared resource.
    pub fn add_shared(&mut self, resource: Arc<dyn Resource>) -> &mut Self {
        self.resources.push(resource);
        self
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether there are no members.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Every member in order, independent of the cursor.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Resource>> {
        self.resources.iter()
    }

    /// Member under the cursor.
    pub fn current(&self) -> Option<&Arc<dyn Resource>> {
        self.resources.get(self.cursor)
    }

    /// Return the member under the cursor and advance past it.
    pub fn next_resource(&mut self) -> Option<Arc<dyn Resource>> {
        let resource = self.resources.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(resource)
    }

    /// Whether the cursor has members left.
    pub fn has_next(&self) -> bool {
        self.cursor < self.resources.len()
    }

    /// Move the cursor back to the first member.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

impl FromIterator<Arc<dyn Resource>> for MultiResource {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Resource>>>(iter: I) -> Self {
        Self {
            resources: iter.into_iter().collect(),
            cursor: 0,
        }
    }
}

impl Resource for MultiResource {
    fn name(&self) -> Option<&str> {
        self.current().and_then(|r| r.name())
    }

    fn url(&self) -> Option<&Path> {
        self.current().and_then(|r| r.url())
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        match self.current() {
            Some(resource) => resource.open(),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no current resource")),
        }
    }

    fn content_type(&self) -> Option<&str> {
        self.current().and_then(|r| r.content_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::BytesResource;
    use courier_url::Charset;

    fn two() -> MultiResource {
        let mut multi = MultiResource::new();
        multi
            .add(BytesResource::named("first", "a.txt"))
            .add(BytesResource::named("second", "b.txt"));
        multi
    }

    #[test]
    fn test_iter_sees_all_members() {
        let multi = two();
        let names: Vec<_> = multi.iter().filter_map(|r| r.name()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_cursor_answers_for_current() {
        let mut multi = two();
        assert_eq!(multi.name(), Some("a.txt"));
        assert_eq!(multi.read_str(Charset::Utf8).unwrap(), "first");

        multi.next_resource();
        assert_eq!(multi.name(), Some("b.txt"));
        assert_eq!(multi.read_str(Charset::Utf8).unwrap(), "second");

        multi.next_resource();
        assert!(!multi.has_next());
        assert_eq!(multi.open().err().unwrap().kind(), io::ErrorKind::NotFound);

        multi.reset();
        assert_eq!(multi.name(), Some("a.txt"));
    }

    #[test]
    fn test_empty_collection() {
        let multi = MultiResource::new();
        assert!(multi.is_empty());
        assert_eq!(multi.name(), None);
        assert!(multi.read_bytes().is_err());
    }
}
