use std::collections::HashMap;
use crate::api::types::RequestId;
use crate::error::{Error, Result};
use super::request::Request;

/// Requests handed to the host that have not been answered yet.
///
/// Each id resolves at most once: a second reply (or a reply for an id we
/// never issued) is rejected so the page never acts on it twice.
#[derive(Debug)]
pub struct RequestTable {
    next_id: u32,
    outstanding: HashMap<RequestId, String>,
}

impl RequestTable {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            outstanding: HashMap::new(),
        }
    }

    /// Allocate an id for `request` and mark it outstanding.
    pub fn issue(&mut self, request: &Request) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.outstanding.insert(id, request.url.clone());
        id
    }

    /// Mark `id` answered. Returns the URL it was issued for.
    pub fn resolve(&mut self, id: RequestId) -> Result<String> {
        self.outstanding.remove(&id).ok_or(Error::UnknownRequest(id))
    }

    pub fn is_outstanding(&self, id: RequestId) -> bool {
        self.outstanding.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outstanding.is_empty()
    }
}

impl Default for RequestTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_resolve_once() {
        let mut table = RequestTable::new();
        let a = table.issue(&Request::get("/a"));
        let b = table.issue(&Request::get("/b"));
        assert_ne!(a, b);
        assert_eq!(table.len(), 2);

        assert_eq!(table.resolve(a).unwrap(), "/a");
        assert!(matches!(table.resolve(a), Err(Error::UnknownRequest(id)) if id == a));
        assert!(table.is_outstanding(b));
    }

    #[test]
    fn unknown_id_is_rejected() {
        let mut table = RequestTable::new();
        assert!(table.resolve(RequestId(99)).is_err());
    }
}
