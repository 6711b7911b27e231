use serde_json::Value;
use std::ops::Index;

/// What a transport session hands back for one request
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A successful response as seen by a response transform
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// Position of the originating operation in its batch
    pub index: usize,
    pub status: u16,
    pub body: Value,
}

impl RawResponse {
    pub fn from_transport(index: usize, response: TransportResponse) -> Self {
        Self {
            index,
            status: response.status,
            body: response.body,
        }
    }
}

/// Transformed results of one round, in queue order
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult<T> {
    values: Vec<T>,
}

impl<T> SubmissionResult<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.values.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.values
    }
}

impl<T> Index<usize> for SubmissionResult<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.values[index]
    }
}

impl<T> IntoIterator for SubmissionResult<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a SubmissionResult<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
