use crate::operation::{OperationDescriptor, Payload, Verb};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

const API_PREFIX: &str = "api/v1";

/// Everything but unreserved characters and '@' is escaped
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'@');

/// Root of the Cascade REST API for one instance.
///
/// Joins path segments onto `<cascade_url>/api/v1`, percent-encoding each
/// segment so identifiers such as e-mail addresses or site paths stay a
/// single path component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase {
    root: String,
}

impl ApiBase {
    pub fn new(cascade_url: &str) -> Self {
        let trimmed = cascade_url.trim_end_matches('/');
        Self {
            root: format!("{}/{}", trimmed, API_PREFIX),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.root
    }

    pub fn url<I, S>(&self, segments: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.root.clone();
        for segment in segments {
            url.push('/');
            url.extend(utf8_percent_encode(segment.as_ref(), SEGMENT));
        }
        url
    }

    /// GET descriptor for the joined URL. Never fails since the URL always
    /// carries the API prefix.
    pub fn get<I, S>(&self, segments: I) -> OperationDescriptor
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        OperationDescriptor::from_parts(Verb::Get, self.url(segments), None)
    }

    pub fn post<I, S>(&self, segments: I, body: Option<Payload>) -> OperationDescriptor
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        OperationDescriptor::from_parts(Verb::Post, self.url(segments), body)
    }
}

impl fmt::Display for ApiBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)
    }
}
