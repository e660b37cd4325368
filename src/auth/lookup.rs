// src/auth/lookup.rs
//! Token Lookup Policy
//!
//! Each handshake step extracts its token by running an ordered table of
//! lookup attempts until one yields a value. An attempt names the document
//! root to search and the field name to match, which keeps the portal's
//! fallback quirks (alternate field names searched from the top of the
//! response instead of the widget tree) in data rather than branching.

use serde_json::Value;

use crate::locator::{locate, CSRF_FIELD};

/// JSON pointer to the widget tree the portal nests its form state under.
pub const WIDGET_TREE_POINTER: &str = "/result/raw/children";

/// Where a lookup attempt roots its search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRoot {
    /// The `result.raw.children` widget tree.
    Nested,
    /// The whole response body.
    Raw,
}

/// One (root, field-name) extraction attempt.
#[derive(Debug, Clone, Copy)]
pub struct LookupAttempt {
    pub root: DocumentRoot,
    pub field: &'static str,
}

/// Step-1 policy: the token is always in the widget tree.
pub const FETCH_ATTEMPTS: &[LookupAttempt] = &[LookupAttempt {
    root: DocumentRoot::Nested,
    field: CSRF_FIELD,
}];

/// Step-2 policy: widget tree first, then the alternate field names some
/// portal builds emit, searched from the top of the response.
pub const LOGIN_ATTEMPTS: &[LookupAttempt] = &[
    LookupAttempt {
        root: DocumentRoot::Nested,
        field: CSRF_FIELD,
    },
    LookupAttempt {
        root: DocumentRoot::Raw,
        field: "csrfToken",
    },
    LookupAttempt {
        root: DocumentRoot::Raw,
        field: "token",
    },
    LookupAttempt {
        root: DocumentRoot::Raw,
        field: "_token",
    },
    LookupAttempt {
        root: DocumentRoot::Raw,
        field: "authenticity_token",
    },
];

/// Run `attempts` against `response` in order and return the first token
/// found, along with the field name that matched. A response without the
/// widget-tree pointer simply fails the nested attempts.
pub fn run_attempts<'a>(
    response: &'a Value,
    attempts: &[LookupAttempt],
) -> Option<(&'a str, &'static str)> {
    attempts.iter().find_map(|attempt| {
        let root = match attempt.root {
            DocumentRoot::Nested => response.pointer(WIDGET_TREE_POINTER)?,
            DocumentRoot::Raw => response,
        };
        locate(root, attempt.field).map(|value| (value, attempt.field))
    })
}
