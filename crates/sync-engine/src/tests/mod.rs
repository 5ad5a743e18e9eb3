//! Engine integration tests against in-memory collaborators

mod support;
