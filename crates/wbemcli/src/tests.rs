//! Runtime tests driving the CLI end to end against a mock server.

mod support;
