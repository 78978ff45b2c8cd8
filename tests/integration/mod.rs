//! Integration tests for Headscale Admin
//!
//! Service-level behaviour is exercised against a recording mock transport;
//! the reqwest client is exercised against a wiremock server.

mod client_tests;
