//! End-to-end tests against a running bookrental_service.
//! Run with `--features system_tests` once the service is up with an administrator configured.
