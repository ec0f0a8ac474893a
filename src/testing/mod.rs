//! Testing utilities for the intake service
//!
//! - Alba-style HTTP endpoint testing without running a server
//! - Persona webhook bodies and signatures
//! - An in-memory test harness with recording collaborators
//!
//! # Example
//!
//! ```rust,ignore
//! use idv_intake::testing::{self, InquiryEvent, TestHarness};
//!
//! #[tokio::test]
//! async fn test_approved_inquiry() {
//!     let harness = TestHarness::new();
//!     let body = InquiryEvent::new().status("approved").reference_id("42").to_bytes();
//!
//!     testing::post(harness.router(), "/webhooks/persona")
//!         .persona_signed(testing::TEST_SECRET, body)
//!         .execute()
//!         .await
//!         .assert_ok();
//! }
//! ```

mod harness;
pub mod persona;
mod scenario;

pub use harness::{TEST_SECRET, TestHarness};
pub use persona::InquiryEvent;
pub use scenario::{Scenario, ScenarioAssert, get, post};
