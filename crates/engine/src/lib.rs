//! # Bullpen Engine
//!
//! Client-side behaviour layered over the typed API client:
//!
//! - **`cache`**: process-wide query cache with in-flight deduplication
//! - **`retry`**: backoff policy for reads
//! - **`hooks`**: per-resource reads and writes with cache invalidation
//! - **`lifecycle`**: create → analyze → poll protocol for assessments
//! - **`session`**: identity provider seam
//! - **`gate`**: role-based route tables and the player onboarding gate
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bullpen_api::{BullpenClient, ClientConfig};
//! use bullpen_engine::{AssessmentLifecycle, QueryClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = BullpenClient::new(&ClientConfig::load()?)?;
//! let client = QueryClient::with_transport(Arc::new(transport));
//! let lifecycle = AssessmentLifecycle::new(client.assessments());
//!
//! let mut watch = lifecycle.watch(42);
//! let assessment = watch.wait_for_terminal().await?;
//! println!("assessment {} is {}", assessment.id, assessment.status);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod gate;
pub mod hooks;
pub mod lifecycle;
pub mod retry;
pub mod session;

pub use cache::{QueryCache, QueryKey};
pub use gate::{Decision, Router};
pub use hooks::{AssessmentsHook, AthletesHook, CoachesHook, OnboardingHook, QueryClient, TeamsHook};
pub use lifecycle::{AssessmentLifecycle, AssessmentWatch, DEFAULT_POLL_INTERVAL, PollSnapshot, next_poll_delay};
pub use retry::RetryPolicy;
pub use session::{HttpIdentityProvider, IdentityProvider, Session, StaticIdentity};
