//! SmartServe Assistant - scripted Q&A over a static product catalog
//!
//! Matches free-text questions against canned question/answer pairs using a
//! keyword bonus plus a question-similarity heuristic, and carries a toy local
//! sign-in flow backed by a key-value store.
//!
//! # Example
//!
//! ```
//! use smartserve::{KnowledgeStore, Matcher};
//!
//! let store = KnowledgeStore::builtin().unwrap();
//! let matcher = Matcher::new(&store);
//! assert!(matcher.find_answer("What is SmartServe?").starts_with("SmartServe is"));
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod matcher;
pub mod storage;

pub use auth::{AuthOutcome, AuthStore, UserRecord};
pub use error::{AssistantError, Result};
pub use knowledge::{KnowledgeEntry, KnowledgeStore};
pub use matcher::{MatchResult, Matcher, ScoringWeights};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
