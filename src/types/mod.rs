//! # Types Module
//!
//! Core data types shared by the cache core, the upstream chat client and the
//! HTTP surface.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ClientProfile`] | Free-form physiological profile supplied per request |
//! | [`Specialist`] | One of the three advice domains (trainer, diet, energy) |
//! | [`SpecialistReply`] | Specialist endpoint payload, annotated with cache metadata |
//! | [`Message`] | Chat message with role and text content |
//!
//! ## Example
//!
//! ```rust
//! use specialist_advice::types::{ClientProfile, Specialist, SpecialistReply};
//!
//! let profile: ClientProfile = serde_json::from_value(serde_json::json!({
//!     "name": "A", "age": 30, "weight": 80, "height": 180,
//!     "goal": "lose", "activity": "high"
//! })).unwrap();
//! assert_eq!(profile.weight_kg(), Some(80.0));
//!
//! let reply = SpecialistReply::advice(Specialist::Trainer, "3x10 squats");
//! assert!(reply.has_advice());
//! ```

pub mod message;
pub mod profile;
pub mod reply;
pub mod specialist;

pub use message::{Message, MessageRole};
pub use profile::ClientProfile;
pub use reply::SpecialistReply;
pub use specialist::Specialist;
