//! `warden-core`: authorization domain building blocks.
//!
//! This crate contains **pure domain** primitives shared by the registry:
//! error taxonomy, actor identity, typed attribute values and time sources.

pub mod attribute;
pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use attribute::{AttributeValue, Attributes};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entity::Entity;
pub use error::{RbacError, RbacResult};
pub use id::ActorId;
pub use value_object::ValueObject;
