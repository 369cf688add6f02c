//! mb-core: stable foundation for massbal.
//!
//! Contains:
//! - substance (flow identity keys with qualifier handling)
//! - direction (row direction tags)
//! - flows (keyed quantity maps)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod direction;
pub mod error;
pub mod flows;
pub mod numeric;
pub mod substance;

// Re-exports: nice ergonomics for downstream crates
pub use direction::{Direction, UnknownDirection};
pub use error::{CoreError, CoreResult};
pub use flows::FlowMap;
pub use numeric::*;
pub use substance::{Substance, QUALIFIER_MARKER};
