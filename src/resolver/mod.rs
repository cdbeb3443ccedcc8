//! Resolver Module
//!
//! Entity and image resolution on top of the cache context.

mod entity;
mod image;

pub use entity::{EntityResolver, ResolveOptions};
pub use image::{ImageResolver, ImageSources, SENTINEL_IMAGE};
