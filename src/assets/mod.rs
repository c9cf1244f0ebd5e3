//! Image assets attached to journal entries.

mod store;
mod variant;

pub use store::{Asset, AssetRef, AssetStore};
pub use variant::{Fit, ImageOptions, responsive_urls};
