//! Resource sweepers
//!
//! Each service module exposes a `register` function adding its sweepers to
//! a [`SweepRegistry`].

pub mod s3control;

use crate::sweep::{RegistryError, SweepRegistry};

/// Registry with every sweeper this crate ships.
pub fn default_registry() -> Result<SweepRegistry, RegistryError> {
    let mut registry = SweepRegistry::new();
    s3control::register(&mut registry)?;
    Ok(registry)
}
