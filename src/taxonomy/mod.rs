//! Dual addressing: the taxonomy index and the path resolver

mod index;
mod resolver;

pub use index::TaxonomyIndex;
pub use resolver::{local_name, ParseContext, PathResolver, Resolution, ResolutionOrigin};
