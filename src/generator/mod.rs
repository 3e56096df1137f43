//! Site-wide files generated from the pages of a build pass.

pub mod sitemap;
