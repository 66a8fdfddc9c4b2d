//! Bundled addon definitions.
//!
//! Addons layer format or scheme specific rules on top of a regime. A
//! document opts in by listing the addon key.

pub mod eu_en16931;
