//! bareimport - rewrites generated namespace imports into side-effect imports
//!
//! Some compilers cannot emit `import "./a.css";` and instead emit
//! `import * as ns from "./a.css";` plus a synthetic call that marks `ns` as
//! used. This crate finds those pairs, turns them into bare side-effect
//! imports and neutralizes the marker calls, keeping a position map back to
//! the original text.

pub mod config;
pub mod driver;
pub mod rewrite;
pub mod syntax;
