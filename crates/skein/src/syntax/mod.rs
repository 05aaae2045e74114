//! # Syntax Positions
//!
//! Byte ranges, line/column coordinates, named sources and the [`Position`]
//! spans carried by every token and capture.

pub mod line_col;
pub mod position;
pub mod source;
pub mod text;

pub use line_col::*;
pub use position::*;
pub use source::*;
pub use text::*;
