// Copyright (c) 2016-2021 Fabian Schuiki

//! This crate contains the fundamental utilities used by the rest of the
//! pargram grammar compiler.

pub mod errors;
pub mod source;
pub mod util;

pub use crate::errors::{GrammarError, GrammarResult};
pub use crate::source::Location;
