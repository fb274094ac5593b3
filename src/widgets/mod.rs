//! Page widgets with no data dependency on the engine.

pub mod carousel;
