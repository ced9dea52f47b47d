//! Single-threaded driver for the designer's time-based work.

pub mod pump;
