//! Procedure handlers, grouped by namespace.

pub mod test;
