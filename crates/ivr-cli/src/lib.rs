//! CLI library components for the intake field-mapping resolver.

pub mod logging;
