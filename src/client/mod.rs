//! Browser-side logic, expressed as plain state machines so a UI shell
//! can drive it without owning any listing semantics.

pub mod controller;
