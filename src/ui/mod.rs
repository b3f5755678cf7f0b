//! UI module - reusable rendering components
//!
//! Widgets here are stateless: they draw what they are given and return responses.

pub mod chart;
pub mod components;
