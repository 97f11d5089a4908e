//! Patch application mechanics

pub mod json_patch;
pub mod strategic;
