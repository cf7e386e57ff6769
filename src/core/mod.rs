//! Core stack logic: types, configuration, definition, validation, synthesis.

pub mod assembly;
pub mod config;
pub mod hasher;
pub mod stack;
pub mod synth;
pub mod types;
pub mod validate;
