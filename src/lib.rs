//! Nebula: keyboard-driven fuzzy search over a static page index.
//!
//! This library provides the ranking engine, the grouped result view, the
//! search widget state machine and its recent-search persistence. The
//! binary crate adds a terminal host (clap) that feeds key events to the
//! widget and prints what it renders.

pub mod config;
pub mod controller;
pub mod error;
pub mod group;
pub mod keys;
pub mod pages;
pub mod rank;
pub mod recent;
pub mod render;
