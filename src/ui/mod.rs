// CrashMinder - ui/mod.rs
//
// UI layer: theme and egui panels.

pub mod panels;
pub mod theme;
