// Raw sample model and validation
pub mod sample;

// Per-entity position smoothing
pub mod filter;

// Entity state, movement classification and animation
pub mod entity;

// Identifier -> entity registry
pub mod registry;

// Render snapshots and screen mapping
pub mod view;

// Configuration
pub mod config;

// Async ingestion and render loop
pub mod tracker;
