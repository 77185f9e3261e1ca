// handlers/mod.rs - two-tier handler layout
//
// Public (no auth) → Protected (bearer token + user sync)
pub mod public;    // /, /health
pub mod protected; // /api/*
