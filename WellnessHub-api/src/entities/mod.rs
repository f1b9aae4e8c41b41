// Public entities for the WellnessHub API
// This module contains data structures that are shared across the application boundary

// Common entities for error handling
pub mod common;

// Webhook payloads
pub mod webhook;

// Profile and metrics entities
pub mod wearable;
