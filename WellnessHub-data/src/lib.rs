// WellnessHub Data
// This crate handles persistence of wearable profiles

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
