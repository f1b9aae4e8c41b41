// Storage models
pub mod wearable;

pub use wearable::{ProfileUpdateRecord, UnparsedPayload, WearableProfileRecord};
