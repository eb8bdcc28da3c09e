pub mod fs;

use std::any::Any;

pub use fs::{absolute_normalized, artifact_file_name, normalize_path};

/// Text of a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown panic reason".to_string()
    }
}

#[cfg(test)]
mod tests;
