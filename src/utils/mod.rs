// Shared byte, text and file helpers
pub mod encoding;
pub mod io;
