//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `quillpad_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("quillpad_core ping={}", quillpad_core::ping());
    println!("quillpad_core version={}", quillpad_core::core_version());
}
