//! # Voxel Terrain Demo
//!
//! Runs the headless terrain session from the library's `run()`.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    if let Err(error) = voxel_terrain::run() {
        log::error!("{}", error);
        std::process::exit(1);
    }
}
