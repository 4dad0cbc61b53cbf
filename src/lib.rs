// Library surface of the ghost-release tool. The binary in `main.rs` is a
// thin clap wrapper over these modules; exposing them as a library is what
// lets the integration tests in `tests/` drive the real code paths.

pub mod builders;
pub mod core;
pub mod utils;
