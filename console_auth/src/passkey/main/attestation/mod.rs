mod core;
mod none;
mod packed;
mod utils;

pub(super) use core::verify_attestation;
pub(super) use utils::{extract_public_key_coords, uncompressed_point};
