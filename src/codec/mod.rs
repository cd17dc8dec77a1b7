pub mod boxfile;
pub mod sbox;

pub use boxfile::{parse_box_file, read_box_file};
pub use sbox::{decode_document, encode_document, read_sbox_file, write_sbox_file};
