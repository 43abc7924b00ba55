pub mod byte_stream;
pub mod errors;
