/// Chunk size used when streaming file content into the hasher.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Width of a rendered digest: 64 bits as lowercase hex.
pub const DIGEST_HEX_LEN: usize = 16;
