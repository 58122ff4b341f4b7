//! Frame checksum trailer.
//!
//! Adler-32 over the header bytes followed by the full-capacity payload. Kept
//! separate from frame decoding so it can be checked in isolation.

use adler2::Adler32;

/// Size of the checksum trailer in bytes.
pub const CHECKSUM_SIZE: usize = 4;

/// Computes the trailer value for a frame.
pub fn frame_checksum(header: &[u8], payload: &[u8]) -> u32 {
    let mut adler = Adler32::new();
    adler.write_slice(header);
    adler.write_slice(payload);
    adler.checksum()
}

/// Returns `true` if `stored` matches the checksum of `header || payload`.
pub fn verify(header: &[u8], payload: &[u8], stored: u32) -> bool {
    frame_checksum(header, payload) == stored
}
