//! Leading ID3v2 tag removal for MP3 concatenation.
//!
//! Every chunk returned by the provider is a complete MP3 stream with its own
//! ID3v2 header. Only the first chunk keeps its tag; the rest are stripped so
//! the joined buffer does not carry tag blocks in the middle of the stream.

use bytes::Bytes;

/// Magic bytes opening an ID3v2 tag
const ID3_SIGNATURE: &[u8; 3] = b"ID3";

/// Fixed ID3v2 header size (signature, version, flags, synchsafe size)
const ID3_HEADER_LEN: usize = 10;

/// Total length of a leading ID3v2 tag, or `None` when the buffer does not
/// start with one.
///
/// Bytes 6..10 hold the tag body size as a synchsafe integer: four bytes, big
/// endian, seven significant bits each.
pub fn leading_tag_len(buffer: &[u8]) -> Option<usize> {
    if buffer.len() < ID3_HEADER_LEN || !buffer.starts_with(ID3_SIGNATURE) {
        return None;
    }

    let size = buffer[6..10]
        .iter()
        .fold(0usize, |acc, b| (acc << 7) | (*b & 0x7F) as usize);

    Some(ID3_HEADER_LEN + size)
}

/// Strip leading ID3v2 tags from `buffer`.
///
/// Buffers without the signature, or whose declared tag would consume the
/// whole buffer, are returned unchanged. Back-to-back tags are all removed so
/// the result is a fixed point: stripping it again changes nothing.
pub fn strip_leading_tag(buffer: &[u8]) -> &[u8] {
    let mut rest = buffer;
    while let Some(tag_len) = leading_tag_len(rest) {
        if tag_len >= rest.len() {
            break;
        }
        rest = &rest[tag_len..];
    }
    rest
}

/// [`strip_leading_tag`] for shared buffers; slices without copying.
pub fn strip_leading_tag_bytes(buffer: Bytes) -> Bytes {
    let stripped = buffer.len() - strip_leading_tag(&buffer).len();
    buffer.slice(stripped..)
}
