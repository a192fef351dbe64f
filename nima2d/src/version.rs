//! Actor file format revisions that change the record schemas.

/// Four-byte magic prefix of the binary encoding.
pub const BINARY_MAGIC: [u8; 4] = *b"NIMA";

/// The very first exporter wrote `1.0f32` as the version word.
pub const LEGACY_VERSION_WORD: u32 = 0x3F80_0000;

/// Animations carry a name/fps/duration/loop header and keyframes lead with their
/// interpolation type.
pub const ANIMATION_HEADER_VERSION: u32 = 11;

/// Nodes gained the collapsed-visibility flag.
pub const NODE_COLLAPSE_VERSION: u32 = 13;

/// IK targets stopped storing an explicit solve order.
pub const IK_TARGET_IMPLICIT_ORDER_VERSION: u32 = 14;

/// Atlases switched to a single image list with optional out-of-band references.
pub const ATLAS_IMAGE_LIST_VERSION: u32 = 15;

/// Newest revision whose schemas this crate knows about.
pub const LATEST_KNOWN_VERSION: u32 = ATLAS_IMAGE_LIST_VERSION;

/// Maps the raw version word from a file header to a format revision.
pub fn normalize_version(raw: u32) -> u32 {
    if raw == LEGACY_VERSION_WORD { 1 } else { raw }
}
