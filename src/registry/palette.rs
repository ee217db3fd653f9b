use serde::{Deserialize, Serialize};

/// 8-bit RGB display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Marker colors, indexed by identifier hash
pub const PALETTE: [Rgb; 10] = [
    Rgb(255, 100, 100), // red
    Rgb(100, 255, 100), // green
    Rgb(100, 100, 255), // blue
    Rgb(255, 255, 100), // yellow
    Rgb(255, 100, 255), // magenta
    Rgb(100, 255, 255), // cyan
    Rgb(255, 150, 100), // orange
    Rgb(150, 100, 255), // purple
    Rgb(100, 255, 150), // light green
    Rgb(255, 100, 150), // pink
];

/// Color for identifiers the registry does not know
pub const DEFAULT_COLOR: Rgb = Rgb(180, 120, 220);

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a over the identifier's UTF-8 bytes.
///
/// ```
/// use uwb_tracker::registry::fnv1a_32;
///
/// assert_eq!(fnv1a_32(""), 0x811c9dc5);
/// assert_eq!(fnv1a_32("a"), 0xe40c292c);
/// ```
pub fn fnv1a_32(id: &str) -> u32 {
    id.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Palette entry for an identifier; identical across runs and platforms
pub fn palette_color(id: &str) -> Rgb {
    PALETTE[fnv1a_32(id) as usize % PALETTE.len()]
}
