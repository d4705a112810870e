//! Fixed class-id tables. Process-wide constants; never mutated.

use std::borrow::Cow;

/// `(id, name, packed 0xRRGGBB color)`
pub const KNOWN_CLASSES: [(i64, &str, u32); 8] = [
    (1, "default", 0x9e9e9e),
    (2, "ground", 0x8b4513),
    (3, "low_green", 0x90ee90),
    (4, "mid_green", 0x32cd32),
    (5, "high_green", 0x228b22),
    (6, "roofs", 0xff6347),
    (7, "false_point", 0x808080),
    (8, "service_A_points", 0x00bfff),
];

fn lookup(id: i64) -> Option<&'static (i64, &'static str, u32)> {
    KNOWN_CLASSES.iter().find(|(k, _, _)| *k == id)
}

/// Canonical name, or `class_<id>` for ids outside the table.
pub fn class_name(id: i64) -> Cow<'static, str> {
    match lookup(id) {
        Some((_, name, _)) => Cow::Borrowed(name),
        None => Cow::Owned(format!("class_{id}")),
    }
}

/// Display color for renderers. Unknown ids have none.
pub fn class_color(id: i64) -> Option<u32> {
    lookup(id).map(|(_, _, rgb)| *rgb)
}
