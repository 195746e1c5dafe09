//! Key name mappings
//!
//! Names for SDL keycodes, used when bindings are written to and read from
//! configuration files.

pub const KEY_BACKSPACE: i32 = 8;
pub const KEY_RETURN: i32 = 13;
pub const KEY_ESCAPE: i32 = 27;
pub const KEY_SPACE: i32 = 32;
pub const KEY_RIGHT: i32 = 0x4000004F;
pub const KEY_LEFT: i32 = 0x40000050;
pub const KEY_DOWN: i32 = 0x40000051;
pub const KEY_UP: i32 = 0x40000052;

/// SDL keycode to name table. Letters use their lowercase keycodes.
static KEY_NAMES: &[(i32, &str)] = &[
    (KEY_BACKSPACE, "Backspace"),
    (9, "Tab"),
    (KEY_RETURN, "Return"),
    (KEY_ESCAPE, "Escape"),
    (KEY_SPACE, "Space"),
    (39, "'"),
    (44, ","),
    (45, "-"),
    (46, "."),
    (47, "/"),
    (48, "0"),
    (49, "1"),
    (50, "2"),
    (51, "3"),
    (52, "4"),
    (53, "5"),
    (54, "6"),
    (55, "7"),
    (56, "8"),
    (57, "9"),
    (59, ";"),
    (61, "="),
    (91, "["),
    (92, "\\"),
    (93, "]"),
    (96, "`"),
    (97, "A"),
    (98, "B"),
    (99, "C"),
    (100, "D"),
    (101, "E"),
    (102, "F"),
    (103, "G"),
    (104, "H"),
    (105, "I"),
    (106, "J"),
    (107, "K"),
    (108, "L"),
    (109, "M"),
    (110, "N"),
    (111, "O"),
    (112, "P"),
    (113, "Q"),
    (114, "R"),
    (115, "S"),
    (116, "T"),
    (117, "U"),
    (118, "V"),
    (119, "W"),
    (120, "X"),
    (121, "Y"),
    (122, "Z"),
    (127, "Delete"),
    (0x4000003A, "F1"),
    (0x4000003B, "F2"),
    (0x4000003C, "F3"),
    (0x4000003D, "F4"),
    (0x4000003E, "F5"),
    (0x4000003F, "F6"),
    (0x40000040, "F7"),
    (0x40000041, "F8"),
    (0x40000042, "F9"),
    (0x40000043, "F10"),
    (0x40000044, "F11"),
    (0x40000045, "F12"),
    (0x40000049, "Insert"),
    (0x4000004A, "Home"),
    (0x4000004B, "PageUp"),
    (0x4000004D, "End"),
    (0x4000004E, "PageDown"),
    (KEY_RIGHT, "Right"),
    (KEY_LEFT, "Left"),
    (KEY_DOWN, "Down"),
    (KEY_UP, "Up"),
    (0x40000058, "Keypad Enter"),
    (0x400000E0, "Left Ctrl"),
    (0x400000E1, "Left Shift"),
    (0x400000E2, "Left Alt"),
    (0x400000E4, "Right Ctrl"),
    (0x400000E5, "Right Shift"),
    (0x400000E6, "Right Alt"),
];

/// Name for a keycode, `None` for keys without a name
pub fn key_name(keycode: i32) -> Option<&'static str> {
    KEY_NAMES
        .iter()
        .find(|(code, _)| *code == keycode)
        .map(|(_, name)| *name)
}

/// Keycode for a name (case-insensitive)
pub fn key_from_name(name: &str) -> Option<i32> {
    KEY_NAMES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(code, _)| *code)
}
