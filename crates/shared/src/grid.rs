//! Keypad grid references.
//!
//! The map is divided into 300m squares: columns lettered A, B, .. from the
//! west edge (AA, AB, .. past Z) and rows numbered 1, 2, .. from the north
//! edge. Each square has a 3x3 keypad sub-grid in numpad layout, and each
//! keypad is split once more the same way, giving references like "B5-7-3".

// Main grid square edge in meters
pub const GRID_SIZE_M: f64 = 300.0;

/// Number of subdivisions per axis at each keypad level.
pub const KEYPAD_DIVISIONS: usize = 3;

/// Keypad edge in meters (100m).
pub const KEYPAD_SIZE_M: f64 = GRID_SIZE_M / KEYPAD_DIVISIONS as f64;

/// Sub-keypad edge in meters (~33.3m).
pub const SUB_KEYPAD_SIZE_M: f64 = KEYPAD_SIZE_M / KEYPAD_DIVISIONS as f64;

/// Shown for positions west of or north of the map origin.
pub const OFF_MAP_REFERENCE: &str = "XXX-X-X";

/// Turns a map coordinate into the label shown next to a dragged pin.
pub trait GridReference {
    fn to_grid_reference(&self, lat: f64, lng: f64) -> String;
}

impl<F> GridReference for F
where
    F: Fn(f64, f64) -> String,
{
    fn to_grid_reference(&self, lat: f64, lng: f64) -> String {
        self(lat, lng)
    }
}

/// The stock 300m keypad grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeypadGrid;

impl GridReference for KeypadGrid {
    fn to_grid_reference(&self, lat: f64, lng: f64) -> String {
        format_keypad(lat, lng)
    }
}

/// Column label for a given column index (0-based). A=0, Z=25, AA=26,
/// ZZ=701, AAA=702.
pub fn col_label(col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col as u128 + 1;
    while n > 0 {
        n -= 1;
        letters.push(char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Numpad digit for a cell of a 3x3 sub-grid.
///
/// ```text
/// 7 8 9   (top)
/// 4 5 6
/// 1 2 3   (bottom)
/// ```
pub fn keypad_digit(kx: usize, ky: usize) -> usize {
    let kx = kx.min(KEYPAD_DIVISIONS - 1);
    let ky = ky.min(KEYPAD_DIVISIONS - 1);
    7 + kx - 3 * ky
}

/// Format a map position as a keypad reference (e.g., "B5-7-3").
pub fn format_keypad(lat: f64, lng: f64) -> String {
    // y grows downwards from the top edge
    let x = lng;
    let y = -lat;
    if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
        return OFF_MAP_REFERENCE.to_string();
    }

    let col = (x / GRID_SIZE_M) as usize;
    let row = (y / GRID_SIZE_M) as usize;

    let in_square_x = x % GRID_SIZE_M;
    let in_square_y = y % GRID_SIZE_M;
    let kp = keypad_digit(
        (in_square_x / KEYPAD_SIZE_M) as usize,
        (in_square_y / KEYPAD_SIZE_M) as usize,
    );

    let in_keypad_x = in_square_x % KEYPAD_SIZE_M;
    let in_keypad_y = in_square_y % KEYPAD_SIZE_M;
    let sub = keypad_digit(
        (in_keypad_x / SUB_KEYPAD_SIZE_M) as usize,
        (in_keypad_y / SUB_KEYPAD_SIZE_M) as usize,
    );

    format!("{}{}-{}-{}", col_label(col), row as u128 + 1, kp, sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// lat/lng for a point `x` meters east and `y` meters south of the origin.
    fn at(x: f64, y: f64) -> (f64, f64) {
        (-y, x)
    }

    #[test]
    fn test_col_label() {
        assert_eq!(col_label(0), "A");
        assert_eq!(col_label(6), "G");
        assert_eq!(col_label(25), "Z");
        assert_eq!(col_label(26), "AA");
        assert_eq!(col_label(27), "AB");
        assert_eq!(col_label(701), "ZZ");
        assert_eq!(col_label(702), "AAA");
        assert_eq!(col_label(5000), "GJI");
    }

    #[test]
    fn test_keypad_digit_layout() {
        assert_eq!(keypad_digit(0, 0), 7);
        assert_eq!(keypad_digit(1, 0), 8);
        assert_eq!(keypad_digit(2, 0), 9);
        assert_eq!(keypad_digit(0, 1), 4);
        assert_eq!(keypad_digit(1, 1), 5);
        assert_eq!(keypad_digit(2, 1), 6);
        assert_eq!(keypad_digit(0, 2), 1);
        assert_eq!(keypad_digit(1, 2), 2);
        assert_eq!(keypad_digit(2, 2), 3);
        // clamps out-of-range cells onto the edge
        assert_eq!(keypad_digit(5, 5), 3);
    }

    #[test]
    fn test_format_top_left() {
        let (lat, lng) = at(1.0, 1.0);
        assert_eq!(format_keypad(lat, lng), "A1-7-7");
    }

    #[test]
    fn test_format_keypads_in_first_square() {
        let (lat, lng) = at(150.0, 150.0);
        assert_eq!(format_keypad(lat, lng), "A1-5-5");
        let (lat, lng) = at(299.0, 299.0);
        assert_eq!(format_keypad(lat, lng), "A1-3-3");
        let (lat, lng) = at(250.0, 10.0);
        assert_eq!(format_keypad(lat, lng), "A1-9-8");
    }

    #[test]
    fn test_format_later_square() {
        // column B, row 5, bottom-left keypad, top-right sub keypad
        let (lat, lng) = at(300.0 + 90.0, 4.0 * 300.0 + 210.0);
        assert_eq!(format_keypad(lat, lng), "B5-1-9");
    }

    #[test]
    fn test_format_off_map() {
        assert_eq!(format_keypad(-5000.0, -5000.0), OFF_MAP_REFERENCE);
        assert_eq!(format_keypad(10.0, 100.0), OFF_MAP_REFERENCE);
        assert_eq!(format_keypad(f64::NAN, 100.0), OFF_MAP_REFERENCE);
    }

    #[test]
    fn test_format_far_east() {
        let (lat, lng) = at(210_601.0, 1.0);
        assert_eq!(format_keypad(lat, lng), "AAA1-7-7");
        let (lat, lng) = at(1_500_001.0, 1.0);
        assert_eq!(format_keypad(lat, lng), "GJI1-7-7");
        // saturating casts keep huge finite positions labelled
        let (lat, lng) = at(f64::MAX, f64::MAX);
        assert!(!format_keypad(lat, lng).is_empty());
    }

    #[test]
    fn test_closure_as_grid_reference() {
        let grid = |lat: f64, lng: f64| format!("{lat}/{lng}");
        assert_eq!(grid.to_grid_reference(-1.0, 2.0), "-1/2");
        assert_eq!(KeypadGrid.to_grid_reference(-1.0, 1.0), "A1-7-7");
    }
}
