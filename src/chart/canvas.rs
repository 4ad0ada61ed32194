/// Braille Unicode canvas for bar charts.
/// Each character cell represents a 2x4 pixel grid (8 dots), so a bar chart
/// gets two bar columns and four height steps per terminal cell.
/// Unicode Braille patterns: U+2800 to U+28FF
#[derive(Debug, Clone)]
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<u8>, // Bit pattern per char, row-major
}

/// Empty Braille pattern
pub const BLANK: char = '\u{2800}';

impl BrailleCanvas {
    /// Create a new canvas with the given character dimensions.
    /// Effective pixel resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0u8; width * height],
        }
    }

    pub fn pixel_height(&self) -> usize {
        self.height * 4
    }

    /// Set a pixel; y = 0 is the top row.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;

        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => 0,
        };

        self.cells[cy * self.width + cx] |= bit;
    }

    /// Fill pixel column `x` from the bottom edge up to `bar_height` pixels
    pub fn fill_column(&mut self, x: usize, bar_height: usize) {
        let total = self.pixel_height();
        for y in total.saturating_sub(bar_height)..total {
            self.set_pixel(x, y);
        }
    }

    /// Raw dot bits of one character cell (0 when out of range)
    pub fn cell(&self, cx: usize, cy: usize) -> u8 {
        if cx >= self.width || cy >= self.height {
            return 0;
        }
        self.cells[cy * self.width + cx]
    }

    /// Get a specific row as a string (for line-by-line rendering)
    pub fn row_to_string(&self, row: usize) -> String {
        if row >= self.height {
            return String::new();
        }
        self.cells[row * self.width..(row + 1) * self.width]
            .iter()
            .map(|&b| glyph(b))
            .collect()
    }

    /// Get all rows as an iterator of strings
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.height).map(|i| self.row_to_string(i))
    }
}

/// Braille character for a dot pattern
#[inline]
pub fn glyph(bits: u8) -> char {
    char::from_u32(0x2800 + bits as u32).unwrap_or(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(canvas: &BrailleCanvas) -> String {
        canvas.rows().collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(render(&canvas), "⠁"); // U+2801
    }

    #[test]
    fn test_full_columns() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.fill_column(0, 4);
        canvas.fill_column(1, 4);
        assert_eq!(render(&canvas), "⣿"); // U+28FF (all dots)
    }

    #[test]
    fn test_bar_grows_from_bottom() {
        let mut canvas = BrailleCanvas::new(1, 2);
        canvas.fill_column(0, 2);
        // bottom cell gets the two lowest left dots (0x04 | 0x40), top stays blank
        assert_eq!(canvas.cell(0, 0), 0);
        assert_eq!(canvas.cell(0, 1), 0x44);
        assert_eq!(render(&canvas), "⠀\n⡄");
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_pixel(4, 0);
        canvas.fill_column(1, 100);
        assert_eq!(canvas.cell(0, 0), 0x08 | 0x10 | 0x20 | 0x80);
        assert_eq!(canvas.cell(1, 0), 0);
        assert_eq!(canvas.cell(5, 5), 0);
    }
}
