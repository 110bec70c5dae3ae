use dotted_map::GridPoint;

/// Braille Unicode canvas for previewing a dot grid in the terminal.
/// Each character cell holds a 2x4 block of dots (U+2800 to U+28FF).
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<Vec<u8>>, // Bit patterns per char
}

impl BrailleCanvas {
    /// Create a canvas with the given character dimensions.
    /// Effective dot resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![0u8; width]; height],
        }
    }

    /// Rasterize map points from a `map_width x map_height` pixel space,
    /// scaled uniformly to fit the canvas.
    pub fn from_points(
        width: usize,
        height: usize,
        map_width: u32,
        map_height: u32,
        points: &[GridPoint],
    ) -> Self {
        let mut canvas = Self::new(width, height);
        if map_width == 0 || map_height == 0 {
            return canvas;
        }
        let scale = f64::min(
            (width * 2) as f64 / map_width as f64,
            (height * 4) as f64 / map_height as f64,
        );
        for point in points {
            if point.x.is_finite() && point.y.is_finite() && point.x >= 0.0 && point.y >= 0.0 {
                canvas.set_dot((point.x * scale) as usize, (point.y * scale) as usize);
            }
        }
        canvas
    }

    /// Set a dot at the given coordinates.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set_dot(&mut self, x: usize, y: usize) {
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

        self.cells[cy][cx] |= bit;
    }

    /// Get a specific row as a string
    pub fn row_to_string(&self, row: usize) -> String {
        if row >= self.height {
            return String::new();
        }
        self.cells[row]
            .iter()
            .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
            .collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.height).map(|i| self.row_to_string(i))
    }
}
