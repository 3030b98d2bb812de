//! Pixel matrices of independently controllable light sources

use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Matrix coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Pixel layout of a matrix fixture
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    /// `pixel_keys[z][y][x]`, `None` for holes in the grid
    pixel_keys: Vec<Vec<Vec<Option<String>>>>,
    /// Pixel position `[x, y, z]` of every key
    positions: HashMap<String, [usize; 3]>,
    pixel_groups: IndexMap<String, Vec<String>>,
}

impl Matrix {
    /// Create a matrix with auto-generated pixel keys.
    ///
    /// Keys are 1-based: `"3"` for one-dimensional matrices, `"(2, 1)"` for
    /// two dimensions and `"(2, 1, 4)"` for three.
    pub fn from_pixel_count(x: usize, y: usize, z: usize) -> Self {
        let dimensions = [x, y, z].iter().filter(|count| **count > 1).count();

        let pixel_keys = (0..z)
            .map(|zi| {
                (0..y)
                    .map(|yi| {
                        (0..x)
                            .map(|xi| {
                                let key = match dimensions {
                                    0 | 1 => format!("{}", xi.max(yi).max(zi) + 1),
                                    2 if z == 1 => format!("({}, {})", xi + 1, yi + 1),
                                    2 if y == 1 => format!("({}, {})", xi + 1, zi + 1),
                                    2 => format!("({}, {})", yi + 1, zi + 1),
                                    _ => format!("({}, {}, {})", xi + 1, yi + 1, zi + 1),
                                };
                                Some(key)
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();

        Self::from_pixel_keys(pixel_keys)
    }

    /// Create a matrix from explicit keys, indexed `[z][y][x]`
    pub fn from_pixel_keys(pixel_keys: Vec<Vec<Vec<Option<String>>>>) -> Self {
        let mut positions = HashMap::new();
        for (z, layer) in pixel_keys.iter().enumerate() {
            for (y, row) in layer.iter().enumerate() {
                for (x, key) in row.iter().enumerate() {
                    if let Some(key) = key {
                        positions.insert(key.clone(), [x, y, z]);
                    }
                }
            }
        }

        Self {
            pixel_keys,
            positions,
            pixel_groups: IndexMap::new(),
        }
    }

    /// Add or replace a pixel group
    pub fn add_pixel_group(&mut self, key: impl Into<String>, pixel_keys: Vec<String>) {
        self.pixel_groups.insert(key.into(), pixel_keys);
    }

    pub fn pixel_count_x(&self) -> usize {
        self.pixel_keys
            .iter()
            .flat_map(|layer| layer.iter().map(Vec::len))
            .max()
            .unwrap_or(0)
    }

    pub fn pixel_count_y(&self) -> usize {
        self.pixel_keys.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn pixel_count_z(&self) -> usize {
        self.pixel_keys.len()
    }

    /// Position `[x, y, z]` of a pixel
    pub fn pixel_key_position(&self, pixel_key: &str) -> Option<[usize; 3]> {
        self.positions.get(pixel_key).copied()
    }

    /// Whether the key names a single pixel of this matrix
    pub fn has_pixel_key(&self, pixel_key: &str) -> bool {
        self.positions.contains_key(pixel_key)
    }

    /// All pixel keys, the first axis varying fastest.
    ///
    /// `pixel_keys_by_order(Axis::X, Axis::Y, Axis::Z)` walks a row along X,
    /// then moves one step in Y, and only moves in Z after a full XY layer.
    pub fn pixel_keys_by_order(&self, first: Axis, second: Axis, third: Axis) -> Vec<String> {
        let mut keys: Vec<(&String, &[usize; 3])> = self.positions.iter().collect();
        keys.sort_by(|(key_a, pos_a), (key_b, pos_b)| {
            compare_positions(pos_a, pos_b, [third, second, first]).then_with(|| key_a.cmp(key_b))
        });
        keys.into_iter().map(|(key, _)| key.clone()).collect()
    }

    /// Pixel group keys in declaration order
    pub fn pixel_group_keys(&self) -> impl Iterator<Item = &str> {
        self.pixel_groups.keys().map(String::as_str)
    }

    /// Pixels of a group
    pub fn pixel_group(&self, key: &str) -> Option<&[String]> {
        self.pixel_groups.get(key).map(Vec::as_slice)
    }

    /// Whether the key is a pixel or a pixel group of this matrix
    pub fn is_known_key(&self, key: &str) -> bool {
        self.has_pixel_key(key) || self.pixel_groups.contains_key(key)
    }
}

fn compare_positions(a: &[usize; 3], b: &[usize; 3], priority: [Axis; 3]) -> Ordering {
    priority
        .iter()
        .map(|axis| a[axis.index()].cmp(&b[axis.index()]))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_dimensional_keys() {
        let matrix = Matrix::from_pixel_count(4, 1, 1);
        assert_eq!(
            matrix.pixel_keys_by_order(Axis::X, Axis::Y, Axis::Z),
            vec!["1", "2", "3", "4"]
        );
        assert_eq!(matrix.pixel_count_x(), 4);
        assert_eq!(matrix.pixel_count_y(), 1);
    }

    #[test]
    fn test_two_dimensional_order() {
        let matrix = Matrix::from_pixel_count(2, 2, 1);
        assert_eq!(
            matrix.pixel_keys_by_order(Axis::X, Axis::Y, Axis::Z),
            vec!["(1, 1)", "(2, 1)", "(1, 2)", "(2, 2)"]
        );
        assert_eq!(
            matrix.pixel_keys_by_order(Axis::Y, Axis::X, Axis::Z),
            vec!["(1, 1)", "(1, 2)", "(2, 1)", "(2, 2)"]
        );
        assert_eq!(matrix.pixel_key_position("(2, 1)"), Some([1, 0, 0]));
    }

    #[test]
    fn test_explicit_keys_with_holes() {
        let matrix = Matrix::from_pixel_keys(vec![vec![
            vec![Some("Top".to_string()), None],
            vec![Some("Left".to_string()), Some("Right".to_string())],
        ]]);
        assert_eq!(
            matrix.pixel_keys_by_order(Axis::X, Axis::Y, Axis::Z),
            vec!["Top", "Left", "Right"]
        );
        assert!(!matrix.has_pixel_key("Bottom"));
    }

    #[test]
    fn test_pixel_groups_keep_declaration_order() {
        let mut matrix = Matrix::from_pixel_count(3, 1, 1);
        matrix.add_pixel_group("Outer", vec!["1".to_string(), "3".to_string()]);
        matrix.add_pixel_group("Center", vec!["2".to_string()]);

        let groups: Vec<&str> = matrix.pixel_group_keys().collect();
        assert_eq!(groups, vec!["Outer", "Center"]);
        assert!(matrix.is_known_key("Center"));
        assert_eq!(matrix.pixel_group("Outer").unwrap().len(), 2);
    }
}
