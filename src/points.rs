//! Heatmap points and the point store.

/// Which brush a point is stamped with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignClass {
    Negative,
    Neutral,
    Positive,
}

impl SignClass {
    pub const ALL: [SignClass; 3] = [SignClass::Negative, SignClass::Neutral, SignClass::Positive];

    /// Classify by sign only; zero and NaN are neutral.
    pub fn of(sign: f64) -> Self {
        if sign > 0.0 {
            SignClass::Positive
        } else if sign < 0.0 {
            SignClass::Negative
        } else {
            SignClass::Neutral
        }
    }
}

/// A weighted, signed sample at surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Magnitude; divided by the `max` option to get the stamp opacity.
    pub weight: f64,
    /// Only its sign matters: it picks the brush and the paint order.
    pub sign: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, weight: f64, sign: f64) -> Self {
        Self { x, y, weight, sign }
    }

    pub fn sign_class(&self) -> SignClass {
        SignClass::of(self.sign)
    }

    /// Sort key; NaN and negative zero sort with zero.
    fn order_key(&self) -> f64 {
        if self.sign.is_nan() || self.sign == 0.0 {
            0.0
        } else {
            self.sign
        }
    }
}

impl From<(f64, f64, f64, f64)> for Point {
    fn from((x, y, weight, sign): (f64, f64, f64, f64)) -> Self {
        Self::new(x, y, weight, sign)
    }
}

impl From<[f64; 4]> for Point {
    fn from([x, y, weight, sign]: [f64; 4]) -> Self {
        Self::new(x, y, weight, sign)
    }
}

/// Point set with a lazily restored paint order.
///
/// Points are painted ascending by `sign` so positive stamps land on top of
/// neutral ones, which land on top of negative ones. Mutations only mark the
/// order dirty; [`PointStore::ensure_sorted`] restores it with a stable sort
/// right before drawing.
#[derive(Debug, Clone)]
pub struct PointStore {
    points: Vec<Point>,
    sorted: bool,
}

impl PointStore {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            sorted: true,
        }
    }

    /// Replace the whole set.
    pub fn set<I, P>(&mut self, points: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        self.points = points.into_iter().map(Into::into).collect();
        self.sorted = false;
    }

    pub fn push(&mut self, point: impl Into<Point>) {
        self.points.push(point.into());
        self.sorted = false;
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Stable-sort by sign if the order is dirty.
    pub fn ensure_sorted(&mut self) {
        if !self.sorted {
            self.points
                .sort_by(|a, b| a.order_key().total_cmp(&b.order_key()));
            self.sorted = true;
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }
}

impl Default for PointStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_class() {
        assert_eq!(SignClass::of(0.001), SignClass::Positive);
        assert_eq!(SignClass::of(-7.0), SignClass::Negative);
        assert_eq!(SignClass::of(0.0), SignClass::Neutral);
        assert_eq!(SignClass::of(-0.0), SignClass::Neutral);
        assert_eq!(SignClass::of(f64::NAN), SignClass::Neutral);
    }

    #[test]
    fn test_point_conversions() {
        let a: Point = (1.0, 2.0, 3.0, -1.0).into();
        let b: Point = [1.0, 2.0, 3.0, -1.0].into();
        assert_eq!(a, b);
        assert_eq!(a.sign_class(), SignClass::Negative);
    }

    #[test]
    fn test_mutations_mark_dirty() {
        let mut store = PointStore::new();
        assert!(store.is_sorted());
        store.push((0.0, 0.0, 1.0, 1.0));
        assert!(!store.is_sorted());
        store.ensure_sorted();
        assert!(store.is_sorted());
        store.set([[1.0, 1.0, 1.0, 0.0]]);
        assert!(!store.is_sorted());
        assert_eq!(store.len(), 1);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_sort_groups_by_sign() {
        let mut store = PointStore::new();
        store.set([
            (0.0, 0.0, 1.0, 2.0),
            (1.0, 0.0, 1.0, 0.0),
            (2.0, 0.0, 1.0, -3.0),
            (3.0, 0.0, 1.0, 1.0),
            (4.0, 0.0, 1.0, -1.0),
        ]);
        store.ensure_sorted();
        let classes: Vec<SignClass> = store.iter().map(Point::sign_class).collect();
        assert_eq!(
            classes,
            [
                SignClass::Negative,
                SignClass::Negative,
                SignClass::Neutral,
                SignClass::Positive,
                SignClass::Positive,
            ]
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let mut store = PointStore::new();
        for i in 0..10 {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            store.push((i as f64, 0.0, 1.0, sign));
        }
        store.ensure_sorted();
        let xs: Vec<f64> = store.iter().map(|p| p.x).collect();
        assert_eq!(xs, [1.0, 3.0, 5.0, 7.0, 9.0, 0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_nan_sign_sorts_with_zero() {
        let mut store = PointStore::new();
        store.set([
            (0.0, 0.0, 1.0, 1.0),
            (1.0, 0.0, 1.0, f64::NAN),
            (2.0, 0.0, 1.0, -1.0),
        ]);
        store.ensure_sorted();
        let xs: Vec<f64> = store.iter().map(|p| p.x).collect();
        assert_eq!(xs, [2.0, 1.0, 0.0]);
    }
}
