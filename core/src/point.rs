/// A synthetic 3D point with a fixed number of scalar attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub attrs: Vec<f64>,
}

impl Point {
    pub fn attribute_count(&self) -> usize { self.attrs.len() }

    /// Number of f64 fields this point occupies in a packed payload.
    pub fn field_count(&self) -> usize { 3 + self.attrs.len() }
}

/// Deterministic fixture source. The same index always yields a bit-identical point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureGenerator {
    attribute_count: usize,
}

impl FixtureGenerator {
    pub fn new(attribute_count: usize) -> Self { Self { attribute_count } }

    pub fn attribute_count(&self) -> usize { self.attribute_count }

    pub fn point(&self, index: u64) -> Point {
        let mut point = Point { x: 0.0, y: 0.0, z: 0.0, attrs: Vec::with_capacity(self.attribute_count) };
        self.fill(index, &mut point);
        point
    }

    /// Overwrites `point` with the fixture for `index`, reusing its attribute buffer.
    pub fn fill(&self, index: u64, point: &mut Point) {
        let step = index as f64 * 0.01;
        point.x = index as f64 * 0.001;
        point.y = 10.0 * step.sin();
        point.z = 10.0 * step.cos();

        point.attrs.clear();
        point.attrs.extend((0..self.attribute_count).map(|i| attribute(index, i)));
    }

    /// Lazily generates the fixtures for every index in `range`.
    pub fn points(&self, range: std::ops::Range<u64>) -> impl Iterator<Item = Point> + Send + '_ {
        range.map(move |index| self.point(index))
    }
}

fn attribute(index: u64, i: usize) -> f64 { (index % (i as u64 + 7)) as f64 * 0.1 + i as f64 }

/// Shorthand for `FixtureGenerator::new(attribute_count).point(index)`.
pub fn generate(index: u64, attribute_count: usize) -> Point { FixtureGenerator::new(attribute_count).point(index) }
