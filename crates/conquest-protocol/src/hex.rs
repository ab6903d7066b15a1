use serde::{Deserialize, Deserializer, Serialize, Serializer};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Axial coordinates for a hex grid (q, r). The implicit cube coordinate is `s = -q - r`.
///
/// Serialized as a two-element array `[q, r]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const DIRECTIONS: [Hex; 6] = [
        Hex { q: 1, r: 0 },  // East
        Hex { q: 1, r: -1 }, // Northeast
        Hex { q: 0, r: -1 }, // Northwest
        Hex { q: -1, r: 0 }, // West
        Hex { q: -1, r: 1 }, // Southwest
        Hex { q: 0, r: 1 },  // Southeast
    ];

    #[inline]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Convert an odd-row offset cell `(col, row)` to axial coordinates.
    #[inline]
    pub const fn from_offset(col: i32, row: i32) -> Self {
        Self {
            q: col - (row - (row & 1)) / 2,
            r: row,
        }
    }

    #[inline]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// The six adjacent hexes, always in `DIRECTIONS` order.
    pub fn neighbors(self) -> impl Iterator<Item = Hex> {
        Self::DIRECTIONS.into_iter().map(move |d| self + d)
    }

    #[inline]
    /// Saturates at `i32::MAX` for coordinates far outside any map.
    pub fn distance(self, other: Hex) -> i32 {
        let dq = i64::from(self.q) - i64::from(other.q);
        let dr = i64::from(self.r) - i64::from(other.r);
        let steps = (dq.abs() + dr.abs() + (dq + dr).abs()) / 2;
        i32::try_from(steps).unwrap_or(i32::MAX)
    }

    /// All hexes with distance `<= radius`, in a deterministic order.
    pub fn hexes_in_range(self, radius: i32) -> impl Iterator<Item = Hex> {
        InclusiveRangeIter::new(self, radius)
    }

    /// Round fractional axial coordinates to the nearest hex.
    ///
    /// The component with the largest rounding error is recomputed from the other two so that
    /// `q + r + s == 0` holds.
    pub fn round_fractional(q: f64, r: f64) -> Hex {
        let s = -q - r;

        let mut rq = q.round_ties_even();
        let mut rr = r.round_ties_even();
        let rs = s.round_ties_even();

        let q_diff = (rq - q).abs();
        let r_diff = (rr - r).abs();
        let s_diff = (rs - s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        Hex {
            q: rq as i32,
            r: rr as i32,
        }
    }

    /// Hexes on the straight line from `self` to `other`, both ends included.
    pub fn line_to(self, other: Hex) -> Vec<Hex> {
        let distance = self.distance(other);
        if distance == 0 {
            return vec![self];
        }

        let n = f64::from(distance);
        (0..=distance)
            .map(|i| {
                let t = f64::from(i) / n;
                let q = f64::from(self.q) * (1.0 - t) + f64::from(other.q) * t;
                let r = f64::from(self.r) * (1.0 - t) + f64::from(other.r) * t;
                Hex::round_fractional(q, r)
            })
            .collect()
    }

    /// Pixel centre of this hex in a flat-top layout with the given corner radius.
    pub fn to_pixel(self, size: f64) -> (f64, f64) {
        let q = f64::from(self.q);
        let r = f64::from(self.r);
        let x = size * (1.5 * q);
        let y = size * (SQRT_3 / 2.0 * q + SQRT_3 * r);
        (x, y)
    }

    /// Hex containing the pixel `(x, y)` in a flat-top layout.
    pub fn from_pixel(x: f64, y: f64, size: f64) -> Hex {
        let q = (2.0 / 3.0 * x) / size;
        let r = (-1.0 / 3.0 * x + SQRT_3 / 3.0 * y) / size;
        Hex::round_fractional(q, r)
    }
}

impl std::ops::Add for Hex {
    type Output = Hex;

    fn add(self, other: Hex) -> Hex {
        Hex {
            q: self.q + other.q,
            r: self.r + other.r,
        }
    }
}

impl std::ops::Mul<i32> for Hex {
    type Output = Hex;

    fn mul(self, rhs: i32) -> Self::Output {
        Hex {
            q: self.q * rhs,
            r: self.r * rhs,
        }
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

impl From<(i32, i32)> for Hex {
    fn from((q, r): (i32, i32)) -> Self {
        Hex { q, r }
    }
}

impl Serialize for Hex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [self.q, self.r].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Hex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [q, r] = <[i32; 2]>::deserialize(deserializer)?;
        Ok(Hex { q, r })
    }
}

struct InclusiveRangeIter {
    center: Hex,
    radius: i32,
    dq: i32,
    dr: i32,
    dr_max: i32,
}

impl InclusiveRangeIter {
    fn new(center: Hex, radius: i32) -> Self {
        // A negative radius yields nothing: dq starts above the radius.
        let dq = -radius;
        let (dr_min, dr_max) = dr_bounds(dq, radius);
        Self {
            center,
            radius,
            dq,
            dr: dr_min,
            dr_max,
        }
    }
}

impl Iterator for InclusiveRangeIter {
    type Item = Hex;

    fn next(&mut self) -> Option<Self::Item> {
        if self.dq > self.radius {
            return None;
        }

        let out = Hex {
            q: self.center.q + self.dq,
            r: self.center.r + self.dr,
        };

        self.dr += 1;
        if self.dr > self.dr_max {
            self.dq += 1;
            if self.dq <= self.radius {
                let (dr_min, dr_max) = dr_bounds(self.dq, self.radius);
                self.dr = dr_min;
                self.dr_max = dr_max;
            }
        }

        Some(out)
    }
}

#[inline]
fn dr_bounds(dq: i32, radius: i32) -> (i32, i32) {
    // For axial coords (dq, dr), the third cube delta is ds = -dq - dr.
    // Constraint: max(|dq|, |dr|, |ds|) <= radius
    let dr_min = (-radius).max(-dq - radius);
    let dr_max = radius.min(-dq + radius);
    (dr_min, dr_max)
}
