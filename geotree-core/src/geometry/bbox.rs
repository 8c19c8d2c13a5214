/// Axis-aligned 2D extent stored at single precision, as it is on the wire.
///
/// Conversions from `f64` round outward so the box always contains the
/// coordinates it was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl BoundingBox {
    /// Degenerate box holding a single coordinate.
    pub fn around(x: f64, y: f64) -> Self {
        Self {
            xmin: round_down(x),
            ymin: round_down(y),
            xmax: round_up(x),
            ymax: round_up(y),
        }
    }

    /// Grow the box to include `(x, y)`.
    pub fn expand(self, x: f64, y: f64) -> Self {
        Self {
            xmin: self.xmin.min(round_down(x)),
            ymin: self.ymin.min(round_down(y)),
            xmax: self.xmax.max(round_up(x)),
            ymax: self.ymax.max(round_up(y)),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        f64::from(self.xmin) <= x
            && x <= f64::from(self.xmax)
            && f64::from(self.ymin) <= y
            && y <= f64::from(self.ymax)
    }
}

fn round_down(v: f64) -> f32 {
    let f = v as f32;
    if f64::from(f) > v {
        step_f32(f, false)
    } else {
        f
    }
}

fn round_up(v: f64) -> f32 {
    let f = v as f32;
    if f64::from(f) < v {
        step_f32(f, true)
    } else {
        f
    }
}

// Adjacent representable f32 towards +inf (`up`) or -inf.
fn step_f32(f: f32, up: bool) -> f32 {
    if !f.is_finite() {
        return f;
    }
    if f == 0.0 {
        let tiny = f32::from_bits(1);
        return if up { tiny } else { -tiny };
    }
    let bits = f.to_bits();
    let away_from_zero = (f > 0.0) == up;
    f32::from_bits(if away_from_zero { bits + 1 } else { bits - 1 })
}
