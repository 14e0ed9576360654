//! Unit-tagged lengths and 2D dimensions.
//!
//! Arithmetic between two [`Length`] values converts the right operand into the
//! unit of the left operand before combining, and the result keeps the left
//! operand's unit.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

pub const POINTS_PER_INCH: f32 = 72.0;
pub const MM_PER_INCH: f32 = 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Mm,
    In,
    Pt,
}

impl Unit {
    /// Factor that converts a value in `self` into a value in `to`.
    pub fn scaling_to(self, to: Unit) -> f32 {
        match (self, to) {
            (Unit::Mm, Unit::Mm) | (Unit::In, Unit::In) | (Unit::Pt, Unit::Pt) => 1.0,
            (Unit::Mm, Unit::In) => 1.0 / MM_PER_INCH,
            (Unit::Mm, Unit::Pt) => POINTS_PER_INCH / MM_PER_INCH,
            (Unit::In, Unit::Mm) => MM_PER_INCH,
            (Unit::In, Unit::Pt) => POINTS_PER_INCH,
            (Unit::Pt, Unit::Mm) => MM_PER_INCH / POINTS_PER_INCH,
            (Unit::Pt, Unit::In) => 1.0 / POINTS_PER_INCH,
        }
    }

    pub fn value_to(self, value: f32, to: Unit) -> f32 {
        value * self.scaling_to(to)
    }

    fn suffix(self) -> &'static str {
        match self {
            Unit::Mm => "mm",
            Unit::In => "in",
            Unit::Pt => "pt",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Length {
    pub unit: Unit,
    pub value: f32,
}

impl Length {
    pub const ZERO: Length = Length { unit: Unit::Pt, value: 0.0 };

    pub const fn new(unit: Unit, value: f32) -> Self {
        Self { unit, value }
    }

    pub const fn mm(value: f32) -> Self {
        Self::new(Unit::Mm, value)
    }

    pub const fn pt(value: f32) -> Self {
        Self::new(Unit::Pt, value)
    }

    pub const fn inches(value: f32) -> Self {
        Self::new(Unit::In, value)
    }

    pub fn value_in(self, unit: Unit) -> f32 {
        self.unit.value_to(self.value, unit)
    }

    pub fn to_unit(self, unit: Unit) -> Length {
        Length::new(unit, self.value_in(unit))
    }

    pub fn mm_value(self) -> f32 {
        self.value_in(Unit::Mm)
    }

    pub fn pt_value(self) -> f32 {
        self.value_in(Unit::Pt)
    }

    pub fn in_value(self) -> f32 {
        self.value_in(Unit::In)
    }

    pub fn is_positive(self) -> bool {
        self.value > 0.0
    }

    pub fn is_negative(self) -> bool {
        self.value < 0.0
    }

    pub fn is_zero(self) -> bool {
        self.value == 0.0
    }

    /// Multiplies by a plain factor, keeping the unit.
    pub fn scale(self, factor: f32) -> Length {
        Length::new(self.unit, self.value * factor)
    }

    pub fn max(self, other: Length) -> Length {
        if other > self { other.to_unit(self.unit) } else { self }
    }

    pub fn min(self, other: Length) -> Length {
        if other < self { other.to_unit(self.unit) } else { self }
    }

    /// Value of `other` expressed in this length's unit.
    fn adjust(self, other: Length) -> f32 {
        other.value_in(self.unit)
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::ZERO
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length::new(self.unit, self.value + self.adjust(rhs))
    }
}

impl Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        Length::new(self.unit, self.value - self.adjust(rhs))
    }
}

impl Mul for Length {
    type Output = Length;

    fn mul(self, rhs: Length) -> Length {
        Length::new(self.unit, self.value * self.adjust(rhs))
    }
}

impl Div for Length {
    type Output = Length;

    fn div(self, rhs: Length) -> Length {
        Length::new(self.unit, self.value / self.adjust(rhs))
    }
}

impl Neg for Length {
    type Output = Length;

    fn neg(self) -> Length {
        Length::new(self.unit, -self.value)
    }
}

impl PartialEq for Length {
    fn eq(&self, other: &Self) -> bool {
        self.value == self.adjust(*other)
    }
}

impl PartialOrd for Length {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&self.adjust(*other))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

/// A pair of lengths, used both as a point and as a width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub x: Length,
    pub y: Length,
}

impl Dimension {
    pub const ZERO: Dimension = Dimension { x: Length::ZERO, y: Length::ZERO };

    pub const fn new(x: Length, y: Length) -> Self {
        Self { x, y }
    }

    pub const fn of(unit: Unit, x: f32, y: f32) -> Self {
        Self::new(Length::new(unit, x), Length::new(unit, y))
    }

    pub fn to_unit(self, unit: Unit) -> Dimension {
        Dimension::new(self.x.to_unit(unit), self.y.to_unit(unit))
    }
}

impl Add for Dimension {
    type Output = Dimension;

    fn add(self, rhs: Dimension) -> Dimension {
        Dimension::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, tolerance: f32) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_conversion_constants() {
        assert!(approx(Length::inches(1.0).pt_value(), 72.0, 1e-4));
        assert!(approx(Length::inches(1.0).mm_value(), 25.4, 1e-4));
        assert!(approx(Length::mm(25.4).pt_value(), 72.0, 1e-3));
        assert!(approx(Length::pt(72.0).in_value(), 1.0, 1e-6));
    }

    #[test]
    fn test_arithmetic_keeps_left_unit() {
        let sum = Length::mm(10.0) + Length::inches(1.0);
        assert_eq!(sum.unit, Unit::Mm);
        assert!(approx(sum.value, 35.4, 1e-4));

        let diff = Length::pt(100.0) - Length::mm(10.0);
        assert_eq!(diff.unit, Unit::Pt);
        assert!(approx(diff.value, 100.0 - 28.346457, 1e-3));

        let ratio = Length::mm(50.8) / Length::inches(1.0);
        assert!(approx(ratio.value, 2.0, 1e-5));
    }

    #[test]
    fn test_comparison_across_units() {
        assert!(Length::inches(1.0) > Length::mm(25.0));
        assert!(Length::mm(25.0) < Length::pt(72.0));
        assert!(Length::ZERO == Length::mm(0.0));
        assert!(Length::mm(10.0).max(Length::pt(72.0)).unit == Unit::Mm);
        assert!(approx(Length::mm(10.0).max(Length::pt(72.0)).value, 25.4, 1e-3));
    }

    #[test]
    fn test_sign_tests_are_strict() {
        assert!(!Length::ZERO.is_positive());
        assert!(!Length::ZERO.is_negative());
        assert!(Length::mm(0.001).is_positive());
        assert!((Length::mm(1.0) - Length::mm(2.0)).is_negative());
    }

    #[test]
    fn test_division_by_zero_is_not_special_cased() {
        let result = Length::mm(1.0) / Length::ZERO;
        assert!(result.value.is_infinite());
    }

    #[test]
    fn test_dimension_add() {
        let d = Dimension::of(Unit::Mm, 1.0, 2.0) + Dimension::of(Unit::Mm, 3.0, 4.0);
        assert_eq!(d, Dimension::of(Unit::Mm, 4.0, 6.0));
    }
}
