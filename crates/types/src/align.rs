use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    Justified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    Left,
    Right,
    Top,
    Bottom,
}

impl Border {
    pub const ALL: [Border; 4] = [Border::Left, Border::Right, Border::Top, Border::Bottom];

    fn bit(self) -> u8 {
        match self {
            Border::Left => 0b0001,
            Border::Right => 0b0010,
            Border::Top => 0b0100,
            Border::Bottom => 0b1000,
        }
    }
}

/// The set of visible cell borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BorderSet(u8);

impl BorderSet {
    pub const fn none() -> Self {
        BorderSet(0)
    }

    pub const fn all() -> Self {
        BorderSet(0b1111)
    }

    pub fn of(borders: &[Border]) -> Self {
        borders.iter().fold(Self::none(), |set, b| set.with(*b))
    }

    pub fn with(mut self, border: Border) -> Self {
        self.insert(border);
        self
    }

    pub fn insert(&mut self, border: Border) {
        self.0 |= border.bit();
    }

    pub fn remove(&mut self, border: Border) {
        self.0 &= !border.bit();
    }

    pub fn contains(&self, border: Border) -> bool {
        self.0 & border.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Border> + '_ {
        Border::ALL.into_iter().filter(|b| self.contains(*b))
    }
}
