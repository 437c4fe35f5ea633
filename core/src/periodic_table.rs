use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The chemical elements up to argon. The discriminant is the atomic number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u32)]
pub enum ElementType {
    H = 1,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
}

impl ElementType {
    const ALL: [ElementType; 18] = [
        Self::H,
        Self::He,
        Self::Li,
        Self::Be,
        Self::B,
        Self::C,
        Self::N,
        Self::O,
        Self::F,
        Self::Ne,
        Self::Na,
        Self::Mg,
        Self::Al,
        Self::Si,
        Self::P,
        Self::S,
        Self::Cl,
        Self::Ar,
    ];

    pub fn atomic_number(self) -> u32 {
        self as u32
    }

    pub fn from_atomic_number(number: u32) -> Option<Self> {
        Self::ALL.get((number as usize).checked_sub(1)?).copied()
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::H => "H",
            Self::He => "He",
            Self::Li => "Li",
            Self::Be => "Be",
            Self::B => "B",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::F => "F",
            Self::Ne => "Ne",
            Self::Na => "Na",
            Self::Mg => "Mg",
            Self::Al => "Al",
            Self::Si => "Si",
            Self::P => "P",
            Self::S => "S",
            Self::Cl => "Cl",
            Self::Ar => "Ar",
        }
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|element| element.symbol().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown element symbol {s:?}"))
    }
}
