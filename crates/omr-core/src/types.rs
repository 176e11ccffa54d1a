// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the OMR grader.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OmrError;

/// Number of real alternatives a question can have (A through E).
pub const MAX_ALTERNATIVES: u32 = 5;

/// The decoded state of one question.
///
/// Five real alternatives plus two sentinels. The numeric codes returned by
/// [`AnswerCode::code`] are `0..=4` for `A..=E`, `-1` for `Blank` and `-2`
/// for `Multi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnswerCode {
    A,
    B,
    C,
    D,
    E,
    /// No alternative stood out from the background.
    Blank,
    /// Two or more alternatives were marked strongly enough to be ambiguous.
    Multi,
}

impl AnswerCode {
    const ALTERNATIVES: [AnswerCode; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    /// The alternative at a zero-based column index, if it is one of A..=E.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALTERNATIVES.get(index).copied()
    }

    /// Zero-based column index for real alternatives, `None` for sentinels.
    pub fn alternative_index(&self) -> Option<usize> {
        match self {
            Self::A => Some(0),
            Self::B => Some(1),
            Self::C => Some(2),
            Self::D => Some(3),
            Self::E => Some(4),
            Self::Blank | Self::Multi => None,
        }
    }

    /// Whether this is a real alternative rather than `Blank`/`Multi`.
    pub fn is_alternative(&self) -> bool {
        self.alternative_index().is_some()
    }

    /// Integer encoding: `0..=4` for alternatives, `-1` blank, `-2` multi.
    pub fn code(&self) -> i8 {
        match self {
            Self::Blank => -1,
            Self::Multi => -2,
            other => other.alternative_index().map_or(-1, |i| i as i8),
        }
    }

    /// Single-character display form used in text reports.
    pub fn symbol(&self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
            Self::Blank => '-',
            Self::Multi => '*',
        }
    }

    /// Parse the single-character form produced by [`AnswerCode::symbol`].
    /// Lowercase letters are accepted.
    pub fn from_symbol(symbol: char) -> Result<Self, OmrError> {
        match symbol.to_ascii_uppercase() {
            'A' => Ok(Self::A),
            'B' => Ok(Self::B),
            'C' => Ok(Self::C),
            'D' => Ok(Self::D),
            'E' => Ok(Self::E),
            '-' => Ok(Self::Blank),
            '*' => Ok(Self::Multi),
            _ => Err(OmrError::InvalidAnswerCode(symbol)),
        }
    }
}

impl fmt::Display for AnswerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The full ordered decoding of one sheet: block order, then row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerVector(Vec<AnswerCode>);

impl AnswerVector {
    /// A vector of `len` copies of `code`.
    pub fn filled(code: AnswerCode, len: usize) -> Self {
        Self(vec![code; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnswerCode> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<AnswerCode> {
        self.0.get(index).copied()
    }

    pub fn into_inner(self) -> Vec<AnswerCode> {
        self.0
    }
}

impl From<Vec<AnswerCode>> for AnswerVector {
    fn from(codes: Vec<AnswerCode>) -> Self {
        Self(codes)
    }
}

impl FromIterator<AnswerCode> for AnswerVector {
    fn from_iter<I: IntoIterator<Item = AnswerCode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AnswerVector {
    type Item = &'a AnswerCode;
    type IntoIter = std::slice::Iter<'a, AnswerCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for AnswerVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{code}")?;
        }
        Ok(())
    }
}

/// Parses one code per non-whitespace character, so `"A B - *"` and
/// `"AB-*"` are equivalent.
impl FromStr for AnswerVector {
    type Err = OmrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .map(AnswerCode::from_symbol)
            .collect()
    }
}
