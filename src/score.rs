/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

/// A numerical representation of the utility of a position, in units of pawns.
///
/// Scores are always relative to the side-to-move of the position they were computed for.
/// Unlike integer centipawn scores, these are real numbers, so they are only [`PartialOrd`].
#[derive(Clone, Copy, Default, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Score(pub f64);

impl Score {
    /// Unbounded sentinel used for alpha/beta windows at the root.
    pub const INF: Self = Self(f64::INFINITY);

    /// Score of a position whose side-to-move has no legal moves.
    ///
    /// In losing chess, being unable to move is a win.
    pub const WIN: Self = Self(1_000_000.0);

    /// Score of a draw.
    pub const DRAW: Self = Self(0.0);

    /// Returns the larger of `self` and `other`.
    ///
    /// If the scores are equal (or incomparable), `self` is kept.
    #[inline(always)]
    pub fn max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    /// Returns the smaller of `self` and `other`.
    ///
    /// If the scores are equal (or incomparable), `self` is kept.
    #[inline(always)]
    pub fn min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }

    /// Returns `true` if this score is a decided game (a win for either side).
    #[inline(always)]
    pub fn is_decisive(&self) -> bool {
        self.0.abs() >= Self::WIN.0
    }

    /// Returns the inner value of this [`Score`].
    #[inline(always)]
    pub const fn inner(&self) -> f64 {
        self.0
    }
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(std::ops::$trait::$fn(self.0, rhs.0))
            }
        }

        impl std::ops::$trait<f64> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: f64) -> Self::Output {
                Self(std::ops::$trait::$fn(self.0, rhs))
            }
        }
    };
}

macro_rules! impl_binary_op_assign {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: Self) {
                std::ops::$trait::$fn(&mut self.0, rhs.0);
            }
        }

        impl std::ops::$trait<f64> for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: f64) {
                std::ops::$trait::$fn(&mut self.0, rhs);
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);
impl_binary_op!(Mul, mul);
impl_binary_op!(Div, div);

impl_binary_op_assign!(AddAssign, add_assign);
impl_binary_op_assign!(SubAssign, sub_assign);

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl std::iter::Sum for Score {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::DRAW, |acc, score| acc + score)
    }
}

impl PartialEq<f64> for Score {
    fn eq(&self, other: &f64) -> bool {
        self.0.eq(other)
    }
}

impl PartialOrd<f64> for Score {
    fn partial_cmp(&self, other: &f64) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl fmt::Display for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_decisive() {
            let side = if self.0 > 0.0 { "+" } else { "-" };
            write!(f, "{side}win")
        } else {
            write!(f, "{:.2}", self.0)
        }
    }
}

impl fmt::Debug for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
