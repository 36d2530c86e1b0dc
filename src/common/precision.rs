//! Fixed-precision decimal arithmetic for the skin-tone percentages.
//!
//! Ratios are computed exactly on integers and rounded half-even to seven
//! significant digits, so two scans of the same counts always produce the same
//! `f64` regardless of platform float behaviour.

pub const SIGNIFICANT_DIGITS: u32 = 7;

const LOWER: u128 = 10u128.pow(SIGNIFICANT_DIGITS - 1);
const UPPER: u128 = 10u128.pow(SIGNIFICANT_DIGITS);

// Every power of ten up to 1e22 is exact in an f64.
const EXACT_POWERS_OF_TEN: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// `mantissa * 10^-scale`, with at most seven significant digits in the mantissa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    mantissa: u128,
    scale: u32,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        mantissa: 0,
        scale: 0,
    };

    pub fn mantissa(&self) -> u128 {
        self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// `numerator / denominator` rounded to seven significant digits.
    /// Returns `None` for a zero denominator. Quotients above `10^7` are not
    /// needed here and saturate to the largest representable mantissa.
    pub fn divide(numerator: u128, denominator: u128) -> Option<Decimal> {
        if denominator == 0 {
            return None;
        }
        if numerator == 0 {
            return Some(Decimal::ZERO);
        }

        let mut scale = 0u32;
        let mut scaled = numerator;
        while scaled / denominator < LOWER {
            scaled = scaled.checked_mul(10)?;
            scale += 1;
        }

        let mut quotient = scaled / denominator;
        if quotient >= UPPER {
            return Some(Decimal {
                mantissa: UPPER - 1,
                scale,
            });
        }

        let twice_remainder = (scaled % denominator) * 2;
        if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
            quotient += 1;
        }

        // 9_999_999.5 rounds up to 10^7: drop the extra digit.
        if quotient == UPPER {
            quotient = LOWER;
            scale -= 1;
        }

        Some(Decimal {
            mantissa: quotient,
            scale,
        })
    }

    /// Mean of two decimals at the same seven-digit precision.
    pub fn average(a: Decimal, b: Decimal) -> Option<Decimal> {
        let scale = a.scale.max(b.scale);
        let sum = a.rescaled(scale)? + b.rescaled(scale)?;
        let denominator = 2u128.checked_mul(10u128.checked_pow(scale)?)?;
        Decimal::divide(sum, denominator)
    }

    fn rescaled(&self, scale: u32) -> Option<u128> {
        self.mantissa
            .checked_mul(10u128.checked_pow(scale - self.scale)?)
    }

    /// `floor(value * 100)`, computed on the exact decimal.
    pub fn percent_floor(&self) -> u128 {
        match 10u128.checked_pow(self.scale) {
            Some(divisor) => self.mantissa * 100 / divisor,
            None => 0,
        }
    }

    pub fn to_f64(self) -> f64 {
        let mantissa = self.mantissa as f64;
        match EXACT_POWERS_OF_TEN.get(self.scale as usize) {
            Some(power) => mantissa / power,
            None => mantissa / 10f64.powi(self.scale as i32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_numerator_is_zero() {
        assert_eq!(Decimal::divide(0, 10_000), Some(Decimal::ZERO));
        assert_eq!(Decimal::ZERO.to_f64(), 0.0);
    }

    #[test]
    fn zero_denominator_is_rejected() {
        assert_eq!(Decimal::divide(1, 0), None);
    }

    #[test]
    fn exact_ratios_stay_exact() {
        assert_eq!(Decimal::divide(1, 4).unwrap().to_f64(), 0.25);
        assert_eq!(Decimal::divide(1, 10).unwrap().to_f64(), 0.1);
        assert_eq!(Decimal::divide(10_000, 10_000).unwrap().to_f64(), 1.0);
    }

    #[test]
    fn repeating_ratios_round_to_seven_digits() {
        let third = Decimal::divide(1, 3).unwrap();
        assert_eq!(third.mantissa(), 3_333_333);
        assert_eq!(third.scale(), 7);
        assert_eq!(third.to_f64(), 0.3333333);

        let two_thirds = Decimal::divide(2, 3).unwrap();
        assert_eq!(two_thirds.mantissa(), 6_666_667);
        assert_eq!(two_thirds.to_f64(), 0.6666667);
    }

    #[test]
    fn ties_round_to_even() {
        // 1 / 16_000_000 = 6.25e-8 -> needs 7 digits: 6250000, exact
        assert_eq!(Decimal::divide(1, 16_000_000).unwrap().mantissa(), 6_250_000);
        // 12_345_665 / 10^8 has eight digits; the trailing 5 ties to the even 6
        assert_eq!(Decimal::divide(12_345_665, 100_000_000).unwrap().mantissa(), 1_234_566);
        // 12_345_675 / 10^8 ties to the even 8
        assert_eq!(Decimal::divide(12_345_675, 100_000_000).unwrap().mantissa(), 1_234_568);
    }

    #[test]
    fn rounding_carry_drops_a_digit() {
        // 99_999_995 / 10^8 = 0.99999995 -> rounds to 1.000000
        let value = Decimal::divide(99_999_995, 100_000_000).unwrap();
        assert_eq!(value.to_f64(), 1.0);
    }

    #[test]
    fn percent_floor_truncates() {
        assert_eq!(Decimal::divide(29, 100).unwrap().percent_floor(), 29);
        assert_eq!(Decimal::divide(2, 3).unwrap().percent_floor(), 66);
        assert_eq!(Decimal::divide(1, 1_000).unwrap().percent_floor(), 0);
        assert_eq!(Decimal::divide(7, 7).unwrap().percent_floor(), 100);
        assert_eq!(Decimal::ZERO.percent_floor(), 0);
    }

    #[test]
    fn average_uses_decimal_values() {
        let a = Decimal::divide(1, 3).unwrap();
        let b = Decimal::divide(2, 3).unwrap();
        // (0.3333333 + 0.6666667) / 2 = 0.5
        assert_eq!(Decimal::average(a, b).unwrap().to_f64(), 0.5);

        let c = Decimal::divide(1, 10).unwrap();
        let d = Decimal::divide(4, 10).unwrap();
        assert_eq!(Decimal::average(c, d).unwrap().to_f64(), 0.25);
    }
}
