use std::fmt;

use crate::math::curve::curve::{
    derivative_coefs,
    horner,
    Curve,
    Differentiable,
    Domain
};
use crate::math::matherror::MathError;

/// Polynomial in descending-degree coefficient form over a fixed domain.
///
/// `[a0, a1, ..., an]` represents `a0·xⁿ + a1·xⁿ⁻¹ + ... + an`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefs: Vec<f64>,
    deriv_coefs: Vec<f64>,
    second_deriv_coefs: Vec<f64>,
    domain: Domain,
}

impl Polynomial {
    pub fn new(coefs: Vec<f64>, domain: Domain) -> Result<Polynomial, MathError> {
        if coefs.is_empty() {
            return Err(MathError::invalid_input(
                "a polynomial needs at least one coefficient",
            ));
        }
        let deriv_coefs = derivative_coefs(&coefs);
        let second_deriv_coefs = derivative_coefs(&deriv_coefs);
        Ok(Polynomial { coefs, deriv_coefs, second_deriv_coefs, domain })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefs
    }

    pub fn degree(&self) -> usize {
        self.coefs.len() - 1
    }
}

impl Curve for Polynomial {
    fn value(&self, x: f64) -> f64 {
        horner(&self.coefs, x)
    }

    fn derivative(&self, x: f64) -> f64 {
        horner(&self.deriv_coefs, x)
    }

    fn second_derivative(&self, x: f64) -> f64 {
        horner(&self.second_deriv_coefs, x)
    }

    fn domain(&self) -> Domain {
        self.domain
    }
}

impl Differentiable for Polynomial {
    fn differentiate(&self) -> Polynomial {
        let deriv_coefs = self.second_deriv_coefs.clone();
        Polynomial {
            coefs: self.deriv_coefs.clone(),
            second_deriv_coefs: derivative_coefs(&deriv_coefs),
            deriv_coefs,
            domain: self.domain,
        }
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_coefficients(&self.coefs, true, true))
    }
}

// ─────────────────────────────────────────────
// Text rendering
// ─────────────────────────────────────────────

fn superscript(power: usize) -> String {
    power
        .to_string()
        .chars()
        .map(|c| match c {
            '0' => '\u{2070}',
            '1' => '\u{00B9}',
            '2' => '\u{00B2}',
            '3' => '\u{00B3}',
            '4' => '\u{2074}',
            '5' => '\u{2075}',
            '6' => '\u{2076}',
            '7' => '\u{2077}',
            '8' => '\u{2078}',
            _   => '\u{2079}',
        })
        .collect()
}

/// Renders descending-degree coefficients, e.g. `1.0000000x² - 2.0000000x + 0.5000000`.
///
/// A zero constant term is always omitted; other zero terms only when
/// `include_zero_coefs` is false. `add_padding` puts spaces around the signs.
pub fn format_coefficients(coefs: &[f64], include_zero_coefs: bool, add_padding: bool) -> String {
    let degree = coefs.len().saturating_sub(1);
    let mut out = String::new();

    for (i, &value) in coefs.iter().enumerate() {
        let power = degree - i;
        if value == 0.0 && (power == 0 || !include_zero_coefs) {
            continue;
        }

        let negative = value.is_sign_negative() && value != 0.0;
        match (out.is_empty(), negative, add_padding) {
            (true, true, _)      => out.push('-'),
            (true, false, _)     => {}
            (false, true, true)  => out.push_str(" - "),
            (false, true, false) => out.push('-'),
            (false, false, true) => out.push_str(" + "),
            (false, false, false) => out.push('+'),
        }

        out.push_str(&format!("{:.7}", value.abs()));
        match power {
            0 => {}
            1 => out.push('x'),
            p => {
                out.push('x');
                out.push_str(&superscript(p));
            }
        }
    }

    if out.is_empty() {
        out.push_str(&format!("{:.7}", 0.0));
    }
    out
}
