//! Shared helpers for the integration suite.
//!
//! The generated code is meant to be embedded into a host that defines the
//! arrays `xr` and `xi` and the temporaries `tr` and `ti`. These tests embed
//! fragments the same way, except the host is an interpreter: each emitted
//! statement is parsed once into a small statement list and then executed
//! directly on the arrays. Like the embedding contract, the host is generic
//! over the floating point element type.

#![allow(dead_code)]

use num_complex::Complex;
use num_traits::Float;

use rand::distributions::{Distribution, Uniform};
use rand::{rngs::StdRng, SeedableRng};

use fftgen::{FftDirection, Generator, Options};

/// The seed for the random number generator used to generate random
/// signals. It's defined here so that we have deterministic tests.
const RNG_SEED: [u8; 32] = [
    3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8, 9, 7, 9, 3, 2, 3, 8, 4, 6, 2, 6, 4, 3, 3, 8, 3, 2, 7, 9, 5,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Tr,
    Ti,
    Xr(usize),
    Xi(usize),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Operand {
    Cell(Cell),
    Literal(f64),
}

/// One summand of a right-hand side, `[-] [coefficient *] operand`.
#[derive(Copy, Clone, Debug)]
pub struct Term {
    pub negated: bool,
    pub coefficient: Option<f64>,
    pub operand: Operand,
}

#[derive(Clone, Debug)]
pub struct Statement {
    pub target: Cell,
    pub accumulate: bool,
    pub terms: Vec<Term>,
}

/// A parsed fragment, ready to run any number of times.
pub struct Fragment {
    statements: Vec<Statement>,
}

impl Fragment {
    pub fn parse(code: &str) -> Fragment {
        let statements = code
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("//"))
            .map(parse_statement)
            .collect();
        Fragment { statements }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn run<T: Float>(&self, xr: &mut [T], xi: &mut [T]) {
        let mut tr = T::zero();
        let mut ti = T::zero();
        for statement in &self.statements {
            let mut value = T::zero();
            for term in &statement.terms {
                let mut operand = match term.operand {
                    Operand::Cell(Cell::Tr) => tr,
                    Operand::Cell(Cell::Ti) => ti,
                    Operand::Cell(Cell::Xr(index)) => xr[index],
                    Operand::Cell(Cell::Xi(index)) => xi[index],
                    Operand::Literal(literal) => T::from(literal).unwrap(),
                };
                if let Some(coefficient) = term.coefficient {
                    operand = T::from(coefficient).unwrap() * operand;
                }
                if term.negated {
                    operand = -operand;
                }
                value = value + operand;
            }

            let target = match statement.target {
                Cell::Tr => &mut tr,
                Cell::Ti => &mut ti,
                Cell::Xr(index) => &mut xr[index],
                Cell::Xi(index) => &mut xi[index],
            };
            if statement.accumulate {
                *target = *target + value;
            } else {
                *target = value;
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Cell(Cell),
    Plus,
    Minus,
    Star,
}

fn tokenize(text: &str, line: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b' ' => i += 1,
            b'+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            b'-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            b'*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            b'0'..=b'9' | b'.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    i += 1;
                    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
                        i += 1;
                    }
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let number = text[start..i]
                    .parse()
                    .unwrap_or_else(|_| panic!("bad number in `{line}`"));
                tokens.push(Token::Number(number));
            }
            b'a'..=b'z' => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_lowercase() {
                    i += 1;
                }
                let name = &text[start..i];
                let cell = match name {
                    "tr" => Cell::Tr,
                    "ti" => Cell::Ti,
                    "xr" | "xi" => {
                        assert!(
                            i < bytes.len() && bytes[i] == b'[',
                            "missing index in `{line}`"
                        );
                        i += 1;
                        let digits_start = i;
                        while i < bytes.len() && bytes[i].is_ascii_digit() {
                            i += 1;
                        }
                        let index = text[digits_start..i]
                            .parse()
                            .unwrap_or_else(|_| panic!("bad index in `{line}`"));
                        assert!(
                            i < bytes.len() && bytes[i] == b']',
                            "missing ']' in `{line}`"
                        );
                        i += 1;
                        if name == "xr" {
                            Cell::Xr(index)
                        } else {
                            Cell::Xi(index)
                        }
                    }
                    other => panic!("unknown identifier `{other}` in `{line}`"),
                };
                tokens.push(Token::Cell(cell));
            }
            other => panic!("unexpected character `{}` in `{line}`", other as char),
        }
    }
    tokens
}

fn parse_statement(line: &str) -> Statement {
    let body = line
        .strip_suffix(';')
        .unwrap_or_else(|| panic!("missing ';' in `{line}`"));
    let (lhs, accumulate, rhs) = if let Some((lhs, rhs)) = body.split_once("+=") {
        (lhs, true, rhs)
    } else if let Some((lhs, rhs)) = body.split_once('=') {
        (lhs, false, rhs)
    } else {
        panic!("missing assignment in `{line}`");
    };

    let target = match tokenize(lhs, line).as_slice() {
        [Token::Cell(cell)] => *cell,
        _ => panic!("bad assignment target in `{line}`"),
    };

    let tokens = tokenize(rhs, line);
    let mut terms = Vec::new();
    let mut i = 0;
    let mut first = true;
    while i < tokens.len() {
        let negated = if first {
            // only a minus may prefix the first summand
            match tokens[i] {
                Token::Minus => {
                    i += 1;
                    true
                }
                _ => false,
            }
        } else {
            match tokens[i] {
                Token::Plus => {
                    i += 1;
                    false
                }
                Token::Minus => {
                    i += 1;
                    true
                }
                _ => panic!("missing connective in `{line}`"),
            }
        };
        first = false;

        match tokens.get(i) {
            Some(&Token::Number(value)) => {
                if tokens.get(i + 1) == Some(&Token::Star) {
                    let cell = match tokens.get(i + 2) {
                        Some(&Token::Cell(cell)) => cell,
                        _ => panic!("missing multiplicand in `{line}`"),
                    };
                    terms.push(Term {
                        negated,
                        coefficient: Some(value),
                        operand: Operand::Cell(cell),
                    });
                    i += 3;
                } else {
                    terms.push(Term {
                        negated,
                        coefficient: None,
                        operand: Operand::Literal(value),
                    });
                    i += 1;
                }
            }
            Some(&Token::Cell(cell)) => {
                terms.push(Term {
                    negated,
                    coefficient: None,
                    operand: Operand::Cell(cell),
                });
                i += 1;
            }
            _ => panic!("missing summand in `{line}`"),
        }
    }
    assert!(!terms.is_empty(), "empty right-hand side in `{line}`");

    Statement {
        target,
        accumulate,
        terms,
    }
}

pub fn generate(options: Options) -> String {
    Generator::new(options)
        .unwrap_or_else(|error| panic!("invalid options: {error}"))
        .generate_to_string()
}

/// Naive O(n^2) DFT used as the correctness oracle. An inverse transform is
/// unscaled, matching the generated code.
pub fn reference_dft(input: &[Complex<f64>], direction: FftDirection) -> Vec<Complex<f64>> {
    let len = input.len();
    let constant = -2.0 * std::f64::consts::PI / len as f64;
    (0..len)
        .map(|k| {
            let mut sum = Complex::new(0.0, 0.0);
            for (i, &value) in input.iter().enumerate() {
                let twiddle = Complex::from_polar(1.0, constant * ((i * k) % len) as f64);
                let twiddle = match direction {
                    FftDirection::Forward => twiddle,
                    FftDirection::Inverse => twiddle.conj(),
                };
                sum += twiddle * value;
            }
            sum
        })
        .collect()
}

pub fn random_signal(length: usize) -> Vec<Complex<f64>> {
    let distribution = Uniform::new(0.0f64, 1.0);
    let mut rng: StdRng = SeedableRng::from_seed(RNG_SEED);
    (0..length)
        .map(|_| Complex {
            re: distribution.sample(&mut rng),
            im: distribution.sample(&mut rng),
        })
        .collect()
}

pub fn random_real_signal(length: usize) -> Vec<f64> {
    let distribution = Uniform::new(0.0f64, 1.0);
    let mut rng: StdRng = SeedableRng::from_seed(RNG_SEED);
    (0..length).map(|_| distribution.sample(&mut rng)).collect()
}

/// Runs a fragment on the given complex signal and returns the transformed
/// signal. Cells at `poisoned` indices are fed a sentinel instead of their
/// signal value, to prove the fragment never reads them.
pub fn run_on_signal(
    fragment: &Fragment,
    signal: &[Complex<f64>],
    poisoned_re: &[usize],
    poisoned_im: &[usize],
) -> Vec<Complex<f64>> {
    const SENTINEL: f64 = 1.0e30;
    let mut xr: Vec<f64> = signal.iter().map(|value| value.re).collect();
    let mut xi: Vec<f64> = signal.iter().map(|value| value.im).collect();
    for &index in poisoned_re {
        xr[index] = SENTINEL;
    }
    for &index in poisoned_im {
        xi[index] = SENTINEL;
    }
    fragment.run(&mut xr, &mut xi);
    xr.iter()
        .zip(xi.iter())
        .map(|(&re, &im)| Complex { re, im })
        .collect()
}

pub fn assert_close(actual: &[Complex<f64>], expected: &[Complex<f64>], tolerance: f64, context: &str) {
    assert_eq!(actual.len(), expected.len(), "{context}: length mismatch");
    for (index, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            (a.re - e.re).abs() <= tolerance && (a.im - e.im).abs() <= tolerance,
            "{context}: index {index}: got {a}, expected {e}"
        );
    }
}
