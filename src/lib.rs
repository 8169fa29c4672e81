//! fftgen generates straight-line code that computes a Fast Fourier
//! Transform, or its inverse, of one fixed power-of-two size.
//!
//! The generated text is a bare fragment: a sequence of assignments that
//! operate in place on two arrays `xr` and `xi` holding the real and
//! imaginary components, using two scalar temporaries `tr` and `ti`. The
//! fragment declares nothing itself, so the embedding code chooses the
//! element type. Every loop is unrolled, every twiddle factor is folded into
//! the statements as a literal constant, and every multiplication by 0 or
//! +-1, along with every summand that is provably zero, is removed at
//! generation time.
//!
//! ### Usage
//!
//! ```
//! use fftgen::{FftDirection, Generator, Options};
//!
//! let generator = Generator::new(Options::new(8, FftDirection::Forward)).unwrap();
//! let code = generator.generate_to_string();
//!
//! assert!(code.contains("xr[1] = xr[0] - tr;"));
//! ```
//!
//! ### Optimization flags
//!
//! The flags on [`Options`] let the generator assume properties of the input
//! or output sequence and drop every operation those properties make
//! obsolete:
//!
//! - [`real_input`](Options::real_input): all imaginary input values are
//!   zero. The imaginary array need not be initialized.
//! - [`symmetric_output`](Options::symmetric_output): the caller only needs
//!   result indices `0..=n/2`. The remaining cells are left with arbitrary
//!   values; for real input they follow from `x[i] = conj(x[n-i])`.
//! - [`symmetric_input`](Options::symmetric_input): the input is symmetric
//!   around `n/2` in the same conjugate sense, as the result of a transform
//!   of real data is. Cells above `n/2` need not be initialized.
//! - [`real_output`](Options::real_output): the result is known to be real,
//!   as for an inverse transform of a conjugate-symmetric sequence. The
//!   imaginary result cells are left with arbitrary values.
//!
//! An inverse transform leaves the result scaled by `n`; the embedding code
//! divides by `n` to recover the usual normalization.

use std::error;
use std::fmt;
use std::io::{self, Write};

mod butterflies;
mod format;
mod permutation;
mod twiddles;

use format::NumberFormat;

/// Direction of the generated transform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FftDirection {
    Forward,
    Inverse,
}

impl fmt::Display for FftDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => f.write_str("Forward"),
            Self::Inverse => f.write_str("Inverse"),
        }
    }
}

/// Configuration for one generation run.
#[derive(Clone, Debug)]
pub struct Options {
    /// Number of data points. Must be a power of two.
    pub size: usize,
    pub direction: FftDirection,
    /// Assume all imaginary input values are zero.
    pub real_input: bool,
    /// Assume all imaginary result values are zero.
    pub real_output: bool,
    /// Assume the input sequence is conjugate-symmetric around `size / 2`.
    pub symmetric_input: bool,
    /// Only produce result values up to and including index `size / 2`.
    pub symmetric_output: bool,
    /// printf-style conversion spec for the twiddle constants.
    pub number_format: String,
    /// Prefix for every emitted statement.
    pub indent: String,
}

impl Options {
    pub fn new(size: usize, direction: FftDirection) -> Self {
        Options {
            size,
            direction,
            real_input: false,
            real_output: false,
            symmetric_input: false,
            symmetric_output: false,
            number_format: "%21.14e".to_owned(),
            indent: String::new(),
        }
    }
}

/// Errors detected while validating [`Options`].
#[derive(Clone, PartialEq, Eq)]
pub enum GenError {
    /// The number of data points is zero or not a power of two.
    SizeNotPowerOfTwo(usize),
    /// The number format spec is not a supported printf-style conversion.
    InvalidNumberFormat(String),
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeNotPowerOfTwo(size) => {
                write!(f, "number of points {} is not a power of two", size)
            }
            Self::InvalidNumberFormat(spec) => {
                write!(f, "invalid number format \"{}\"", spec)
            }
        }
    }
}

impl fmt::Debug for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl error::Error for GenError {}

/// A validated generator for one configuration.
///
/// Generation runs in two steps: the bit-reversal permutation is planned and
/// emitted first, then the butterfly stages are emitted with all constants
/// folded. The two blocks are separated by one blank line, which is all a
/// size-1 run produces.
pub struct Generator {
    options: Options,
    format: NumberFormat,
}

impl Generator {
    /// Validates the options. The size must be a power of two (size 1 is
    /// accepted and generates an empty fragment), and the number format must
    /// be a printf-style floating-point conversion.
    pub fn new(options: Options) -> Result<Self, GenError> {
        if !options.size.is_power_of_two() {
            return Err(GenError::SizeNotPowerOfTwo(options.size));
        }
        let format = NumberFormat::parse(&options.number_format)
            .ok_or_else(|| GenError::InvalidNumberFormat(options.number_format.clone()))?;
        Ok(Generator { options, format })
    }

    /// Writes the generated fragment to `output`.
    ///
    /// Identical options produce byte-identical output.
    pub fn generate<W: Write>(&self, output: &mut W) -> io::Result<()> {
        let plan = permutation::plan(self.options.size, self.options.symmetric_input);
        permutation::emit(output, &plan, &self.options)?;
        writeln!(output)?;
        butterflies::emit(output, &self.options, &self.format)
    }

    /// Convenience wrapper collecting the fragment into a `String`.
    pub fn generate_to_string(&self) -> String {
        let mut output = Vec::new();
        self.generate(&mut output)
            .expect("writing into a Vec never fails");
        String::from_utf8(output).expect("generated code is plain ASCII")
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}
