//! Command-line front end for the generator.
//!
//! Writes the generated code to stdout; every diagnostic goes to stderr.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::{ArgAction, Parser};

use fftgen::{FftDirection, Generator, Options};

/// Note placed at the top of the generated code when `--license` is given.
const LICENSE_TEXT: &str = "\
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation; either version 3 of the license, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program, see file COPYING. If not, see https://www.gnu.org/licenses/.
";

#[derive(Parser, Debug)]
#[command(
    name = "fftgen",
    version,
    about = "Generate code to compute an FFT or IFFT",
    after_help = "The generated code is written to stdout. It requires the embedding code to\n\
                  define two arrays xr[] and xi[] of the chosen number of points and two\n\
                  scalar temporaries tr and ti, all of the same floating point type."
)]
struct Cli {
    /// Number of data points, must be a power of two
    #[arg(short = 'n', long = "points", value_name = "NUMBER")]
    points: usize,

    /// Generate code for an inverse FFT
    #[arg(short, long)]
    inverse: bool,

    /// Optimize assuming the imaginary input values are all zero
    #[arg(short = 'r', long = "real-in-opt")]
    real_in_opt: bool,

    /// Optimize assuming the imaginary result values are all zero
    #[arg(short = 'o', long = "real-out-opt")]
    real_out_opt: bool,

    /// Optimize assuming the input sequence is symmetrical around n/2
    #[arg(short = 'm', long = "symm-in-opt")]
    symm_in_opt: bool,

    /// Optimize assuming the result sequence is symmetrical around n/2
    #[arg(short = 's', long = "symm-out-opt")]
    symm_out_opt: bool,

    /// Write a GPL 3 note at the beginning of the generated code
    #[arg(short, long)]
    license: bool,

    /// Increase verbosity level; verbose output is directed to stderr
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn to_options(&self) -> Options {
        let direction = if self.inverse {
            FftDirection::Inverse
        } else {
            FftDirection::Forward
        };
        let mut options = Options::new(self.points, direction);
        options.real_input = self.real_in_opt;
        options.real_output = self.real_out_opt;
        options.symmetric_input = self.symm_in_opt;
        options.symmetric_output = self.symm_out_opt;
        options
    }

    fn echo_configuration(&self) {
        eprintln!("Number of points {}", self.points);
        if self.inverse {
            eprintln!("Generating code for inverse FFT");
        } else {
            eprintln!("Generating code for standard (not inverse) FFT");
        }
        if self.real_in_opt {
            eprintln!("Optimize for real only input");
        }
        if self.real_out_opt {
            eprintln!("Optimize for real only output");
        }
        if self.symm_in_opt {
            eprintln!("Optimize for symmetry at input");
        }
        if self.symm_out_opt {
            eprintln!("Optimize for symmetry at output");
        }
        if self.license {
            eprintln!("Include a GPL 3 note into the code");
        }
    }
}

fn write_output<W: Write>(cli: &Cli, generator: &Generator, output: &mut W) -> io::Result<()> {
    if cli.license {
        output.write_all(LICENSE_TEXT.as_bytes())?;
    }
    generator.generate(output)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.verbose > 0 {
        cli.echo_configuration();
    }

    let generator = match Generator::new(cli.to_options()) {
        Ok(generator) => generator,
        Err(error) => {
            eprintln!("fftgen: {}", error);
            eprintln!("Try 'fftgen --help' for more information.");
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());
    if let Err(error) = write_output(&cli, &generator, &mut output).and_then(|_| output.flush()) {
        // a closed stdout pipe is not worth a diagnostic
        if error.kind() == io::ErrorKind::BrokenPipe {
            return ExitCode::SUCCESS;
        }
        eprintln!("fftgen: error writing output: {}", error);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
