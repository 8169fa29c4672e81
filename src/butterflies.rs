//! Emission of the unrolled butterfly stages.
//!
//! For every butterfly the four conceptual statements are
//!
//! ```text
//! tr = wr*xr[jj] - wi*xi[jj];
//! ti = wr*xi[jj] + wi*xr[jj];
//! xr[jj] = xr[ii] - tr;   xi[jj] = xi[ii] - ti;
//! xr[ii] += tr;           xi[ii] += ti;
//! ```
//!
//! The emitter specializes each of them against the classified twiddle
//! components and against a per-cell record of which imaginary parts are
//! still provably zero. A summand whose coefficient classifies to zero, or
//! whose operand is a provably zero cell, is dropped; when a whole
//! right-hand side collapses to zero the dependent statements collapse too.

use std::io::{self, Write};

use crate::format::NumberFormat;
use crate::twiddles::{self, Classifier, Coefficient};
use crate::Options;

pub(crate) fn emit<W: Write>(
    output: &mut W,
    options: &Options,
    format: &NumberFormat,
) -> io::Result<()> {
    let n = options.size;
    if n < 2 {
        return Ok(());
    }

    let mut emitter = Emitter {
        output,
        options,
        format,
        // all imaginary cells start provably zero when the input is real
        imag_nonzero: vec![!options.real_input; n],
    };

    let classifier = Classifier::for_size(n);
    let mut k = 1;
    while k < n {
        let istep = 2 * k;
        let last_stage = istep == n;

        for m in 0..k {
            let w = twiddles::compute_twiddle(m, istep, options.direction);
            let wr = classifier.classify(w.re);
            let wi = classifier.classify(w.im);

            for ii in (m..n).step_by(istep) {
                emitter.butterfly(ii, ii + k, wr, wi, last_stage)?;
            }
        }
        k = istep;
    }
    Ok(())
}

struct Emitter<'a, W> {
    output: &'a mut W,
    options: &'a Options,
    format: &'a NumberFormat,
    imag_nonzero: Vec<bool>,
}

impl<W: Write> Emitter<'_, W> {
    fn butterfly(
        &mut self,
        ii: usize,
        jj: usize,
        wr: Coefficient,
        wi: Coefficient,
        last_stage: bool,
    ) -> io::Result<()> {
        let n = self.options.size;
        let real_out_stage = self.options.real_output && last_stage;

        // tr = wr*xr[jj] - wi*xi[jj], with the second summand dead whenever
        // xi[jj] is provably zero
        let second = if self.imag_nonzero[jj] { wi } else { Coefficient::Zero };
        let tr_zero = self.sum("tr", wr, &format!("xr[{jj}]"), second, &format!("xi[{jj}]"), true)?;

        // ti = wr*xi[jj] + wi*xr[jj], skipped entirely when the final stage
        // is known to produce a real-only result
        let ti_zero = if real_out_stage {
            false
        } else {
            let first = if self.imag_nonzero[jj] { wr } else { Coefficient::Zero };
            self.sum("ti", first, &format!("xi[{jj}]"), wi, &format!("xr[{jj}]"), false)?
        };

        if !(self.options.symmetric_output && last_stage && jj != n / 2) {
            if !tr_zero {
                self.line(&format!("xr[{jj}] = xr[{ii}] - tr;"))?;
            } else {
                self.line(&format!("xr[{jj}] = xr[{ii}];"))?;
            }

            if !real_out_stage {
                if !ti_zero {
                    if self.imag_nonzero[ii] {
                        self.line(&format!("xi[{jj}] = xi[{ii}] - ti;"))?;
                    } else {
                        self.line(&format!("xi[{jj}] = - ti;"))?;
                    }
                    self.imag_nonzero[jj] = true;
                } else if self.imag_nonzero[ii] {
                    self.line(&format!("xi[{jj}] = xi[{ii}];"))?;
                    self.imag_nonzero[jj] = true;
                } else if self.options.real_input && last_stage {
                    // never touched, but the caller expects valid zeros in
                    // the imaginary output cells
                    self.line(&format!("xi[{jj}] = 0.0;"))?;
                }
            }
        }

        if !tr_zero {
            self.line(&format!("xr[{ii}] += tr;"))?;
        }
        if !real_out_stage {
            if !ti_zero {
                if self.imag_nonzero[ii] {
                    self.line(&format!("xi[{ii}] += ti;"))?;
                } else {
                    self.line(&format!("xi[{ii}] = ti;"))?;
                    self.imag_nonzero[ii] = true;
                }
            } else if self.options.real_input && last_stage {
                self.line(&format!("xi[{ii}] = 0.0;"))?;
            }
        }

        Ok(())
    }

    /// Emits `lhs = first_coeff*first_operand +- second_coeff*second_operand;`
    /// with every dead or trivial part folded away. When `negate_second` is
    /// set the second summand enters the sum as its negation, which is how
    /// `- wi*xi[jj]` is expressed.
    ///
    /// Returns true when both summands are dead and the statement was elided
    /// entirely.
    fn sum(
        &mut self,
        lhs: &str,
        first: Coefficient,
        first_operand: &str,
        second: Coefficient,
        second_operand: &str,
        negate_second: bool,
    ) -> io::Result<bool> {
        let mut line = format!("{}{} =", self.options.indent, lhs);
        let mut have_first = true;
        match first {
            Coefficient::Zero => have_first = false,
            Coefficient::PlusOne => line.push_str(&format!(" {first_operand}")),
            Coefficient::MinusOne => line.push_str(&format!(" -{first_operand}")),
            Coefficient::Generic(value) => {
                line.push_str(&format!(" {}*{first_operand}", self.format.format(value)))
            }
        }

        let effective = match (second, negate_second) {
            (Coefficient::PlusOne, true) => Coefficient::MinusOne,
            (Coefficient::MinusOne, true) => Coefficient::PlusOne,
            (Coefficient::Generic(value), true) => Coefficient::Generic(-value),
            (other, _) => other,
        };
        match effective {
            Coefficient::Zero => {
                if !have_first {
                    return Ok(true);
                }
            }
            // A +-1 second coefficient only arises with a zero first one,
            // so no connective is ever needed before these forms.
            Coefficient::PlusOne => {
                if have_first {
                    line.push_str(&format!(" + {second_operand}"));
                } else {
                    line.push_str(&format!(" {second_operand}"));
                }
            }
            Coefficient::MinusOne => line.push_str(&format!(" - {second_operand}")),
            Coefficient::Generic(value) => {
                if have_first {
                    if value >= 0.0 {
                        line.push_str(&format!(" + {}*{second_operand}", self.format.format(value)));
                    } else {
                        line.push_str(&format!(" - {}*{second_operand}", self.format.format(-value)));
                    }
                } else {
                    line.push_str(&format!(" {}*{second_operand}", self.format.format(value)));
                }
            }
        }

        line.push(';');
        writeln!(self.output, "{}", line)?;
        Ok(false)
    }

    fn line(&mut self, statement: &str) -> io::Result<()> {
        writeln!(self.output, "{}{}", self.options.indent, statement)
    }
}
