//! Planning and emission of the bit-reversal stage.
//!
//! The planner produces an ordered list of swaps. In the default mode the
//! order is simply the order in which the decrement-carry scheme discovers
//! the pairs. When the input is promised to be symmetric around `n/2`, cells
//! above `n/2` are never read directly: each such read is redirected to the
//! reflected cell (with the imaginary part negated), and the swap list is
//! reordered so every redirected source is read before anything overwrites
//! it.

use std::io::{self, Write};

use crate::Options;

/// One exchange of the bit-reversal permutation. `m < mr` always holds.
///
/// When `mirrored` is set the exchange is emitted as two direct copies that
/// read from `src_m` and `src_mr`, the reflections of any source above
/// `n/2`, instead of exchanging through a temporary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Swap {
    pub m: usize,
    pub mr: usize,
    pub src_m: usize,
    pub src_mr: usize,
    pub mirrored: bool,
}

/// The planned bit-reversal stage: seed assignments first, then swaps in
/// list order.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Plan {
    /// Cells above `n/2` that no swap touches. They are never initialized by
    /// the caller in symmetric mode, so they are filled from their
    /// reflections before any swap runs.
    pub seeds: Vec<usize>,
    pub swaps: Vec<Swap>,
}

pub(crate) fn plan(n: usize, symmetric_input: bool) -> Plan {
    let mut swaps: Vec<Swap> = Vec::new();
    let half = n / 2;

    let mut mr = 0usize;
    for m in 1..n {
        let mut k = n;
        loop {
            k /= 2;
            if mr + k <= n - 1 {
                break;
            }
        }
        mr = mr % k + k;
        if mr <= m {
            continue;
        }

        if !symmetric_input || (m <= half && mr <= half) {
            swaps.push(Swap {
                m,
                mr,
                src_m: m,
                src_mr: mr,
                mirrored: false,
            });
            continue;
        }

        let src_m = if m > half { n - m } else { m };
        let src_mr = if mr > half { n - mr } else { mr };
        let swap = Swap {
            m,
            mr,
            src_m,
            src_mr,
            mirrored: true,
        };

        // Find the already-listed swap that will overwrite each redirected
        // source. Bit-reversal pairs are disjoint, so each source index can
        // occur in at most one listed swap. List position 0 is never a
        // dependency in practice; the scan treats a hit there as "none".
        let find_writer = |source: usize| -> usize {
            for j in (1..swaps.len()).rev() {
                if swaps[j].m == source || swaps[j].mr == source {
                    return j;
                }
            }
            0
        };
        let hit_m = if m > half { find_writer(src_m) } else { 0 };
        let hit_mr = if mr > half { find_writer(src_mr) } else { 0 };

        let slot = match (hit_m > 0, hit_mr > 0) {
            (true, true) => hit_m.min(hit_mr),
            (true, false) => hit_m,
            _ => hit_mr,
        };
        if slot > 0 {
            swaps.insert(slot, swap);
        } else {
            swaps.push(swap);
        }
    }

    let mut seeds = Vec::new();
    if symmetric_input {
        for i in half + 1..n {
            if !swaps.iter().any(|swap| swap.m == i || swap.mr == i) {
                seeds.push(i);
            }
        }
    }

    Plan { seeds, swaps }
}

pub(crate) fn emit<W: Write>(output: &mut W, plan: &Plan, options: &Options) -> io::Result<()> {
    let n = options.size;
    let half = n / 2;
    let indent = &options.indent;

    for &i in &plan.seeds {
        writeln!(output, "{indent}xr[{i}] =  xr[{}];", n - i)?;
        writeln!(output, "{indent}xi[{i}] = -xi[{}];", n - i)?;
    }

    for swap in &plan.swaps {
        if !swap.mirrored {
            writeln!(output, "{indent}tr = xr[{}];", swap.m)?;
            writeln!(output, "{indent}xr[{}] = xr[{}];", swap.m, swap.mr)?;
            writeln!(output, "{indent}xr[{}] = tr;", swap.mr)?;
            if !options.real_input {
                writeln!(output, "{indent}ti = xi[{}];", swap.m)?;
                writeln!(output, "{indent}xi[{}] = xi[{}];", swap.m, swap.mr)?;
                writeln!(output, "{indent}xi[{}] = ti;", swap.mr)?;
            }
        } else {
            writeln!(output, "{indent}xr[{}] = xr[{}];", swap.mr, swap.src_m)?;
            writeln!(output, "{indent}xr[{}] = xr[{}];", swap.m, swap.src_mr)?;
            if !options.real_input {
                // Reading a reflected cell means taking the conjugate, so
                // the copy negates whenever the source was redirected.
                if swap.m <= half {
                    writeln!(output, "{indent}xi[{}] = xi[{}];", swap.mr, swap.src_m)?;
                } else {
                    writeln!(output, "{indent}xi[{}] = -xi[{}];", swap.mr, swap.src_m)?;
                }
                if swap.mr <= half {
                    writeln!(output, "{indent}xi[{}] = xi[{}];", swap.m, swap.src_mr)?;
                } else {
                    writeln!(output, "{indent}xi[{}] = -xi[{}];", swap.m, swap.src_mr)?;
                }
            }
        }
    }

    Ok(())
}
