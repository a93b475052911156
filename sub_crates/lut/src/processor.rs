use colorbox::lut::{Lut1D, Lut3D};
use rayon::prelude::*;

use crate::{ReadError, TransformError};

/// Buffers with at least this many RGB triples are processed in parallel.
const PARALLEL_THRESHOLD: usize = 1 << 14;

/// Something that can hand out a routine for transforming colors.
pub trait Processor: Send + Sync {
    /// The CPU routine at the default (full float) precision.
    fn default_cpu_processor(&self) -> Box<dyn CpuProcessor + '_>;
}

/// Transforms packed RGB buffers in place.
pub trait CpuProcessor {
    /// `buffer` is `[r, g, b, r, g, b, ...]`, and is overwritten with the
    /// transformed colors in the same layout.
    fn apply_rgb(&self, buffer: &mut [f32]) -> Result<(), TransformError>;
}

/// A single step of a LUT processor.
#[derive(Debug, Clone)]
pub enum LutOp {
    Lut1D(Lut1D),
    Lut3D(Lut3D),
}

impl LutOp {
    fn validate(&self) -> Result<(), ReadError> {
        match self {
            LutOp::Lut1D(lut) => {
                if lut.tables.is_empty() || lut.tables.iter().any(|t| t.is_empty()) {
                    return Err(ReadError::FormatErr);
                }
            }
            LutOp::Lut3D(lut) => {
                let len = lut.resolution[0] * lut.resolution[1] * lut.resolution[2];
                if len == 0 || lut.tables.is_empty() || lut.tables.iter().any(|t| t.len() < len)
                {
                    return Err(ReadError::FormatErr);
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn eval(&self, rgb: [f32; 3]) -> [f32; 3] {
        match self {
            LutOp::Lut1D(lut) => eval_1d(lut, rgb),
            LutOp::Lut3D(lut) => eval_3d(lut, rgb),
        }
    }
}

/// Applies a chain of LUTs, in order.
#[derive(Debug, Clone)]
pub struct LutProcessor {
    ops: Vec<LutOp>,
}

impl LutProcessor {
    /// Fails if any of the LUTs has missing or truncated tables.
    pub fn new(ops: Vec<LutOp>) -> Result<LutProcessor, ReadError> {
        for op in ops.iter() {
            op.validate()?;
        }
        Ok(LutProcessor { ops: ops })
    }

    pub fn ops(&self) -> &[LutOp] {
        &self.ops
    }

    pub fn eval(&self, rgb: [f32; 3]) -> [f32; 3] {
        self.ops.iter().fold(rgb, |rgb, op| op.eval(rgb))
    }
}

impl Processor for LutProcessor {
    fn default_cpu_processor(&self) -> Box<dyn CpuProcessor + '_> {
        Box::new(LutCpuProcessor { processor: self })
    }
}

struct LutCpuProcessor<'a> {
    processor: &'a LutProcessor,
}

impl<'a> CpuProcessor for LutCpuProcessor<'a> {
    fn apply_rgb(&self, buffer: &mut [f32]) -> Result<(), TransformError> {
        if buffer.len() % 3 != 0 {
            return Err(TransformError::BufferShape { len: buffer.len() });
        }

        let apply = |rgb: &mut [f32]| {
            let out = self.processor.eval([rgb[0], rgb[1], rgb[2]]);
            rgb.copy_from_slice(&out);
        };
        if buffer.len() / 3 >= PARALLEL_THRESHOLD {
            buffer.par_chunks_mut(3).for_each(apply);
        } else {
            buffer.chunks_mut(3).for_each(apply);
        }

        Ok(())
    }
}

//-------------------------------------------------------------

/// Maps `n` from `range` to [0, 1], clamping.
#[inline(always)]
fn normalize(n: f32, range: (f32, f32)) -> f32 {
    if range.1 <= range.0 {
        return 0.0;
    }
    ((n - range.0) / (range.1 - range.0)).max(0.0).min(1.0)
}

#[inline(always)]
fn lerp(a: f32, b: f32, alpha: f32) -> f32 {
    a + ((b - a) * alpha)
}

#[inline(always)]
fn lerp_slice(slice: &[f32], t: f32) -> f32 {
    let i1 = ((slice.len() - 1) as f32 * t) as usize;
    let alpha = ((slice.len() - 1) as f32 * t) - i1 as f32;

    if i1 >= (slice.len() - 1) {
        slice[slice.len() - 1]
    } else {
        lerp(slice[i1], slice[i1 + 1], alpha)
    }
}

fn eval_1d(lut: &Lut1D, rgb: [f32; 3]) -> [f32; 3] {
    let mut out = rgb;
    for chan in 0..3 {
        let table = &lut.tables[chan.min(lut.tables.len() - 1)];
        let range = if lut.ranges.is_empty() {
            (0.0, 1.0)
        } else {
            lut.ranges[chan.min(lut.ranges.len() - 1)]
        };
        out[chan] = lerp_slice(table, normalize(rgb[chan], range));
    }
    out
}

/// Trilinear interpolation.  Tables are laid out with the first
/// (red) axis varying fastest.
fn eval_3d(lut: &Lut3D, rgb: [f32; 3]) -> [f32; 3] {
    let res = lut.resolution;

    // Lattice cell and position within it, per axis.
    let mut lo = [0usize; 3];
    let mut hi = [0usize; 3];
    let mut alpha = [0.0f32; 3];
    for axis in 0..3 {
        let last = res[axis] - 1;
        let t = normalize(rgb[axis], lut.range[axis]) * last as f32;
        lo[axis] = (t as usize).min(last);
        hi[axis] = (lo[axis] + 1).min(last);
        alpha[axis] = t - lo[axis] as f32;
    }

    let idx = |r: usize, g: usize, b: usize| (((b * res[1]) + g) * res[0]) + r;

    let mut out = [0.0f32; 3];
    for chan in 0..3 {
        let table = &lut.tables[chan.min(lut.tables.len() - 1)];
        let c = |r: usize, g: usize, b: usize| table[idx(r, g, b)];

        let c00 = lerp(c(lo[0], lo[1], lo[2]), c(hi[0], lo[1], lo[2]), alpha[0]);
        let c10 = lerp(c(lo[0], hi[1], lo[2]), c(hi[0], hi[1], lo[2]), alpha[0]);
        let c01 = lerp(c(lo[0], lo[1], hi[2]), c(hi[0], lo[1], hi[2]), alpha[0]);
        let c11 = lerp(c(lo[0], hi[1], hi[2]), c(hi[0], hi[1], hi[2]), alpha[0]);

        let c0 = lerp(c00, c10, alpha[1]);
        let c1 = lerp(c01, c11, alpha[1]);
        out[chan] = lerp(c0, c1, alpha[2]);
    }
    out
}
