//! Walking inputs and writing rendered output.
//!
//! A [`RenderJob`] takes an ordered list of input paths. Files are rendered
//! individually; directories are walked depth first and mirrored under the
//! output destination, one level of output directory per level of input.
//!
//! | Output | Input file `in/a.txt.tpl` | Input dir `in/` holding `a.txt.tpl` |
//! |--------|---------------------------|-------------------------------------|
//! | `-` | stdout | stdout |
//! | `out/` | `out/a.txt` | `out/in/a.txt` |
//! | `out` (existing dir) | `out/a.txt` | `out/in/a.txt` |
//! | `out.txt` | `out.txt` | `out.txt/in/a.txt` |
//!
//! Several inputs rendered into the same file are appended in input order.

mod job;
mod output;

pub use job::{RenderJob, RenderReport, RenderedInput, SkippedInput};
pub use output::{map_output, strip_template_suffix, OutputBase, OutputTarget};
