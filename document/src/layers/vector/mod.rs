mod bezier;
mod subpath;

pub use bezier::{Bezier, BezierHandles};
pub use subpath::{ManipulatorGroup, Subpath, SubpathIter};
