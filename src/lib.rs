//! Record a fixed-function GLES renderer's frames as replayable C source.
//!
//! The renderer calls the `qgl*` entry points on this crate's `Qgl` type
//! instead of calling GL directly. `Qgl` forwards every call, unchanged, to
//! a `Backend`, which wraps whatever driver the platform provides. When
//! recording is turned on, it also writes each frame out as a set of C
//! files that, built against a small replay harness, reissue the frame's
//! draws with no game attached: vertex data, textures and all. This makes
//! it possible to chase driver bugs with a few self-contained programs.
//!
//! Recording is controlled from the environment; see
//! `RecordConfig::from_env`. Nothing the recorder does can change the calls
//! the driver sees. When the recorder can't make sense of something, it
//! reports a `Diagnostic`, logs a warning, and leaves that call out of the
//! recording.

pub mod backend;
pub mod call;
pub mod config;
pub mod consts;
pub mod diag;
pub mod draw;
pub mod dump;
pub mod files;
pub mod qgl;
pub mod recorder;
pub mod state;
pub mod symbol;
pub mod texture;
mod write_image;

pub use backend::{Backend, Null, Trace};
pub use call::DriverCall;
pub use config::RecordConfig;
pub use diag::{Diagnostic, Error};
pub use files::{Files, Memory, Storage};
pub use qgl::Qgl;
pub use recorder::{Recorder, Stream};
