//! Filesystem helpers: atomic writes, temporary names and directories.

pub mod atomic;
pub mod dir;
pub mod temp;

pub use atomic::{
    backup_file, open_atomic, with_atomic, write_atomic, write_atomic_with, AtomicFile,
    AtomicWriteOptions,
};
pub use dir::{mkdir_p, with_momentary_chdir, MomentaryChdir};
pub use temp::{with_temp_file_name, TempFileName};
