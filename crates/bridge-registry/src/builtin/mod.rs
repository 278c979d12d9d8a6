//! Tools shipped with the bridge binary.
//!
//! | Tool             | Screening | Effect                                   |
//! |------------------|-----------|------------------------------------------|
//! | `run_command`    | command   | Spawns a program directly, no shell      |
//! | `read_file`      | path      | Reads a UTF-8 file, capped at 1 MiB      |
//! | `list_directory` | path      | Lists entries, directories end in `/`    |
//! | `system_info`    | none      | OS, arch, hostname, working directory    |
//!
//! Deployments that need other capabilities build their own descriptor list;
//! the registry does not care where descriptors come from.

mod fs;
mod shell;
mod system;

pub use fs::{ListDirectory, ReadFile, MAX_READ_BYTES};
pub use shell::{RunCommand, COMMAND_TIMEOUT, MAX_OUTPUT_BYTES};
pub use system::SystemInfo;

use crate::descriptor::ToolDescriptor;

/// The default tool set, in listing order.
pub fn default_tools() -> Vec<ToolDescriptor> {
    vec![
        shell::descriptor(),
        fs::read_file_descriptor(),
        fs::list_directory_descriptor(),
        system::descriptor(),
    ]
}

/// Cut `text` to at most `max` bytes on a char boundary, appending a marker
/// when anything was dropped.
pub(crate) fn truncate_utf8(mut text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }
    let mut cut = max;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text.push_str("\n[output truncated]");
    text
}
