//! Full stack dumps for the `stack` field.

use crate::caller::walk_above;
use std::ffi::c_void;
use std::fmt::Write;

/// Append a readable dump of the calling thread's stack to `out`.
///
/// The dump starts with a `thread '<name>' (<id>):` header followed by one
/// entry per frame, innermost first, beginning with the function that
/// called this one:
///
/// ```text
/// my_app::handlers::process
/// 	/src/handlers.rs:42
/// ```
///
/// Inlined functions get their own entries. Frames that cannot be
/// symbolized are written as a bare address. There is no frame limit.
#[inline(never)]
pub fn capture_stack(out: &mut String) {
    let mut pcs = Vec::with_capacity(32);
    walk_above(capture_stack as usize, "stack::capture_stack", 0, |ip| {
        pcs.push(ip);
        true
    });

    let thread = std::thread::current();
    let _ = writeln!(
        out,
        "thread '{}' ({:?}):",
        thread.name().unwrap_or("<unnamed>"),
        thread.id()
    );
    for pc in pcs {
        write_frame(out, pc);
    }
}

fn write_frame(out: &mut String, pc: usize) {
    let mut resolved = false;
    if pc > 0 {
        backtrace::resolve((pc - 1) as *mut c_void, |symbol| {
            resolved = true;
            match symbol.name() {
                Some(name) => {
                    let _ = writeln!(out, "{:#}", name);
                }
                None => {
                    let _ = writeln!(out, "{:#x}", pc);
                }
            }
            if let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) {
                let _ = writeln!(out, "\t{}:{}", file.display(), line);
            }
        });
    }
    if !resolved {
        let _ = writeln!(out, "{:#x}", pc);
    }
}
