//! Call-site lookup for the `caller` field.

use std::ffi::c_void;
use std::path::Path;

/// Size of the program-counter scratch array used per lookup.
pub const MAX_CALLER_FRAMES: usize = 10;

/// Resolve `"<file basename>:<line>"` for the frame `skip` levels above
/// the function calling this one (`skip == 0` is that function itself).
///
/// Program counters are captured into `pcs`, which the caller owns; give
/// each call its own array (a stack array of [`MAX_CALLER_FRAMES`] is
/// plenty) so concurrent lookups never share scratch space.
///
/// Without line tables (a release build with `debug = false`) the frame
/// is named by its demangled function path instead; set
/// `debug = "line-tables-only"` in the profile to keep `file:line`.
/// Returns an empty string if the frame does not exist or cannot be
/// symbolized at all.
#[inline(never)]
pub fn resolve_caller(skip: usize, pcs: &mut [usize]) -> String {
    let captured = capture_pcs(
        resolve_caller as usize,
        "caller::resolve_caller",
        skip,
        pcs,
    );
    if captured == 0 {
        return String::new();
    }
    call_site(pcs[0]).unwrap_or_default()
}

/// Walk the stack and store the instruction pointers of the frames found
/// `skip` levels above the anchor function into `pcs`.
///
/// The anchor is matched by start address, falling back to its symbol
/// name on platforms that cannot report one.
pub(crate) fn capture_pcs(
    anchor: usize,
    anchor_name: &str,
    skip: usize,
    pcs: &mut [usize],
) -> usize {
    let mut count = 0;
    walk_above(anchor, anchor_name, skip, |ip| {
        if count == pcs.len() {
            return false;
        }
        pcs[count] = ip;
        count += 1;
        count < pcs.len()
    });
    count
}

/// Call `visit` with each instruction pointer above the anchor frame,
/// after skipping `skip` of them, until it returns `false`.
pub(crate) fn walk_above(
    anchor: usize,
    anchor_name: &str,
    skip: usize,
    mut visit: impl FnMut(usize) -> bool,
) {
    let mut found = false;
    let mut skipped = 0;
    backtrace::trace(|frame| {
        if !found {
            found = frame.symbol_address() as usize == anchor || names_match(frame, anchor_name);
            return true;
        }
        if skipped < skip {
            skipped += 1;
            return true;
        }
        visit(frame.ip() as usize)
    });
}

fn names_match(frame: &backtrace::Frame, anchor_name: &str) -> bool {
    let mut matched = false;
    backtrace::resolve_frame(frame, |symbol| {
        if let Some(name) = symbol.name() {
            matched |= symbol_text(&name).map_or(false, |text| text.ends_with(anchor_name));
        }
    });
    matched
}

/// Resolve a return address to the source line of the call instruction,
/// or to the enclosing function's name when there is no line table.
///
/// The saved address points just past the call, so one is subtracted
/// before the lookup.
pub(crate) fn call_site(pc: usize) -> Option<String> {
    if pc == 0 {
        return None;
    }
    let mut location = None;
    let mut function = None;
    backtrace::resolve((pc - 1) as *mut c_void, |symbol| {
        if location.is_some() {
            return;
        }
        location = describe(symbol.filename(), symbol.lineno(), None);
        if function.is_none() {
            function = symbol.name().and_then(|name| symbol_text(&name));
        }
    });
    location.or_else(|| describe(None, None, function))
}

/// `basename:line` when both are known, otherwise the function name.
fn describe(file: Option<&Path>, line: Option<u32>, function: Option<String>) -> Option<String> {
    match (file, line) {
        (Some(file), Some(line)) => Some(format!("{}:{}", base_name(file), line)),
        _ => function.filter(|name| !name.is_empty()),
    }
}

/// Demangled symbol name without its hash; `None` if formatting fails.
pub(crate) fn symbol_text(name: &backtrace::SymbolName<'_>) -> Option<String> {
    use std::fmt::Write;

    let mut text = String::new();
    write!(text, "{:#}", name).ok()?;
    Some(text)
}

pub(crate) fn base_name(file: &Path) -> String {
    file.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string_lossy().into_owned())
}
