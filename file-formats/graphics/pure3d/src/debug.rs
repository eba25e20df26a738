//! Debug formatting helpers for payloads holding large arrays

use std::fmt;

const FIRST_N_ELEMENTS: usize = 3;

/// Print the first few elements of a collection followed by a count of the
/// rest. Enable the `debug-print-all` feature to print everything.
#[cfg(not(feature = "debug-print-all"))]
pub fn trimmed_collection_fmt<C, T>(items: &C, f: &mut fmt::Formatter) -> fmt::Result
where
    C: AsRef<[T]> + ?Sized,
    T: fmt::Debug,
{
    let items = items.as_ref();
    let shown = &items[..items.len().min(FIRST_N_ELEMENTS)];
    let hidden = items.len() - shown.len();

    if hidden == 0 {
        write!(f, "{:?}", shown)
    } else {
        write!(f, "{:?} + {} elements", shown, hidden)
    }
}

#[cfg(feature = "debug-print-all")]
pub fn trimmed_collection_fmt<C, T>(items: &C, f: &mut fmt::Formatter) -> fmt::Result
where
    C: AsRef<[T]> + ?Sized,
    T: fmt::Debug,
{
    write!(f, "{:?}", items.as_ref())
}
