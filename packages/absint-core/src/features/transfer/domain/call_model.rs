//! The external call model table (spec.md §4.12): known libc/libc++
//! intrinsics the transfer function recognizes by name and gives a
//! precise effect to, instead of falling back to "forget everything".

/// What a modeled external call does to the numerical/pointer state,
/// independent of how many arguments it actually takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEffect {
    /// Allocates fresh memory; the return value is a pointer to a new
    /// location, sized by one of the call's arguments (`malloc(n)`,
    /// `operator new(n)`) or by `count * elem_size` (`calloc`).
    Allocates { size_arg: SizeArg },
    /// Frees a location; no effect on the numerical state (`free`,
    /// `operator delete`, `__cxa_free_exception`).
    Deallocates,
    /// Copies `n` bytes from argument 1 into argument 0 and returns
    /// argument 0 unchanged (`memcpy`, `memmove`, `strcpy`-family treated
    /// as an unbounded copy).
    Copies,
    /// Writes argument 1's low byte across `n` bytes of argument 0 and
    /// returns argument 0 (`memset`).
    Fills,
    /// Scans argument 0 and returns a length/position; the result is a
    /// non-negative integer bounded above by the source's allocated size
    /// when known (`strlen`, `memchr`-as-found-index).
    Searches,
    /// Returns argument 0 verbatim, a pure alias with no other effect
    /// (`strdup`'s pointer identity modeled conservatively as alias;
    /// `__cxa_begin_catch`).
    AliasesArg0,
    /// Reads/writes the thread-local `errno` cell (modeled as the
    /// `libc_errno` memory location from the memory-location factory).
    TouchesErrno,
    /// Unwinds the stack; never returns normally (`__cxa_throw`,
    /// `abort`, `exit`).
    NoReturn,
    /// Recognized but deliberately unmodeled beyond "forget the return
    /// value and any out-parameters" (`__cxa_allocate_exception`,
    /// `__cxa_rethrow`).
    Opaque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeArg {
    /// `size_arg[0]` is the byte count directly.
    Bytes(usize),
    /// `size_arg[0] * size_arg[1]` (the `calloc(count, elem_size)` shape).
    CountTimesElemSize(usize, usize),
}

/// Looks up a called function's name in the model table. Returns `None`
/// for anything not recognized, which the transfer function treats as an
/// ordinary (unmodeled) external call: forget the return value, forget
/// every points-to target reachable through a pointer argument.
pub fn lookup(name: &str) -> Option<CallEffect> {
    Some(match name {
        "malloc" | "_Znwm" | "_Znam" => CallEffect::Allocates { size_arg: SizeArg::Bytes(0) },
        "calloc" => CallEffect::Allocates {
            size_arg: SizeArg::CountTimesElemSize(0, 1),
        },
        "realloc" => CallEffect::Allocates { size_arg: SizeArg::Bytes(1) },
        "free" | "_ZdlPv" | "_ZdaPv" | "__cxa_free_exception" => CallEffect::Deallocates,
        "memcpy" | "memmove" | "strcpy" | "strcat" => CallEffect::Copies,
        "memset" => CallEffect::Fills,
        "strlen" | "strnlen" => CallEffect::Searches,
        "strdup" | "__cxa_begin_catch" => CallEffect::AliasesArg0,
        "__errno_location" => CallEffect::TouchesErrno,
        "abort" | "exit" | "_exit" | "__cxa_throw" | "__assert_fail" => CallEffect::NoReturn,
        "__cxa_allocate_exception" | "__cxa_rethrow" | "__cxa_end_catch" => CallEffect::Opaque,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malloc_is_modeled_as_an_allocation_sized_by_its_first_argument() {
        assert_eq!(lookup("malloc"), Some(CallEffect::Allocates { size_arg: SizeArg::Bytes(0) }));
    }

    #[test]
    fn calloc_sizes_by_count_times_element_size() {
        assert_eq!(
            lookup("calloc"),
            Some(CallEffect::Allocates {
                size_arg: SizeArg::CountTimesElemSize(0, 1)
            })
        );
    }

    #[test]
    fn an_unrecognized_symbol_is_not_modeled() {
        assert_eq!(lookup("some_app_specific_function"), None);
    }
}
