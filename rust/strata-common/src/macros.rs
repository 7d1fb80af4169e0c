/// Unwraps a `Result` inside a function returning `Option<Result<T, E>>`.
///
/// `Ok(t)` yields `t`; `Err(e)` makes the enclosing function return `Some(Err(e))`.
/// Handy in `Iterator::next()` of record and column iterators whose helpers
/// return plain `Result`s.
#[macro_export]
macro_rules! try_or_ret_some_err {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(err) => {
                return Some(Err(err));
            }
        }
    };
}
