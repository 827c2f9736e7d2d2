//! "First successful of N": try interchangeable strategies in order until one succeeds.

/// Run `attempt` over `items` in order and return the first `Ok`.
///
/// When every item fails, returns the last error observed, or `None` when
/// `items` was empty.
pub fn first_ok<I, T, E, F>(items: I, mut attempt: F) -> Result<T, Option<E>>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Result<T, E>,
{
    let mut last_err = None;
    for item in items {
        match attempt(item) {
            Ok(v) => return Ok(v),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err)
}

/// Run `attempt` over `items` in order and return the first definite answer.
pub fn first_some<I, T, F>(items: I, mut attempt: F) -> Option<T>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Option<T>,
{
    items.into_iter().find_map(|item| attempt(item))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_ok_stops_at_first_success() {
        let mut seen = Vec::new();
        let r: Result<i32, Option<String>> = first_ok([1, 2, 3, 4], |n| {
            seen.push(n);
            if n == 3 {
                Ok(n * 10)
            } else {
                Err(format!("bad {n}"))
            }
        });
        assert_eq!(r, Ok(30));
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn first_ok_returns_last_error() {
        let r: Result<(), Option<String>> = first_ok(["a", "b"], |s| Err(format!("no {s}")));
        assert_eq!(r, Err(Some("no b".to_string())));
        let empty: Vec<&str> = Vec::new();
        let r: Result<(), Option<String>> = first_ok(empty, |_| Ok(()));
        assert_eq!(r, Err(None));
    }

    #[test]
    fn first_some_skips_none() {
        let r = first_some([None, Some(false), Some(true)], |v| v);
        assert_eq!(r, Some(false));
        let r: Option<bool> = first_some([None, None], |v| v);
        assert_eq!(r, None);
    }
}
