//! Fallible result carrier with an explicit error default.

/// Value that is either a result `R` or an error `E`.
///
/// Unlike [`Result`], the default state is an error with `E::default()`,
/// which makes the type usable as a field that starts out "not yet
/// produced". Constructors are named rather than conversion-based so the
/// discriminant stays deterministic even when `R` and `E` are the same or
/// mutually convertible type; distinct `R` and `E` are still recommended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<R, E> {
    /// A produced result.
    Success(R),
    /// An error, or the not-yet-produced default state.
    Failure(E),
}

impl<R, E> Outcome<R, E> {
    /// Wraps a result.
    #[inline]
    pub fn success(result: R) -> Self {
        Outcome::Success(result)
    }

    /// Wraps an error.
    #[inline]
    pub fn failure(error: E) -> Self {
        Outcome::Failure(error)
    }

    /// Whether this outcome holds an error.
    #[inline]
    pub fn has_error(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// The result, if present.
    #[inline]
    pub fn get(&self) -> Option<&R> {
        match self {
            Outcome::Success(result) => Some(result),
            Outcome::Failure(_) => None,
        }
    }

    /// The error, if present.
    #[inline]
    pub fn get_error(&self) -> Option<&E> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    /// Converts into a standard [`Result`].
    #[inline]
    pub fn into_result(self) -> Result<R, E> {
        match self {
            Outcome::Success(result) => Ok(result),
            Outcome::Failure(error) => Err(error),
        }
    }
}

impl<R: Clone, E> Outcome<R, E> {
    /// Returns a copy of the result.
    ///
    /// # Panics
    /// Panics when the outcome holds an error; check
    /// [`has_error`](Outcome::has_error) first.
    #[inline]
    pub fn result(&self) -> R {
        match self {
            Outcome::Success(result) => result.clone(),
            Outcome::Failure(_) => panic!("result() called on an error outcome"),
        }
    }
}

impl<R, E: Clone + Default> Outcome<R, E> {
    /// Returns a copy of the error, or `E::default()` when the outcome holds
    /// a result, so inspecting the error slot of a success is harmless.
    #[inline]
    pub fn error(&self) -> E {
        match self {
            Outcome::Success(_) => E::default(),
            Outcome::Failure(error) => error.clone(),
        }
    }
}

/// The default outcome is the error state.
impl<R, E: Default> Default for Outcome<R, E> {
    fn default() -> Self {
        Outcome::Failure(E::default())
    }
}

impl<R, E> From<Result<R, E>> for Outcome<R, E> {
    fn from(result: Result<R, E>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => Outcome::Failure(error),
        }
    }
}
