///
/// A builder for a sub-object, configured while its parent builder waits.
///
/// The child owns its parent `P` for the duration of the detour. Calling `and()` hands the
/// child's in-progress section back to the parent and returns the parent, so that building
/// can continue one level up. `and()` never builds the child: the parent builds each section
/// when it is built itself.
///
/// ## Example
///
/// ```
/// use httpstub::{Method, NestedBuilder, StatusCode, StubCommand};
///
/// let command = StubCommand::builder()
///     .request()
///         .method(Method::GET)
///         .path("/hello")
///     .and()
///     .response()
///         .status(StatusCode::ACCEPTED)
///     .and()
///     .build();
///
/// assert_eq!(Some("/hello"), command.request().and_then(|r| r.path()));
/// ```
///
pub trait NestedBuilder<P>: Sized {
    /// The type produced by this builder.
    type Output;

    ///
    /// Builds and returns the configured object.
    ///
    fn build(&self) -> Self::Output;

    ///
    /// Returns to the parent builder to continue building the parent object.
    ///
    fn and(self) -> P;
}

///
/// Implemented by parent builders that keep one in-progress section of type `S`.
///
/// A nested builder calls `reattach` from `and()`, storing its state in the parent's slot so
/// that the next request for the same section resumes where it left off.
///
pub trait Reattach<S> {
    /// Stores `section` as the parent's in-progress section, replacing the previous one.
    fn reattach(&mut self, section: S);
}

///
/// A parent that discards whatever is handed back. Lets a section builder be used on its own.
///
impl<S> Reattach<S> for () {
    fn reattach(&mut self, _section: S) {}
}
