/// Receives events from a running solver and optionally steers it.
///
/// Solvers call [`Observer::observe`] with a solver-specific event `E` and act
/// on the returned action `A`, if any. Returning `None` lets the solver carry
/// on with its default behavior.
///
/// The unit type `()` is a no-op observer, and any `FnMut(&E) -> Option<A>`
/// closure is an observer.
pub trait Observer<E, A> {
    /// Handles an event and returns an optional action for the solver.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}
