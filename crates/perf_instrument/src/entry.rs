//! Interceptable collaborator entry points

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// A collaborator's public entry point that instrumentation can decorate.
///
/// The collaborator calls through [`get`](Self::get) on every use, so a
/// wrapper installed with [`intercept`](Self::intercept) sees every later
/// call. Intercepting twice stacks two wrappers.
///
/// # Example
///
/// ```rust
/// use perf_instrument::EntryPoint;
/// use std::rc::Rc;
///
/// let double: Rc<dyn Fn(i32) -> i32> = Rc::new(|x| x * 2);
/// let entry = EntryPoint::new("double", double);
///
/// entry.intercept(|inner| {
///     let plus_one: Rc<dyn Fn(i32) -> i32> = Rc::new(move |x| inner(x) + 1);
///     plus_one
/// });
/// assert_eq!(entry.get()(5), 11);
/// ```
pub struct EntryPoint<F: ?Sized> {
    name: &'static str,
    current: RefCell<Rc<F>>,
    interceptions: Cell<usize>,
}

impl<F: ?Sized> EntryPoint<F> {
    /// Create an entry point that initially calls `target`.
    pub fn new(name: &'static str, target: Rc<F>) -> Self {
        Self {
            name,
            current: RefCell::new(target),
            interceptions: Cell::new(0),
        }
    }

    /// Name of the entry point, e.g. `"setTimeout"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The function currently installed.
    pub fn get(&self) -> Rc<F> {
        Rc::clone(&self.current.borrow())
    }

    /// Replace the installed function with `wrap(installed)`.
    pub fn intercept(&self, wrap: impl FnOnce(Rc<F>) -> Rc<F>) {
        let wrapped = wrap(self.get());
        *self.current.borrow_mut() = wrapped;
        self.interceptions.set(self.interceptions.get() + 1);
        tracing::debug!(
            target: "perf::instrument",
            entry = self.name,
            layers = self.interceptions.get(),
            "entry point intercepted"
        );
    }

    /// Install `target` outright, returning the previous function.
    pub fn replace(&self, target: Rc<F>) -> Rc<F> {
        self.interceptions.set(self.interceptions.get() + 1);
        self.current.replace(target)
    }

    /// How many times this entry point has been decorated or replaced.
    pub fn interception_count(&self) -> usize {
        self.interceptions.get()
    }
}

impl<F: ?Sized> fmt::Debug for EntryPoint<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint")
            .field("name", &self.name)
            .field("interceptions", &self.interceptions.get())
            .finish()
    }
}
