//! Serializes access to the board for various environments.

/// The lock a [`JointIO`] adapter keeps its `Board` in. Every pin read, edge check and output
/// write-verify runs as one critical section under this lock, which keeps the output shadow mask
/// and the per-pin edge history single-writer.
///
/// Implementations are provided for `std::sync::Mutex` (feature `std`) and for
/// `cortex_m::interrupt::Mutex<core::cell::RefCell>` (feature `cortexm`). Either feature points
/// [`DefaultMutex<T>`] at the matching type. Without them, implement this trait for whatever lock
/// your platform has.
///
/// [`JointIO`]: ../board/io/struct.JointIO.html
pub trait BoardMutex<T> {
    /// Wrap `value` in a new lock.
    fn new(value: T) -> Self;

    /// Hold the lock for the duration of `f`, handing it the guarded value. Returns what `f`
    /// returns.
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R;
}

#[cfg(feature = "std")]
pub type DefaultMutex<T> = std::sync::Mutex<T>;

#[cfg(all(feature = "cortexm", not(feature = "std")))]
pub type DefaultMutex<T> = cortex_m::interrupt::Mutex<core::cell::RefCell<T>>;

#[cfg(feature = "std")]
impl<T> BoardMutex<T> for std::sync::Mutex<T> {
    fn new(value: T) -> Self {
        std::sync::Mutex::new(value)
    }

    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        // A panic inside a previous critical section leaves the board state intact; carry on.
        let mut guard = self.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut *guard)
    }
}

#[cfg(feature = "cortexm")]
impl<T> BoardMutex<T> for cortex_m::interrupt::Mutex<core::cell::RefCell<T>> {
    fn new(value: T) -> Self {
        cortex_m::interrupt::Mutex::new(core::cell::RefCell::new(value))
    }

    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        cortex_m::interrupt::free(|cs| f(&mut *self.borrow(cs).borrow_mut()))
    }
}
