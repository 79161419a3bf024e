use std::fmt;

use crate::raw_buf::RawBuf;
use crate::StackError;

/// A LIFO container over a single contiguous, exclusively owned buffer.
///
/// Storage grows by doubling, so `n` pushes cost O(n) element moves in
/// total. `pop` and `clear` only move the logical length; the buffer never
/// shrinks. A popped value stays in its slot until a later push overwrites
/// it or the stack is dropped, so element release may be deferred but
/// happens exactly once.
pub struct Stack<T> {
    buf: RawBuf<T>,
    len: usize,
    /// Constructed high-water mark: slots `[0, init)` hold values, those in
    /// `[len, init)` logically dead. `len <= init <= capacity`.
    init: usize,
}

// The raw-pointer storage suppresses the auto impls; ownership semantics
// are those of `Vec<T>`.
unsafe impl<T: Send> Send for Stack<T> {}
unsafe impl<T: Sync> Sync for Stack<T> {}

impl<T> Stack<T> {
    /// Returns a new empty stack; no allocation is performed.
    pub const fn new() -> Self {
        Self {
            buf: RawBuf::dangling(),
            len: 0,
            init: 0,
        }
    }

    /// Returns a new empty stack with `capacity` slots reserved. A zero
    /// `capacity` behaves as [`new`](Self::new) and does not allocate.
    ///
    /// # Returns
    ///  * `Ok(stack)` with the requested capacity, none of it in use
    ///  * `Err(StackError::Allocation)` when the buffer cannot be obtained
    pub fn with_capacity(capacity: usize) -> Result<Self, StackError> {
        if capacity == 0 {
            return Ok(Self::new());
        }
        Ok(Self {
            buf: RawBuf::allocate(capacity)?,
            len: 0,
            init: 0,
        })
    }

    #[inline(always)]
    /// Returns the number of live elements
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    /// Returns the number of allocated slots, occupied or not
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline(always)]
    /// Returns `true` if the stack holds no live element
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forgets the logical content. The buffer and capacity are kept; the
    /// old values stay in their slots until overwritten by later pushes or
    /// the stack is dropped.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Pushes `value` as the new top element, growing the buffer when it
    /// is full.
    ///
    /// # Returns
    ///  * `Ok(())` with `value` on top
    ///  * `Err(StackError::Allocation)` when growth fails; the stack is
    ///    left unchanged and `value` is dropped
    /// # Complexity
    ///  * O(1) amortized
    pub fn push(&mut self, value: T) -> Result<(), StackError> {
        if self.len == self.buf.capacity() {
            self.grow()?;
        }
        unsafe {
            let slot = self.buf.as_ptr().add(self.len);
            if self.len < self.init {
                // reusing a dead slot, the stale value drops here
                *slot = value;
            } else {
                std::ptr::write(slot, value);
                self.init += 1;
            }
        }
        self.len += 1;
        Ok(())
    }

    /// Removes the top element. Tolerated on an empty stack, where it does
    /// nothing. Capacity is kept, and the removed value is not dropped
    /// until its slot is reused or the stack goes away.
    pub fn pop(&mut self) {
        if self.len != 0 {
            self.len -= 1;
        }
    }

    /// # Returns
    ///  * `Ok(top)` the most recently pushed element when `!self.is_empty()`
    ///  * `Err(StackError::Empty)` when `self.is_empty()`
    pub fn top(&self) -> Result<&T, StackError> {
        if self.len == 0 {
            Err(StackError::Empty)
        } else {
            Ok(unsafe { &*self.buf.as_ptr().add(self.len - 1) })
        }
    }

    /// Mutable variant of [`top`](Self::top), for changing the top element
    /// in place.
    pub fn top_mut(&mut self) -> Result<&mut T, StackError> {
        if self.len == 0 {
            Err(StackError::Empty)
        } else {
            Ok(unsafe { &mut *self.buf.as_ptr().add(self.len - 1) })
        }
    }

    /// Doubles the buffer, or creates a 1-slot buffer for a stack that
    /// never held one. The old buffer is released only after the new one
    /// is in place, so a failed allocation leaves the stack untouched.
    fn grow(&mut self) -> Result<(), StackError> {
        // only called with a full buffer, where the dead band is empty
        debug_assert!(self.len == self.buf.capacity() && self.init == self.len);
        let old_cap = self.buf.capacity();
        let new_cap = if old_cap == 0 {
            1
        } else {
            old_cap.checked_mul(2).ok_or(StackError::Allocation)?
        };
        let new_buf = RawBuf::allocate(new_cap)?;
        log::trace!("stack buffer grown from {old_cap} to {new_cap} slots");
        unsafe {
            std::ptr::copy_nonoverlapping(self.buf.as_ptr(), new_buf.as_ptr(), self.len);
        }
        // the values moved, the old RawBuf only returns its memory
        self.buf = new_buf;
        Ok(())
    }
}

impl<T: Clone> Stack<T> {
    /// Duplicates the logical content of `self`.
    ///
    /// The copy's buffer is sized to the element count, so spare capacity
    /// does not survive duplication; an empty source yields an empty,
    /// unallocated copy whatever its own capacity.
    ///
    /// # Returns
    ///  * `Ok(copy)` holding the same elements in the same order
    ///  * `Err(StackError::Allocation)` when the buffer cannot be obtained
    pub fn try_clone(&self) -> Result<Self, StackError> {
        if self.len == 0 {
            return Ok(Self::new());
        }
        let mut copy = Self {
            buf: RawBuf::allocate(self.len)?,
            len: 0,
            init: 0,
        };
        for i in 0..self.len {
            unsafe {
                std::ptr::write(
                    copy.buf.as_ptr().add(i),
                    (*self.buf.as_ptr().add(i)).clone(),
                );
            }
            copy.init = i + 1;
        }
        copy.len = self.len;
        Ok(copy)
    }

    /// Replaces the logical content of `self` with a copy of `rhs`'s.
    ///
    /// Grows the buffer to exactly `rhs.len()` slots when the current
    /// capacity is short, and never shrinks it. On allocation failure the
    /// receiver's prior content is left intact.
    ///
    /// # Returns
    ///  * `Ok(&mut self)`, so assignments can be chained
    ///  * `Err(StackError::Allocation)` when the buffer cannot be obtained
    pub fn assign(&mut self, rhs: &Self) -> Result<&mut Self, StackError> {
        if self.buf.capacity() < rhs.len {
            let new_buf = RawBuf::allocate(rhs.len)?;
            log::trace!(
                "stack buffer grown from {} to {} slots for assignment",
                self.buf.capacity(),
                rhs.len
            );
            unsafe {
                // carry the constructed prefix over, every slot of it is
                // overwritten below
                std::ptr::copy_nonoverlapping(self.buf.as_ptr(), new_buf.as_ptr(), self.init);
            }
            self.buf = new_buf;
        }
        for i in 0..rhs.len {
            let value = unsafe { (*rhs.buf.as_ptr().add(i)).clone() };
            unsafe {
                let slot = self.buf.as_ptr().add(i);
                if i < self.init {
                    *slot = value;
                } else {
                    std::ptr::write(slot, value);
                    self.init = i + 1;
                }
            }
        }
        self.len = rhs.len;
        Ok(self)
    }
}

impl<T> Drop for Stack<T> {
    fn drop(&mut self) {
        for i in 0..self.init {
            unsafe { std::ptr::drop_in_place(self.buf.as_ptr().add(i)) };
        }
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Stack<T> {
    /// Panics when the allocation fails; use
    /// [`try_clone`](Self::try_clone) to observe the failure instead.
    fn clone(&self) -> Self {
        self.try_clone().expect("stack clone allocation failed")
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign(source)
            .expect("stack clone_from allocation failed");
    }
}

impl<T> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("len", &self.len)
            .field("capacity", &self.buf.capacity())
            .finish_non_exhaustive()
    }
}
