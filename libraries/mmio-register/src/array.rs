// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

use core::fmt;
use core::iter::FusedIterator;

use crate::{Block, OutOfBounds};

/// `N` register blocks of type `E` placed `stride` bytes apart.
///
/// The stride may be larger than the element, as with GPIO ports that each
/// occupy a 1 KiB window but only decode the first few registers. The first
/// element sits at the array's base address; element `i` sits at
/// `base + i * stride`.
// Safety invariant: `first` is a valid element, and so is every
// `first.byte_add(i * stride)` for `i < N`.
#[derive(Clone, Copy)]
pub struct RegisterArray<E: Block, const N: usize> {
    first: E,
    stride: usize,
}

impl<E: Block, const N: usize> RegisterArray<E, N> {
    /// Builds the array from its first element.
    ///
    /// # Panics
    /// If `stride` is smaller than an element (for more than one element),
    /// not a multiple of the element alignment, or so large that the span of
    /// the array does not fit in a `usize`. In a `const` context this is a
    /// compile error.
    ///
    /// # Safety
    /// `N` elements of type `E` must exist at `first.base() + i * stride`,
    /// so the last of them ends below the top of the address space.
    pub const unsafe fn new(first: E, stride: usize) -> Self {
        assert!(
            N <= 1 || stride >= E::SIZE,
            "array stride is smaller than its elements"
        );
        assert!(
            stride % E::ALIGN == 0,
            "array stride is not a multiple of the element alignment"
        );
        Self::span(stride);
        RegisterArray { first, stride }
    }

    /// Bytes from the first element's base to the end of the last element.
    const fn span(stride: usize) -> usize {
        if N == 0 {
            return 0;
        }
        match (N - 1).checked_mul(stride) {
            Some(last) => match last.checked_add(E::SIZE) {
                Some(span) => span,
                None => panic!("register array wraps the address space"),
            },
            None => panic!("register array wraps the address space"),
        }
    }

    /// Builds the array for elements starting at `base`, `stride` bytes
    /// apart, all reached through `bus`.
    ///
    /// # Panics
    /// As for [`new`](Self::new), and if the end of the last element does not
    /// fit in a `usize`.
    ///
    /// # Safety
    /// As for [`new`](Self::new).
    pub unsafe fn init_range(base: usize, stride: usize, bus: E::Bus) -> Self {
        assert!(
            base.checked_add(Self::span(stride)).is_some(),
            "register array wraps the address space"
        );
        Self::new(E::at(base, bus), stride)
    }

    /// Number of elements.
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Distance between consecutive elements, in bytes.
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Address of the first element.
    pub fn base(&self) -> usize {
        self.first.base()
    }

    /// Returns the `index`-th element of this array, or `None` if
    /// `index >= N`.
    pub fn get(&self, index: usize) -> Option<E> {
        if index >= N {
            return None;
        }
        Some(unsafe { self.get_unchecked(index) })
    }

    /// Returns the `index`-th element of this array, or [`OutOfBounds`].
    pub fn try_get(&self, index: usize) -> Result<E, OutOfBounds> {
        self.get(index).ok_or(OutOfBounds)
    }

    /// Returns the `index`-th element of this array.
    ///
    /// # Safety
    /// `index` must be less than `N`.
    pub unsafe fn get_unchecked(&self, index: usize) -> E {
        self.first.byte_add(index * self.stride)
    }

    /// Iterates over the elements in address order.
    pub fn iter(&self) -> Iter<E, N> {
        Iter {
            array: *self,
            front: 0,
            back: N,
        }
    }

    /// Base addresses of the elements, in order.
    pub fn addresses(&self) -> impl ExactSizeIterator<Item = usize> {
        let base = self.first.base();
        let stride = self.stride;
        (0..N).map(move |i| base + i * stride)
    }

    /// The same array shifted `offset` bytes up the address space.
    ///
    /// # Safety
    /// The shifted elements must be valid, as for [`new`](Self::new).
    pub unsafe fn byte_add(self, offset: usize) -> Self {
        RegisterArray {
            first: self.first.byte_add(offset),
            stride: self.stride,
        }
    }
}

impl<E: Block, const N: usize> fmt::Debug for RegisterArray<E, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterArray")
            .field("base", &format_args!("{:#x}", self.base()))
            .field("stride", &format_args!("{:#x}", self.stride))
            .field("len", &N)
            .finish()
    }
}

impl<E: Block, const N: usize> IntoIterator for RegisterArray<E, N> {
    type Item = E;
    type IntoIter = Iter<E, N>;

    fn into_iter(self) -> Iter<E, N> {
        self.iter()
    }
}

/// Iterator over the elements of a [`RegisterArray`].
#[derive(Clone)]
pub struct Iter<E: Block, const N: usize> {
    array: RegisterArray<E, N>,
    front: usize,
    back: usize,
}

impl<E: Block, const N: usize> Iterator for Iter<E, N> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        if self.front == self.back {
            return None;
        }
        let element = unsafe { self.array.get_unchecked(self.front) };
        self.front += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<E: Block, const N: usize> DoubleEndedIterator for Iter<E, N> {
    fn next_back(&mut self) -> Option<E> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { self.array.get_unchecked(self.back) })
    }
}

impl<E: Block, const N: usize> ExactSizeIterator for Iter<E, N> {}
impl<E: Block, const N: usize> FusedIterator for Iter<E, N> {}
