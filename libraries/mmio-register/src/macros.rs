// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Macros for cleanly defining peripheral registers.
//!
//! [`register_bitfields!`](crate::register_bitfields) declares register
//! layouts, and [`peripheral!`](crate::peripheral) places registers at fixed
//! offsets inside a peripheral's register block:
//!
//! ```rust
//! use mmio_register::interfaces::{ReadWriteable, Readable};
//! use mmio_register::mmio_emu::EmulatedBus;
//! use mmio_register::{peripheral, register_bitfields, Raw, ReadOnly, ReadWrite};
//!
//! register_bitfields![u32,
//!     Control [
//!         EN OFFSET(0) NUMBITS(1) [],
//!         RES OFFSET(1) NUMBITS(31) []
//!     ]
//! ];
//!
//! peripheral! {
//!     pub Uart {
//!         (0x00 => control: ReadWrite<u32, Control::Register>),
//!         (0x04 => data: ReadOnly<u32, Raw<u32>>),
//!         (0x08 => @END),
//!     }
//! }
//!
//! # fn main() {
//! let bus = EmulatedBus::new();
//! let uart = unsafe { Uart::with_bus(0x4001_1000, &bus) };
//! uart.control.modify(Control::EN::SET);
//! assert_eq!(bus.peek::<u32>(0x4001_1000), 1);
//! assert_eq!(uart.data.address(), 0x4001_1004);
//! # }
//! ```

/// Declares register layouts.
///
/// Each register becomes a module holding a `Register` layout marker, a
/// [`Field`](crate::Field) constant per bitfield, and per bitfield a module
/// with `SET`, `CLEAR`, one [`FieldValue`](crate::FieldValue) per named value,
/// and an `enum Value` usable with
/// [`read_as_enum`](crate::interfaces::Readable::read_as_enum).
///
/// Fields must tile the register word exactly: overlapping fields, fields
/// past the word and bits not covered by any field are compile errors.
/// `RESET(v)` gives a field's value after reset (default `0`), which
/// [`write_fields`](crate::interfaces::Writeable::write_fields) uses for the
/// fields it does not name.
///
/// ```rust
/// use mmio_register::register_bitfields;
///
/// register_bitfields![u8,
///     /// Line control
///     Lcr [
///         /// Word length
///         WLS OFFSET(0) NUMBITS(2) RESET(3) [
///             FiveBits = 0,
///             SixBits = 1,
///             SevenBits = 2,
///             EightBits = 3
///         ],
///         STOP OFFSET(2) NUMBITS(1) [],
///         RESERVED OFFSET(3) NUMBITS(5) []
///     ]
/// ];
///
/// # fn main() {
/// use mmio_register::{BitLayout, LocalRegisterCopy};
///
/// assert_eq!(<Lcr::Register as BitLayout>::RESET, 0b011);
/// let lcr = LocalRegisterCopy::<u8, Lcr::Register>::new(0b110);
/// assert_eq!(
///     lcr.read_as_enum::<Lcr::WLS::Value>(Lcr::WLS),
///     Some(Lcr::WLS::Value::SevenBits)
/// );
/// assert!(lcr.is_set(Lcr::STOP));
/// # }
/// ```
#[macro_export]
macro_rules! register_bitfields {
    (@register $valtype:ident, [$(#[$attr:meta])*] $reg:ident [
        $(
            $(#[$fattr:meta])*
            $field:ident OFFSET($off:expr) NUMBITS($width:expr) $(RESET($reset:expr))? [
                $($values:tt)*
            ]
        ),* $(,)?
    ]) => {
        $(#[$attr])*
        #[allow(non_snake_case)]
        #[allow(dead_code)]
        pub mod $reg {
            /// Layout of the register.
            #[derive(Clone, Copy, Debug)]
            pub struct Register;

            impl $crate::BitLayout for Register {
                type Word = $valtype;
                const NAME: &'static str = ::core::stringify!($reg);
                const FIELDS: &'static [$crate::FieldInfo] = &[
                    $(
                        $crate::FieldInfo::new(
                            ::core::stringify!($field),
                            $off,
                            $width,
                            $crate::register_bitfields!(@reset $($reset)?),
                        ),
                    )*
                ];
                const RESET: $valtype = $crate::layout::reset_value(
                    <Register as $crate::BitLayout>::FIELDS,
                ) as $valtype;
            }

            const _: () = $crate::layout::check_layout(
                <$valtype>::BITS as usize,
                <Register as $crate::BitLayout>::FIELDS,
            );

            $(
                $crate::register_bitfields!(
                    @field $valtype, [$(#[$fattr])*] $field, $off, $width, [$($values)*]
                );
            )*
        }
    };

    (@reset) => { 0 };
    (@reset $reset:expr) => { ($reset) as u64 };

    (@field $valtype:ident, [$(#[$fattr:meta])*] $field:ident, $off:expr, $width:expr, [
        $($(#[$vattr:meta])* $vname:ident = $vval:expr),* $(,)?
    ]) => {
        $(#[$fattr])*
        #[allow(non_upper_case_globals)]
        pub const $field: $crate::Field<$valtype, Register> =
            $crate::Field::<$valtype, Register>::with_width($off, $width);

        $(#[$fattr])*
        #[allow(non_snake_case)]
        #[allow(non_upper_case_globals)]
        pub mod $field {
            use super::Register;

            /// Every bit of the field set.
            pub const SET: $crate::FieldValue<$valtype, Register> =
                $crate::FieldValue::<$valtype, Register>::new(
                    super::$field.mask,
                    $off,
                    super::$field.mask,
                );

            /// Every bit of the field cleared.
            pub const CLEAR: $crate::FieldValue<$valtype, Register> =
                $crate::FieldValue::<$valtype, Register>::new(super::$field.mask, $off, 0);

            $(
                $(#[$vattr])*
                pub const $vname: $crate::FieldValue<$valtype, Register> =
                    $crate::FieldValue::<$valtype, Register>::new(super::$field.mask, $off, $vval);
            )*

            #[allow(non_camel_case_types)]
            #[derive(Copy, Clone, Debug, Eq, PartialEq)]
            pub enum Value {
                $(
                    $(#[$vattr])*
                    $vname,
                )*
            }

            impl $crate::TryFromValue<$valtype> for Value {
                type EnumType = Value;

                fn try_from_value(v: $valtype) -> ::core::option::Option<Value> {
                    match v {
                        $(x if x == $vval => ::core::option::Option::Some(Value::$vname),)*
                        _ => ::core::option::Option::None,
                    }
                }
            }

            impl ::core::convert::From<Value> for $crate::FieldValue<$valtype, Register> {
                fn from(v: Value) -> Self {
                    match v {
                        $(Value::$vname => $vname,)*
                    }
                }
            }
        }
    };

    {
        $valtype:ident, $( $(#[$attr:meta])* $reg:ident $fields:tt ),* $(,)?
    } => {
        $(
            $crate::register_bitfields!(@register $valtype, [$(#[$attr])*] $reg $fields);
        )*
    };
}

/// Declares the register block of a peripheral.
///
/// Every register is listed with its byte offset from the block's base,
/// followed by an `@END` marker giving the block size:
///
/// ```text
/// peripheral! {
///     pub Name {
///         (offset => field: Handle<Word, Layout>),
///         (offset => field: [Handle<Word, Layout>; N]),
///         (offset => field: OtherPeripheral),
///         (offset => field: [OtherPeripheral; N]),
///         (size => @END),
///     }
/// }
/// ```
///
/// The generated `Name<B = Mmio>` struct has one public field per register:
/// a handle, a nested peripheral, or a [`RegisterArray`](crate::RegisterArray)
/// of contiguous elements. It is constructed with the `const` functions
/// `Name::new(base)` (memory bus) and `Name::with_bus(base, bus)`, and
/// implements [`Block`](crate::Block) so that it can itself be nested or
/// arrayed.
///
/// Offsets must be ascending, aligned to their register width and must not
/// overlap; registers must fit before `@END`. Violations are compile errors:
///
/// ```compile_fail
/// use mmio_register::{peripheral, ReadWrite};
///
/// peripheral! {
///     pub Broken {
///         (0x00 => ctrl: ReadWrite<u32>),
///         (0x02 => status: ReadWrite<u32>),
///         (0x08 => @END),
///     }
/// }
/// # fn main() {}
/// ```
#[macro_export]
macro_rules! peripheral {
    (@munch [$($head:tt)*] [$($done:tt)*] ($end:expr => @END) $(,)?) => {
        $crate::peripheral!(@emit [$($head)*] [$end] [$($done)*]);
    };
    (@munch [$($head:tt)*] [$($done:tt)*]
        $(#[$fattr:meta])* ($off:expr => $field:ident : [$elem:ty; $n:expr]), $($rest:tt)*
    ) => {
        $crate::peripheral!(@munch [$($head)*] [
            $($done)* { $(#[$fattr])* $field : array [$off] [$elem] [$n] }
        ] $($rest)*);
    };
    (@munch [$($head:tt)*] [$($done:tt)*]
        $(#[$fattr:meta])* ($off:expr => $field:ident : $ty:ty), $($rest:tt)*
    ) => {
        $crate::peripheral!(@munch [$($head)*] [
            $($done)* { $(#[$fattr])* $field : single [$off] [$ty] }
        ] $($rest)*);
    };

    (@emit [$(#[$attr:meta])* $vis:vis $name:ident] [$end:expr] [
        $({ $(#[$fattr:meta])* $field:ident : $($kind:tt)* })*
    ]) => {
        $(#[$attr])*
        $vis struct $name<B: ::core::marker::Copy = $crate::Mmio> {
            $(
                $(#[$fattr])*
                pub $field: $crate::peripheral!(@ty B; $($kind)*),
            )*
            block_base: usize,
        }

        impl $name<$crate::Mmio> {
            /// Creates the register block at `base` on the memory bus.
            ///
            /// # Safety
            /// See [`with_bus`](Self::with_bus).
            pub const unsafe fn new(base: usize) -> Self {
                Self::with_bus(base, $crate::Mmio)
            }
        }

        impl<B: ::core::marker::Copy> $name<B> {
            /// Creates the register block at `base`, reached through `bus`.
            ///
            /// # Safety
            /// A register block of this layout must exist at `base` on `bus`
            /// for as long as the value, or any copy of it, is used.
            #[allow(unused_variables)]
            pub const unsafe fn with_bus(base: usize, bus: B) -> Self {
                $name {
                    $($field: $crate::peripheral!(@init base, bus, B; $($kind)*),)*
                    block_base: base,
                }
            }
        }

        impl<B: ::core::marker::Copy> ::core::clone::Clone for $name<B> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<B: ::core::marker::Copy> ::core::marker::Copy for $name<B> {}

        impl<B: ::core::marker::Copy> ::core::fmt::Debug for $name<B> {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_struct(::core::stringify!($name))
                    .field("base", &::core::format_args!("{:#x}", self.block_base))
                    .finish()
            }
        }

        impl<B: ::core::marker::Copy> $crate::Block for $name<B> {
            type Bus = B;
            const SIZE: usize = $end;
            const ALIGN: usize = $crate::block::max_align(&[
                $($crate::peripheral!(@align $($kind)*),)*
            ]);

            fn base(&self) -> usize {
                self.block_base
            }

            unsafe fn at(address: usize, bus: B) -> Self {
                Self::with_bus(address, bus)
            }

            unsafe fn byte_add(self, offset: usize) -> Self {
                #[allow(unused_imports)]
                use $crate::Block as _;
                $name {
                    $($field: self.$field.byte_add(offset),)*
                    block_base: self.block_base + offset,
                }
            }
        }

        impl<B0: ::core::marker::Copy, B: ::core::marker::Copy> $crate::block::WithBus<B>
            for $name<B0>
        {
            type Output = $name<B>;
        }

        const _: () = $crate::block::check_block(
            &[$($crate::peripheral!(@layout $($kind)*),)*],
            $end,
        );
    };

    (@ty $bus:ident; single [$off:expr] [$ty:ty]) => {
        <$ty as $crate::block::WithBus<$bus>>::Output
    };
    (@ty $bus:ident; array [$off:expr] [$elem:ty] [$n:expr]) => {
        $crate::RegisterArray<<$elem as $crate::block::WithBus<$bus>>::Output, { $n }>
    };

    (@init $base:ident, $bus:ident, $b:ident; single [$off:expr] [$ty:ty]) => {
        <<$ty as $crate::block::WithBus<$b>>::Output>::with_bus($base + $off, $bus)
    };
    (@init $base:ident, $bus:ident, $b:ident; array [$off:expr] [$elem:ty] [$n:expr]) => {
        $crate::RegisterArray::new(
            <<$elem as $crate::block::WithBus<$b>>::Output>::with_bus($base + $off, $bus),
            <<$elem as $crate::block::WithBus<$b>>::Output as $crate::Block>::SIZE,
        )
    };

    (@layout single [$off:expr] [$ty:ty]) => {
        (
            $off,
            <$ty as $crate::Block>::SIZE,
            <$ty as $crate::Block>::ALIGN,
        )
    };
    (@layout array [$off:expr] [$elem:ty] [$n:expr]) => {
        (
            $off,
            $n * <$elem as $crate::Block>::SIZE,
            <$elem as $crate::Block>::ALIGN,
        )
    };

    (@align single [$off:expr] [$ty:ty]) => { <$ty as $crate::Block>::ALIGN };
    (@align array [$off:expr] [$elem:ty] [$n:expr]) => { <$elem as $crate::Block>::ALIGN };

    {
        $(#[$attr:meta])*
        $vis:vis $name:ident {
            $($body:tt)*
        }
    } => {
        $crate::peripheral!(@munch [$(#[$attr])* $vis $name] [] $($body)*);
    };
}
