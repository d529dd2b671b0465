use core::ops::Deref;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::power::{Bus, Line};
use crate::registers::{Address, RegisterBlock, Registers};

/// A trait for SPI peripherals.
#[allow(private_bounds)]
pub trait Instance: InstanceSealed + Registers {
    /// The name of the peripheral, used in Debug instances.
    const NAME: &'static str;

    /// The clock and reset line owned by this peripheral.
    const LINE: Line;
}

/// A trait for SPI peripherals.
pub(crate) trait InstanceSealed {}

// the two blocks are identical apart from where they live
macro_rules! instance_impl {
    {$(($dev:ident, $address:literal, $bus:ident, $bit:literal)),+,} => {
        $(
            #[doc = concat!("The ", stringify!($dev), " peripheral.")]
            pub struct $dev {
                _marker: core::marker::PhantomData<*const ()>,
            }

            // safety: the registers are only reachable through the owner
            unsafe impl Send for $dev {}

            impl $dev {
                /// Pointer to the register block.
                pub const PTR: *const RegisterBlock = $address as usize as *const RegisterBlock;

                /// Get this peripheral without checking if it already exists.
                ///
                /// # Safety
                /// This will duplicate access to the registers unless
                /// the other handle is known to not exist.
                #[inline(always)]
                pub unsafe fn steal() -> Self {
                    Self {
                        _marker: Default::default(),
                    }
                }
            }

            impl Deref for $dev {
                type Target = RegisterBlock;

                #[inline(always)]
                fn deref(&self) -> &Self::Target {
                    // safety: this address is a valid block for the
                    // lifetime of the device
                    unsafe { &*Self::PTR }
                }
            }

            impl Registers for $dev {
                #[inline(always)]
                fn read_raw(&self, address: Address) -> u16 {
                    (**self).read_raw(address)
                }

                #[inline(always)]
                fn write_raw(&self, address: Address, value: u16) {
                    (**self).write_raw(address, value)
                }
            }

            impl core::fmt::Debug for $dev {
                fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                    f.write_str(stringify!($dev))
                }
            }

            #[cfg(feature = "defmt")]
            impl defmt::Format for $dev {
                fn format(&self, f: defmt::Formatter) {
                    defmt::write!(f, "{}", stringify!($dev));
                }
            }

            impl InstanceSealed for $dev {}

            impl Instance for $dev {
                const NAME: &'static str = stringify!($dev);
                const LINE: Line = Line::new(Bus::$bus, $bit);
            }
        )+

        /// All SPI peripherals on the chip.
        #[allow(non_snake_case)]
        #[derive(Debug)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub struct Peripherals {
            $(pub $dev: $dev),+
        }

        impl Peripherals {
            /// Get all the peripherals without checking if they were
            /// already taken.
            ///
            /// # Safety
            /// See [SPI1::steal()].
            #[inline(always)]
            pub unsafe fn steal() -> Self {
                TAKEN.store(true, Ordering::Relaxed);
                Self {
                    $($dev: $dev::steal()),+
                }
            }
        }
    };
}

instance_impl! {
    (SPI1, 0x4001_3000, Apb2, 12),
    (SPI2, 0x4000_3800, Apb1, 14),
}

static TAKEN: AtomicBool = AtomicBool::new(false);

impl Peripherals {
    /// Get all the peripherals, once. Returns [None] on every later call.
    #[inline]
    pub fn take() -> Option<Self> {
        critical_section::with(|_| {
            if TAKEN.load(Ordering::Relaxed) {
                None
            } else {
                // safety: this is the first and only take
                Some(unsafe { Self::steal() })
            }
        })
    }
}
