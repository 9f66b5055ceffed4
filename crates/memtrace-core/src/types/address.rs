//! Memory address type.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Strongly typed memory address
///
/// Wraps a `u64` so an address printed for the harness cannot be mixed up
/// with a cell value or an iteration count.
///
/// `Display` renders the address the way C's `%p` does on glibc: a `0x`
/// prefix and lowercase hex with no padding. `FromStr` accepts that form as
/// well as plain decimal, so a harness can turn the workload info line back
/// into an `Address`.
///
/// ## Example
///
/// ```rust
/// use memtrace_core::types::Address;
///
/// let addr: Address = "0x7f3a1c000b70".parse()?;
/// assert_eq!(addr.value(), 0x7f3a_1c00_0b70);
/// assert_eq!(addr.to_string(), "0x7f3a1c000b70");
/// # Ok::<(), memtrace_core::types::ParseAddressError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Address a pointer refers to
    ///
    /// Only the numeric address is kept; the result cannot be turned back
    /// into a pointer.
    pub fn from_ptr<T>(ptr: *const T) -> Self
    {
        Address(ptr as usize as u64)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Whether this is the null address
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{:#x}", self.0)
    }
}

/// Error returned when text is not a hex (`0x...`) or decimal address
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address {input:?}: {source}")]
pub struct ParseAddressError
{
    input: String,
    #[source]
    source: ParseIntError,
}

impl FromStr for Address
{
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let trimmed = s.trim();
        let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => trimmed.parse(),
        };
        parsed.map(Address).map_err(|source| ParseAddressError {
            input: s.to_string(),
            source,
        })
    }
}
