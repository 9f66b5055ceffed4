//! Tests for address handling

use memtrace_core::types::Address;
use memtrace_core::WorkloadBuffer;

#[test]
fn test_address_from_u64()
{
    let addr = Address::from(0x1000);
    assert_eq!(addr.value(), 0x1000);
    let raw: u64 = addr.into();
    assert_eq!(raw, 0x1000);
}

#[test]
fn test_address_display_matches_pointer_format()
{
    assert_eq!(Address::new(0x55d0_c8a2_b2a0).to_string(), "0x55d0c8a2b2a0");
    assert_eq!(Address::ZERO.to_string(), "0x0");
}

#[test]
fn test_address_display_agrees_with_rust_pointer_format()
{
    let value = 42_i32;
    let ptr = std::ptr::from_ref(&value);
    assert_eq!(Address::from_ptr(ptr).to_string(), format!("{ptr:p}"));
}

#[test]
fn test_address_parse_hex_and_decimal()
{
    assert_eq!("0x1f".parse::<Address>().unwrap(), Address::new(31));
    assert_eq!("0X1F".parse::<Address>().unwrap(), Address::new(31));
    assert_eq!("4096".parse::<Address>().unwrap(), Address::new(4096));
    assert_eq!(" 0x10\n".parse::<Address>().unwrap(), Address::new(16));
}

#[test]
fn test_address_parse_rejects_garbage()
{
    let err = "0xzz".parse::<Address>().unwrap_err();
    assert!(err.to_string().contains("0xzz"));
    assert!("".parse::<Address>().is_err());
    assert!("0x".parse::<Address>().is_err());
}

#[test]
fn test_address_display_round_trips_through_parse()
{
    let buffer = WorkloadBuffer::new();
    let addr = buffer.address();
    assert_eq!(addr.to_string().parse::<Address>().unwrap(), addr);
}

#[test]
fn test_address_null()
{
    assert!(Address::ZERO.is_null());
    assert!(!WorkloadBuffer::new().address().is_null());
}
