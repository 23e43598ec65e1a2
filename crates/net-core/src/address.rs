//! IPv4/IPv6 address and netmask arithmetic
//!
//! Pure helpers over `Ipv4Addr`/`Ipv6Addr`, plus MAC address and DNS search
//! domain validation and the natural ("lexicographic-numeric") ordering used
//! to sort interface names so that `eth2` comes before `eth10`.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

use ipnet::{Ipv4Net, Ipv6Net};
use regex::Regex;

use crate::error::{AddressError, NetworkError};
use crate::Result;

/// Maximum length of a search domain; leaves room for a one letter label
/// in front of it within a 253 character FQDN
pub const MAX_SEARCH_DOMAIN_LEN: usize = 251;

/// Maximum length of a single DNS label
pub const MAX_DOMAIN_LABEL_LEN: usize = 63;

/// Parse an IPv4 address with `inet_aton` semantics
///
/// Components may be decimal, octal (leading `0`) or hexadecimal (`0x`).
/// With fewer than four components the last one fills all remaining
/// low-order bytes: `"1.16383"` is `1.0.63.255` and `"1"` is `0.0.0.1`.
///
/// Stricter than glibc `inet_aton`, which stops at the first whitespace and
/// ignores what follows: `"1.2.3.4 x"` is rejected here.
pub fn parse_ipv4(s: &str) -> Result<Ipv4Addr> {
    let invalid = || {
        NetworkError::from(AddressError::InvalidIpv4 {
            value: s.to_string(),
        })
    };

    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() > 4 {
        return Err(invalid());
    }

    let values = parts
        .iter()
        .map(|part| parse_aton_component(part))
        .collect::<Option<Vec<u32>>>()
        .ok_or_else(invalid)?;

    let (last, leading) = values.split_last().ok_or_else(invalid)?;

    let mut addr: u32 = 0;
    for (index, value) in leading.iter().enumerate() {
        if *value > 0xff {
            return Err(invalid());
        }
        addr |= value << (24 - 8 * index);
    }

    let tail_bits = 32 - 8 * leading.len() as u32;
    if tail_bits < 32 && *last >= (1u32 << tail_bits) {
        return Err(invalid());
    }

    Ok(Ipv4Addr::from(addr | last))
}

/// Parse one dot-separated component: `0x` hex, leading-zero octal or decimal
fn parse_aton_component(part: &str) -> Option<u32> {
    let (digits, radix) = if let Some(hex) = part
        .strip_prefix("0x")
        .or_else(|| part.strip_prefix("0X"))
    {
        // "0x" on its own is accepted by inet_aton as zero
        if hex.is_empty() {
            return Some(0);
        }
        (hex, 16)
    } else if part.len() > 1 && part.starts_with('0') {
        (&part[1..], 8)
    } else {
        (part, 10)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    u32::from_str_radix(digits, radix).ok()
}

/// True if `s` is accepted by [`parse_ipv4`]
pub fn is_valid_ipv4(s: &str) -> bool {
    parse_ipv4(s).is_ok()
}

/// Canonical dotted-decimal form of any `inet_aton` accepted string
pub fn normalize_ipv4(s: &str) -> Result<String> {
    parse_ipv4(s).map(format_ipv4)
}

/// Dotted-decimal form, always four components, no leading zeros
pub fn format_ipv4(addr: Ipv4Addr) -> String {
    addr.to_string()
}

/// IPv4 netmask with the first `bits` bits set
pub fn bitmask_to_ipv4_mask(bits: u32) -> Result<Ipv4Addr> {
    u8::try_from(bits)
        .ok()
        .and_then(|prefix| Ipv4Net::new(Ipv4Addr::UNSPECIFIED, prefix).ok())
        .map(|net| net.netmask())
        .ok_or_else(|| NetworkError::from(AddressError::PrefixOutOfRange { bits, max: 32 }))
}

/// IPv6 netmask with the first `bits` bits set
///
/// The eight segments of the returned address are the big-endian 16-bit
/// words of the mask.
pub fn bitmask_to_ipv6_mask(bits: u32) -> Result<Ipv6Addr> {
    u8::try_from(bits)
        .ok()
        .and_then(|prefix| Ipv6Net::new(Ipv6Addr::UNSPECIFIED, prefix).ok())
        .map(|net| net.netmask())
        .ok_or_else(|| NetworkError::from(AddressError::PrefixOutOfRange { bits, max: 128 }))
}

/// Bytewise AND of `mask` and `addr`
pub fn mask_and(mask: Ipv4Addr, addr: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(mask) & u32::from(addr))
}

/// Bytewise OR of `mask` and `addr`
pub fn mask_or(mask: Ipv4Addr, addr: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(mask) | u32::from(addr))
}

/// Bytewise complement of `mask`
pub fn invert_mask(mask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(!u32::from(mask))
}

/// The 33 contiguous IPv4 netmasks, `/0` through `/32`
fn valid_netmasks() -> &'static HashSet<Ipv4Addr> {
    static VALID_NETMASKS: OnceLock<HashSet<Ipv4Addr>> = OnceLock::new();

    VALID_NETMASKS.get_or_init(|| {
        (0..=32u32)
            .map(|bits| Ipv4Addr::from(u32::MAX.checked_shl(32 - bits).unwrap_or(0)))
            .collect()
    })
}

/// True if `addr` is a run of set bits followed by a run of unset bits
pub fn is_plausible_netmask(addr: Ipv4Addr) -> bool {
    valid_netmasks().contains(&addr)
}

/// True if `addr` masked with `netmask` equals `network`
pub fn ipv4_in_network(addr: Ipv4Addr, netmask: Ipv4Addr, network: Ipv4Addr) -> bool {
    mask_and(netmask, addr) == network
}

fn parse_mac_octets(macaddr: &str) -> std::result::Result<[u8; 6], String> {
    let parts: Vec<&str> = macaddr.split(':').collect();
    if parts.len() != 6 {
        return Err(format!("expected 6 octets, found {}", parts.len()));
    }

    let mut octets = [0u8; 6];
    for (octet, part) in octets.iter_mut().zip(&parts) {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("octet {:?} is not hexadecimal", part));
        }
        *octet = u32::from_str_radix(part, 16)
            .ok()
            .and_then(|value| u8::try_from(value).ok())
            .ok_or_else(|| format!("octet {:?} is out of range", part))?;
    }

    Ok(octets)
}

/// True if `macaddr` is six `:`-separated hexadecimal octets
pub fn is_valid_mac_address(macaddr: &str) -> bool {
    parse_mac_octets(macaddr).is_ok()
}

/// Normalize a MAC address to `%02X:%02X:%02X:%02X:%02X:%02X`
pub fn normalize_mac_address(macaddr: &str) -> Result<String> {
    let octets = parse_mac_octets(macaddr).map_err(|reason| AddressError::InvalidMac {
        value: macaddr.to_string(),
        reason,
    })?;

    Ok(octets
        .iter()
        .map(|octet| format!("{:02X}", octet))
        .collect::<Vec<_>>()
        .join(":"))
}

fn domain_label_regex() -> &'static Regex {
    static DOMAIN_LABEL: OnceLock<Regex> = OnceLock::new();
    DOMAIN_LABEL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9]([-a-zA-Z0-9]*[a-zA-Z0-9])?$").expect("valid label regex")
    })
}

/// True if `search_domain` is suitable for the `search` line of resolv.conf
pub fn is_plausible_search_domain(search_domain: &str) -> bool {
    !search_domain.is_empty()
        && search_domain.len() <= MAX_SEARCH_DOMAIN_LEN
        && search_domain.split('.').all(|label| {
            label.len() <= MAX_DOMAIN_LABEL_LEN && domain_label_regex().is_match(label)
        })
}

/// A decimal digit run of any length, stored without leading zeros
///
/// Ordered numerically: a longer run is the larger number, runs of equal
/// length compare digit by digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LexNumber(String);

impl LexNumber {
    /// `digits` must be a non-empty run of ASCII digits
    pub fn from_digits(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            LexNumber("0".to_string())
        } else {
            LexNumber(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for LexNumber {
    fn from(value: u64) -> Self {
        LexNumber(value.to_string())
    }
}

impl Ord for LexNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for LexNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LexNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One run of a lexicographic-numeric split
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LexToken {
    /// A run of non-digit characters (possibly empty)
    Text(String),
    /// A run of decimal digits, compared as a number
    Number(LexNumber),
}

impl fmt::Display for LexToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexToken::Text(text) => write!(f, "{}", text),
            LexToken::Number(number) => write!(f, "{}", number),
        }
    }
}

/// Split `s` into alternating non-digit and digit runs, keeping digits as text
///
/// The first run is always a (possibly empty) non-digit run, so runs at the
/// same position of two splits are always of the same kind:
/// `"42sub010"` gives `["", "42", "sub", "010"]` and `""` gives `[""]`.
pub fn split_alpha_numeric(s: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    let mut in_digits = false;

    for c in s.chars() {
        let is_digit = c.is_ascii_digit();
        if is_digit != in_digits {
            runs.push(std::mem::take(&mut current));
            in_digits = is_digit;
        }
        current.push(c);
    }
    runs.push(current);

    runs
}

/// Like [`split_alpha_numeric`], with digit runs converted to numbers
pub fn split_lex_numeric(s: &str) -> Vec<LexToken> {
    split_alpha_numeric(s)
        .into_iter()
        .enumerate()
        .map(|(index, run)| {
            if index % 2 == 1 {
                LexToken::Number(LexNumber::from_digits(&run))
            } else {
                LexToken::Text(run)
            }
        })
        .collect()
}

/// Inverse of [`split_lex_numeric`]; leading zeros are not restored
pub fn join_lex_numeric(tokens: &[LexToken]) -> String {
    tokens.iter().map(ToString::to_string).collect()
}

/// Natural ordering of two names
pub fn compare_lex_numeric(a: &str, b: &str) -> Ordering {
    split_lex_numeric(a).cmp(&split_lex_numeric(b))
}

/// Stable natural sort; names are kept verbatim
pub fn sort_lex_numeric<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by_cached_key(|name| split_lex_numeric(name.as_ref()));
}
