//! UPC-E encoding.
//!
//! The barcoders crate covers EAN/UPC-A but not the zero-suppressed UPC-E
//! form, so the 51-module pattern is built here:
//!
//! ```text
//! 101 | six digits, L/G parity chosen by number system + check digit | 010101
//! ```

/// Left-hand odd parity (L) patterns.
const L_CODES: [[u8; 7]; 10] = [
    [0, 0, 0, 1, 1, 0, 1],
    [0, 0, 1, 1, 0, 0, 1],
    [0, 0, 1, 0, 0, 1, 1],
    [0, 1, 1, 1, 1, 0, 1],
    [0, 1, 0, 0, 0, 1, 1],
    [0, 1, 1, 0, 0, 0, 1],
    [0, 1, 0, 1, 1, 1, 1],
    [0, 1, 1, 1, 0, 1, 1],
    [0, 1, 1, 0, 1, 1, 1],
    [0, 0, 0, 1, 0, 1, 1],
];

/// Left-hand even parity (G) patterns.
const G_CODES: [[u8; 7]; 10] = [
    [0, 1, 0, 0, 1, 1, 1],
    [0, 1, 1, 0, 0, 1, 1],
    [0, 0, 1, 1, 0, 1, 1],
    [0, 1, 0, 0, 0, 0, 1],
    [0, 0, 1, 1, 1, 0, 1],
    [0, 1, 1, 1, 0, 0, 1],
    [0, 0, 0, 0, 1, 0, 1],
    [0, 0, 1, 0, 0, 0, 1],
    [0, 0, 0, 1, 0, 0, 1],
    [0, 0, 1, 0, 1, 1, 1],
];

/// Parity per check digit for number system 0; `true` = even (G).
/// Number system 1 uses the inverse.
const PARITY_NS0: [[bool; 6]; 10] = [
    [true, true, true, false, false, false],
    [true, true, false, true, false, false],
    [true, true, false, false, true, false],
    [true, true, false, false, false, true],
    [true, false, true, true, false, false],
    [true, false, false, true, true, false],
    [true, false, false, false, true, true],
    [true, false, true, false, true, false],
    [true, false, true, false, false, true],
    [true, false, false, true, false, true],
];

const START_GUARD: [u8; 3] = [1, 0, 1];
const END_GUARD: [u8; 6] = [0, 1, 0, 1, 0, 1];

fn digits(data: &str) -> Result<Vec<u8>, String> {
    data.chars()
        .map(|c| {
            c.to_digit(10)
                .map(|d| d as u8)
                .ok_or_else(|| format!("'{}' is not a digit", c))
        })
        .collect()
}

/// Expand the six UPC-E payload digits to the 11-digit UPC-A body.
fn expand(number_system: u8, payload: &[u8]) -> [u8; 11] {
    let [d1, d2, d3, d4, d5, d6] = [
        payload[0], payload[1], payload[2], payload[3], payload[4], payload[5],
    ];
    let ns = number_system;
    match d6 {
        0..=2 => [ns, d1, d2, d6, 0, 0, 0, 0, d3, d4, d5],
        3 => [ns, d1, d2, d3, 0, 0, 0, 0, 0, d4, d5],
        4 => [ns, d1, d2, d3, d4, 0, 0, 0, 0, 0, d5],
        _ => [ns, d1, d2, d3, d4, d5, 0, 0, 0, 0, d6],
    }
}

/// UPC-A check digit over the 11-digit body.
pub(crate) fn upc_check_digit(body: &[u8]) -> u8 {
    let sum: u32 = body
        .iter()
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { 3 * d as u32 } else { d as u32 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Encoded UPC-E symbol: the module pattern and the 8 digits for the caption.
pub(crate) struct UpcE {
    pub modules: Vec<u8>,
    pub text: String,
}

/// Encode 6 (number system 0 implied), 7 or 8 (with check digit) digits.
pub(crate) fn encode(data: &str) -> Result<UpcE, String> {
    let all = digits(data)?;
    let (number_system, payload, given_check) = match all.len() {
        6 => (0, &all[..], None),
        7 => (all[0], &all[1..7], None),
        8 => (all[0], &all[1..7], Some(all[7])),
        n => return Err(format!("UPC-E needs 6, 7 or 8 digits, got {}", n)),
    };
    if number_system > 1 {
        return Err(format!("UPC-E number system must be 0 or 1, got {}", number_system));
    }

    let check = upc_check_digit(&expand(number_system, payload));
    if let Some(given) = given_check
        && given != check
    {
        return Err(format!("check digit {} does not match computed {}", given, check));
    }

    let parity = PARITY_NS0[check as usize];
    let mut modules = Vec::with_capacity(51);
    modules.extend_from_slice(&START_GUARD);
    for (i, &digit) in payload.iter().enumerate() {
        let even = parity[i] != (number_system == 1);
        let pattern = if even {
            &G_CODES[digit as usize]
        } else {
            &L_CODES[digit as usize]
        };
        modules.extend_from_slice(pattern);
    }
    modules.extend_from_slice(&END_GUARD);

    let mut text = String::with_capacity(8);
    text.push(char::from(b'0' + number_system));
    for &digit in payload {
        text.push(char::from(b'0' + digit));
    }
    text.push(char::from(b'0' + check));

    Ok(UpcE { modules, text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_full_code() {
        let code = encode("01234565").unwrap();
        assert_eq!(code.modules.len(), 51);
        assert_eq!(&code.modules[..3], &START_GUARD);
        assert_eq!(&code.modules[45..], &END_GUARD);
        // Check digit 5 => parity EOOEEO, so the first digit (1) is G-coded.
        assert_eq!(&code.modules[3..10], &G_CODES[1]);
        assert_eq!(&code.modules[10..17], &L_CODES[2]);
        assert_eq!(code.text, "01234565");
    }

    #[test]
    fn test_short_forms_compute_check_digit() {
        let full = encode("01234565").unwrap();
        assert_eq!(encode("0123456").unwrap().modules, full.modules);
        assert_eq!(encode("123456").unwrap().text, "01234565");
    }

    #[test]
    fn test_number_system_one_inverts_parity() {
        let ns0 = encode("0123456").unwrap();
        let ns1 = encode("1123456").unwrap();
        assert_ne!(ns0.modules, ns1.modules);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(encode("01234567").is_err());
        assert!(encode("21234565").is_err());
        assert!(encode("12345").is_err());
        assert!(encode("01234a65").is_err());
    }

    #[test]
    fn test_upc_check_digit() {
        // UPC-A 036000291452
        assert_eq!(upc_check_digit(&[0, 3, 6, 0, 0, 0, 2, 9, 1, 4, 5]), 2);
    }
}
