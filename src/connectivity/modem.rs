/// Addresses in this range already face the modem, so there is nothing to fall back to.
const MODEM_FACING_PREFIX: &str = "172.";

/// Compute the modem address that sits next to an ATM's primary address.
///
/// The modem takes the address just below the ATM: the last octet is decremented,
/// and when it is already 0 the third octet is decremented instead (the last stays 0).
/// There is no borrow from the second octet. Anything that is not four decimal
/// octets is returned untouched.
pub fn modem_address(ip: &str) -> String {
    if ip.starts_with(MODEM_FACING_PREFIX) {
        return ip.to_string();
    }

    let parts: Vec<&str> = ip.split('.').collect();
    if parts.len() != 4 {
        return ip.to_string();
    }

    let Ok(octets) = parts
        .iter()
        .map(|part| part.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
    else {
        return ip.to_string();
    };

    let (third, fourth) = (octets[2], octets[3]);
    if fourth > 0 {
        format!("{}.{}.{}.{}", parts[0], parts[1], parts[2], fourth - 1)
    } else if third > 0 {
        format!("{}.{}.{}.0", parts[0], parts[1], third - 1)
    } else {
        ip.to_string()
    }
}
