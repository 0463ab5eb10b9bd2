use once_cell::sync::Lazy;
use regex::Regex;

static ACC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bACC\s*[:=]?\s*(ON|OFF)\b").unwrap());
static VOLTAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*V\b").unwrap());

/// Typed fields extracted from the raw device status string.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusFields {
    pub acc_on: Option<bool>,
    pub voltage: Option<f64>,
}

/// Extracts ignition state and battery voltage from a device status string,
/// e.g. `"ACC ON, GPS, 12.4V"`. Tokens the device did not report parse to
/// `None`; an unrecognized string parses to all-`None`.
pub fn parse_status(raw: &str) -> StatusFields {
    let acc_on = ACC_RE
        .captures(raw)
        .map(|caps| caps[1].eq_ignore_ascii_case("ON"));
    let voltage = VOLTAGE_RE
        .captures(raw)
        .and_then(|caps| caps[1].parse::<f64>().ok());

    StatusFields { acc_on, voltage }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acc_on_with_voltage() {
        let fields = parse_status("ACC ON, GPS, 12.4V");
        assert_eq!(fields.acc_on, Some(true));
        assert_eq!(fields.voltage, Some(12.4));
    }

    #[test]
    fn acc_off() {
        let fields = parse_status("ACC OFF");
        assert_eq!(fields.acc_on, Some(false));
        assert_eq!(fields.voltage, None);
    }

    #[test]
    fn separator_and_case_variants() {
        assert_eq!(parse_status("acc:on").acc_on, Some(true));
        assert_eq!(parse_status("Acc=Off,28V").acc_on, Some(false));
        assert_eq!(parse_status("Acc=Off,28V").voltage, Some(28.0));
    }

    #[test]
    fn integer_voltage() {
        assert_eq!(parse_status("ACC ON, 24V").voltage, Some(24.0));
    }

    #[test]
    fn unrecognized_string_yields_none() {
        assert_eq!(parse_status("GPS FIXED, MOVING"), StatusFields::default());
        assert_eq!(parse_status(""), StatusFields::default());
    }

    #[test]
    fn accessory_prefix_is_not_an_acc_token() {
        assert_eq!(parse_status("ACCESSORY ON").acc_on, None);
    }
}
