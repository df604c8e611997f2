use thiserror::Error;

/// Errors produced while expanding a port specification. Both are fatal to
/// the run: no scan is attempted on malformed input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortSpecError {
    #[error("invalid port: {0}")]
    InvalidPort(String),
    #[error("invalid range: {0}")]
    InvalidRange(String),
}

/// Parse a comma-separated port list, e.g. `"22,80,443"`.
///
/// Input order is preserved and duplicates are kept: the caller asked for
/// each entry to be probed, and the scheduler reports one outcome per entry.
pub fn parse_port_list(s: &str) -> Result<Vec<u16>, PortSpecError> {
    let mut out = Vec::new();
    for token in s.split(',') {
        let token = token.trim();
        out.push(parse_port_token(token)?);
    }
    Ok(out)
}

/// Parse an inclusive range of the form `start-end` into the ascending run
/// `[start, start+1, ..., end]`.
pub fn parse_port_range(s: &str) -> Result<Vec<u16>, PortSpecError> {
    let invalid = || PortSpecError::InvalidRange(s.trim().to_string());

    let (a, b) = s.trim().split_once('-').ok_or_else(invalid)?;
    let start: u32 = a.trim().parse().map_err(|_| invalid())?;
    let end: u32 = b.trim().parse().map_err(|_| invalid())?;
    if start < 1 || end > 65535 || start > end {
        return Err(invalid());
    }
    Ok((start as u16..=end as u16).collect())
}

/// Expand whichever specification was supplied; an explicit list takes
/// precedence over a range. With neither, fall back to [`default_ports`].
pub fn select_ports(
    list: Option<&str>,
    range: Option<&str>,
) -> Result<Vec<u16>, PortSpecError> {
    match (list, range) {
        (Some(l), _) => parse_port_list(l),
        (None, Some(r)) => parse_port_range(r),
        (None, None) => Ok(default_ports()),
    }
}

/// A small list of commonly served TCP ports, used when no specification is
/// given on the command line.
pub fn default_ports() -> Vec<u16> {
    const DEFAULT: &[u16] = &[
        21, 22, 23, 25, 53, 80, 110, 143, 443, 445, 587, 993, 995, 1433, 3306,
        3389, 5432, 5900, 6379, 8000, 8080, 8443, 9200, 11211, 27017,
    ];
    DEFAULT.to_vec()
}

fn parse_port_token(s: &str) -> Result<u16, PortSpecError> {
    let val: u32 = s
        .parse()
        .map_err(|_| PortSpecError::InvalidPort(s.to_string()))?;
    if val == 0 || val > 65535 {
        return Err(PortSpecError::InvalidPort(s.to_string()));
    }
    Ok(val as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_preserves_order_and_duplicates() {
        let ports = parse_port_list("443, 80,22,80").unwrap();
        assert_eq!(ports, vec![443, 80, 22, 80]);
    }

    #[test]
    fn list_rejects_out_of_range_token() {
        let err = parse_port_list("22,80,443,99999").unwrap_err();
        assert_eq!(err, PortSpecError::InvalidPort("99999".to_string()));
    }

    #[test]
    fn list_rejects_zero_and_garbage() {
        assert!(matches!(
            parse_port_list("0").unwrap_err(),
            PortSpecError::InvalidPort(_)
        ));
        assert!(matches!(
            parse_port_list("80,http").unwrap_err(),
            PortSpecError::InvalidPort(_)
        ));
        assert!(matches!(
            parse_port_list("80,,443").unwrap_err(),
            PortSpecError::InvalidPort(_)
        ));
    }

    #[test]
    fn range_expands_ascending_inclusive() {
        let ports = parse_port_range("8000-8002").unwrap();
        assert_eq!(ports, vec![8000, 8001, 8002]);
        assert_eq!(parse_port_range("80-80").unwrap(), vec![80]);
    }

    #[test]
    fn range_length_matches_bounds() {
        let ports = parse_port_range("1-1024").unwrap();
        assert_eq!(ports.len(), 1024);
        assert_eq!(ports.first(), Some(&1));
        assert_eq!(ports.last(), Some(&1024));
    }

    #[test]
    fn invalid_ranges_error() {
        for bad in ["443-80", "0-100", "1-70000", "80", "a-b", "1-2-3", ""] {
            assert!(
                matches!(
                    parse_port_range(bad),
                    Err(PortSpecError::InvalidRange(_))
                ),
                "expected InvalidRange for {bad:?}"
            );
        }
    }

    #[test]
    fn list_takes_precedence_over_range() {
        let ports = select_ports(Some("22,80"), Some("1-10")).unwrap();
        assert_eq!(ports, vec![22, 80]);
    }

    #[test]
    fn no_spec_falls_back_to_defaults() {
        let ports = select_ports(None, None).unwrap();
        assert!(!ports.is_empty());
        assert!(ports.contains(&22) && ports.contains(&443));
    }
}
