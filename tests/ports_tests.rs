use port_probe::ports::{parse_port_list, parse_port_range, select_ports, PortSpecError};

#[test]
fn explicit_list_kept_verbatim() {
    let ports = parse_port_list("22, 80 ,443,8000").expect("parse ok");
    assert_eq!(ports, vec![22, 80, 443, 8000]);
}

#[test]
fn out_of_range_entry_fails_before_any_scan() {
    let err = parse_port_list("22,80,443,99999").unwrap_err();
    assert_eq!(err, PortSpecError::InvalidPort("99999".to_string()));
}

#[test]
fn range_is_inclusive_and_ascending() {
    let ports = parse_port_range("20-25").expect("parse ok");
    assert_eq!(ports, vec![20, 21, 22, 23, 24, 25]);
}

#[test]
fn reversed_range_rejected() {
    assert!(matches!(
        parse_port_range("25-20"),
        Err(PortSpecError::InvalidRange(_))
    ));
}

#[test]
fn list_wins_when_both_given() {
    let ports = select_ports(Some("443"), Some("1-100")).expect("parse ok");
    assert_eq!(ports, vec![443]);
}
