use envcfg_kernel::domain::network::IpRange;
use envcfg_kernel::security::ip::IpMatcher;

fn matcher() -> IpMatcher {
    IpMatcher::new(
        vec!["198.51.100.7".to_owned()],
        &[IpRange::new("203.0.113.0", "203.0.113.255")],
    )
}

#[test]
fn allowlisted_address_is_authorized() {
    assert!(matcher().is_authorized("198.51.100.7"));
}

#[test]
fn address_in_range_is_authorized() {
    let matcher = matcher();
    assert!(matcher.is_authorized("203.0.113.5"));
    assert!(matcher.is_authorized("203.0.113.0"));
    assert!(matcher.is_authorized("203.0.113.255"));
}

#[test]
fn unknown_address_is_rejected() {
    let matcher = matcher();
    assert!(!matcher.is_authorized("10.0.0.1"));
    assert!(!matcher.is_authorized("203.0.114.0"));
}

#[test]
fn malformed_input_is_rejected() {
    let matcher = matcher();
    for addr in ["", "not-an-ip", "::1", "203.0.113"] {
        assert!(!matcher.is_authorized(addr), "{addr:?} should be rejected");
    }
}

#[test]
fn allowlist_is_exact_match() {
    let matcher = IpMatcher::new(vec!["::1".to_owned()], &[]);
    assert!(matcher.is_authorized("::1"));
    assert!(!matcher.is_authorized("::2"));
}

#[test]
fn answer_is_stable_across_calls() {
    let matcher = matcher();
    let first = matcher.is_authorized("203.0.113.5");
    for _ in 0..10 {
        assert_eq!(matcher.is_authorized("203.0.113.5"), first);
    }
}

#[test]
fn empty_matcher_rejects_everything() {
    let matcher = IpMatcher::default();
    assert!(!matcher.is_authorized("127.0.0.1"));
}
