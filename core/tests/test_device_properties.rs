// Property tests for device detection and short tokens

use betadrop_core::token::{generate_short_token_with, ALPHABET};
use betadrop_core::{detect_device, is_valid_short_token, DeviceType, NavigatorHint};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Arbitrary user-agent noise that cannot spell a device keyword.
fn noise() -> impl Strategy<Value = String> {
    "[ ;/()0-9._-]{0,40}"
}

proptest! {
    #[test]
    fn iphone_is_ios_mobile(prefix in noise(), suffix in noise()) {
        let ua = format!("{}iPhone{}", prefix, suffix);
        let info = detect_device(&ua, None);
        prop_assert!(info.is_ios);
        prop_assert_eq!(info.device_type, DeviceType::Mobile);
    }

    #[test]
    fn ipad_is_ios_tablet(prefix in noise(), suffix in noise(), touch in proptest::option::of(0u32..10)) {
        let ua = format!("{}iPad{}", prefix, suffix);
        let hint = touch.map(NavigatorHint::with_touch_points);
        let info = detect_device(&ua, hint.as_ref());
        prop_assert!(info.is_ios);
        prop_assert_eq!(info.device_type, DeviceType::Tablet);
    }

    #[test]
    fn macintosh_needs_touch(prefix in noise(), touch in 0u32..10) {
        let ua = format!("{}Macintosh", prefix);
        let info = detect_device(&ua, Some(&NavigatorHint::with_touch_points(touch)));
        prop_assert_eq!(info.is_ios, touch > 0);
        if touch == 0 {
            prop_assert_eq!(info.device_type, DeviceType::Desktop);
        }
    }

    #[test]
    fn noise_is_desktop(ua in noise()) {
        let info = detect_device(&ua, None);
        prop_assert_eq!(info.device_type, DeviceType::Desktop);
        prop_assert!(!info.is_ios && !info.is_android && !info.is_mobile);
    }

    #[test]
    fn generated_tokens_validate(seed in any::<u64>(), length in 6usize..=20) {
        let mut rng = StdRng::seed_from_u64(seed);
        let token = generate_short_token_with(&mut rng, length);
        prop_assert_eq!(token.len(), length);
        prop_assert!(is_valid_short_token(&token));
    }

    #[test]
    fn tokens_outside_alphabet_rejected(valid in "[0-9a-zA-Z]{3,10}", bad in "[-_+/=. ]") {
        let token = format!("{}{}{}", valid, bad, valid);
        prop_assert!(!is_valid_short_token(&token));
    }
}

#[test]
fn test_distribution_roughly_uniform() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut counts = [0usize; 62];
    let token = generate_short_token_with(&mut rng, 62_000);
    for b in token.bytes() {
        let idx = ALPHABET.iter().position(|&a| a == b).unwrap();
        counts[idx] += 1;
    }

    // Expected ~1000 each; biased symbols ~1250, the rest ~1000.
    for (idx, count) in counts.iter().enumerate() {
        assert!(
            (800..=1500).contains(count),
            "symbol {} drawn {} times",
            ALPHABET[idx] as char,
            count
        );
    }
}
