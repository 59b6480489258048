#![no_main]

use libfuzzer_sys::fuzz_target;
use photolab_auth::PinConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(config) = serde_json::from_slice::<PinConfig>(data) else {
        return;
    };

    if config.validate().is_ok() {
        // Accepted configs always yield a usable policy
        let policy = config.lockout_policy();
        assert!(policy.max_attempts >= 1);
        assert!(!policy.lockout_duration.is_zero());
        assert!(!config.countdown_tick().is_zero());

        let reserialized = serde_json::to_vec(&config).unwrap();
        let parsed: PinConfig = serde_json::from_slice(&reserialized).unwrap();
        assert_eq!(parsed, config);
    }
});
