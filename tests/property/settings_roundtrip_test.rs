//! Property-based tests for settings persistence.
//!
//! Settings written in either on-disk format, with or without obfuscation,
//! read back unchanged.

use proptest::prelude::*;
use seabrowser::services::settings_engine::{
    decode_obfuscated, encode_obfuscated, parse_key_value, to_key_value, SettingsEngine,
    SettingsEngineTrait, SettingsFormat,
};
use seabrowser::types::settings::{
    AppearanceSettings, BrowserSettings, CookiePolicy, GeneralSettings, PrivacySettings,
    SearchSettings, ThemeMode, TrackingProtection, UserAgent,
};
use tempfile::TempDir;

// --- Arbitrary strategies for all settings sub-types ---

fn arb_cookie_policy() -> impl Strategy<Value = CookiePolicy> {
    prop_oneof![
        Just(CookiePolicy::AcceptAll),
        Just(CookiePolicy::BlockThirdParty),
        Just(CookiePolicy::BlockAll),
    ]
}

fn arb_tracking_protection() -> impl Strategy<Value = TrackingProtection> {
    prop_oneof![
        Just(TrackingProtection::Off),
        Just(TrackingProtection::Standard),
        Just(TrackingProtection::Strict),
    ]
}

fn arb_theme_mode() -> impl Strategy<Value = ThemeMode> {
    prop_oneof![Just(ThemeMode::System), Just(ThemeMode::Light), Just(ThemeMode::Dark)]
}

fn arb_user_agent() -> impl Strategy<Value = UserAgent> {
    prop_oneof![Just(UserAgent::Chrome), Just(UserAgent::Firefox), Just(UserAgent::Safari)]
}

fn arb_privacy_settings() -> impl Strategy<Value = PrivacySettings> {
    (
        arb_cookie_policy(),
        arb_tracking_protection(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(
                cookie_policy,
                tracking_protection,
                https_only,
                send_dnt,
                clear_on_exit,
                block_ads,
                block_fingerprinting,
                disable_webrtc,
            )| PrivacySettings {
                cookie_policy,
                tracking_protection,
                https_only,
                send_dnt,
                clear_on_exit,
                block_ads,
                block_fingerprinting,
                disable_webrtc,
            },
        )
}

fn arb_search_settings() -> impl Strategy<Value = SearchSettings> {
    (
        prop_oneof![
            Just("google".to_string()),
            Just("duckduckgo".to_string()),
            Just("bing".to_string()),
            Just("brave".to_string()),
            Just("ecosia".to_string()),
            Just("startpage".to_string()),
        ],
        any::<bool>(),
    )
        .prop_map(|(default_engine, show_suggestions)| SearchSettings {
            default_engine,
            show_suggestions,
        })
}

fn arb_appearance_settings() -> impl Strategy<Value = AppearanceSettings> {
    (
        arb_theme_mode(),
        "#[0-9a-f]{6}",
        25u32..=500,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(theme, accent_color, zoom_level, show_sidebar, vertical_tabs, show_bookmarks_bar)| {
                AppearanceSettings {
                    theme,
                    accent_color,
                    zoom_level,
                    show_sidebar,
                    vertical_tabs,
                    show_bookmarks_bar,
                }
            },
        )
}

fn arb_general_settings() -> impl Strategy<Value = GeneralSettings> {
    (
        "(sea|tsunami|https)://[a-z0-9./_]{1,30}",
        "(/[a-zA-Z0-9._]{1,12}){0,4}",
        arb_user_agent(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        1u32..=3600,
    )
        .prop_map(
            |(
                homepage,
                download_path,
                user_agent,
                ask_where_to_save,
                restore_tabs,
                setup_completed,
                auto_reload,
                auto_reload_interval,
            )| GeneralSettings {
                homepage,
                download_path,
                user_agent,
                ask_where_to_save,
                restore_tabs,
                setup_completed,
                encrypt_settings: false,
                auto_reload,
                auto_reload_interval,
            },
        )
}

fn arb_browser_settings() -> impl Strategy<Value = BrowserSettings> {
    (
        arb_privacy_settings(),
        arb_search_settings(),
        arb_appearance_settings(),
        arb_general_settings(),
    )
        .prop_map(|(privacy, search, appearance, general)| BrowserSettings {
            privacy,
            search,
            appearance,
            general,
        })
}

fn arb_format() -> impl Strategy<Value = SettingsFormat> {
    prop_oneof![Just(SettingsFormat::Json), Just(SettingsFormat::KeyValue)]
}

// Obfuscation is reversible for any text, including non-ASCII.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn obfuscation_round_trip(body in "\\PC{0,200}") {
        let encoded = encode_obfuscated(&body);
        let decoded = decode_obfuscated(&encoded).expect("decode failed");
        prop_assert_eq!(decoded, body);
    }
}

// The key=value rendering parses back to the same settings.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn key_value_round_trip(settings in arb_browser_settings()) {
        let text = to_key_value(&settings).expect("render failed");
        let parsed = parse_key_value(&text, &BrowserSettings::default()).expect("parse failed");
        prop_assert_eq!(parsed, settings);
    }
}

// Saving and loading through the engine preserves every field, in both
// formats, whether or not the file is obfuscated.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn engine_save_load_round_trip(
        settings in arb_browser_settings(),
        format in arb_format(),
        encrypt in any::<bool>(),
    ) {
        let dir = TempDir::new().expect("tempdir failed");
        let mut expected = settings;
        expected.general.encrypt_settings = encrypt;

        let mut engine = SettingsEngine::with_defaults(dir.path(), format, expected.clone());
        engine.load().expect("initial load failed");
        engine.save().expect("save failed");

        let mut reloaded = SettingsEngine::new(dir.path(), format);
        let loaded = reloaded.load().expect("reload failed");
        prop_assert_eq!(loaded, expected);
    }
}
