use proptest::prelude::*;

use nightlight::LightColor;
use nightlight::settings::{Settings, SettingsModel};

fn color_strategy() -> impl Strategy<Value = LightColor> {
    prop_oneof![
        Just(LightColor::White),
        Just(LightColor::Blue),
        Just(LightColor::Pink),
    ]
}

/// Arbitrary valid settings, reached only through the update operations
fn settings_strategy() -> impl Strategy<Value = (u32, u32, u32, (u32, u32, u32), bool)> {
    (
        0u32..24,
        0u32..60,
        1u32..=60,
        (0u32..=100, 0u32..=100, 0u32..=100),
        any::<bool>(),
    )
}

proptest! {
    #[test]
    fn accepts_every_valid_wake_time(hour in 0u32..24, minute in 0u32..60) {
        let mut model = SettingsModel::detached();
        let time = format!("{hour:02}:{minute:02}");
        prop_assert!(model.update_wake_time(&time));
        prop_assert_eq!(&model.settings().wake_time, &time);
        prop_assert_eq!(model.wake_time_hour(), hour);
        prop_assert_eq!(model.wake_time_minute(), minute);
    }

    #[test]
    fn rejects_out_of_range_wake_times(hour in 24u32..100, minute in 0u32..100) {
        let mut model = SettingsModel::detached();
        let time = format!("{hour:02}:{minute:02}");
        prop_assert!(!model.update_wake_time(&time));
        prop_assert_eq!(model.settings(), &Settings::default());
    }

    #[test]
    fn rejects_arbitrary_text_as_wake_time(text in "[a-z ]{0,8}") {
        let mut model = SettingsModel::detached();
        prop_assert!(!model.update_wake_time(&text));
        prop_assert_eq!(model.settings(), &Settings::default());
    }

    #[test]
    fn wake_duration_range_is_one_to_sixty(minutes in 0u32..200) {
        let mut model = SettingsModel::detached();
        let accepted = model.update_wake_duration(minutes);
        prop_assert_eq!(accepted, (1..=60).contains(&minutes));
        let expected = if accepted { minutes } else { 30 };
        prop_assert_eq!(model.settings().wake_duration, expected);
    }

    #[test]
    fn brightness_range_is_zero_to_hundred(color in color_strategy(), percent in 0u32..300) {
        let mut model = SettingsModel::detached();
        let before = model.settings().brightness.get(color);
        let accepted = model.update_brightness(color, percent);
        prop_assert_eq!(accepted, percent <= 100);
        let expected = if accepted { percent } else { before };
        prop_assert_eq!(model.settings().brightness.get(color), expected);
    }

    #[test]
    fn export_import_round_trips(
        (hour, minute, duration, (white, blue, pink), sound) in settings_strategy()
    ) {
        let mut source = SettingsModel::detached();
        let time = format!("{hour:02}:{minute:02}");
        prop_assert!(source.update_wake_time(&time));
        prop_assert!(source.update_wake_duration(duration));
        prop_assert!(source.update_brightness(LightColor::White, white));
        prop_assert!(source.update_brightness(LightColor::Blue, blue));
        prop_assert!(source.update_brightness(LightColor::Pink, pink));
        source.update_sound_enabled(sound);

        let mut target = SettingsModel::detached();
        prop_assert!(target.import_settings(&source.export_settings()));
        prop_assert_eq!(target.settings(), source.settings());
    }
}

#[test]
fn import_of_plain_text_fails_and_keeps_settings() {
    nightlight::logger::Log::set_enabled(false);
    let mut model = SettingsModel::detached();
    assert!(model.update_wake_duration(12));
    let before = model.settings().clone();

    assert!(!model.import_settings("not json"));
    assert_eq!(model.settings(), &before);
}
