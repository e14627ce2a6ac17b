use super::*;
use crate::common::constants::test_constants::*;
use crate::prayer::{IqamaAdjustments, PrayerSchedule};
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveTime, Timelike};
use proptest::prelude::*;

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 18)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn standard_prayers() -> Vec<PrayerSlot> {
    PrayerSchedule::from_strings(
        at(0, 0, 0).date(),
        &[
            (PrayerName::Fajr, TEST_FAJR),
            (PrayerName::Dhuhr, TEST_DHUHR),
            (PrayerName::Asr, TEST_ASR),
            (PrayerName::Maghrib, TEST_MAGHRIB),
            (PrayerName::Isha, TEST_ISHA),
        ],
        IqamaAdjustments::default(),
    )
    .unwrap()
    .slots()
    .to_vec()
}

fn standard_config() -> ModeWindowConfig {
    ModeWindowConfig::new(
        TEST_PRE_PRAYER_WINDOW,
        TEST_ADHAN_DURATION,
        TEST_POST_PRAYER_DURATION,
    )
}

fn slot(name: PrayerName, h: u32, m: u32) -> PrayerSlot {
    PrayerSlot::new(name, NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

#[test]
fn test_dhuhr_round_trip() {
    let prayers = standard_prayers();
    let config = standard_config();

    let pre = calculate_display_mode(&prayers, at(12, 29, 0), &config);
    assert_eq!(pre.mode, DisplayMode::PrePrayer);
    assert_eq!(pre.active_prayer, Some(PrayerName::Dhuhr));
    assert_eq!(pre.reason, "In pre-prayer window for Dhuhr");

    let adhan = calculate_display_mode(&prayers, at(12, 30, 30), &config);
    assert_eq!(adhan.mode, DisplayMode::Adhan);
    assert_eq!(adhan.active_prayer, Some(PrayerName::Dhuhr));
    assert_eq!(adhan.reason, "In adhan window for Dhuhr");

    let post = calculate_display_mode(&prayers, at(12, 33, 30), &config);
    assert_eq!(post.mode, DisplayMode::PostPrayer);
    assert_eq!(post.active_prayer, Some(PrayerName::Dhuhr));
    assert_eq!(post.reason, "In post-prayer window for Dhuhr");

    let done = calculate_display_mode(&prayers, at(12, 38, 0), &config);
    assert_eq!(done.mode, DisplayMode::Default);
    assert_eq!(done.active_prayer, None);
    assert_eq!(done.reason, "Normal operation");
}

#[test]
fn test_prayer_instant_is_adhan() {
    let calc = calculate_display_mode(&standard_prayers(), at(12, 30, 0), &standard_config());
    assert_eq!(calc.mode, DisplayMode::Adhan);
    assert_eq!(calc.active_prayer, Some(PrayerName::Dhuhr));
}

#[test]
fn test_pre_prayer_edge_is_inclusive() {
    let calc = calculate_display_mode(&standard_prayers(), at(4, 58, 0), &standard_config());
    assert_eq!(calc.mode, DisplayMode::PrePrayer);
    assert_eq!(calc.active_prayer, Some(PrayerName::Fajr));

    let before = calculate_display_mode(&standard_prayers(), at(4, 57, 59), &standard_config());
    assert_eq!(before.mode, DisplayMode::Default);
}

#[test]
fn test_adhan_end_tie_goes_to_adhan() {
    let calc = calculate_display_mode(&standard_prayers(), at(12, 33, 0), &standard_config());
    assert_eq!(calc.mode, DisplayMode::Adhan);
    let calc = calculate_display_mode(&standard_prayers(), at(12, 33, 1), &standard_config());
    assert_eq!(calc.mode, DisplayMode::PostPrayer);
}

#[test]
fn test_calculator_edges_below_one_second() {
    let prayers = standard_prayers();
    let config = ModeWindowConfig::default();
    let at_millis = |h, m, s, ms| at(h, m, s) + ChronoDuration::milliseconds(ms);

    let before = calculate_display_mode(&prayers, at_millis(12, 29, 59, 500), &config);
    assert_eq!(before.mode, DisplayMode::PrePrayer);
    assert_eq!(before.active_prayer, Some(PrayerName::Dhuhr));

    assert_eq!(
        calculate_display_mode(&prayers, at_millis(12, 27, 59, 500), &config).mode,
        DisplayMode::Default
    );
    assert_eq!(
        calculate_display_mode(&prayers, at_millis(12, 33, 0, 900), &config).mode,
        DisplayMode::PostPrayer
    );
    assert_eq!(
        calculate_display_mode(&prayers, at_millis(12, 37, 0, 1), &config).mode,
        DisplayMode::Default
    );
}

#[test]
fn test_empty_prayer_list_is_default() {
    let calc = calculate_display_mode(&[], at(12, 30, 0), &standard_config());
    assert_eq!(calc.mode, DisplayMode::Default);
    assert_eq!(calc.active_prayer, None);
}

#[test]
fn test_overlap_earlier_prayer_adhan_wins() {
    // Two prayers one minute apart: at 12:30:30 the first is in adhan and
    // the second is in pre-prayer
    let prayers = vec![
        slot(PrayerName::Dhuhr, 12, 30),
        slot(PrayerName::Asr, 12, 31),
    ];
    let config = ModeWindowConfig::new(2, 3, 3);
    let calc = calculate_display_mode(&prayers, at(12, 30, 30), &config);
    assert_eq!(calc.mode, DisplayMode::Adhan);
    assert_eq!(calc.active_prayer, Some(PrayerName::Dhuhr));
}

#[test]
fn test_overlap_earlier_prayer_post_beats_later_pre() {
    // First prayer's post-prayer window overlaps the next prayer's pre window
    let prayers = vec![
        slot(PrayerName::Maghrib, 18, 30),
        slot(PrayerName::Isha, 18, 36),
    ];
    let config = ModeWindowConfig::new(2, 3, 4);
    let calc = calculate_display_mode(&prayers, at(18, 34, 30), &config);
    assert_eq!(calc.mode, DisplayMode::PostPrayer);
    assert_eq!(calc.active_prayer, Some(PrayerName::Maghrib));
}

#[test]
fn test_should_transition_mode() {
    let prayers = standard_prayers();
    let config = standard_config();

    let stay = should_transition_mode(DisplayMode::Adhan, &prayers, at(12, 31, 0), &config);
    assert_eq!(stay, TransitionDecision::stay());

    let go = should_transition_mode(DisplayMode::PrePrayer, &prayers, at(12, 30, 0), &config);
    assert!(go.should_transition);
    assert_eq!(go.new_mode, Some(DisplayMode::Adhan));
    assert_eq!(go.active_prayer, Some(PrayerName::Dhuhr));

    let back = should_transition_mode(DisplayMode::PostPrayer, &prayers, at(13, 0, 0), &config);
    assert!(back.should_transition);
    assert_eq!(back.new_mode, Some(DisplayMode::Default));
    assert_eq!(back.active_prayer, None);
}

#[test]
fn test_state_machine_table() {
    use DisplayMode::*;
    let allowed = [
        (Default, PrePrayer),
        (Default, Adhan),
        (PrePrayer, Adhan),
        (PrePrayer, Default),
        (Adhan, PostPrayer),
        (Adhan, Default),
        (PostPrayer, Default),
    ];
    for from in DisplayMode::ALL {
        for to in DisplayMode::ALL {
            assert_eq!(
                from.can_transition_to(to),
                allowed.contains(&(from, to)),
                "{from:?} -> {to:?}"
            );
        }
    }
}

#[test]
fn test_full_day_walk_follows_state_machine() {
    let prayers = standard_prayers();
    let config = standard_config();
    let mut now = at(0, 0, 0);
    let mut current = DisplayMode::Default;

    while now < at(23, 59, 59) {
        let mode = calculate_display_mode(&prayers, now, &config).mode;
        if mode != current {
            assert!(current.can_transition_to(mode), "{current:?} -> {mode:?} at {now}");
            current = mode;
        }
        now += ChronoDuration::seconds(1);
    }
}

#[test]
fn test_display_mode_parsing_and_serde() {
    assert_eq!("pre-prayer".parse::<DisplayMode>().unwrap(), DisplayMode::PrePrayer);
    assert_eq!("post_prayer".parse::<DisplayMode>().unwrap(), DisplayMode::PostPrayer);
    assert!("sermon".parse::<DisplayMode>().is_err());
    assert_eq!(
        serde_json::to_string(&DisplayMode::PostPrayer).unwrap(),
        "\"post-prayer\""
    );
}

fn arb_schedule() -> impl Strategy<Value = Vec<PrayerSlot>> {
    // Five distinct minutes of the day, sorted into a valid schedule
    prop::collection::btree_set(0u32..1440, 0..=5).prop_map(|minutes| {
        minutes
            .into_iter()
            .zip(PrayerName::ALL)
            .map(|(minute, name)| slot(name, minute / 60, minute % 60))
            .collect()
    })
}

fn arb_config() -> impl Strategy<Value = ModeWindowConfig> {
    (0u32..=60, 0u32..=60, 0u32..=60).prop_map(|(pre, adhan, post)| {
        ModeWindowConfig::new(pre, adhan, post)
    })
}

fn arb_now() -> impl Strategy<Value = NaiveDateTime> {
    // Whole seconds half the time, so window edges are hit exactly
    prop_oneof![
        (0u32..86_400).prop_map(|secs| at(secs / 3600, (secs % 3600) / 60, secs % 60)),
        (0i64..86_400_000).prop_map(|ms| at(0, 0, 0) + ChronoDuration::milliseconds(ms)),
    ]
}

proptest! {
    #[test]
    fn prop_active_prayer_present_iff_timed(
        prayers in arb_schedule(),
        config in arb_config(),
        now in arb_now(),
    ) {
        let calc = calculate_display_mode(&prayers, now, &config);
        prop_assert!(DisplayMode::ALL.contains(&calc.mode));
        prop_assert_eq!(calc.active_prayer.is_some(), calc.mode.is_timed());
        prop_assert!(!calc.reason.is_empty());
    }

    #[test]
    fn prop_far_from_every_prayer_is_default(
        prayers in arb_schedule(),
        config in arb_config(),
        now in arb_now(),
    ) {
        let pre = ChronoDuration::minutes(i64::from(config.pre_prayer_window_minutes));
        let after = ChronoDuration::minutes(i64::from(
            config.adhan_duration_minutes + config.post_prayer_duration_minutes,
        ));
        let clear = prayers.iter().all(|p| {
            let delta = p.on(now.date()) - now;
            delta > pre || -delta > after
        });
        prop_assume!(clear);
        prop_assert_eq!(calculate_display_mode(&prayers, now, &config).mode, DisplayMode::Default);
    }

    #[test]
    fn prop_adhan_never_before_prayer_instant(
        prayers in arb_schedule(),
        config in arb_config(),
        now in arb_now(),
    ) {
        let calc = calculate_display_mode(&prayers, now, &config);
        if let Some(name) = calc.active_prayer {
            let prayer = prayers
                .iter()
                .find(|p| p.name == name)
                .map(|p| p.on(now.date()))
                .unwrap();
            match calc.mode {
                DisplayMode::PrePrayer => prop_assert!(now < prayer),
                DisplayMode::Adhan | DisplayMode::PostPrayer => prop_assert!(now >= prayer),
                DisplayMode::Default => prop_assert!(false, "default carries no prayer"),
            }
        }
    }

    #[test]
    fn prop_forecast_strictly_after_now_and_sorted(
        prayers in arb_schedule(),
        config in arb_config(),
        now in arb_now(),
    ) {
        let forecast = upcoming_mode_transitions(&prayers, now, &config);
        prop_assert!(forecast.iter().all(|t| t.time > now));
        prop_assert!(forecast.windows(2).all(|pair| pair[0].time <= pair[1].time));
        prop_assert_eq!(
            get_next_mode_transition(&prayers, now, &config),
            forecast.first().copied()
        );
    }

    #[test]
    fn prop_default_never_expires(
        config in arb_config(),
        start in arb_now(),
        offset in 0i64..200_000,
    ) {
        let now = start + ChronoDuration::seconds(offset);
        prop_assert!(!has_mode_expired(DisplayMode::Default, Some(start), now, &config));
    }

    #[test]
    fn prop_adhan_expiry_is_strict(config in arb_config(), start in arb_now()) {
        let duration = i64::from(config.adhan_duration_minutes) * 60;
        let edge = start + ChronoDuration::seconds(duration);
        prop_assert!(!has_mode_expired(DisplayMode::Adhan, Some(start), edge, &config));
        prop_assert!(has_mode_expired(
            DisplayMode::Adhan,
            Some(start),
            edge + ChronoDuration::seconds(1),
            &config
        ));
    }

    #[test]
    fn prop_dhuhr_instant_is_adhan_for_any_config(config in arb_config()) {
        let prayers = standard_prayers();
        let dhuhr = prayers[1].on(at(0, 0, 0).date());
        let calc = calculate_display_mode(&prayers, dhuhr, &config);
        prop_assert_eq!(calc.mode, DisplayMode::Adhan);
        prop_assert_eq!(calc.active_prayer, Some(PrayerName::Dhuhr));
        prop_assert_eq!(dhuhr.second(), 0);
    }
}
