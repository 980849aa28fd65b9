//! Change notifications for hosts.
//!
//! State holders publish typed events after each completed mutation.
//! Hosts that prefer polling can ignore the bus and read snapshots instead.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::light::{LightColor, LightPhase};
use crate::settings::Settings;
use crate::state::timer::TimerInfo;

/// All events a night light can publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum NightLightEvent {
    /// Engine state after a control operation or tick
    StateChanged {
        #[serde(flatten)]
        state: TimerInfo,
    },

    /// The reported phase changed. Published before the matching `StateChanged`.
    PhaseChanged {
        from_phase: LightPhase,
        to_phase: LightPhase,
    },

    /// Preview mode entered (`Some`) or left (`None`)
    PreviewChanged { color: Option<LightColor> },

    /// Settings accepted a mutation, import, reset or load
    SettingsChanged { settings: Settings },
}

impl NightLightEvent {
    pub fn state_changed(state: TimerInfo) -> Self {
        NightLightEvent::StateChanged { state }
    }

    pub fn phase_changed(from: LightPhase, to: LightPhase) -> Self {
        NightLightEvent::PhaseChanged {
            from_phase: from,
            to_phase: to,
        }
    }
}

/// Observer list delivering events over channels.
///
/// Receivers that have been dropped are pruned on the next publish.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<NightLightEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber. Only events published afterwards are delivered.
    pub fn subscribe(&mut self) -> Receiver<NightLightEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: NightLightEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::source::local_datetime;

    fn sample_state() -> TimerInfo {
        TimerInfo {
            current_time: local_datetime(2025, 1, 15, 5, 0, 0),
            next_wake_time: Some(local_datetime(2025, 1, 15, 6, 30, 0)),
            time_remaining_ms: 90 * 60 * 1000,
            current_phase: LightPhase::Night,
            current_color: LightColor::White,
            is_active: true,
        }
    }

    #[test]
    fn test_state_changed_serialization() {
        let json = serde_json::to_string(&NightLightEvent::state_changed(sample_state())).unwrap();

        assert!(json.contains("\"event_type\":\"state_changed\""));
        assert!(json.contains("\"current_phase\":\"night\""));
        assert!(json.contains("\"time_remaining_ms\":5400000"));

        match serde_json::from_str::<NightLightEvent>(&json).unwrap() {
            NightLightEvent::StateChanged { state } => assert_eq!(state, sample_state()),
            other => panic!("Wrong event type deserialized: {other:?}"),
        }
    }

    #[test]
    fn test_phase_changed_serialization() {
        let event = NightLightEvent::phase_changed(LightPhase::Night, LightPhase::Wake);
        let json = serde_json::to_string(&event).unwrap();

        assert!(json.contains("\"event_type\":\"phase_changed\""));
        assert!(json.contains("\"from_phase\":\"night\""));
        assert!(json.contains("\"to_phase\":\"wake\""));
    }

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let mut bus = EventBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.publish(NightLightEvent::PreviewChanged {
            color: Some(LightColor::Blue),
        });

        for rx in [first, second] {
            assert_eq!(
                rx.try_recv().unwrap(),
                NightLightEvent::PreviewChanged {
                    color: Some(LightColor::Blue)
                }
            );
        }
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(NightLightEvent::PreviewChanged { color: None });

        assert_eq!(bus.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }
}
