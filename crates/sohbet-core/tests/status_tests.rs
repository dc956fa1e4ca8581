mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::FakeChannel;
use sohbet_core::{ConnectionState, HubEvent, LiveStatus, StatusSubscriber, StatusValue};

fn mount(channel: &FakeChannel) -> (StatusSubscriber, Rc<RefCell<Vec<LiveStatus>>>) {
    let renders = Rc::new(RefCell::new(Vec::new()));
    let sink = renders.clone();
    let subscriber = StatusSubscriber::mount(channel, move |live: &LiveStatus| {
        sink.borrow_mut().push(*live);
    });
    (subscriber, renders)
}

#[cfg(test)]
mod status_tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let channel = FakeChannel::new();
        let (subscriber, renders) = mount(&channel);

        let live = subscriber.snapshot();
        assert_eq!(live.connection(), ConnectionState::Disconnected);
        assert_eq!(live.status(), StatusValue::Empty);
        assert!(!live.is_connected());
        assert!(renders.borrow().is_empty());
        assert_eq!(channel.subscribe_count(), 1);
    }

    #[test]
    fn test_pressed_and_empty_pushes_render_immediately() {
        let channel = FakeChannel::new();
        let (subscriber, renders) = mount(&channel);

        channel.push(HubEvent::ButtonStatusChanged(StatusValue::Pressed));
        assert_eq!(subscriber.snapshot().status(), StatusValue::Pressed);
        assert_eq!(renders.borrow().len(), 1);

        channel.push(HubEvent::ButtonStatusChanged(StatusValue::Empty));
        assert_eq!(subscriber.snapshot().status(), StatusValue::Empty);
        assert_eq!(renders.borrow().len(), 2);
        assert_eq!(renders.borrow()[1].status(), StatusValue::Empty);
    }

    #[test]
    fn test_connectivity_follows_channel_lifecycle() {
        let channel = FakeChannel::new();
        let (subscriber, _renders) = mount(&channel);

        channel.push(HubEvent::Connecting);
        assert_eq!(subscriber.snapshot().connection(), ConnectionState::Connecting);
        assert!(!subscriber.snapshot().is_connected());

        channel.push(HubEvent::Connected);
        assert!(subscriber.snapshot().is_connected());

        channel.push(HubEvent::ButtonStatusChanged(StatusValue::Pressed));
        channel.push(HubEvent::Disconnected(Some("transport dropped".to_string())));
        let live = subscriber.snapshot();
        assert!(!live.is_connected());
        assert_eq!(live.status(), StatusValue::Pressed);

        channel.push(HubEvent::Connecting);
        channel.push(HubEvent::Connected);
        assert!(subscriber.snapshot().is_connected());
    }

    #[test]
    fn test_last_push_wins() {
        let channel = FakeChannel::new();
        let (subscriber, _renders) = mount(&channel);

        for value in [StatusValue::Pressed, StatusValue::Empty, StatusValue::Pressed] {
            channel.push(HubEvent::ButtonStatusChanged(value));
        }
        assert_eq!(subscriber.snapshot().status(), StatusValue::Pressed);
    }

    #[test]
    fn test_repeated_value_does_not_rerender() {
        let channel = FakeChannel::new();
        let (_subscriber, renders) = mount(&channel);

        channel.push(HubEvent::ButtonStatusChanged(StatusValue::Empty));
        assert!(renders.borrow().is_empty());
    }

    #[test]
    fn test_unmount_releases_channel_and_ignores_queued_push() {
        let channel = FakeChannel::new();
        let (mut subscriber, renders) = mount(&channel);
        channel.push(HubEvent::Connected);

        subscriber.unmount();
        assert!(channel.is_released());
        assert!(!subscriber.is_mounted());

        channel.push(HubEvent::ButtonStatusChanged(StatusValue::Pressed));
        channel.push(HubEvent::Disconnected(None));
        assert_eq!(subscriber.snapshot().status(), StatusValue::Empty);
        assert!(subscriber.snapshot().is_connected());
        assert_eq!(renders.borrow().len(), 1);

        subscriber.unmount();
        assert!(channel.is_released());
    }

    #[test]
    fn test_drop_releases_channel() {
        let channel = FakeChannel::new();
        let (subscriber, renders) = mount(&channel);

        drop(subscriber);
        assert!(channel.is_released());

        channel.push(HubEvent::ButtonStatusChanged(StatusValue::Pressed));
        assert!(renders.borrow().is_empty());
    }

    #[test]
    fn test_remount_opens_a_fresh_subscription() {
        let channel = FakeChannel::new();
        let (first, _) = mount(&channel);
        drop(first);

        let (second, _) = mount(&channel);
        assert_eq!(channel.subscribe_count(), 2);
        assert!(!channel.is_released());

        channel.push(HubEvent::ButtonStatusChanged(StatusValue::Pressed));
        assert_eq!(second.snapshot().status(), StatusValue::Pressed);
    }
}
