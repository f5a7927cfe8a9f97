// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{sync::Arc, thread, time::Duration};

use crossbeam_channel::{Receiver, unbounded};
use vci_component::{Bus, Client, FlowControl, Subscriber, SubscriptionState};
use vci_type::{Error, RawPayload};

fn collector() -> (Arc<dyn Subscriber>, Receiver<String>) {
	let (tx, rx) = unbounded();
	let subscriber: Arc<dyn Subscriber> = Arc::new(move |payload: &RawPayload| {
		let _ = tx.send(payload.to_string());
	});
	(subscriber, rx)
}

fn emit_all(client: &Client, events: &[&str]) {
	for event in events {
		client.emit("mod", "evt", &RawPayload::from(*event)).unwrap();
	}
}

#[test]
fn test_events_queue_before_run() {
	let _bus = Bus::bind("subscription-queue").unwrap();
	let client = Client::dial_address("subscription-queue").unwrap();
	let (subscriber, rx) = collector();
	let subscription = client.subscribe("mod", "evt", subscriber).unwrap();

	emit_all(&client, &["a", "b", "c"]);
	assert_eq!(subscription.pending(), 3);
	assert_eq!(subscription.state(), SubscriptionState::Created);

	let runner = {
		let subscription = subscription.clone();
		thread::spawn(move || subscription.run())
	};
	let received: Vec<_> = (0..3).map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap()).collect();
	assert_eq!(received, vec!["a", "b", "c"]);

	subscription.cancel().unwrap();
	assert_eq!(runner.join().unwrap(), Ok(()));
	assert_eq!(subscription.state(), SubscriptionState::Cancelled);
}

#[test]
fn test_drop_after_limit_delivers_oldest() {
	let _bus = Bus::bind("subscription-drop").unwrap();
	let client = Client::dial_address("subscription-drop").unwrap();
	let (subscriber, rx) = collector();
	let subscription = client.subscribe("mod", "evt", subscriber).unwrap();
	subscription.drop_after_limit(2);
	assert_eq!(subscription.flow_control(), FlowControl::DropAfterLimit(2));

	emit_all(&client, &["1", "2", "3", "4", "5"]);
	assert_eq!(subscription.dropped(), 3);

	let runner = {
		let subscription = subscription.clone();
		thread::spawn(move || subscription.run())
	};
	assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "1");
	assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "2");
	assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

	subscription.cancel().unwrap();
	runner.join().unwrap().unwrap();
}

#[test]
fn test_coalesce_delivers_latest() {
	let _bus = Bus::bind("subscription-coalesce").unwrap();
	let client = Client::dial_address("subscription-coalesce").unwrap();
	let (subscriber, rx) = collector();
	let subscription = client.subscribe("mod", "evt", subscriber).unwrap();
	subscription.coalesce();

	emit_all(&client, &["1", "2", "3"]);
	assert_eq!(subscription.pending(), 1);

	let runner = {
		let subscription = subscription.clone();
		thread::spawn(move || subscription.run())
	};
	assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "3");
	subscription.cancel().unwrap();
	runner.join().unwrap().unwrap();
}

#[test]
fn test_block_after_limit_holds_emitter() {
	let _bus = Bus::bind("subscription-block").unwrap();
	let client = Arc::new(Client::dial_address("subscription-block").unwrap());
	let (subscriber, rx) = collector();
	let subscription = client.subscribe("mod", "evt", subscriber).unwrap();
	subscription.block_after_limit(1);

	emit_all(&client, &["1"]);
	let (done_tx, done_rx) = unbounded();
	let emitter = {
		let client = client.clone();
		thread::spawn(move || {
			client.emit("mod", "evt", &RawPayload::from("2")).unwrap();
			done_tx.send(()).unwrap();
		})
	};
	assert!(done_rx.recv_timeout(Duration::from_millis(50)).is_err());

	subscription.remove_limit();
	done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
	emitter.join().unwrap();
	assert_eq!(subscription.pending(), 2);

	let runner = {
		let subscription = subscription.clone();
		thread::spawn(move || subscription.run())
	};
	assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "1");
	assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "2");
	subscription.cancel().unwrap();
	runner.join().unwrap().unwrap();
}

#[test]
fn test_cancel_before_run() {
	let bus = Bus::bind("subscription-cancel-first").unwrap();
	let client = Client::dial_address("subscription-cancel-first").unwrap();
	let (subscriber, _rx) = collector();
	let subscription = client.subscribe("mod", "evt", subscriber).unwrap();

	subscription.cancel().unwrap();
	assert!(matches!(subscription.run(), Err(Error::SubscriptionFinished { .. })));
	assert!(matches!(subscription.cancel(), Err(Error::SubscriptionFinished { .. })));
	assert_eq!(bus.route_count("mod", "evt"), 0);
}

#[test]
fn test_second_run_is_rejected() {
	let _bus = Bus::bind("subscription-run-twice").unwrap();
	let client = Client::dial_address("subscription-run-twice").unwrap();
	let (subscriber, _rx) = collector();
	let subscription = client.subscribe("mod", "evt", subscriber).unwrap();

	let runner = {
		let subscription = subscription.clone();
		thread::spawn(move || subscription.run())
	};
	while subscription.state() != SubscriptionState::Running {
		thread::yield_now();
	}
	assert!(matches!(subscription.run(), Err(Error::SubscriptionRunning { .. })));

	subscription.cancel().unwrap();
	runner.join().unwrap().unwrap();
}

#[test]
fn test_bus_shutdown_completes_subscription() {
	let bus = Bus::bind("subscription-bus-gone").unwrap();
	let client = Client::dial_address("subscription-bus-gone").unwrap();
	let (subscriber, rx) = collector();
	let subscription = client.subscribe("mod", "evt", subscriber).unwrap();
	emit_all(&client, &["last"]);

	drop(bus);
	assert_eq!(subscription.run(), Ok(()));
	assert_eq!(subscription.state(), SubscriptionState::Completed);
	assert_eq!(rx.try_recv().unwrap(), "last");
	assert!(matches!(subscription.cancel(), Err(Error::SubscriptionFinished { .. })));
}

#[test]
fn test_dropping_subscription_removes_route() {
	let bus = Bus::bind("subscription-drop-route").unwrap();
	let client = Client::dial_address("subscription-drop-route").unwrap();
	let (subscriber, _rx) = collector();
	let subscription = client.subscribe("mod", "evt", subscriber).unwrap();
	assert_eq!(bus.route_count("mod", "evt"), 1);

	drop(subscription);
	assert_eq!(bus.route_count("mod", "evt"), 0);
}

#[test]
fn test_closing_client_completes_its_subscriptions() {
	let bus = Bus::bind("subscription-client-closed").unwrap();
	let client = Client::dial_address("subscription-client-closed").unwrap();
	let other = Client::dial_address("subscription-client-closed").unwrap();
	let (subscriber, rx) = collector();
	let subscription = client.subscribe("mod", "evt", subscriber).unwrap();

	let runner = {
		let subscription = subscription.clone();
		thread::spawn(move || subscription.run())
	};
	emit_all(&other, &["before"]);
	assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "before");

	client.close();
	drop(client);
	assert_eq!(runner.join().unwrap(), Ok(()));
	assert_eq!(subscription.state(), SubscriptionState::Completed);
	assert_eq!(bus.route_count("mod", "evt"), 0);

	emit_all(&other, &["after"]);
	assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
}

#[test]
fn test_closed_client_leaves_backlog_for_run() {
	let _bus = Bus::bind("subscription-client-backlog").unwrap();
	let client = Client::dial_address("subscription-client-backlog").unwrap();
	let (subscriber, rx) = collector();
	let subscription = client.subscribe("mod", "evt", subscriber).unwrap();
	emit_all(&client, &["queued"]);

	drop(client);
	assert_eq!(subscription.run(), Ok(()));
	assert_eq!(subscription.state(), SubscriptionState::Completed);
	assert_eq!(rx.try_recv().unwrap(), "queued");
}
