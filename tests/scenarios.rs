//! End-to-end scenarios (§8): local tell, local ask, forward-to-grandchild, wire round-trip with
//! an HMAC key mismatch, supervised stop of two children in insertion order, and strict
//! FIFO-then-exit for a poison pill.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

// Layer 3: Internal crate imports
use meshrelay_rt::prelude::*;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
struct Num(u32);
impl Payload for Num {
    const TYPE_TAG: &'static str = "scenarios.num";
}

fn security() -> SecurityConfig {
    SecurityConfig::new(b"integration-test-key".to_vec())
}

fn config() -> SystemConfig {
    SystemConfig::new("127.0.0.1", 0, security())
}

struct Echo;
#[async_trait]
impl ActorBehavior for Echo {
    async fn receive(
        &mut self,
        payload: EncodedPayload,
        _sender: Address,
        _ctx: &mut ActorContext,
    ) -> Option<EncodedPayload> {
        Some(payload)
    }
}

/// S1: a top-level actor receives a `Tell` exactly once.
#[tokio::test]
async fn s1_local_tell_is_delivered() {
    struct Counter(Arc<AtomicU32>);
    #[async_trait]
    impl ActorBehavior for Counter {
        async fn receive(
            &mut self,
            _payload: EncodedPayload,
            _sender: Address,
            _ctx: &mut ActorContext,
        ) -> Option<EncodedPayload> {
            self.0.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    let (facade, _signals) = Facade::start_system(config()).await.unwrap();
    let count = Arc::new(AtomicU32::new(0));
    let target = facade.create_actor(Counter(count.clone()), 8).unwrap();

    facade.tell(&target, EncodedPayload::encode(&Num(1)).unwrap()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    facade.shutdown().await.unwrap();
}

/// S2: a local `ask` gets back whatever the target's `receive` returns, via `ReturnMessage`.
#[tokio::test]
async fn s2_local_ask_returns_the_handlers_reply() {
    let (facade, _signals) = Facade::start_system(config()).await.unwrap();
    let target = facade.create_actor(Echo, 8).unwrap();

    let reply = facade
        .ask(&target, EncodedPayload::encode(&Num(42)).unwrap(), Duration::from_secs(1))
        .await
        .unwrap();
    let decoded: Num = reply.decode().unwrap();
    assert_eq!(decoded, Num(42));

    facade.shutdown().await.unwrap();
}

/// S3: a message addressed to a grandchild is delivered by hop-by-hop `Forward`, routed through
/// the intermediate parent the façade doesn't know about directly.
#[tokio::test]
async fn s3_forward_reaches_a_grandchild() {
    struct Leaf(Arc<AtomicU32>);
    #[async_trait]
    impl ActorBehavior for Leaf {
        async fn receive(
            &mut self,
            _payload: EncodedPayload,
            _sender: Address,
            _ctx: &mut ActorContext,
        ) -> Option<EncodedPayload> {
            self.0.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    struct Middle(Arc<AtomicU32>, Arc<Mutex<Option<Address>>>);
    #[async_trait]
    impl ActorBehavior for Middle {
        async fn receive(
            &mut self,
            _payload: EncodedPayload,
            _sender: Address,
            _ctx: &mut ActorContext,
        ) -> Option<EncodedPayload> {
            None
        }

        async fn setup(&mut self, ctx: &mut ActorContext) {
            let leaf = ctx.create_child(Leaf(self.0.clone()), 8);
            *self.1.lock().await = Some(leaf);
        }
    }

    struct Parent(Arc<AtomicU32>, Arc<Mutex<Option<Address>>>);
    #[async_trait]
    impl ActorBehavior for Parent {
        async fn receive(
            &mut self,
            _payload: EncodedPayload,
            _sender: Address,
            _ctx: &mut ActorContext,
        ) -> Option<EncodedPayload> {
            None
        }

        async fn setup(&mut self, ctx: &mut ActorContext) {
            ctx.create_child(Middle(self.0.clone(), self.1.clone()), 8);
        }
    }

    let (facade, _signals) = Facade::start_system(config()).await.unwrap();
    let leaf_hits = Arc::new(AtomicU32::new(0));
    let leaf_slot = Arc::new(Mutex::new(None));
    let _parent = facade.create_actor(Parent(leaf_hits.clone(), leaf_slot.clone()), 8).unwrap();

    let leaf = loop {
        if let Some(addr) = leaf_slot.lock().await.clone() {
            break addr;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    };

    facade.tell(&leaf, EncodedPayload::encode(&Num(5)).unwrap()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(leaf_hits.load(Ordering::SeqCst), 1);

    facade.shutdown().await.unwrap();
}

/// S4: decoding a frame signed with the wrong HMAC key fails with a signature mismatch, never a
/// silent pass-through.
#[tokio::test]
async fn s4_wire_round_trip_rejects_a_key_mismatch() {
    use meshrelay_rt::message::codec;

    let signing_key = SecurityConfig::new(b"sender-key".to_vec());
    let verifying_key = SecurityConfig::new(b"different-key".to_vec());

    let sender = Address::new_root("127.0.0.1", 9100);
    let target = Address::from_parts("t", "127.0.0.1", 9200);
    let envelope = Envelope::new(sender, Some(target), EnvelopeKind::StopActor);

    let frame = codec::encode(&envelope, &signing_key).unwrap();
    let result = codec::decode(&frame, &verifying_key);
    assert!(result.is_err());
}

/// S5: supervision stops two children in insertion order and each is force-joined within its
/// own `child_join_timeout`.
#[tokio::test]
async fn s5_supervision_stops_children_in_insertion_order() {
    let order = Arc::new(Mutex::new(Vec::<u32>::new()));

    struct Child(u32, Arc<Mutex<Vec<u32>>>);
    #[async_trait]
    impl ActorBehavior for Child {
        async fn receive(
            &mut self,
            _payload: EncodedPayload,
            _sender: Address,
            _ctx: &mut ActorContext,
        ) -> Option<EncodedPayload> {
            None
        }

        async fn post_stop(&mut self, _ctx: &mut ActorContext) {
            self.1.lock().await.push(self.0);
        }
    }

    struct Parent(Arc<Mutex<Vec<u32>>>);
    #[async_trait]
    impl ActorBehavior for Parent {
        async fn receive(
            &mut self,
            _payload: EncodedPayload,
            _sender: Address,
            _ctx: &mut ActorContext,
        ) -> Option<EncodedPayload> {
            None
        }

        async fn setup(&mut self, ctx: &mut ActorContext) {
            ctx.create_child(Child(1, self.0.clone()), 8);
            ctx.create_child(Child(2, self.0.clone()), 8);
        }
    }

    let (facade, _signals) = Facade::start_system(config()).await.unwrap();
    let parent = facade.create_actor(Parent(order.clone()), 8).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    facade.stop_actor(&parent);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let stopped = order.lock().await.clone();
    assert_eq!(stopped, vec![1, 2]);

    facade.shutdown().await.unwrap();
}

/// S6: a poison pill terminates the loop only after every message enqueued ahead of it has been
/// processed, and nothing enqueued after it is processed at all.
#[tokio::test]
async fn s6_poison_is_strict_fifo_then_exit() {
    let received = Arc::new(AtomicU32::new(0));

    struct Counter(Arc<AtomicU32>);
    #[async_trait]
    impl ActorBehavior for Counter {
        async fn receive(
            &mut self,
            _payload: EncodedPayload,
            _sender: Address,
            _ctx: &mut ActorContext,
        ) -> Option<EncodedPayload> {
            self.0.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    let security = Arc::new(security());
    let (signals, _queue) = SignalQueue::new(16);
    let root = Address::new_root("127.0.0.1", 9300);

    let handle = spawn(
        Counter(received.clone()),
        Address::child(&root),
        None,
        security,
        signals,
        Duration::from_secs(1),
        Duration::from_secs(1),
        8,
    );

    for i in 0..3 {
        let payload = EncodedPayload::encode(&Num(i)).unwrap();
        handle
            .mailbox
            .put(Envelope::tell(root.clone(), handle.address.clone(), payload))
            .unwrap();
    }
    poison(&handle.mailbox, root.clone(), handle.address.clone()).unwrap();
    // Enqueued after poison: must never be processed.
    let trailing = EncodedPayload::encode(&Num(99)).unwrap();
    let _ = handle
        .mailbox
        .put(Envelope::tell(root, handle.address.clone(), trailing));

    let _ = handle.task.await;
    assert_eq!(received.load(Ordering::SeqCst), 3);
}
