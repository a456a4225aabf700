//! End-to-end claim scenarios over the in-memory store

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

use mission_ledger::clock::{Clock, FixedClock};
use mission_ledger::model::{MissionDefinition, MissionSlot, OutcomeCode, PlayerRecord, RulesetVersion};
use mission_ledger::services::{
    ClaimCoordinator, ClaimRequest, LoadRequest, ProvisioningService, RulesetStore,
    SaveCoordinator, SaveRequest,
};
use mission_ledger::store::{MemoryStore, PlayerStore, RulesetSource};

const TIMEOUT: Duration = Duration::from_secs(2);

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 9, 0, 0).unwrap()
}

struct Harness {
    store: Arc<MemoryStore>,
    clock: Arc<FixedClock>,
    rulesets: RulesetStore,
    claims: Arc<ClaimCoordinator>,
}

impl Harness {
    async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(start()));
        let rulesets = RulesetStore::new(store.clone(), "GameSettings", TIMEOUT);
        rulesets
            .publish(ruleset(10, vec![MissionDefinition { id: 5, kind: 0, target: 10 }]))
            .await
            .unwrap();
        let claims = Arc::new(ClaimCoordinator::new(
            store.clone(),
            rulesets.clone(),
            clock.clone(),
            TIMEOUT,
        ));
        Self {
            store,
            clock,
            rulesets,
            claims,
        }
    }

    async fn player_with_slot0(&self, id: i32, progress: i64) -> PlayerRecord {
        let mut record = PlayerRecord::new("hero", 3, self.clock.now());
        record.missions[0] = MissionSlot {
            id,
            progress,
            ..MissionSlot::empty(self.clock.now())
        };
        self.store.insert(record).await.unwrap()
    }
}

fn ruleset(version: i64, missions: Vec<MissionDefinition>) -> RulesetVersion {
    RulesetVersion {
        version,
        name: "GameSettings".into(),
        missions,
        mission_gem_reward: 50,
        mission_cooldown_minutes: 60,
    }
}

fn claim(mission_id: i32, slot: i64, version: i64) -> ClaimRequest {
    ClaimRequest {
        player_id: "hero".into(),
        game_version: version,
        mission_id,
        mission_index: slot,
    }
}

#[tokio::test]
async fn test_valid_claim_pays_once() {
    let h = Harness::new().await;
    h.player_with_slot0(5, 10).await;

    let outcome = h.claims.claim(&claim(5, 0, 10)).await;
    assert_eq!(outcome.status, OutcomeCode::Success);

    let player = outcome.data.unwrap();
    assert_eq!(player.gem, 50);
    assert_eq!(player.total_mission_completed, 1);
    assert!(player.missions[0].is_claimed);
    assert!(player.missions[0].is_completed);
    assert_eq!(player.missions[0].next_mission_time, start() + ChronoDuration::minutes(60));
    assert_eq!(h.store.find("hero").await.unwrap(), Some(player));
}

#[tokio::test]
async fn test_second_claim_is_already_claimed() {
    let h = Harness::new().await;
    h.player_with_slot0(5, 10).await;

    assert_eq!(h.claims.claim(&claim(5, 0, 10)).await.status, OutcomeCode::Success);
    let again = h.claims.claim(&claim(5, 0, 10)).await;

    assert_eq!(again.status, OutcomeCode::AlreadyClaimed);
    assert_eq!(again.data.as_ref().map(|p| p.gem), Some(50));
    let stored = h.store.find("hero").await.unwrap().unwrap();
    assert_eq!(stored.gem, 50);
    assert_eq!(stored.total_mission_completed, 1);
}

#[tokio::test]
async fn test_mismatched_mission_does_not_mutate() {
    let h = Harness::new().await;
    let before = h.player_with_slot0(5, 10).await;

    let outcome = h.claims.claim(&claim(6, 0, 10)).await;
    assert_eq!(outcome.status, OutcomeCode::MissionMismatch);
    assert_eq!(outcome.data, Some(before.clone()));
    assert_eq!(h.store.find("hero").await.unwrap(), Some(before));
}

#[tokio::test]
async fn test_load_without_identity_provisions() {
    let h = Harness::new().await;
    let provisioning = ProvisioningService::new(h.store.clone(), h.clock.clone(), 3, TIMEOUT);

    let outcome = provisioning.load_or_create(&LoadRequest::default()).await;
    assert_eq!(outcome.status, OutcomeCode::Success);

    let player = outcome.data.unwrap();
    assert!(!player.player_id.is_empty());
    assert_eq!(player.gem, 0);
    assert_eq!(player.high_score, 0);
    assert_eq!(player.total_mission_completed, 0);
    assert_eq!(player.missions.len(), 3);
    assert!(player
        .missions
        .iter()
        .all(|s| s.id == -1 && s.progress == 0 && !s.is_completed && !s.is_claimed));
}

#[tokio::test]
async fn test_version_below_oldest_is_unavailable() {
    let h = Harness::new().await;
    let before = h.player_with_slot0(5, 10).await;

    let outcome = h.claims.claim(&claim(5, 0, 9)).await;
    assert_eq!(outcome.status, OutcomeCode::RulesetUnavailable);
    assert_eq!(outcome.data, Some(before));
}

#[tokio::test]
async fn test_not_yet_eligible_leaves_record_unchanged() {
    let h = Harness::new().await;
    let before = h.player_with_slot0(5, 9).await;

    assert_eq!(h.claims.claim(&claim(5, 0, 10)).await.status, OutcomeCode::NotYetEligible);
    assert_eq!(h.store.find("hero").await.unwrap(), Some(before));
}

#[tokio::test]
async fn test_client_is_never_served_a_future_ruleset() {
    let h = Harness::new().await;
    // v20 raises the target; a v15 client must still see v10's target of 10
    h.rulesets
        .publish(ruleset(20, vec![MissionDefinition { id: 5, kind: 0, target: 100 }]))
        .await
        .unwrap();
    h.player_with_slot0(5, 10).await;

    assert_eq!(h.claims.claim(&claim(5, 0, 15)).await.status, OutcomeCode::Success);
}

#[tokio::test]
async fn test_removed_mission_is_unknown() {
    let h = Harness::new().await;
    h.rulesets
        .publish(ruleset(11, vec![MissionDefinition { id: 8, kind: 0, target: 1 }]))
        .await
        .unwrap();
    h.player_with_slot0(5, 10).await;

    assert_eq!(h.claims.claim(&claim(5, 0, 11)).await.status, OutcomeCode::UnknownMission);
    assert_eq!(h.claims.claim(&claim(5, 7, 11)).await.status, OutcomeCode::InvalidSlot);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_pay_exactly_once() {
    const ATTEMPTS: usize = 16;

    let h = Harness::new().await;
    h.player_with_slot0(5, 10).await;

    let mut handles = Vec::with_capacity(ATTEMPTS);
    for _ in 0..ATTEMPTS {
        let claims = Arc::clone(&h.claims);
        handles.push(tokio::spawn(async move { claims.claim(&claim(5, 0, 10)).await.status }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            OutcomeCode::Success => successes += 1,
            OutcomeCode::AlreadyClaimed | OutcomeCode::WriteConflict => {}
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    assert_eq!(successes, 1);
    let stored = h.store.find("hero").await.unwrap().unwrap();
    assert_eq!(stored.gem, 50);
    assert_eq!(stored.total_mission_completed, 1);
}

#[tokio::test]
async fn test_save_then_claim_then_reassign_after_cooldown() {
    let h = Harness::new().await;
    h.store
        .insert(PlayerRecord::new("hero", 3, h.clock.now()))
        .await
        .unwrap();
    let saves = SaveCoordinator::new(h.store.clone(), h.clock.clone(), TIMEOUT);

    let report = |slot0: (i32, i64)| -> SaveRequest {
        serde_json::from_value(serde_json::json!({
            "playerId": "hero",
            "highScore": 250,
            "missions": [
                { "id": slot0.0, "progress": slot0.1 },
                { "id": -1, "progress": 0 },
                { "id": -1, "progress": 0 }
            ]
        }))
        .unwrap()
    };

    assert_eq!(saves.save(&report((5, 10))).await.status, OutcomeCode::Success);
    assert_eq!(h.claims.claim(&claim(5, 0, 10)).await.status, OutcomeCode::Success);

    // cooldown still running
    assert_eq!(saves.save(&report((7, 0))).await.status, OutcomeCode::MissionMismatch);

    h.clock.advance_minutes(60);
    let outcome = saves.save(&report((7, 0))).await;
    assert_eq!(outcome.status, OutcomeCode::Success);

    let player = outcome.data.unwrap();
    assert_eq!(player.missions[0].id, 7);
    assert!(!player.missions[0].is_claimed);
    assert_eq!(player.gem, 50);
    assert_eq!(player.high_score, 250);
}

#[tokio::test]
async fn test_invalid_stored_ruleset_pays_nothing() {
    let h = Harness::new().await;
    let before = h.player_with_slot0(5, 10).await;

    let mut broken = ruleset(
        20,
        vec![
            MissionDefinition { id: 5, kind: 0, target: 1 },
            MissionDefinition { id: 5, kind: 0, target: 999 },
        ],
    );
    broken.mission_gem_reward = -100;
    h.store.publish(broken).await.unwrap();

    let outcome = h.claims.claim(&claim(5, 0, 20)).await;
    assert_eq!(outcome.status, OutcomeCode::RulesetUnavailable);
    assert_eq!(outcome.data, Some(before.clone()));

    let stored = h.store.find("hero").await.unwrap().unwrap();
    assert_eq!(stored.gem, 0);
    assert_eq!(stored, before);
}
