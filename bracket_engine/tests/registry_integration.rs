//! Integration tests for the tournament registry
//!
//! These tests run real actors on the tokio runtime and verify per-guild
//! isolation, invite expiry, points crediting and checkpoint/restore.

#[cfg(test)]
mod registry_tests {
    use bracket_engine::{
        PointsLedger, Rank,
        registry::{
            JsonFileStore, MemoryStore, RegistryConfig, RegistryError, RegistrySnapshot,
            SnapshotStore, TournamentActor, TournamentRegistry,
        },
        tournament::{
            BracketError, Entrant, EntrantId, Mode, RoundProgress, Seeder, Tournament,
            TournamentMetadata, TournamentState,
        },
    };
    use std::{
        collections::{HashMap, HashSet},
        sync::Arc,
        time::Duration,
    };
    use uuid::Uuid;

    fn member(id: u64) -> Entrant {
        Entrant::member(id, format!("player{id}"))
    }

    fn registry() -> (TournamentRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let registry = TournamentRegistry::new(RegistryConfig::default(), store.clone());
        (registry, store)
    }

    #[tokio::test]
    async fn test_guilds_are_independent() {
        let (registry, _) = registry();
        let first = registry.handle(1).await;
        let second = registry.handle(2).await;

        first
            .configure(Mode::Solo, 4, TournamentMetadata::titled("One"))
            .await
            .unwrap();
        first.register(member(10)).await.unwrap();

        let err = second.register(member(10)).await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Bracket(BracketError::NotConfigured)
        ));
        assert_eq!(registry.active_count().await, 2);

        let again = registry.handle(1).await;
        assert_eq!(again.snapshot().await.unwrap().roster().len(), 1);
    }

    #[tokio::test]
    async fn test_completion_credits_points() {
        let (registry, _) = registry();
        let handle = registry.handle(5).await;
        handle
            .configure(Mode::Solo, 2, TournamentMetadata::titled("Final"))
            .await
            .unwrap();
        handle.register(member(1)).await.unwrap();
        handle.register(member(2)).await.unwrap();
        handle.start().await.unwrap();

        let (outcome, awards) = registry
            .record_winner(5, EntrantId::Member(2))
            .await
            .unwrap();
        assert!(matches!(outcome.progress, RoundProgress::Complete(_)));
        assert_eq!(awards.len(), 2);

        assert_eq!(registry.points(5, 2).await, (100, Rank::Wood));
        assert_eq!(registry.points(5, 1).await, (70, Rank::Wood));
        assert_eq!(registry.leaderboard(5, 10).await, vec![(2, 100), (1, 70)]);
        assert_eq!(
            handle.snapshot().await.unwrap().state(),
            TournamentState::Unconfigured
        );
    }

    #[tokio::test]
    async fn test_fillers_earn_nothing() {
        let (registry, _) = registry();
        let handle = registry.handle(6).await;
        handle
            .configure(Mode::Solo, 2, TournamentMetadata::titled("Bots"))
            .await
            .unwrap();
        handle.register(member(1)).await.unwrap();
        handle.fill_with_synthetic(1).await.unwrap();
        handle.start().await.unwrap();

        let (_, awards) = registry
            .record_winner(6, EntrantId::Filler(1))
            .await
            .unwrap();
        assert_eq!(awards.len(), 1);
        assert_eq!(registry.points(6, 1).await.0, 70);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invite_expires_after_ttl() {
        let (registry, _) = registry();
        let handle = registry.handle(7).await;
        handle
            .configure(Mode::Duo, 8, TournamentMetadata::titled("Duo"))
            .await
            .unwrap();
        handle.propose_team(member(1), member(2)).await.unwrap();

        tokio::time::sleep(Duration::from_secs(299)).await;
        assert_eq!(handle.snapshot().await.unwrap().teams().invites().len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(handle.snapshot().await.unwrap().teams().invites().is_empty());

        let err = handle.accept_invite(EntrantId::Member(2)).await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Bracket(BracketError::NoPendingInvite(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_after_accept_is_noop() {
        let (registry, _) = registry();
        let handle = registry.handle(8).await;
        handle
            .configure(Mode::Duo, 8, TournamentMetadata::titled("Duo"))
            .await
            .unwrap();
        handle.propose_team(member(1), member(2)).await.unwrap();
        handle.accept_invite(EntrantId::Member(2)).await.unwrap();

        tokio::time::sleep(Duration::from_secs(301)).await;
        let tournament = handle.snapshot().await.unwrap();
        assert_eq!(tournament.teams().teams().len(), 1);
        handle.register(member(1)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restored_invite_still_expires() {
        let (registry, store) = registry();
        let handle = registry.handle(9).await;
        handle
            .configure(Mode::Duo, 8, TournamentMetadata::titled("Restored"))
            .await
            .unwrap();
        handle.propose_team(member(1), member(2)).await.unwrap();
        assert_eq!(registry.shutdown().await.unwrap(), 1);

        let restored = TournamentRegistry::new(RegistryConfig::default(), store);
        assert_eq!(restored.load().await.unwrap(), 1);
        let handle = restored.handle(9).await;
        assert_eq!(handle.snapshot().await.unwrap().teams().invites().len(), 1);

        tokio::time::sleep(Duration::from_secs(301)).await;
        assert!(handle.snapshot().await.unwrap().teams().invites().is_empty());

        let err = handle.accept_invite(EntrantId::Member(2)).await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Bracket(BracketError::NoPendingInvite(_))
        ));
    }

    #[tokio::test]
    async fn test_invite_stale_at_load_is_dropped() {
        let mut tournament = Tournament::new();
        tournament
            .configure(Mode::Duo, 8, TournamentMetadata::titled("Stale"))
            .unwrap();
        tournament.propose_team(member(1), member(2)).unwrap();

        // Invite issued long before the snapshot was read back
        let mut value = serde_json::to_value(&tournament).unwrap();
        value["teams"]["invites"][0]["issued_at"] = "2000-01-01T00:00:00Z".into();
        let tournament: Tournament = serde_json::from_value(value).unwrap();

        let store = Arc::new(MemoryStore::new());
        let tournaments = HashMap::from([(10, tournament)]);
        let snapshot = RegistrySnapshot::new(tournaments, PointsLedger::new());
        store.save(&snapshot).await.unwrap();

        let registry = TournamentRegistry::new(RegistryConfig::default(), store);
        assert_eq!(registry.load().await.unwrap(), 1);

        let handle = registry.handle(10).await;
        assert!(handle.snapshot().await.unwrap().teams().invites().is_empty());
        assert!(handle.accept_invite(EntrantId::Member(2)).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_team_registrations_respect_capacity() {
        let (registry, _) = registry();
        let handle = registry.handle(12).await;
        handle
            .configure(Mode::Duo, 8, TournamentMetadata::titled("Rush"))
            .await
            .unwrap();

        for team in 0..8 {
            let (first, second) = (team * 2 + 1, team * 2 + 2);
            handle
                .propose_team(member(first), member(second))
                .await
                .unwrap();
            handle
                .accept_invite(EntrantId::Member(second))
                .await
                .unwrap();
        }
        for id in [1, 3] {
            handle.register(member(id)).await.unwrap();
        }

        // Both members of each remaining team race for the last two slots
        let mut tasks = Vec::new();
        for id in 5..=16 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move { handle.register(member(id)).await }));
        }

        let mut accepted = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(registration) => {
                    assert_eq!(registration.added.len(), 2);
                    accepted += 1;
                }
                Err(RegistryError::Bracket(
                    BracketError::Full { .. } | BracketError::DuplicateEntrant(_),
                )) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(accepted, 2);

        let tournament = handle.snapshot().await.unwrap();
        assert_eq!(tournament.roster().len(), 8);
        let roster: HashSet<EntrantId> =
            tournament.roster().iter().map(Entrant::id).collect();
        assert_eq!(roster.len(), 8);
        for id in &roster {
            let team = tournament.teams().team_of(*id).unwrap();
            assert!(team.ids().iter().all(|m| roster.contains(m)));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_winner_reports_decide_once() {
        let (registry, _) = registry();
        let handle = registry.handle(13).await;
        handle
            .configure(Mode::Solo, 4, TournamentMetadata::titled("Race"))
            .await
            .unwrap();
        for id in 1..=4 {
            handle.register(member(id)).await.unwrap();
        }
        let summary = handle.start().await.unwrap();
        let bout = &summary.round.bouts[0];
        let sides = [bout.home.lead_id(), bout.away.lead_id()];

        let mut tasks = Vec::new();
        for attempt in 0..8 {
            let handle = handle.clone();
            let winner = sides[attempt % 2];
            tasks.push(tokio::spawn(async move { handle.record_winner(winner).await }));
        }

        let mut decided = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                decided += 1;
            }
        }
        assert_eq!(decided, 1);

        let tournament = handle.snapshot().await.unwrap();
        assert_eq!(tournament.eliminated().len(), 1);
        assert_eq!(tournament.rounds().len(), 1);
        assert_eq!(tournament.state(), TournamentState::Active);
    }

    #[tokio::test]
    async fn test_checkpoint_and_load() {
        let (registry, store) = registry();
        let handle = registry.handle(3).await;
        handle
            .configure(Mode::Solo, 8, TournamentMetadata::titled("Saved"))
            .await
            .unwrap();
        handle.register(member(1)).await.unwrap();
        handle.register(member(2)).await.unwrap();
        handle.start().await.unwrap();

        assert_eq!(registry.checkpoint().await.unwrap(), 1);

        let restored = TournamentRegistry::new(RegistryConfig::default(), store);
        assert_eq!(restored.load().await.unwrap(), 1);

        let tournament = restored.handle(3).await.snapshot().await.unwrap();
        assert_eq!(tournament.state(), TournamentState::Active);
        assert_eq!(tournament.metadata().title, "Saved");

        let (outcome, _) = restored
            .record_winner(3, EntrantId::Member(1))
            .await
            .unwrap();
        assert!(matches!(outcome.progress, RoundProgress::Complete(_)));
    }

    #[tokio::test]
    async fn test_shutdown_writes_json_snapshot() {
        let path = std::env::temp_dir().join(format!("bracket-registry-{}.json", Uuid::new_v4()));
        let store = Arc::new(JsonFileStore::new(&path));
        let registry = TournamentRegistry::new(RegistryConfig::default(), store.clone());

        let handle = registry.handle(4).await;
        handle
            .configure(Mode::Solo, 4, TournamentMetadata::titled("Json"))
            .await
            .unwrap();
        handle.register(member(1)).await.unwrap();

        assert_eq!(registry.shutdown().await.unwrap(), 1);
        assert!(handle.register(member(2)).await.is_err());

        let snapshot = store.load().await.unwrap().unwrap();
        assert_eq!(snapshot.tournaments[&4].roster().len(), 1);
        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_without_snapshot() {
        let (registry, _) = registry();
        assert_eq!(registry.load().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seeded_actor() {
        let config = RegistryConfig::default();
        let (actor, handle) = TournamentActor::new(11, Tournament::new(), &config);
        tokio::spawn(actor.with_seeder(Seeder::from_seed(1)).run());

        handle
            .configure(Mode::Solo, 4, TournamentMetadata::titled("Seeded"))
            .await
            .unwrap();
        for id in 1..=4 {
            handle.register(member(id)).await.unwrap();
        }
        let summary = handle.start().await.unwrap();

        let mut expected = Tournament::new();
        expected
            .configure(Mode::Solo, 4, TournamentMetadata::titled("Seeded"))
            .unwrap();
        for id in 1..=4 {
            expected.register(member(id)).unwrap();
        }
        assert_eq!(summary, expected.start(&mut Seeder::from_seed(1)).unwrap());

        let final_state = handle.close().await.unwrap();
        assert_eq!(final_state.state(), TournamentState::Active);
        assert!(handle.cancel().await.is_err());
    }
}
